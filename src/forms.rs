//! Form payloads posted by the HTML pages and their field validation.
//!
//! A form that fails validation is re-rendered with inline errors and never
//! reaches the backend.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::backend::Credentials;
use crate::models::{Category, NewExpense};

pub const MIN_PASSWORD_LEN: usize = 6;

/// First error message per field, keyed by field name.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(custom(function = "required_username"))]
    #[serde(default)]
    pub username: String,
    #[validate(custom(function = "password_rules"))]
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(custom(function = "required_username"))]
    #[serde(default)]
    pub username: String,
    #[validate(custom(function = "password_rules"))]
    #[serde(default)]
    pub password: String,
    #[validate(must_match(other = "password", message = "Password tidak cocok!"))]
    #[serde(default)]
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ExpenseForm {
    #[serde(default)]
    pub deskripsi: String,
    #[validate(custom(function = "expense_date"))]
    #[serde(default)]
    pub tanggal: String,
    #[validate(custom(function = "expense_amount"))]
    #[serde(default)]
    pub jumlah: String,
    #[validate(custom(function = "expense_category"))]
    #[serde(default)]
    pub kategori: String,
}

impl ExpenseForm {
    /// Validates the form and converts it into the backend payload.
    pub fn to_new_expense(&self) -> Result<NewExpense, FieldErrors> {
        check(self)?;

        // Validation above guarantees these parse.
        let parsed = (
            parse_date(&self.tanggal),
            parse_amount(&self.jumlah),
            self.kategori.trim().parse::<Category>().ok(),
        );
        match parsed {
            (Some(date), Some(amount), Some(category)) => Ok(NewExpense {
                description: self.deskripsi.trim().to_string(),
                date,
                amount,
                category,
            }),
            _ => Err(FieldErrors::from([(
                "general".to_string(),
                "Data pengeluaran tidak valid".to_string(),
            )])),
        }
    }
}

/// Runs the form validators and flattens the result into [`FieldErrors`].
pub fn check<T: Validate>(form: &T) -> Result<(), FieldErrors> {
    form.validate().map_err(|errors| field_errors(&errors))
}

pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} tidak valid", field));
                (field.to_string(), message)
            })
        })
        .collect()
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

fn required_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(invalid("required", "Username wajib diisi!"));
    }
    Ok(())
}

fn password_rules(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(invalid("required", "Password wajib diisi!"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid("length", "Password minimal 6 karakter!"));
    }
    Ok(())
}

fn expense_date(date: &str) -> Result<(), ValidationError> {
    if date.trim().is_empty() {
        return Err(invalid("required", "Tanggal wajib diisi!"));
    }
    parse_date(date)
        .map(|_| ())
        .ok_or_else(|| invalid("date", "Tanggal tidak valid!"))
}

fn expense_amount(amount: &str) -> Result<(), ValidationError> {
    if amount.trim().is_empty() {
        return Err(invalid("required", "Jumlah wajib diisi!"));
    }
    parse_amount(amount)
        .map(|_| ())
        .ok_or_else(|| invalid("amount", "Jumlah harus angka lebih dari 0!"))
}

fn expense_category(category: &str) -> Result<(), ValidationError> {
    if category.trim().is_empty() {
        return Err(invalid("required", "Pilih kategori dulu!"));
    }
    category
        .trim()
        .parse::<Category>()
        .map(|_| ())
        .map_err(|_| invalid("category", "Kategori tidak dikenal!"))
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
}

fn parse_amount(amount: &str) -> Option<i64> {
    amount.trim().parse::<i64>().ok().filter(|n| *n > 0)
}
