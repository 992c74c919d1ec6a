//! Server-rendered HTML pages.
//!
//! Pages are Tera templates compiled into the binary. Autoescaping is on for
//! every `.html` template, so values from the backend or the visitor are
//! always escaped.

pub mod format;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use strum::IntoEnumIterator;
use tera::{Context, Tera, Value};

use crate::forms::{ExpenseForm, FieldErrors};
use crate::models::{Category, Transaction, User};
use crate::stats::SpendingSummary;

use format::{long_date, month_year, rupiah};

const TEMPLATES: [(&str, &str); 4] = [
    ("layout.html", include_str!("../../templates/layout.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("register.html", include_str!("../../templates/register.html")),
    ("dashboard.html", include_str!("../../templates/dashboard.html")),
];

/// `{{ amount | rupiah }}`
fn rupiah_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let amount = value
        .as_i64()
        .ok_or_else(|| tera::Error::msg(format!("rupiah: expected an integer, got {}", value)))?;
    Ok(Value::String(rupiah(amount)))
}

/// Compiled page templates, shared across requests.
#[derive(Clone)]
pub struct Views {
    tera: Arc<Tera>,
}

impl Views {
    pub fn new() -> tera::Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        tera.add_raw_templates(TEMPLATES)?;
        tera.register_filter("rupiah", rupiah_filter);
        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    fn render<T: Serialize>(&self, template: &str, data: &T) -> tera::Result<String> {
        self.tera.render(template, &Context::from_serialize(data)?)
    }

    pub fn login_page(&self, view: &LoginView<'_>) -> tera::Result<String> {
        self.render("login.html", view)
    }

    pub fn register_page(&self, view: &RegisterView<'_>) -> tera::Result<String> {
        self.render("register.html", view)
    }

    pub fn dashboard_page(&self, view: &DashboardView<'_>) -> tera::Result<String> {
        self.render("dashboard.html", &DashboardContext::from(view))
    }
}

#[derive(Serialize)]
pub struct LoginView<'a> {
    pub username: &'a str,
    pub errors: &'a FieldErrors,
    pub registered: bool,
}

#[derive(Serialize)]
pub struct RegisterView<'a> {
    pub username: &'a str,
    pub errors: &'a FieldErrors,
}

pub struct DashboardView<'a> {
    pub user: &'a User,
    /// Newest first.
    pub transactions: &'a [Transaction],
    pub summary: &'a SpendingSummary,
    pub today: NaiveDate,
    pub form: &'a ExpenseForm,
    pub errors: &'a FieldErrors,
}

#[derive(Serialize)]
struct DashboardContext<'a> {
    user_name: &'a str,
    form: FormValues<'a>,
    options: Vec<CategoryOption>,
    errors: &'a FieldErrors,
    period: String,
    total: i64,
    stats: Vec<StatRow>,
    history: Vec<HistoryRow<'a>>,
}

#[derive(Serialize)]
struct FormValues<'a> {
    deskripsi: &'a str,
    tanggal: String,
    jumlah: &'a str,
}

#[derive(Serialize)]
struct CategoryOption {
    key: &'static str,
    label: &'static str,
    icon: &'static str,
    selected: bool,
}

#[derive(Serialize)]
struct StatRow {
    key: &'static str,
    icon: &'static str,
    name: &'static str,
    amount: i64,
    color: &'static str,
    width: String,
}

#[derive(Serialize)]
struct HistoryRow<'a> {
    icon: &'static str,
    title: &'a str,
    date: String,
    amount: i64,
}

impl<'a> From<&DashboardView<'a>> for DashboardContext<'a> {
    fn from(view: &DashboardView<'a>) -> Self {
        let tanggal = if view.form.tanggal.is_empty() {
            view.today.format("%Y-%m-%d").to_string()
        } else {
            view.form.tanggal.clone()
        };

        let options = Category::iter()
            .map(|category| CategoryOption {
                key: category.key(),
                label: category.label(),
                icon: category.icon(),
                selected: view.form.kategori == category.key(),
            })
            .collect();

        let stats = view
            .summary
            .categories
            .iter()
            .map(|stat| StatRow {
                key: stat.category.key(),
                icon: stat.category.icon(),
                name: stat.name,
                amount: stat.amount,
                color: stat.color,
                width: format!("{:.1}", stat.percentage),
            })
            .collect();

        let history = view
            .transactions
            .iter()
            .map(|tx| HistoryRow {
                icon: tx.category.icon(),
                title: tx.title(),
                date: tx.day().map(long_date).unwrap_or_else(|| tx.date.clone()),
                amount: tx.amount,
            })
            .collect();

        DashboardContext {
            user_name: view.user.display_name(),
            form: FormValues {
                deskripsi: &view.form.deskripsi,
                tanggal,
                jumlah: &view.form.jumlah,
            },
            options,
            errors: view.errors,
            period: month_year(view.today),
            total: view.summary.total,
            stats,
            history,
        }
    }
}
