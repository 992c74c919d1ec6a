use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{EnumIter, EnumString, IntoStaticStr};

use super::RecordId;

/// Fixed expense categories. Unknown keys collapse into [`Category::Other`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(EnumIter, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    #[strum(to_string = "makanan", serialize = "food")]
    Food,
    #[strum(to_string = "transportasi", serialize = "transportation", serialize = "transport")]
    Transportation,
    #[strum(to_string = "belanja", serialize = "shopping")]
    Shopping,
    #[strum(to_string = "hiburan", serialize = "entertainment")]
    Entertainment,
    #[default]
    #[strum(to_string = "lainnya", serialize = "other")]
    Other,
}

impl Category {
    /// Wire key understood by the backend.
    pub fn key(self) -> &'static str {
        self.into()
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Food => "Makanan",
            Category::Transportation => "Transportasi",
            Category::Shopping => "Belanja",
            Category::Entertainment => "Hiburan",
            Category::Other => "Lainnya",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Category::Food => "bg-orange-500",
            Category::Transportation => "bg-blue-500",
            Category::Shopping => "bg-green-500",
            Category::Entertainment => "bg-purple-500",
            Category::Other => "bg-gray-500",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Food => "🍔",
            Category::Transportation => "🚗",
            Category::Shopping => "🛒",
            Category::Entertainment => "🎬",
            Category::Other => "…",
        }
    }

    /// Parses a category key, falling back to [`Category::Other`].
    pub fn from_key(key: &str) -> Self {
        key.trim().parse().unwrap_or(Category::Other)
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = Option::<String>::deserialize(deserializer)?;
        Ok(key.as_deref().map(Category::from_key).unwrap_or_default())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

/// An expense entry as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "deskripsi", alias = "description", default)]
    pub description: Option<String>,
    #[serde(rename = "tanggal", alias = "date", default, deserialize_with = "deserialize_date")]
    pub date: String,
    #[serde(rename = "jumlah", alias = "amount", deserialize_with = "deserialize_amount")]
    pub amount: i64,
    #[serde(rename = "kategori", alias = "category", default)]
    pub category: Category,
}

impl Transaction {
    /// Calendar day of the entry. Accepts plain dates and ISO datetimes.
    pub fn day(&self) -> Option<NaiveDate> {
        let date = self.date.get(..10).unwrap_or(&self.date);
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
    }

    pub fn title(&self) -> &str {
        match self.description.as_deref() {
            Some(description) if !description.trim().is_empty() => description,
            _ => self.category.label(),
        }
    }
}

/// Payload sent to `POST /api/pengeluaran` by the dashboard form.
#[derive(Debug, Clone, Serialize)]
pub struct NewExpense {
    #[serde(rename = "deskripsi")]
    pub description: String,
    #[serde(rename = "tanggal")]
    pub date: NaiveDate,
    #[serde(rename = "jumlah")]
    pub amount: i64,
    #[serde(rename = "kategori")]
    pub category: Category,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Integer(i64),
    Float(f64),
    Text(String),
}

// 2^63, the first float past `i64::MAX`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn round_amount(f: f64) -> Option<i64> {
    let rounded = f.round();
    (rounded.is_finite() && (-I64_BOUND..I64_BOUND).contains(&rounded)).then(|| rounded as i64)
}

// Numeric columns often come back from the backend as strings ("25000.00").
fn deserialize_amount<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawAmount::deserialize(deserializer)? {
        RawAmount::Integer(n) => Ok(n),
        RawAmount::Float(f) => round_amount(f)
            .ok_or_else(|| serde::de::Error::custom(format!("amount out of range: {}", f))),
        RawAmount::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(round_amount))
                .ok_or_else(|| serde::de::Error::custom(format!("invalid amount {:?}", s)))
        }
    }
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn category_keys_and_fallback() {
        assert_eq!(Category::from_key("makanan"), Category::Food);
        assert_eq!(Category::from_key("Hiburan"), Category::Entertainment);
        assert_eq!(Category::from_key("shopping"), Category::Shopping);
        assert_eq!(Category::from_key("transport"), Category::Transportation);
        assert_eq!(Category::from_key("tagihan"), Category::Other);
        assert_eq!(Category::Other.color(), "bg-gray-500");
        assert_eq!(Category::Food.key(), "makanan");
    }

    #[test]
    fn parses_backend_transaction() {
        let tx: Transaction = serde_json::from_value(json!({
            "id": 3,
            "deskripsi": "Netflix",
            "tanggal": "2026-02-08T00:00:00.000Z",
            "jumlah": "180000.00",
            "kategori": "hiburan"
        }))
        .unwrap();
        assert_eq!(tx.amount, 180000);
        assert_eq!(tx.category, Category::Entertainment);
        assert_eq!(tx.day(), NaiveDate::from_ymd_opt(2026, 2, 8));
        assert_eq!(tx.title(), "Netflix");
    }

    #[test]
    fn title_falls_back_to_category() {
        let tx: Transaction = serde_json::from_value(json!({
            "date": "2026-02-11",
            "amount": 25000,
            "category": "food"
        }))
        .unwrap();
        assert_eq!(tx.title(), "Makanan");
        assert!(tx.id.is_none());
    }

    #[test]
    fn rejects_non_numeric_amount() {
        let result: Result<Transaction, _> = serde_json::from_value(json!({
            "tanggal": "2026-02-11",
            "jumlah": "banyak",
            "kategori": "makanan"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn missing_or_null_category_and_date_fall_back() {
        let rows: Vec<Transaction> = serde_json::from_value(json!([
            { "deskripsi": "Parkir", "tanggal": null, "jumlah": 2000, "kategori": null },
            { "deskripsi": "Pulsa", "jumlah": 50000 }
        ]))
        .unwrap();
        assert!(rows.iter().all(|tx| tx.category == Category::Other));
        assert!(rows.iter().all(|tx| tx.date.is_empty() && tx.day().is_none()));
    }

    #[test]
    fn rejects_amounts_outside_i64() {
        for amount in [json!("1e30"), json!(1e30), json!(-1e19), json!("9223372036854775808")] {
            let result: Result<Transaction, _> = serde_json::from_value(json!({
                "tanggal": "2026-02-11",
                "jumlah": amount,
                "kategori": "makanan"
            }));
            assert!(result.is_err(), "accepted {}", amount);
        }

        let tx: Transaction = serde_json::from_value(json!({
            "tanggal": "2026-02-11",
            "jumlah": "-5000.4",
            "kategori": "makanan"
        }))
        .unwrap();
        assert_eq!(tx.amount, -5000);
    }

    #[test]
    fn new_expense_uses_backend_field_names() {
        let expense = NewExpense {
            description: "Nasi Goreng".into(),
            date: NaiveDate::from_ymd_opt(2026, 2, 11).unwrap(),
            amount: 25000,
            category: Category::Food,
        };
        assert_eq!(
            serde_json::to_value(&expense).unwrap(),
            json!({
                "deskripsi": "Nasi Goreng",
                "tanggal": "2026-02-11",
                "jumlah": 25000,
                "kategori": "makanan"
            })
        );
    }
}
