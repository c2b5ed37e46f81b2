use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A catalog product record. The wire format is camelCase with the entry
/// date rendered as `dd-MM-yyyy`; the column name stays `entry_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    #[serde(with = "date_format")]
    #[sqlx(rename = "entry_date")]
    pub date: NaiveDate,
    pub item_code: String,
    pub item_name: String,
    pub item_quantity: i32,
    pub status: String,
}

/// Serde adapter for the `dd-MM-yyyy` date format used on the wire.
pub mod date_format {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%d-%m-%Y";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}
