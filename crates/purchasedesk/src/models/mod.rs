use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Every backend response wraps its payload in `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub purchases: Vec<Purchase>,
}

/// Owner of a purchase as embedded in the purchase collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOwner {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub name: String,
    #[serde(deserialize_with = "lenient_price")]
    pub price: f64,
    #[serde(alias = "date_created", deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PurchaseOwner>,
}

impl Purchase {
    /// Name and price match, ignoring server-computed fields.
    pub fn same_content(&self, other: &Purchase) -> bool {
        self.id == other.id && self.name == other.name && self.price == other.price
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(f64),
    Text(String),
}

/// Price as a JSON number or a numeric string such as `"2.50"`.
fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawPrice::deserialize(deserializer)? {
        RawPrice::Number(price) => Ok(price),
        RawPrice::Text(raw) => raw
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid price {raw:?}"))),
    }
}

/// RFC 3339 timestamp, or a naive one without offset taken as UTC.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(at.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| de::Error::custom(format!("invalid timestamp {raw:?}")))
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of both purchase create and purchase update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchasePayload {
    pub name: String,
    pub price: f64,
    pub user_id: i64,
}
