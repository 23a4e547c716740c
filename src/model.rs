use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author_id: Option<i64>,
    pub category_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorWithBooks {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryWithBooks {
    #[serde(flatten)]
    pub category: Category,
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookWithRelations {
    #[serde(flatten)]
    pub book: Book,
    pub author: Option<Author>,
    pub category: Option<Category>,
}

/// Payload accepted by both store and update for authors.
///
/// Absent fields stay `None`, so an update only touches what was sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorInput {
    #[serde(default, deserialize_with = "trimmed")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryInput {
    #[serde(default, deserialize_with = "trimmed")]
    pub name: Option<String>,
}

/// Book payload. The outer `Option` on the foreign keys records whether the
/// field was sent at all, the inner one whether it was set to null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookInput {
    #[serde(default, deserialize_with = "trimmed")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "foreign_key")]
    pub author_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "foreign_key")]
    pub category_id: Option<Option<i64>>,
}

// Numbers are kept as their text, the way a form field would carry them.
fn trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => Ok(None),
        JsonValue::String(s) => Ok(Some(s.trim().to_string())),
        JsonValue::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!("must be a string, got {other}"))),
    }
}

// Form inputs post ids as strings, with "" meaning none.
fn foreign_key<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let id = match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => None,
        JsonValue::Number(n) => Some(integral(&n).ok_or_else(|| D::Error::custom(format!("invalid id: {n}")))?),
        JsonValue::String(s) if s.trim().is_empty() => None,
        JsonValue::String(s) => Some(
            s.trim()
                .parse::<i64>()
                .map_err(|_| D::Error::custom(format!("invalid id: {s}")))?,
        ),
        other => return Err(D::Error::custom(format!("invalid id: {other}"))),
    };
    Ok(Some(id))
}

// 1.0 is accepted as 1, 1.5 is not.
fn integral(n: &serde_json::Number) -> Option<i64> {
    if let Some(id) = n.as_i64() {
        return Some(id);
    }
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
        .map(|f| f as i64)
}
