use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Identifier of a stored book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub u64);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{0}' is not a book id")]
pub struct InvalidBookId(pub String);

impl FromStr for BookId {
    type Err = InvalidBookId;

    /// Parses a path segment the way a numeric comparison would coerce it:
    /// `"1"`, `" 1 "`, `"+1"`, `"1.0"`, `"1e0"` and `"0x1"` all name book 1.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if let Ok(id) = trimmed.parse::<u64>() {
            return Ok(BookId(id));
        }

        // Unsigned hex, octal and binary literals
        if let Some((radix, digits)) = radix_digits(trimmed) {
            return u64::from_str_radix(digits, radix)
                .ok()
                .filter(|_| !digits.starts_with('+'))
                .map(BookId)
                .ok_or_else(|| InvalidBookId(raw.to_string()));
        }

        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64 => {
                Ok(BookId(n as u64))
            }
            _ => Err(InvalidBookId(raw.to_string())),
        }
    }
}

fn radix_digits(raw: &str) -> Option<(u32, &str)> {
    let prefix = raw.get(..2)?;
    let radix = match prefix {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    Some((radix, &raw[2..]))
}

/// A book record as stored and returned by the API.
///
/// `title`, `author` and `finished` are kept exactly as the client sent them;
/// nothing enforces their documented types. A `title` or `author` that was
/// never sent is left out of the JSON, while an explicit `null` is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": 1,
    "title": "The Pragmatic Programmer",
    "author": "Andy Hunt / Dave Thomas",
    "finished": true,
    "createdAt": "2024-05-01T09:30:00.000Z"
}))]
pub struct Book {
    /// The auto-generated id of the book.
    #[schema(value_type = u64)]
    pub id: BookId,
    /// The title of your book.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = String)]
    pub title: Option<Value>,
    /// Who wrote the book?
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = String)]
    pub author: Option<Value>,
    /// Have you finished reading it?
    #[serde(default = "unfinished")]
    #[schema(value_type = bool)]
    pub finished: Value,
    /// The date of the record creation.
    #[serde(with = "timestamp")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
}

impl Book {
    /// Build a fresh record from a create request.
    pub fn new(id: BookId, draft: CreateBook, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            title: draft.title,
            author: draft.author,
            finished: draft.finished.unwrap_or_else(unfinished),
            created_at,
        }
    }

    /// Return the record with every provided field of `changes` applied.
    pub fn patched(&self, changes: UpdateBook) -> Self {
        Self {
            id: self.id,
            title: changes.title.or_else(|| self.title.clone()),
            author: changes.author.or_else(|| self.author.clone()),
            finished: changes.finished.unwrap_or_else(|| self.finished.clone()),
            created_at: self.created_at,
        }
    }
}

fn unfinished() -> Value {
    Value::Bool(false)
}

/// Request model for creating a new book.
///
/// `None` means the field was absent from the body; an explicit `null`
/// arrives as `Some(Value::Null)`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[schema(example = json!({
    "title": "The Pragmatic Programmer",
    "author": "Andy Hunt / Dave Thomas",
    "finished": true
}))]
pub struct CreateBook {
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = String)]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = String)]
    pub author: Option<Value>,
    /// Defaults to `false` when omitted.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<bool>)]
    pub finished: Option<Value>,
}

/// Request model for updating a book; omitted fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct UpdateBook {
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub author: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<bool>)]
    pub finished: Option<Value>,
}

/// Marks a field as provided whenever its key is present, `null` included.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// `createdAt` wire format: UTC, millisecond precision, `Z` suffix.
mod timestamp {
    use serde::{de, ser, Deserialize, Deserializer, Serializer};
    use time::{
        format_description::{well_known::Rfc3339, FormatItem},
        macros::format_description,
        OffsetDateTime, UtcOffset,
    };

    const FORMAT: &[FormatItem<'static>] = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    );

    pub fn serialize<S>(at: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = at
            .to_offset(UtcOffset::UTC)
            .format(FORMAT)
            .map_err(ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&raw, &Rfc3339).map_err(de::Error::custom)
    }
}
