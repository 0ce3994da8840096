//! Input validation helpers shared by the request payloads

use std::fmt;

use serde::{Deserialize, Deserializer};

/// Validation error for domain values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is missing or blank
    Empty { field: &'static str },

    /// Value doesn't match the required format
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Number outside the accepted range
    OutOfRange { field: &'static str, min: i64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} é obrigatório", field),
            Self::InvalidFormat { field, reason } => write!(f, "{} inválido: {}", field, reason),
            Self::OutOfRange { field, min } => {
                write!(f, "{} deve ser maior ou igual a {}", field, min)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Trim a text field, treating blank strings as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Deserialize a field that distinguishes "absent" from explicit `null`.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`:
/// absent -> `None`, `null` -> `Some(None)`, value -> `Some(Some(v))`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
