//! Members (integrantes) and their identity fields

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::double_option;
use super::ValidationError;

/// Loose e-mail shape check: something@something.tld, no whitespace
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email regex"));

/// Document id (CPF) normalized to digits only
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cpf(String);

impl Cpf {
    /// Strip every non-digit character.
    ///
    /// # Example
    /// ```
    /// use escala_server::models::Cpf;
    ///
    /// let cpf = Cpf::new("123.456.789-00").unwrap();
    /// assert_eq!(cpf.as_str(), "12345678900");
    /// assert!(Cpf::new("--").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let digits: String = s.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(ValidationError::Empty { field: "CPF" });
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Validated e-mail address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "E-mail" });
        }
        if !EMAIL_RE.is_match(trimmed) {
            return Err(ValidationError::InvalidFormat {
                field: "E-mail",
                reason: "formato esperado nome@dominio.com",
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Public member shape. Has no password field, so read paths cannot
/// carry a hash even if a query selects one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberRecord {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    pub cpf: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
}

/// Insert shape, password already hashed
#[derive(Debug, Clone)]
pub struct NewMember {
    pub name: String,
    pub cpf: Cpf,
    pub email: Email,
    pub phone: Option<String>,
    pub password_hash: String,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct MemberChanges {
    pub name: Option<String>,
    pub cpf: Option<Cpf>,
    pub email: Option<Email>,
    /// `Some(None)` clears the phone
    pub phone: Option<Option<String>>,
    pub password_hash: Option<String>,
}

/// POST and PUT /integrantes body (every field optional at parse time)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberPayload {
    #[serde(default, alias = "name")]
    pub nome: Option<String>,
    #[serde(default, alias = "externalDocId")]
    pub cpf: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option", alias = "phone")]
    pub telefone: Option<Option<String>>,
    #[serde(default, alias = "password")]
    pub senha: Option<String>,
}

impl MemberPayload {
    pub fn is_empty(&self) -> bool {
        self.nome.is_none()
            && self.cpf.is_none()
            && self.email.is_none()
            && self.telefone.is_none()
            && self.senha.is_none()
    }
}
