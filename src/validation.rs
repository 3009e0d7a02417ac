//! Contact field validation shared by the gateway and the client session.
//!
//! One rule set covers both entry points so a request that passes in the
//! browser flow passes at the gateway, and the other way around.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const NAME_TOO_SHORT: &str = "Ad Soyad en az 2 karakter olmalı";
pub const PHONE_TOO_SHORT: &str = "Telefon numarası en az 10 haneli olmalı";

lazy_static! {
    static ref NON_DIGIT: Regex = Regex::new(r"[^0-9]").unwrap();
}

/// Form field a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Phone,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Name => f.write_str("name"),
            Field::Phone => f.write_str("phone"),
        }
    }
}

/// Field-level validation messages. An empty collection means the input is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// Ok if no errors were collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, message)| format!("[{}] {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Thresholds for the contact fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactRules {
    /// Minimum name length in characters, measured after trimming.
    pub min_name_chars: usize,
    /// Minimum number of digits left after stripping everything else.
    pub min_phone_digits: usize,
}

impl Default for ContactRules {
    fn default() -> Self {
        Self {
            min_name_chars: 2,
            min_phone_digits: 10,
        }
    }
}

impl ContactRules {
    pub fn check(&self, name: &str, phone: &str) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if name.trim().chars().count() < self.min_name_chars {
            errors.add(Field::Name, NAME_TOO_SHORT);
        }

        if phone_digits(phone).chars().count() < self.min_phone_digits {
            errors.add(Field::Phone, PHONE_TOO_SHORT);
        }

        errors
    }
}

/// Validate a name/phone pair with the default rules.
pub fn validate(name: &str, phone: &str) -> ValidationErrors {
    ContactRules::default().check(name, phone)
}

/// True when both fields carry a non-empty value. No length or digit rules.
pub fn presence(name: Option<&str>, phone: Option<&str>) -> bool {
    matches!((name, phone), (Some(n), Some(p)) if !n.is_empty() && !p.is_empty())
}

/// ASCII digits of a phone number; separators, spaces, `+` and any other
/// script's digits are removed.
pub fn phone_digits(phone: &str) -> String {
    NON_DIGIT.replace_all(phone, "").into_owned()
}
