use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

/// Rejection of submitted form data before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required.")]
    Required(&'static str),
    #[error("{0} must be a whole number.")]
    NotANumber(&'static str),
    #[error("{0} has an unknown value '{1}'.")]
    InvalidChoice(&'static str, String),
}

/// Raw submitted field values keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData {
    values: BTreeMap<String, String>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Overlay every value of `other` onto this form
    pub fn merge(&mut self, other: &FormData) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
    }

    /// Parse `key=value` pairs as given on the command line
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut form = FormData::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("Expected key=value, got '{}'", pair))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(format!("Missing field name in '{}'", pair));
            }
            form.set(name, value);
        }
        Ok(form)
    }

    fn trimmed(&self, name: &str) -> &str {
        self.get(name).map(str::trim).unwrap_or("")
    }

    pub fn required_text(&self, name: &str, label: &'static str) -> Result<String, ValidationError> {
        let value = self.trimmed(name);
        if value.is_empty() {
            return Err(ValidationError::Required(label));
        }
        Ok(value.to_string())
    }

    pub fn optional_text(&self, name: &str) -> String {
        self.trimmed(name).to_string()
    }

    /// Blank means 1; anything below 1 is clamped up to 1
    pub fn positive_int(&self, name: &str, label: &'static str) -> Result<u32, ValidationError> {
        let value = self.trimmed(name);
        if value.is_empty() {
            return Ok(1);
        }
        let parsed: i64 = value.parse().map_err(|_| ValidationError::NotANumber(label))?;
        Ok(parsed.clamp(1, i64::from(u32::MAX)) as u32)
    }

    pub fn checkbox(&self, name: &str) -> bool {
        matches!(
            self.trimmed(name).to_ascii_lowercase().as_str(),
            "on" | "true" | "1" | "yes"
        )
    }

    /// Blank selects the type's default
    pub fn choice<T>(&self, name: &str, label: &'static str) -> Result<T, ValidationError>
    where
        T: FromStr + Default,
    {
        let value = self.trimmed(name);
        if value.is_empty() {
            return Ok(T::default());
        }
        value
            .parse()
            .map_err(|_| ValidationError::InvalidChoice(label, value.to_string()))
    }

    pub fn tags(&self, name: &str) -> Vec<String> {
        split_tags(self.trimmed(name))
    }
}

/// Split a comma-joined tag list, dropping blanks and keeping order
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join tags for storage; the inverse of [`split_tags`] for clean input
pub fn join_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}
