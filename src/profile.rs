//! The candidate profile record and its request validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

pub const NAME: &str = "Name";
pub const TITLE: &str = "Title";
pub const TARGETED_KEYWORDS: &str = "Targeted Keywords";
pub const EDUCATION: &str = "Education";
pub const CERTIFICATION: &str = "Certification";
pub const CONTACT: &str = "Contact";

/// Required fields in declared order. Error messages, row columns and the
/// listing output all follow this order.
pub const REQUIRED_FIELDS: [&str; 6] =
    [NAME, TITLE, TARGETED_KEYWORDS, EDUCATION, CERTIFICATION, CONTACT];

/// A submitted candidate profile.
///
/// Keys beyond the six required ones are kept in `extra` so the structured
/// store holds the object exactly as submitted; the row store ignores them.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Profile {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Targeted Keywords")]
    pub targeted_keywords: Vec<String>,
    #[serde(rename = "Education")]
    pub education: String,
    #[serde(rename = "Certification")]
    pub certification: String,
    #[serde(rename = "Contact")]
    pub contact: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    /// Parses and validates a raw request body.
    ///
    /// Checks run in order and the first failing stage wins: JSON syntax
    /// (and object shape), then presence of every required field, then the
    /// type of each required field.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::MalformedInput)?;
        Self::from_value(value)
    }

    /// Validates an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        let Value::Object(mut obj) = value else {
            return Err(ApiError::MalformedInput);
        };

        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .into_iter()
            .filter(|f| !obj.contains_key(*f))
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::MissingFields(missing));
        }

        // Type errors are reported in declared order as well.
        let name = take_text(&mut obj, NAME)?;
        let title = take_text(&mut obj, TITLE)?;
        let targeted_keywords = take_keywords(&mut obj)?;
        let education = take_text(&mut obj, EDUCATION)?;
        let certification = take_text(&mut obj, CERTIFICATION)?;
        let contact = take_text(&mut obj, CONTACT)?;

        Ok(Self {
            name,
            title,
            targeted_keywords,
            education,
            certification,
            contact,
            extra: obj,
        })
    }

    /// Keywords as they appear in a row: comma-joined.
    pub fn joined_keywords(&self) -> String {
        self.targeted_keywords.join(",")
    }
}

fn take_text(obj: &mut Map<String, Value>, field: &'static str) -> Result<String, ApiError> {
    match obj.remove(field) {
        Some(Value::String(s)) => Ok(s),
        _ => Err(ApiError::InvalidFieldType(field)),
    }
}

fn take_keywords(obj: &mut Map<String, Value>) -> Result<Vec<String>, ApiError> {
    let Some(Value::Array(items)) = obj.remove(TARGETED_KEYWORDS) else {
        return Err(ApiError::InvalidFieldType(TARGETED_KEYWORDS));
    };
    items
        .into_iter()
        .map(|v| match v {
            Value::String(s) => Ok(s),
            _ => Err(ApiError::InvalidFieldType(TARGETED_KEYWORDS)),
        })
        .collect()
}
