//! Row codec: one [`Profile`] ↔ one CSV row.
//!
//! Columns are the six required fields in declared order, with the keyword
//! list joined by `,` into a single column. The keyword column is always
//! quoted; every other field only when it contains a delimiter, quote or
//! line break. Embedded quotes are doubled, so any text survives a round
//! trip. The keyword list does not: `["a,b"]` and `["a", "b"]` both decode
//! to `"a,b"`.
//!
//! Rows carry no header. Readers supply [`REQUIRED_FIELDS`] as column names.

use csv::{QuoteStyle, StringRecord, Terminator, WriterBuilder};
use serde::Serialize;
use thiserror::Error;

use crate::profile::{Profile, REQUIRED_FIELDS};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("row buffer: {0}")]
    Buffer(String),

    #[error("row has {found} fields, expected {}", REQUIRED_FIELDS.len())]
    FieldCount { found: usize },
}

/// One decoded row as returned by the listing endpoint.
///
/// Serializes as an object keyed by column name, in column order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ProfileRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Targeted Keywords")]
    pub targeted_keywords: String,
    #[serde(rename = "Education")]
    pub education: String,
    #[serde(rename = "Certification")]
    pub certification: String,
    #[serde(rename = "Contact")]
    pub contact: String,
}

/// Encodes `profile` as one `\n`-terminated row.
pub fn encode(profile: &Profile) -> Result<Vec<u8>, CodecError> {
    encode_rows(std::iter::once(profile))
}

/// Encodes several profiles back to back, as used when rebuilding the row
/// store.
pub fn encode_rows<'a>(profiles: impl IntoIterator<Item = &'a Profile>) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    for p in profiles {
        let keywords = p.joined_keywords();
        let columns = [
            (p.name.as_str(), QuoteStyle::Necessary),
            (p.title.as_str(), QuoteStyle::Necessary),
            (keywords.as_str(), QuoteStyle::Always),
            (p.education.as_str(), QuoteStyle::Necessary),
            (p.certification.as_str(), QuoteStyle::Necessary),
            (p.contact.as_str(), QuoteStyle::Necessary),
        ];
        for (i, (value, style)) in columns.into_iter().enumerate() {
            if i > 0 {
                out.push(b',');
            }
            out.extend(field(value, style)?);
        }
        out.push(b'\n');
    }
    Ok(out)
}

/// One escaped field, without delimiter or terminator.
///
/// The writer only closes a quoted field when the record ends, so the field
/// is written as a one-column record and the terminator dropped.
fn field(value: &str, style: QuoteStyle) -> Result<Vec<u8>, CodecError> {
    // A lone empty field would come out as `""`.
    if value.is_empty() && matches!(style, QuoteStyle::Necessary) {
        return Ok(Vec::new());
    }
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .quote_style(style)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record([value])?;
    let mut out = wtr.into_inner().map_err(|e| CodecError::Buffer(e.error().to_string()))?;
    out.pop();
    Ok(out)
}

/// Decodes one parsed record into a [`ProfileRow`].
pub fn decode(record: &StringRecord) -> Result<ProfileRow, CodecError> {
    if record.len() != REQUIRED_FIELDS.len() {
        return Err(CodecError::FieldCount { found: record.len() });
    }
    let field = |i: usize| record.get(i).unwrap_or_default().to_owned();
    Ok(ProfileRow {
        name: field(0),
        title: field(1),
        targeted_keywords: field(2),
        education: field(3),
        certification: field(4),
        contact: field(5),
    })
}

/// True when `record` is exactly the column-name row. Such a row may exist
/// if a header was added to the file by hand; readers skip it.
pub fn is_header(record: &StringRecord) -> bool {
    record.iter().eq(REQUIRED_FIELDS.iter().copied())
}
