//! Lenient decoders for backend payloads.
//!
//! The backend is not strict about representations: ids arrive as numbers or
//! strings, timestamps as RFC 3339 or SQLite `YYYY-MM-DD HH:MM:SS`, and dates
//! as plain dates or full datetimes.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const SQLITE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const UNRECOGNIZED_OPTION_DROPPED: &str = "UNRECOGNIZED_OPTION_DROPPED";

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, SQLITE_DATETIME_FORMAT)
                .ok()
                .map(|naive| naive.and_utc())
        })
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw).map(|dt| dt.date_naive()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
        }
    }
}

pub fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(StringOrNumber::into_string)
}

pub fn optional_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(StringOrNumber::into_string))
}

/// Accepts a number or a numeric string such as `"1,200"` or `"$980"`.
pub fn optional_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.and_then(|value| match value {
            StringOrNumber::Integer(value) => Some(value as f64),
            StringOrNumber::Float(value) => Some(value),
            StringOrNumber::Text(text) => {
                let digits: String = text
                    .chars()
                    .skip_while(|ch| !ch.is_ascii_digit())
                    .take_while(|ch| ch.is_ascii_digit() || *ch == ',' || *ch == '.')
                    .filter(|ch| *ch != ',')
                    .collect();
                digits.parse().ok()
            }
        }),
    )
}

pub fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{raw}`")))
}

/// Unparseable timestamps decode as `None` rather than failing the payload.
pub fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|raw| parse_timestamp(&raw)))
}

pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|raw| parse_date(&raw)))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagOrText {
    Flag(bool),
    Text(String),
}

/// Decodes a keyword option; blank and unrecognised values become `None`.
///
/// Booleans are parsed through their `"true"`/`"false"` spelling.
pub fn optional_keyword<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = match Option::<FlagOrText>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(FlagOrText::Flag(flag)) => flag.to_string(),
        Some(FlagOrText::Text(text)) => text,
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }

    match raw.parse() {
        Ok(value) => Ok(Some(value)),
        Err(error) => {
            tracing::debug!(
                code = UNRECOGNIZED_OPTION_DROPPED,
                value = %raw,
                reason = %error,
                "dropping unrecognised option value"
            );
            Ok(None)
        }
    }
}
