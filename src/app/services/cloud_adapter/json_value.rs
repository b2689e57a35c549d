//! Lenient JSON number handling
//!
//! The vendor sends measurements as numbers, numeric strings, `"--"` or null
//! depending on API generation and sensor.

use serde::{Deserialize, Deserializer};

use crate::app::services::field_parsers::parse_optional_float;
use crate::{Error, Result};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl NumberOrText {
    fn into_f64(self) -> Option<f64> {
        match self {
            NumberOrText::Number(n) => Some(n).filter(|v| v.is_finite()),
            NumberOrText::Text(s) => parse_optional_float(&s, false),
            NumberOrText::Other(_) => None,
        }
    }
}

/// `deserialize_with` target accepting a number, a numeric string or anything else as `None`
pub fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrText>::deserialize(deserializer)?.and_then(NumberOrText::into_f64))
}

/// Like [`lenient_f64`] but truncating to an integer
pub fn lenient_i64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?.map(|v| v as i64))
}

/// Parse an upstream body, tagging failures with the calling context
pub fn parse_body<T: serde::de::DeserializeOwned>(context: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::decode(context, e))
}
