//! Field decoders for loosely typed payloads. Each one goes through a
//! `serde_json::Value` and maps a value of the wrong JSON type to absent
//! instead of failing the record it belongs to.

use crate::precision::PrecisionTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

type Decoded<T, E> = std::result::Result<T, E>;

pub(crate) fn number<'de, D>(deserializer: D) -> Decoded<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

pub(crate) fn text<'de, D>(deserializer: D) -> Decoded<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

pub(crate) fn index<'de, D>(deserializer: D) -> Decoded<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_u64().and_then(|n| u32::try_from(n).ok()))
}

pub(crate) fn timestamp<'de, D>(deserializer: D) -> Decoded<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc)))
}

/// Null and blank tags count as absent so the tier gets inferred from the
/// place names. Any other non-string value is an unknown tag.
pub(crate) fn precision<'de, D>(deserializer: D) -> Decoded<Option<PrecisionTier>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(tag) if tag.trim().is_empty() => None,
        serde_json::Value::String(tag) => Some(PrecisionTier::normalize(&tag)),
        _ => Some(PrecisionTier::None),
    })
}
