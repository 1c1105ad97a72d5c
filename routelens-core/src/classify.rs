// Precision tier and display label for a single hop

use crate::model::Language;
use routelens_telemetry::{HopRecord, PrecisionTier};

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub precision: PrecisionTier,
    pub label: String,
}

pub fn classify(hop: &HopRecord, language: Language) -> Classification {
    Classification {
        precision: precision_tier(hop),
        label: display_label(hop, language),
    }
}

/// An explicit tag wins (already normalized at ingestion). Otherwise the
/// finest named level present decides, bottoming out at country.
pub fn precision_tier(hop: &HopRecord) -> PrecisionTier {
    if let Some(explicit) = hop.geo_precision {
        return explicit;
    }

    if non_blank(hop.city.as_deref()).or(non_blank(hop.city_localized.as_deref())).is_some() {
        PrecisionTier::City
    } else if non_blank(hop.subdivision.as_deref())
        .or(non_blank(hop.subdivision_localized.as_deref()))
        .is_some()
    {
        PrecisionTier::Subdivision
    } else {
        PrecisionTier::Country
    }
}

/// First non-blank of the place names for `language`, then host, then ip.
pub fn display_label(hop: &HopRecord, language: Language) -> String {
    let (city, subdivision) = match language {
        Language::Primary => (&hop.city_localized, &hop.subdivision_localized),
        Language::Fallback => (&hop.city, &hop.subdivision),
    };

    [
        city.as_deref(),
        subdivision.as_deref(),
        Some(hop.host.as_str()),
        Some(hop.ip.as_str()),
    ]
    .into_iter()
    .find_map(non_blank)
    .unwrap_or_default()
    .to_string()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
