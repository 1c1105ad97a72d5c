use crate::error::{Result, TelemetryError, json_kind};
use crate::lenient;
use crate::precision::PrecisionTier;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;
use tracing::debug;

const MAX_LONGITUDE: f64 = 180.0;
const MAX_LATITUDE: f64 = 90.0;

/// One router hop in a trace, as reported by the probe backend.
///
/// Decoding accepts the snake_case and camelCase field names the backend has
/// emitted over time, plus the geolocation keys of its GeoIP lookup
/// (`city_en`, `subdiv`, `subdiv_en`, `country_en`). A field of the wrong
/// JSON type decodes as absent; only a bad coordinate keeps a hop off the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "WireHop")]
pub struct HopRecord {
    /// 1-based position along the path. Zero means "not given".
    #[serde(rename = "hop")]
    pub hop_index: u32,
    pub host: String,
    pub ip: String,
    pub lon: f64,
    pub lat: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_localized: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdivision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdivision_localized: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_precision: Option<PrecisionTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_last: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_avg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_best: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_worst: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loss_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isp: Option<String>,
}

impl HopRecord {
    /// A hop with only identity fields set; coordinates start out invalid.
    pub fn new(hop_index: u32, host: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            hop_index,
            host: host.into(),
            ip: ip.into(),
            lon: f64::NAN,
            lat: f64::NAN,
            city: None,
            city_localized: None,
            subdivision: None,
            subdivision_localized: None,
            country: None,
            geo_precision: None,
            latency_last: None,
            latency_avg: None,
            latency_best: None,
            latency_worst: None,
            loss_percent: None,
            asn: None,
            isp: None,
        }
    }

    pub fn with_coordinates(mut self, lon: f64, lat: f64) -> Self {
        self.lon = lon;
        self.lat = lat;
        self
    }

    pub fn with_precision(mut self, precision: PrecisionTier) -> Self {
        self.geo_precision = Some(precision);
        self
    }

    /// Inside the world box on both axes and not the (0, 0) placeholder
    /// geocoders emit on a miss. NaN and infinities fall outside the box.
    pub fn has_valid_coordinates(&self) -> bool {
        (-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&self.lon)
            && (-MAX_LATITUDE..=MAX_LATITUDE).contains(&self.lat)
            && !(self.lon == 0.0 && self.lat == 0.0)
    }
}

// Missing coordinates are NaN, so equality treats NaN as equal to NaN;
// otherwise a hop would never compare equal to its own clone.
impl PartialEq for HopRecord {
    fn eq(&self, other: &Self) -> bool {
        same_coordinate(self.lon, other.lon)
            && same_coordinate(self.lat, other.lat)
            && self.hop_index == other.hop_index
            && self.host == other.host
            && self.ip == other.ip
            && self.city == other.city
            && self.city_localized == other.city_localized
            && self.subdivision == other.subdivision
            && self.subdivision_localized == other.subdivision_localized
            && self.country == other.country
            && self.geo_precision == other.geo_precision
            && self.latency_last == other.latency_last
            && self.latency_avg == other.latency_avg
            && self.latency_best == other.latency_best
            && self.latency_worst == other.latency_worst
            && self.loss_percent == other.loss_percent
            && self.asn == other.asn
            && self.isp == other.isp
    }
}

fn same_coordinate(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// Immutable result of one traceroute against one target.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TraceSnapshot {
    pub target: String,
    /// Ascending by `hop_index`, one record per index.
    pub hops: Vec<HopRecord>,
    pub truncated: bool,
}

impl TraceSnapshot {
    /// Builds a snapshot in hop order. Hops without an index take their
    /// 1-based input position unless another hop claims that index, in which
    /// case they go after the highest index in use. On a collision between
    /// given indices the later record wins.
    pub fn new(target: impl Into<String>, hops: Vec<HopRecord>, truncated: bool) -> Self {
        let positioned = hops
            .into_iter()
            .enumerate()
            .map(|(idx, hop)| (idx as u32 + 1, hop))
            .collect();
        Self::from_positioned(target, positioned, truncated)
    }

    fn from_positioned(
        target: impl Into<String>,
        hops: Vec<(u32, HopRecord)>,
        truncated: bool,
    ) -> Self {
        let claimed: BTreeSet<u32> = hops
            .iter()
            .map(|(_, hop)| hop.hop_index)
            .filter(|&index| index != 0)
            .collect();

        let mut by_index: BTreeMap<u32, HopRecord> = BTreeMap::new();
        for (position, mut hop) in hops {
            if hop.hop_index == 0 {
                hop.hop_index = if claimed.contains(&position) || by_index.contains_key(&position) {
                    let highest_claimed = claimed.last().copied().unwrap_or(0);
                    let highest_filled = by_index.keys().next_back().copied().unwrap_or(0);
                    highest_claimed.max(highest_filled).saturating_add(1)
                } else {
                    position
                };
                debug!("Hop at position {} has no index, using {}", position, hop.hop_index);
            }
            if let Some(replaced) = by_index.insert(hop.hop_index, hop) {
                debug!(
                    "Duplicate hop index {} in trace, keeping the later record",
                    replaced.hop_index
                );
            }
        }

        Self {
            target: target.into(),
            hops: by_index.into_values().collect(),
            truncated,
        }
    }

    /// Decodes a trace document. A JSON string holding a document is unwrapped
    /// once. Hop entries that are not objects are skipped.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let unwrapped;
        let value = match value {
            serde_json::Value::String(raw) => {
                unwrapped = serde_json::from_str::<serde_json::Value>(raw)?;
                &unwrapped
            }
            other => other,
        };

        let object = value
            .as_object()
            .ok_or_else(|| TelemetryError::NotAnObject(json_kind(value)))?;

        let raw_hops = object
            .get("hops")
            .and_then(|v| v.as_array())
            .ok_or(TelemetryError::MissingHops)?;

        let hops = raw_hops
            .iter()
            .enumerate()
            .filter_map(|(idx, raw)| {
                let position = idx as u32 + 1;
                if !raw.is_object() {
                    debug!("Skipping hop at position {}: {}", position, json_kind(raw));
                    return None;
                }
                match HopRecord::deserialize(raw) {
                    Ok(hop) => Some((position, hop)),
                    Err(e) => {
                        debug!("Skipping undecodable hop at position {}: {}", position, e);
                        None
                    }
                }
            })
            .collect();

        let target = object
            .get("target")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let truncated = object
            .get("truncated")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        Ok(Self::from_positioned(target, hops, truncated))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        Self::from_value(&value)
    }

    /// Reads an `mtr --json` report. MTR carries no geolocation, so every hop
    /// is tagged `none` and none of them will project onto the map.
    pub fn from_mtr_report(value: &serde_json::Value, fallback_target: &str) -> Result<Self> {
        let report: MtrReport = serde_json::from_value(value.clone())?;

        let hops = report
            .report
            .hubs
            .into_iter()
            .enumerate()
            .map(|(idx, hub)| {
                let ip = if hub.host.parse::<IpAddr>().is_ok() {
                    hub.host.clone()
                } else {
                    String::new()
                };
                let mut hop = HopRecord::new(idx as u32 + 1, hub.host, ip)
                    .with_precision(PrecisionTier::None);
                hop.loss_percent = hub.loss;
                hop.latency_last = hub.last;
                hop.latency_avg = hub.avg;
                hop.latency_best = hub.best;
                hop.latency_worst = hub.worst;
                hop.asn = hub.asn.filter(|asn| !asn.is_empty() && asn != "AS???");
                hop
            })
            .collect();

        let target = if report.report.mtr.dst.is_empty() {
            fallback_target.to_string()
        } else {
            report.report.mtr.dst
        };

        Ok(Self::new(target, hops, false))
    }
}

/// Trace input as handed over by the retrieval side: nothing yet, an already
/// decoded snapshot, or a payload that still has to be interpreted.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TraceInput {
    #[default]
    Absent,
    Snapshot(TraceSnapshot),
    Raw(serde_json::Value),
}

impl TraceInput {
    /// The snapshot this input stands for. Payloads that cannot be decoded
    /// resolve to `None`, the same as an absent trace.
    pub fn resolve(&self) -> Option<Cow<'_, TraceSnapshot>> {
        match self {
            TraceInput::Absent => None,
            TraceInput::Snapshot(snapshot) => Some(Cow::Borrowed(snapshot)),
            TraceInput::Raw(value) => match TraceSnapshot::from_value(value) {
                Ok(snapshot) => Some(Cow::Owned(snapshot)),
                Err(e) => {
                    debug!("Treating trace payload as absent: {}", e);
                    None
                }
            },
        }
    }
}

impl From<TraceSnapshot> for TraceInput {
    fn from(snapshot: TraceSnapshot) -> Self {
        TraceInput::Snapshot(snapshot)
    }
}

impl From<Option<TraceSnapshot>> for TraceInput {
    fn from(snapshot: Option<TraceSnapshot>) -> Self {
        snapshot.map_or(TraceInput::Absent, TraceInput::Snapshot)
    }
}

#[derive(Debug, Deserialize)]
struct MtrReport {
    report: MtrBody,
}

#[derive(Debug, Deserialize)]
struct MtrBody {
    #[serde(default)]
    mtr: MtrHeader,
    #[serde(default)]
    hubs: Vec<MtrHub>,
}

#[derive(Debug, Default, Deserialize)]
struct MtrHeader {
    #[serde(default)]
    dst: String,
}

#[derive(Debug, Deserialize)]
struct MtrHub {
    #[serde(rename = "host", alias = "Host", default)]
    host: String,
    #[serde(rename = "Loss%", default, deserialize_with = "lenient::number")]
    loss: Option<f64>,
    #[serde(rename = "Last", default, deserialize_with = "lenient::number")]
    last: Option<f64>,
    #[serde(rename = "Avg", default, deserialize_with = "lenient::number")]
    avg: Option<f64>,
    #[serde(rename = "Best", default, deserialize_with = "lenient::number")]
    best: Option<f64>,
    #[serde(rename = "Wrst", default, deserialize_with = "lenient::number")]
    worst: Option<f64>,
    #[serde(rename = "ASN", default, deserialize_with = "lenient::text")]
    asn: Option<String>,
}

/// A hop as it appears on the wire. Every alternate key is read on its own so
/// a document carrying several spellings still decodes.
#[derive(Debug, Default, Deserialize)]
struct WireHop {
    #[serde(default, deserialize_with = "lenient::index")]
    hop: Option<u32>,
    #[serde(default, deserialize_with = "lenient::index")]
    hop_index: Option<u32>,
    #[serde(rename = "hopIndex", default, deserialize_with = "lenient::index")]
    camel_hop_index: Option<u32>,

    #[serde(default, deserialize_with = "lenient::text")]
    host: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    ip: Option<String>,

    #[serde(default, deserialize_with = "lenient::number")]
    lon: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    latitude: Option<f64>,

    #[serde(default, deserialize_with = "lenient::text")]
    city: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    city_en: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    city_localized: Option<String>,
    #[serde(rename = "cityLocalized", default, deserialize_with = "lenient::text")]
    camel_city_localized: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    subdivision: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    subdiv: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    subdiv_en: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    subdivision_localized: Option<String>,
    #[serde(rename = "subdivisionLocalized", default, deserialize_with = "lenient::text")]
    camel_subdivision_localized: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    country: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    country_en: Option<String>,

    #[serde(default, deserialize_with = "lenient::precision")]
    geo_precision: Option<PrecisionTier>,
    #[serde(rename = "geoPrecision", default, deserialize_with = "lenient::precision")]
    camel_geo_precision: Option<PrecisionTier>,
    #[serde(default, deserialize_with = "lenient::precision")]
    precision: Option<PrecisionTier>,

    #[serde(default, deserialize_with = "lenient::number")]
    latency_last: Option<f64>,
    #[serde(rename = "latencyLast", default, deserialize_with = "lenient::number")]
    camel_latency_last: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    latency_avg: Option<f64>,
    #[serde(rename = "latencyAvg", default, deserialize_with = "lenient::number")]
    camel_latency_avg: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    latency_best: Option<f64>,
    #[serde(rename = "latencyBest", default, deserialize_with = "lenient::number")]
    camel_latency_best: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    latency_worst: Option<f64>,
    #[serde(rename = "latencyWorst", default, deserialize_with = "lenient::number")]
    camel_latency_worst: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    loss_percent: Option<f64>,
    #[serde(rename = "lossPercent", default, deserialize_with = "lenient::number")]
    camel_loss_percent: Option<f64>,

    #[serde(default, deserialize_with = "lenient::text")]
    asn: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    isp: Option<String>,
}

impl From<WireHop> for HopRecord {
    fn from(wire: WireHop) -> Self {
        // GeoIP lookups put the localized name under the plain key and the
        // English one under `_en`. Without an `_en` key the plain key is the
        // fallback name.
        let geoip_city = wire.city_en.is_some();
        let geoip_subdivision = wire.subdiv_en.is_some();

        let (city, city_from_geoip) = if geoip_city {
            (wire.city_en, wire.city)
        } else {
            (wire.city, None)
        };
        let (subdivision, subdivision_from_geoip) = if geoip_subdivision {
            (wire.subdiv_en, wire.subdiv.or(wire.subdivision))
        } else {
            (wire.subdivision.or(wire.subdiv), None)
        };

        Self {
            hop_index: wire.hop.or(wire.hop_index).or(wire.camel_hop_index).unwrap_or(0),
            host: wire.host.unwrap_or_default(),
            ip: wire.ip.unwrap_or_default(),
            lon: wire.lon.or(wire.longitude).unwrap_or(f64::NAN),
            lat: wire.lat.or(wire.latitude).unwrap_or(f64::NAN),
            city,
            city_localized: wire
                .city_localized
                .or(wire.camel_city_localized)
                .or(city_from_geoip),
            subdivision,
            subdivision_localized: wire
                .subdivision_localized
                .or(wire.camel_subdivision_localized)
                .or(subdivision_from_geoip),
            country: wire.country_en.or(wire.country),
            geo_precision: wire
                .geo_precision
                .or(wire.camel_geo_precision)
                .or(wire.precision),
            latency_last: wire.latency_last.or(wire.camel_latency_last),
            latency_avg: wire.latency_avg.or(wire.camel_latency_avg),
            latency_best: wire.latency_best.or(wire.camel_latency_best),
            latency_worst: wire.latency_worst.or(wire.camel_latency_worst),
            loss_percent: wire.loss_percent.or(wire.camel_loss_percent),
            asn: wire.asn,
            isp: wire.isp,
        }
    }
}
