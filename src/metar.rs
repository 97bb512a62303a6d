/*
 *  metar.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  METAR record parsing - visibility, ceiling and per-cycle snapshots
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::category::{classify, FlightCategory};
use crate::stations::StationId;

/// Visibility assumed when a report has none, or one we cannot read.
/// Treated as unlimited, so a missing value never downgrades a station.
pub const DEFAULT_VISIBILITY_SM: f64 = 10.0;

/// One cloud layer as reported upstream
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CloudLayer {
    #[serde(default, deserialize_with = "lenient_string")]
    pub cover: Option<String>,
    /// feet AGL; integral or float upstream, negative values dropped
    #[serde(default, deserialize_with = "lenient_height")]
    pub base: Option<u32>,
}

/// One upstream report record (aviationweather.gov data API, json format)
///
/// Only visibility and clouds feed the category. Every other field is read
/// leniently: a value of the wrong type becomes `None` instead of failing
/// the whole record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawObservation {
    #[serde(default, deserialize_with = "lenient_string")]
    pub icao_id: Option<String>,
    /// "10+", "1/2", "3" or a bare number depending on the station
    #[serde(default)]
    pub visib: Option<Value>,
    #[serde(default, deserialize_with = "lenient_layers")]
    pub clouds: Option<Vec<CloudLayer>>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub dewp: Option<f64>,
    /// degrees, or "VRB"
    #[serde(default)]
    pub wdir: Option<Value>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub wspd: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub altim: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub report_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub raw_ob: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub most_recent: Option<Value>,
}

fn number_from(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|x| x.is_finite())
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(number_from(&Value::deserialize(d)?))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_height<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(number_from(&Value::deserialize(d)?)
        .map(f64::round)
        .filter(|ft| (0.0..=u32::MAX as f64).contains(ft))
        .map(|ft| ft as u32))
}

/// Layers that do not decode are skipped, the rest are kept in order
fn lenient_layers<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<CloudLayer>>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| CloudLayer::deserialize(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

impl RawObservation {
    pub fn is_most_recent(&self) -> bool {
        match &self.most_recent {
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            Some(Value::Bool(b)) => *b,
            _ => false,
        }
    }
}

/// Classifier-ready observation for one station
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub visibility_sm: f64,
    pub ceiling_ft: Option<u32>,
    pub category: FlightCategory,
    pub temperature_c: Option<f64>,
    pub dewpoint_c: Option<f64>,
    pub wind_dir: Option<String>,
    pub wind_speed_kt: Option<f64>,
    pub altimeter: Option<f64>,
    pub report_time: Option<DateTime<Utc>>,
    pub raw_text: Option<String>,
    pub station_name: Option<String>,
}

impl Observation {
    /// Build from visibility/ceiling alone; detail fields empty
    pub fn new(visibility_sm: f64, ceiling_ft: Option<u32>) -> Self {
        Self {
            visibility_sm,
            ceiling_ft,
            category: classify(visibility_sm, ceiling_ft),
            temperature_c: None,
            dewpoint_c: None,
            wind_dir: None,
            wind_speed_kt: None,
            altimeter: None,
            report_time: None,
            raw_text: None,
            station_name: None,
        }
    }

    pub fn from_raw(raw: &RawObservation) -> Self {
        let visibility_sm = parse_visibility(raw.visib.as_ref());
        let ceiling_ft = parse_ceiling(raw.clouds.as_deref().unwrap_or(&[]));
        Self {
            temperature_c: raw.temp,
            dewpoint_c: raw.dewp,
            wind_dir: raw.wdir.as_ref().and_then(|v| match v {
                Value::Number(n) => Some(n.to_string()),
                Value::String(s) => Some(s.clone()),
                _ => None,
            }),
            wind_speed_kt: raw.wspd,
            altimeter: raw.altim,
            report_time: raw.report_time.as_deref().and_then(parse_report_time),
            raw_text: raw.raw_ob.clone(),
            station_name: raw.name.clone(),
            ..Observation::new(visibility_sm, ceiling_ft)
        }
    }
}

/// Station to observation for one acquisition cycle.
/// A station without a usable report is simply not present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherSnapshot {
    observations: BTreeMap<StationId, Observation>,
}

impl WeatherSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: StationId, obs: Observation) {
        self.observations.insert(id, obs);
    }

    pub fn get(&self, id: &StationId) -> Option<&Observation> {
        self.observations.get(id)
    }

    pub fn contains(&self, id: &StationId) -> bool {
        self.observations.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StationId, &Observation)> {
        self.observations.iter()
    }

    /// Drop every station not accepted by `keep`
    pub fn retain<F: FnMut(&StationId) -> bool>(&mut self, mut keep: F) {
        self.observations.retain(|id, _| keep(id));
    }

    /// Count of stations per category, in severity order
    pub fn category_counts(&self) -> Vec<(FlightCategory, usize)> {
        FlightCategory::ALL
            .iter()
            .map(|cat| (*cat, self.observations.values().filter(|o| o.category == *cat).count()))
            .collect()
    }
}

impl FromIterator<(StationId, Observation)> for WeatherSnapshot {
    fn from_iter<I: IntoIterator<Item = (StationId, Observation)>>(iter: I) -> Self {
        Self { observations: iter.into_iter().collect() }
    }
}

/// Visibility in statute miles from the upstream field
pub fn parse_visibility(visib: Option<&Value>) -> f64 {
    let parsed = match visib {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_visibility_str(s),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => DEFAULT_VISIBILITY_SM,
    }
}

fn parse_visibility_str(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s == "10+" {
        return Some(10.0);
    }
    if let Ok(v) = s.parse::<f64>() {
        return Some(v);
    }
    let (num, den) = s.split_once('/')?;
    let num = num.trim().parse::<f64>().ok()?;
    let den = den.trim().parse::<f64>().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

/// Height of the first broken or overcast layer, in report order
pub fn parse_ceiling(clouds: &[CloudLayer]) -> Option<u32> {
    clouds.iter().find_map(|layer| {
        let cover = layer.cover.as_deref()?.trim();
        if cover.eq_ignore_ascii_case("OVC") || cover.eq_ignore_ascii_case("BKN") {
            layer.base
        } else {
            None
        }
    })
}

/// Accepts RFC 3339 or "YYYY-MM-DD HH:MM:SS" (UTC)
pub fn parse_report_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Turn a decoded batch into a snapshot.
///
/// Only records flagged most-recent with a usable station identifier are
/// kept. Records that do not have the expected shape are skipped with a
/// warning; the rest of the batch still counts.
pub fn parse_batch(records: &[Value]) -> WeatherSnapshot {
    let mut snapshot = WeatherSnapshot::new();
    for record in records {
        let raw: RawObservation = match serde_json::from_value(record.clone()) {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping malformed METAR record: {}", e);
                continue;
            }
        };
        if !raw.is_most_recent() {
            continue;
        }
        let Some(icao) = raw.icao_id.as_deref().filter(|s| !s.trim().is_empty()) else {
            continue;
        };
        let id = match StationId::new(icao) {
            Ok(id) => id,
            Err(e) => {
                debug!("Ignoring record: {}", e);
                continue;
            }
        };
        if snapshot.contains(&id) {
            debug!("Duplicate most-recent report for {}, keeping the first", id);
            continue;
        }
        snapshot.insert(id, Observation::from_raw(&raw));
    }
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vis(v: Value) -> f64 {
        parse_visibility(Some(&v))
    }

    fn layer(cover: &str, base: Option<u32>) -> CloudLayer {
        CloudLayer { cover: Some(cover.to_string()), base }
    }

    #[test]
    fn test_visibility_fractions() {
        assert_eq!(vis(json!("1/2")), 0.5);
        assert_eq!(vis(json!("3/4")), 0.75);
        assert_eq!(vis(json!("1/4")), 0.25);
        assert_eq!(vis(json!("5/8")), 0.625);
    }

    #[test]
    fn test_visibility_ten_plus() {
        assert_eq!(vis(json!("10+")), 10.0);
        assert_eq!(vis(json!(" 10+ ")), 10.0);
    }

    #[test]
    fn test_visibility_numbers() {
        assert_eq!(vis(json!("3")), 3.0);
        assert_eq!(vis(json!("1.5")), 1.5);
        assert_eq!(vis(json!(6)), 6.0);
        assert_eq!(vis(json!(0.25)), 0.25);
    }

    #[test]
    fn test_visibility_defaults() {
        assert_eq!(parse_visibility(None), DEFAULT_VISIBILITY_SM);
        assert_eq!(vis(Value::Null), DEFAULT_VISIBILITY_SM);
        assert_eq!(vis(json!("")), DEFAULT_VISIBILITY_SM);
        assert_eq!(vis(json!("M")), DEFAULT_VISIBILITY_SM);
        assert_eq!(vis(json!("a/2")), DEFAULT_VISIBILITY_SM);
        assert_eq!(vis(json!("1/b")), DEFAULT_VISIBILITY_SM);
        assert_eq!(vis(json!("1 1/2")), DEFAULT_VISIBILITY_SM);
        assert_eq!(vis(json!("1/0")), DEFAULT_VISIBILITY_SM);
        assert_eq!(vis(json!("-2")), DEFAULT_VISIBILITY_SM);
        assert_eq!(vis(json!(true)), DEFAULT_VISIBILITY_SM);
    }

    #[test]
    fn test_ceiling_first_broken_or_overcast() {
        let clouds = vec![layer("SCT", Some(400)), layer("BKN", Some(1200)), layer("OVC", Some(800))];
        assert_eq!(parse_ceiling(&clouds), Some(1200));
    }

    #[test]
    fn test_ceiling_case_insensitive_and_needs_base() {
        let clouds = vec![layer("ovc", None), layer("few", Some(200)), layer("ovc", Some(2500))];
        assert_eq!(parse_ceiling(&clouds), Some(2500));
    }

    #[test]
    fn test_ceiling_absent() {
        assert_eq!(parse_ceiling(&[]), None);
        assert_eq!(parse_ceiling(&[layer("CLR", None)]), None);
        assert_eq!(parse_ceiling(&[layer("FEW", Some(300)), layer("SCT", Some(900))]), None);
        assert_eq!(parse_ceiling(&[CloudLayer::default()]), None);
    }

    #[test]
    fn test_report_time_formats() {
        let a = parse_report_time("2025-03-01T12:53:00.000Z").unwrap();
        let b = parse_report_time("2025-03-01 12:53:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_report_time("yesterday").is_none());
    }

    #[test]
    fn test_batch_keeps_only_most_recent() {
        let records = vec![
            json!({"icaoId": "KBOS", "mostRecent": 0, "visib": "1/2", "clouds": []}),
            json!({"icaoId": "KBOS", "mostRecent": 1, "visib": "10+", "clouds": [{"cover": "BKN", "base": 2500}]}),
            json!({"icaoId": "KORH", "mostRecent": 0, "visib": "10+"}),
        ];
        let snap = parse_batch(&records);
        assert_eq!(snap.len(), 1);
        let bos = snap.get(&StationId::new("KBOS").unwrap()).unwrap();
        assert_eq!(bos.ceiling_ft, Some(2500));
        assert_eq!(bos.category, FlightCategory::Mvfr);
        // KORH had no current report: omitted, not present-with-nothing
        assert!(!snap.contains(&StationId::new("KORH").unwrap()));
    }

    #[test]
    fn test_batch_drops_records_without_station() {
        let records = vec![
            json!({"mostRecent": 1, "visib": "10+"}),
            json!({"icaoId": "", "mostRecent": 1, "visib": "10+"}),
            json!({"icaoId": null, "mostRecent": 1}),
            json!({"icaoId": "KPVD", "mostRecent": 1, "visib": 3}),
        ];
        let snap = parse_batch(&records);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.get(&StationId::new("KPVD").unwrap()).unwrap().category, FlightCategory::Mvfr);
    }

    #[test]
    fn test_batch_skips_malformed_records() {
        let records = vec![
            json!("not an object"),
            json!(42),
            json!({"icaoId": "KACK", "mostRecent": 1, "visib": "1/4", "clouds": [{"cover": "OVC", "base": 200}]}),
        ];
        let snap = parse_batch(&records);
        let ack = snap.get(&StationId::new("KACK").unwrap()).unwrap();
        assert_eq!(ack.visibility_sm, 0.25);
        assert_eq!(ack.category, FlightCategory::Lifr);
    }

    #[test]
    fn test_odd_detail_fields_keep_the_station() {
        let records = vec![
            json!({"icaoId": "KBOS", "mostRecent": 1, "visib": "1/2", "temp": "M"}),
            json!({"icaoId": "KORH", "mostRecent": 1, "visib": "10+", "clouds": [{"cover": "OVC", "base": 400.0}]}),
            json!({"icaoId": "KPVD", "mostRecent": 1, "visib": "10+", "wspd": "VRB", "altim": null, "name": 7}),
        ];
        let snap = parse_batch(&records);
        assert_eq!(snap.len(), 3);

        let bos = snap.get(&StationId::new("KBOS").unwrap()).unwrap();
        assert_eq!(bos.category, FlightCategory::Lifr);
        assert_eq!(bos.temperature_c, None);

        let orh = snap.get(&StationId::new("KORH").unwrap()).unwrap();
        assert_eq!(orh.ceiling_ft, Some(400));
        assert_eq!(orh.category, FlightCategory::Lifr);

        let pvd = snap.get(&StationId::new("KPVD").unwrap()).unwrap();
        assert_eq!(pvd.category, FlightCategory::Vfr);
        assert_eq!(pvd.wind_speed_kt, None);
        assert_eq!(pvd.station_name, None);
    }

    #[test]
    fn test_odd_cloud_shapes() {
        let records = vec![
            json!({"icaoId": "KACK", "mostRecent": 1, "visib": "10+", "clouds": "OVC003"}),
            json!({"icaoId": "KHYA", "mostRecent": 1, "visib": "10+",
                   "clouds": ["junk", {"cover": "BKN", "base": -100}, {"cover": "OVC", "base": "1500"}]}),
            json!({"icaoId": "KMVY", "mostRecent": 1, "visib": "10+", "clouds": [{"cover": "BKN", "base": 749.6}]}),
        ];
        let snap = parse_batch(&records);
        assert_eq!(snap.get(&StationId::new("KACK").unwrap()).unwrap().ceiling_ft, None);
        assert_eq!(snap.get(&StationId::new("KHYA").unwrap()).unwrap().ceiling_ft, Some(1500));
        assert_eq!(snap.get(&StationId::new("KMVY").unwrap()).unwrap().ceiling_ft, Some(750));
    }

    #[test]
    fn test_observation_detail_fields() {
        let record = json!({
            "icaoId": "KATL", "mostRecent": 1, "visib": "10+", "temp": 21.5, "dewp": 12.0,
            "wdir": "VRB", "wspd": 4, "altim": 1016.2, "reportTime": "2025-03-01 12:52:00",
            "rawOb": "KATL 011252Z VRB04KT 10SM FEW250 22/12 A3001", "name": "Atlanta Intl, GA, US"
        });
        let snap = parse_batch(&[record]);
        let atl = snap.get(&StationId::new("KATL").unwrap()).unwrap();
        assert_eq!(atl.category, FlightCategory::Vfr);
        assert_eq!(atl.ceiling_ft, None);
        assert_eq!(atl.wind_dir.as_deref(), Some("VRB"));
        assert_eq!(atl.wind_speed_kt, Some(4.0));
        assert!(atl.report_time.is_some());
        assert_eq!(atl.station_name.as_deref(), Some("Atlanta Intl, GA, US"));
    }

    #[test]
    fn test_first_duplicate_wins() {
        let records = vec![
            json!({"icaoId": "KHYA", "mostRecent": 1, "visib": "2"}),
            json!({"icaoId": "KHYA", "mostRecent": 1, "visib": "10+"}),
        ];
        let snap = parse_batch(&records);
        assert_eq!(snap.get(&StationId::new("KHYA").unwrap()).unwrap().category, FlightCategory::Ifr);
    }

    #[test]
    fn test_category_counts() {
        let snap: WeatherSnapshot = vec![
            (StationId::new("KAAA").unwrap(), Observation::new(10.0, None)),
            (StationId::new("KBBB").unwrap(), Observation::new(10.0, Some(200))),
            (StationId::new("KCCC").unwrap(), Observation::new(10.0, None)),
        ]
        .into_iter()
        .collect();
        let counts = snap.category_counts();
        assert_eq!(counts[0], (FlightCategory::Vfr, 2));
        assert_eq!(counts[3], (FlightCategory::Lifr, 1));
    }
}
