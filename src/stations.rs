/*
 *  stations.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  Station registry - airport identifier to LED position
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

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StationError {
    #[error("invalid station identifier '{0}' (expected 4-5 letters or digits)")]
    InvalidId(String),
    #[error("station {0} listed more than once")]
    DuplicateStation(StationId),
    #[error("LED position {position} used by both {first} and {second}")]
    DuplicatePosition { position: usize, first: StationId, second: StationId },
    #[error("station {id} at position {position} is beyond the {led_count} LED string")]
    PositionOutOfRange { id: StationId, position: usize, led_count: usize },
    #[error("no stations configured")]
    Empty,
}

/// ICAO-style airport identifier, e.g. `KATL` or `18AA`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationId(String);

impl StationId {
    pub fn new(raw: &str) -> Result<Self, StationError> {
        let id = raw.trim().to_ascii_uppercase();
        let valid = (4..=5).contains(&id.len()) && id.chars().all(|c| c.is_ascii_alphanumeric());
        if valid {
            Ok(StationId(id))
        } else {
            Err(StationError::InvalidId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for StationId {
    type Err = StationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StationId::new(s)
    }
}

impl TryFrom<String> for StationId {
    type Error = StationError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        StationId::new(&s)
    }
}

impl From<StationId> for String {
    fn from(id: StationId) -> Self {
        id.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One wired airport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationEntry {
    pub id: StationId,
    pub position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Ordered, validated station to LED mapping
///
/// Positions need not be contiguous; the gaps are LEDs skipped for
/// wiring distance between map pins and are never written.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRegistry {
    entries: Vec<StationEntry>,
}

impl StationRegistry {
    pub fn new(entries: Vec<StationEntry>, led_count: usize) -> Result<Self, StationError> {
        if entries.is_empty() {
            return Err(StationError::Empty);
        }
        let mut ids = HashSet::new();
        let mut positions: HashMap<usize, &StationId> = HashMap::with_capacity(entries.len());
        for entry in &entries {
            if !ids.insert(&entry.id) {
                return Err(StationError::DuplicateStation(entry.id.clone()));
            }
            if entry.position >= led_count {
                return Err(StationError::PositionOutOfRange {
                    id: entry.id.clone(),
                    position: entry.position,
                    led_count,
                });
            }
            if let Some(first) = positions.insert(entry.position, &entry.id) {
                return Err(StationError::DuplicatePosition {
                    position: entry.position,
                    first: first.clone(),
                    second: entry.id.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn from_preset(preset: Preset, led_count: usize) -> Result<Self, StationError> {
        Self::new(preset.entries()?, led_count)
    }

    /// Unwired list for one-off lookups: consecutive positions, repeats dropped
    pub fn adhoc(ids: &[StationId]) -> Result<Self, StationError> {
        let mut seen = HashSet::new();
        let entries: Vec<StationEntry> = ids
            .iter()
            .filter(|id| seen.insert(*id))
            .enumerate()
            .map(|(position, id)| StationEntry { id: id.clone(), position, name: None })
            .collect();
        let len = entries.len();
        Self::new(entries, len)
    }

    pub fn entries(&self) -> &[StationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers in registry order, for the batched query
    pub fn ids(&self) -> Vec<StationId> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }

    pub fn contains(&self, id: &StationId) -> bool {
        self.entries.iter().any(|e| &e.id == id)
    }

    pub fn position_of(&self, id: &StationId) -> Option<usize> {
        self.entries.iter().find(|e| &e.id == id).map(|e| e.position)
    }

    pub fn get(&self, id: &StationId) -> Option<&StationEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }
}

/// Built-in map layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Alabama / Georgia / South Carolina sectional
    Southeast,
    /// New York / New England sectional
    NewEngland,
}

const SOUTHEAST: &[(&str, usize, &str)] = &[
    ("KMXF", 0, "Maxwell AFB, AL"),
    ("KALX", 2, "Thomas C. Russell Field, AL"),
    ("KAUO", 3, "Auburn University Regional, AL"),
    ("KCSG", 4, "Columbus, GA"),
    ("KLGC", 6, "LaGrange-Callaway, GA"),
    ("KCCO", 7, "Newnan-Coweta County, GA"),
    ("KCTJ", 8, "West Georgia Regional, GA"),
    ("KCNI", 10, "Cherokee County, GA"),
    ("KRYY", 11, "Cobb County-McCollum Field, GA"),
    ("KATL", 12, "Hartsfield-Jackson Atlanta Intl, GA"),
    ("KHMP", 13, "Atlanta Speedway, GA"),
    ("K6A2", 14, "Griffin-Spalding County, GA"),
    ("KOPN", 15, "Thomaston-Upson County, GA"),
    ("K6A1", 16, "Butler Municipal, GA"),
    ("KWRB", 18, "Robins AFB, GA"),
    ("KDBN", 19, "W.H. 'Bud' Barron, GA"),
    ("KSBO", 20, "East Georgia Regional, GA"),
    ("KHQU", 22, "Thomson-McDuffie County, GA"),
    ("KMLJ", 24, "Baldwin County, GA"),
    ("KCVC", 26, "Covington Municipal, GA"),
    ("KLZU", 27, "Gwinnett County-Briscoe Field, GA"),
    ("KAHN", 28, "Athens-Ben Epps, GA"),
    ("18AA", 29, "Preston Area Community, GA"),
    ("KGMU", 31, "Greenville Downtown, SC"),
    ("KCEU", 33, "Clemson-Oconee County, SC"),
    ("KAJR", 35, "Habersham County, GA"),
    ("KDZJ", 36, "Blairsville, GA"),
    ("KDNN", 38, "Dalton Municipal, GA"),
    ("KRMG", 40, "Richard B. Russell Regional, GA"),
    ("K4A6", 42, "Scottsboro Municipal, AL"),
    ("KGAD", 44, "Gadsden Northeast Alabama Regional, AL"),
    ("KASN", 45, "Talladega Municipal, AL"),
];

const NEW_ENGLAND: &[(&str, usize, &str)] = &[
    ("KPOU", 0, "Poughkeepsie, NY"),
    ("KDXR", 2, "Danbury, CT"),
    ("KHVN", 3, "New Haven, CT"),
    ("KGON", 5, "Groton-New London, CT"),
    ("KBID", 6, "Block Island, RI"),
    ("KMVY", 8, "Martha's Vineyard, MA"),
    ("KHYA", 9, "Hyannis, MA"),
    ("KACK", 10, "Nantucket, MA"),
    ("KPVC", 12, "Provincetown, MA"),
    ("KPYM", 13, "Plymouth, MA"),
    ("KEWB", 14, "New Bedford, MA"),
    ("KPVD", 15, "Providence, RI"),
    ("KIJD", 17, "Windham, CT"),
    ("KBDL", 18, "Bradley Intl, CT"),
    ("KBAF", 19, "Westfield-Barnes, MA"),
    ("KCEF", 20, "Chicopee Falls, MA"),
    ("KAQW", 22, "North Adams, MA"),
    ("KPSF", 23, "Pittsfield, MA"),
    ("KALB", 25, "Albany, NY"),
    ("KGFL", 27, "Glens Falls, NY"),
    ("KVSF", 29, "Springfield, VT"),
    ("KEEN", 30, "Keene, NH"),
    ("KORE", 31, "Orange, MA"),
    ("KORH", 32, "Worcester, MA"),
    ("KFIT", 33, "Fitchburg, MA"),
    ("KASH", 34, "Nashua, NH"),
    ("KCON", 35, "Concord, NH"),
    ("KLCI", 37, "Laconia, NH"),
    ("KSFM", 39, "Sanford, ME"),
    ("KPSM", 40, "Portsmouth, NH"),
    ("KBED", 42, "Bedford, MA"),
    ("KBOS", 43, "Boston Logan, MA"),
    ("KOWD", 44, "Norwood, MA"),
];

impl Preset {
    fn table(&self) -> &'static [(&'static str, usize, &'static str)] {
        match self {
            Preset::Southeast => SOUTHEAST,
            Preset::NewEngland => NEW_ENGLAND,
        }
    }

    pub fn entries(&self) -> Result<Vec<StationEntry>, StationError> {
        self.table()
            .iter()
            .map(|(id, position, name)| {
                Ok(StationEntry {
                    id: StationId::new(id)?,
                    position: *position,
                    name: Some(name.to_string()),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, position: usize) -> StationEntry {
        StationEntry { id: StationId::new(id).unwrap(), position, name: None }
    }

    #[test]
    fn test_station_id_normalisation() {
        assert_eq!(StationId::new(" katl ").unwrap().as_str(), "KATL");
        assert_eq!(StationId::new("18AA").unwrap().as_str(), "18AA");
        assert!(StationId::new("ATL").is_err());
        assert!(StationId::new("KATL12").is_err());
        assert!(StationId::new("K-TL").is_err());
        assert!(StationId::new("").is_err());
    }

    #[test]
    fn test_presets_are_valid_for_fifty_leds() {
        let se = StationRegistry::from_preset(Preset::Southeast, 50).unwrap();
        assert_eq!(se.len(), 32);
        assert_eq!(se.position_of(&StationId::new("KATL").unwrap()), Some(12));

        let ne = StationRegistry::from_preset(Preset::NewEngland, 50).unwrap();
        assert_eq!(ne.len(), 33);
        assert_eq!(ne.position_of(&StationId::new("KBOS").unwrap()), Some(43));
    }

    #[test]
    fn test_registry_keeps_order_and_gaps() {
        let reg = StationRegistry::new(vec![entry("KBOS", 5), entry("KBED", 1), entry("KOWD", 3)], 6).unwrap();
        let ids: Vec<String> = reg.ids().into_iter().map(String::from).collect();
        assert_eq!(ids, vec!["KBOS", "KBED", "KOWD"]);
        assert_eq!(reg.position_of(&StationId::new("KBED").unwrap()), Some(1));
        assert!(!reg.contains(&StationId::new("KATL").unwrap()));
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let err = StationRegistry::new(vec![entry("KBOS", 0), entry("KBOS", 1)], 4).unwrap_err();
        assert!(matches!(err, StationError::DuplicateStation(_)));

        let err = StationRegistry::new(vec![entry("KBOS", 2), entry("KBED", 2)], 4).unwrap_err();
        assert!(matches!(err, StationError::DuplicatePosition { position: 2, .. }));
    }

    #[test]
    fn test_registry_rejects_out_of_range() {
        let err = StationRegistry::new(vec![entry("KBOS", 4)], 4).unwrap_err();
        assert!(matches!(err, StationError::PositionOutOfRange { position: 4, led_count: 4, .. }));
        assert_eq!(StationRegistry::new(vec![], 4).unwrap_err(), StationError::Empty);
    }

    #[test]
    fn test_adhoc_registry() {
        let ids: Vec<StationId> = ["KBOS", "korh", "KBOS"].iter().map(|s| StationId::new(s).unwrap()).collect();
        let reg = StationRegistry::adhoc(&ids).unwrap();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.position_of(&StationId::new("KORH").unwrap()), Some(1));
        assert_eq!(StationRegistry::adhoc(&[]).unwrap_err(), StationError::Empty);
    }

    #[test]
    fn test_registry_cost_independent_of_led_count() {
        let reg = StationRegistry::new(vec![entry("KBOS", 3), entry("KORH", 9)], usize::MAX).unwrap();
        assert_eq!(reg.position_of(&StationId::new("KORH").unwrap()), Some(9));
    }

    #[test]
    fn test_station_id_from_yaml() {
        let e: StationEntry = serde_yaml::from_str("id: kpvd\nposition: 15\n").unwrap();
        assert_eq!(e.id.as_str(), "KPVD");
        assert!(serde_yaml::from_str::<StationEntry>("id: P\nposition: 1\n").is_err());
    }
}
