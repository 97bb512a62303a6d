/*
 *  report.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  Text summaries - per-cycle log line and the --once tables
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

use std::fmt::Write;

use crate::category::FlightCategory;
use crate::metar::{Observation, WeatherSnapshot};
use crate::stations::StationRegistry;

/// "VFR 20 | MVFR 3 | IFR 1 | LIFR 0 | no data 8"
pub fn summary_line(snapshot: &WeatherSnapshot, registry: &StationRegistry) -> String {
    let mut line = snapshot
        .category_counts()
        .iter()
        .map(|(cat, n)| format!("{} {}", cat, n))
        .collect::<Vec<_>>()
        .join(" | ");
    let missing = registry.entries().iter().filter(|e| !snapshot.contains(&e.id)).count();
    let _ = write!(line, " | no data {}", missing);
    line
}

fn ceiling_text(obs: &Observation) -> String {
    match obs.ceiling_ft {
        Some(ft) => format!("{} ft", ft),
        None => "none".to_string(),
    }
}

/// One row per registered station, registry order
pub fn table(snapshot: &WeatherSnapshot, registry: &StationRegistry) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6} {:<4} {:<28} {:<8} {:>6} {:>9}  {:<16}",
        "ID", "LED", "Name", "Category", "Vis", "Ceiling", "Time"
    );
    let _ = writeln!(out, "{}", "-".repeat(84));

    for entry in registry.entries() {
        let name: String = entry.name.as_deref().unwrap_or("").chars().take(28).collect();
        match snapshot.get(&entry.id) {
            Some(obs) => {
                let time = obs
                    .report_time
                    .map(|t| t.format("%Y-%m-%d %H:%MZ").to_string())
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "{:<6} {:<4} {:<28} {:<8} {:>6.2} {:>9}  {:<16}",
                    entry.id.as_str(),
                    entry.position,
                    name,
                    obs.category.as_str(),
                    obs.visibility_sm,
                    ceiling_text(obs),
                    time
                );
            }
            None => {
                let _ = writeln!(out, "{:<6} {:<4} {:<28} {:<8}", entry.id.as_str(), entry.position, name, "--");
            }
        }
    }

    let _ = writeln!(out);
    for cat in FlightCategory::ALL {
        let _ = writeln!(out, "{:<5}= {}", cat.as_str(), legend(cat));
    }
    out
}

fn legend(cat: FlightCategory) -> &'static str {
    match cat {
        FlightCategory::Vfr => "ceiling above 3000 ft and visibility above 5 mi",
        FlightCategory::Mvfr => "ceiling 1000-3000 ft or visibility 3-5 mi",
        FlightCategory::Ifr => "ceiling 500-999 ft or visibility 1-3 mi",
        FlightCategory::Lifr => "ceiling below 500 ft or visibility below 1 mi",
    }
}

/// Full report detail for each station that has one
pub fn detail(snapshot: &WeatherSnapshot, registry: &StationRegistry) -> String {
    let mut out = String::new();
    for entry in registry.entries() {
        let Some(obs) = snapshot.get(&entry.id) else { continue };
        let name = obs
            .station_name
            .as_deref()
            .or(entry.name.as_deref())
            .unwrap_or("Unknown");
        let _ = writeln!(out, "\n{} - {}", entry.id, name);
        let _ = writeln!(out, "  Flight category: {}", obs.category);
        if let Some(t) = obs.temperature_c {
            let _ = writeln!(out, "  Temperature: {:.1}°C", t);
        }
        if let Some(d) = obs.dewpoint_c {
            let _ = writeln!(out, "  Dewpoint: {:.1}°C", d);
        }
        match (obs.wind_dir.as_deref(), obs.wind_speed_kt) {
            (Some("VRB"), Some(s)) => { let _ = writeln!(out, "  Wind: variable at {} kt", s); }
            (Some(d), Some(s)) => { let _ = writeln!(out, "  Wind: {}° at {} kt", d, s); }
            _ => {}
        }
        if let Some(a) = obs.altimeter {
            let _ = writeln!(out, "  Altimeter: {:.1} hPa", a);
        }
        if let Some(raw) = obs.raw_text.as_deref() {
            let _ = writeln!(out, "  Raw METAR: {}", raw);
        }
    }
    out
}
