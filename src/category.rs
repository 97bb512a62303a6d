/*
 *  category.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  Flight category decision rule
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
use std::fmt;

/// Ceiling assumed when no broken/overcast layer is reported
pub const UNLIMITED_CEILING_FT: u32 = 9999;

/// Coarse visibility/ceiling derived flight rules category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlightCategory {
    /// Visual Flight Rules (ceiling > 3000 ft AND visibility > 5 sm)
    Vfr,
    /// Marginal VFR (ceiling 1000-3000 ft OR visibility 3-5 sm)
    Mvfr,
    /// Instrument Flight Rules (ceiling 500-999 ft OR visibility 1-3 sm)
    Ifr,
    /// Low IFR (ceiling < 500 ft OR visibility < 1 sm)
    Lifr,
}

impl FlightCategory {
    pub const ALL: [FlightCategory; 4] = [
        FlightCategory::Vfr,
        FlightCategory::Mvfr,
        FlightCategory::Ifr,
        FlightCategory::Lifr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightCategory::Vfr => "VFR",
            FlightCategory::Mvfr => "MVFR",
            FlightCategory::Ifr => "IFR",
            FlightCategory::Lifr => "LIFR",
        }
    }
}

impl fmt::Display for FlightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify visibility (statute miles) and ceiling (feet).
///
/// The bands overlap at their edges so the order of the tests matters,
/// first match wins. A missing ceiling counts as unlimited.
pub fn classify(visibility_sm: f64, ceiling_ft: Option<u32>) -> FlightCategory {
    let ceiling = ceiling_ft.unwrap_or(UNLIMITED_CEILING_FT);

    if ceiling < 500 || visibility_sm < 1.0 {
        FlightCategory::Lifr
    } else if ceiling < 1000 || visibility_sm < 3.0 {
        FlightCategory::Ifr
    } else if ceiling <= 3000 || visibility_sm <= 5.0 {
        FlightCategory::Mvfr
    } else {
        FlightCategory::Vfr
    }
}
