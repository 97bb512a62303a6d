/*
 *  lib.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  Library root: station table, METAR pipeline, LED strip drivers
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

pub mod acquirer;
pub mod category;
pub mod config;
pub mod connectivity;
pub mod metar;
pub mod renderer;
pub mod report;
pub mod scheduler;
pub mod shutdown;
pub mod stations;
pub mod strip;

pub use category::{classify, FlightCategory};
pub use metar::{Observation, WeatherSnapshot};
pub use stations::{StationId, StationRegistry};
