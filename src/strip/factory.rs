/*
 *  strip/factory.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  Build the configured LED strip driver
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

use log::info;

use crate::config::{DriverKind, StripSettings};
use crate::strip::drivers::console::ConsoleStrip;
use crate::strip::error::StripError;
use crate::strip::traits::BoxedStrip;

#[cfg(feature = "driver-spi")]
use crate::strip::drivers::spi::SpiStrip;

/// Create a strip driver from resolved settings
///
/// # Examples
///
/// ```ignore
/// let strip = open_strip(&settings.strip)?;
/// assert_eq!(strip.len(), settings.strip.led_count);
/// ```
pub fn open_strip(settings: &StripSettings) -> Result<BoxedStrip, StripError> {
    if settings.led_count == 0 {
        return Err(StripError::InvalidConfiguration("led_count must be > 0".to_string()));
    }

    match settings.driver {
        DriverKind::Console => {
            info!("Emulation mode - {} LEDs rendered to the log", settings.led_count);
            Ok(Box::new(console_strip(settings)))
        }

        #[cfg(feature = "driver-spi")]
        DriverKind::Spi => Ok(Box::new(SpiStrip::new(settings)?)),

        #[cfg(not(feature = "driver-spi"))]
        DriverKind::Spi => Err(StripError::InvalidConfiguration(
            "SPI driver not enabled. Enable with --features driver-spi or run --emulated".to_string(),
        )),
    }
}

fn console_strip(settings: &StripSettings) -> ConsoleStrip {
    let strip = ConsoleStrip::new(settings.led_count);
    if settings.console_color { strip } else { strip.without_color() }
}
