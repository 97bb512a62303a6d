/*
 *  strip/error.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error type for LED strip operations
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

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StripError {
    /// Hardware could not be opened or configured
    #[error("LED strip initialization failed: {0}")]
    InitializationFailed(String),

    /// Position outside the physical string
    #[error("LED position {index} out of range (strip has {len} positions)")]
    IndexOutOfRange { index: usize, len: usize },

    /// SPI transfer failed or was short
    #[error("SPI communication error: {0}")]
    Spi(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "driver-spi")]
impl From<rppal::spi::Error> for StripError {
    fn from(err: rppal::spi::Error) -> Self {
        StripError::Spi(err.to_string())
    }
}
