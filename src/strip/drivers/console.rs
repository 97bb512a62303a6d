/*
 *  strip/drivers/console.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  Console emulator - logs each flushed frame as a row of colored cells
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
use std::fmt::Write;

use crate::strip::color::Rgb;
use crate::strip::error::StripError;
use crate::strip::traits::LedStrip;

/// Emulated strip for desktop runs without an SPI bus
#[derive(Debug)]
pub struct ConsoleStrip {
    pixels: Vec<Rgb>,
    ansi: bool,
}

impl ConsoleStrip {
    pub fn new(len: usize) -> Self {
        Self {
            pixels: vec![Rgb::OFF; len],
            ansi: true,
        }
    }

    /// Plain text rendering, for log sinks that choke on escape codes
    pub fn without_color(mut self) -> Self {
        self.ansi = false;
        self
    }

    /// One cell per position
    pub fn render_row(&self) -> String {
        let mut row = String::with_capacity(self.pixels.len() * 20);
        for px in &self.pixels {
            if self.ansi {
                let _ = write!(row, "\x1b[48;2;{};{};{}m \x1b[0m", px.r, px.g, px.b);
            } else if px.is_off() {
                row.push('.');
            } else {
                row.push('#');
            }
        }
        row
    }
}

impl LedStrip for ConsoleStrip {
    fn len(&self) -> usize {
        self.pixels.len()
    }

    fn set(&mut self, index: usize, color: Rgb) -> Result<(), StripError> {
        let len = self.pixels.len();
        let px = self
            .pixels
            .get_mut(index)
            .ok_or(StripError::IndexOutOfRange { index, len })?;
        *px = color;
        Ok(())
    }

    fn fill(&mut self, color: Rgb) -> Result<(), StripError> {
        self.pixels.fill(color);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StripError> {
        info!("[strip] {}", self.render_row());
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_row() {
        let mut strip = ConsoleStrip::new(4).without_color();
        strip.set(1, Rgb::GREEN).unwrap();
        strip.set(3, Rgb::DIM_WHITE).unwrap();
        assert_eq!(strip.render_row(), ".#.#");
        assert!(strip.flush().is_ok());

        strip.fill(Rgb::RED).unwrap();
        assert_eq!(strip.render_row(), "####");
    }

    #[test]
    fn test_out_of_range() {
        let mut strip = ConsoleStrip::new(2);
        assert!(strip.set(2, Rgb::RED).is_err());
    }
}
