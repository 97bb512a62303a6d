/*
 *  strip/color.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  RGB values, category palette and wire channel ordering
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

use crate::category::FlightCategory;

/// A true red/green/blue triple. Channel reordering for the wire
/// happens in the driver, never here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const MAGENTA: Rgb = Rgb::new(255, 0, 255);
    pub const DIM_WHITE: Rgb = Rgb::new(64, 64, 64);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn is_off(&self) -> bool {
        *self == Rgb::OFF
    }

    /// Scale every channel by `brightness` (clamped to 0.0..=1.0)
    pub fn scaled(&self, brightness: f32) -> Rgb {
        let k = brightness.clamp(0.0, 1.0);
        let s = |c: u8| (c as f32 * k).round() as u8;
        Rgb::new(s(self.r), s(self.g), s(self.b))
    }
}

/// Byte order the LED controller expects on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorOrder {
    Rgb,
    /// WS2812B and most NeoPixel strings
    #[default]
    Grb,
}

impl ColorOrder {
    pub fn to_wire(&self, c: Rgb) -> [u8; 3] {
        match self {
            ColorOrder::Rgb => [c.r, c.g, c.b],
            ColorOrder::Grb => [c.g, c.r, c.b],
        }
    }
}

/// Category colors plus the "no data" marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub vfr: Rgb,
    pub mvfr: Rgb,
    pub ifr: Rgb,
    pub lifr: Rgb,
    pub unknown: Rgb,
    pub fault: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            vfr: Rgb::GREEN,
            mvfr: Rgb::BLUE,
            ifr: Rgb::RED,
            lifr: Rgb::MAGENTA,
            unknown: Rgb::DIM_WHITE,
            fault: Rgb::RED,
        }
    }
}

impl Palette {
    pub fn for_category(&self, category: FlightCategory) -> Rgb {
        match category {
            FlightCategory::Vfr => self.vfr,
            FlightCategory::Mvfr => self.mvfr,
            FlightCategory::Ifr => self.ifr,
            FlightCategory::Lifr => self.lifr,
        }
    }
}

/// Colors cycled through by the power-on self test
pub const SELF_TEST_COLORS: [Rgb; 5] = [Rgb::RED, Rgb::GREEN, Rgb::BLUE, Rgb::YELLOW, Rgb::MAGENTA];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grb_swaps_red_and_green() {
        assert_eq!(ColorOrder::Grb.to_wire(Rgb::new(1, 2, 3)), [2, 1, 3]);
        assert_eq!(ColorOrder::Rgb.to_wire(Rgb::new(1, 2, 3)), [1, 2, 3]);
    }

    #[test]
    fn test_brightness_scaling() {
        assert_eq!(Rgb::new(255, 100, 0).scaled(1.0), Rgb::new(255, 100, 0));
        assert_eq!(Rgb::new(255, 100, 0).scaled(0.0), Rgb::OFF);
        assert_eq!(Rgb::new(200, 100, 10).scaled(0.5), Rgb::new(100, 50, 5));
        // out of range brightness is clamped
        assert_eq!(Rgb::new(10, 10, 10).scaled(3.0), Rgb::new(10, 10, 10));
    }

    #[test]
    fn test_palette_categories_are_distinct() {
        let p = Palette::default();
        let colors: Vec<Rgb> = FlightCategory::ALL.iter().map(|c| p.for_category(*c)).collect();
        for (i, a) in colors.iter().enumerate() {
            assert_ne!(*a, p.unknown);
            for b in colors.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
