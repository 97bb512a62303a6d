/*
 *  strip/ws2812.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  WS2812 bit stream encoding for an SPI MOSI line
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

//! At 2.4 MHz one SPI bit lasts ~417 ns, so each WS2812 data bit is sent
//! as three SPI bits: `110` for a one (long high) and `100` for a zero
//! (short high). A run of zero bytes after the frame holds the line low
//! long enough for the string to latch.

use crate::strip::color::{ColorOrder, Rgb};

/// SPI clock that gives the 3:1 bit expansion its timing
pub const SPI_CLOCK_HZ: u32 = 2_400_000;

/// SPI bytes per LED: 3 channels x 8 bits x 3 SPI bits
pub const BYTES_PER_LED: usize = 9;

/// Trailing low time; 90 bytes is ~300us, enough for WS2812B rev. 5 parts
pub const RESET_BYTES: usize = 90;

const ONE: u32 = 0b110;
const ZERO: u32 = 0b100;

/// Expand one data byte into three SPI bytes, MSB first
pub fn encode_byte(byte: u8, out: &mut Vec<u8>) {
    let mut bits: u32 = 0;
    for i in (0..8).rev() {
        let pattern = if byte & (1 << i) != 0 { ONE } else { ZERO };
        bits = (bits << 3) | pattern;
    }
    out.extend_from_slice(&[(bits >> 16) as u8, (bits >> 8) as u8, bits as u8]);
}

/// Encode a whole frame, applying brightness and wire channel order
pub fn encode_frame(pixels: &[Rgb], order: ColorOrder, brightness: f32) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len() * BYTES_PER_LED + RESET_BYTES);
    for pixel in pixels {
        for channel in order.to_wire(pixel.scaled(brightness)) {
            encode_byte(channel, &mut out);
        }
    }
    out.resize(out.len() + RESET_BYTES, 0);
    out
}
