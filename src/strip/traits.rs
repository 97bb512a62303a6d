/*
 *  strip/traits.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait for LED string drivers
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

use crate::strip::color::Rgb;
use crate::strip::error::StripError;

/// Minimal hardware abstraction - every LED string driver implements this
///
/// Writes are buffered; nothing reaches the LEDs until `flush` is called.
/// Brightness scaling and wire channel order are the driver's concern,
/// callers always hand over true RGB.
pub trait LedStrip: Send {
    /// Number of addressable positions
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Buffer one position
    fn set(&mut self, index: usize, color: Rgb) -> Result<(), StripError>;

    /// Buffer every position with one color. A failing position does not
    /// stop the rest; the first error is returned.
    fn fill(&mut self, color: Rgb) -> Result<(), StripError> {
        let mut first = None;
        for index in 0..self.len() {
            if let Err(e) = self.set(index, color) {
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }

    /// Push all pending writes to the hardware
    fn flush(&mut self) -> Result<(), StripError>;

    /// Short human readable driver name for logs
    fn name(&self) -> &str;
}

/// Type-erased driver, chosen at runtime from config
pub type BoxedStrip = Box<dyn LedStrip>;
