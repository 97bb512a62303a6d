/*
 *  strip/drivers/mock.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock LED strip for testing without hardware
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

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::strip::color::Rgb;
use crate::strip::error::StripError;
use crate::strip::traits::LedStrip;

/// Mock LED strip
///
/// Records every write and flush so tests can check what the renderer
/// did. The state is shared behind an `Arc` so a test can keep a handle
/// after the strip itself has been boxed and moved into a renderer.
#[derive(Debug, Clone)]
pub struct MockStrip {
    len: usize,
    state: Arc<Mutex<MockStripState>>,
}

/// Internal state for the mock strip (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockStripState {
    /// Pending (unflushed) colors
    pub pending: Vec<Rgb>,

    /// Colors as of the last successful flush
    pub shown: Vec<Rgb>,

    /// Every flushed frame, oldest first
    pub frames: Vec<Vec<Rgb>>,

    /// Number of successful set() calls per position
    pub write_counts: Vec<usize>,

    /// Number of times flush() succeeded
    pub flush_count: usize,

    /// Number of fill() calls
    pub fill_count: usize,

    /// Positions whose writes fail (for error testing)
    pub failing_positions: HashSet<usize>,

    /// Simulate flush failures
    pub simulate_flush_failure: bool,
}

impl MockStrip {
    pub fn new(len: usize) -> Self {
        let state = MockStripState {
            pending: vec![Rgb::OFF; len],
            shown: vec![Rgb::OFF; len],
            write_counts: vec![0; len],
            ..Default::default()
        };
        Self {
            len,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockStripState>> {
        Arc::clone(&self.state)
    }

    /// Color currently shown at a position
    pub fn shown(&self, index: usize) -> Option<Rgb> {
        self.state.lock().unwrap().shown.get(index).copied()
    }

    pub fn flush_count(&self) -> usize {
        self.state.lock().unwrap().flush_count
    }

    pub fn fill_count(&self) -> usize {
        self.state.lock().unwrap().fill_count
    }

    /// Snapshot of the per-position write counters
    pub fn write_counts(&self) -> Vec<usize> {
        self.state.lock().unwrap().write_counts.clone()
    }

    /// Reset counters and history, keep the shown frame
    pub fn reset_counters(&self) {
        let mut state = self.state.lock().unwrap();
        state.frames.clear();
        state.write_counts = vec![0; self.len];
        state.flush_count = 0;
        state.fill_count = 0;
    }

    pub fn fail_position(&self, index: usize) {
        self.state.lock().unwrap().failing_positions.insert(index);
    }
}

impl LedStrip for MockStrip {
    fn len(&self) -> usize {
        self.len
    }

    fn set(&mut self, index: usize, color: Rgb) -> Result<(), StripError> {
        let mut state = self.state.lock().unwrap();
        if index >= self.len {
            return Err(StripError::IndexOutOfRange { index, len: self.len });
        }
        if state.failing_positions.contains(&index) {
            return Err(StripError::Other(format!("Simulated write failure at {}", index)));
        }
        state.pending[index] = color;
        state.write_counts[index] += 1;
        Ok(())
    }

    fn fill(&mut self, color: Rgb) -> Result<(), StripError> {
        self.state.lock().unwrap().fill_count += 1;
        let mut first = None;
        for index in 0..self.len {
            if let Err(e) = self.set(index, color) {
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }

    fn flush(&mut self) -> Result<(), StripError> {
        let mut state = self.state.lock().unwrap();
        if state.simulate_flush_failure {
            return Err(StripError::Other("Simulated flush failure".to_string()));
        }
        let frame = state.pending.clone();
        state.shown = frame.clone();
        state.frames.push(frame);
        state.flush_count += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
