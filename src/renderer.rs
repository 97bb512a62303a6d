/*
 *  renderer.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  Map snapshots onto strip positions, plus the self test and fault patterns
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

use log::{debug, error, info, warn};
use std::time::Duration;

use crate::metar::WeatherSnapshot;
use crate::shutdown::Shutdown;
use crate::stations::StationRegistry;
use crate::strip::color::SELF_TEST_COLORS;
use crate::strip::{BoxedStrip, Palette, Rgb};

/// Per pass bookkeeping, mostly for logs and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// positions colored from the current snapshot
    pub current: usize,
    /// positions carried over from the previous snapshot
    pub carried: usize,
    /// positions shown as "no data"
    pub unknown: usize,
    pub failed_writes: usize,
    pub flushed: bool,
}

pub struct Renderer {
    strip: BoxedStrip,
    registry: StationRegistry,
    palette: Palette,
}

impl Renderer {
    pub fn new(strip: BoxedStrip, registry: StationRegistry, palette: Palette) -> Self {
        Self { strip, registry, palette }
    }

    pub fn registry(&self) -> &StationRegistry {
        &self.registry
    }

    pub fn strip_name(&self) -> &str {
        self.strip.name()
    }

    /// Color every registered position and flush once.
    ///
    /// An empty `snapshot` means the fetch brought nothing new, so each
    /// station keeps its entry from `previous` where there is one.
    pub fn render(&mut self, snapshot: &WeatherSnapshot, previous: Option<&WeatherSnapshot>) -> RenderStats {
        let mut stats = RenderStats::default();
        let fallback = if snapshot.is_empty() { previous } else { None };

        for entry in self.registry.entries() {
            let color = if let Some(obs) = snapshot.get(&entry.id) {
                stats.current += 1;
                self.palette.for_category(obs.category)
            } else if let Some(obs) = fallback.and_then(|prev| prev.get(&entry.id)) {
                stats.carried += 1;
                self.palette.for_category(obs.category)
            } else {
                stats.unknown += 1;
                self.palette.unknown
            };

            if let Err(e) = self.strip.set(entry.position, color) {
                stats.failed_writes += 1;
                warn!("LED {} ({}): {}", entry.position, entry.id, e);
            }
        }

        stats.flushed = self.flush();
        debug!(
            "render: {} current, {} carried, {} unknown, {} failed writes",
            stats.current, stats.carried, stats.unknown, stats.failed_writes
        );
        stats
    }

    /// Every position off, one flush
    pub fn blank(&mut self) -> bool {
        self.fill_all(Rgb::OFF);
        self.flush()
    }

    /// Power-on lamp check, one palette color per step, then dark
    pub async fn self_test(&mut self, step: Duration, shutdown: &mut Shutdown) -> bool {
        info!("LED self test on {} ({} positions)", self.strip.name(), self.strip.len());
        for color in SELF_TEST_COLORS {
            self.fill_all(color);
            self.flush();
            if shutdown.sleep(step).await {
                return true;
            }
        }
        self.blank();
        false
    }

    /// Alternate the fault color and dark across the whole strip, then blank.
    /// Returns true if shutdown cut the pattern short.
    pub async fn fault_pattern(&mut self, flash: Duration, total: Duration, shutdown: &mut Shutdown) -> bool {
        let flash = flash.max(Duration::from_millis(1));
        let mut elapsed = Duration::ZERO;
        let mut lit = true;
        while elapsed < total {
            self.fill_all(if lit { self.palette.fault } else { Rgb::OFF });
            self.flush();
            if shutdown.sleep(flash).await {
                return true;
            }
            elapsed += flash;
            lit = !lit;
        }
        self.blank();
        false
    }

    fn fill_all(&mut self, color: Rgb) {
        if let Err(e) = self.strip.fill(color) {
            warn!("strip fill failed: {}", e);
        }
    }

    fn flush(&mut self) -> bool {
        match self.strip.flush() {
            Ok(()) => true,
            Err(e) => {
                error!("strip flush failed: {}", e);
                false
            }
        }
    }
}
