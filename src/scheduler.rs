/*
 *  scheduler.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  The refresh loop - probe, fetch, render, sleep, repeat
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

use log::{info, warn};

use crate::acquirer::MetarSource;
use crate::config::{ConnectivitySettings, ScheduleSettings};
use crate::connectivity::{ConnectivityMonitor, Probe, Transition};
use crate::metar::WeatherSnapshot;
use crate::renderer::{RenderStats, Renderer};
use crate::report;
use crate::shutdown::Shutdown;

/// How a single cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// fresh data shown
    Rendered(RenderStats),
    /// fetch came back empty, previous colors kept
    Stale(RenderStats),
    /// no network, fault pattern shown
    Fault,
    Interrupted,
}

pub struct Scheduler<S: MetarSource, P: Probe> {
    source: S,
    probe: P,
    renderer: Renderer,
    monitor: ConnectivityMonitor,
    last_good: Option<WeatherSnapshot>,
    schedule: ScheduleSettings,
    connectivity: ConnectivitySettings,
    cycles: u64,
}

impl<S: MetarSource, P: Probe> Scheduler<S, P> {
    pub fn new(
        source: S,
        probe: P,
        renderer: Renderer,
        schedule: ScheduleSettings,
        connectivity: ConnectivitySettings,
    ) -> Self {
        Self {
            source,
            probe,
            renderer,
            monitor: ConnectivityMonitor::new(connectivity.failure_threshold),
            last_good: None,
            schedule,
            connectivity,
            cycles: 0,
        }
    }

    pub fn last_good(&self) -> Option<&WeatherSnapshot> {
        self.last_good.as_ref()
    }

    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.monitor
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// One pass: probe (if enabled), then either the fault pattern or
    /// fetch and render.
    pub async fn run_cycle(&mut self, shutdown: &mut Shutdown) -> CycleOutcome {
        self.cycles += 1;

        if self.connectivity.enabled {
            let transition = tokio::select! {
                t = self.monitor.check(&self.probe) => t,
                _ = shutdown.wait() => return CycleOutcome::Interrupted,
            };
            if matches!(transition, Transition::EnteredFault | Transition::StillFault) {
                let interrupted = self
                    .renderer
                    .fault_pattern(
                        self.connectivity.flash_interval(),
                        self.connectivity.fault_duration(),
                        shutdown,
                    )
                    .await;
                return if interrupted { CycleOutcome::Interrupted } else { CycleOutcome::Fault };
            }
        }

        let ids = self.renderer.registry().ids();
        let snapshot = tokio::select! {
            s = self.source.fetch(&ids) => s,
            _ = shutdown.wait() => return CycleOutcome::Interrupted,
        };

        let stats = self.renderer.render(&snapshot, self.last_good.as_ref());
        if snapshot.is_empty() {
            warn!("Update #{}: no new reports, keeping previous colors", self.cycles);
            return CycleOutcome::Stale(stats);
        }

        info!(
            "Update #{}: {}",
            self.cycles,
            report::summary_line(&snapshot, self.renderer.registry())
        );
        self.last_good = Some(snapshot);
        CycleOutcome::Rendered(stats)
    }

    /// Self test, then cycles until shutdown; always leaves the strip dark
    pub async fn run(&mut self, mut shutdown: Shutdown) {
        info!(
            "Monitoring {} stations on {} every {}s",
            self.renderer.registry().len(),
            self.renderer.strip_name(),
            self.schedule.interval.as_secs()
        );

        let interrupted = if self.schedule.self_test {
            self.renderer.self_test(self.schedule.self_test_step, &mut shutdown).await
        } else {
            self.renderer.blank();
            false
        };

        if !interrupted {
            loop {
                let pause = match self.run_cycle(&mut shutdown).await {
                    CycleOutcome::Interrupted => break,
                    CycleOutcome::Fault => self.connectivity.cooldown(),
                    CycleOutcome::Rendered(_) | CycleOutcome::Stale(_) => self.schedule.interval,
                };
                if shutdown.sleep(pause).await {
                    break;
                }
            }
        }

        info!("Shutdown requested, clearing LEDs");
        self.renderer.blank();
    }
}
