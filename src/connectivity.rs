/*
 *  connectivity.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  Network reachability probing and the Up / Degraded / Fault monitor
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
use std::fmt;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::ConnectivitySettings;

/// Reachability check, one answer per call
pub trait Probe {
    fn reachable(&self) -> impl std::future::Future<Output = bool> + Send;
}

/// TCP connect probe over an ordered list of `host:port` endpoints.
/// The first endpoint that accepts a connection wins.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    endpoints: Vec<String>,
    connect_timeout: Duration,
}

impl TcpProbe {
    pub fn new(endpoints: Vec<String>, connect_timeout: Duration) -> Self {
        Self { endpoints, connect_timeout }
    }

    pub fn from_settings(settings: &ConnectivitySettings) -> Self {
        Self::new(
            settings.endpoints.clone(),
            Duration::from_secs(settings.probe_timeout_secs),
        )
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    async fn try_endpoint(&self, endpoint: &str) -> bool {
        match timeout(self.connect_timeout, TcpStream::connect(endpoint)).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                debug!("probe {} failed: {}", endpoint, e);
                false
            }
            Err(_) => {
                debug!("probe {} timed out after {:?}", endpoint, self.connect_timeout);
                false
            }
        }
    }
}

impl Probe for TcpProbe {
    async fn reachable(&self) -> bool {
        for endpoint in &self.endpoints {
            if self.try_endpoint(endpoint).await {
                debug!("network reachable via {}", endpoint);
                return true;
            }
        }
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Up,
    /// consecutive failed probes, still below the threshold
    Degraded(u32),
    Fault,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::Up => write!(f, "up"),
            LinkState::Degraded(n) => write!(f, "degraded ({} failed)", n),
            LinkState::Fault => write!(f, "fault"),
        }
    }
}

/// What a single probe result did to the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Steady,
    Degraded(u32),
    EnteredFault,
    StillFault,
    Recovered,
}

#[derive(Debug)]
pub struct ConnectivityMonitor {
    state: LinkState,
    failures: u32,
    threshold: u32,
}

impl ConnectivityMonitor {
    /// A threshold of zero is treated as one
    pub fn new(threshold: u32) -> Self {
        Self {
            state: LinkState::Up,
            failures: 0,
            threshold: threshold.max(1),
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    pub fn is_fault(&self) -> bool {
        self.state == LinkState::Fault
    }

    pub fn record(&mut self, reachable: bool) -> Transition {
        if reachable {
            let was_fault = self.is_fault();
            self.failures = 0;
            self.state = LinkState::Up;
            return if was_fault { Transition::Recovered } else { Transition::Steady };
        }

        self.failures = self.failures.saturating_add(1);
        if self.failures >= self.threshold {
            let was_fault = self.is_fault();
            self.state = LinkState::Fault;
            if was_fault { Transition::StillFault } else { Transition::EnteredFault }
        } else {
            self.state = LinkState::Degraded(self.failures);
            Transition::Degraded(self.failures)
        }
    }

    /// Probe once, update and log the transition
    pub async fn check<P: Probe>(&mut self, probe: &P) -> Transition {
        let transition = self.record(probe.reachable().await);
        match transition {
            Transition::Steady => debug!("connectivity ok"),
            Transition::Degraded(n) => warn!("connectivity check failed ({}/{})", n, self.threshold),
            Transition::EnteredFault => error!(
                "no network after {} consecutive checks, entering fault display",
                self.failures
            ),
            Transition::StillFault => warn!("still no network ({} consecutive failures)", self.failures),
            Transition::Recovered => info!("network connectivity restored"),
        }
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::net::TcpListener;

    struct FixedProbe(AtomicBool);

    impl Probe for FixedProbe {
        async fn reachable(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn test_fault_exactly_at_threshold() {
        let mut mon = ConnectivityMonitor::new(2);
        assert_eq!(mon.record(false), Transition::Degraded(1));
        assert_eq!(mon.state(), LinkState::Degraded(1));
        assert_eq!(mon.record(false), Transition::EnteredFault);
        assert!(mon.is_fault());
        assert_eq!(mon.record(false), Transition::StillFault);
        assert_eq!(mon.consecutive_failures(), 3);
    }

    #[test]
    fn test_single_success_recovers() {
        let mut mon = ConnectivityMonitor::new(2);
        mon.record(false);
        mon.record(false);
        assert_eq!(mon.record(true), Transition::Recovered);
        assert_eq!(mon.state(), LinkState::Up);
        assert_eq!(mon.consecutive_failures(), 0);
        assert_eq!(mon.record(true), Transition::Steady);
    }

    #[test]
    fn test_degraded_resets_without_recovery_event() {
        let mut mon = ConnectivityMonitor::new(3);
        mon.record(false);
        mon.record(false);
        assert_eq!(mon.record(true), Transition::Steady);
        assert_eq!(mon.record(false), Transition::Degraded(1));
    }

    #[test]
    fn test_threshold_one() {
        let mut mon = ConnectivityMonitor::new(0);
        assert_eq!(mon.record(false), Transition::EnteredFault);
    }

    #[tokio::test]
    async fn test_check_reports_reachability() {
        let probe = FixedProbe(AtomicBool::new(false));
        let mut mon = ConnectivityMonitor::new(1);
        assert_eq!(mon.check(&probe).await, Transition::EnteredFault);
        probe.0.store(true, Ordering::SeqCst);
        assert_eq!(mon.check(&probe).await, Transition::Recovered);
    }

    #[tokio::test]
    async fn test_tcp_check_falls_through_to_listening_endpoint() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = listener.accept().await;
        });

        let probe = TcpProbe::new(
            vec!["127.0.0.1:1".to_string(), addr.to_string()],
            Duration::from_secs(2),
        );
        assert!(probe.reachable().await);
    }

    #[tokio::test]
    async fn test_tcp_check_all_refused() {
        let probe = TcpProbe::new(vec!["127.0.0.1:1".to_string()], Duration::from_secs(2));
        assert!(!probe.reachable().await);
        assert!(!TcpProbe::new(Vec::new(), Duration::from_secs(1)).reachable().await);
    }
}
