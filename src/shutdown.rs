/*
 *  shutdown.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  Shutdown request plumbing and interruptible sleeps
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

use std::time::Duration;
use tokio::sync::watch;

/// Sending half, held by the signal listener
#[derive(Debug)]
pub struct ShutdownTrigger(watch::Sender<bool>);

impl ShutdownTrigger {
    pub fn trigger(&self) {
        // send_replace never fails, even with no receivers left
        self.0.send_replace(true);
    }
}

/// Receiving half, held by the loop
#[derive(Debug, Clone)]
pub struct Shutdown(watch::Receiver<bool>);

impl Shutdown {
    pub fn channel() -> (ShutdownTrigger, Shutdown) {
        let (tx, rx) = watch::channel(false);
        (ShutdownTrigger(tx), Shutdown(rx))
    }

    pub fn is_requested(&self) -> bool {
        *self.0.borrow()
    }

    /// Sleep for `period` unless shutdown is requested first.
    /// Returns true when interrupted.
    pub async fn sleep(&mut self, period: Duration) -> bool {
        if self.is_requested() {
            return true;
        }
        let deadline = tokio::time::sleep(period);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => return false,
                changed = self.0.changed() => match changed {
                    Ok(()) if *self.0.borrow_and_update() => return true,
                    Ok(()) => continue,
                    Err(_) => {
                        // trigger dropped, nobody can ask us to stop now
                        deadline.await;
                        return false;
                    }
                },
            }
        }
    }

    /// Resolves once shutdown has been requested
    pub async fn wait(&mut self) {
        while !self.is_requested() {
            if self.0.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
