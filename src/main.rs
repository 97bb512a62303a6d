/*
 *  main.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  Entry point: config, logging, signals, then the refresh loop
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

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use tokio::signal::unix::{signal, SignalKind};

use metarmap::acquirer::{MetarClient, MetarSource};
use metarmap::config::{self, Cli, Settings};
use metarmap::connectivity::TcpProbe;
use metarmap::renderer::Renderer;
use metarmap::report;
use metarmap::scheduler::Scheduler;
use metarmap::shutdown::{Shutdown, ShutdownTrigger};
use metarmap::stations::StationRegistry;
use metarmap::strip::{open_strip, Palette};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Asynchronously waits for a SIGINT, SIGTERM, or SIGHUP signal,
/// then asks the loop to stop.
async fn signal_handler(trigger: ShutdownTrigger) -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    trigger.trigger();
    Ok(())
}

/// Single fetch, printed as a table
async fn run_once(settings: &Settings, registry: &StationRegistry, detail: bool) -> Result<()> {
    let client = MetarClient::new(&settings.metar).context("building HTTP client")?;
    let ids = registry.ids();
    println!("Fetching METAR data for airports: {}", ids.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(", "));
    println!("{}", "=".repeat(84));

    let snapshot = client.fetch(&ids).await;
    if snapshot.is_empty() {
        println!("No data retrieved. Check the station list and network, then try again.");
        return Ok(());
    }
    print!("{}", report::table(&snapshot, registry));
    if detail {
        print!("{}", report::detail(&snapshot, registry));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (cfg, source) = config::load(&cli).context("loading configuration")?;
    if cli.dump_config {
        print!("{}", config::dump(&cfg)?);
        return Ok(());
    }
    let settings = Settings::resolve(&cfg).context("invalid configuration")?;

    // Initialize the logger with the appropriate level based on debug flag
    env_logger::Builder::from_env(Env::default().default_filter_or(settings.log_level.as_str()))
        .format_timestamp_secs()
        .init();

    info!("{} - flight categories in lights", env!("CARGO_PKG_NAME"));
    info!("v.{} built {} ({})", env!("CARGO_PKG_VERSION"), BUILD_DATE, BUILD_PROFILE);
    match source {
        Some(p) => info!("Using config file {}", p.display()),
        None => info!("No config file found, using defaults and command line"),
    }

    if cli.once {
        let registry = if cli.ids.is_empty() {
            settings.registry.clone()
        } else {
            StationRegistry::adhoc(&cli.ids).context("building station list")?
        };
        return run_once(&settings, &registry, cli.detail).await;
    }

    let strip = open_strip(&settings.strip).context("opening LED strip")?;
    let renderer = Renderer::new(strip, settings.registry.clone(), Palette::default());
    let source = MetarClient::new(&settings.metar).context("building HTTP client")?;
    let probe = TcpProbe::from_settings(&settings.connectivity);

    if settings.connectivity.enabled {
        info!(
            "Connectivity check: fault after {} failed probes of {}",
            settings.connectivity.failure_threshold,
            probe.endpoints().join(", ")
        );
    } else {
        info!("Connectivity check disabled");
    }

    let (trigger, shutdown) = Shutdown::channel();
    tokio::spawn(async move {
        if let Err(e) = signal_handler(trigger).await {
            error!("Signal handler failed: {}", e);
        }
    });

    let mut scheduler = Scheduler::new(
        source,
        probe,
        renderer,
        settings.schedule.clone(),
        settings.connectivity.clone(),
    );
    scheduler.run(shutdown).await;

    info!("Clean exit after {} updates", scheduler.cycles());
    Ok(())
}
