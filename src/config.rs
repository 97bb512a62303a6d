/*
 *  config.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  YAML configuration layered under command line overrides
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

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::stations::{Preset, StationEntry, StationError, StationId, StationRegistry};
use crate::strip::ColorOrder;

pub const DEFAULT_METAR_URL: &str = "https://aviationweather.gov/api/data/metar";
pub const DEFAULT_LED_COUNT: usize = 50;
/// Longest string we will drive; a full frame stays well under a 64 KiB SPI transfer
pub const MAX_LED_COUNT: usize = 2048;
pub const DEFAULT_BRIGHTNESS: f32 = 0.3;
pub const DEFAULT_INTERVAL_MINS: u64 = 5;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Station table error: {0}")]
    Stations(#[from] StationError),
}

/// Configuration as read from YAML. Every field is optional so a file
/// only needs to name what it changes.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub strip: Option<StripConfig>,
    pub schedule: Option<ScheduleConfig>,
    pub metar: Option<MetarConfig>,
    pub connectivity: Option<ConnectivityConfig>,
    pub stations: Option<StationsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StripConfig {
    pub led_count: Option<usize>,
    pub brightness: Option<f32>,       // 0.0-1.0
    pub color_order: Option<ColorOrder>,
    pub driver: Option<DriverKind>,
    pub spi_bus: Option<u8>,
    pub spi_slave_select: Option<u8>,
    pub console_color: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScheduleConfig {
    pub interval_mins: Option<u64>,
    pub self_test: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetarConfig {
    pub base_url: Option<String>,
    pub lookback_hours: Option<u32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConnectivityConfig {
    pub enabled: Option<bool>,
    pub failure_threshold: Option<u32>,
    pub probe_timeout_secs: Option<u64>,
    pub endpoints: Option<Vec<String>>,
    pub fault_duration_secs: Option<u64>,
    pub flash_interval_ms: Option<u64>,
    pub cooldown_secs: Option<u64>,
}

/// Either a built-in layout or an explicit list; the list wins
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StationsConfig {
    pub preset: Option<Preset>,
    pub list: Option<Vec<StationEntry>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// WS2812 on the Raspberry Pi SPI bus
    #[default]
    Spi,
    /// Frames logged to the terminal
    Console,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "metarmap", version, about = "METAR flight categories on an LED sectional map")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug log level
    #[arg(short = 'v', long, alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    /// Number of LEDs on the string
    #[arg(short = 'n', long)]
    pub led_count: Option<usize>,
    /// Minutes between refreshes
    #[arg(short = 'i', long)]
    pub interval: Option<u64>,
    /// Built-in station layout
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,
    /// Skip network probing and never show the fault pattern
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_connectivity_check: bool,
    /// Failed probes in a row before the fault pattern
    #[arg(long)]
    pub fault_threshold: Option<u32>,
    /// Render to the terminal instead of the SPI strip
    #[arg(long, action = ArgAction::SetTrue)]
    pub emulated: bool,
    /// Skip the power-on color cycle
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_self_test: bool,
    /// Fetch once, print a category table and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub once: bool,
    /// With --once, print per-station report detail
    #[arg(long, action = ArgAction::SetTrue, requires = "once")]
    pub detail: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
    /// Plain '.'/'#' cells in --emulated output, no ANSI color
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_color: bool,
    /// With --once, look up these airports instead of the configured map
    #[arg(value_name = "ID", requires = "once")]
    pub ids: Vec<StationId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StripSettings {
    pub led_count: usize,
    pub brightness: f32,
    pub color_order: ColorOrder,
    pub driver: DriverKind,
    pub spi_bus: u8,
    pub spi_slave_select: u8,
    /// ANSI truecolor cells for the console driver
    pub console_color: bool,
}

impl Default for StripSettings {
    fn default() -> Self {
        Self {
            led_count: DEFAULT_LED_COUNT,
            brightness: DEFAULT_BRIGHTNESS,
            color_order: ColorOrder::default(),
            driver: DriverKind::default(),
            spi_bus: 0,
            spi_slave_select: 0,
            console_color: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSettings {
    pub interval: Duration,
    pub self_test: bool,
    pub self_test_step: Duration,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_MINS * 60),
            self_test: true,
            self_test_step: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetarSettings {
    pub base_url: String,
    pub lookback_hours: u32,
    pub timeout_secs: u64,
}

impl Default for MetarSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_METAR_URL.to_string(),
            lookback_hours: 2,
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectivitySettings {
    pub enabled: bool,
    pub failure_threshold: u32,
    pub probe_timeout_secs: u64,
    pub endpoints: Vec<String>,
    pub fault_duration_secs: u64,
    pub flash_interval_ms: u64,
    pub cooldown_secs: u64,
}

impl Default for ConnectivitySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_threshold: 2,
            probe_timeout_secs: 5,
            endpoints: vec![
                "1.1.1.1:53".to_string(),
                "8.8.8.8:53".to_string(),
                "aviationweather.gov:443".to_string(),
            ],
            fault_duration_secs: 10,
            flash_interval_ms: 500,
            cooldown_secs: 30,
        }
    }
}

impl ConnectivitySettings {
    pub fn flash_interval(&self) -> Duration {
        Duration::from_millis(self.flash_interval_ms)
    }

    pub fn fault_duration(&self) -> Duration {
        Duration::from_secs(self.fault_duration_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

/// Fully resolved runtime settings: defaults filled, ranges checked
#[derive(Debug, Clone)]
pub struct Settings {
    pub log_level: String,
    pub strip: StripSettings,
    pub schedule: ScheduleSettings,
    pub metar: MetarSettings,
    pub connectivity: ConnectivitySettings,
    pub registry: StationRegistry,
}

/// Public entry point: read YAML (explicit path or search), layer the CLI on top.
/// Also returns the file that was read, if any, so the caller can log it
/// once logging is up.
pub fn load(cli: &Cli) -> Result<(Config, Option<PathBuf>), ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    let source = match cli.config.as_ref() {
        Some(p) if !p.exists() => {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
        Some(p) => Some(p.clone()),
        None => find_config_file(),
    };
    if let Some(p) = source.as_ref() {
        merge(&mut cfg, read_yaml(p)?);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    Ok((cfg, source))
}

/// Pretty YAML of the effective config (nice for debugging)
pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/metarmap/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/metarmap/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/metarmap.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["metarmap.yaml", "config.yaml", "config/metarmap.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    // an empty file is a valid, empty config
    if s.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(s)?)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
pub fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    match (&mut dst.strip, src.strip) {
        (None, Some(c)) => dst.strip = Some(c),
        (Some(d), Some(s)) => merge_strip(d, s),
        _ => {}
    }
    match (&mut dst.schedule, src.schedule) {
        (None, Some(c)) => dst.schedule = Some(c),
        (Some(d), Some(s)) => {
            if s.interval_mins.is_some() { d.interval_mins = s.interval_mins; }
            if s.self_test.is_some()     { d.self_test = s.self_test; }
        }
        _ => {}
    }
    match (&mut dst.metar, src.metar) {
        (None, Some(c)) => dst.metar = Some(c),
        (Some(d), Some(s)) => {
            if s.base_url.is_some()       { d.base_url = s.base_url; }
            if s.lookback_hours.is_some() { d.lookback_hours = s.lookback_hours; }
            if s.timeout_secs.is_some()   { d.timeout_secs = s.timeout_secs; }
        }
        _ => {}
    }
    match (&mut dst.connectivity, src.connectivity) {
        (None, Some(c)) => dst.connectivity = Some(c),
        (Some(d), Some(s)) => merge_connectivity(d, s),
        _ => {}
    }
    match (&mut dst.stations, src.stations) {
        (None, Some(c)) => dst.stations = Some(c),
        (Some(d), Some(s)) => {
            if s.preset.is_some() { d.preset = s.preset; }
            if s.list.is_some()   { d.list = s.list; }
        }
        _ => {}
    }
}

fn merge_strip(dst: &mut StripConfig, src: StripConfig) {
    if src.led_count.is_some()        { dst.led_count = src.led_count; }
    if src.brightness.is_some()       { dst.brightness = src.brightness; }
    if src.color_order.is_some()      { dst.color_order = src.color_order; }
    if src.driver.is_some()           { dst.driver = src.driver; }
    if src.spi_bus.is_some()          { dst.spi_bus = src.spi_bus; }
    if src.spi_slave_select.is_some() { dst.spi_slave_select = src.spi_slave_select; }
    if src.console_color.is_some()    { dst.console_color = src.console_color; }
}

fn merge_connectivity(dst: &mut ConnectivityConfig, src: ConnectivityConfig) {
    if src.enabled.is_some()             { dst.enabled = src.enabled; }
    if src.failure_threshold.is_some()   { dst.failure_threshold = src.failure_threshold; }
    if src.probe_timeout_secs.is_some()  { dst.probe_timeout_secs = src.probe_timeout_secs; }
    if src.endpoints.is_some()           { dst.endpoints = src.endpoints; }
    if src.fault_duration_secs.is_some() { dst.fault_duration_secs = src.fault_duration_secs; }
    if src.flash_interval_ms.is_some()   { dst.flash_interval_ms = src.flash_interval_ms; }
    if src.cooldown_secs.is_some()       { dst.cooldown_secs = src.cooldown_secs; }
}

pub fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.debug { cfg.log_level = Some("debug".to_string()); }

    if cli.led_count.is_some() || cli.emulated || cli.no_color {
        let strip = cfg.strip.get_or_insert_with(StripConfig::default);
        if cli.led_count.is_some() { strip.led_count = cli.led_count; }
        if cli.emulated            { strip.driver = Some(DriverKind::Console); }
        if cli.no_color            { strip.console_color = Some(false); }
    }
    if cli.interval.is_some() || cli.no_self_test {
        let schedule = cfg.schedule.get_or_insert_with(ScheduleConfig::default);
        if cli.interval.is_some() { schedule.interval_mins = cli.interval; }
        if cli.no_self_test       { schedule.self_test = Some(false); }
    }
    if cli.no_connectivity_check || cli.fault_threshold.is_some() {
        let conn = cfg.connectivity.get_or_insert_with(ConnectivityConfig::default);
        if cli.no_connectivity_check     { conn.enabled = Some(false); }
        if cli.fault_threshold.is_some() { conn.failure_threshold = cli.fault_threshold; }
    }
    if cli.preset.is_some() {
        // a preset on the command line replaces any configured list
        cfg.stations = Some(StationsConfig { preset: cli.preset, list: None });
    }
}

impl Settings {
    /// Fill defaults and check every invariant
    pub fn resolve(cfg: &Config) -> Result<Settings, ConfigError> {
        let log_level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
        match log_level.to_ascii_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" | "off" => {}
            other => return Err(invalid(format!("log_level '{}' is not a log level", other))),
        }

        let mut strip = StripSettings::default();
        if let Some(s) = cfg.strip.as_ref() {
            if let Some(v) = s.led_count        { strip.led_count = v; }
            if let Some(v) = s.brightness       { strip.brightness = v; }
            if let Some(v) = s.color_order      { strip.color_order = v; }
            if let Some(v) = s.driver           { strip.driver = v; }
            if let Some(v) = s.spi_bus          { strip.spi_bus = v; }
            if let Some(v) = s.spi_slave_select { strip.spi_slave_select = v; }
            if let Some(v) = s.console_color    { strip.console_color = v; }
        }
        if strip.led_count == 0 || strip.led_count > MAX_LED_COUNT {
            return Err(invalid(format!("strip led_count must be 1..={}", MAX_LED_COUNT)));
        }
        if !(0.0..=1.0).contains(&strip.brightness) {
            return Err(invalid("strip brightness must be 0.0..=1.0"));
        }

        let mut schedule = ScheduleSettings::default();
        if let Some(s) = cfg.schedule.as_ref() {
            if let Some(mins) = s.interval_mins {
                if mins == 0 {
                    return Err(invalid("schedule interval_mins must be >= 1"));
                }
                schedule.interval = Duration::from_secs(mins * 60);
            }
            if let Some(v) = s.self_test { schedule.self_test = v; }
        }

        let mut metar = MetarSettings::default();
        if let Some(m) = cfg.metar.as_ref() {
            if let Some(v) = m.base_url.as_ref()  { metar.base_url = v.clone(); }
            if let Some(v) = m.lookback_hours     { metar.lookback_hours = v; }
            if let Some(v) = m.timeout_secs       { metar.timeout_secs = v; }
        }
        if !(metar.base_url.starts_with("http://") || metar.base_url.starts_with("https://")) {
            return Err(invalid("metar base_url must be an http(s) URL"));
        }
        if metar.lookback_hours == 0 {
            return Err(invalid("metar lookback_hours must be >= 1"));
        }
        if metar.timeout_secs == 0 {
            return Err(invalid("metar timeout_secs must be > 0"));
        }

        let mut connectivity = ConnectivitySettings::default();
        if let Some(c) = cfg.connectivity.as_ref() {
            if let Some(v) = c.enabled             { connectivity.enabled = v; }
            if let Some(v) = c.failure_threshold   { connectivity.failure_threshold = v; }
            if let Some(v) = c.probe_timeout_secs  { connectivity.probe_timeout_secs = v; }
            if let Some(v) = c.endpoints.as_ref()  { connectivity.endpoints = v.clone(); }
            if let Some(v) = c.fault_duration_secs { connectivity.fault_duration_secs = v; }
            if let Some(v) = c.flash_interval_ms   { connectivity.flash_interval_ms = v; }
            if let Some(v) = c.cooldown_secs       { connectivity.cooldown_secs = v; }
        }
        if connectivity.failure_threshold == 0 {
            return Err(invalid("connectivity failure_threshold must be >= 1"));
        }
        if connectivity.probe_timeout_secs == 0 {
            return Err(invalid("connectivity probe_timeout_secs must be > 0"));
        }
        if connectivity.flash_interval_ms == 0 {
            return Err(invalid("connectivity flash_interval_ms must be > 0"));
        }
        if connectivity.enabled && connectivity.endpoints.is_empty() {
            return Err(invalid("connectivity endpoints must not be empty when enabled"));
        }
        if let Some(bad) = connectivity.endpoints.iter().find(|e| e.rsplit_once(':').is_none_or(|(_, port)| port.parse::<u16>().is_err())) {
            return Err(invalid(format!("connectivity endpoint '{}' is not host:port", bad)));
        }

        let stations = cfg.stations.clone().unwrap_or_default();
        let registry = match stations.list {
            Some(list) => StationRegistry::new(list, strip.led_count)?,
            None => StationRegistry::from_preset(stations.preset.unwrap_or(Preset::Southeast), strip.led_count)?,
        };

        Ok(Settings { log_level, strip, schedule, metar, connectivity, registry })
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Validation(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["metarmap"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_resolve() {
        let s = Settings::resolve(&Config::default()).unwrap();
        assert_eq!(s.log_level, "info");
        assert_eq!(s.strip.led_count, 50);
        assert_eq!(s.strip.color_order, ColorOrder::Grb);
        assert_eq!(s.strip.driver, DriverKind::Spi);
        assert_eq!(s.schedule.interval, Duration::from_secs(300));
        assert!(s.schedule.self_test);
        assert_eq!(s.metar.base_url, DEFAULT_METAR_URL);
        assert_eq!(s.metar.lookback_hours, 2);
        assert_eq!(s.connectivity.failure_threshold, 2);
        assert_eq!(s.connectivity.cooldown(), Duration::from_secs(30));
        assert_eq!(s.registry.len(), 32);
    }

    #[test]
    fn test_yaml_parse_and_resolve() {
        let yaml = r#"
log_level: warn
strip:
  led_count: 60
  brightness: 0.5
  color_order: rgb
  driver: console
schedule:
  interval_mins: 10
  self_test: false
connectivity:
  failure_threshold: 3
  endpoints: ["10.0.0.1:53"]
stations:
  list:
    - { id: kbos, position: 4, name: Boston }
    - { id: KORH, position: 7 }
"#;
        let cfg = parse_yaml(yaml).unwrap();
        let s = Settings::resolve(&cfg).unwrap();
        assert_eq!(s.log_level, "warn");
        assert_eq!(s.strip.led_count, 60);
        assert_eq!(s.strip.color_order, ColorOrder::Rgb);
        assert_eq!(s.strip.driver, DriverKind::Console);
        assert_eq!(s.schedule.interval, Duration::from_secs(600));
        assert!(!s.schedule.self_test);
        assert_eq!(s.connectivity.failure_threshold, 3);
        assert_eq!(s.connectivity.endpoints, vec!["10.0.0.1:53".to_string()]);
        assert_eq!(s.registry.len(), 2);
        assert_eq!(s.registry.position_of(&StationId::new("KBOS").unwrap()), Some(4));
    }

    #[test]
    fn test_cli_takes_precedence_over_yaml() {
        let yaml = "strip:\n  led_count: 60\nschedule:\n  interval_mins: 10\nstations:\n  preset: southeast\n";
        let mut cfg = parse_yaml(yaml).unwrap();
        apply_cli_overrides(
            &mut cfg,
            &cli(&["-n", "45", "-i", "2", "--preset", "new-england", "--emulated", "--fault-threshold", "4"]),
        );
        let s = Settings::resolve(&cfg).unwrap();
        assert_eq!(s.strip.led_count, 45);
        assert_eq!(s.strip.driver, DriverKind::Console);
        assert_eq!(s.schedule.interval, Duration::from_secs(120));
        assert_eq!(s.connectivity.failure_threshold, 4);
        assert!(s.registry.contains(&StationId::new("KBOS").unwrap()));
    }

    #[test]
    fn test_cli_switches() {
        let mut cfg = Config::default();
        apply_cli_overrides(&mut cfg, &cli(&["--no-connectivity-check", "--no-self-test", "-v"]));
        let s = Settings::resolve(&cfg).unwrap();
        assert!(!s.connectivity.enabled);
        assert!(!s.schedule.self_test);
        assert_eq!(s.log_level, "debug");
    }

    #[test]
    fn test_detail_requires_once() {
        assert!(Cli::try_parse_from(["metarmap", "--detail"]).is_err());
        let c = cli(&["--once", "--detail"]);
        assert!(c.once && c.detail);
    }

    #[test]
    fn test_adhoc_ids_with_once() {
        let c = cli(&["--once", "kbos", "KORH"]);
        assert_eq!(c.ids, vec![StationId::new("KBOS").unwrap(), StationId::new("KORH").unwrap()]);
        assert!(Cli::try_parse_from(["metarmap", "KBOS"]).is_err());
        assert!(Cli::try_parse_from(["metarmap", "--once", "K-OS"]).is_err());
    }

    #[test]
    fn test_no_color_switch() {
        assert!(Settings::resolve(&Config::default()).unwrap().strip.console_color);

        let mut cfg = Config::default();
        apply_cli_overrides(&mut cfg, &cli(&["--emulated", "--no-color"]));
        let s = Settings::resolve(&cfg).unwrap();
        assert!(!s.strip.console_color);

        let cfg = parse_yaml("strip:\n  console_color: false\n").unwrap();
        assert!(!Settings::resolve(&cfg).unwrap().strip.console_color);
    }

    #[test]
    fn test_merge_is_option_by_option() {
        let mut base = parse_yaml("strip:\n  led_count: 60\n  brightness: 0.2\n").unwrap();
        merge(&mut base, parse_yaml("strip:\n  brightness: 0.9\n").unwrap());
        let strip = base.strip.unwrap();
        assert_eq!(strip.led_count, Some(60));
        assert_eq!(strip.brightness, Some(0.9));
    }

    #[test]
    fn test_validation_failures() {
        let bad = [
            "strip:\n  led_count: 0\n",
            "strip:\n  led_count: 2049\n",
            "strip:\n  brightness: 1.5\n",
            "schedule:\n  interval_mins: 0\n",
            "metar:\n  base_url: ftp://example.com\n",
            "connectivity:\n  failure_threshold: 0\n",
            "connectivity:\n  endpoints: []\n",
            "connectivity:\n  endpoints: [\"no-port\"]\n",
            "log_level: loud\n",
        ];
        for yaml in bad {
            let cfg = parse_yaml(yaml).unwrap();
            assert!(
                matches!(Settings::resolve(&cfg), Err(ConfigError::Validation(_))),
                "accepted: {}",
                yaml
            );
        }
    }

    #[test]
    fn test_station_table_errors_surface() {
        let cfg = parse_yaml("strip:\n  led_count: 20\nstations:\n  preset: new-england\n").unwrap();
        assert!(matches!(Settings::resolve(&cfg), Err(ConfigError::Stations(_))));

        let cfg = parse_yaml("stations:\n  list:\n    - { id: KBOS, position: 1 }\n    - { id: KBOS, position: 2 }\n").unwrap();
        assert!(matches!(Settings::resolve(&cfg), Err(ConfigError::Stations(StationError::DuplicateStation(_)))));
    }

    #[test]
    fn test_empty_file_and_dump() {
        let cfg = parse_yaml("  \n").unwrap();
        assert!(cfg.strip.is_none());
        let out = dump(&parse_yaml("strip:\n  led_count: 12\n").unwrap()).unwrap();
        assert!(out.contains("led_count: 12"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let c = cli(&["--config", "/nonexistent/metarmap.yaml"]);
        assert!(matches!(load(&c), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_explicit_file_is_reported() {
        let path = std::env::temp_dir().join(format!("metarmap-{}.yaml", std::process::id()));
        fs::write(&path, "strip:\n  led_count: 33\n").unwrap();
        let c = cli(&["--config", path.to_str().unwrap(), "-i", "7"]);

        let (cfg, source) = load(&c).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(source.as_deref(), Some(path.as_path()));
        let s = Settings::resolve(&cfg).unwrap();
        assert_eq!(s.strip.led_count, 33);
        assert_eq!(s.schedule.interval, Duration::from_secs(420));
    }
}
