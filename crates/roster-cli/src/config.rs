// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use roster_app::{
    BUFFER, DEBOUNCE_DELAY, INITIAL_DISPLAY_COUNT, LOAD_MORE_COUNT, LOAD_MORE_DELAY,
    ListSettings, SCROLL_THROTTLE_DELAY,
};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "roster";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_TIMEOUT: &str = "10s";
// Terminal rows: name line, email line, separator.
const DEFAULT_ITEM_ROWS: u32 = 3;
const DEFAULT_THRESHOLD_ROWS: u32 = 4;
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_FILE_NAME: &str = "roster.log";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub list: List,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            source: Source::default(),
            list: List::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    pub url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Source {
    fn default() -> Self {
        Self {
            url: Some(roster_app::API_URL.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct List {
    pub item_height: Option<u32>,
    pub buffer: Option<u32>,
    pub load_more_threshold: Option<u32>,
    pub initial_count: Option<usize>,
    pub page_step: Option<usize>,
    pub load_more_delay: Option<String>,
    pub debounce: Option<String>,
    pub scroll_throttle: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub path: Option<String>,
    pub level: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("ROSTER_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set ROSTER_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is missing `version = 1`; add it and keep values under [source], [list], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(url) = &self.source.url {
            roster_http::validate_source(url)
                .with_context(|| format!("invalid source.url in {}", path.display()))?;
        }

        if let Some(timeout) = &self.source.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed.is_zero() {
                bail!(
                    "source.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        let sizes = [
            ("item_height", self.list.item_height.map(u64::from)),
            (
                "load_more_threshold",
                self.list.load_more_threshold.map(u64::from),
            ),
            ("initial_count", self.list.initial_count.map(|n| n as u64)),
            ("page_step", self.list.page_step.map(|n| n as u64)),
        ];
        for (name, value) in sizes {
            if value == Some(0) {
                bail!("list.{name} in {} must be positive, got 0", path.display());
            }
        }

        for (name, value) in [
            ("load_more_delay", &self.list.load_more_delay),
            ("debounce", &self.list.debounce),
            ("scroll_throttle", &self.list.scroll_throttle),
        ] {
            if let Some(raw) = value {
                parse_duration(raw)
                    .with_context(|| format!("list.{name} in {}", path.display()))?;
            }
        }

        if let Some(level) = &self.log.level {
            crate::logging::log_filter(level, None)
                .with_context(|| format!("log.level in {}", path.display()))?;
        }

        Ok(())
    }

    pub fn source_url(&self) -> &str {
        self.source
            .url
            .as_deref()
            .map(str::trim)
            .unwrap_or(roster_app::API_URL)
    }

    pub fn source_timeout(&self) -> Result<Duration> {
        parse_duration(self.source.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    /// List tuning in terminal rows. The viewport height is a placeholder
    /// until the first resize reports the real terminal size.
    pub fn list_settings(&self) -> Result<ListSettings> {
        let list = &self.list;
        Ok(ListSettings {
            source: self.source_url().to_owned(),
            item_height: list.item_height.unwrap_or(DEFAULT_ITEM_ROWS),
            viewport_height: DEFAULT_ITEM_ROWS * 4,
            buffer: list.buffer.unwrap_or(BUFFER),
            load_more_threshold: list.load_more_threshold.unwrap_or(DEFAULT_THRESHOLD_ROWS),
            initial_count: list.initial_count.unwrap_or(INITIAL_DISPLAY_COUNT),
            page_step: list.page_step.unwrap_or(LOAD_MORE_COUNT),
            load_more_delay: duration_or(list.load_more_delay.as_deref(), LOAD_MORE_DELAY)?,
            debounce_delay: duration_or(list.debounce.as_deref(), DEBOUNCE_DELAY)?,
            scroll_throttle: duration_or(list.scroll_throttle.as_deref(), SCROLL_THROTTLE_DELAY)?,
        })
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.path {
            return Ok(PathBuf::from(path));
        }
        let data_root = dirs::data_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].path in the config file")
        })?;
        Ok(data_root.join(APP_NAME).join(LOG_FILE_NAME))
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# roster config\n# Place this file at: {}\n\nversion = 1\n\n[source]\nurl = \"{}\"\n# <N>ms, <N>s, or <N>m\ntimeout = \"{}\"\n\n[list]\n# Sizes are terminal rows.\nitem_height = {}\nbuffer = {}\nload_more_threshold = {}\ninitial_count = {}\npage_step = {}\nload_more_delay = \"300ms\"\ndebounce = \"300ms\"\nscroll_throttle = \"50ms\"\n\n[log]\n# Optional. Default is the platform data dir (for example ~/.local/share/roster/roster.log)\n# path = \"/absolute/path/to/roster.log\"\n# ROSTER_LOG overrides this filter.\nlevel = \"{}\"\n",
            path.display(),
            roster_app::API_URL,
            DEFAULT_TIMEOUT,
            DEFAULT_ITEM_ROWS,
            BUFFER,
            DEFAULT_THRESHOLD_ROWS,
            INITIAL_DISPLAY_COUNT,
            LOAD_MORE_COUNT,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn duration_or(raw: Option<&str>, default: Duration) -> Result<Duration> {
    raw.map_or(Ok(default), parse_duration)
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("duration {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 300ms or 10s)")
}
