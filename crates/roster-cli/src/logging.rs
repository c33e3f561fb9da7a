// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "ROSTER_LOG";

/// The terminal belongs to the UI, so events go to an append-only file.
pub fn init(path: &Path, level: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {}; set [log].path to a writable location",
                path.display()
            )
        })?;

    let filter = log_filter(level, env::var(LOG_ENV).ok())?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;
    Ok(())
}

/// `ROSTER_LOG` wins over the configured level when both are set.
pub fn log_filter(level: &str, env_override: Option<String>) -> Result<EnvFilter> {
    if let Some(directives) = env_override.filter(|value| !value.trim().is_empty()) {
        return EnvFilter::try_new(&directives)
            .with_context(|| format!("invalid {LOG_ENV} filter {directives:?}"));
    }
    EnvFilter::try_new(level).with_context(|| {
        format!("invalid log level {level:?}; use a filter such as info or roster_app=debug")
    })
}

#[cfg(test)]
mod tests {
    use super::log_filter;
    use anyhow::Result;

    #[test]
    fn configured_level_is_used_without_override() -> Result<()> {
        let filter = log_filter("debug", None)?;
        assert_eq!(filter.to_string(), "debug");
        Ok(())
    }

    #[test]
    fn env_override_wins() -> Result<()> {
        let filter = log_filter("info", Some("roster_http=trace".to_owned()))?;
        assert_eq!(filter.to_string(), "roster_http=trace");
        Ok(())
    }

    #[test]
    fn blank_env_override_is_ignored() -> Result<()> {
        let filter = log_filter("warn", Some("  ".to_owned()))?;
        assert_eq!(filter.to_string(), "warn");
        Ok(())
    }

    #[test]
    fn invalid_levels_are_reported() {
        let error = log_filter("roster=verbose", None).expect_err("bad level should fail");
        assert!(error.to_string().contains("invalid log level"));
        let error = log_filter("info", Some("roster=verbose".to_owned()))
            .expect_err("bad override should fail");
        assert!(error.to_string().contains("ROSTER_LOG"));
    }

    #[test]
    fn init_creates_parent_directories() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("roster.log");
        // A global subscriber may already be installed by another test; only
        // the file setup is under test here.
        let _ = super::init(&path, "info");
        assert!(path.exists());
        Ok(())
    }
}
