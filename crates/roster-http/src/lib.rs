// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client as HttpClient;
use roster_app::{CancelToken, FetchError, Fetcher, UserPayload};
use std::time::Duration;
use url::Url;

/// Blocking JSON fetcher for user directories.
#[derive(Debug, Clone)]
pub struct Client {
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            bail!("source.timeout must be positive");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self { timeout, http })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn fetch_users(&self, source: &str) -> Result<UserPayload, FetchError> {
        self.fetch(source, &CancelToken::new())
    }
}

impl Fetcher for Client {
    fn fetch(&self, key: &str, cancel: &CancelToken) -> Result<UserPayload, FetchError> {
        let response = self
            .http
            .get(key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|error| connection_error(key, &error))?;

        // The blocking client cannot be interrupted mid-request; check once the
        // headers are in so a superseded request skips reading the body.
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(source = key, status = status.as_u16(), "non-success status");
            return Err(FetchError::Network {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .map_err(|error| FetchError::transport(format!("read response body: {error}")))?;
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        decode_payload(&body)
    }
}

pub fn decode_payload(body: &[u8]) -> Result<UserPayload, FetchError> {
    serde_json::from_slice(body)
        .map_err(|error| FetchError::transport(format!("decode user list: {error}")))
}

/// Accepts only absolute http(s) URLs.
pub fn validate_source(raw: &str) -> Result<Url> {
    let parsed = Url::parse(raw.trim())
        .with_context(|| format!("source url {raw:?} is not a valid absolute URL"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => bail!("source url {raw:?} uses unsupported scheme {other:?}; use http or https"),
    }
}

fn connection_error(source: &str, error: &reqwest::Error) -> FetchError {
    if error.is_timeout() {
        return FetchError::transport(format!("request to {source} timed out"));
    }
    FetchError::transport(format!("cannot reach {source} ({error})"))
}

#[cfg(test)]
mod tests {
    use super::{Client, decode_payload, validate_source};
    use roster_app::FetchError;
    use std::time::Duration;

    #[test]
    fn zero_timeout_is_rejected() {
        let error = Client::new(Duration::ZERO).expect_err("zero timeout should fail");
        assert!(error.to_string().contains("must be positive"));
    }

    #[test]
    fn decode_payload_reads_users() {
        let payload = decode_payload(br#"{"users":[{"id":1,"name":"Alice Smith","email":"a@x"}]}"#)
            .expect("valid payload");
        assert_eq!(payload.len(), 1);
    }

    #[test]
    fn decode_payload_maps_malformed_json_to_transport() {
        let error = decode_payload(b"<html>").expect_err("html is not json");
        assert!(matches!(error, FetchError::Transport(message) if message.starts_with("decode user list")));
    }

    #[test]
    fn validate_source_accepts_http_and_https() {
        assert!(validate_source("https://example.com/api.json").is_ok());
        assert!(validate_source("http://127.0.0.1:8080/users").is_ok());
    }

    #[test]
    fn validate_source_rejects_other_inputs() {
        let error = validate_source("ftp://example.com/users").expect_err("ftp rejected");
        assert!(error.to_string().contains("unsupported scheme"));
        let error = validate_source("not a url").expect_err("garbage rejected");
        assert!(error.to_string().contains("not a valid absolute URL"));
    }
}
