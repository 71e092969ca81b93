//! Blocking client for the Practicum `homework_statuses` endpoint.

#![allow(missing_docs)]

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;

use crate::core::config::HttpConfig;
use crate::core::errors::{HsbError, Result};
use crate::source::StatusSource;

pub struct PracticumSource {
    http: Client,
    endpoint: String,
    token: String,
}

impl PracticumSource {
    pub fn new(endpoint: &str, token: &str, http: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(http.timeout_secs))
            .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
            .build()
            .map_err(|err| HsbError::Configuration {
                details: format!("cannot build status API HTTP client: {err}"),
            })?;
        Ok(Self {
            http: client,
            endpoint: endpoint.to_string(),
            token: token.to_string(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn authorization(&self) -> String {
        format!("OAuth {}", self.token)
    }
}

impl StatusSource for PracticumSource {
    fn fetch(&self, since: i64) -> Result<Value> {
        tracing::debug!(endpoint = %self.endpoint, from_date = since, "requesting homework statuses");
        let response = self
            .http
            .get(&self.endpoint)
            .header(AUTHORIZATION, self.authorization())
            .query(&[("from_date", since)])
            .send()
            .map_err(|err| HsbError::ApiResponse {
                details: format!("request to {} failed: {}", self.endpoint, err.without_url()),
            })?;

        let status = response.status();
        let body = response.text().map_err(|err| HsbError::ApiResponse {
            details: format!("reading body from {} failed: {}", self.endpoint, err.without_url()),
        })?;
        interpret_response(&self.endpoint, status, &body)
    }
}

fn interpret_response(endpoint: &str, status: StatusCode, body: &str) -> Result<Value> {
    if !status.is_success() {
        return Err(HsbError::ApiResponse {
            details: format!("{endpoint} returned HTTP {}", status.as_u16()),
        });
    }
    serde_json::from_str(body).map_err(|err| HsbError::ApiResponse {
        details: format!("{endpoint} returned a malformed body: {err}"),
    })
}
