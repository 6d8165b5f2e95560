// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Low-level Garmin Connect HTTP client.
//!
//! Handles:
//! - Cookie persistence across requests (the login is cookie based)
//! - Form, query and multipart requests
//! - Status checking and JSON decoding of responses

use crate::config::Config;
use crate::error::{GarminError, Result};
use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

pub const SIGNIN_PATH: &str = "/signin";
pub const USERNAME_PATH: &str = "/user/username";
pub const ACCOUNT_PATH: &str = "/proxy/user-service-1.0/json/account";
pub const UPLOAD_PATH: &str = "/proxy/upload-service-1.1/json/upload/";
pub const RENAME_PATH: &str = "/proxy/activity-service-1.3/json/name/";
pub const ACTIVITY_PATH: &str = "/proxy/activity-service-1.3/json/activity/";
pub const SEARCH_PATH: &str = "/proxy/activity-search-service-1.2/json/activities";

/// Longest body excerpt carried in an error message.
const BODY_EXCERPT_LEN: usize = 200;

/// Blocking Garmin Connect client bound to one cookie store.
#[derive(Clone)]
pub struct GarminClient {
    http: Client,
    base_url: String,
}

impl GarminClient {
    /// Build a client with its own cookie store and the configured timeout.
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GarminError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_http(http, config))
    }

    /// Wrap an externally built client. It should have a cookie store
    /// enabled or sign in will not stick.
    pub fn with_http(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a service path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a page and discard the body (used to collect cookies).
    pub fn get(&self, path: &str) -> Result<()> {
        let response = self.send(self.http.get(self.url(path)))?;
        check_response(response)?;
        Ok(())
    }

    /// GET with query parameters and decode a JSON body.
    pub fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self.send(self.http.get(self.url(path)).query(query))?;
        check_response_json(response)
    }

    /// POST a url-encoded form and discard the body.
    pub fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<()> {
        let response = self.send(self.http.post(self.url(path)).form(form))?;
        check_response(response)?;
        Ok(())
    }

    /// POST a url-encoded form and decode a JSON body.
    pub fn post_form_json<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T> {
        let response = self.send(self.http.post(self.url(path)).form(form))?;
        check_response_json(response)
    }

    /// POST a multipart form and decode a JSON body.
    pub fn post_multipart_json<T: DeserializeOwned>(
        &self,
        path: &str,
        form: multipart::Form,
    ) -> Result<T> {
        let response = self.send(self.http.post(self.url(path)).multipart(form))?;
        check_response_json(response)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        request
            .send()
            .map_err(|e| GarminError::Transport(e.to_string()))
    }
}

/// Check response status and return error if not successful.
fn check_response(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let url = response.url().path().to_string();
    let body = response.text().unwrap_or_default();
    tracing::debug!(status = %status, url = %url, "Garmin Connect request failed");

    Err(GarminError::Transport(format!(
        "HTTP {} from {}: {}",
        status,
        url,
        excerpt(&body)
    )))
}

/// Check response and parse JSON body.
fn check_response_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = check_response(response)?
        .text()
        .map_err(|e| GarminError::Transport(format!("Failed to read body: {}", e)))?;

    serde_json::from_str(&body)
        .map_err(|e| GarminError::Parse(format!("{} in {:?}", e, excerpt(&body))))
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
