//! Stateless HTTP request builder and response parser for homerunner.
//!
//! # Design
//! `HomerunnerClient` holds only a `base_url` and carries no mutable state
//! between calls. Each endpoint is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. `Homerunner` glues the two halves to a transport; callers
//! with their own HTTP stack can drive the halves directly.

use crate::config::HomerunnerConfig;
use crate::error::{HomerunnerError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateOptions, CreateResponse, DestroyOptions};

/// Synchronous, stateless client for the homerunner API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomerunnerClient {
    base_url: String,
}

impl HomerunnerClient {
    /// Client for the homerunner at `base_url`. One trailing `/` is dropped.
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.strip_suffix('/').unwrap_or(base_url);
        Self {
            base_url: base_url.to_string(),
        }
    }

    pub fn from_config(config: &HomerunnerConfig) -> Self {
        Self::new(&config.base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_create(&self, options: &CreateOptions) -> Result<HttpRequest> {
        self.json_post("create", options)
    }

    pub fn build_destroy(&self, blueprint_name: &str) -> Result<HttpRequest> {
        let options = DestroyOptions {
            blueprint_name: blueprint_name.to_string(),
        };
        self.json_post("destroy", &options)
    }

    pub fn build_health(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/health", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    /// The body is not validated beyond being a JSON object; unexpected keys
    /// are kept in `CreateResponse::extra`.
    pub fn parse_create(&self, response: HttpResponse) -> Result<CreateResponse> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(HomerunnerError::Deserialization)
    }

    /// The body of a successful destroy is ignored.
    pub fn parse_destroy(&self, response: HttpResponse) -> Result<()> {
        check_status(&response)
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<()> {
        if response.status != 200 {
            return Err(HomerunnerError::Unhealthy);
        }
        Ok(())
    }

    fn json_post<T: serde::Serialize>(&self, endpoint: &str, payload: &T) -> Result<HttpRequest> {
        let body = serde_json::to_string(payload).map_err(HomerunnerError::Serialization)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}/{endpoint}", self.base_url),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

/// Anything but 200 is a rejected request.
fn check_status(response: &HttpResponse) -> Result<()> {
    if response.status == 200 {
        return Ok(());
    }
    Err(HomerunnerError::Request {
        status: response.status,
        body: response.body.clone(),
    })
}
