//! Executing client for homerunner.
//!
//! # Design
//! `Homerunner` pairs a `HomerunnerClient` with a `Transport`: every call
//! builds one request, executes it once, and parses the response. Nothing is
//! retried or cached, and no timeout is applied beyond what the transport
//! itself enforces. The runner holds no mutable state, so it can be shared
//! across threads whenever the transport can.

use tracing::{debug, warn};

use crate::client::HomerunnerClient;
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{CreateOptions, CreateResponse};

/// A homerunner client bound to a transport.
#[derive(Debug, Clone)]
pub struct Homerunner<T> {
    client: HomerunnerClient,
    transport: T,
}

impl<T: Transport> Homerunner<T> {
    pub fn new(client: HomerunnerClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &HomerunnerClient {
        &self.client
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Deploy a blueprint, either a static one by name or an inline one.
    pub fn create(&self, options: impl Into<CreateOptions>) -> Result<CreateResponse> {
        let options = options.into();
        let request = self.client.build_create(&options)?;
        let response = self.round_trip(request)?;
        let created = self.client.parse_create(response)?;
        debug!(
            blueprint = options.blueprint_name(),
            homeservers = created.homeservers.len(),
            expires = %created.expires,
            "homerunner deployment created"
        );
        Ok(created)
    }

    /// Tear down the deployment of `blueprint_name`.
    pub fn destroy(&self, blueprint_name: &str) -> Result<()> {
        let request = self.client.build_destroy(blueprint_name)?;
        let response = self.round_trip(request)?;
        self.client.parse_destroy(response)?;
        debug!(blueprint = blueprint_name, "homerunner deployment destroyed");
        Ok(())
    }

    /// Check that homerunner is up and answering requests.
    pub fn health(&self) -> Result<()> {
        let request = self.client.build_health();
        let response = self.round_trip(request)?;
        self.client.parse_health(response)
    }

    fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method.as_str();
        let url = request.url.clone();
        debug!(method, url = %url, "sending homerunner request");

        let response = self.transport.execute(request).map_err(|e| {
            warn!(method, url = %url, error = %e, "homerunner request failed");
            e
        })?;

        if response.status == 200 {
            debug!(method, url = %url, status = response.status, "homerunner responded");
        } else {
            warn!(method, url = %url, status = response.status, "homerunner rejected request");
        }
        Ok(response)
    }
}

#[cfg(feature = "ureq")]
impl Homerunner<crate::transport::UreqTransport> {
    /// Runner for the homerunner named by `HOMERUNNER_URL` / `HOMERUNNER_PORT`,
    /// falling back to `http://localhost:54321`.
    pub fn from_env() -> Self {
        let config = crate::config::HomerunnerConfig::from_env();
        Self::new(
            HomerunnerClient::from_config(&config),
            crate::transport::UreqTransport::new(),
        )
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self::new(
            HomerunnerClient::new(base_url),
            crate::transport::UreqTransport::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::blueprint::{Blueprint, BlueprintHomeserver};
    use crate::error::HomerunnerError;
    use crate::http::HttpMethod;
    use crate::transport::TransportError;

    const CREATED: &str = r#"{"homeservers":{"hs1":{"BaseURL":"http://localhost:8008","FedBaseURL":"https://localhost:8448","ContainerID":"c1","AccessTokens":{},"DeviceIDs":{},"ApplicationServices":{}}},"expires":"2026-10-16T12:00:00Z"}"#;

    /// Stub transport that records requests and answers with a canned response.
    struct Recorder {
        requests: Mutex<Vec<HttpRequest>>,
        status: u16,
        body: &'static str,
    }

    impl Recorder {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                status,
                body,
            }
        }

        fn only_request(&self) -> HttpRequest {
            let requests = self.requests.lock().unwrap();
            assert_eq!(requests.len(), 1, "expected exactly one request");
            requests[0].clone()
        }
    }

    impl Transport for Recorder {
        fn execute(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            Ok(HttpResponse::new(self.status, self.body))
        }
    }

    fn runner(status: u16, body: &'static str) -> Homerunner<Recorder> {
        Homerunner::new(
            HomerunnerClient::new("http://localhost:54321"),
            Recorder::new(status, body),
        )
    }

    fn json_header() -> Vec<(String, String)> {
        vec![("Content-Type".to_string(), "application/json".to_string())]
    }

    #[test]
    fn create_with_blueprint_name() {
        let runner = runner(200, CREATED);
        let created = runner.create("my_blueprint").unwrap();
        assert_eq!(created.homeserver("hs1").unwrap().container_id, "c1");

        let request = runner.transport.only_request();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "http://localhost:54321/create");
        assert_eq!(request.headers, json_header());
        assert_eq!(request.body.as_deref(), Some(r#"{"blueprint_name":"my_blueprint"}"#));
    }

    #[test]
    fn create_with_base_image_and_blueprint_name() {
        let runner = runner(200, CREATED);
        runner
            .create(CreateOptions::named_with_image("my_blueprint", "my_base_image"))
            .unwrap();
        assert_eq!(
            runner.transport.only_request().body.as_deref(),
            Some(r#"{"blueprint_name":"my_blueprint","base_image_uri":"my_base_image"}"#)
        );
    }

    #[test]
    fn create_with_inline_blueprint() {
        let runner = runner(200, CREATED);
        let blueprint = Blueprint::new("foo").with_homeserver(BlueprintHomeserver::new("homeserver"));
        runner
            .create(CreateOptions::inline("my_base_image", blueprint))
            .unwrap();

        let request = runner.transport.only_request();
        let body: serde_json::Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "base_image_uri": "my_base_image",
                "blueprint": {"Name": "foo", "Homeservers": [{"Name": "homeserver"}]}
            })
        );
    }

    #[test]
    fn destroy_blueprint() {
        let runner = runner(200, "{}");
        runner.destroy("my_blueprint").unwrap();

        let request = runner.transport.only_request();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "http://localhost:54321/destroy");
        assert_eq!(request.headers, json_header());
        assert_eq!(request.body.as_deref(), Some(r#"{"blueprint_name":"my_blueprint"}"#));
    }

    #[test]
    fn errors_carry_status_and_body() {
        let runner = runner(401, "an error");
        let expected = "Encountered an error while processing a homerunner request: 401 an error";

        let err = runner.create("foo").unwrap_err();
        assert_eq!(err.to_string(), expected);

        let err = runner.destroy("foo").unwrap_err();
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn health_ok_and_unhealthy() {
        let healthy = runner(200, "");
        healthy.health().unwrap();
        let request = healthy.transport.only_request();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "http://localhost:54321/health");

        let err = runner(500, "boom").health().unwrap_err();
        assert!(matches!(err, HomerunnerError::Unhealthy));
    }

    #[test]
    fn transport_failures_propagate_unchanged() {
        let transport = |_request: HttpRequest| -> std::result::Result<HttpResponse, TransportError> {
            Err("connection refused".into())
        };
        let runner = Homerunner::new(HomerunnerClient::new("http://localhost:1"), transport);

        let err = runner.health().unwrap_err();
        assert!(matches!(err, HomerunnerError::Transport(_)));
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn create_returns_unexpected_body_unchanged() {
        let created = runner(200, r#"{"testResponse":true}"#)
            .create("my_blueprint")
            .unwrap();
        assert_eq!(
            serde_json::to_value(&created).unwrap(),
            serde_json::json!({"testResponse": true})
        );
    }

    #[test]
    fn create_body_that_is_not_json_is_a_decode_error() {
        let err = runner(200, "not json").create("foo").unwrap_err();
        assert!(matches!(err, HomerunnerError::Deserialization(_)));
    }
}
