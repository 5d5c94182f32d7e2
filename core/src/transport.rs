//! Executes `HttpRequest` values against the network.
//!
//! # Design
//! `Transport` is the seam between the deterministic core and real I/O.
//! Any `Fn(HttpRequest) -> Result<HttpResponse, TransportError>` is a
//! transport, so tests stub homerunner with a closure. `UreqTransport`
//! (behind the default `ureq` feature) is the blocking production
//! implementation.
//!
//! A transport must hand back every response it receives, whatever the
//! status; only failures to get a response at all are errors.

use crate::http::{HttpRequest, HttpResponse};

/// Error raised by a transport before any response was received.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Performs one HTTP round trip.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::ureq_transport::UreqTransport;

#[cfg(feature = "ureq")]
mod ureq_transport {
    use super::{Transport, TransportError};
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Blocking transport backed by a `ureq::Agent`.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl UreqTransport {
        /// Transport with an agent that reports 4xx/5xx as responses.
        pub fn new() -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self { agent }
        }

        /// Use a preconfigured agent, e.g. one with timeouts. The agent must
        /// be built with `http_status_as_error(false)` or non-200 statuses
        /// surface as transport errors instead of homerunner errors.
        pub fn with_agent(agent: ureq::Agent) -> Self {
            Self { agent }
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl std::fmt::Debug for UreqTransport {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("UreqTransport").finish_non_exhaustive()
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let mut response = match request.method {
                HttpMethod::Get => {
                    let mut builder = self.agent.get(request.url.as_str());
                    for (name, value) in &request.headers {
                        builder = builder.header(name.as_str(), value.as_str());
                    }
                    builder.call()?
                }
                HttpMethod::Post => {
                    let mut builder = self.agent.post(request.url.as_str());
                    for (name, value) in &request.headers {
                        builder = builder.header(name.as_str(), value.as_str());
                    }
                    match request.body {
                        Some(body) => builder.send(body.as_bytes())?,
                        None => builder.send_empty()?,
                    }
                }
            };

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_string(), value.to_string()))
                })
                .collect();
            let body = response.body_mut().read_to_string()?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}
