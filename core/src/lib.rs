//! Client for homerunner, the service that deploys throwaway homeservers
//! from blueprints for integration tests.
//!
//! # Overview
//! `HomerunnerClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network (host-does-IO pattern).
//! `Homerunner` binds a client to a [`Transport`] and exposes the three
//! homerunner calls: `create`, `destroy` and `health`.
//!
//! ```no_run
//! use homerunner_client::{Blueprint, BlueprintHomeserver, CreateOptions, Homerunner, User};
//!
//! # fn main() -> homerunner_client::Result<()> {
//! let homerunner = Homerunner::from_env();
//! homerunner.health()?;
//!
//! let blueprint = Blueprint::new("alice_and_bob").with_homeserver(
//!     BlueprintHomeserver::new("hs1")
//!         .with_user(User::new("alice", "Alice"))
//!         .with_user(User::new("bob", "Bob")),
//! );
//! let deployment = homerunner.create(CreateOptions::inline("complement-synapse", blueprint))?;
//! let hs1 = deployment.homeserver("hs1").expect("hs1 deployed");
//! println!("hs1 at {}", hs1.base_url);
//!
//! homerunner.destroy("alice_and_bob")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - The client is stateless: it holds only `base_url`, fixed at construction.
//! - Configuration comes from an explicit [`HomerunnerConfig`] value rather
//!   than being read from the environment inside constructors.
//! - Each call is exactly one request. No retries, caching or timeouts
//!   beyond what the transport enforces.

pub mod blueprint;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod runner;
pub mod transport;
pub mod types;

pub use blueprint::{
    AccountData, ApplicationService, Blueprint, BlueprintHomeserver, Event, Room, RoomOrigin, User,
};
pub use client::HomerunnerClient;
pub use config::HomerunnerConfig;
pub use error::{HomerunnerError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use runner::Homerunner;
pub use transport::{Transport, TransportError};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{CreateOptions, CreateResponse, DestroyOptions, Homeserver};
