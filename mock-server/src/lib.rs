//! In-memory stand-in for homerunner.
//!
//! Serves `/create`, `/destroy` and `/health` with the same JSON shapes as
//! the real service, but "deploys" homeservers by inventing URLs, container
//! IDs and credentials instead of starting containers.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU32, Ordering},
        Arc,
    },
};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

/// Blueprint fields the mock needs; everything else is accepted and ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct Blueprint {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Homeservers", default)]
    pub homeservers: Vec<BlueprintHomeserver>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlueprintHomeserver {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Users", default)]
    pub users: Vec<BlueprintUser>,
    #[serde(rename = "ApplicationServices", default)]
    pub application_services: Vec<BlueprintApplicationService>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlueprintUser {
    #[serde(rename = "Localpart")]
    pub localpart: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlueprintApplicationService {
    #[serde(rename = "ID")]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub blueprint_name: Option<String>,
    pub base_image_uri: Option<String>,
    pub blueprint: Option<Blueprint>,
}

#[derive(Debug, Deserialize)]
pub struct DestroyRequest {
    pub blueprint_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Homeserver {
    #[serde(rename = "BaseURL")]
    pub base_url: String,
    #[serde(rename = "FedBaseURL")]
    pub fed_base_url: String,
    #[serde(rename = "ContainerID")]
    pub container_id: String,
    #[serde(rename = "AccessTokens")]
    pub access_tokens: HashMap<String, String>,
    #[serde(rename = "DeviceIDs")]
    pub device_ids: HashMap<String, String>,
    #[serde(rename = "ApplicationServices")]
    pub application_services: HashMap<String, String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateResponse {
    pub homeservers: HashMap<String, Homeserver>,
    pub expires: String,
}

/// A recorded deployment.
#[derive(Clone, Debug)]
pub struct Deployment {
    pub base_image_uri: Option<String>,
    pub response: CreateResponse,
}

/// First client port handed out to a deployed homeserver.
const FIRST_PORT: u16 = 8008;

/// Client ports cycle through `FIRST_PORT..FIRST_PORT + PORT_SPAN`; the
/// federation port sits `FEDERATION_OFFSET` above each one.
const PORT_SPAN: u32 = 20_000;
const FEDERATION_OFFSET: u16 = 440;

/// Shared state behind the router.
#[derive(Debug)]
pub struct MockHomerunner {
    deployments: RwLock<HashMap<String, Deployment>>,
    healthy: AtomicBool,
    deployed: AtomicU32,
}

impl Default for MockHomerunner {
    fn default() -> Self {
        Self {
            deployments: RwLock::new(HashMap::new()),
            healthy: AtomicBool::new(true),
            deployed: AtomicU32::new(0),
        }
    }
}

impl MockHomerunner {
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub async fn deployment(&self, blueprint_name: &str) -> Option<Deployment> {
        self.deployments.read().await.get(blueprint_name).cloned()
    }

    pub async fn deployment_count(&self) -> usize {
        self.deployments.read().await.len()
    }

    fn deploy(&self, homeserver: &BlueprintHomeserver) -> Homeserver {
        let offset = self.deployed.fetch_add(1, Ordering::SeqCst) % PORT_SPAN;
        let port = FIRST_PORT + offset as u16;
        let user_ids = homeserver
            .users
            .iter()
            .map(|user| format!("@{}:{}", user.localpart, homeserver.name));

        let mut access_tokens = HashMap::new();
        let mut device_ids = HashMap::new();
        for user_id in user_ids {
            access_tokens.insert(user_id.clone(), format!("syt_{}", Uuid::new_v4().simple()));
            device_ids.insert(user_id, Uuid::new_v4().simple().to_string()[..10].to_uppercase());
        }
        let application_services = homeserver
            .application_services
            .iter()
            .map(|service| (service.id.clone(), format!("as_token_{}", service.id)))
            .collect();

        Homeserver {
            base_url: format!("http://127.0.0.1:{port}"),
            fed_base_url: format!("https://127.0.0.1:{}", port + FEDERATION_OFFSET),
            container_id: Uuid::new_v4().simple().to_string(),
            access_tokens,
            device_ids,
            application_services,
        }
    }
}

pub type Db = Arc<MockHomerunner>;

pub fn app() -> Router {
    app_with(Arc::default())
}

pub fn app_with(state: Db) -> Router {
    Router::new()
        .route("/create", post(create))
        .route("/destroy", post(destroy))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, state: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(state)).await
}

async fn create(
    State(db): State<Db>,
    Json(input): Json<CreateRequest>,
) -> Result<Json<CreateResponse>, (StatusCode, String)> {
    let (name, homeservers) = match (input.blueprint, input.blueprint_name) {
        (Some(blueprint), _) => (blueprint.name, blueprint.homeservers),
        (None, Some(name)) => {
            let hs1 = BlueprintHomeserver {
                name: "hs1".to_string(),
                users: Vec::new(),
                application_services: Vec::new(),
            };
            (name, vec![hs1])
        }
        (None, None) => {
            return Err((
                StatusCode::BAD_REQUEST,
                "one of blueprint_name or blueprint is required".to_string(),
            ))
        }
    };
    if name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "blueprint name must not be empty".to_string()));
    }

    let response = CreateResponse {
        homeservers: homeservers
            .iter()
            .map(|hs| (hs.name.clone(), db.deploy(hs)))
            .collect(),
        expires: (chrono::Utc::now() + chrono::Duration::hours(1)).to_rfc3339(),
    };
    info!(blueprint = %name, homeservers = response.homeservers.len(), "deployed blueprint");

    db.deployments.write().await.insert(
        name,
        Deployment {
            base_image_uri: input.base_image_uri,
            response: response.clone(),
        },
    );
    Ok(Json(response))
}

async fn destroy(
    State(db): State<Db>,
    Json(input): Json<DestroyRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut deployments = db.deployments.write().await;
    match deployments.remove(&input.blueprint_name) {
        Some(_) => {
            info!(blueprint = %input.blueprint_name, "destroyed blueprint");
            Ok(StatusCode::OK)
        }
        None => Err((
            StatusCode::NOT_FOUND,
            format!("unknown blueprint {}", input.blueprint_name),
        )),
    }
}

async fn health(State(db): State<Db>) -> StatusCode {
    if db.healthy.load(Ordering::SeqCst) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
