//! Request options and response payloads for the homerunner API.
//!
//! # Design
//! These types are defined independently from the mock server's schema;
//! the integration tests catch any drift between the two crates.
//!
//! Response types do not validate homerunner's output: every known field
//! has a default and unknown keys are kept in `extra`, so any JSON object
//! decodes. Only a body that is not a JSON object fails.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::blueprint::Blueprint;

/// Body of a `/create` request.
///
/// A bare blueprint name converts into [`CreateOptions::Named`] with no base
/// image, so `runner.create("federation_one_to_one_room")` works directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreateOptions {
    /// Deploy a static blueprint already known to homerunner.
    Named {
        blueprint_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_image_uri: Option<String>,
    },
    /// Deploy a blueprint supplied in the request.
    Inline {
        base_image_uri: String,
        blueprint: Blueprint,
    },
}

impl CreateOptions {
    pub fn named(blueprint_name: impl Into<String>) -> Self {
        CreateOptions::Named {
            blueprint_name: blueprint_name.into(),
            base_image_uri: None,
        }
    }

    pub fn named_with_image(blueprint_name: impl Into<String>, base_image_uri: impl Into<String>) -> Self {
        CreateOptions::Named {
            blueprint_name: blueprint_name.into(),
            base_image_uri: Some(base_image_uri.into()),
        }
    }

    pub fn inline(base_image_uri: impl Into<String>, blueprint: Blueprint) -> Self {
        CreateOptions::Inline {
            base_image_uri: base_image_uri.into(),
            blueprint,
        }
    }

    /// Name homerunner will register the deployment under.
    pub fn blueprint_name(&self) -> &str {
        match self {
            CreateOptions::Named { blueprint_name, .. } => blueprint_name,
            CreateOptions::Inline { blueprint, .. } => &blueprint.name,
        }
    }
}

impl From<&str> for CreateOptions {
    fn from(name: &str) -> Self {
        CreateOptions::named(name)
    }
}

impl From<String> for CreateOptions {
    fn from(name: String) -> Self {
        CreateOptions::named(name)
    }
}

impl From<&String> for CreateOptions {
    fn from(name: &String) -> Self {
        CreateOptions::named(name.as_str())
    }
}

/// Body of a `/destroy` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyOptions {
    pub blueprint_name: String,
}

/// A homeserver deployed by homerunner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Homeserver {
    #[serde(rename = "BaseURL", default)]
    pub base_url: String,

    #[serde(rename = "FedBaseURL", default)]
    pub fed_base_url: String,

    #[serde(rename = "ContainerID", default)]
    pub container_id: String,

    /// Access token per user ID.
    #[serde(rename = "AccessTokens", default, deserialize_with = "null_as_default")]
    pub access_tokens: HashMap<String, String>,

    /// Device ID per user ID.
    #[serde(rename = "DeviceIDs", default, deserialize_with = "null_as_default")]
    pub device_ids: HashMap<String, String>,

    /// Registration value per application service ID.
    #[serde(rename = "ApplicationServices", default, deserialize_with = "null_as_default")]
    pub application_services: HashMap<String, String>,

    /// Keys homerunner sent that this type does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Successful `/create` response.
///
/// Empty `homeservers` and `expires` are omitted when re-serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateResponse {
    /// Deployed homeservers keyed by homeserver name.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub homeservers: HashMap<String, Homeserver>,

    /// When homerunner will tear the deployment down.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub expires: String,

    /// Keys homerunner sent that this type does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CreateResponse {
    pub fn homeserver(&self, name: &str) -> Option<&Homeserver> {
        self.homeservers.get(name)
    }
}

// homerunner encodes empty maps as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
