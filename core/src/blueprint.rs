//! Declarative blueprint model submitted to homerunner's `/create` endpoint.
//!
//! # Design
//! Field names follow homerunner's wire format (PascalCase, no JSON tags on
//! the service side). Optional sequences default to empty and are omitted
//! when empty, so a minimal blueprint serializes to exactly the keys the
//! caller set.
//!
//! A room is created either from a reference to another room (`Ref`) or by a
//! user (`Creator`), never both. [`RoomOrigin`] is flattened into the room
//! object so the wire shape stays `{"Ref": ...}` / `{"Creator": ...}` while
//! the "exactly one" rule is enforced by the type. Decoding goes through
//! `RawRoom` and rejects rooms that carry both keys or neither.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A homeserver deployment: one or more homeservers with their users, rooms
/// and application services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    /// Containers are named after the blueprint.
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Homeservers")]
    pub homeservers: Vec<BlueprintHomeserver>,

    /// User IDs whose access tokens homerunner should keep. Empty keeps all.
    #[serde(
        rename = "KeepAccessTokensForUsers",
        default,
        skip_serializing_if = "BTreeSet::is_empty"
    )]
    pub keep_access_tokens_for_users: BTreeSet<String>,
}

impl Blueprint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            homeservers: Vec::new(),
            keep_access_tokens_for_users: BTreeSet::new(),
        }
    }

    pub fn with_homeserver(mut self, homeserver: BlueprintHomeserver) -> Self {
        self.homeservers.push(homeserver);
        self
    }

    pub fn keep_access_token_for(mut self, user_id: impl Into<String>) -> Self {
        self.keep_access_tokens_for_users.insert(user_id.into());
        self
    }
}

/// One homeserver inside a blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintHomeserver {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Users", default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<User>,

    #[serde(rename = "Rooms", default, skip_serializing_if = "Vec::is_empty")]
    pub rooms: Vec<Room>,

    #[serde(
        rename = "ApplicationServices",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub application_services: Vec<ApplicationService>,
}

impl BlueprintHomeserver {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            users: Vec::new(),
            rooms: Vec::new(),
            application_services: Vec::new(),
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    pub fn with_application_service(mut self, service: ApplicationService) -> Self {
        self.application_services.push(service);
        self
    }
}

/// A user registered on a blueprint homeserver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "Localpart")]
    pub localpart: String,

    #[serde(rename = "DisplayName")]
    pub display_name: String,

    #[serde(rename = "AvatarURL", default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    #[serde(rename = "AccountData", default, skip_serializing_if = "Vec::is_empty")]
    pub account_data: Vec<AccountData>,
}

impl User {
    pub fn new(localpart: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            localpart: localpart.into(),
            display_name: display_name.into(),
            avatar_url: None,
            account_data: Vec::new(),
        }
    }

    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }

    pub fn with_account_data(mut self, key: impl Into<String>, value: Map<String, Value>) -> Self {
        self.account_data.push(AccountData {
            key: key.into(),
            value,
        });
        self
    }
}

/// A global account data entry for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountData {
    #[serde(rename = "Key")]
    pub key: String,

    #[serde(rename = "Value")]
    pub value: Map<String, Value>,
}

/// Where a room comes from. Serialized as a single `Ref` or `Creator` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomOrigin {
    /// Reference to a room defined elsewhere in the blueprint.
    Ref(String),
    /// User ID of the room's creator.
    Creator(String),
}

/// A room to create on a blueprint homeserver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRoom")]
pub struct Room {
    #[serde(flatten)]
    pub origin: RoomOrigin,

    /// Body passed to the `/createRoom` call.
    #[serde(rename = "CreateRoom", default, skip_serializing_if = "Option::is_none")]
    pub create_room: Option<Map<String, Value>>,

    #[serde(rename = "Events", default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
}

/// Wire shape of a room before the origin is checked.
#[derive(Deserialize)]
struct RawRoom {
    #[serde(rename = "Ref", default)]
    reference: Option<String>,

    #[serde(rename = "Creator", default)]
    creator: Option<String>,

    #[serde(rename = "CreateRoom", default)]
    create_room: Option<Map<String, Value>>,

    #[serde(rename = "Events", default)]
    events: Vec<Event>,
}

impl TryFrom<RawRoom> for Room {
    type Error = String;

    fn try_from(raw: RawRoom) -> Result<Self, Self::Error> {
        let origin = match (raw.reference, raw.creator) {
            (Some(reference), None) => RoomOrigin::Ref(reference),
            (None, Some(creator)) => RoomOrigin::Creator(creator),
            (Some(_), Some(_)) => return Err("room has both Ref and Creator".to_string()),
            (None, None) => return Err("room needs one of Ref or Creator".to_string()),
        };
        Ok(Self {
            origin,
            create_room: raw.create_room,
            events: raw.events,
        })
    }
}

impl Room {
    pub fn by_ref(reference: impl Into<String>) -> Self {
        Self::with_origin(RoomOrigin::Ref(reference.into()))
    }

    pub fn by_creator(creator: impl Into<String>) -> Self {
        Self::with_origin(RoomOrigin::Creator(creator.into()))
    }

    fn with_origin(origin: RoomOrigin) -> Self {
        Self {
            origin,
            create_room: None,
            events: Vec::new(),
        }
    }

    pub fn with_create_room(mut self, create_room: Map<String, Value>) -> Self {
        self.create_room = Some(create_room);
        self
    }

    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }
}

/// An event sent into a blueprint room after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "Type")]
    pub event_type: String,

    #[serde(rename = "Sender")]
    pub sender: String,

    #[serde(rename = "StateKey", default, skip_serializing_if = "Option::is_none")]
    pub state_key: Option<String>,
}

/// An application service registered on a blueprint homeserver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationService {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "URL", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(rename = "SenderLocalpart", default, skip_serializing_if = "Option::is_none")]
    pub sender_localpart: Option<String>,

    #[serde(rename = "RateLimited", default, skip_serializing_if = "Option::is_none")]
    pub rate_limited: Option<bool>,
}

impl ApplicationService {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: None,
            sender_localpart: None,
            rate_limited: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_blueprint_serializes_only_set_keys() {
        let blueprint = Blueprint::new("foo").with_homeserver(BlueprintHomeserver::new("homeserver"));
        let value = serde_json::to_value(&blueprint).unwrap();
        assert_eq!(value, json!({"Name": "foo", "Homeservers": [{"Name": "homeserver"}]}));
    }

    #[test]
    fn room_by_ref_serializes_ref_key() {
        let room = Room::by_ref("room_a");
        let value = serde_json::to_value(&room).unwrap();
        assert_eq!(value, json!({"Ref": "room_a"}));
    }

    #[test]
    fn room_by_creator_carries_create_room_and_events() {
        let mut create_room = Map::new();
        create_room.insert("preset".to_string(), json!("public_chat"));
        let room = Room::by_creator("@alice:hs1")
            .with_create_room(create_room)
            .with_event(Event {
                event_type: "m.room.topic".to_string(),
                sender: "@alice:hs1".to_string(),
                state_key: Some(String::new()),
            });
        let value = serde_json::to_value(&room).unwrap();
        assert_eq!(
            value,
            json!({
                "Creator": "@alice:hs1",
                "CreateRoom": {"preset": "public_chat"},
                "Events": [{"Type": "m.room.topic", "Sender": "@alice:hs1", "StateKey": ""}]
            })
        );
    }

    #[test]
    fn room_deserializes_origin_variant() {
        let room: Room = serde_json::from_value(json!({"Creator": "@bob:hs1"})).unwrap();
        assert_eq!(room.origin, RoomOrigin::Creator("@bob:hs1".to_string()));
        assert!(room.events.is_empty());
        assert!(room.create_room.is_none());
    }

    #[test]
    fn room_without_origin_is_rejected() {
        let err = serde_json::from_value::<Room>(json!({"CreateRoom": {}})).unwrap_err();
        assert!(err.to_string().contains("one of Ref or Creator"));
    }

    #[test]
    fn room_with_both_origins_is_rejected() {
        let err = serde_json::from_str::<Room>(r#"{"Ref":"a","Creator":"@b:hs1"}"#).unwrap_err();
        assert!(err.to_string().contains("both Ref and Creator"));
    }

    #[test]
    fn room_round_trips_through_json() {
        let room = Room::by_ref("room_a").with_event(Event {
            event_type: "m.room.name".to_string(),
            sender: "@alice:hs1".to_string(),
            state_key: None,
        });
        let json = serde_json::to_string(&room).unwrap();
        let back: Room = serde_json::from_str(&json).unwrap();
        assert_eq!(back, room);
    }

    #[test]
    fn users_and_application_services_use_wire_names() {
        let mut value = Map::new();
        value.insert("theme".to_string(), json!("dark"));
        let homeserver = BlueprintHomeserver::new("hs1")
            .with_user(
                User::new("alice", "Alice")
                    .with_avatar_url("mxc://hs1/alice")
                    .with_account_data("im.example.prefs", value),
            )
            .with_application_service(ApplicationService {
                rate_limited: Some(false),
                sender_localpart: Some("bridge".to_string()),
                ..ApplicationService::new("my_as")
            });
        let json = serde_json::to_value(&homeserver).unwrap();
        assert_eq!(json["Users"][0]["Localpart"], "alice");
        assert_eq!(json["Users"][0]["DisplayName"], "Alice");
        assert_eq!(json["Users"][0]["AvatarURL"], "mxc://hs1/alice");
        assert_eq!(json["Users"][0]["AccountData"][0]["Key"], "im.example.prefs");
        assert_eq!(json["Users"][0]["AccountData"][0]["Value"]["theme"], "dark");
        assert_eq!(json["ApplicationServices"][0]["ID"], "my_as");
        assert_eq!(json["ApplicationServices"][0]["SenderLocalpart"], "bridge");
        assert_eq!(json["ApplicationServices"][0]["RateLimited"], false);
        assert!(json["ApplicationServices"][0].get("URL").is_none());
    }

    #[test]
    fn keep_access_tokens_is_a_set() {
        let blueprint = Blueprint::new("foo")
            .keep_access_token_for("@bob:hs1")
            .keep_access_token_for("@alice:hs1")
            .keep_access_token_for("@bob:hs1");
        let json = serde_json::to_value(&blueprint).unwrap();
        assert_eq!(json["KeepAccessTokensForUsers"], json!(["@alice:hs1", "@bob:hs1"]));
    }
}
