use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, RoomsError};

/// API versions understood by the Rooms service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(non_camel_case_types)]
pub enum ServiceVersion {
    #[default]
    V2022_02_01_Preview,
    V2023_03_31_Preview,
}

impl ServiceVersion {
    /// Value sent in the `api-version` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceVersion::V2022_02_01_Preview => "2022-02-01-preview",
            ServiceVersion::V2023_03_31_Preview => "2023-03-31-preview",
        }
    }
}

impl fmt::Display for ServiceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the Rooms client
#[derive(Debug, Clone)]
pub struct RoomsClientOptions {
    /// Service base URL (e.g., "https://contoso.communication.azure.com")
    pub endpoint: String,
    /// API version pinned for the lifetime of the client
    pub service_version: ServiceVersion,
    /// Optional key sent as a bearer token
    pub access_key: Option<String>,
    /// Timeout for HTTP requests (in seconds)
    pub request_timeout_secs: u64,
}

impl RoomsClientOptions {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            service_version: ServiceVersion::default(),
            access_key: None,
            request_timeout_secs: 30,
        }
    }

    /// Parse a connection string of the form `endpoint=...;accesskey=...`.
    pub fn from_connection_string(connection_string: &str) -> Result<Self> {
        let mut endpoint = None;
        let mut access_key = None;

        for part in connection_string.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                RoomsError::ConfigurationError(format!("Malformed connection string segment: {part}"))
            })?;
            match key.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value.trim().to_string()),
                "accesskey" => access_key = Some(value.trim().to_string()),
                _ => {}
            }
        }

        let endpoint = endpoint.filter(|e| !e.is_empty()).ok_or_else(|| {
            RoomsError::ConfigurationError("Connection string has no endpoint".to_string())
        })?;

        Ok(Self {
            access_key,
            ..Self::new(endpoint)
        })
    }

    pub fn with_service_version(mut self, service_version: ServiceVersion) -> Self {
        self.service_version = service_version;
        self
    }

    pub fn with_access_key(mut self, access_key: impl Into<String>) -> Self {
        self.access_key = Some(access_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.request_timeout_secs = timeout_secs;
        self
    }
}

/// Opaque reference to a user or service identity.
///
/// Serialized as `{"rawId": ..., "communicationUser": {"id": ...}}`; either
/// field is accepted when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "CommunicationIdentifierModel", into = "CommunicationIdentifierModel")]
pub struct CommunicationIdentifier(String);

impl CommunicationIdentifier {
    pub fn new(raw_id: impl Into<String>) -> Self {
        Self(raw_id.into())
    }

    pub fn raw_id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommunicationIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommunicationIdentifier {
    fn from(raw_id: &str) -> Self {
        Self::new(raw_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommunicationIdentifierModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    raw_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    communication_user: Option<CommunicationUserIdentifierModel>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CommunicationUserIdentifierModel {
    id: String,
}

impl TryFrom<CommunicationIdentifierModel> for CommunicationIdentifier {
    type Error = String;

    fn try_from(model: CommunicationIdentifierModel) -> std::result::Result<Self, Self::Error> {
        model
            .raw_id
            .or(model.communication_user.map(|user| user.id))
            .map(CommunicationIdentifier)
            .ok_or_else(|| "communication identifier has neither rawId nor communicationUser".to_string())
    }
}

impl From<CommunicationIdentifier> for CommunicationIdentifierModel {
    fn from(identifier: CommunicationIdentifier) -> Self {
        Self {
            communication_user: Some(CommunicationUserIdentifierModel {
                id: identifier.0.clone(),
            }),
            raw_id: Some(identifier.0),
        }
    }
}

/// Role of a participant within a room.
///
/// The set of roles is owned by the service; unknown values round-trip
/// through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParticipantRole {
    Presenter,
    Attendee,
    Organizer,
    Consumer,
    Other(String),
}

impl ParticipantRole {
    pub fn as_str(&self) -> &str {
        match self {
            ParticipantRole::Presenter => "Presenter",
            ParticipantRole::Attendee => "Attendee",
            ParticipantRole::Organizer => "Organizer",
            ParticipantRole::Consumer => "Consumer",
            ParticipantRole::Other(role) => role,
        }
    }
}

impl From<String> for ParticipantRole {
    fn from(role: String) -> Self {
        match role.as_str() {
            "Presenter" => ParticipantRole::Presenter,
            "Attendee" => ParticipantRole::Attendee,
            "Organizer" => ParticipantRole::Organizer,
            "Consumer" => ParticipantRole::Consumer,
            _ => ParticipantRole::Other(role),
        }
    }
}

impl From<&str> for ParticipantRole {
    fn from(role: &str) -> Self {
        ParticipantRole::from(role.to_string())
    }
}

impl From<ParticipantRole> for String {
    fn from(role: ParticipantRole) -> Self {
        match role {
            ParticipantRole::Other(role) => role,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An identity bound to a role within a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomParticipant {
    pub communication_identifier: CommunicationIdentifier,
    /// Left to the service when absent (it assigns `Attendee`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ParticipantRole>,
}

impl RoomParticipant {
    pub fn new(communication_identifier: impl Into<CommunicationIdentifier>) -> Self {
        Self {
            communication_identifier: communication_identifier.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<ParticipantRole>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Snapshot of a room as returned by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<DateTime<Utc>>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    #[serde(default)]
    pub participants: Vec<RoomParticipant>,
}

impl Room {
    pub fn participant(&self, identifier: &CommunicationIdentifier) -> Option<&RoomParticipant> {
        self.participants
            .iter()
            .find(|p| &p.communication_identifier == identifier)
    }

    pub fn contains(&self, identifier: &CommunicationIdentifier) -> bool {
        self.participant(identifier).is_some()
    }
}

/// Participants of a room, listed independently of the room itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantsCollection {
    #[serde(default)]
    pub participants: Vec<RoomParticipant>,
    /// Link to the next page, when the service pages the listing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

/// Body of a create-room request. Omitted fields get service defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<RoomParticipant>>,
}

impl CreateRoomOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn valid_from(mut self, valid_from: DateTime<Utc>) -> Self {
        self.valid_from = Some(valid_from);
        self
    }

    pub fn valid_until(mut self, valid_until: DateTime<Utc>) -> Self {
        self.valid_until = Some(valid_until);
        self
    }

    pub fn participants(mut self, participants: Vec<RoomParticipant>) -> Self {
        self.participants = Some(participants);
        self
    }
}

/// Body of a partial room update. Only present fields are sent; a supplied
/// participant list replaces the room's whole participant set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<RoomParticipant>>,
}

impl UpdateRoomOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn valid_from(mut self, valid_from: DateTime<Utc>) -> Self {
        self.valid_from = Some(valid_from);
        self
    }

    pub fn valid_until(mut self, valid_until: DateTime<Utc>) -> Self {
        self.valid_until = Some(valid_until);
        self
    }

    pub fn participants(mut self, participants: Vec<RoomParticipant>) -> Self {
        self.participants = Some(participants);
        self
    }
}

/// Body of the add/update participants actions
#[derive(Debug, Serialize)]
pub struct ParticipantsRequest<'a> {
    pub participants: &'a [RoomParticipant],
}

/// Body of the remove participants action
#[derive(Debug, Serialize)]
pub struct RemoveParticipantsRequest {
    pub participants: Vec<RemovedParticipant>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedParticipant {
    pub communication_identifier: CommunicationIdentifier,
}

/// Error body returned by the Rooms service
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: String,
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A successful service response: the decoded value plus its HTTP status
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    status: u16,
    value: T,
}

impl<T> Response<T> {
    pub fn new(status: u16, value: T) -> Self {
        Self { status, value }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    #[test]
    fn connection_string_is_parsed() {
        let options = RoomsClientOptions::from_connection_string(
            "endpoint=https://contoso.communication.azure.com/;accesskey=c2VjcmV0==",
        )
        .unwrap();
        assert_eq!(options.endpoint, "https://contoso.communication.azure.com/");
        assert_eq!(options.access_key.as_deref(), Some("c2VjcmV0=="));
        assert_eq!(options.service_version, ServiceVersion::V2022_02_01_Preview);
    }

    #[test]
    fn connection_string_keys_are_case_insensitive() {
        let options =
            RoomsClientOptions::from_connection_string("Endpoint=http://localhost:8080;AccessKey=k").unwrap();
        assert_eq!(options.endpoint, "http://localhost:8080");
        assert_eq!(options.access_key.as_deref(), Some("k"));
    }

    #[test]
    fn connection_string_without_endpoint_is_rejected() {
        let err = RoomsClientOptions::from_connection_string("accesskey=abc").unwrap_err();
        assert_matches!(err, RoomsError::ConfigurationError(_));

        let err = RoomsClientOptions::from_connection_string("endpoint").unwrap_err();
        assert_matches!(err, RoomsError::ConfigurationError(_));
    }

    #[test]
    fn service_versions_map_to_wire_values() {
        assert_eq!(ServiceVersion::V2022_02_01_Preview.as_str(), "2022-02-01-preview");
        assert_eq!(ServiceVersion::V2023_03_31_Preview.to_string(), "2023-03-31-preview");
    }

    #[test]
    fn participant_serializes_identifier_and_role() {
        let participant = RoomParticipant::new("8:acs:user1").with_role(ParticipantRole::Presenter);
        let json = serde_json::to_value(&participant).unwrap();
        assert_eq!(json["communicationIdentifier"]["rawId"], "8:acs:user1");
        assert_eq!(json["communicationIdentifier"]["communicationUser"]["id"], "8:acs:user1");
        assert_eq!(json["role"], "Presenter");
    }

    #[test]
    fn participant_without_role_omits_it() {
        let json = serde_json::to_value(RoomParticipant::new("8:acs:user2")).unwrap();
        assert!(json.get("role").is_none());
    }

    #[test]
    fn identifier_decodes_from_communication_user_only() {
        let participant: RoomParticipant = serde_json::from_str(
            r#"{"communicationIdentifier":{"communicationUser":{"id":"8:acs:user3"}},"role":"Consumer"}"#,
        )
        .unwrap();
        assert_eq!(participant.communication_identifier.raw_id(), "8:acs:user3");
        assert_eq!(participant.role, Some(ParticipantRole::Consumer));
    }

    #[test]
    fn identifier_without_any_id_is_rejected() {
        let result: std::result::Result<RoomParticipant, _> =
            serde_json::from_str(r#"{"communicationIdentifier":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_roles_are_preserved() {
        let role: ParticipantRole = serde_json::from_str(r#""Collaborator""#).unwrap();
        assert_eq!(role, ParticipantRole::Other("Collaborator".to_string()));
        assert_eq!(serde_json::to_string(&role).unwrap(), r#""Collaborator""#);
    }

    #[test]
    fn update_options_only_serialize_present_fields() {
        let valid_until = Utc.with_ymd_and_hms(2022, 5, 2, 0, 0, 0).unwrap();
        let json = serde_json::to_value(UpdateRoomOptions::new().valid_until(valid_until)).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object["validUntil"], "2022-05-02T00:00:00Z");
    }

    #[test]
    fn empty_participant_list_is_sent_explicitly() {
        let json = serde_json::to_value(UpdateRoomOptions::new().participants(Vec::new())).unwrap();
        assert_eq!(json["participants"], serde_json::json!([]));
    }

    #[test]
    fn room_decodes_from_service_payload() {
        let room: Room = serde_json::from_str(
            r#"{
                "id": "99199690362660524",
                "createdDateTime": "2022-04-30T12:00:00Z",
                "validFrom": "2022-05-01T00:00:00Z",
                "validUntil": "2022-05-02T00:00:00Z",
                "participants": [
                    {"communicationIdentifier": {"rawId": "8:acs:user1"}, "role": "Presenter"},
                    {"communicationIdentifier": {"rawId": "8:acs:user2"}, "role": "Attendee"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(room.id, "99199690362660524");
        assert_eq!(room.valid_from, Utc.with_ymd_and_hms(2022, 5, 1, 0, 0, 0).unwrap());
        assert_eq!(room.participants.len(), 2);
        let user2 = room.participant(&"8:acs:user2".into()).unwrap();
        assert_eq!(user2.role, Some(ParticipantRole::Attendee));
        assert!(!room.contains(&"8:acs:user9".into()));
    }

    #[test]
    fn participants_collection_tolerates_missing_fields() {
        let collection: ParticipantsCollection = serde_json::from_str("{}").unwrap();
        assert!(collection.participants.is_empty());
        assert!(collection.next_link.is_none());
    }
}
