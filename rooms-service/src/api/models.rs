use crate::{
    domain::{Participant, Room},
    utils::errors::{Result, RoomsServiceError},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// api-version query parameter
#[derive(Debug, Deserialize)]
pub struct ApiVersionQuery {
    #[serde(rename = "api-version")]
    pub api_version: Option<String>,
}

// Communication identifiers: rawId, or a communicationUser id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationIdentifierModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_user: Option<CommunicationUserIdentifierModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunicationUserIdentifierModel {
    pub id: String,
}

impl CommunicationIdentifierModel {
    pub fn into_raw_id(self) -> Result<String> {
        self.raw_id
            .or(self.communication_user.map(|user| user.id))
            .ok_or_else(|| {
                RoomsServiceError::InvalidRequest(
                    "communicationIdentifier needs a rawId or communicationUser".to_string(),
                )
            })
    }
}

impl From<String> for CommunicationIdentifierModel {
    fn from(raw_id: String) -> Self {
        Self {
            communication_user: Some(CommunicationUserIdentifierModel { id: raw_id.clone() }),
            raw_id: Some(raw_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantModel {
    pub communication_identifier: CommunicationIdentifierModel,
    #[serde(default)]
    pub role: Option<String>,
}

impl TryFrom<ParticipantModel> for Participant {
    type Error = RoomsServiceError;

    fn try_from(model: ParticipantModel) -> Result<Self> {
        Participant::new(model.communication_identifier.into_raw_id()?, model.role)
    }
}

impl From<Participant> for ParticipantModel {
    fn from(participant: Participant) -> Self {
        Self {
            communication_identifier: participant.identifier.into(),
            role: Some(participant.role),
        }
    }
}

pub fn into_participants(models: Vec<ParticipantModel>) -> Result<Vec<Participant>> {
    models.into_iter().map(Participant::try_from).collect()
}

// Room creation / update API
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub participants: Option<Vec<ParticipantModel>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomRequest {
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub participants: Option<Vec<ParticipantModel>>,
}

// Participant actions
#[derive(Debug, Deserialize)]
pub struct ParticipantsRequest {
    pub participants: Vec<ParticipantModel>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveParticipantsRequest {
    pub participants: Vec<RemovedParticipantModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedParticipantModel {
    pub communication_identifier: CommunicationIdentifierModel,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub id: String,
    pub created_date_time: DateTime<Utc>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub participants: Vec<ParticipantModel>,
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            created_date_time: room.created_at,
            valid_from: room.valid_from,
            valid_until: room.valid_until,
            participants: room.participants.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantsCollectionResponse {
    pub participants: Vec<ParticipantModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

// Health check API
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_accepts_either_form() {
        let raw: CommunicationIdentifierModel = serde_json::from_str(r#"{"rawId":"8:acs:a"}"#).unwrap();
        assert_eq!(raw.into_raw_id().unwrap(), "8:acs:a");

        let user: CommunicationIdentifierModel =
            serde_json::from_str(r#"{"communicationUser":{"id":"8:acs:b"}}"#).unwrap();
        assert_eq!(user.into_raw_id().unwrap(), "8:acs:b");

        let empty: CommunicationIdentifierModel = serde_json::from_str("{}").unwrap();
        assert!(empty.into_raw_id().is_err());
    }

    #[test]
    fn create_request_fields_are_optional() {
        let request: CreateRoomRequest = serde_json::from_str("{}").unwrap();
        assert!(request.valid_from.is_none());
        assert!(request.participants.is_none());
    }

    #[test]
    fn participant_without_role_gets_default() {
        let model: ParticipantModel =
            serde_json::from_str(r#"{"communicationIdentifier":{"rawId":"8:acs:c"}}"#).unwrap();
        let participant = Participant::try_from(model).unwrap();
        assert_eq!(participant.role, "Attendee");
    }

    #[test]
    fn room_response_uses_camel_case() {
        let now = Utc::now();
        let room = Room::new(
            "r1".to_string(),
            now,
            now,
            vec![Participant::new("8:acs:d".to_string(), Some("Presenter".to_string())).unwrap()],
        )
        .unwrap();
        let json = serde_json::to_value(RoomResponse::from(room)).unwrap();
        assert_eq!(json["id"], "r1");
        assert!(json.get("createdDateTime").is_some());
        assert!(json.get("validUntil").is_some());
        assert_eq!(json["participants"][0]["communicationIdentifier"]["rawId"], "8:acs:d");
        assert_eq!(json["participants"][0]["role"], "Presenter");
    }
}
