use crate::{
    api::models::*,
    config::AppConfig,
    services::{CreateRoomCommand, RoomService, UpdateRoomCommand},
    utils::errors::{Result, RoomsServiceError},
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub room_service: Arc<dyn RoomService>,
    pub config: AppConfig,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type RoomResult = std::result::Result<Json<RoomResponse>, ApiError>;
type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;

pub async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn create_room(
    State(state): State<AppState>,
    Query(query): Query<ApiVersionQuery>,
    body: JsonBody<CreateRoomRequest>,
) -> std::result::Result<(StatusCode, Json<RoomResponse>), ApiError> {
    check_api_version(&state.config, &query).map_err(handle_error)?;
    let request = json_body(body)?;

    let command = CreateRoomCommand {
        valid_from: request.valid_from,
        valid_until: request.valid_until,
        participants: into_participants(request.participants.unwrap_or_default()).map_err(handle_error)?,
    };

    match state.room_service.create_room(command).await {
        Ok(room) => Ok((StatusCode::CREATED, Json(room.into()))),
        Err(e) => {
            tracing::error!("Failed to create room: {}", e);
            Err(handle_error(e))
        }
    }
}

pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(query): Query<ApiVersionQuery>,
) -> RoomResult {
    check_api_version(&state.config, &query).map_err(handle_error)?;

    state
        .room_service
        .get_room(&room_id)
        .await
        .map(|room| Json(room.into()))
        .map_err(handle_error)
}

pub async fn update_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(query): Query<ApiVersionQuery>,
    body: JsonBody<UpdateRoomRequest>,
) -> RoomResult {
    check_api_version(&state.config, &query).map_err(handle_error)?;
    let request = json_body(body)?;

    let participants = request
        .participants
        .map(into_participants)
        .transpose()
        .map_err(handle_error)?;
    let command = UpdateRoomCommand {
        valid_from: request.valid_from,
        valid_until: request.valid_until,
        participants,
    };

    state
        .room_service
        .update_room(&room_id, command)
        .await
        .map(|room| Json(room.into()))
        .map_err(handle_error)
}

pub async fn delete_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(query): Query<ApiVersionQuery>,
) -> std::result::Result<StatusCode, ApiError> {
    check_api_version(&state.config, &query).map_err(handle_error)?;

    state
        .room_service
        .delete_room(&room_id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(handle_error)
}

pub async fn get_participants(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(query): Query<ApiVersionQuery>,
) -> std::result::Result<Json<ParticipantsCollectionResponse>, ApiError> {
    check_api_version(&state.config, &query).map_err(handle_error)?;

    let participants = state
        .room_service
        .get_participants(&room_id)
        .await
        .map_err(handle_error)?;

    Ok(Json(ParticipantsCollectionResponse {
        participants: participants.into_iter().map(Into::into).collect(),
        next_link: None,
    }))
}

/// `POST /rooms/{room_id}/participants:{add|update|remove}`
pub async fn participants_action(
    State(state): State<AppState>,
    Path((room_id, action)): Path<(String, String)>,
    Query(query): Query<ApiVersionQuery>,
    body: JsonBody<serde_json::Value>,
) -> RoomResult {
    check_api_version(&state.config, &query).map_err(handle_error)?;
    let body = json_body(body)?;

    let result = match action.as_str() {
        "participants:add" => {
            let request: ParticipantsRequest = parse_body(body)?;
            let participants = into_participants(request.participants).map_err(handle_error)?;
            state.room_service.add_participants(&room_id, participants).await
        }
        "participants:update" => {
            let request: ParticipantsRequest = parse_body(body)?;
            let participants = into_participants(request.participants).map_err(handle_error)?;
            state.room_service.update_participants(&room_id, participants).await
        }
        "participants:remove" => {
            let request: RemoveParticipantsRequest = parse_body(body)?;
            let identifiers = request
                .participants
                .into_iter()
                .map(|p| p.communication_identifier.into_raw_id())
                .collect::<Result<Vec<_>>>()
                .map_err(handle_error)?;
            state.room_service.remove_participants(&room_id, identifiers).await
        }
        other => {
            tracing::warn!("Unknown room action: {}", other);
            return Err(error_response(
                StatusCode::NOT_FOUND,
                "UnknownAction",
                format!("Unknown action: {}", other),
            ));
        }
    };

    result.map(|room| Json(room.into())).map_err(handle_error)
}

/// Body rejections use the same error envelope as every other failure
fn json_body<T>(body: JsonBody<T>) -> std::result::Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| handle_error(RoomsServiceError::InvalidRequest(rejection.body_text())))
}

fn parse_body<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> std::result::Result<T, ApiError> {
    serde_json::from_value(body)
        .map_err(|e| handle_error(RoomsServiceError::InvalidRequest(format!("Malformed body: {}", e))))
}

fn check_api_version(config: &AppConfig, query: &ApiVersionQuery) -> Result<()> {
    match query.api_version.as_deref() {
        Some(version) if config.rooms.supported_api_versions.iter().any(|v| v == version) => Ok(()),
        Some(version) => Err(RoomsServiceError::UnsupportedApiVersion(version.to_string())),
        None => Err(RoomsServiceError::InvalidRequest(
            "api-version query parameter is required".to_string(),
        )),
    }
}

fn handle_error(error: RoomsServiceError) -> ApiError {
    let (status_code, error_type) = match &error {
        RoomsServiceError::RoomNotFound { .. } => (StatusCode::NOT_FOUND, "RoomNotFound"),
        RoomsServiceError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "InvalidRequest"),
        RoomsServiceError::UnsupportedApiVersion(_) => (StatusCode::BAD_REQUEST, "UnsupportedApiVersion"),
        RoomsServiceError::Configuration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Configuration"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
    };

    error_response(status_code, error_type, error.to_string())
}

fn error_response(status_code: StatusCode, error_type: &str, message: String) -> ApiError {
    (
        status_code,
        Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            timestamp: Utc::now(),
        }),
    )
}
