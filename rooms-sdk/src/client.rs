use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    errors::{Result, RoomsError},
    models::*,
    traits::RoomsApi,
    transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport},
};

/// Client for the Rooms service.
///
/// Holds only immutable configuration (endpoint, pinned API version,
/// credentials) and the transport, so clones are cheap and calls are
/// independent of each other.
#[derive(Debug)]
pub struct RoomsClient<T = ReqwestTransport> {
    options: RoomsClientOptions,
    endpoint: Url,
    transport: Arc<T>,
}

impl<T> Clone for RoomsClient<T> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            endpoint: self.endpoint.clone(),
            transport: self.transport.clone(),
        }
    }
}

impl RoomsClient<ReqwestTransport> {
    /// Create a client that talks HTTP through `reqwest`
    pub fn new(options: RoomsClientOptions) -> Result<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(options.request_timeout_secs))?;
        Self::with_transport(options, transport)
    }

    pub fn from_connection_string(connection_string: &str) -> Result<Self> {
        Self::new(RoomsClientOptions::from_connection_string(connection_string)?)
    }
}

impl<T: HttpTransport> RoomsClient<T> {
    /// Create a client on top of a custom transport
    pub fn with_transport(options: RoomsClientOptions, transport: T) -> Result<Self> {
        let endpoint = Url::parse(&options.endpoint).map_err(|e| {
            RoomsError::ConfigurationError(format!("Invalid endpoint URL {}: {}", options.endpoint, e))
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") || endpoint.cannot_be_a_base() {
            return Err(RoomsError::ConfigurationError(format!(
                "Endpoint must be an http(s) URL: {}",
                options.endpoint
            )));
        }

        Ok(Self {
            options,
            endpoint,
            transport: Arc::new(transport),
        })
    }

    /// Get the client configuration
    pub fn options(&self) -> &RoomsClientOptions {
        &self.options
    }

    pub fn service_version(&self) -> ServiceVersion {
        self.options.service_version
    }

    pub async fn create_room(
        &self,
        options: CreateRoomOptions,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>> {
        validate_window(options.valid_from, options.valid_until)?;
        if let Some(participants) = &options.participants {
            validate_participants(participants)?;
        }

        let body = serde_json::to_string(&options)?;
        let url = self.url(&["rooms"])?;
        let response = self.send(Method::POST, url, Some(body), cancellation).await?;
        let room: Response<Room> = parse_json(response)?;

        info!("Created room {}", room.value().id);
        Ok(room)
    }

    pub async fn get_room(&self, room_id: &str, cancellation: &CancellationToken) -> Result<Response<Room>> {
        validate_room_id(room_id)?;

        let url = self.url(&["rooms", room_id])?;
        let response = self.send(Method::GET, url, None, cancellation).await?;
        parse_json(response)
    }

    pub async fn update_room(
        &self,
        room_id: &str,
        options: UpdateRoomOptions,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>> {
        validate_room_id(room_id)?;
        validate_window(options.valid_from, options.valid_until)?;
        if let Some(participants) = &options.participants {
            validate_participants(participants)?;
        }

        let body = serde_json::to_string(&options)?;
        let url = self.url(&["rooms", room_id])?;
        let response = self.send(Method::PATCH, url, Some(body), cancellation).await?;
        parse_json(response)
    }

    pub async fn delete_room(&self, room_id: &str, cancellation: &CancellationToken) -> Result<Response<()>> {
        validate_room_id(room_id)?;

        let url = self.url(&["rooms", room_id])?;
        let response = self.send(Method::DELETE, url, None, cancellation).await?;
        check_status(&response)?;

        info!("Deleted room {}", room_id);
        Ok(Response::new(response.status, ()))
    }

    pub async fn add_participants(
        &self,
        room_id: &str,
        participants: Vec<RoomParticipant>,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>> {
        self.participants_action(room_id, "participants:add", &participants, cancellation)
            .await
    }

    pub async fn update_participants(
        &self,
        room_id: &str,
        participants: Vec<RoomParticipant>,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>> {
        self.participants_action(room_id, "participants:update", &participants, cancellation)
            .await
    }

    pub async fn remove_participants(
        &self,
        room_id: &str,
        identifiers: Vec<CommunicationIdentifier>,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>> {
        validate_room_id(room_id)?;
        for identifier in &identifiers {
            validate_identifier(identifier)?;
        }

        let request = RemoveParticipantsRequest {
            participants: identifiers
                .into_iter()
                .map(|communication_identifier| RemovedParticipant {
                    communication_identifier,
                })
                .collect(),
        };
        let body = serde_json::to_string(&request)?;
        let url = self.url(&["rooms", room_id, "participants:remove"])?;
        let response = self.send(Method::POST, url, Some(body), cancellation).await?;
        parse_json(response)
    }

    pub async fn get_participants(
        &self,
        room_id: &str,
        cancellation: &CancellationToken,
    ) -> Result<Response<ParticipantsCollection>> {
        validate_room_id(room_id)?;

        let url = self.url(&["rooms", room_id, "participants"])?;
        let response = self.send(Method::GET, url, None, cancellation).await?;
        parse_json(response)
    }

    async fn participants_action(
        &self,
        room_id: &str,
        action: &str,
        participants: &[RoomParticipant],
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>> {
        validate_room_id(room_id)?;
        validate_participants(participants)?;

        let body = serde_json::to_string(&ParticipantsRequest { participants })?;
        let url = self.url(&["rooms", room_id, action])?;
        let response = self.send(Method::POST, url, Some(body), cancellation).await?;
        parse_json(response)
    }

    /// Build `{endpoint}/{segments...}?api-version=...`, escaping each segment
    fn url(&self, segments: &[&str]) -> Result<String> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                RoomsError::ConfigurationError(format!("Endpoint cannot be a base URL: {}", self.endpoint))
            })?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut()
            .clear()
            .append_pair("api-version", self.options.service_version.as_str());
        Ok(url.into())
    }

    async fn send(
        &self,
        method: Method,
        url: String,
        body: Option<String>,
        cancellation: &CancellationToken,
    ) -> Result<HttpResponse> {
        if cancellation.is_cancelled() {
            return Err(RoomsError::Cancelled);
        }

        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        if let Some(access_key) = &self.options.access_key {
            headers.push(("Authorization".to_string(), format!("Bearer {}", access_key)));
        }

        debug!("Sending {} {}", method, url);

        let request = HttpRequest {
            method,
            url,
            headers,
            body,
        };

        tokio::select! {
            biased;
            _ = cancellation.cancelled() => {
                warn!("Rooms request cancelled");
                Err(RoomsError::Cancelled)
            }
            response = self.transport.execute(request) => response,
        }
    }
}

#[async_trait]
impl<T: HttpTransport> RoomsApi for RoomsClient<T> {
    async fn create_room(
        &self,
        options: CreateRoomOptions,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>> {
        RoomsClient::create_room(self, options, cancellation).await
    }

    async fn get_room(&self, room_id: &str, cancellation: &CancellationToken) -> Result<Response<Room>> {
        RoomsClient::get_room(self, room_id, cancellation).await
    }

    async fn update_room(
        &self,
        room_id: &str,
        options: UpdateRoomOptions,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>> {
        RoomsClient::update_room(self, room_id, options, cancellation).await
    }

    async fn delete_room(&self, room_id: &str, cancellation: &CancellationToken) -> Result<Response<()>> {
        RoomsClient::delete_room(self, room_id, cancellation).await
    }

    async fn add_participants(
        &self,
        room_id: &str,
        participants: Vec<RoomParticipant>,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>> {
        RoomsClient::add_participants(self, room_id, participants, cancellation).await
    }

    async fn update_participants(
        &self,
        room_id: &str,
        participants: Vec<RoomParticipant>,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>> {
        RoomsClient::update_participants(self, room_id, participants, cancellation).await
    }

    async fn remove_participants(
        &self,
        room_id: &str,
        identifiers: Vec<CommunicationIdentifier>,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>> {
        RoomsClient::remove_participants(self, room_id, identifiers, cancellation).await
    }

    async fn get_participants(
        &self,
        room_id: &str,
        cancellation: &CancellationToken,
    ) -> Result<Response<ParticipantsCollection>> {
        RoomsClient::get_participants(self, room_id, cancellation).await
    }
}

fn validate_room_id(room_id: &str) -> Result<()> {
    if room_id.trim().is_empty() {
        return Err(RoomsError::InvalidArgument("room id must not be empty".to_string()));
    }
    Ok(())
}

fn validate_identifier(identifier: &CommunicationIdentifier) -> Result<()> {
    if identifier.raw_id().trim().is_empty() {
        return Err(RoomsError::InvalidArgument(
            "communication identifier must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_participants(participants: &[RoomParticipant]) -> Result<()> {
    participants
        .iter()
        .try_for_each(|p| validate_identifier(&p.communication_identifier))
}

fn validate_window(valid_from: Option<DateTime<Utc>>, valid_until: Option<DateTime<Utc>>) -> Result<()> {
    match (valid_from, valid_until) {
        (Some(from), Some(until)) if until < from => Err(RoomsError::InvalidArgument(format!(
            "validUntil ({}) is before validFrom ({})",
            until.to_rfc3339(),
            from.to_rfc3339()
        ))),
        _ => Ok(()),
    }
}

/// Map non-success statuses to `NotFound` or `ServiceError`
fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }

    // Prefer the service's error message, fall back to the raw body
    let message = match serde_json::from_str::<ErrorResponse>(&response.body) {
        Ok(error_response) => error_response.message,
        Err(_) if response.body.trim().is_empty() => format!("HTTP {}", response.status),
        Err(_) => response.body.clone(),
    };

    warn!("Rooms service returned {}: {}", response.status, message);

    if response.status == 404 {
        Err(RoomsError::NotFound { message })
    } else {
        Err(RoomsError::ServiceError {
            status: response.status,
            message,
        })
    }
}

fn parse_json<D: DeserializeOwned>(response: HttpResponse) -> Result<Response<D>> {
    check_status(&response)?;
    let value = serde_json::from_str(&response.body)?;
    Ok(Response::new(response.status, value))
}
