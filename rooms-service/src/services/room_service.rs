use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;
use crate::{
    config::RoomsConfig,
    domain::{Participant, Room},
    storage::RoomStorage,
    utils::errors::{Result, RoomsServiceError},
};

#[async_trait]
pub trait RoomService: Send + Sync {
    async fn create_room(&self, request: CreateRoomCommand) -> Result<Room>;
    async fn get_room(&self, room_id: &str) -> Result<Room>;
    async fn update_room(&self, room_id: &str, request: UpdateRoomCommand) -> Result<Room>;
    async fn delete_room(&self, room_id: &str) -> Result<()>;
    async fn add_participants(&self, room_id: &str, participants: Vec<Participant>) -> Result<Room>;
    async fn update_participants(&self, room_id: &str, participants: Vec<Participant>) -> Result<Room>;
    async fn remove_participants(&self, room_id: &str, identifiers: Vec<String>) -> Result<Room>;
    async fn get_participants(&self, room_id: &str) -> Result<Vec<Participant>>;
}

#[derive(Debug, Clone, Default)]
pub struct CreateRoomCommand {
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateRoomCommand {
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    /// Replaces the participant set when present
    pub participants: Option<Vec<Participant>>,
}

pub struct RoomServiceImpl {
    storage: Arc<dyn RoomStorage>,
    config: RoomsConfig,
}

impl RoomServiceImpl {
    pub fn new(storage: Arc<dyn RoomStorage>, config: RoomsConfig) -> Self {
        Self { storage, config }
    }

    fn not_found(room_id: &str) -> RoomsServiceError {
        RoomsServiceError::RoomNotFound {
            room_id: room_id.to_string(),
        }
    }
}

#[async_trait]
impl RoomService for RoomServiceImpl {
    async fn create_room(&self, request: CreateRoomCommand) -> Result<Room> {
        let room_id = Uuid::new_v4().to_string();
        let valid_from = request.valid_from.unwrap_or_else(Utc::now);
        let valid_until = match request.valid_until {
            Some(valid_until) => valid_until,
            None => Duration::try_days(self.config.default_validity_days)
                .and_then(|validity| valid_from.checked_add_signed(validity))
                .ok_or_else(|| {
                    RoomsServiceError::InvalidRequest(format!(
                        "validFrom ({}) leaves no room for the default validity of {} days",
                        valid_from.to_rfc3339(),
                        self.config.default_validity_days
                    ))
                })?,
        };

        let room = Room::new(room_id, valid_from, valid_until, request.participants)?;
        self.storage.save_room(&room).await?;

        tracing::info!(
            "Room {} created with {} participants, valid {} to {}",
            room.id,
            room.participants.len(),
            room.valid_from,
            room.valid_until
        );
        Ok(room)
    }

    async fn get_room(&self, room_id: &str) -> Result<Room> {
        self.storage
            .get_room(room_id)
            .await?
            .ok_or_else(|| Self::not_found(room_id))
    }

    async fn update_room(&self, room_id: &str, request: UpdateRoomCommand) -> Result<Room> {
        let room = self
            .storage
            .update_room(
                room_id,
                Box::new(move |room: &mut Room| {
                    room.update_validity(request.valid_from, request.valid_until)?;
                    if let Some(participants) = request.participants {
                        room.replace_participants(participants);
                    }
                    Ok(())
                }),
            )
            .await?
            .ok_or_else(|| Self::not_found(room_id))?;

        tracing::info!("Room {} updated", room_id);
        Ok(room)
    }

    async fn delete_room(&self, room_id: &str) -> Result<()> {
        if !self.storage.delete_room(room_id).await? {
            return Err(Self::not_found(room_id));
        }
        tracing::info!("Room {} deleted", room_id);
        Ok(())
    }

    async fn add_participants(&self, room_id: &str, participants: Vec<Participant>) -> Result<Room> {
        let count = participants.len();
        let room = self
            .storage
            .update_room(
                room_id,
                Box::new(move |room: &mut Room| {
                    room.upsert_participants(participants);
                    Ok(())
                }),
            )
            .await?
            .ok_or_else(|| Self::not_found(room_id))?;

        tracing::info!("Added {} participants to room {}", count, room_id);
        Ok(room)
    }

    async fn update_participants(&self, room_id: &str, participants: Vec<Participant>) -> Result<Room> {
        let count = participants.len();
        let room = self
            .storage
            .update_room(
                room_id,
                Box::new(move |room: &mut Room| {
                    room.upsert_participants(participants);
                    Ok(())
                }),
            )
            .await?
            .ok_or_else(|| Self::not_found(room_id))?;

        tracing::info!("Updated {} participants in room {}", count, room_id);
        Ok(room)
    }

    async fn remove_participants(&self, room_id: &str, identifiers: Vec<String>) -> Result<Room> {
        let room = self
            .storage
            .update_room(
                room_id,
                Box::new(move |room: &mut Room| {
                    let removed = room.remove_participants(&identifiers);
                    tracing::debug!("Removed {} of {} requested participants", removed, identifiers.len());
                    Ok(())
                }),
            )
            .await?
            .ok_or_else(|| Self::not_found(room_id))?;

        Ok(room)
    }

    async fn get_participants(&self, room_id: &str) -> Result<Vec<Participant>> {
        Ok(self.get_room(room_id).await?.participants)
    }
}
