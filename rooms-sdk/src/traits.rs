use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    errors::Result,
    models::{
        CommunicationIdentifier, CreateRoomOptions, ParticipantsCollection, Room, RoomParticipant,
        Response, UpdateRoomOptions,
    },
};

/// Room and participant lifecycle operations.
///
/// `RoomsClient` is the production implementation. Code that only needs the
/// operations should depend on this trait so tests can substitute a fake.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomsApi: Send + Sync {
    /// Create a room; omitted validity bounds are chosen by the service
    async fn create_room(
        &self,
        options: CreateRoomOptions,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>>;

    async fn get_room(&self, room_id: &str, cancellation: &CancellationToken) -> Result<Response<Room>>;

    /// Partially update a room. A supplied participant list replaces the
    /// current set.
    async fn update_room(
        &self,
        room_id: &str,
        options: UpdateRoomOptions,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>>;

    /// Delete a room. Deleting a room that no longer exists is `NotFound`.
    async fn delete_room(&self, room_id: &str, cancellation: &CancellationToken) -> Result<Response<()>>;

    /// Upsert participants by identifier
    async fn add_participants(
        &self,
        room_id: &str,
        participants: Vec<RoomParticipant>,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>>;

    /// Update roles of the given participants, leaving everyone else in place
    async fn update_participants(
        &self,
        room_id: &str,
        participants: Vec<RoomParticipant>,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>>;

    /// Remove participants; identifiers that are not members are ignored
    async fn remove_participants(
        &self,
        room_id: &str,
        identifiers: Vec<CommunicationIdentifier>,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>>;

    async fn get_participants(
        &self,
        room_id: &str,
        cancellation: &CancellationToken,
    ) -> Result<Response<ParticipantsCollection>>;
}
