pub mod memory;

use async_trait::async_trait;
use crate::{domain::Room, utils::errors::Result};

/// Mutation applied to a stored room while it is exclusively held
pub type RoomUpdate = Box<dyn FnOnce(&mut Room) -> Result<()> + Send>;

#[async_trait]
pub trait RoomStorage: Send + Sync {
    async fn save_room(&self, room: &Room) -> Result<()>;
    async fn get_room(&self, room_id: &str) -> Result<Option<Room>>;
    /// Apply `update` atomically; returns the updated room, or `None` if the
    /// room does not exist. A failed update leaves the stored room unchanged.
    async fn update_room(&self, room_id: &str, update: RoomUpdate) -> Result<Option<Room>>;
    /// Returns whether a room was removed
    async fn delete_room(&self, room_id: &str) -> Result<bool>;
}
