use std::sync::Arc;
use async_trait::async_trait;
use dashmap::DashMap;
use crate::{
    domain::Room,
    storage::{RoomStorage, RoomUpdate},
    utils::errors::Result,
};

#[derive(Debug)]
pub struct MemoryStorage {
    rooms: Arc<DashMap<String, Room>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
        }
    }
}

#[async_trait]
impl RoomStorage for MemoryStorage {
    async fn save_room(&self, room: &Room) -> Result<()> {
        self.rooms.insert(room.id.clone(), room.clone());
        Ok(())
    }

    async fn get_room(&self, room_id: &str) -> Result<Option<Room>> {
        Ok(self.rooms.get(room_id).map(|entry| entry.clone()))
    }

    async fn update_room(&self, room_id: &str, update: RoomUpdate) -> Result<Option<Room>> {
        // The entry guard is held for the whole mutation
        let Some(mut entry) = self.rooms.get_mut(room_id) else {
            return Ok(None);
        };

        let mut updated = entry.clone();
        update(&mut updated)?;
        *entry = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_room(&self, room_id: &str) -> Result<bool> {
        Ok(self.rooms.remove(room_id).is_some())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Participant;
    use crate::utils::errors::RoomsServiceError;
    use chrono::{Duration, Utc};

    fn room(id: &str) -> Room {
        let now = Utc::now();
        Room::new(id.to_string(), now, now + Duration::days(1), Vec::new()).unwrap()
    }

    #[tokio::test]
    async fn save_get_delete() {
        let storage = MemoryStorage::new();
        storage.save_room(&room("r1")).await.unwrap();

        assert_eq!(storage.get_room("r1").await.unwrap().unwrap().id, "r1");
        assert!(storage.delete_room("r1").await.unwrap());
        assert!(!storage.delete_room("r1").await.unwrap());
        assert!(storage.get_room("r1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_of_missing_room_returns_none() {
        let storage = MemoryStorage::new();
        let result = storage
            .update_room("nope", Box::new(|_: &mut Room| Ok(())))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn failed_update_is_not_persisted() {
        let storage = MemoryStorage::new();
        storage.save_room(&room("r1")).await.unwrap();

        let result = storage
            .update_room(
                "r1",
                Box::new(|room: &mut Room| {
                    room.participants
                        .push(Participant::new("u1".to_string(), None)?);
                    Err(RoomsServiceError::InvalidRequest("rejected".to_string()))
                }),
            )
            .await;
        assert!(result.is_err());
        assert!(storage.get_room("r1").await.unwrap().unwrap().participants.is_empty());
    }

    #[tokio::test]
    async fn concurrent_upserts_are_all_applied() {
        let storage = Arc::new(MemoryStorage::new());
        storage.save_room(&room("r1")).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let storage = storage.clone();
            handles.push(tokio::spawn(async move {
                storage
                    .update_room(
                        "r1",
                        Box::new(move |room: &mut Room| {
                            room.upsert_participants(vec![Participant::new(format!("u{i}"), None)?]);
                            Ok(())
                        }),
                    )
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let room = storage.get_room("r1").await.unwrap().unwrap();
        assert_eq!(room.participants.len(), 16);
    }
}
