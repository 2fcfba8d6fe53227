//! Room persistence.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use quorum_domain::{DomainError, Room};
use tokio::sync::RwLock;

/// Secondary port for room persistence.
///
/// Rooms are shared as `Arc<Room>`: the aggregate synchronizes its own
/// state, the repository only tracks which rooms exist and maps names
/// to ids. `save` is therefore idempotent for an already-stored room.
///
/// Methods return `Send` futures so callers (the reaper, the analytics
/// pump) can run them inside spawned tasks.
pub trait RoomRepository: Send + Sync + 'static {
    fn save(&self, room: Arc<Room>) -> impl Future<Output = Result<(), DomainError>> + Send;
    fn find_by_id(&self, id: &str) -> impl Future<Output = Result<Arc<Room>, DomainError>> + Send;
    fn find_by_name(&self, name: &str)
    -> impl Future<Output = Result<Arc<Room>, DomainError>> + Send;
    fn delete(&self, id: &str) -> impl Future<Output = Result<(), DomainError>> + Send;
    fn exists(&self, id: &str) -> impl Future<Output = bool> + Send;
    fn list_all(&self) -> impl Future<Output = Vec<Arc<Room>>> + Send;
    fn count(&self) -> impl Future<Output = usize> + Send;
}

struct State {
    rooms: HashMap<String, Arc<Room>>,
    by_name: HashMap<String, String>,
}

/// In-memory [`RoomRepository`].
///
/// One `RwLock` over both maps; distinct from the per-room locks, and
/// never held while touching a room's interior.
pub struct MemoryRoomRepository {
    state: RwLock<State>,
}

impl Default for MemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRoomRepository {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                rooms: HashMap::new(),
                by_name: HashMap::new(),
            }),
        }
    }
}

impl RoomRepository for MemoryRoomRepository {
    async fn save(&self, room: Arc<Room>) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state.by_name.insert(room.name().to_string(), room.id().to_string());
        state.rooms.insert(room.id().to_string(), room);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Arc<Room>, DomainError> {
        let state = self.state.read().await;
        state
            .rooms
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::RoomNotFound(id.to_string()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Arc<Room>, DomainError> {
        let state = self.state.read().await;
        let id = state
            .by_name
            .get(name)
            .ok_or_else(|| DomainError::RoomNotFound(name.to_string()))?;
        state
            .rooms
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::RoomNotFound(name.to_string()))
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let room = state
            .rooms
            .remove(id)
            .ok_or_else(|| DomainError::RoomNotFound(id.to_string()))?;
        state.by_name.remove(room.name());
        Ok(())
    }

    async fn exists(&self, id: &str) -> bool {
        self.state.read().await.rooms.contains_key(id)
    }

    async fn list_all(&self) -> Vec<Arc<Room>> {
        self.state.read().await.rooms.values().cloned().collect()
    }

    async fn count(&self) -> usize {
        self.state.read().await.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_domain::Participant;

    fn room(id: &str, name: &str) -> Arc<Room> {
        let host = Participant::new(
            "host".to_string(),
            "Host".to_string(),
            "token".to_string(),
            false,
        );
        Arc::new(Room::new(id.to_string(), name.to_string(), host, None))
    }

    #[tokio::test]
    async fn test_save_then_find_by_id_and_name() {
        let repo = MemoryRoomRepository::new();
        repo.save(room("r1", "brave-falcon-07")).await.unwrap();

        let by_id = repo.find_by_id("r1").await.unwrap();
        assert_eq!(by_id.name(), "brave-falcon-07");

        let by_name = repo.find_by_name("brave-falcon-07").await.unwrap();
        assert_eq!(by_name.id(), "r1");
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_save_same_room_twice_is_idempotent() {
        let repo = MemoryRoomRepository::new();
        let r = room("r1", "n1");
        repo.save(Arc::clone(&r)).await.unwrap();
        repo.save(r).await.unwrap();
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_find_unknown_room_not_found() {
        let repo = MemoryRoomRepository::new();
        assert_eq!(
            repo.find_by_id("ghost").await.unwrap_err(),
            DomainError::RoomNotFound("ghost".to_string())
        );
        assert_eq!(
            repo.find_by_name("ghost").await.unwrap_err(),
            DomainError::RoomNotFound("ghost".to_string())
        );
    }

    #[tokio::test]
    async fn test_delete_removes_room_and_name_index() {
        let repo = MemoryRoomRepository::new();
        repo.save(room("r1", "n1")).await.unwrap();

        repo.delete("r1").await.unwrap();
        assert!(!repo.exists("r1").await);
        assert!(repo.find_by_name("n1").await.is_err());

        assert_eq!(
            repo.delete("r1").await.unwrap_err(),
            DomainError::RoomNotFound("r1".to_string())
        );
    }

    #[tokio::test]
    async fn test_list_all_returns_every_room() {
        let repo = MemoryRoomRepository::new();
        repo.save(room("r1", "n1")).await.unwrap();
        repo.save(room("r2", "n2")).await.unwrap();

        let mut ids: Vec<String> = repo
            .list_all()
            .await
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        ids.sort();
        assert_eq!(ids, ["r1", "r2"]);
    }
}
