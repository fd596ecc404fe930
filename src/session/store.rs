use super::{Interaction, SessionState, Transition};
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

struct Entry {
    state: SessionState,
    touched_at: OffsetDateTime,
}

/// In-memory dashboard sessions. Sessions idle for longer than `ttl` are
/// dropped the next time a session is created.
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<Uuid, Entry>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        SessionStore {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn create(&self, state: SessionState) -> Uuid {
        let now = OffsetDateTime::now_utc();
        self.remove_expired(now);
        let id = Uuid::new_v4();
        self.sessions().insert(
            id,
            Entry {
                state,
                touched_at: now,
            },
        );
        info!(%id, "Session created");
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<SessionState> {
        let mut sessions = self.sessions();
        let entry = sessions.get_mut(id)?;
        entry.touched_at = OffsetDateTime::now_utc();
        Some(entry.state.clone())
    }

    /// Threads the stored state through one interaction and stores the result.
    /// The interaction runs without holding the lock, imports can take a while to parse.
    /// A session removed in the meantime stays removed.
    pub fn apply(&self, id: &Uuid, interaction: Interaction) -> Option<Transition> {
        let state = self.sessions().get(id)?.state.clone();
        let transition = state.apply(interaction);
        let mut sessions = self.sessions();
        let entry = sessions.get_mut(id)?;
        entry.state = transition.state.clone();
        entry.touched_at = OffsetDateTime::now_utc();
        Some(transition)
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.sessions().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub(crate) fn remove_expired(&self, now: OffsetDateTime) {
        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|_, entry| now - entry.touched_at <= self.ttl);
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, "Expired idle sessions");
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<Uuid, Entry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::mock_feature_collection;

    #[test]
    fn create_get_remove() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create(SessionState::default());
        assert_eq!(store.get(&id), Some(SessionState::default()));
        assert!(store.get(&Uuid::new_v4()).is_none());
        assert!(store.remove(&id));
        assert!(!store.remove(&id));
        assert!(store.get(&id).is_none());
    }

    #[test]
    fn apply_stores_next_state() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create(SessionState::default());
        let transition = store
            .apply(&id, Interaction::SetFitBounds { enabled: true })
            .unwrap();
        assert!(transition.state.fit_bounds);
        assert!(store.get(&id).unwrap().fit_bounds);
        assert!(store
            .apply(&Uuid::new_v4(), Interaction::ClearUpload)
            .is_none());
    }

    #[test]
    fn apply_import_stores_areas() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create(SessionState::default());
        let other = store.create(SessionState::default());
        let transition = store
            .apply(
                &id,
                Interaction::Import {
                    content: mock_feature_collection(&["building", "road"]),
                },
            )
            .unwrap();
        assert_eq!(transition.state.areas.len(), 2);
        assert_eq!(store.get(&id).unwrap(), transition.state);
        assert!(store.get(&other).unwrap().areas.is_empty());
        assert!(store.remove(&id));
        assert!(store
            .apply(&id, Interaction::SetFitBounds { enabled: true })
            .is_none());
    }

    #[test]
    fn remove_expired() {
        let store = SessionStore::new(Duration::from_secs(60));
        store.create(SessionState::default());
        store.create(SessionState::default());
        store.remove_expired(OffsetDateTime::now_utc());
        assert_eq!(store.len(), 2);
        store.remove_expired(OffsetDateTime::now_utc() + time::Duration::minutes(2));
        assert_eq!(store.len(), 0);
    }
}
