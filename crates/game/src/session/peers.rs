use std::collections::HashMap;

use crate::net::SessionId;
use crate::snapshot::EntityHandle;

#[derive(Debug, Default)]
pub struct PeerEntityMap {
    by_session: HashMap<SessionId, EntityHandle>,
    by_entity: HashMap<EntityHandle, SessionId>,
}

impl PeerEntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, session: SessionId, entity: EntityHandle) -> bool {
        if self.by_session.contains_key(&session) || self.by_entity.contains_key(&entity) {
            return false;
        }
        self.by_entity.insert(entity, session.clone());
        self.by_session.insert(session, entity);
        true
    }

    pub fn entity(&self, session: &SessionId) -> Option<EntityHandle> {
        self.by_session.get(session).copied()
    }

    pub fn session(&self, entity: EntityHandle) -> Option<&SessionId> {
        self.by_entity.get(&entity)
    }

    pub fn contains(&self, session: &SessionId) -> bool {
        self.by_session.contains_key(session)
    }

    pub fn remove(&mut self, session: &SessionId) -> Option<EntityHandle> {
        let entity = self.by_session.remove(session)?;
        self.by_entity.remove(&entity);
        Some(entity)
    }

    pub fn len(&self) -> usize {
        self.by_session.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_session.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_session.clear();
        self.by_entity.clear();
    }
}
