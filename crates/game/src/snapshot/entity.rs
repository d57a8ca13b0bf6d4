use glam::Vec2;

use crate::net::SessionId;
use crate::player::PaddleState;
use crate::sync::RemotePaddle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle(pub u32);

impl EntityHandle {
    pub fn id(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Local(PaddleState),
    Remote(RemotePaddle),
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: u32,
    pub session: SessionId,
    // Spawn order; even is left, odd is right.
    pub slot: usize,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new_local(id: u32, session: SessionId, slot: usize, spawn_position: Vec2) -> Self {
        Self {
            id,
            session,
            slot,
            kind: EntityKind::Local(PaddleState::at(spawn_position)),
        }
    }

    pub fn new_remote(id: u32, session: SessionId, slot: usize, spawn_position: Vec2) -> Self {
        Self {
            id,
            session,
            slot,
            kind: EntityKind::Remote(RemotePaddle::new(PaddleState::at(spawn_position))),
        }
    }

    pub fn handle(&self) -> EntityHandle {
        EntityHandle(self.id)
    }

    pub fn is_local(&self) -> bool {
        matches!(self.kind, EntityKind::Local(_))
    }

    pub fn display_state(&self) -> &PaddleState {
        match &self.kind {
            EntityKind::Local(state) => state,
            EntityKind::Remote(remote) => &remote.display,
        }
    }

    pub fn remote(&self) -> Option<&RemotePaddle> {
        match &self.kind {
            EntityKind::Remote(remote) => Some(remote),
            EntityKind::Local(_) => None,
        }
    }

    pub fn remote_mut(&mut self) -> Option<&mut RemotePaddle> {
        match &mut self.kind {
            EntityKind::Remote(remote) => Some(remote),
            EntityKind::Local(_) => None,
        }
    }
}
