use std::collections::HashMap;

use crate::net::SessionId;
use crate::player::{FieldConfig, PaddleState};
use crate::sync::RemotePaddle;

use super::entity::{Entity, EntityHandle, EntityKind};

#[derive(Debug)]
pub struct World {
    tick: u32,
    entities: HashMap<u32, Entity>,
    next_entity_id: u32,
    spawned: usize,
    local: Option<EntityHandle>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            tick: 0,
            entities: HashMap::new(),
            next_entity_id: 1,
            spawned: 0,
            local: None,
        }
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn advance_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn spawn_paddle(
        &mut self,
        session: SessionId,
        is_local: bool,
        field: &FieldConfig,
    ) -> EntityHandle {
        let id = self.allocate_id();
        let slot = self.spawned;
        self.spawned += 1;

        let position = field.spawn_point(slot);
        let entity = if is_local {
            self.local = Some(EntityHandle(id));
            Entity::new_local(id, session, slot, position)
        } else {
            Entity::new_remote(id, session, slot, position)
        };
        self.entities.insert(id, entity);
        EntityHandle(id)
    }

    pub fn despawn(&mut self, handle: EntityHandle) -> Option<Entity> {
        if self.local == Some(handle) {
            self.local = None;
        }
        self.entities.remove(&handle.0)
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        self.entities.get(&handle.0)
    }

    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        self.entities.get_mut(&handle.0)
    }

    pub fn local_handle(&self) -> Option<EntityHandle> {
        self.local
    }

    pub fn local_paddle(&self) -> Option<&PaddleState> {
        match &self.get(self.local?)?.kind {
            EntityKind::Local(state) => Some(state),
            EntityKind::Remote(_) => None,
        }
    }

    pub fn local_paddle_mut(&mut self) -> Option<&mut PaddleState> {
        let handle = self.local?;
        match &mut self.get_mut(handle)?.kind {
            EntityKind::Local(state) => Some(state),
            EntityKind::Remote(_) => None,
        }
    }

    pub fn remote_paddle_mut(&mut self, handle: EntityHandle) -> Option<&mut RemotePaddle> {
        self.get_mut(handle)?.remote_mut()
    }

    pub fn remote_paddles_mut(&mut self) -> impl Iterator<Item = (EntityHandle, &mut RemotePaddle)> {
        self.entities
            .values_mut()
            .filter_map(|e| {
                let handle = e.handle();
                e.remote_mut().map(|remote| (handle, remote))
            })
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.spawned = 0;
        self.local = None;
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_alternates_sides() {
        let field = FieldConfig::default();
        let mut world = World::new();
        let a = world.spawn_paddle(SessionId::from("a"), true, &field);
        let b = world.spawn_paddle(SessionId::from("b"), false, &field);

        let left = world.get(a).unwrap();
        let right = world.get(b).unwrap();
        assert!(left.is_local());
        assert!(!right.is_local());
        assert_eq!(left.display_state().position.x, field.paddle_offset_x);
        assert_eq!(
            right.display_state().position.x,
            field.width - field.paddle_offset_x
        );
        assert_eq!(world.local_handle(), Some(a));
        assert!(world.remote_paddle_mut(b).is_some());
        assert!(world.remote_paddle_mut(a).is_none());
    }

    #[test]
    fn test_despawn_and_clear() {
        let field = FieldConfig::default();
        let mut world = World::new();
        let a = world.spawn_paddle(SessionId::from("a"), true, &field);
        let b = world.spawn_paddle(SessionId::from("b"), false, &field);

        assert!(world.despawn(a).is_some());
        assert!(world.local_paddle().is_none());
        assert!(world.despawn(a).is_none());
        assert_eq!(world.remote_paddles_mut().count(), 1);

        world.clear();
        assert_eq!(world.entity_count(), 0);
        assert!(world.get(b).is_none());

        // Slots restart, handles do not.
        let c = world.spawn_paddle(SessionId::from("c"), false, &field);
        assert_ne!(c, a);
        assert_eq!(world.get(c).unwrap().slot, 0);
    }
}
