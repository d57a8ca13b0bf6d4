mod entity;
mod world;

pub use entity::{Entity, EntityHandle, EntityKind};
pub use world::World;
