use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::position::Vec3;

pub type EntityId = i32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec3,
}

impl Entity {
    pub fn player(id: EntityId, position: Vec3) -> Self {
        Self {
            id,
            kind: EntityKind::Player,
            position,
        }
    }

    pub fn is_player(&self) -> bool {
        self.kind == EntityKind::Player
    }
}

/// Entities visible to one connection, plus which of them is the local player.
#[derive(Debug, Clone, Default)]
pub struct EntityTable {
    local_player: Option<EntityId>,
    entities: BTreeMap<EntityId, Entity>,
}

impl EntityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_local_player(&mut self, entity: Entity) {
        self.local_player = Some(entity.id);
        self.entities.insert(entity.id, entity);
    }

    pub fn upsert(&mut self, entity: Entity) {
        self.entities.insert(entity.id, entity);
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        if self.local_player == Some(id) {
            self.local_player = None;
        }
        self.entities.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn local_player(&self) -> Option<&Entity> {
        self.local_player.and_then(|id| self.entities.get(&id))
    }

    /// Positions of every player except the local one.
    pub fn other_player_positions(&self) -> Vec<Vec3> {
        self.entities
            .values()
            .filter(|e| e.is_player() && Some(e.id) != self.local_player)
            .map(|e| e.position)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_players_excludes_local_player_and_non_players() {
        let mut table = EntityTable::new();
        table.set_local_player(Entity::player(1, Vec3::new(0.0, 64.0, 0.0)));
        table.upsert(Entity::player(2, Vec3::new(5.0, 64.0, 0.0)));
        table.upsert(Entity {
            id: 3,
            kind: EntityKind::Other("minecraft:cow".into()),
            position: Vec3::new(1.0, 64.0, 1.0),
        });
        assert_eq!(table.other_player_positions(), vec![Vec3::new(5.0, 64.0, 0.0)]);
        assert_eq!(table.local_player().map(|e| e.id), Some(1));

        table.remove(1);
        assert!(table.local_player().is_none());
    }
}
