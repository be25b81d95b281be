//! Mapping between catalog ids and the scene entities that draw them.

use std::collections::HashMap;

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::catalog::RitId;

/// The entities representing one catalog entry.
#[derive(Clone, Debug)]
pub struct Renderable {
    /// Top-level entity (a single mesh or a group).
    pub root: Entity,
    /// Every mesh under `root`, including `root` itself when it is a mesh.
    pub leaves: SmallVec<[Entity; 4]>,
}

/// Bidirectional index built while the scene is spawned.
///
/// Forward lookups feed the highlight; reverse lookups resolve a picked mesh
/// back to its catalog id without walking the hierarchy.
#[derive(Resource, Default, Debug)]
pub struct RenderableRegistry {
    by_id: HashMap<RitId, Renderable>,
    by_entity: HashMap<Entity, RitId>,
}

impl RenderableRegistry {
    pub fn insert(&mut self, id: RitId, renderable: Renderable) {
        if let Some(previous) = self.by_id.remove(&id) {
            warn!("Renderable for RIT {} registered twice, replacing", id);
            self.by_entity.remove(&previous.root);
            for leaf in &previous.leaves {
                self.by_entity.remove(leaf);
            }
        }
        self.by_entity.insert(renderable.root, id);
        for &leaf in &renderable.leaves {
            self.by_entity.insert(leaf, id);
        }
        self.by_id.insert(id, renderable);
    }

    pub fn get(&self, id: RitId) -> Option<&Renderable> {
        self.by_id.get(&id)
    }

    pub fn leaves(&self, id: RitId) -> &[Entity] {
        self.by_id
            .get(&id)
            .map(|renderable| renderable.leaves.as_slice())
            .unwrap_or(&[])
    }

    /// Catalog id drawn by `entity`, if any.
    pub fn resolve(&self, entity: Entity) -> Option<RitId> {
        self.by_entity.get(&entity).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;

    #[test]
    fn reverse_index_covers_root_and_leaves() {
        let mut registry = RenderableRegistry::default();
        let root = Entity::from_raw(10);
        let a = Entity::from_raw(11);
        let b = Entity::from_raw(12);
        registry.insert(
            RitId(8),
            Renderable {
                root,
                leaves: smallvec![a, b],
            },
        );

        assert_eq!(registry.resolve(root), Some(RitId(8)));
        assert_eq!(registry.resolve(a), Some(RitId(8)));
        assert_eq!(registry.resolve(b), Some(RitId(8)));
        assert_eq!(registry.resolve(Entity::from_raw(13)), None);
        assert_eq!(registry.leaves(RitId(8)), &[a, b]);
        assert!(registry.leaves(RitId(1)).is_empty());
    }

    #[test]
    fn reinsert_drops_stale_reverse_entries() {
        let mut registry = RenderableRegistry::default();
        let old = Entity::from_raw(1);
        let new = Entity::from_raw(2);
        registry.insert(
            RitId(3),
            Renderable {
                root: old,
                leaves: smallvec![old],
            },
        );
        registry.insert(
            RitId(3),
            Renderable {
                root: new,
                leaves: smallvec![new],
            },
        );

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve(old), None);
        assert_eq!(registry.resolve(new), Some(RitId(3)));
    }
}
