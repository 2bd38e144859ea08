//! Flat ordered collection of interactive entities plus the minimal scene
//! graph behind them. Every entity is a group node tagged with identity
//! metadata and a child mesh node carrying pickable bounds; hit results
//! land on leaves and resolve upward to the tagged ancestor.

use std::path::PathBuf;

use glam::{Mat4, Quat, Vec3};

use crate::catalog::SectionKind;
use crate::layout::RingSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Mutually exclusive visual states; `Hovered` may overlay `Current`, in
/// which case the entity keeps `Current` and only the cursor changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualState {
    Default,
    Hovered,
    Current,
    Expanded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Video {
        video_id: String,
        title: String,
    },
    Photo {
        image: PathBuf,
        caption: String,
    },
    Contact {
        label: String,
        url: String,
    },
    /// Landing-scene hotspot routing into a section.
    Hotspot {
        target: SectionKind,
    },
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub parent: Option<NodeId>,
    /// Identity tag; present on group nodes, absent on mesh leaves.
    pub identity: Option<String>,
    /// Pickable half extents in local space; present on mesh leaves.
    pub half_extents: Option<Vec3>,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub identity: String,
    pub display_index: usize,
    pub position: Vec3,
    /// Ring slot the entity was laid out at; idle bobbing and highlight
    /// nudges are expressed relative to this.
    pub home_position: Vec3,
    pub orientation: Quat,
    pub scale: f32,
    pub opacity: f32,
    pub emphasis: f32,
    /// Accumulated idle self-rotation around the local Y axis.
    pub spin: f32,
    /// Idle vertical bob offset, recomputed each frame.
    pub bob: f32,
    pub visible: bool,
    pub visual_state: VisualState,
    pub payload: Payload,
    pub group: NodeId,
    pub mesh: NodeId,
}

impl Entity {
    pub fn model_matrix(&self) -> Mat4 {
        let rotation = self.orientation * Quat::from_rotation_y(self.spin);
        let translation = self.position + Vec3::Y * self.bob;
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, translation)
    }
}

#[derive(Debug, Default)]
pub struct EntityRegistry {
    nodes: Vec<SceneNode>,
    entities: Vec<Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    pub fn entity_mut(&mut self, index: usize) -> Option<&mut Entity> {
        self.entities.get_mut(index)
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    /// Drop every entity and node. Callers re-running a ring layout must
    /// clear first so a refresh never duplicates placed items.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.entities.clear();
    }

    /// Place one entity at a ring slot: a tagged group node plus a mesh
    /// leaf carrying the pickable bounds. Returns the display index.
    pub fn insert(
        &mut self,
        identity: &str,
        payload: Payload,
        slot: RingSlot,
        half_extents: Vec3,
    ) -> usize {
        let group = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            parent: None,
            identity: Some(identity.to_string()),
            half_extents: None,
        });
        let mesh = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            parent: Some(group),
            identity: None,
            half_extents: Some(half_extents),
        });

        let display_index = self.entities.len();
        self.entities.push(Entity {
            identity: identity.to_string(),
            display_index,
            position: slot.position,
            home_position: slot.position,
            orientation: slot.orientation,
            scale: 1.0,
            opacity: 1.0,
            emphasis: 0.0,
            spin: 0.0,
            bob: 0.0,
            visible: true,
            visual_state: VisualState::Default,
            payload,
            group,
            mesh,
        });
        display_index
    }

    /// Walk up the ownership chain until a node carrying identity
    /// metadata is found; reaching the root without one means no valid
    /// hit.
    pub fn resolve_identity(&self, node: NodeId) -> Option<&str> {
        let mut current = Some(node);
        while let Some(id) = current {
            let node = self.nodes.get(id.0)?;
            if let Some(identity) = node.identity.as_deref() {
                return Some(identity);
            }
            current = node.parent;
        }
        None
    }

    /// Resolve a hit node to the display index of the entity owning it.
    pub fn entity_index_for_node(&self, node: NodeId) -> Option<usize> {
        let identity = self.resolve_identity(node)?;
        self.entities
            .iter()
            .position(|entity| entity.identity == identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RingLayout;

    fn sample_payload(n: usize) -> Payload {
        Payload::Contact {
            label: format!("label{n}"),
            url: format!("https://example.com/{n}"),
        }
    }

    fn populated(count: usize) -> EntityRegistry {
        let mut registry = EntityRegistry::new();
        let ring = RingLayout::tilted(10.0);
        for index in 0..count {
            registry.insert(
                &format!("entity{index}"),
                sample_payload(index),
                ring.slot(index, count),
                Vec3::splat(1.25),
            );
        }
        registry
    }

    #[test]
    fn display_indices_are_contiguous_from_zero() {
        let registry = populated(7);
        for (expected, entity) in registry.entities().iter().enumerate() {
            assert_eq!(entity.display_index, expected);
        }
    }

    #[test]
    fn mesh_leaf_resolves_to_group_identity() {
        let registry = populated(3);
        let entity = registry.entity(1).expect("entity 1");
        assert_eq!(registry.resolve_identity(entity.mesh), Some("entity1"));
        assert_eq!(registry.entity_index_for_node(entity.mesh), Some(1));
    }

    #[test]
    fn untagged_chain_yields_no_identity() {
        let mut registry = EntityRegistry::new();
        registry.nodes.push(SceneNode {
            parent: None,
            identity: None,
            half_extents: None,
        });
        registry.nodes.push(SceneNode {
            parent: Some(NodeId(0)),
            identity: None,
            half_extents: Some(Vec3::ONE),
        });
        assert_eq!(registry.resolve_identity(NodeId(1)), None);
        assert_eq!(registry.entity_index_for_node(NodeId(1)), None);
    }

    #[test]
    fn clear_removes_entities_and_nodes() {
        let mut registry = populated(4);
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.nodes.is_empty());
        // A rebuild starts indexing from zero again.
        let ring = RingLayout::tilted(8.0);
        let index = registry.insert("fresh", sample_payload(0), ring.slot(0, 1), Vec3::ONE);
        assert_eq!(index, 0);
    }

    #[test]
    fn model_matrix_applies_scale_spin_and_bob() {
        let mut registry = populated(1);
        {
            let entity = registry.entity_mut(0).expect("entity");
            entity.scale = 2.0;
            entity.bob = 0.5;
        }
        let entity = registry.entity(0).expect("entity");
        let matrix = entity.model_matrix();
        let origin = matrix.transform_point3(Vec3::ZERO);
        let expected = entity.position + Vec3::Y * 0.5;
        assert!((origin - expected).length() <= 1e-5);
    }
}
