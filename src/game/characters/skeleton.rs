// Bone hierarchy of a character model

use glam::{Mat4, Vec3};

/// Skeleton errors
#[derive(Debug, thiserror::Error)]
pub enum SkeletonError {
    #[error("Unknown skeleton node: {0}")]
    UnknownNode(String),

    #[error("Duplicate skeleton node: {0}")]
    DuplicateNode(String),
}

/// One node (bone) of a skeleton
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    /// Transform relative to the parent node
    pub local_transform: Mat4,
    /// Transform relative to the model, see `Skeleton::calculate_transforms`
    pub global_transform: Mat4,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl Node {
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Indices of the child nodes
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Model-space position of the node
    pub fn translation(&self) -> Vec3 {
        self.global_transform.w_axis.truncate()
    }
}

/// Node hierarchy stored parent-first
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    nodes: Vec<Node>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node under `parent` (or as a root), returns its index
    pub fn add_node(
        &mut self,
        id: &str,
        parent: Option<&str>,
        local_transform: Mat4,
    ) -> Result<usize, SkeletonError> {
        if self.index_of(id).is_some() {
            return Err(SkeletonError::DuplicateNode(id.to_string()));
        }
        let parent = parent
            .map(|parent_id| {
                self.index_of(parent_id)
                    .ok_or_else(|| SkeletonError::UnknownNode(parent_id.to_string()))
            })
            .transpose()?;

        let global_transform = match parent {
            Some(p) => self.nodes[p].global_transform * local_transform,
            None => local_transform,
        };
        let index = self.nodes.len();
        self.nodes.push(Node {
            id: id.to_string(),
            local_transform,
            global_transform,
            parent,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            self.nodes[p].children.push(index);
        }
        Ok(index)
    }

    /// Recompute model-space transforms after local transforms changed
    pub fn calculate_transforms(&mut self) {
        // Parents always precede their children
        for index in 0..self.nodes.len() {
            let global = match self.nodes[index].parent {
                Some(p) => self.nodes[p].global_transform * self.nodes[index].local_transform,
                None => self.nodes[index].local_transform,
            };
            self.nodes[index].global_transform = global;
        }
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.id == id)
    }

    /// Look up a node by id
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Look up a node by id for editing its local transform
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    pub fn node_at(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Model-space midpoint of a bone: halfway between the node and the
    /// mean of its children, or the node itself for a tip bone
    pub fn bone_midpoint(&self, id: &str) -> Result<Vec3, SkeletonError> {
        let node = self
            .node(id)
            .ok_or_else(|| SkeletonError::UnknownNode(id.to_string()))?;
        let start = node.translation();
        if !node.has_children() {
            return Ok(start);
        }
        let sum: Vec3 = node
            .children
            .iter()
            .map(|&child| self.nodes[child].translation())
            .sum();
        let end = sum / node.children.len() as f32;
        Ok((start + end) * 0.5)
    }

    /// Humanoid rig, about 1.8 units tall, facing +Z
    pub fn humanoid() -> Self {
        let bones: &[(&str, Option<&str>, Vec3)] = &[
            ("armature", None, Vec3::ZERO),
            ("hips", Some("armature"), Vec3::new(0.0, 0.95, 0.0)),
            ("spine", Some("hips"), Vec3::new(0.0, 0.15, 0.0)),
            ("chest", Some("spine"), Vec3::new(0.0, 0.25, 0.0)),
            ("neck", Some("chest"), Vec3::new(0.0, 0.2, 0.0)),
            ("head", Some("neck"), Vec3::new(0.0, 0.12, 0.0)),
            ("upper_arm_left", Some("chest"), Vec3::new(0.2, 0.15, 0.0)),
            ("forearm_left", Some("upper_arm_left"), Vec3::new(0.0, -0.28, 0.0)),
            ("left_hand", Some("forearm_left"), Vec3::new(0.0, -0.25, 0.0)),
            ("left_fingers", Some("left_hand"), Vec3::new(0.0, -0.08, 0.0)),
            ("upper_arm_right", Some("chest"), Vec3::new(-0.2, 0.15, 0.0)),
            ("forearm_right", Some("upper_arm_right"), Vec3::new(0.0, -0.28, 0.0)),
            ("right_hand", Some("forearm_right"), Vec3::new(0.0, -0.25, 0.0)),
            ("right_fingers", Some("right_hand"), Vec3::new(0.0, -0.08, 0.0)),
            ("thigh_left", Some("hips"), Vec3::new(0.1, -0.05, 0.0)),
            ("shin_left", Some("thigh_left"), Vec3::new(0.0, -0.45, 0.0)),
            ("foot_left", Some("shin_left"), Vec3::new(0.0, -0.42, 0.0)),
            ("thigh_right", Some("hips"), Vec3::new(-0.1, -0.05, 0.0)),
            ("shin_right", Some("thigh_right"), Vec3::new(0.0, -0.45, 0.0)),
            ("foot_right", Some("shin_right"), Vec3::new(0.0, -0.42, 0.0)),
        ];
        Self::from_offsets(bones)
    }

    /// Quadruped rig for dogs, facing +Z
    pub fn quadruped() -> Self {
        let bones: &[(&str, Option<&str>, Vec3)] = &[
            ("armature", None, Vec3::ZERO),
            ("pelvis", Some("armature"), Vec3::new(0.0, 0.45, -0.3)),
            ("spine", Some("pelvis"), Vec3::new(0.0, 0.02, 0.3)),
            ("chest", Some("spine"), Vec3::new(0.0, 0.0, 0.3)),
            ("neck", Some("chest"), Vec3::new(0.0, 0.12, 0.1)),
            ("head", Some("neck"), Vec3::new(0.0, 0.08, 0.12)),
            ("tail", Some("pelvis"), Vec3::new(0.0, 0.05, -0.25)),
            ("front_leg_left", Some("chest"), Vec3::new(0.1, -0.2, 0.0)),
            ("front_paw_left", Some("front_leg_left"), Vec3::new(0.0, -0.25, 0.0)),
            ("front_leg_right", Some("chest"), Vec3::new(-0.1, -0.2, 0.0)),
            ("front_paw_right", Some("front_leg_right"), Vec3::new(0.0, -0.25, 0.0)),
            ("hind_leg_left", Some("pelvis"), Vec3::new(0.1, -0.2, 0.0)),
            ("hind_paw_left", Some("hind_leg_left"), Vec3::new(0.0, -0.25, 0.0)),
            ("hind_leg_right", Some("pelvis"), Vec3::new(-0.1, -0.2, 0.0)),
            ("hind_paw_right", Some("hind_leg_right"), Vec3::new(0.0, -0.25, 0.0)),
        ];
        Self::from_offsets(bones)
    }

    fn from_offsets(bones: &[(&str, Option<&str>, Vec3)]) -> Self {
        let mut skeleton = Self::new();
        for &(id, parent, offset) in bones {
            // Static rig tables: parents are listed before children and ids are unique
            if let Err(err) = skeleton.add_node(id, parent, Mat4::from_translation(offset)) {
                log::error!("Invalid rig table entry {id}: {err}");
            }
        }
        skeleton
    }
}
