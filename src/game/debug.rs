// Debug drawing of character skeletons
//
// Geometry is collected as indexed line lists ready to be uploaded to a
// vertex buffer. Drawing never changes the characters.

use glam::{Mat4, Vec3};

use super::characters::{DogCharacter, HumanCharacter, Skeleton};

pub const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
pub const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
pub const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// Edge length of the box drawn at each node
const NODE_BOX_SIZE: f32 = 0.02;
/// Edge length of the boxes drawn at the hands
const HAND_BOX_SIZE: f32 = 0.05;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DebugVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Line geometry collected during a frame
#[derive(Debug, Default)]
pub struct DebugDrawList {
    vertices: Vec<DebugVertex>,
    indices: Vec<u32>,
    lines: usize,
    boxes: usize,
}

impl DebugDrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.lines = 0;
        self.boxes = 0;
    }

    /// Draw a line segment
    pub fn draw_line(&mut self, from: Vec3, to: Vec3, color: [f32; 4]) {
        let start_idx = self.next_index();
        self.push_vertex(from, color);
        self.push_vertex(to, color);
        self.indices.push(start_idx);
        self.indices.push(start_idx + 1);
        self.lines += 1;
    }

    /// Draw an axis-aligned wire cube centered at `center`
    pub fn draw_box(&mut self, center: Vec3, size: f32, color: [f32; 4]) {
        let start_idx = self.next_index();
        let h = size / 2.0;

        // Corner i has bit 0 = +x, bit 1 = +y, bit 2 = +z
        for i in 0..8u32 {
            let corner = Vec3::new(
                if i & 1 != 0 { h } else { -h },
                if i & 2 != 0 { h } else { -h },
                if i & 4 != 0 { h } else { -h },
            );
            self.push_vertex(center + corner, color);
        }

        // Twelve edges: pairs of corners differing in one bit
        for i in 0..8u32 {
            for bit in [1u32, 2, 4] {
                if i & bit == 0 {
                    self.indices.push(start_idx + i);
                    self.indices.push(start_idx + (i | bit));
                }
            }
        }
        self.boxes += 1;
    }

    /// Index the next pushed vertex will get
    fn next_index(&self) -> u32 {
        u32::try_from(self.vertices.len()).unwrap_or(u32::MAX)
    }

    fn push_vertex(&mut self, position: Vec3, color: [f32; 4]) {
        self.vertices.push(DebugVertex {
            position: position.to_array(),
            color,
        });
    }

    pub fn vertices(&self) -> &[DebugVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Vertex data as raw bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn line_count(&self) -> usize {
        self.lines
    }

    pub fn box_count(&self) -> usize {
        self.boxes
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// A character with a drawable skeleton
pub trait Armature {
    /// Model transform (rotation and translation are used)
    fn model_transform(&self) -> Mat4;

    fn skeleton(&self) -> &Skeleton;

    /// World positions of the right and left hand, for characters with hands
    fn hand_positions(&self) -> Option<(Vec3, Vec3)> {
        None
    }
}

impl Armature for HumanCharacter {
    fn model_transform(&self) -> Mat4 {
        self.transform()
    }

    fn skeleton(&self) -> &Skeleton {
        HumanCharacter::skeleton(self)
    }

    fn hand_positions(&self) -> Option<(Vec3, Vec3)> {
        let right = self.right_hand_world_position().ok()?;
        let left = self.left_hand_world_position().ok()?;
        Some((right, left))
    }
}

impl Armature for DogCharacter {
    fn model_transform(&self) -> Mat4 {
        self.transform()
    }

    fn skeleton(&self) -> &Skeleton {
        DogCharacter::skeleton(self)
    }
}

/// Draws the bones of a character
#[derive(Debug, Default)]
pub struct ArmatureDebugDrawer;

impl ArmatureDebugDrawer {
    pub fn new() -> Self {
        Self
    }

    /// Draw the skeleton below `root_node_id`, plus hand markers for humans.
    /// Nothing is drawn without a character; an unknown root skips the bones.
    pub fn draw_armature(
        &self,
        list: &mut DebugDrawList,
        character: Option<&dyn Armature>,
        root_node_id: &str,
    ) {
        let Some(character) = character else {
            return;
        };

        let skeleton = character.skeleton();
        if let Some(root) = skeleton.index_of(root_node_id) {
            let (_, model_rotation, model_position) =
                character.model_transform().to_scale_rotation_translation();
            let to_world = |local: Vec3| model_rotation * local + model_position;
            self.draw_nodes(list, skeleton, root, None, &to_world);
        }

        if let Some((right, left)) = character.hand_positions() {
            list.draw_box(right, HAND_BOX_SIZE, RED);
            list.draw_box(left, HAND_BOX_SIZE, GREEN);
        }
    }

    fn draw_nodes(
        &self,
        list: &mut DebugDrawList,
        skeleton: &Skeleton,
        index: usize,
        parent_position: Option<Vec3>,
        to_world: &dyn Fn(Vec3) -> Vec3,
    ) {
        let Some(node) = skeleton.node_at(index) else {
            return;
        };
        let position = to_world(node.translation());

        list.draw_box(position, NODE_BOX_SIZE, GREEN);
        if let Some(parent_position) = parent_position {
            list.draw_line(parent_position, position, YELLOW);
        }
        for &child in node.children() {
            self.draw_nodes(list, skeleton, child, Some(position), to_world);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Stick {
        transform: Mat4,
        skeleton: Skeleton,
        hands: bool,
    }

    impl Stick {
        fn new(transform: Mat4, hands: bool) -> Self {
            let mut skeleton = Skeleton::new();
            skeleton.add_node("root", None, Mat4::IDENTITY).unwrap();
            skeleton
                .add_node("a", Some("root"), Mat4::from_translation(Vec3::Y))
                .unwrap();
            skeleton
                .add_node("b", Some("root"), Mat4::from_translation(Vec3::X))
                .unwrap();
            Self {
                transform,
                skeleton,
                hands,
            }
        }
    }

    impl Armature for Stick {
        fn model_transform(&self) -> Mat4 {
            self.transform
        }

        fn skeleton(&self) -> &Skeleton {
            &self.skeleton
        }

        fn hand_positions(&self) -> Option<(Vec3, Vec3)> {
            self.hands.then_some((Vec3::X, -Vec3::X))
        }
    }

    #[test]
    fn test_box_geometry() {
        let mut list = DebugDrawList::new();
        list.draw_box(Vec3::ZERO, 2.0, RED);
        assert_eq!(list.vertices().len(), 8);
        assert_eq!(list.indices().len(), 24);
        assert_eq!(list.box_count(), 1);
        assert!(list
            .vertices()
            .iter()
            .all(|v| v.position.iter().all(|c| c.abs() == 1.0)));
    }

    #[test]
    fn test_nothing_without_character() {
        let mut list = DebugDrawList::new();
        ArmatureDebugDrawer::new().draw_armature(&mut list, None, "root");
        assert!(list.is_empty());
    }

    #[test]
    fn test_nodes_and_bones() {
        let stick = Stick::new(Mat4::IDENTITY, false);
        let mut list = DebugDrawList::new();
        ArmatureDebugDrawer::new().draw_armature(&mut list, Some(&stick), "root");

        assert_eq!(list.box_count(), 3);
        assert_eq!(list.line_count(), 2);
    }

    #[test]
    fn test_unknown_root_draws_hands_only() {
        let stick = Stick::new(Mat4::IDENTITY, true);
        let mut list = DebugDrawList::new();
        ArmatureDebugDrawer::new().draw_armature(&mut list, Some(&stick), "missing");

        assert_eq!(list.box_count(), 2);
        assert_eq!(list.line_count(), 0);
        assert!(list.vertices().iter().any(|v| v.color == RED));
    }

    #[test]
    fn test_model_transform_is_applied() {
        let transform = Mat4::from_rotation_translation(
            glam::Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::new(10.0, 0.0, 0.0),
        );
        let stick = Stick::new(transform, false);
        let mut list = DebugDrawList::new();
        ArmatureDebugDrawer::new().draw_armature(&mut list, Some(&stick), "root");

        // Bone from root to "a": a sits at +Y, rotated onto -X
        let ends: Vec<Vec3> = list
            .vertices()
            .iter()
            .filter(|v| v.color == YELLOW)
            .map(|v| Vec3::from_array(v.position))
            .collect();
        assert_eq!(ends.len(), 4);
        assert_relative_eq!(ends[0].x, 10.0, epsilon = 1e-5);
        assert_relative_eq!(ends[1].x, 9.0, epsilon = 1e-5);
        assert_relative_eq!(ends[1].y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_indices_past_sixteen_bits() {
        let mut list = DebugDrawList::new();
        // 8 vertices per box, 9000 boxes
        for i in 0..9000 {
            list.draw_box(Vec3::new(i as f32, 0.0, 0.0), 0.1, GREEN);
        }
        list.draw_line(Vec3::ZERO, Vec3::Y, YELLOW);

        assert_eq!(list.vertices().len(), 72_002);
        assert_eq!(&list.indices()[list.indices().len() - 2..], &[72_000, 72_001]);
        assert_eq!(list.indices().iter().copied().max(), Some(72_001));
    }

    #[test]
    fn test_vertex_bytes() {
        let mut list = DebugDrawList::new();
        list.draw_line(Vec3::ZERO, Vec3::ONE, YELLOW);
        assert_eq!(list.vertex_bytes().len(), 2 * std::mem::size_of::<DebugVertex>());
    }
}
