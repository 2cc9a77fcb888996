use rapier3d::prelude::*;

/// Collision layers used for filtering contacts and ray casts
///
/// Every collider belongs to exactly one layer. Ray casts issued for
/// movement requests only see the layers the caller marks as visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionLayer {
    /// Walkable ground and floors
    Ground = 0b0000_0001,

    /// Static scenery (walls, props)
    Scenery = 0b0000_0010,

    /// Human characters
    Human = 0b0000_0100,

    /// Dog companions
    Dog = 0b0000_1000,

    /// Thrown objects (the stick)
    Throwable = 0b0001_0000,
}

impl CollisionLayer {
    /// Convert to rapier3d's InteractionGroups
    pub fn to_interaction_groups(self) -> InteractionGroups {
        let memberships = Group::from_bits_truncate(self as u32);

        let filter = match self {
            // Characters stand on the ground and bump into scenery, not into each other
            CollisionLayer::Human | CollisionLayer::Dog => Group::from_bits_truncate(
                CollisionLayer::Ground as u32
                    | CollisionLayer::Scenery as u32
                    | CollisionLayer::Throwable as u32,
            ),

            // Static geometry collides with everything that moves
            CollisionLayer::Ground | CollisionLayer::Scenery => Group::ALL,

            CollisionLayer::Throwable => Group::from_bits_truncate(
                CollisionLayer::Ground as u32
                    | CollisionLayer::Scenery as u32
                    | CollisionLayer::Human as u32
                    | CollisionLayer::Dog as u32,
            ),
        };

        InteractionGroups::new(memberships, filter)
    }
}

/// Set of layers visible to a query (for instance the floors currently shown)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Every layer visible
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    /// No layer visible
    pub const NONE: LayerMask = LayerMask(0);

    /// Mask with a single layer visible
    pub fn only(layer: CollisionLayer) -> Self {
        Self(layer as u32)
    }

    /// Add a layer to the mask
    pub fn with(self, layer: CollisionLayer) -> Self {
        Self(self.0 | layer as u32)
    }

    /// Check if a layer is visible
    pub fn contains(&self, layer: CollisionLayer) -> bool {
        self.0 & layer as u32 != 0
    }

    /// Query filter groups that only hit visible layers
    pub fn to_query_groups(self) -> InteractionGroups {
        InteractionGroups::new(Group::ALL, Group::from_bits_truncate(self.0))
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_layer_bits() {
        let layers = [
            CollisionLayer::Ground,
            CollisionLayer::Scenery,
            CollisionLayer::Human,
            CollisionLayer::Dog,
            CollisionLayer::Throwable,
        ];

        for (i, a) in layers.iter().enumerate() {
            for (j, b) in layers.iter().enumerate() {
                if i != j {
                    assert_eq!(*a as u32 & *b as u32, 0, "Layers must have unique bits");
                }
            }
        }
    }

    #[test]
    fn test_human_doesnt_collide_with_dog() {
        let human = CollisionLayer::Human.to_interaction_groups();
        let dog_bit = Group::from_bits_truncate(CollisionLayer::Dog as u32);
        assert!(!human.filter.contains(dog_bit));
    }

    #[test]
    fn test_human_stands_on_ground() {
        let human = CollisionLayer::Human.to_interaction_groups();
        let ground = CollisionLayer::Ground.to_interaction_groups();
        assert!(human.test(ground));
    }

    #[test]
    fn test_layer_mask() {
        let mask = LayerMask::only(CollisionLayer::Ground).with(CollisionLayer::Scenery);
        assert!(mask.contains(CollisionLayer::Ground));
        assert!(mask.contains(CollisionLayer::Scenery));
        assert!(!mask.contains(CollisionLayer::Human));
        assert!(!LayerMask::NONE.contains(CollisionLayer::Ground));
    }
}
