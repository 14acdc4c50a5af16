/// EntityHandle — identifier of an entity owned by the ECS.
///
/// The spatial indices store and compare handles but never interpret the
/// generation; ordering (deterministic mode) is by `id` ascending.

use rdst::RadixKey;

/// Opaque entity identifier (id + generation tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EntityHandle {
    /// Numeric identifier
    pub id: u32,
    /// Generation tag (owned by the ECS, never inspected here)
    pub generation: u32,
}

impl EntityHandle {
    pub const fn new(id: u32, generation: u32) -> Self {
        Self { id, generation }
    }
}

// Radix key over the id only: deterministic output is ordered by id.
impl RadixKey for EntityHandle {
    const LEVELS: usize = 4;

    #[inline]
    fn get_level(&self, level: usize) -> u8 {
        (self.id >> (level * 8)) as u8
    }
}
