//! Integer ids shared with the native engine.

/// Sentinel for "no id".
pub const INVALID_ID: i32 = -1;

/// Returns true for any id other than [`INVALID_ID`].
pub fn is_valid(id: i32) -> bool {
    id != INVALID_ID
}

/// Handle of an entity living inside the native engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub i32);

impl EntityId {
    /// The id an entity holds while it is not registered with the engine
    pub const INVALID: Self = Self(INVALID_ID);

    /// Check if this id refers to a live engine entity
    pub fn is_valid(&self) -> bool {
        is_valid(self.0)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::INVALID
    }
}
