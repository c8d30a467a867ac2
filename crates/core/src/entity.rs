//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Stores use the identifier to index records; two entities with the same id
/// are the same record even if their attributes differ.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
