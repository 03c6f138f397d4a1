//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// A team keeps its identity while its roster is edited, withdrawn, or
/// reinstated; lookups across the original and in-session collections go
/// through this trait.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Find an entity by identifier in a slice.
pub fn find_by_id<'a, E: Entity>(entities: &'a [E], id: &E::Id) -> Option<&'a E> {
    entities.iter().find(|e| e.id() == id)
}

/// Position of an entity in a slice, by identifier.
pub fn position_by_id<E: Entity>(entities: &[E], id: &E::Id) -> Option<usize> {
    entities.iter().position(|e| e.id() == id)
}
