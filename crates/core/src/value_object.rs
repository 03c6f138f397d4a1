//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined entirely
//! by their attribute values. Two value objects with the same values are considered equal.

/// Marker trait for value objects.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: No identity (a roster member, a resolved price, an invoice line)
/// - **Entity**: Has identity (a team keeps its id while its roster changes)
///
/// Value objects are replaced, not edited: saving a roster swaps the whole
/// member list rather than patching members in place.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
