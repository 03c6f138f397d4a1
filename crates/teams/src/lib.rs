//! Teams and rosters.
//!
//! This crate holds the canonical shapes for registered teams and their
//! members, plus the single normalisation step that turns loosely-shaped
//! member records coming from forms and imports into those shapes.

pub mod roster;
pub mod team;

pub use roster::{DEFAULT_ROLE, RawMember, RosterMember, normalize_role, normalize_roster, roster_size};
pub use team::{TeamDraft, TeamEntry, TeamsByDivision, UNASSIGNED_DIVISION, group_by_division};
