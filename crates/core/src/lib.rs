//! `clubreg-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage or UI concerns).

pub mod date;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use date::{end_of_day, parse_calendar_date};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ClubId, EventId, TeamId};
pub use value_object::ValueObject;
