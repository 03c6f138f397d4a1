//! Infrastructure layer: record storage, configuration, and the registration
//! desk that connects stored registrations to the edit engine.

pub mod config;
pub mod desk;
pub mod store;

pub use config::RegistrationConfig;
pub use desk::{OpenRegistration, RegistrationDesk, RegistrationKey};
pub use store::{InMemoryRecordStore, RecordStore, StoreError};
