//! Registration edit engine.
//!
//! Tracks an in-session set of team additions, withdrawals and roster edits
//! against a previously submitted registration, and derives the merged team
//! set, an annotated edit-mode invoice and a change log from it. Pure,
//! synchronous domain logic: persistence and rendering belong to callers.

pub mod changelog;
pub mod edit_invoice;
pub mod engine;
pub mod error;
pub mod record;
pub mod session;
pub mod settings;
pub mod snapshot;

pub use changelog::ChangeLogEntry;
pub use edit_invoice::{EditModeInvoice, EditModeLineItem};
pub use engine::{ImportSummary, RegistrationEditEngine, RemovalOrigin, RemovedTeam, Submission};
pub use error::{RegistrationError, RegistrationResult};
pub use record::{EditRecord, InvoiceSummary};
pub use session::EditSession;
pub use settings::EngineSettings;
pub use snapshot::{IssuedInvoice, RegistrationSnapshot};
