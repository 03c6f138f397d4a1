use thiserror::Error;

use clubreg_core::{DomainError, TeamId};

pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Rejected session operation. Rejections never mutate the session; the
/// message is meant to be shown to the user as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("team {id} is already registered for this event")]
    DuplicateTeam { id: TeamId },

    #[error("all {skipped} teams in the import are already registered; nothing was imported")]
    AllDuplicates { skipped: usize },

    #[error("the import did not contain any teams")]
    EmptyImport,

    #[error("team {id} is not part of this registration")]
    UnknownTeam { id: TeamId },

    #[error(transparent)]
    Domain(#[from] DomainError),
}
