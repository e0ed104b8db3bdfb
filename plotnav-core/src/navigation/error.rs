use thiserror::Error;

use super::position::PositionError;

/// Session failures surfaced to the host.
///
/// `NotStarted` and `AlreadyStarted` indicate misuse of the session API;
/// `PositionUnavailable` means `start` could not obtain a first fix.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Navigation session has not been started")]
    NotStarted,
    #[error("Navigation session is already running")]
    AlreadyStarted,
    #[error("Could not obtain a starting position: {0}")]
    PositionUnavailable(#[from] PositionError),
}
