//! Live navigation over the street graph
//!
//! A [`NavigationSession`] consumes position samples from the host, keeps a
//! smoothed heading and a cached route to the current target, and answers
//! every accepted sample with turn-by-turn guidance.

mod config;
mod error;
mod events;
mod guidance;
mod heading;
mod instructions;
mod position;
mod session;

pub use config::NavigationConfig;
pub use error::NavigationError;
pub use events::{
    ArrivalEvent, FallbackReason, GuidanceHint, NavigationEvent, PositionErrorReport,
    RouteSource, UpdateOutcome,
};
pub use guidance::{DisplayDistance, DistanceUnit, RelativeDirection, relative_bearing};
pub use heading::HeadingFilter;
pub use instructions::{Instruction, TurnAction, TurnClassifier, generate_instructions};
pub use position::{PositionError, PositionSample, PositionSource};
pub use session::{NavigationSession, NavigationTarget, SessionState};
