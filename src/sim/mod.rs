//! Game simulation module
//!
//! All gameplay logic lives here. This module stays platform-free:
//! - Elapsed time is passed in, never read from a clock
//! - Seeded RNG only
//! - No DOM, audio or storage dependencies

pub mod animator;
pub mod movement;
pub mod scheduler;
pub mod session;
pub mod spawn;

pub use animator::{AnimatorPhase, ObjectAnimator, PositionSink, TickOutcome};
pub use movement::{MovementPattern, position_at};
pub use scheduler::{FrameClock, Scheduler, TimerId};
pub use session::SessionState;
pub use spawn::random_position;
