//! Deterministic race simulation
//!
//! All gameplay logic lives here. The module is pure and deterministic:
//! - Fixed external tick rate, one `tick` per frame
//! - Seeded RNG only (record selection on reset)
//! - No rendering or platform dependencies
//!
//! The `RaceState` is exclusively owned by one control loop and mutated only
//! through `tick`, `submit_answer`/`submit_pending`, input editing and `reset`.

pub mod state;
pub mod tick;

pub use state::{
    AnswerError, Checkpoint, CrashCause, DerivativeKind, Difficulty, InvalidDifficulty, Phase,
    RaceState, RecordSource,
};
pub use tick::{camera_for, tick};
