//! Derivative Dash - an educational arcade game core
//!
//! Core modules:
//! - `funcgen`: Procedural function/derivative generation (five families + static catalog)
//! - `sim`: Deterministic race simulation (checkpoints, answers, scoring)
//!
//! Rendering, menus and input polling are external collaborators: they read the
//! `RaceState` and drive it through `tick`, `submit_answer` and the pending-input
//! editing methods, nothing else.

pub mod funcgen;
pub mod sim;

pub use funcgen::{CATALOG_LEN, Family, FunctionGenerator, FunctionRecord, GenerateError, catalog};
pub use sim::{Checkpoint, DerivativeKind, Difficulty, Phase, RaceState, tick};

/// Game configuration constants
pub mod consts {
    /// Reference simulation rate (ticks per second); the frame loop owns the clock
    pub const TICK_RATE: u32 = 60;

    /// Viewport dimensions the camera formula is calibrated for
    pub const VIEWPORT_WIDTH: f64 = 1000.0;
    pub const VIEWPORT_HEIGHT: f64 = 600.0;
    /// Camera keeps the car a third of the viewport from the left edge
    pub const CAMERA_LEAD: f64 = VIEWPORT_WIDTH / 3.0;
    /// Vertical clamp so the car is never framed behind the HUD header
    pub const HEADER_CLEARANCE: f64 = 200.0;

    /// Car starts this far past the domain start
    pub const START_OFFSET: f64 = 50.0;
    /// Track ends this far before the domain end
    pub const END_MARGIN: f64 = 50.0;
    /// Arrival radius: within this distance the car snaps onto a checkpoint
    pub const CHECKPOINT_SNAP: f64 = 10.0;

    /// Shared domain for all generated records
    pub const STANDARD_DOMAIN: (f64, f64) = (0.0, 1000.0);
    /// Checkpoints per generated record
    pub const STANDARD_CHECKPOINTS: usize = 4;

    /// Points for a correct first-derivative answer
    pub const FIRST_DERIVATIVE_POINTS: u32 = 100;
    /// Points for a correct second-derivative answer (harder, pays more)
    pub const SECOND_DERIVATIVE_POINTS: u32 = 150;
    /// Victory bonus is this many points per difficulty level
    pub const COMPLETION_BONUS_PER_LEVEL: u32 = 100;
}
