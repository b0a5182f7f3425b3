//! The function record handed to the race state machine

use serde::{Deserialize, Serialize};

use super::expr::Expr;

/// An immutable function + derivatives bundle with display metadata.
///
/// Invariant (upheld by the generator and the catalog): `evaluate`,
/// `first_derivative` and `second_derivative` are finite for every x inside
/// `domain`, and each is the exact analytic derivative of the previous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    /// Display label
    pub name: String,
    /// Human-readable formula for the HUD; never parsed back
    pub formula: String,
    /// The expression evaluated during play
    pub expr: Expr,
    /// Half-open interval (min, max) the race runs over, min < max
    pub domain: (f64, f64),
    /// Number of checkpoints on the track, >= 1
    pub checkpoint_count: usize,
}

impl FunctionRecord {
    /// f(x)
    pub fn evaluate(&self, x: f64) -> f64 {
        self.expr.eval(x)
    }

    /// f'(x)
    pub fn first_derivative(&self, x: f64) -> f64 {
        self.expr.d1(x)
    }

    /// f''(x)
    pub fn second_derivative(&self, x: f64) -> f64 {
        self.expr.d2(x)
    }

    pub fn track_length(&self) -> f64 {
        self.domain.1 - self.domain.0
    }
}
