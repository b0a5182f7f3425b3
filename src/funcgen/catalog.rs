//! Hand-authored static catalog
//!
//! Three well-understood, numerically gentle records that are always available,
//! so a new player never starts on a randomly generated curve.

use crate::consts::{STANDARD_CHECKPOINTS, STANDARD_DOMAIN};

use super::expr::{Expr, Waveform};
use super::record::FunctionRecord;

/// Number of catalog entries
pub const CATALOG_LEN: usize = 3;

/// Build the static catalog: sinusoid-plus-quadratic, logistic, cubic.
pub fn catalog() -> [FunctionRecord; CATALOG_LEN] {
    [
        FunctionRecord {
            name: "Sinusoid".to_string(),
            formula: "f(x) = 50·sin(0.01x) + 0.001x² + 300".to_string(),
            expr: Expr::Trigonometric {
                wave: Waveform::Sin,
                amplitude: 50.0,
                frequency: 0.01,
                phase: 0.0,
                linear: 0.0,
                quadratic: 0.001,
                shift: 300.0,
            },
            domain: STANDARD_DOMAIN,
            checkpoint_count: STANDARD_CHECKPOINTS,
        },
        FunctionRecord {
            name: "Logistic".to_string(),
            formula: "f(x) = 400 / (1 + e^(-0.01(x - 500)))".to_string(),
            expr: Expr::Logistic {
                limit: 400.0,
                rate: 0.01,
                midpoint: 500.0,
            },
            domain: STANDARD_DOMAIN,
            checkpoint_count: STANDARD_CHECKPOINTS,
        },
        FunctionRecord {
            name: "Cubic".to_string(),
            formula: "f(x) = 0.00001x³ - 0.015x² + 5x + 300".to_string(),
            expr: Expr::Polynomial {
                coeffs: vec![300.0, 5.0, -0.015, 0.00001],
            },
            domain: STANDARD_DOMAIN,
            checkpoint_count: STANDARD_CHECKPOINTS,
        },
    ]
}
