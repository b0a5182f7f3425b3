//! Randomized function synthesis across five families
//!
//! The generator is seeded and deterministic: the same seed yields the same
//! sequence of records. Every synthesized record is validated for finiteness
//! across its whole domain before it is handed out; a bad draw is regenerated,
//! never surfaced to the player.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::consts::{STANDARD_CHECKPOINTS, STANDARD_DOMAIN};

use super::expr::{Expr, Waveform};
use super::record::FunctionRecord;

/// Function families the generator can synthesize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Family {
    Polynomial,
    Trigonometric,
    Exponential,
    Logarithmic,
    Composite,
}

impl Family {
    pub const ALL: [Family; 5] = [
        Family::Polynomial,
        Family::Trigonometric,
        Family::Exponential,
        Family::Logarithmic,
        Family::Composite,
    ];

    /// Families eligible as composite constituents
    const NON_COMPOSITE: [Family; 4] = [
        Family::Polynomial,
        Family::Trigonometric,
        Family::Exponential,
        Family::Logarithmic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Family::Polynomial => "polynomial",
            Family::Trigonometric => "trigonometric",
            Family::Exponential => "exponential",
            Family::Logarithmic => "logarithmic",
            Family::Composite => "composite",
        }
    }
}

impl FromStr for Family {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "polynomial" => Ok(Family::Polynomial),
            "trigonometric" | "trig" => Ok(Family::Trigonometric),
            "exponential" | "exp" => Ok(Family::Exponential),
            "logarithmic" | "log" => Ok(Family::Logarithmic),
            "composite" => Ok(Family::Composite),
            _ => Err(GenerateError::InvalidFamily(s.to_string())),
        }
    }
}

/// Generator errors, rejected before any synthesis work
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("unrecognized function family: {0:?}")]
    InvalidFamily(String),
    #[error("invalid difficulty range {0}..={1} (must satisfy 1 <= lo <= hi <= 3)")]
    InvalidDifficultyRange(u8, u8),
}

/// Attempts before giving up on the finiteness retry loop. All families are
/// designed to be finite on the standard domain, so this is a tripwire.
const MAX_SYNTH_ATTEMPTS: u32 = 16;

/// Samples taken across the domain when validating a candidate record
const VALIDATION_SAMPLES: usize = 1000;

/// Seeded procedural generator for function records
#[derive(Debug, Clone)]
pub struct FunctionGenerator {
    rng: Pcg32,
}

impl FunctionGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Generate one record. `family` of `None` samples uniformly from all five
    /// families; `difficulty` is clamped to 1..=3.
    pub fn generate(&mut self, family: Option<Family>, difficulty: u8) -> FunctionRecord {
        let difficulty = difficulty.clamp(1, 3);
        let family = family.unwrap_or_else(|| self.pick_family());

        let mut candidate = self.synthesize(family, difficulty);
        for attempt in 1..MAX_SYNTH_ATTEMPTS {
            if record_is_finite(&candidate) {
                return candidate;
            }
            log::warn!(
                "{} record had non-finite values (attempt {attempt}), regenerating",
                family.label()
            );
            candidate = self.synthesize(family, difficulty);
        }
        candidate
    }

    /// Generate `count` independent records, each with a difficulty sampled
    /// uniformly from `difficulty_range` and a family sampled from all five.
    /// The range must satisfy `1 <= lo <= hi <= 3`.
    pub fn generate_batch(
        &mut self,
        count: usize,
        difficulty_range: (u8, u8),
    ) -> Result<Vec<FunctionRecord>, GenerateError> {
        let (lo, hi) = difficulty_range;
        if lo < 1 || lo > hi || hi > 3 {
            return Err(GenerateError::InvalidDifficultyRange(lo, hi));
        }
        Ok((0..count)
            .map(|_| {
                let difficulty = self.rng.random_range(lo..=hi);
                let family = self.pick_family();
                self.generate(Some(family), difficulty)
            })
            .collect())
    }

    fn pick_family(&mut self) -> Family {
        Family::ALL[self.rng.random_range(0..Family::ALL.len())]
    }

    fn synthesize(&mut self, family: Family, difficulty: u8) -> FunctionRecord {
        let (name, body, expr) = match family {
            Family::Polynomial => self.synth_polynomial(difficulty),
            Family::Trigonometric => self.synth_trigonometric(difficulty),
            Family::Exponential => self.synth_exponential(difficulty),
            Family::Logarithmic => self.synth_logarithmic(difficulty),
            Family::Composite => self.synth_composite(difficulty),
        };
        FunctionRecord {
            name,
            formula: format!("f(x) = {body}"),
            expr,
            domain: STANDARD_DOMAIN,
            checkpoint_count: STANDARD_CHECKPOINTS,
        }
    }

    fn synth_polynomial(&mut self, difficulty: u8) -> (String, String, Expr) {
        let degree = self.rng.random_range(1..=difficulty as usize + 1);

        let mut coeffs = Vec::with_capacity(degree + 1);
        for i in 0..=degree {
            let coeff = if i == 0 {
                // Large constant term keeps the curve in the visible band
                self.rng.random_range(250.0..350.0)
            } else {
                // Higher-order terms shrink by an order of magnitude per degree
                let magnitude = 10f64.powi(-(i as i32 - 1).max(0));
                let c = self.rng.random_range(-1.0..1.0) * magnitude;
                if i == degree && c.abs() < 1e-5 {
                    // Preserve the nominal degree
                    if c >= 0.0 { 1e-5 } else { -1e-5 }
                } else {
                    c
                }
            };
            coeffs.push(coeff);
        }

        let body = polynomial_body(&coeffs);
        let name = format!("Degree {degree} Polynomial");
        (name, body, Expr::Polynomial { coeffs })
    }

    fn synth_trigonometric(&mut self, difficulty: u8) -> (String, String, Expr) {
        let amplitude = self.rng.random_range(30.0..70.0);
        let frequency = self.rng.random_range(0.005..0.02);
        let phase = self.rng.random_range(0.0..std::f64::consts::TAU);
        let shift = self.rng.random_range(250.0..350.0);

        let has_linear = difficulty >= 2 && self.rng.random_bool(0.5);
        let has_quadratic = difficulty >= 3 && self.rng.random_bool(0.3);
        let linear = if has_linear {
            self.rng.random_range(0.001..0.005)
        } else {
            0.0
        };
        let quadratic = if has_quadratic {
            self.rng.random_range(0.0001..0.001)
        } else {
            0.0
        };

        let wave = if self.rng.random_bool(0.5) {
            Waveform::Sin
        } else {
            Waveform::Cos
        };

        let mut body = format!(
            "{amplitude:.0}·{}({}x + {phase:.2})",
            wave.label(),
            trim_num(frequency, 4),
        );
        if linear != 0.0 {
            body.push_str(&format!(" + {}x", trim_num(linear, 4)));
        }
        if quadratic != 0.0 {
            body.push_str(&format!(" + {}x²", trim_num(quadratic, 6)));
        }
        body.push_str(&format!(" + {shift:.0}"));

        let name = match wave {
            Waveform::Sin => "Sine Curve".to_string(),
            Waveform::Cos => "Cosine Curve".to_string(),
        };
        (
            name,
            body,
            Expr::Trigonometric {
                wave,
                amplitude,
                frequency,
                phase,
                linear,
                quadratic,
                shift,
            },
        )
    }

    fn synth_exponential(&mut self, difficulty: u8) -> (String, String, Expr) {
        let amplitude = self.rng.random_range(100.0..400.0);
        let mut rate = self.rng.random_range(0.001..0.005);
        if self.rng.random_bool(0.5) {
            // Decay instead of growth
            rate = -rate;
        }
        let shift = self.rng.random_range(100.0..200.0);
        let h_shift = if difficulty >= 2 {
            self.rng.random_range(300.0..700.0)
        } else {
            0.0
        };

        let arg = if h_shift != 0.0 {
            format!("{}(x - {h_shift:.0})", trim_num(rate, 4))
        } else {
            format!("{}x", trim_num(rate, 4))
        };
        let body = format!("{amplitude:.0}·e^({arg}) + {shift:.0}");
        (
            "Exponential".to_string(),
            body,
            Expr::Exponential {
                amplitude,
                rate,
                h_shift,
                shift,
            },
        )
    }

    fn synth_logarithmic(&mut self, difficulty: u8) -> (String, String, Expr) {
        let amplitude = self.rng.random_range(50.0..100.0);
        let shift = self.rng.random_range(250.0..350.0);
        let h_shift = self.rng.random_range(50.0..150.0);
        let linear = if difficulty >= 2 {
            self.rng.random_range(0.05..0.2)
        } else {
            0.0
        };

        let mut body = format!("{amplitude:.0}·ln(x - {h_shift:.0} + 1)");
        if linear != 0.0 {
            body.push_str(&format!(" + {}x", trim_num(linear, 2)));
        }
        body.push_str(&format!(" + {shift:.0}"));
        (
            "Logarithmic".to_string(),
            body,
            Expr::Logarithmic {
                amplitude,
                h_shift,
                linear,
                shift,
            },
        )
    }

    fn synth_composite(&mut self, difficulty: u8) -> (String, String, Expr) {
        // Two distinct non-composite constituents at one lower difficulty
        let first_idx = self.rng.random_range(0..Family::NON_COMPOSITE.len());
        let mut remaining: Vec<Family> = Family::NON_COMPOSITE.to_vec();
        let first = remaining.remove(first_idx);
        let second = remaining[self.rng.random_range(0..remaining.len())];

        let reduced = difficulty.saturating_sub(1).max(1);
        let (_, body_a, a) = self.synth_by_family(first, reduced);
        let (_, body_b, b) = self.synth_by_family(second, reduced);

        // Differentiation is linear, so the blend's derivatives are the
        // weighted sums of the constituents'.
        let w_a = self.rng.random_range(0.3..0.7);
        let w_b = 1.0 - w_a;

        let body = format!("{w_a:.2}·({body_a}) + {w_b:.2}·({body_b})");
        (
            "Composite".to_string(),
            body,
            Expr::Blend {
                w_a,
                a: Box::new(a),
                w_b,
                b: Box::new(b),
            },
        )
    }

    fn synth_by_family(&mut self, family: Family, difficulty: u8) -> (String, String, Expr) {
        match family {
            Family::Polynomial => self.synth_polynomial(difficulty),
            Family::Trigonometric => self.synth_trigonometric(difficulty),
            Family::Exponential => self.synth_exponential(difficulty),
            Family::Logarithmic => self.synth_logarithmic(difficulty),
            Family::Composite => self.synth_polynomial(1),
        }
    }
}

/// Sample the full domain and reject any non-finite value in f, f' or f''.
fn record_is_finite(record: &FunctionRecord) -> bool {
    let (min, max) = record.domain;
    let step = (max - min) / VALIDATION_SAMPLES as f64;
    (0..=VALIDATION_SAMPLES).all(|i| {
        let x = min + i as f64 * step;
        record.evaluate(x).is_finite()
            && record.first_derivative(x).is_finite()
            && record.second_derivative(x).is_finite()
    })
}

/// Render a polynomial body like "312 + 0.82x - 0.0451x²"
fn polynomial_body(coeffs: &[f64]) -> String {
    let mut terms = Vec::new();
    for (i, &c) in coeffs.iter().enumerate() {
        if i > 0 && c.abs() < 1e-5 {
            continue;
        }
        match i {
            0 => terms.push(format!("{c:.0}")),
            1 => terms.push(format!(
                "{} {}x",
                if c > 0.0 { "+" } else { "-" },
                trim_num(c.abs(), 4)
            )),
            _ => terms.push(format!(
                "{} {}x^{i}",
                if c > 0.0 { "+" } else { "-" },
                trim_num(c.abs(), 6)
            )),
        }
    }
    terms.join(" ")
}

/// Fixed-point formatting with trailing zeros trimmed
fn trim_num(value: f64, decimals: usize) -> String {
    let s = format!("{value:.decimals$}");
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
