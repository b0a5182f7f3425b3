//! Closed-form expressions with analytic first and second derivatives
//!
//! Each variant stores the coefficients of one function family. `eval`, `d1` and
//! `d2` are hand-matched analytic triples: `d1` is the exact derivative of `eval`
//! and `d2` of `d1`, never a numeric approximation.

use serde::{Deserialize, Serialize};

/// Base waveform for the trigonometric family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Sin,
    Cos,
}

impl Waveform {
    /// w(t)
    fn apply(self, t: f64) -> f64 {
        match self {
            Waveform::Sin => t.sin(),
            Waveform::Cos => t.cos(),
        }
    }

    /// w'(t): d/dt sin = cos, d/dt cos = -sin
    fn apply_d1(self, t: f64) -> f64 {
        match self {
            Waveform::Sin => t.cos(),
            Waveform::Cos => -t.sin(),
        }
    }

    /// w''(t): both waveforms negate under two derivatives
    fn apply_d2(self, t: f64) -> f64 {
        -self.apply(t)
    }

    pub fn label(self) -> &'static str {
        match self {
            Waveform::Sin => "sin",
            Waveform::Cos => "cos",
        }
    }
}

/// A generated expression, tagged by family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// sum of coeffs[i] * x^i
    Polynomial { coeffs: Vec<f64> },
    /// amplitude * wave(frequency * x + phase) + linear * x + quadratic * x^2 + shift
    Trigonometric {
        wave: Waveform,
        amplitude: f64,
        frequency: f64,
        phase: f64,
        linear: f64,
        quadratic: f64,
        shift: f64,
    },
    /// amplitude * e^(rate * (x - h_shift)) + shift
    Exponential {
        amplitude: f64,
        rate: f64,
        h_shift: f64,
        shift: f64,
    },
    /// amplitude * ln(x - h_shift + 1) + linear * x + shift, clamped for x <= h_shift
    Logarithmic {
        amplitude: f64,
        h_shift: f64,
        linear: f64,
        shift: f64,
    },
    /// limit / (1 + e^(-rate * (x - midpoint))), catalog-only
    Logistic {
        limit: f64,
        rate: f64,
        midpoint: f64,
    },
    /// w_a * a + w_b * b (linear blend, so derivatives blend the same way)
    Blend {
        w_a: f64,
        a: Box<Expr>,
        w_b: f64,
        b: Box<Expr>,
    },
}

impl Expr {
    /// f(x)
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Expr::Polynomial { coeffs } => horner(coeffs, x),
            Expr::Trigonometric {
                wave,
                amplitude,
                frequency,
                phase,
                linear,
                quadratic,
                shift,
            } => {
                amplitude * wave.apply(frequency * x + phase)
                    + linear * x
                    + quadratic * x * x
                    + shift
            }
            Expr::Exponential {
                amplitude,
                rate,
                h_shift,
                shift,
            } => amplitude * (rate * (x - h_shift)).exp() + shift,
            Expr::Logarithmic {
                amplitude,
                h_shift,
                linear,
                shift,
            } => {
                // Domain clamp: the track may start before the log is defined,
                // so the curve flattens to the shift instead of diverging.
                if x <= *h_shift {
                    *shift
                } else {
                    amplitude * (x - h_shift + 1.0).ln() + linear * x + shift
                }
            }
            Expr::Logistic {
                limit,
                rate,
                midpoint,
            } => limit / (1.0 + (-rate * (x - midpoint)).exp()),
            Expr::Blend { w_a, a, w_b, b } => w_a * a.eval(x) + w_b * b.eval(x),
        }
    }

    /// f'(x)
    pub fn d1(&self, x: f64) -> f64 {
        match self {
            Expr::Polynomial { coeffs } => {
                let mut sum = 0.0;
                for (i, c) in coeffs.iter().enumerate().skip(1) {
                    sum += i as f64 * c * x.powi(i as i32 - 1);
                }
                sum
            }
            Expr::Trigonometric {
                wave,
                amplitude,
                frequency,
                phase,
                linear,
                quadratic,
                ..
            } => {
                amplitude * frequency * wave.apply_d1(frequency * x + phase)
                    + linear
                    + 2.0 * quadratic * x
            }
            Expr::Exponential {
                amplitude,
                rate,
                h_shift,
                ..
            } => amplitude * rate * (rate * (x - h_shift)).exp(),
            Expr::Logarithmic {
                amplitude,
                h_shift,
                linear,
                ..
            } => {
                if x <= *h_shift {
                    0.0
                } else {
                    amplitude / (x - h_shift + 1.0) + linear
                }
            }
            Expr::Logistic {
                limit,
                rate,
                midpoint,
            } => {
                let e = (-rate * (x - midpoint)).exp();
                limit * rate * e / ((1.0 + e) * (1.0 + e))
            }
            Expr::Blend { w_a, a, w_b, b } => w_a * a.d1(x) + w_b * b.d1(x),
        }
    }

    /// f''(x)
    pub fn d2(&self, x: f64) -> f64 {
        match self {
            Expr::Polynomial { coeffs } => {
                let mut sum = 0.0;
                for (i, c) in coeffs.iter().enumerate().skip(2) {
                    sum += (i * (i - 1)) as f64 * c * x.powi(i as i32 - 2);
                }
                sum
            }
            Expr::Trigonometric {
                wave,
                amplitude,
                frequency,
                phase,
                quadratic,
                ..
            } => {
                amplitude * frequency * frequency * wave.apply_d2(frequency * x + phase)
                    + 2.0 * quadratic
            }
            Expr::Exponential {
                amplitude,
                rate,
                h_shift,
                ..
            } => amplitude * rate * rate * (rate * (x - h_shift)).exp(),
            Expr::Logarithmic {
                amplitude, h_shift, ..
            } => {
                if x <= *h_shift {
                    0.0
                } else {
                    let u = x - h_shift + 1.0;
                    -amplitude / (u * u)
                }
            }
            Expr::Logistic {
                limit,
                rate,
                midpoint,
            } => {
                let e = (-rate * (x - midpoint)).exp();
                let denom = (1.0 + e) * (1.0 + e) * (1.0 + e);
                limit * rate * rate * e * (e - 1.0) / denom
            }
            Expr::Blend { w_a, a, w_b, b } => w_a * a.d2(x) + w_b * b.d2(x),
        }
    }
}

fn horner(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn central_d1(expr: &Expr, x: f64, h: f64) -> f64 {
        (expr.eval(x + h) - expr.eval(x - h)) / (2.0 * h)
    }

    #[test]
    fn test_polynomial_derivatives() {
        // f(x) = 300 + 5x - 0.015x^2 + 0.00001x^3
        let expr = Expr::Polynomial {
            coeffs: vec![300.0, 5.0, -0.015, 0.00001],
        };
        assert!((expr.eval(0.0) - 300.0).abs() < 1e-12);
        // f'(200) = 0.00003*40000 - 0.03*200 + 5 = 0.2
        assert!((expr.d1(200.0) - 0.2).abs() < 1e-12);
        // f''(200) = 0.00006*200 - 0.03 = -0.018
        assert!((expr.d2(200.0) - (-0.018)).abs() < 1e-12);
    }

    #[test]
    fn test_trig_chain_rule_pairing() {
        let sin = Expr::Trigonometric {
            wave: Waveform::Sin,
            amplitude: 50.0,
            frequency: 0.01,
            phase: 0.0,
            linear: 0.0,
            quadratic: 0.001,
            shift: 300.0,
        };
        // d/dx 50 sin(0.01x) = 0.5 cos(0.01x)
        assert!((sin.d1(100.0) - (0.5 * 1.0_f64.cos() + 0.2)).abs() < 1e-12);
        // f'' = -0.005 sin(0.01x) + 0.002
        assert!((sin.d2(100.0) - (-0.005 * 1.0_f64.sin() + 0.002)).abs() < 1e-12);

        let cos = Expr::Trigonometric {
            wave: Waveform::Cos,
            amplitude: 40.0,
            frequency: 0.02,
            phase: 1.0,
            linear: 0.003,
            quadratic: 0.0,
            shift: 280.0,
        };
        assert!((cos.d1(500.0) - central_d1(&cos, 500.0, 1e-4)).abs() < 1e-5);
    }

    #[test]
    fn test_logistic_matches_central_difference() {
        let expr = Expr::Logistic {
            limit: 400.0,
            rate: 0.01,
            midpoint: 500.0,
        };
        for x in [100.0, 400.0, 500.0, 600.0, 900.0] {
            let approx = central_d1(&expr, x, 1e-4);
            assert!(
                (expr.d1(x) - approx).abs() < 1e-6,
                "logistic d1 mismatch at x={x}"
            );
        }
        // Inflection point: f'' changes sign at the midpoint
        assert!(expr.d2(400.0) > 0.0);
        assert!(expr.d2(600.0) < 0.0);
        assert!(expr.d2(500.0).abs() < 1e-9);
    }

    #[test]
    fn test_logarithmic_clamp_below_shift() {
        let expr = Expr::Logarithmic {
            amplitude: 80.0,
            h_shift: 100.0,
            linear: 0.1,
            shift: 300.0,
        };
        // At and below the shift point the triple is the constant fallback
        for x in [0.0, 50.0, 100.0] {
            assert_eq!(expr.eval(x), 300.0);
            assert_eq!(expr.d1(x), 0.0);
            assert_eq!(expr.d2(x), 0.0);
        }
        // Above it, the usual log
        let x = 350.0;
        let expected = 80.0 * 251.0_f64.ln() + 0.1 * 350.0 + 300.0;
        assert!((expr.eval(x) - expected).abs() < 1e-9);
        assert!((expr.d1(x) - (80.0 / 251.0 + 0.1)).abs() < 1e-12);
    }

    #[test]
    fn test_blend_is_weighted_sum() {
        let a = Expr::Polynomial {
            coeffs: vec![10.0, 2.0],
        };
        let b = Expr::Polynomial {
            coeffs: vec![0.0, 0.0, 1.0],
        };
        let blend = Expr::Blend {
            w_a: 0.4,
            a: Box::new(a.clone()),
            w_b: 0.6,
            b: Box::new(b.clone()),
        };
        let x = 7.0;
        assert!((blend.eval(x) - (0.4 * a.eval(x) + 0.6 * b.eval(x))).abs() < 1e-12);
        assert!((blend.d1(x) - (0.4 * a.d1(x) + 0.6 * b.d1(x))).abs() < 1e-12);
        assert!((blend.d2(x) - (0.4 * a.d2(x) + 0.6 * b.d2(x))).abs() < 1e-12);
    }
}
