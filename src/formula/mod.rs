//! Numeric evaluation of π-polynomial formulas.
//!
//! A record evaluates to `Σ cᵢ·πⁱ (i = 5..0) + correction`, summed in that
//! fixed order in `f64`. Evaluation is pure and deterministic: the same
//! record always produces the same bits and the same strings.

pub mod constants;
pub mod format;


use serde::Serialize;
use thiserror::Error;

use crate::data::{Category, Correction, FormulaRecord, Quantity};
use constants::{ELECTRON_MASS_MEV, PI, pi_pow, pi_powers, q_integer};

/// Default number of significant digits in display strings.
pub const DEFAULT_PRECISION: usize = 10;

// ============================================================================
// Errors
// ============================================================================

/// A record whose formula cannot be evaluated to a finite number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed formula for `{record}`: {reason}")]
pub struct MalformedFormulaError {
    pub record: String,
    pub reason: MalformedReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("coefficient `{term}` is not finite")]
    NonFiniteCoefficient { term: String },

    #[error("rational correction power must be positive, got {power}")]
    NonPositivePower { power: i32 },

    #[error("q-rational correction order must be at least 1, got {order}")]
    InvalidOrder { order: i32 },

    #[error("result is not finite")]
    NonFiniteResult,
}

// ============================================================================
// EvaluatedValue
// ============================================================================

/// Everything a template can show about one evaluated record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedValue {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub symbol_latex: String,
    pub category: Category,

    /// Raw evaluation result (mₑ for masses, μ_N for magnetic moments).
    pub numeric: f64,
    /// `formula ≈ value unit`, plain text.
    pub display: String,
    /// `formula \approx value\,unit`, LaTeX.
    pub latex: String,
    pub formula: String,
    pub formula_latex: String,
    /// `numeric` at the configured precision.
    pub value: String,
    pub unit: &'static str,

    /// MeV for masses, μ_N for magnetic moments.
    pub physical: f64,
    pub physical_unit: &'static str,
    pub reference: Option<f64>,
    pub deviation: Option<f64>,
    pub deviation_ppm: Option<f64>,

    pub strangeness: i32,
    pub charge: i32,
    pub spin: Option<String>,
    pub quarks: Option<String>,
    pub family: Option<String>,
}

// ============================================================================
// Evaluator
// ============================================================================

/// Stateless formula evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluator {
    precision: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

impl Evaluator {
    /// `precision` is the number of significant digits, clamped to `1..=17`.
    pub fn new(precision: usize) -> Self {
        Self {
            precision: precision.clamp(1, 17),
        }
    }

    pub fn evaluate(&self, record: &FormulaRecord) -> Result<EvaluatedValue, MalformedFormulaError> {
        let numeric = compute(record)?;
        let quantity = record.category.quantity();

        let rendered = format::render_formula(record);
        let value = format::significant(numeric, self.precision);
        let (unit, unit_latex) = unit(quantity);

        let physical = match quantity {
            Quantity::Mass => numeric * ELECTRON_MASS_MEV,
            Quantity::MagneticMoment => numeric,
        };
        let deviation = record.reference.map(|reference| physical - reference);
        let deviation_ppm = record
            .reference
            .zip(deviation)
            .filter(|(reference, _)| *reference != 0.0)
            .map(|(reference, deviation)| deviation / reference * 1e6);

        Ok(EvaluatedValue {
            id: record.id.clone(),
            name: record.label.name.clone(),
            symbol: record.label.symbol.clone(),
            symbol_latex: record.label.symbol_latex.clone(),
            category: record.category,
            numeric,
            display: format!("{} ≈ {value} {unit}", rendered.text),
            latex: format!(r"{} \approx {value}\,{unit_latex}", rendered.latex),
            formula: rendered.text,
            formula_latex: rendered.latex,
            value,
            unit,
            physical,
            physical_unit: physical_unit(quantity),
            reference: record.reference,
            deviation,
            deviation_ppm,
            strangeness: record.strangeness,
            charge: record.charge,
            spin: record.spin.clone(),
            quarks: record.quarks.clone(),
            family: record.family.clone(),
        })
    }
}

fn unit(quantity: Quantity) -> (&'static str, &'static str) {
    match quantity {
        Quantity::Mass => ("mₑ", "m_e"),
        Quantity::MagneticMoment => ("μ_N", r"\mu_N"),
    }
}

fn physical_unit(quantity: Quantity) -> &'static str {
    match quantity {
        Quantity::Mass => "MeV",
        Quantity::MagneticMoment => "μ_N",
    }
}

/// Evaluate the record's formula to a finite `f64`.
pub fn compute(record: &FormulaRecord) -> Result<f64, MalformedFormulaError> {
    let malformed = |reason| MalformedFormulaError {
        record: record.id.clone(),
        reason,
    };

    let powers = pi_powers();
    let mut base = 0.0;
    for power in (0..powers.len()).rev() {
        let coefficient = record.coefficient(power);
        if !coefficient.is_finite() {
            return Err(malformed(MalformedReason::NonFiniteCoefficient {
                term: format!("c{power}"),
            }));
        }
        base += coefficient.value() * powers[power];
    }

    let correction = match record.correction {
        Correction::None => 0.0,
        Correction::Constant { value } => {
            if !value.is_finite() {
                return Err(malformed(MalformedReason::NonFiniteCoefficient {
                    term: "correction.value".to_string(),
                }));
            }
            value.value()
        }
        Correction::Exponential { coefficient, sign } => {
            finite_correction(coefficient.is_finite()).map_err(malformed)?;
            coefficient.value() * (f64::from(sign) * PI).exp()
        }
        Correction::Rational { coefficient, power } => {
            finite_correction(coefficient.is_finite()).map_err(malformed)?;
            if power <= 0 {
                return Err(malformed(MalformedReason::NonPositivePower { power }));
            }
            coefficient.value() / pi_pow(power.unsigned_abs())
        }
        Correction::QRational { coefficient, order } => {
            finite_correction(coefficient.is_finite()).map_err(malformed)?;
            if order < 1 {
                return Err(malformed(MalformedReason::InvalidOrder { order }));
            }
            coefficient.value() / q_integer(order.unsigned_abs())
        }
    };

    let result = base + correction;
    if !result.is_finite() {
        return Err(malformed(MalformedReason::NonFiniteResult));
    }
    Ok(result)
}

fn finite_correction(finite: bool) -> Result<(), MalformedReason> {
    if finite {
        Ok(())
    } else {
        Err(MalformedReason::NonFiniteCoefficient {
            term: "correction.coefficient".to_string(),
        })
    }
}
