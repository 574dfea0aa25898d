//! Formula records: category, coefficients, correction term.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Closed set of record categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    OctetBaryon,
    DecupletBaryon,
    Meson,
    MagneticMoment,
    Lepton,
}

/// Physical quantity a formula evaluates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Mass in electron-mass units.
    Mass,
    /// Magnetic moment in nuclear magnetons.
    MagneticMoment,
}

impl Category {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OctetBaryon => "octet-baryon",
            Self::DecupletBaryon => "decuplet-baryon",
            Self::Meson => "meson",
            Self::MagneticMoment => "magnetic-moment",
            Self::Lepton => "lepton",
        }
    }

    /// Categories bound by the `c5 = 6 + |S|` rule.
    pub const fn is_baryon(self) -> bool {
        matches!(self, Self::OctetBaryon | Self::DecupletBaryon)
    }

    pub const fn quantity(self) -> Quantity {
        match self {
            Self::MagneticMoment => Quantity::MagneticMoment,
            _ => Quantity::Mass,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Coefficient
// ============================================================================

/// A polynomial or correction coefficient.
///
/// Integers and `p/q` fractions are kept exact so they can be typeset as
/// written; decimals are kept as the parsed `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coefficient {
    /// Reduced fraction with positive denominator. `num` is never `i64::MIN`,
    /// so its magnitude always fits.
    Rational { num: i64, den: u32 },
    Real(f64),
}

/// Why a coefficient literal was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoefficientError {
    NotNumeric,
    ZeroDenominator,
}

impl Coefficient {
    pub const ZERO: Self = Self::Rational { num: 0, den: 1 };

    pub const fn integer(value: i64) -> Self {
        Self::Rational { num: value, den: 1 }
    }

    /// Integer literal as read from a data file. `i64::MIN` has no positive
    /// counterpart and is rejected.
    pub fn checked_integer(value: i64) -> Result<Self, CoefficientError> {
        value
            .checked_abs()
            .map(|_| Self::integer(value))
            .ok_or(CoefficientError::NotNumeric)
    }

    /// Build a reduced fraction. `den` may be negative; the sign moves to `num`.
    pub fn fraction(num: i64, den: i64) -> Result<Self, CoefficientError> {
        if den == 0 {
            return Err(CoefficientError::ZeroDenominator);
        }
        let negative = (num < 0) != (den < 0);
        let divisor = gcd(num.unsigned_abs(), den.unsigned_abs()).max(1);
        // Magnitudes are built unsigned so `i64::MIN` cannot overflow a negation.
        let magnitude = i64::try_from(num.unsigned_abs() / divisor)
            .map_err(|_| CoefficientError::NotNumeric)?;
        let den = u32::try_from(den.unsigned_abs() / divisor)
            .map_err(|_| CoefficientError::NotNumeric)?;
        let num = if negative { -magnitude } else { magnitude };
        Ok(Self::Rational { num, den })
    }

    /// Parse a textual literal: `"3"`, `"-2/5"`, `"0.25"`.
    pub fn parse(text: &str) -> Result<Self, CoefficientError> {
        let text = text.trim();
        if let Some((num, den)) = text.split_once('/') {
            let num: i64 = num.trim().parse().map_err(|_| CoefficientError::NotNumeric)?;
            let den: i64 = den.trim().parse().map_err(|_| CoefficientError::NotNumeric)?;
            return Self::fraction(num, den);
        }
        if let Ok(value) = text.parse::<i64>() {
            return Self::checked_integer(value);
        }
        // Words like "inf" or "nan" parse as floats but are not literals anyone
        // means to write in a coefficient string.
        if !text.chars().any(|c| c.is_ascii_digit()) {
            return Err(CoefficientError::NotNumeric);
        }
        text.parse::<f64>()
            .map(Self::Real)
            .map_err(|_| CoefficientError::NotNumeric)
    }

    pub fn value(self) -> f64 {
        match self {
            Self::Rational { num, den } => num as f64 / f64::from(den),
            Self::Real(value) => value,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Self::Rational { num, .. } => num == 0,
            Self::Real(value) => value == 0.0,
        }
    }

    pub fn is_negative(self) -> bool {
        match self {
            Self::Rational { num, .. } => num < 0,
            Self::Real(value) => value.is_sign_negative() && value != 0.0,
        }
    }

    pub fn is_finite(self) -> bool {
        match self {
            Self::Rational { .. } => true,
            Self::Real(value) => value.is_finite(),
        }
    }

    /// Exact integer value, if the coefficient has one.
    pub fn as_integer(self) -> Option<i64> {
        match self {
            Self::Rational { num, den: 1 } => Some(num),
            Self::Rational { .. } => None,
            Self::Real(value) if value.is_finite() && value.fract() == 0.0 => Some(value as i64),
            Self::Real(_) => None,
        }
    }

    pub fn abs(self) -> Self {
        match self {
            Self::Rational { num, den } => Self::Rational {
                num: num.saturating_abs(),
                den,
            },
            Self::Real(value) => Self::Real(value.abs()),
        }
    }
}

impl fmt::Display for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rational { num, den: 1 } => write!(f, "{num}"),
            Self::Rational { num, den } => write!(f, "{num}/{den}"),
            Self::Real(value) => write!(f, "{value}"),
        }
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

// ============================================================================
// Correction
// ============================================================================

/// Additive correction applied on top of the polynomial base.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Correction {
    #[default]
    None,
    /// `coefficient × e^(sign·π)`, sign is ±1.
    Exponential { coefficient: Coefficient, sign: i8 },
    /// `coefficient / π^power`.
    Rational { coefficient: Coefficient, power: i32 },
    /// `coefficient / [order]_π` with `[n]_π = 1 + π + … + π^(n-1)`.
    QRational { coefficient: Coefficient, order: i32 },
    Constant { value: Coefficient },
}

// ============================================================================
// FormulaRecord
// ============================================================================

/// Human-facing labels carried through to templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordLabel {
    pub name: String,
    pub symbol: String,
    pub symbol_latex: String,
}

/// One physical quantity's polynomial-plus-correction formula.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaRecord {
    pub id: String,
    pub category: Category,
    /// Indexed by power of π: `coefficients[5]` is `c5`.
    pub coefficients: [Coefficient; 6],
    pub correction: Correction,
    /// Experimental value (MeV for masses, μ_N for magnetic moments).
    pub reference: Option<f64>,
    pub strangeness: i32,
    pub charge: i32,
    pub spin: Option<String>,
    pub quarks: Option<String>,
    /// Grouping label shared by related records, e.g. `"6-chain"`.
    pub family: Option<String>,
    pub label: RecordLabel,
    /// File the record was declared in.
    pub source: PathBuf,
}

impl FormulaRecord {
    /// Minimal record for the given category, every term zero.
    pub fn new(id: impl Into<String>, category: Category) -> Self {
        let id = id.into();
        Self {
            label: RecordLabel {
                name: id.clone(),
                symbol: id.clone(),
                symbol_latex: id.clone(),
            },
            id,
            category,
            coefficients: [Coefficient::ZERO; 6],
            correction: Correction::None,
            reference: None,
            strangeness: 0,
            charge: 0,
            spin: None,
            quarks: None,
            family: None,
            source: PathBuf::new(),
        }
    }

    /// Coefficient of `π^power`; zero outside 0..=5.
    pub fn coefficient(&self, power: usize) -> Coefficient {
        self.coefficients
            .get(power)
            .copied()
            .unwrap_or(Coefficient::ZERO)
    }

    /// Builder-style setter used by tests and fixtures.
    pub fn with_term(mut self, power: usize, coefficient: Coefficient) -> Self {
        if let Some(slot) = self.coefficients.get_mut(power) {
            *slot = coefficient;
        }
        self
    }

    pub fn with_correction(mut self, correction: Correction) -> Self {
        self.correction = correction;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_and_fraction() {
        assert_eq!(Coefficient::parse("6"), Ok(Coefficient::integer(6)));
        assert_eq!(
            Coefficient::parse("-2/5"),
            Ok(Coefficient::Rational { num: -2, den: 5 })
        );
        // Reduced, sign normalised onto the numerator
        assert_eq!(
            Coefficient::parse("4/-10"),
            Ok(Coefficient::Rational { num: -2, den: 5 })
        );
        assert_eq!(Coefficient::parse("0.8"), Ok(Coefficient::Real(0.8)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            Coefficient::parse("six"),
            Err(CoefficientError::NotNumeric)
        );
        assert_eq!(Coefficient::parse("inf"), Err(CoefficientError::NotNumeric));
        assert_eq!(
            Coefficient::parse("1/0"),
            Err(CoefficientError::ZeroDenominator)
        );
    }

    #[test]
    fn test_extreme_integers_rejected() {
        assert_eq!(
            Coefficient::parse("-9223372036854775808"),
            Err(CoefficientError::NotNumeric)
        );
        assert_eq!(
            Coefficient::parse("-9223372036854775808/-1"),
            Err(CoefficientError::NotNumeric)
        );
        assert_eq!(
            Coefficient::checked_integer(i64::MIN),
            Err(CoefficientError::NotNumeric)
        );
        // Reduces below the limit, so it is fine
        assert_eq!(
            Coefficient::parse("-9223372036854775808/-2"),
            Ok(Coefficient::integer(4611686018427387904))
        );
        assert_eq!(
            Coefficient::parse("9223372036854775807/-1"),
            Ok(Coefficient::integer(-9223372036854775807))
        );
        assert_eq!(
            Coefficient::integer(-9223372036854775807).abs(),
            Coefficient::integer(9223372036854775807)
        );
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(Coefficient::integer(7).as_integer(), Some(7));
        assert_eq!(Coefficient::Real(6.0).as_integer(), Some(6));
        assert_eq!(Coefficient::Real(6.5).as_integer(), None);
        assert_eq!(
            Coefficient::Rational { num: 3, den: 2 }.as_integer(),
            None
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Coefficient::integer(-3).to_string(), "-3");
        assert_eq!(Coefficient::Rational { num: 4, den: 5 }.to_string(), "4/5");
        assert_eq!(Coefficient::Real(0.8).to_string(), "0.8");
    }

    #[test]
    fn test_category_rules() {
        assert!(Category::OctetBaryon.is_baryon());
        assert!(Category::DecupletBaryon.is_baryon());
        assert!(!Category::MagneticMoment.is_baryon());
        assert_eq!(Category::MagneticMoment.quantity(), Quantity::MagneticMoment);
        assert_eq!(Category::Lepton.quantity(), Quantity::Mass);
    }
}
