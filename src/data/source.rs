//! On-disk TOML schema and conversion into validated types.
//!
//! ```toml
//! [[record]]
//! id = "p"
//! category = "octet-baryon"
//! name = "Proton"
//! reference = 938.27208816
//! coefficients = { c5 = 6 }
//! correction = { kind = "exponential", coefficient = "4/5", sign = -1 }
//!
//! [[page]]
//! template = "baryons.html"
//! output = "baryons.html"
//! records = ["p", "n"]
//! categories = ["decuplet-baryon"]
//! families = ["sigma"]
//! strangeness = [0, -1]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::error::ValidationError;
use super::record::{Category, Coefficient, CoefficientError, Correction, FormulaRecord, RecordLabel};

/// Top-level layout of one data file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(super) struct SourceFile {
    pub(super) record: Vec<RawRecord>,
    pub(super) page: Vec<RawPage>,
}

impl SourceFile {
    pub(super) fn parse(path: &Path, content: &str) -> Result<Self, ValidationError> {
        toml::from_str(content).map_err(|source| ValidationError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A coefficient as written: integer, float, string literal, or anything else.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum RawCoefficient {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(toml::Value),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(super) enum RawCorrection {
    Exponential {
        coefficient: RawCoefficient,
        sign: i64,
    },
    Rational {
        coefficient: RawCoefficient,
        power: i64,
    },
    QRational {
        coefficient: RawCoefficient,
        order: i64,
    },
    Constant {
        value: RawCoefficient,
    },
    None,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawRecord {
    pub(super) id: String,
    pub(super) category: Category,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    symbol_latex: Option<String>,
    #[serde(default)]
    coefficients: Option<BTreeMap<String, RawCoefficient>>,
    #[serde(default)]
    correction: Option<RawCorrection>,
    #[serde(default)]
    reference: Option<f64>,
    #[serde(default)]
    strangeness: i32,
    #[serde(default)]
    charge: i32,
    #[serde(default)]
    spin: Option<String>,
    #[serde(default)]
    quarks: Option<String>,
    #[serde(default)]
    family: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawPage {
    pub(super) template: String,
    pub(super) output: PathBuf,
    #[serde(default)]
    pub(super) title: Option<String>,
    #[serde(default)]
    pub(super) records: Vec<String>,
    #[serde(default)]
    pub(super) categories: Vec<Category>,
    #[serde(default)]
    pub(super) families: Vec<String>,
    #[serde(default)]
    pub(super) strangeness: Vec<i32>,
}

// ============================================================================
// Conversion
// ============================================================================

const TERMS: [&str; 6] = ["c0", "c1", "c2", "c3", "c4", "c5"];

impl RawRecord {
    /// Validate and convert. Identifier and uniqueness checks happen in the
    /// registry, which sees all files.
    pub(super) fn into_record(self, source: &Path) -> Result<FormulaRecord, ValidationError> {
        let id = self.id;

        let raw_terms = match self.coefficients {
            Some(terms) if !terms.is_empty() => terms,
            _ => return Err(ValidationError::MissingCoefficients { id }),
        };

        let mut coefficients = [Coefficient::ZERO; 6];
        for (term, raw) in raw_terms {
            let Some(power) = TERMS.iter().position(|t| *t == term) else {
                return Err(ValidationError::UnknownTerm { id, term });
            };
            coefficients[power] = convert_coefficient(&id, &term, raw)?;
        }

        let correction = match self.correction {
            Some(raw) => convert_correction(&id, raw)?,
            None => Correction::None,
        };

        let record = FormulaRecord {
            label: RecordLabel {
                name: self.name.unwrap_or_else(|| id.clone()),
                symbol: self.symbol.unwrap_or_else(|| id.clone()),
                symbol_latex: self.symbol_latex.unwrap_or_else(|| id.clone()),
            },
            id,
            category: self.category,
            coefficients,
            correction,
            reference: self.reference,
            strangeness: self.strangeness,
            charge: self.charge,
            spin: self.spin,
            quarks: self.quarks,
            family: self.family,
            source: source.to_path_buf(),
        };

        check_strangeness_rule(&record)?;
        Ok(record)
    }
}

/// Baryons must satisfy `c5 = 6 + |S|` exactly.
pub(super) fn check_strangeness_rule(record: &FormulaRecord) -> Result<(), ValidationError> {
    if !record.category.is_baryon() {
        return Ok(());
    }

    let expected = 6 + i64::from(record.strangeness.unsigned_abs());
    let c5 = record.coefficient(5);
    if c5.as_integer() == Some(expected) {
        return Ok(());
    }

    Err(ValidationError::StrangenessRule {
        id: record.id.clone(),
        category: record.category,
        expected,
        found: c5.to_string(),
    })
}

fn convert_coefficient(
    id: &str,
    term: &str,
    raw: RawCoefficient,
) -> Result<Coefficient, ValidationError> {
    let parsed = match &raw {
        RawCoefficient::Integer(value) => Coefficient::checked_integer(*value),
        RawCoefficient::Float(value) => Ok(Coefficient::Real(*value)),
        RawCoefficient::Text(text) => Coefficient::parse(text),
        RawCoefficient::Other(_) => Err(CoefficientError::NotNumeric),
    };

    parsed.map_err(|err| match err {
        CoefficientError::ZeroDenominator => ValidationError::ZeroDenominator {
            id: id.to_string(),
            term: term.to_string(),
        },
        CoefficientError::NotNumeric => ValidationError::NonNumeric {
            id: id.to_string(),
            term: term.to_string(),
            value: describe(&raw),
        },
    })
}

fn describe(raw: &RawCoefficient) -> String {
    match raw {
        RawCoefficient::Integer(value) => value.to_string(),
        RawCoefficient::Float(value) => value.to_string(),
        RawCoefficient::Text(text) => format!("{text:?}"),
        RawCoefficient::Other(value) => value.to_string(),
    }
}

fn convert_correction(id: &str, raw: RawCorrection) -> Result<Correction, ValidationError> {
    let narrow = |field: &'static str, value: i64| {
        i32::try_from(value).map_err(|_| ValidationError::CorrectionRange {
            id: id.to_string(),
            field,
            value,
        })
    };

    Ok(match raw {
        RawCorrection::Exponential { coefficient, sign } => {
            let sign = match sign {
                1 => 1,
                -1 => -1,
                other => {
                    return Err(ValidationError::ExponentialSign {
                        id: id.to_string(),
                        sign: other,
                    });
                }
            };
            Correction::Exponential {
                coefficient: convert_coefficient(id, "correction.coefficient", coefficient)?,
                sign,
            }
        }
        // Non-positive powers and orders load fine; the evaluator rejects them.
        RawCorrection::Rational { coefficient, power } => Correction::Rational {
            coefficient: convert_coefficient(id, "correction.coefficient", coefficient)?,
            power: narrow("power", power)?,
        },
        RawCorrection::QRational { coefficient, order } => Correction::QRational {
            coefficient: convert_coefficient(id, "correction.coefficient", coefficient)?,
            order: narrow("order", order)?,
        },
        RawCorrection::Constant { value } => Correction::Constant {
            value: convert_coefficient(id, "correction.value", value)?,
        },
        RawCorrection::None => Correction::None,
    })
}
