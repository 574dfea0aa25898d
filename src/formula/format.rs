//! Deterministic number formatting and symbolic formula rendering.
//!
//! Numbers are shown with a fixed count of significant digits. Rounding is
//! done by the standard library's exact decimal formatter (`{:.*e}`), which
//! works on the exact binary value and breaks ties to even. Every displayed
//! value in the site goes through [`significant`].

use crate::data::{Coefficient, Correction, FormulaRecord};

/// Format `value` with exactly `digits` significant digits, positional notation.
///
/// `digits` is clamped to `1..=17`.
pub fn significant(value: f64, digits: usize) -> String {
    let digits = digits.clamp(1, 17);

    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return format!("{:.*}", digits - 1, 0.0);
    }

    let sci = format!("{:.*e}", digits - 1, value);
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return sci;
    };

    let negative = mantissa.starts_with('-');
    let mantissa_digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

    let mut out = String::with_capacity(mantissa_digits.len() + 8);
    if negative {
        out.push('-');
    }

    if exponent >= 0 {
        let int_len = exponent as usize + 1;
        if int_len >= mantissa_digits.len() {
            out.push_str(&mantissa_digits);
            out.extend(std::iter::repeat_n('0', int_len - mantissa_digits.len()));
        } else {
            out.push_str(&mantissa_digits[..int_len]);
            out.push('.');
            out.push_str(&mantissa_digits[int_len..]);
        }
    } else {
        out.push_str("0.");
        out.extend(std::iter::repeat_n('0', (-exponent - 1) as usize));
        out.push_str(&mantissa_digits);
    }

    out
}

// ============================================================================
// Symbolic rendering
// ============================================================================

/// One signed term of a formula, in both notations.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Term {
    negative: bool,
    text: String,
    latex: String,
}

/// Plain-text and LaTeX renderings of a record's formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub latex: String,
}

/// Render `c5·π⁵ + … + c0 + correction` as written in the record.
///
/// Zero terms are omitted; an all-zero formula renders as `0`.
pub fn render_formula(record: &FormulaRecord) -> Rendered {
    let mut terms: Vec<Term> = (0..=5)
        .rev()
        .map(|power| (power, record.coefficient(power)))
        .filter(|(_, c)| !c.is_zero())
        .map(|(power, c)| polynomial_term(c, power))
        .collect();

    if let Some(term) = correction_term(&record.correction) {
        terms.push(term);
    }

    join(&terms)
}

fn join(terms: &[Term]) -> Rendered {
    if terms.is_empty() {
        return Rendered {
            text: "0".to_string(),
            latex: "0".to_string(),
        };
    }

    let mut text = String::new();
    let mut latex = String::new();
    for (i, term) in terms.iter().enumerate() {
        match (i, term.negative) {
            (0, false) => {}
            (0, true) => {
                text.push('-');
                latex.push('-');
            }
            (_, false) => {
                text.push_str(" + ");
                latex.push_str(" + ");
            }
            (_, true) => {
                text.push_str(" - ");
                latex.push_str(" - ");
            }
        }
        text.push_str(&term.text);
        latex.push_str(&term.latex);
    }

    Rendered { text, latex }
}

fn polynomial_term(coefficient: Coefficient, power: usize) -> Term {
    let magnitude = coefficient.abs();
    let negative = coefficient.is_negative();

    if power == 0 {
        return Term {
            negative,
            text: coefficient_text(magnitude),
            latex: coefficient_latex(magnitude),
        };
    }

    let pi_text = pi_power_text(power as u32);
    let pi_latex = pi_power_latex(power as u32);

    let (text, latex) = match magnitude {
        _ if magnitude.as_integer() == Some(1) => (pi_text, pi_latex),
        Coefficient::Rational { den: 1, .. } => (
            format!("{}{pi_text}", coefficient_text(magnitude)),
            format!("{}{pi_latex}", coefficient_latex(magnitude)),
        ),
        _ => (
            format!("{}·{pi_text}", coefficient_text(magnitude)),
            format!("{}{pi_latex}", coefficient_latex(magnitude)),
        ),
    };

    Term {
        negative,
        text,
        latex,
    }
}

fn correction_term(correction: &Correction) -> Option<Term> {
    match *correction {
        Correction::None => None,
        Correction::Constant { value } if value.is_zero() => None,
        Correction::Constant { value } => Some(polynomial_term(value, 0)),
        Correction::Exponential { coefficient, sign } => {
            let (exp_text, exp_latex) = if sign < 0 {
                ("e^(-π)", r"e^{-\pi}")
            } else {
                ("e^(π)", r"e^{\pi}")
            };
            let magnitude = coefficient.abs();
            let (text, latex) = if magnitude.as_integer() == Some(1) {
                (exp_text.to_string(), exp_latex.to_string())
            } else {
                (
                    format!("{}·{exp_text}", coefficient_text(magnitude)),
                    format!("{}{exp_latex}", coefficient_latex(magnitude)),
                )
            };
            Some(Term {
                negative: coefficient.is_negative(),
                text,
                latex,
            })
        }
        Correction::Rational { coefficient, power } => {
            let power = power.max(0) as u32;
            Some(over(
                coefficient,
                &pi_power_text(power),
                &pi_power_latex(power),
            ))
        }
        Correction::QRational { coefficient, order } => Some(over(
            coefficient,
            &format!("[{order}]_π"),
            &format!(r"[{order}]_\pi"),
        )),
    }
}

/// `coefficient / denominator`, folding a fractional coefficient's own
/// denominator into the divisor.
fn over(coefficient: Coefficient, denom_text: &str, denom_latex: &str) -> Term {
    let negative = coefficient.is_negative();
    let (text, latex) = match coefficient.abs() {
        Coefficient::Rational { num, den: 1 } => (
            format!("{num}/{denom_text}"),
            format!(r"\frac{{{num}}}{{{denom_latex}}}"),
        ),
        Coefficient::Rational { num, den } => (
            format!("{num}/({den}{denom_text})"),
            format!(r"\frac{{{num}}}{{{den}{denom_latex}}}"),
        ),
        Coefficient::Real(value) => (
            format!("{value}/{denom_text}"),
            format!(r"\frac{{{value}}}{{{denom_latex}}}"),
        ),
    };
    Term {
        negative,
        text,
        latex,
    }
}

fn coefficient_text(c: Coefficient) -> String {
    c.to_string()
}

fn coefficient_latex(c: Coefficient) -> String {
    match c {
        Coefficient::Rational { num, den: 1 } => num.to_string(),
        Coefficient::Rational { num, den } => format!(r"\frac{{{num}}}{{{den}}}"),
        Coefficient::Real(value) => value.to_string(),
    }
}

fn pi_power_text(power: u32) -> String {
    match power {
        0 => "1".to_string(),
        1 => "π".to_string(),
        n => format!("π{}", superscript(n)),
    }
}

fn pi_power_latex(power: u32) -> String {
    match power {
        0 => "1".to_string(),
        1 => r"\pi".to_string(),
        n if n < 10 => format!(r"\pi^{n}"),
        n => format!(r"\pi^{{{n}}}"),
    }
}

fn superscript(n: u32) -> String {
    const DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
    n.to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| DIGITS[d as usize])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Category;

    #[test]
    fn test_significant_positional() {
        assert_eq!(significant(1836.152_673_43, 10), "1836.152673");
        assert_eq!(significant(0.043_213_918, 3), "0.0432");
        assert_eq!(significant(123_456.0, 3), "123000");
        assert_eq!(significant(-1.913_042_7, 4), "-1.913");
        assert_eq!(significant(9.999_96, 4), "10.00");
    }

    #[test]
    fn test_significant_edge_values() {
        assert_eq!(significant(0.0, 3), "0.00");
        assert_eq!(significant(f64::INFINITY, 3), "inf");
        // Clamped to at least one digit
        assert_eq!(significant(7.4, 0), "7");
    }

    #[test]
    fn test_render_proton() {
        let p = FormulaRecord::new("p", Category::OctetBaryon)
            .with_term(5, Coefficient::integer(6))
            .with_correction(Correction::Exponential {
                coefficient: Coefficient::Rational { num: 4, den: 5 },
                sign: -1,
            });

        let rendered = render_formula(&p);
        assert_eq!(rendered.text, "6π⁵ + 4/5·e^(-π)");
        assert_eq!(rendered.latex, r"6\pi^5 + \frac{4}{5}e^{-\pi}");
    }

    #[test]
    fn test_render_signs_and_unit_coefficients() {
        let pion = FormulaRecord::new("pi_0", Category::Meson)
            .with_term(5, Coefficient::integer(1))
            .with_term(3, Coefficient::integer(-1))
            .with_term(2, Coefficient::integer(-1))
            .with_term(0, Coefficient::integer(-1));

        let rendered = render_formula(&pion);
        assert_eq!(rendered.text, "π⁵ - π³ - π² - 1");
        assert_eq!(rendered.latex, r"\pi^5 - \pi^3 - \pi^2 - 1");
    }

    #[test]
    fn test_render_decimal_unit_coefficients() {
        let record = FormulaRecord::new("mu_p", Category::MagneticMoment)
            .with_term(1, Coefficient::Real(-1.0))
            .with_correction(Correction::Exponential {
                coefficient: Coefficient::Real(1.0),
                sign: -1,
            });

        let rendered = render_formula(&record);
        assert_eq!(rendered.text, "-π + e^(-π)");
        assert_eq!(rendered.latex, r"-\pi + e^{-\pi}");
    }

    #[test]
    fn test_render_largest_coefficients() {
        let record = FormulaRecord::new("wide", Category::Meson)
            .with_term(5, Coefficient::integer(i64::MAX))
            .with_term(0, Coefficient::integer(-i64::MAX));

        let rendered = render_formula(&record);
        assert_eq!(
            rendered.text,
            "9223372036854775807π⁵ - 9223372036854775807"
        );
    }

    #[test]
    fn test_render_fractional_linear_term() {
        let rho = FormulaRecord::new("rho", Category::Meson)
            .with_term(5, Coefficient::integer(5))
            .with_term(2, Coefficient::integer(-1))
            .with_term(1, Coefficient::Rational { num: -6, den: 5 })
            .with_term(0, Coefficient::Rational { num: 2, den: 5 });

        let rendered = render_formula(&rho);
        assert_eq!(rendered.text, "5π⁵ - π² - 6/5·π + 2/5");
        assert_eq!(
            rendered.latex,
            r"5\pi^5 - \pi^2 - \frac{6}{5}\pi + \frac{2}{5}"
        );
    }

    #[test]
    fn test_render_leading_negative_rational() {
        let neutron_mu = FormulaRecord::new("mu_n", Category::MagneticMoment).with_correction(
            Correction::Rational {
                coefficient: Coefficient::integer(-6),
                power: 2,
            },
        );

        let rendered = render_formula(&neutron_mu);
        assert_eq!(rendered.text, "-6/π²");
        assert_eq!(rendered.latex, r"-\frac{6}{\pi^2}");
    }

    #[test]
    fn test_render_q_rational() {
        let xi = FormulaRecord::new("xi_minus", Category::OctetBaryon)
            .with_term(5, Coefficient::integer(8))
            .with_correction(Correction::QRational {
                coefficient: Coefficient::integer(1),
                order: 2,
            });

        let rendered = render_formula(&xi);
        assert_eq!(rendered.text, "8π⁵ + 1/[2]_π");
        assert_eq!(rendered.latex, r"8\pi^5 + \frac{1}{[2]_\pi}");
    }

    #[test]
    fn test_render_empty_formula() {
        let zero = FormulaRecord::new("zero", Category::Meson);
        assert_eq!(render_formula(&zero).text, "0");
    }
}
