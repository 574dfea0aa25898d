use std::path::PathBuf;

use tempfile::TempDir;

use super::*;

const PROTON: &str = r#"
[[record]]
id = "p"
category = "octet-baryon"
name = "Proton"
reference = 938.27208816
strangeness = 0
coefficients = { c5 = 6 }
correction = { kind = "exponential", coefficient = 0.8, sign = -1 }
"#;

fn load_err(content: &str) -> ValidationError {
    Registry::from_toml(content).expect_err("expected validation failure")
}

#[test]
fn test_load_proton() {
    let registry = Registry::from_toml(PROTON).unwrap();
    let p = registry.record("p").unwrap();

    assert_eq!(p.category, Category::OctetBaryon);
    assert_eq!(p.coefficient(5), Coefficient::integer(6));
    assert!(p.coefficient(4).is_zero());
    assert_eq!(
        p.correction,
        Correction::Exponential {
            coefficient: Coefficient::Real(0.8),
            sign: -1
        }
    );
    assert_eq!(p.label.name, "Proton");
    // Unset labels fall back to the identifier
    assert_eq!(p.label.symbol, "p");
}

#[test]
fn test_strangeness_rule_rejects_c5_mismatch() {
    let err = load_err(
        r#"
[[record]]
id = "lambda"
category = "octet-baryon"
strangeness = -1
coefficients = { c5 = 6 }
"#,
    );
    assert!(matches!(
        err,
        ValidationError::StrangenessRule { ref id, expected: 7, .. } if id == "lambda"
    ));
    assert!(err.to_string().contains("lambda"));
}

#[test]
fn test_strangeness_rule_accepts_decuplet() {
    let registry = Registry::from_toml(
        r#"
[[record]]
id = "omega"
category = "decuplet-baryon"
strangeness = -3
coefficients = { c5 = 9, c4 = 6, c3 = -2, c1 = "-6/5" }
correction = { kind = "exponential", coefficient = "6/5", sign = -1 }
"#,
    )
    .unwrap();
    assert_eq!(registry.records().len(), 1);
}

#[test]
fn test_strangeness_rule_ignores_mesons() {
    let registry = Registry::from_toml(
        r#"
[[record]]
id = "kaon"
category = "meson"
strangeness = -1
coefficients = { c5 = 3, c3 = 1, c2 = 2, c1 = "-4/5" }
"#,
    )
    .unwrap();
    assert!(registry.record("kaon").is_some());
}

#[test]
fn test_missing_coefficients() {
    let err = load_err(
        r#"
[[record]]
id = "ghost"
category = "meson"
"#,
    );
    assert!(matches!(err, ValidationError::MissingCoefficients { ref id } if id == "ghost"));

    let err = load_err(
        r#"
[[record]]
id = "empty"
category = "meson"
coefficients = {}
"#,
    );
    assert!(matches!(err, ValidationError::MissingCoefficients { .. }));
}

#[test]
fn test_non_numeric_coefficient() {
    let err = load_err(
        r#"
[[record]]
id = "pion"
category = "meson"
coefficients = { c5 = "one" }
"#,
    );
    assert!(matches!(
        err,
        ValidationError::NonNumeric { ref id, ref term, .. } if id == "pion" && term == "c5"
    ));

    let err = load_err(
        r#"
[[record]]
id = "pion"
category = "meson"
coefficients = { c5 = true }
"#,
    );
    assert!(matches!(err, ValidationError::NonNumeric { .. }));
}

#[test]
fn test_unknown_term() {
    let err = load_err(
        r#"
[[record]]
id = "pion"
category = "meson"
coefficients = { c6 = 1 }
"#,
    );
    assert!(matches!(err, ValidationError::UnknownTerm { ref term, .. } if term == "c6"));
}

#[test]
fn test_zero_denominator() {
    let err = load_err(
        r#"
[[record]]
id = "rho"
category = "meson"
coefficients = { c5 = 5, c1 = "6/0" }
"#,
    );
    assert!(matches!(err, ValidationError::ZeroDenominator { .. }));
}

#[test]
fn test_coefficient_without_magnitude_rejected() {
    let err = load_err(
        r#"
[[record]]
id = "pion"
category = "meson"
coefficients = { c5 = -9223372036854775808 }
"#,
    );
    assert!(matches!(
        err,
        ValidationError::NonNumeric { ref term, ref value, .. }
            if term == "c5" && value == "-9223372036854775808"
    ));

    let err = load_err(
        r#"
[[record]]
id = "pion"
category = "meson"
coefficients = { c5 = 1 }
correction = { kind = "rational", coefficient = "-9223372036854775808/-1", power = 2 }
"#,
    );
    assert!(matches!(
        err,
        ValidationError::NonNumeric { ref term, .. } if term == "correction.coefficient"
    ));
}

#[test]
fn test_exponential_sign_must_be_unit() {
    let err = load_err(
        r#"
[[record]]
id = "muon"
category = "lepton"
coefficients = { c5 = 1 }
correction = { kind = "exponential", coefficient = -20, sign = 2 }
"#,
    );
    assert!(matches!(err, ValidationError::ExponentialSign { sign: 2, .. }));
}

#[test]
fn test_non_positive_power_loads() {
    // Rejected later by the evaluator, not here
    let registry = Registry::from_toml(
        r#"
[[record]]
id = "bad"
category = "magnetic-moment"
coefficients = { c0 = 0 }
correction = { kind = "rational", coefficient = -6, power = 0 }
"#,
    )
    .unwrap();
    assert_eq!(
        registry.record("bad").unwrap().correction,
        Correction::Rational {
            coefficient: Coefficient::integer(-6),
            power: 0
        }
    );
}

#[test]
fn test_duplicate_identifier_across_files() {
    let sources = vec![
        (PathBuf::from("a.toml"), PROTON.to_string()),
        (PathBuf::from("b.toml"), PROTON.to_string()),
    ];
    let err = Registry::from_sources(&sources).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::DuplicateRecord { ref id, ref first } if id == "p" && first == &PathBuf::from("a.toml")
    ));
}

#[test]
fn test_invalid_and_reserved_identifiers() {
    let err = load_err(
        r#"
[[record]]
id = "Sigma+"
category = "meson"
coefficients = { c5 = 1 }
"#,
    );
    assert!(matches!(err, ValidationError::InvalidIdentifier { .. }));

    let err = load_err(
        r#"
[[record]]
id = "items"
category = "meson"
coefficients = { c5 = 1 }
"#,
    );
    assert!(matches!(err, ValidationError::ReservedIdentifier { .. }));
}

#[test]
fn test_page_unknown_record() {
    let err = load_err(&format!(
        "{PROTON}\n[[page]]\ntemplate = \"t.html\"\noutput = \"index.html\"\nrecords = [\"p\", \"n\"]\n"
    ));
    assert!(matches!(err, ValidationError::UnknownRecord { ref id, .. } if id == "n"));
}

#[test]
fn test_page_duplicate_output() {
    let err = load_err(&format!(
        "{PROTON}
[[page]]
template = \"a.html\"
output = \"index.html\"
records = [\"p\"]

[[page]]
template = \"b.html\"
output = \"index.html\"
"
    ));
    assert!(matches!(err, ValidationError::DuplicateOutput { .. }));
}

#[test]
fn test_page_output_must_stay_inside() {
    let err = load_err("[[page]]\ntemplate = \"a.html\"\noutput = \"../index.html\"\n");
    assert!(matches!(err, ValidationError::InvalidOutput { .. }));
}

#[test]
fn test_page_category_expansion() {
    let registry = Registry::from_toml(&format!(
        "{PROTON}
[[record]]
id = \"n\"
category = \"octet-baryon\"
coefficients = {{ c5 = 6 }}
correction = {{ kind = \"rational\", coefficient = 8, power = 1 }}

[[record]]
id = \"pion\"
category = \"meson\"
coefficients = {{ c5 = 1 }}

[[page]]
template = \"mixed.html\"
output = \"mixed.html\"
records = [\"pion\", \"n\"]
categories = [\"octet-baryon\"]
"
    ))
    .unwrap();

    let page = &registry.pages()[0];
    assert_eq!(page.records, vec!["pion", "n", "p"]);
}

const MOMENTS: &str = r#"
[[record]]
id = "mu_n"
category = "magnetic-moment"
family = "6-chain"
coefficients = { c0 = 0 }
correction = { kind = "rational", coefficient = -6, power = 1 }

[[record]]
id = "mu_Xi_minus"
category = "magnetic-moment"
strangeness = -2
family = "20-family"
coefficients = { c0 = 0 }
correction = { kind = "rational", coefficient = -20, power = 3 }

[[record]]
id = "mu_Lambda"
category = "magnetic-moment"
strangeness = -1
family = "6-chain"
coefficients = { c0 = 0 }
correction = { kind = "rational", coefficient = -6, power = 2 }
"#;

#[test]
fn test_page_family_expansion() {
    let registry = Registry::from_toml(&format!(
        "{MOMENTS}
[[page]]
template = \"table.html\"
output = \"families.html\"
records = [\"mu_Lambda\"]
families = [\"20-family\", \"6-chain\"]
"
    ))
    .unwrap();

    let page = &registry.pages()[0];
    assert_eq!(page.records, vec!["mu_Lambda", "mu_Xi_minus", "mu_n"]);
    assert_eq!(
        registry.record("mu_n").unwrap().family.as_deref(),
        Some("6-chain")
    );
}

#[test]
fn test_page_strangeness_narrows_selectors() {
    let registry = Registry::from_toml(&format!(
        "{MOMENTS}
[[page]]
template = \"table.html\"
output = \"strange.html\"
records = [\"mu_n\"]
categories = [\"magnetic-moment\"]
strangeness = [-1, -2]
"
    ))
    .unwrap();

    // mu_n is listed explicitly, so S = 0 does not drop it
    let page = &registry.pages()[0];
    assert_eq!(page.records, vec!["mu_n", "mu_Xi_minus", "mu_Lambda"]);
}

#[test]
fn test_page_unknown_family() {
    let err = load_err(&format!(
        "{MOMENTS}
[[page]]
template = \"table.html\"
output = \"families.html\"
families = [\"6-chian\"]
"
    ));
    assert!(matches!(
        err,
        ValidationError::UnknownFamily { ref family, .. } if family == "6-chian"
    ));
}

#[test]
fn test_unknown_record_field_rejected() {
    let err = load_err(
        r#"
[[record]]
id = "pion"
category = "meson"
coefficient = { c5 = 1 }
"#,
    );
    assert!(matches!(err, ValidationError::Parse { .. }));
}

#[test]
fn test_load_from_directory() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    std::fs::create_dir_all(data.join("nested")).unwrap();
    std::fs::write(data.join("baryons.toml"), PROTON).unwrap();
    std::fs::write(
        data.join("nested/pages.toml"),
        "[[page]]\ntemplate = \"index.html\"\noutput = \"index.html\"\nrecords = [\"p\"]\n",
    )
    .unwrap();
    std::fs::write(data.join("notes.txt"), "ignored").unwrap();

    let registry = Registry::load(&data).unwrap();
    assert_eq!(registry.records().len(), 1);
    assert_eq!(registry.pages().len(), 1);
    assert_eq!(registry.pages()[0].records, vec!["p"]);
}

#[test]
fn test_load_missing_directory() {
    let temp = TempDir::new().unwrap();
    let err = Registry::load(&temp.path().join("absent")).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}
