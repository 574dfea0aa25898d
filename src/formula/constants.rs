//! Fundamental constants for π-algebra formulas.

/// π to full `f64` precision.
pub const PI: f64 = std::f64::consts::PI;

/// Electron mass in MeV. Masses are evaluated in units of mₑ.
pub const ELECTRON_MASS_MEV: f64 = 0.510_998_95;

/// `[π⁰, π¹, …, π⁵]`, built by repeated multiplication so every caller sees
/// the same bits.
pub fn pi_powers() -> [f64; 6] {
    let mut powers = [1.0; 6];
    for i in 1..powers.len() {
        powers[i] = powers[i - 1] * PI;
    }
    powers
}

/// `π^n` for `n >= 0`, by repeated multiplication. Stops once the product
/// overflows.
pub fn pi_pow(n: u32) -> f64 {
    let mut acc = 1.0;
    for _ in 0..n {
        acc *= PI;
        if acc.is_infinite() {
            break;
        }
    }
    acc
}

/// q-integer at base π: `[n]_π = 1 + π + … + π^(n-1)`.
pub fn q_integer(n: u32) -> f64 {
    let mut term = 1.0;
    let mut sum = 0.0;
    for _ in 0..n {
        sum += term;
        term *= PI;
        if sum.is_infinite() {
            break;
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pi_powers_match_pi_pow() {
        let powers = pi_powers();
        for (i, p) in powers.iter().enumerate() {
            assert_eq!(p.to_bits(), pi_pow(i as u32).to_bits());
        }
        assert!((powers[5] - 306.019_684_785_281_4).abs() < 1e-9);
    }

    #[test]
    fn test_q_integer() {
        assert_eq!(q_integer(0), 0.0);
        assert_eq!(q_integer(1), 1.0);
        assert!((q_integer(2) - (PI + 1.0)).abs() < 1e-15);
        // [3]_π ≈ 14.01, the charm base
        assert!((q_integer(3) - 14.011_197_054_679_5).abs() < 1e-9);
    }
}
