//! Chi-square distribution tail probabilities.
//!
//! The survival function of a chi-square variable with `k` degrees of freedom
//! is the regularized upper incomplete gamma function `Q(k / 2, x / 2)`. It is
//! evaluated with the usual series expansion below `a + 1` and a continued
//! fraction above it.

const MAX_ITERATIONS: usize = 500;
const EPSILON: f64 = 1e-15;
const TINY: f64 = 1e-300;

/// Probability that a chi-square variable with `degrees_of_freedom` exceeds `x`.
///
/// Returns `1.0` for `x <= 0` and `NaN` for zero degrees of freedom.
///
/// # Examples
///
/// ```
/// use flexeval_stats::distribution::chi_square_survival;
///
/// let p = chi_square_survival(3.841_458_820_694_124, 1);
/// assert!((p - 0.05).abs() < 1e-9);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn chi_square_survival(x: f64, degrees_of_freedom: usize) -> f64 {
    if degrees_of_freedom == 0 {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 1.0;
    }
    regularized_gamma_q(degrees_of_freedom as f64 / 2.0, x / 2.0)
}

/// Regularized upper incomplete gamma function `Q(a, x)`.
fn regularized_gamma_q(a: f64, x: f64) -> f64 {
    if x < a + 1.0 {
        1.0 - gamma_series(a, x)
    } else {
        gamma_continued_fraction(a, x)
    }
}

/// `P(a, x)` by series expansion.
fn gamma_series(a: f64, x: f64) -> f64 {
    let mut denominator = a;
    let mut term = 1.0 / a;
    let mut sum = term;
    for _ in 0..MAX_ITERATIONS {
        denominator += 1.0;
        term *= x / denominator;
        sum += term;
        if term.abs() < sum.abs() * EPSILON {
            break;
        }
    }
    sum * (-x + a * x.ln() - ln_gamma(a)).exp()
}

/// `Q(a, x)` by modified Lentz continued fraction.
#[expect(clippy::cast_precision_loss)]
fn gamma_continued_fraction(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / TINY;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=MAX_ITERATIONS {
        let i = i as f64;
        let an = -i * (i - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < TINY {
            d = TINY;
        }
        c = b + an / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < EPSILON {
            break;
        }
    }
    (-x + a * x.ln() - ln_gamma(a)).exp() * h
}

/// Natural logarithm of the gamma function (Lanczos approximation, g = 7).
fn ln_gamma(x: f64) -> f64 {
    const COEFFICIENTS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // reflection formula
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let t = x + 7.5;
    let mut denominator = x;
    let series = COEFFICIENTS[1..].iter().fold(COEFFICIENTS[0], |acc, &c| {
        denominator += 1.0;
        acc + c / denominator
    });
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_ln_gamma_integers() {
        // Γ(n) = (n - 1)!
        assert_abs_diff_eq!(ln_gamma(1.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ln_gamma(5.0), 24.0_f64.ln(), epsilon = 1e-12);
        assert_abs_diff_eq!(ln_gamma(0.5), std::f64::consts::PI.sqrt().ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_critical_values() {
        assert_abs_diff_eq!(chi_square_survival(3.841_458_820_694_124, 1), 0.05, epsilon = 1e-9);
        assert_abs_diff_eq!(chi_square_survival(5.991_464_547_107_979, 2), 0.05, epsilon = 1e-9);
        assert_abs_diff_eq!(chi_square_survival(6.634_896_601_021_214, 1), 0.01, epsilon = 1e-9);
        assert_abs_diff_eq!(chi_square_survival(11.344_866_730_144_373, 3), 0.01, epsilon = 1e-9);
    }

    #[test]
    fn test_two_degrees_of_freedom_is_exponential() {
        for x in [0.1, 1.0, 4.0, 20.0] {
            assert_abs_diff_eq!(chi_square_survival(x, 2), (-x / 2.0).exp(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_edge_cases() {
        assert_abs_diff_eq!(chi_square_survival(0.0, 1), 1.0);
        assert_abs_diff_eq!(chi_square_survival(-3.0, 4), 1.0);
        assert!(chi_square_survival(1.0, 0).is_nan());
        assert!(chi_square_survival(1_000.0, 1) < 1e-100);
    }
}
