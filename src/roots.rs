//! Real roots of low-degree polynomials, used by the quadric and torus
//! intersectors. Closed-form throughout: Ferrari's method for the quartic
//! via a resolvent cubic, Cardano / trigonometric for the cubic.

use crate::types::Float;
use std::f64::consts::PI;

const DEGENERATE: Float = 1e-12;
const ROOT_WELD: Float = 1e-10;

/// a*x^2 + b*x + c = 0, roots sorted ascending.
pub fn solve_quadratic(a: Float, b: Float, c: Float) -> Vec<Float> {
    if a.abs() < DEGENERATE {
        if b.abs() > DEGENERATE {
            return vec![-c / b];
        }
        return Vec::new();
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }

    let sqrt_disc = disc.sqrt();
    let mut roots = vec![(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)];
    roots.sort_by(|x, y| x.partial_cmp(y).expect("NaN quadratic root"));
    roots
}

/// a*x^3 + b*x^2 + c*x + d = 0, real roots sorted ascending.
pub fn solve_cubic(a: Float, b: Float, c: Float, d: Float) -> Vec<Float> {
    if a.abs() < DEGENERATE {
        return solve_quadratic(b, c, d);
    }

    // Normalize, then depress via x = t - p/3.
    let p = b / a;
    let q = c / a;
    let r = d / a;
    let p2 = p * p;
    let aa = q - p2 / 3.0;
    let bb = r - p * q / 3.0 + 2.0 * p2 * p / 27.0;

    let delta = bb * bb / 4.0 + aa * aa * aa / 27.0;
    let shift = p / 3.0;

    let mut roots = Vec::new();
    if delta > DEGENERATE {
        // One real root.
        let sqrt_delta = delta.sqrt();
        roots.push(cbrt(-bb / 2.0 + sqrt_delta) + cbrt(-bb / 2.0 - sqrt_delta) - shift);
    } else if delta.abs() <= DEGENERATE {
        if aa.abs() < DEGENERATE && bb.abs() < DEGENERATE {
            roots.push(-shift);
        } else {
            let u = cbrt(-bb / 2.0);
            roots.push(2.0 * u - shift);
            roots.push(-u - shift);
        }
    } else {
        // Three real roots, Vieta's trigonometric form.
        let m = 2.0 * (-aa / 3.0).sqrt();
        let theta = (3.0 * bb / (aa * m)).acos() / 3.0;
        roots.push(m * theta.cos() - shift);
        roots.push(m * (theta - 2.0 * PI / 3.0).cos() - shift);
        roots.push(m * (theta + 2.0 * PI / 3.0).cos() - shift);
    }

    roots.sort_by(|x, y| x.partial_cmp(y).expect("NaN cubic root"));
    roots
}

/// a*x^4 + b*x^3 + c*x^2 + d*x + e = 0, real roots sorted ascending with
/// near-duplicates welded.
pub fn solve_quartic(a: Float, b: Float, c: Float, d: Float, e: Float) -> Vec<Float> {
    if a.abs() < DEGENERATE {
        return solve_cubic(b, c, d, e);
    }

    // Normalize, then depress via x = y - p/4.
    let p = b / a;
    let q = c / a;
    let r = d / a;
    let s = e / a;
    let p2 = p * p;

    let a2 = q - 3.0 * p2 / 8.0;
    let a1 = r - p * q / 2.0 + p2 * p / 8.0;
    let a0 = s - p * r / 4.0 + p2 * q / 16.0 - 3.0 * p2 * p2 / 256.0;

    let mut roots = Vec::new();

    if a1.abs() < DEGENERATE {
        // Biquadratic: y^4 + a2*y^2 + a0 = 0.
        for y2 in solve_quadratic(1.0, a2, a0) {
            if y2 >= 0.0 {
                let y = y2.sqrt();
                roots.push(y - p / 4.0);
                roots.push(-y - p / 4.0);
            }
        }
    } else {
        // Resolvent cubic: 8u^3 + 8*a2*u^2 + (2*a2^2 - 8*a0)*u - a1^2 = 0.
        let u = solve_cubic(8.0, 8.0 * a2, 2.0 * a2 * a2 - 8.0 * a0, -a1 * a1)
            .into_iter()
            .find(|&u| u > DEGENERATE)
            .unwrap_or(0.0);

        let sqrt_2u = (2.0 * u).max(0.0).sqrt();
        if sqrt_2u > DEGENERATE {
            let alpha = a2 + 2.0 * u;
            let beta = a1 / sqrt_2u;

            // y^2 - sqrt(2u)*y + (alpha + beta)/2 = 0
            let disc1 = sqrt_2u * sqrt_2u - 2.0 * (alpha + beta);
            if disc1 >= 0.0 {
                let sq = disc1.sqrt();
                roots.push((sqrt_2u + sq) / 2.0 - p / 4.0);
                roots.push((sqrt_2u - sq) / 2.0 - p / 4.0);
            }

            // y^2 + sqrt(2u)*y + (alpha - beta)/2 = 0
            let disc2 = sqrt_2u * sqrt_2u - 2.0 * (alpha - beta);
            if disc2 >= 0.0 {
                let sq = disc2.sqrt();
                roots.push((-sqrt_2u + sq) / 2.0 - p / 4.0);
                roots.push((-sqrt_2u - sq) / 2.0 - p / 4.0);
            }
        }
    }

    roots.sort_by(|x, y| x.partial_cmp(y).expect("NaN quartic root"));
    roots.dedup_by(|x, y| (*x - *y).abs() < ROOT_WELD);
    roots
}

fn cbrt(x: Float) -> Float {
    if x >= 0.0 {
        x.powf(1.0 / 3.0)
    } else {
        -(-x).powf(1.0 / 3.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_roots(actual: &[Float], expected: &[Float]) {
        assert_eq!(actual.len(), expected.len(), "roots {:?} vs {:?}", actual, expected);
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-8, "roots {:?} vs {:?}", actual, expected);
        }
    }

    #[test]
    fn quadratic_two_roots() {
        // (x-1)(x-2)
        assert_roots(&solve_quadratic(1.0, -3.0, 2.0), &[1.0, 2.0]);
    }

    #[test]
    fn quadratic_no_real_roots() {
        assert!(solve_quadratic(1.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn quadratic_degenerates_to_linear() {
        assert_roots(&solve_quadratic(0.0, 2.0, -4.0), &[2.0]);
    }

    #[test]
    fn cubic_three_roots() {
        // (x-1)(x-2)(x-3) = x^3 - 6x^2 + 11x - 6
        assert_roots(&solve_cubic(1.0, -6.0, 11.0, -6.0), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn cubic_single_root() {
        // x^3 + x + 10 has one real root at x = -2.
        assert_roots(&solve_cubic(1.0, 0.0, 1.0, 10.0), &[-2.0]);
    }

    #[test]
    fn quartic_four_roots() {
        // (x-1)(x-2)(x-3)(x-4) = x^4 - 10x^3 + 35x^2 - 50x + 24
        assert_roots(&solve_quartic(1.0, -10.0, 35.0, -50.0, 24.0), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn quartic_biquadratic() {
        // (x^2-1)(x^2-4) = x^4 - 5x^2 + 4
        assert_roots(&solve_quartic(1.0, 0.0, -5.0, 0.0, 4.0), &[-2.0, -1.0, 1.0, 2.0]);
    }

    #[test]
    fn quartic_no_real_roots() {
        // x^4 + 1
        assert!(solve_quartic(1.0, 0.0, 0.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn quartic_double_root_welds() {
        // (x-1)^2 (x-3)(x-5)
        let roots = solve_quartic(1.0, -10.0, 32.0, -38.0, 15.0);
        assert_roots(&roots, &[1.0, 3.0, 5.0]);
    }
}
