//! Gauss-Legendre rules on the reference interval and quadrilateral.

use crate::quadrature::types::QuadratureRule;
use crate::types::{BemError, Result};
use itertools::izip;
use std::collections::HashMap;

lazy_static! {
    /// Gauss-Legendre abscissae and weights on [-1, 1], keyed by point count.
    static ref GAUSS_LEGENDRE_DEFINITIONS: HashMap<usize, (Vec<f64>, Vec<f64>)> = {
        let mut m = HashMap::new();
        m.insert(1, (vec![0.0], vec![2.0]));
        m.insert(
            2,
            (
                vec![-0.5773502691896257, 0.5773502691896257],
                vec![1.0, 1.0],
            ),
        );
        m.insert(
            3,
            (
                vec![-0.7745966692414834, 0.0, 0.7745966692414834],
                vec![
                    0.5555555555555556,
                    0.8888888888888888,
                    0.5555555555555556,
                ],
            ),
        );
        m.insert(
            4,
            (
                vec![
                    -0.8611363115940526,
                    -0.3399810435848563,
                    0.3399810435848563,
                    0.8611363115940526,
                ],
                vec![
                    0.3478548451374538,
                    0.6521451548625461,
                    0.6521451548625461,
                    0.3478548451374538,
                ],
            ),
        );
        m.insert(
            5,
            (
                vec![
                    -0.9061798459386640,
                    -0.5384693101056831,
                    0.0,
                    0.5384693101056831,
                    0.9061798459386640,
                ],
                vec![
                    0.2369268850561891,
                    0.4786286704993665,
                    0.5688888888888889,
                    0.4786286704993665,
                    0.2369268850561891,
                ],
            ),
        );
        m.insert(
            6,
            (
                vec![
                    -0.9324695142031521,
                    -0.6612093864662645,
                    -0.2386191860831969,
                    0.2386191860831969,
                    0.6612093864662645,
                    0.9324695142031521,
                ],
                vec![
                    0.1713244923791704,
                    0.3607615730481386,
                    0.4679139345726910,
                    0.4679139345726910,
                    0.3607615730481386,
                    0.1713244923791704,
                ],
            ),
        );
        m.insert(
            7,
            (
                vec![
                    -0.9491079123427585,
                    -0.7415311855993945,
                    -0.4058451513773972,
                    0.0,
                    0.4058451513773972,
                    0.7415311855993945,
                    0.9491079123427585,
                ],
                vec![
                    0.1294849661688697,
                    0.2797053914892766,
                    0.3818300505051189,
                    0.4179591836734694,
                    0.3818300505051189,
                    0.2797053914892766,
                    0.1294849661688697,
                ],
            ),
        );
        m.insert(
            8,
            (
                vec![
                    -0.9602898564975363,
                    -0.7966664774136267,
                    -0.5255324099163290,
                    -0.1834346424956498,
                    0.1834346424956498,
                    0.5255324099163290,
                    0.7966664774136267,
                    0.9602898564975363,
                ],
                vec![
                    0.1012285362903763,
                    0.2223810344533745,
                    0.3137066458778873,
                    0.3626837833783620,
                    0.3626837833783620,
                    0.3137066458778873,
                    0.2223810344533745,
                    0.1012285362903763,
                ],
            ),
        );
        m.insert(
            9,
            (
                vec![
                    -0.9681602395076261,
                    -0.8360311073266358,
                    -0.6133714327005904,
                    -0.3242534234038089,
                    0.0,
                    0.3242534234038089,
                    0.6133714327005904,
                    0.8360311073266358,
                    0.9681602395076261,
                ],
                vec![
                    0.0812743883615744,
                    0.1806481606948574,
                    0.2606106964029354,
                    0.3123470770400029,
                    0.3302393550012598,
                    0.3123470770400029,
                    0.2606106964029354,
                    0.1806481606948574,
                    0.0812743883615744,
                ],
            ),
        );
        m.insert(
            10,
            (
                vec![
                    -0.9739065285171717,
                    -0.8650633666889845,
                    -0.6794095682990244,
                    -0.4333953941292472,
                    -0.1488743389816312,
                    0.1488743389816312,
                    0.4333953941292472,
                    0.6794095682990244,
                    0.8650633666889845,
                    0.9739065285171717,
                ],
                vec![
                    0.0666713443086881,
                    0.1494513491505806,
                    0.2190863625159820,
                    0.2692667193099963,
                    0.2955242247147529,
                    0.2955242247147529,
                    0.2692667193099963,
                    0.2190863625159820,
                    0.1494513491505806,
                    0.0666713443086881,
                ],
            ),
        );
        m
    };
}

/// Gauss-Legendre rule with `npoints` points on the reference interval [0, 1].
pub fn gauss_legendre(npoints: usize) -> Result<QuadratureRule> {
    let (xs, ws) = GAUSS_LEGENDRE_DEFINITIONS
        .get(&npoints)
        .ok_or(BemError::RuleNotFound)?;
    Ok(QuadratureRule {
        dim: 1,
        npoints,
        points: xs.iter().map(|x| 0.5 * (x + 1.0)).collect(),
        weights: ws.iter().map(|w| 0.5 * w).collect(),
    })
}

/// Composite Gauss-Legendre rule on [0, 1]: `ndiv` equal subintervals, each
/// carrying an `npoints`-point rule.
pub fn line_rule(ndiv: usize, npoints: usize) -> Result<QuadratureRule> {
    let base = gauss_legendre(npoints)?;
    let n = ndiv * npoints;
    let mut points = Vec::with_capacity(n);
    let mut weights = Vec::with_capacity(n);
    let h = 1.0 / ndiv as f64;
    for idiv in 0..ndiv {
        let x0 = idiv as f64 * h;
        for (x, w) in izip!(&base.points, &base.weights) {
            points.push(x0 + h * x);
            weights.push(h * w);
        }
    }
    Ok(QuadratureRule {
        dim: 1,
        npoints: n,
        points,
        weights,
    })
}

/// Tensor-product rule on the reference quadrilateral [0, 1]^2 with `ndiv`
/// subdivisions and `npoints` Gauss points per direction in each cell.
pub fn quadrilateral_rule(ndiv: usize, npoints: usize) -> Result<QuadratureRule> {
    let line = line_rule(ndiv, npoints)?;
    let n = line.npoints * line.npoints;
    let mut points = Vec::with_capacity(2 * n);
    let mut weights = Vec::with_capacity(n);
    for j in 0..line.npoints {
        for i in 0..line.npoints {
            points.push(line.points[i]);
            points.push(line.points[j]);
            weights.push(line.weights[i] * line.weights[j]);
        }
    }
    Ok(QuadratureRule {
        dim: 2,
        npoints: n,
        points,
        weights,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn interval_rules_integrate_constants() {
        for npoints in 1..=10 {
            let rule = gauss_legendre(npoints).unwrap();
            let total: f64 = rule.weights.iter().sum();
            assert_relative_eq!(total, 1.0, max_relative = 1e-14);
        }
    }

    #[test]
    fn interval_rule_is_exact_for_polynomials() {
        // An n-point rule integrates x^(2n-1) exactly.
        for npoints in 2..=8 {
            let rule = gauss_legendre(npoints).unwrap();
            let degree = 2 * npoints - 1;
            let value: f64 = rule
                .points
                .iter()
                .zip(rule.weights.iter())
                .map(|(x, w)| w * x.powi(degree as i32))
                .sum();
            assert_relative_eq!(value, 1.0 / (degree as f64 + 1.0), max_relative = 1e-12);
        }
    }

    #[test]
    fn composite_rule_covers_subintervals() {
        let rule = line_rule(4, 3).unwrap();
        assert_eq!(rule.npoints, 12);
        let total: f64 = rule.weights.iter().sum();
        assert_relative_eq!(total, 1.0, max_relative = 1e-14);
        // Linear function integrates exactly on every subinterval.
        let value: f64 = rule
            .points
            .iter()
            .zip(rule.weights.iter())
            .map(|(x, w)| w * x)
            .sum();
        assert_relative_eq!(value, 0.5, max_relative = 1e-14);
    }

    #[test]
    fn quadrilateral_rule_integrates_bilinear() {
        let rule = quadrilateral_rule(2, 3).unwrap();
        let total: f64 = rule.weights.iter().sum();
        assert_relative_eq!(total, 1.0, max_relative = 1e-14);
        let value: f64 = (0..rule.npoints)
            .map(|i| rule.weights[i] * rule.point(i)[0] * rule.point(i)[1])
            .sum();
        assert_relative_eq!(value, 0.25, max_relative = 1e-13);
    }

    #[test]
    fn unknown_order_is_an_error() {
        assert!(gauss_legendre(11).is_err());
    }
}
