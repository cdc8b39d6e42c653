//! Symmetric rules on the reference triangle.
//!
//! The reference triangle has vertices (0, 0), (1, 0) and (0, 1). Rules are
//! stored as symmetry orbits in barycentric coordinates and expanded on
//! demand; weights sum to the reference area 1/2.

use crate::quadrature::types::QuadratureRule;
use crate::types::{BemError, Result};
use itertools::izip;
use std::collections::HashMap;

/// A symmetry orbit of quadrature points in barycentric coordinates.
enum Orbit {
    /// The centroid, one point.
    Centroid(f64),
    /// Permutations of (a, a, 1 - 2a), three points.
    Threefold(f64, f64),
    /// Permutations of (a, b, 1 - a - b), six points.
    Sixfold(f64, f64, f64),
}

lazy_static! {
    /// Rule definitions keyed by point count. Weights are normalised to sum
    /// to one over the orbit multiplicities.
    static ref TRIANGLE_RULE_DEFINITIONS: HashMap<usize, Vec<Orbit>> = {
        let mut m = HashMap::new();
        m.insert(1, vec![Orbit::Centroid(1.0)]);
        m.insert(
            3,
            vec![Orbit::Threefold(1.0 / 6.0, 1.0 / 3.0)],
        );
        m.insert(
            4,
            vec![
                Orbit::Centroid(-0.5625),
                Orbit::Threefold(0.2, 25.0 / 48.0),
            ],
        );
        m.insert(
            6,
            vec![
                Orbit::Threefold(0.445948490915965, 0.223381589678011),
                Orbit::Threefold(0.091576213509771, 0.109951743655322),
            ],
        );
        m.insert(
            7,
            vec![
                Orbit::Centroid(0.225),
                Orbit::Threefold(0.470142064105115, 0.132394152788506),
                Orbit::Threefold(0.101286507323456, 0.125939180544827),
            ],
        );
        m.insert(
            12,
            vec![
                Orbit::Threefold(0.249286745170910, 0.116786275726379),
                Orbit::Threefold(0.063089014491502, 0.050844906370207),
                Orbit::Sixfold(
                    0.053145049844816,
                    0.310352451033785,
                    0.082851075618374,
                ),
            ],
        );
        m
    };
}

fn push_point(points: &mut Vec<f64>, weights: &mut Vec<f64>, lambda: [f64; 3], w: f64) {
    // Map barycentric (l1, l2, l3) to reference coordinates (xi, eta).
    points.push(lambda[1]);
    points.push(lambda[2]);
    weights.push(0.5 * w);
}

/// Symmetric rule with `npoints` points on the reference triangle.
///
/// Available point counts: 1, 3, 4, 6, 7 and 12. The 3-, 6- and 12-point
/// rules do not sample the centroid, which makes them suitable for singular
/// schemes with a centroid collocation point.
pub fn triangle_rule(npoints: usize) -> Result<QuadratureRule> {
    let orbits = TRIANGLE_RULE_DEFINITIONS
        .get(&npoints)
        .ok_or(BemError::RuleNotFound)?;
    let mut points = Vec::with_capacity(2 * npoints);
    let mut weights = Vec::with_capacity(npoints);
    for orbit in orbits {
        match orbit {
            Orbit::Centroid(w) => {
                push_point(&mut points, &mut weights, [1.0 / 3.0; 3], *w);
            }
            Orbit::Threefold(a, w) => {
                let b = 1.0 - 2.0 * a;
                push_point(&mut points, &mut weights, [*a, *a, b], *w);
                push_point(&mut points, &mut weights, [*a, b, *a], *w);
                push_point(&mut points, &mut weights, [b, *a, *a], *w);
            }
            Orbit::Sixfold(a, b, w) => {
                let c = 1.0 - a - b;
                for lambda in [
                    [*a, *b, c],
                    [*a, c, *b],
                    [*b, *a, c],
                    [*b, c, *a],
                    [c, *a, *b],
                    [c, *b, *a],
                ] {
                    push_point(&mut points, &mut weights, lambda, *w);
                }
            }
        }
    }
    Ok(QuadratureRule {
        dim: 2,
        npoints,
        points,
        weights,
    })
}

/// Refined rule: the reference triangle is split into `ndiv`^2 congruent
/// subtriangles, each carrying the `npoints`-point symmetric rule.
pub fn subdivided_triangle_rule(ndiv: usize, npoints: usize) -> Result<QuadratureRule> {
    let base = triangle_rule(npoints)?;
    let n = ndiv * ndiv * npoints;
    let mut points = Vec::with_capacity(2 * n);
    let mut weights = Vec::with_capacity(n);
    let h = 1.0 / ndiv as f64;
    let scale = 1.0 / (ndiv * ndiv) as f64;

    let mut add_cell = |v0: [f64; 2], v1: [f64; 2], v2: [f64; 2]| {
        for (p, w) in izip!(base.points.chunks(2), &base.weights) {
            points.push(v0[0] + (v1[0] - v0[0]) * p[0] + (v2[0] - v0[0]) * p[1]);
            points.push(v0[1] + (v1[1] - v0[1]) * p[0] + (v2[1] - v0[1]) * p[1]);
            weights.push(scale * w);
        }
    };

    for j in 0..ndiv {
        for i in 0..ndiv - j {
            let x = i as f64 * h;
            let y = j as f64 * h;
            add_cell([x, y], [x + h, y], [x, y + h]);
            if i + j < ndiv - 1 {
                add_cell([x + h, y], [x + h, y + h], [x, y + h]);
            }
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
    fn rules_integrate_constants_to_reference_area() {
        for npoints in [1, 3, 4, 6, 7, 12] {
            let rule = triangle_rule(npoints).unwrap();
            assert_eq!(rule.npoints, npoints);
            let total: f64 = rule.weights.iter().sum();
            assert_relative_eq!(total, 0.5, max_relative = 1e-14);
        }
    }

    #[test]
    fn rules_integrate_linears() {
        // int_T xi dA = 1/6 on the reference triangle.
        for npoints in [1, 3, 4, 6, 7, 12] {
            let rule = triangle_rule(npoints).unwrap();
            let value: f64 = (0..rule.npoints)
                .map(|i| rule.weights[i] * rule.point(i)[0])
                .sum();
            assert_relative_eq!(value, 1.0 / 6.0, max_relative = 1e-13);
        }
    }

    #[test]
    fn seven_point_rule_is_degree_five() {
        // int_T xi^4 dA = 1/30, int_T xi^2 eta^2 dA = 1/180, both degree <= 5
        // and integrated exactly by the 7-point rule.
        let rule = triangle_rule(7).unwrap();
        let v1: f64 = (0..7)
            .map(|i| rule.weights[i] * rule.point(i)[0].powi(4))
            .sum();
        assert_relative_eq!(v1, 1.0 / 30.0, max_relative = 1e-12);
        let v2: f64 = (0..7)
            .map(|i| rule.weights[i] * (rule.point(i)[0] * rule.point(i)[1]).powi(2))
            .sum();
        assert_relative_eq!(v2, 1.0 / 180.0, max_relative = 1e-12);
    }

    #[test]
    fn subdivided_rule_covers_the_triangle() {
        for ndiv in [1, 2, 3] {
            let rule = subdivided_triangle_rule(ndiv, 3).unwrap();
            assert_eq!(rule.npoints, 3 * ndiv * ndiv);
            let total: f64 = rule.weights.iter().sum();
            assert_relative_eq!(total, 0.5, max_relative = 1e-13);
            let value: f64 = (0..rule.npoints)
                .map(|i| rule.weights[i] * rule.point(i)[0])
                .sum();
            assert_relative_eq!(value, 1.0 / 6.0, max_relative = 1e-13);
            // All points stay inside the reference triangle.
            for i in 0..rule.npoints {
                let p = rule.point(i);
                assert!(p[0] > 0.0 && p[1] > 0.0 && p[0] + p[1] < 1.0);
            }
        }
    }

    #[test]
    fn subdivided_rule_avoids_the_centroid() {
        // The singular schemes rely on sample points missing the collocation
        // point; with the 3- and 6-point base rules no subdivision places a
        // point on the parent centroid.
        for (ndiv, npoints) in [(1, 3), (2, 3), (2, 6), (3, 6)] {
            let rule = subdivided_triangle_rule(ndiv, npoints).unwrap();
            for i in 0..rule.npoints {
                let p = rule.point(i);
                let d2 = (p[0] - 1.0 / 3.0).powi(2) + (p[1] - 1.0 / 3.0).powi(2);
                assert!(d2 > 1e-8);
            }
        }
    }
}
