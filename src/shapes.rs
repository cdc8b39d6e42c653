//! Definition of various test shapes.

use crate::element::{CollocationScheme, ElementType, InterpolationSet};
use crate::mesh::{Element, Mesh, Node};
use std::collections::HashMap;

/// Create a regular sphere mesh of flat triangles.
///
/// A regular octahedron is refined `refinement_level` times; each refinement
/// splits every triangle into four by connecting the edge midpoints, and the
/// new points are scaled onto the unit sphere. Triangles circulate so that
/// the normals point outward.
pub fn regular_sphere(refinement_level: u32, collocation: CollocationScheme) -> Mesh {
    let mut points: Vec<[f64; 3]> = vec![
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, -1.0],
    ];
    let mut cells: Vec<[usize; 3]> = vec![
        [0, 1, 2],
        [0, 2, 3],
        [0, 3, 4],
        [0, 4, 1],
        [5, 2, 1],
        [5, 3, 2],
        [5, 4, 3],
        [5, 1, 4],
    ];

    for _ in 0..refinement_level {
        let mut edge_points = HashMap::new();
        let mut new_cells = Vec::with_capacity(4 * cells.len());
        for c in &cells {
            let mut mid = [0; 3];
            for (k, [i, j]) in [[c[1], c[2]], [c[0], c[2]], [c[0], c[1]]].iter().enumerate() {
                let key = if i < j { (*i, *j) } else { (*j, *i) };
                mid[k] = *edge_points.entry(key).or_insert_with(|| {
                    let a = points[*i];
                    let b = points[*j];
                    let mut p = [
                        0.5 * (a[0] + b[0]),
                        0.5 * (a[1] + b[1]),
                        0.5 * (a[2] + b[2]),
                    ];
                    let norm = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
                    for x in p.iter_mut() {
                        *x /= norm;
                    }
                    points.push(p);
                    points.len() - 1
                });
            }
            new_cells.push([c[0], mid[2], mid[1]]);
            new_cells.push([mid[2], c[1], mid[0]]);
            new_cells.push([mid[1], mid[0], c[2]]);
            new_cells.push([mid[0], mid[1], mid[2]]);
        }
        cells = new_cells;
    }

    Mesh {
        nodes: points
            .iter()
            .enumerate()
            .map(|(i, p)| Node {
                id: i + 1,
                coords: *p,
            })
            .collect(),
        element_types: vec![ElementType::new(InterpolationSet::Tri3, collocation).unwrap()],
        elements: cells
            .iter()
            .enumerate()
            .map(|(i, c)| Element {
                id: i + 1,
                type_index: 0,
                nodes: vec![c[0] + 1, c[1] + 1, c[2] + 1],
            })
            .collect(),
    }
}

/// Create a closed polygon of line elements approximating the unit circle in
/// the x-z plane, traversed so that the normals point outward.
pub fn circle_polygon(n: usize, collocation: CollocationScheme) -> Mesh {
    let nodes: Vec<Node> = (0..n)
        .map(|i| {
            let phi = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            Node {
                id: i + 1,
                coords: [phi.cos(), 0.0, phi.sin()],
            }
        })
        .collect();
    let elements = (0..n)
        .map(|i| Element {
            id: i + 1,
            type_index: 0,
            nodes: vec![i + 1, (i + 1) % n + 1],
        })
        .collect();
    Mesh {
        nodes,
        element_types: vec![ElementType::new(InterpolationSet::Line2, collocation).unwrap()],
        elements,
    }
}

/// Create a flat rectangular plate in the z = 0 plane meshed with `nx` by
/// `ny` bilinear quadrilaterals, normals pointing to +z.
pub fn rectangle_plate(nx: usize, ny: usize, collocation: CollocationScheme) -> Mesh {
    let mut nodes = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            nodes.push(Node {
                id: j * (nx + 1) + i + 1,
                coords: [i as f64 / nx as f64, j as f64 / ny as f64, 0.0],
            });
        }
    }
    let mut elements = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let n0 = j * (nx + 1) + i + 1;
            elements.push(Element {
                id: j * nx + i + 1,
                type_index: 0,
                nodes: vec![n0, n0 + 1, n0 + nx + 2, n0 + nx + 1],
            });
        }
    }
    Mesh {
        nodes,
        element_types: vec![ElementType::new(InterpolationSet::Quad4, collocation).unwrap()],
        elements,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mesh::MeshContext;
    use approx::assert_relative_eq;
    use rlst::RandomAccessByRef;

    #[test]
    fn sphere_counts() {
        for level in 0..3 {
            let mesh = regular_sphere(level, CollocationScheme::Centroid);
            assert_eq!(mesh.elements.len(), 8 * usize::pow(4, level));
            assert_eq!(mesh.nodes.len(), 2 + usize::pow(4, level + 1));
        }
    }

    #[test]
    fn sphere_normals_point_outward() {
        let mesh = regular_sphere(1, CollocationScheme::Centroid);
        let ctx = MeshContext::new(&mesh).unwrap();
        for ielt in 0..ctx.element_count() {
            let geometry = &ctx.regular_geometry[ielt];
            for p in 0..ctx.regular_tables[0].rule.npoints {
                let dot: f64 = (0..3)
                    .map(|c| {
                        *geometry.normals.get([c, p]).unwrap() * *geometry.points.get([c, p]).unwrap()
                    })
                    .sum();
                assert!(dot > 0.0);
            }
        }
    }

    #[test]
    fn sphere_area_converges() {
        // Total mesh area approaches 4 pi from below under refinement.
        let mut last = 0.0;
        for level in 0..3 {
            let mesh = regular_sphere(level, CollocationScheme::Centroid);
            let ctx = MeshContext::new(&mesh).unwrap();
            let mut area = 0.0;
            for ielt in 0..ctx.element_count() {
                let geometry = &ctx.regular_geometry[ielt];
                for p in 0..ctx.regular_tables[0].rule.npoints {
                    area += ctx.regular_tables[0].rule.weights[p] * geometry.jacobians[p];
                }
            }
            assert!(area > last && area < 4.0 * std::f64::consts::PI);
            last = area;
        }
        assert_relative_eq!(last, 4.0 * std::f64::consts::PI, max_relative = 0.05);
    }

    #[test]
    fn circle_normals_point_outward() {
        let mesh = circle_polygon(16, CollocationScheme::Nodal);
        let ctx = MeshContext::new(&mesh).unwrap();
        for ielt in 0..ctx.element_count() {
            let geometry = &ctx.regular_geometry[ielt];
            for p in 0..ctx.regular_tables[0].rule.npoints {
                let dot: f64 = (0..3)
                    .map(|c| {
                        *geometry.normals.get([c, p]).unwrap() * *geometry.points.get([c, p]).unwrap()
                    })
                    .sum();
                assert!(dot > 0.0);
            }
        }
    }

    #[test]
    fn plate_connectivity() {
        let mesh = rectangle_plate(2, 3, CollocationScheme::Nodal);
        assert_eq!(mesh.nodes.len(), 12);
        assert_eq!(mesh.elements.len(), 6);
        let ctx = MeshContext::new(&mesh).unwrap();
        assert_eq!(ctx.collocation_count(), 12);
    }
}
