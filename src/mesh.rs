//! Meshes and the immutable assembly context.
//!
//! A [`Mesh`] is the user-facing description: nodes, an element-type catalog
//! and elements referring to both. A [`MeshContext`] is built once per mesh
//! and holds everything the integrators consume read-only: the collocation
//! point table, per-element collocation indices, the regular/singular
//! classification of every (element, collocation point) pair, the shared
//! per-type quadrature and shape tables, and precomputed quadrature-point
//! geometry for the regular and the singular scheme. Invalidation is simply
//! constructing a new context.

use crate::element::{CollocationScheme, ElementType, ShapeFamily};
use crate::quadrature::gauss::{line_rule, quadrilateral_rule};
use crate::quadrature::triangle::{subdivided_triangle_rule, triangle_rule};
use crate::quadrature::types::QuadratureRule;
use crate::types::{BemError, Result, RlstArray};
use rlst::{rlst_dynamic_array2, RandomAccessByRef, RandomAccessMut};
use std::collections::HashMap;

/// Tolerance below which two points are considered coincident.
const COINCIDENCE_TOL: f64 = 1e-10;

/// A mesh node.
#[derive(Debug, Clone)]
pub struct Node {
    /// User-assigned node number.
    pub id: usize,
    /// Coordinates. 2D meshes live in the x-z plane with y = 0.
    pub coords: [f64; 3],
}

/// A boundary element.
#[derive(Debug, Clone)]
pub struct Element {
    /// User-assigned element number.
    pub id: usize,
    /// Index into the mesh's element-type catalog.
    pub type_index: usize,
    /// Node numbers, in the node order of the element's interpolation set.
    pub nodes: Vec<usize>,
}

/// A boundary element mesh. Immutable once built.
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Nodes.
    pub nodes: Vec<Node>,
    /// Element-type catalog.
    pub element_types: Vec<ElementType>,
    /// Elements.
    pub elements: Vec<Element>,
}

/// Quadrature rule plus tabulated shape data for one element type and scheme.
pub struct SchemeTables {
    /// The quadrature rule on the reference domain.
    pub rule: QuadratureRule,
    /// Geometry basis values, shape `[n_nodes, n_points]`.
    pub n: RlstArray<f64, 2>,
    /// Collocation basis values, shape `[n_coll, n_points]`.
    pub m: RlstArray<f64, 2>,
    /// Geometry basis derivatives, shape `[n_nodes, n_points, ref_dim]`.
    pub dn: RlstArray<f64, 3>,
}

/// Mapped quadrature-point geometry of one element under one scheme.
pub struct ElementGeometry {
    /// Global coordinates of the quadrature points, shape `[3, n_points]`.
    pub points: RlstArray<f64, 2>,
    /// Unit outward normals at the quadrature points, shape `[3, n_points]`.
    pub normals: RlstArray<f64, 2>,
    /// Jacobian (surface or line measure) at each quadrature point.
    pub jacobians: Vec<f64>,
}

/// Everything the integrators need, precomputed and immutable.
pub struct MeshContext {
    /// Geometric dimension of the model (2 or 3).
    pub dim: usize,
    /// Element-type catalog.
    pub element_types: Vec<ElementType>,
    /// Type index per element.
    pub element_type_index: Vec<usize>,
    /// Node coordinates per element, in element node order.
    pub element_nodes: Vec<Vec<[f64; 3]>>,
    /// Collocation point coordinates.
    pub collocation_points: Vec<[f64; 3]>,
    /// Global collocation indices per element, in collocation order.
    pub element_collocation: Vec<Vec<usize>>,
    /// Per element, the sorted global indices of collocation points that
    /// require singular integration.
    singular_collocation: Vec<Vec<usize>>,
    /// Transpose of `singular_collocation`: per collocation point, the
    /// elements it is singular on.
    singular_elements: Vec<Vec<usize>>,
    /// Per element type: regular scheme tables.
    pub regular_tables: Vec<SchemeTables>,
    /// Per element type: singular scheme tables.
    pub singular_tables: Vec<SchemeTables>,
    /// Per element: quadrature geometry under the regular scheme.
    pub regular_geometry: Vec<ElementGeometry>,
    /// Per element: quadrature geometry under the singular scheme.
    pub singular_geometry: Vec<ElementGeometry>,
}

fn scheme_rule(ty: &ElementType, singular: bool) -> Result<QuadratureRule> {
    let (n_gauss, n_div) = if singular {
        (ty.n_gauss_sing, ty.n_div_sing)
    } else {
        (ty.n_gauss, ty.n_div)
    };
    match ty.family() {
        ShapeFamily::Line => line_rule(n_div, n_gauss),
        ShapeFamily::Triangle => {
            if singular {
                subdivided_triangle_rule(n_div, n_gauss)
            } else {
                triangle_rule(n_gauss)
            }
        }
        ShapeFamily::Quadrilateral => quadrilateral_rule(n_div, n_gauss),
    }
}

fn scheme_tables(ty: &ElementType, singular: bool) -> Result<SchemeTables> {
    let rule = scheme_rule(ty, singular)?;
    let dim = ty.family().reference_dim();
    let n = ty.shape.tabulate(&rule.points, dim);
    let m = ty.collocation_basis().tabulate(&rule.points, dim);
    let dn = ty.shape.tabulate_derivs(&rule.points, dim);
    Ok(SchemeTables { rule, n, m, dn })
}

/// Map the tabulated reference geometry of one element to global coordinates,
/// Jacobians and unit normals.
pub fn map_geometry(
    nodes: &[[f64; 3]],
    tables: &SchemeTables,
    family: ShapeFamily,
) -> ElementGeometry {
    let npts = tables.rule.npoints;
    let mut points = rlst_dynamic_array2!(f64, [3, npts]);
    let mut normals = rlst_dynamic_array2!(f64, [3, npts]);
    let mut jacobians = vec![0.0; npts];

    for p in 0..npts {
        let mut x = [0.0; 3];
        for (b, node) in nodes.iter().enumerate() {
            let nb = *tables.n.get([b, p]).unwrap();
            for c in 0..3 {
                x[c] += nb * node[c];
            }
        }
        for c in 0..3 {
            *points.get_mut([c, p]).unwrap() = x[c];
        }

        match family.reference_dim() {
            1 => {
                // Line element in the x-z plane: rotate the tangent by -90
                // degrees about y to get the normal.
                let mut t = [0.0; 3];
                for (b, node) in nodes.iter().enumerate() {
                    let db = *tables.dn.get([b, p, 0]).unwrap();
                    for c in 0..3 {
                        t[c] += db * node[c];
                    }
                }
                let jac = (t[0] * t[0] + t[2] * t[2]).sqrt();
                jacobians[p] = jac;
                *normals.get_mut([0, p]).unwrap() = t[2] / jac;
                *normals.get_mut([1, p]).unwrap() = 0.0;
                *normals.get_mut([2, p]).unwrap() = -t[0] / jac;
            }
            _ => {
                let mut a1 = [0.0; 3];
                let mut a2 = [0.0; 3];
                for (b, node) in nodes.iter().enumerate() {
                    let d1 = *tables.dn.get([b, p, 0]).unwrap();
                    let d2 = *tables.dn.get([b, p, 1]).unwrap();
                    for c in 0..3 {
                        a1[c] += d1 * node[c];
                        a2[c] += d2 * node[c];
                    }
                }
                let cross = [
                    a1[1] * a2[2] - a1[2] * a2[1],
                    a1[2] * a2[0] - a1[0] * a2[2],
                    a1[0] * a2[1] - a1[1] * a2[0],
                ];
                let jac = (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt();
                jacobians[p] = jac;
                for c in 0..3 {
                    *normals.get_mut([c, p]).unwrap() = cross[c] / jac;
                }
            }
        }
    }

    ElementGeometry {
        points,
        normals,
        jacobians,
    }
}

fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}

impl MeshContext {
    /// Build the context for a mesh.
    pub fn new(mesh: &Mesh) -> Result<Self> {
        if mesh.elements.is_empty() {
            return Err(BemError::InvalidMesh("The mesh has no elements."));
        }
        let mut node_index = HashMap::new();
        for (i, node) in mesh.nodes.iter().enumerate() {
            if node_index.insert(node.id, i).is_some() {
                return Err(BemError::InvalidMesh("Duplicate node number."));
            }
        }

        let mut dim = None;
        for ty in &mesh.element_types {
            match dim {
                None => dim = Some(ty.mesh_dimension()),
                Some(d) => {
                    if d != ty.mesh_dimension() {
                        return Err(BemError::InvalidMesh(
                            "2D and 3D element types cannot be mixed.",
                        ));
                    }
                }
            }
        }
        let dim = dim.ok_or(BemError::InvalidMesh("The mesh has no element types."))?;

        let mut element_type_index = Vec::with_capacity(mesh.elements.len());
        let mut element_nodes = Vec::with_capacity(mesh.elements.len());
        for element in &mesh.elements {
            let ty = mesh
                .element_types
                .get(element.type_index)
                .ok_or(BemError::InvalidMesh("Element refers to an unknown type."))?;
            if element.nodes.len() != ty.node_count() {
                return Err(BemError::InvalidMesh(
                    "Element connectivity does not match its type.",
                ));
            }
            let mut coords = Vec::with_capacity(element.nodes.len());
            for id in &element.nodes {
                let idx = node_index
                    .get(id)
                    .ok_or(BemError::InvalidMesh("Element refers to an unknown node."))?;
                coords.push(mesh.nodes[*idx].coords);
            }
            element_type_index.push(element.type_index);
            element_nodes.push(coords);
        }

        // Collocation point table: nodal points first (shared between
        // elements, in node order), then one centroid per centroid element.
        let mut collocation_points = Vec::new();
        let mut node_collocation = HashMap::new();
        for (ielt, element) in mesh.elements.iter().enumerate() {
            let ty = &mesh.element_types[element_type_index[ielt]];
            if ty.collocation == CollocationScheme::Nodal {
                for id in &element.nodes {
                    let idx = node_index[id];
                    node_collocation.entry(idx).or_insert(0usize);
                }
            }
        }
        let mut nodal: Vec<usize> = node_collocation.keys().copied().collect();
        nodal.sort_unstable();
        for (coll, idx) in nodal.iter().enumerate() {
            node_collocation.insert(*idx, coll);
            collocation_points.push(mesh.nodes[*idx].coords);
        }

        let mut element_collocation = Vec::with_capacity(mesh.elements.len());
        for (ielt, element) in mesh.elements.iter().enumerate() {
            let ty = &mesh.element_types[element_type_index[ielt]];
            match ty.collocation {
                CollocationScheme::Nodal => {
                    element_collocation.push(
                        element
                            .nodes
                            .iter()
                            .map(|id| node_collocation[&node_index[id]])
                            .collect::<Vec<_>>(),
                    );
                }
                CollocationScheme::Centroid => {
                    let centre = ty.family().reference_centre();
                    let mut values = vec![0.0; ty.node_count()];
                    ty.shape.evaluate(&centre, &mut values);
                    let mut x = [0.0; 3];
                    for (b, node) in element_nodes[ielt].iter().enumerate() {
                        for c in 0..3 {
                            x[c] += values[b] * node[c];
                        }
                    }
                    element_collocation.push(vec![collocation_points.len()]);
                    collocation_points.push(x);
                }
            }
        }

        // Classification: a collocation point is singular on an element if it
        // is one of the element's own collocation points or coincides with
        // one of its nodes.
        let mut singular_collocation = Vec::with_capacity(mesh.elements.len());
        let mut singular_elements = vec![Vec::new(); collocation_points.len()];
        for ielt in 0..mesh.elements.len() {
            let mut singular = Vec::new();
            for (coll, point) in collocation_points.iter().enumerate() {
                let own = element_collocation[ielt].contains(&coll);
                let on_node = element_nodes[ielt]
                    .iter()
                    .any(|node| distance(node, point) < COINCIDENCE_TOL);
                if own || on_node {
                    singular.push(coll);
                }
            }
            for coll in &singular {
                singular_elements[*coll].push(ielt);
            }
            singular_collocation.push(singular);
        }

        let mut regular_tables = Vec::with_capacity(mesh.element_types.len());
        let mut singular_tables = Vec::with_capacity(mesh.element_types.len());
        for ty in &mesh.element_types {
            regular_tables.push(scheme_tables(ty, false)?);
            singular_tables.push(scheme_tables(ty, true)?);
        }

        let mut regular_geometry = Vec::with_capacity(mesh.elements.len());
        let mut singular_geometry = Vec::with_capacity(mesh.elements.len());
        for ielt in 0..mesh.elements.len() {
            let ty = &mesh.element_types[element_type_index[ielt]];
            regular_geometry.push(map_geometry(
                &element_nodes[ielt],
                &regular_tables[element_type_index[ielt]],
                ty.family(),
            ));
            singular_geometry.push(map_geometry(
                &element_nodes[ielt],
                &singular_tables[element_type_index[ielt]],
                ty.family(),
            ));
        }

        Ok(Self {
            dim,
            element_types: mesh.element_types.clone(),
            element_type_index,
            element_nodes,
            collocation_points,
            element_collocation,
            singular_collocation,
            singular_elements,
            regular_tables,
            singular_tables,
            regular_geometry,
            singular_geometry,
        })
    }

    /// Number of elements.
    pub fn element_count(&self) -> usize {
        self.element_nodes.len()
    }

    /// Number of collocation points.
    pub fn collocation_count(&self) -> usize {
        self.collocation_points.len()
    }

    /// Element type of an element.
    pub fn element_type(&self, ielt: usize) -> &ElementType {
        &self.element_types[self.element_type_index[ielt]]
    }

    /// Whether a collocation point requires singular integration on an
    /// element. Fixed for the lifetime of the context.
    pub fn is_singular(&self, ielt: usize, coll: usize) -> bool {
        self.singular_collocation[ielt].binary_search(&coll).is_ok()
    }

    /// Elements on which a collocation point requires singular integration.
    pub fn singular_elements(&self, coll: usize) -> &[usize] {
        &self.singular_elements[coll]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::element::InterpolationSet;
    use approx::assert_relative_eq;

    fn single_triangle(collocation: CollocationScheme) -> Mesh {
        Mesh {
            nodes: vec![
                Node {
                    id: 1,
                    coords: [0.0, 0.0, 0.0],
                },
                Node {
                    id: 2,
                    coords: [1.0, 0.0, 0.0],
                },
                Node {
                    id: 3,
                    coords: [0.0, 1.0, 0.0],
                },
            ],
            element_types: vec![ElementType::new(InterpolationSet::Tri3, collocation).unwrap()],
            elements: vec![Element {
                id: 1,
                type_index: 0,
                nodes: vec![1, 2, 3],
            }],
        }
    }

    #[test]
    fn centroid_collocation_sits_at_the_centroid() {
        let ctx = MeshContext::new(&single_triangle(CollocationScheme::Centroid)).unwrap();
        assert_eq!(ctx.collocation_count(), 1);
        let p = ctx.collocation_points[0];
        assert_relative_eq!(p[0], 1.0 / 3.0, max_relative = 1e-14);
        assert_relative_eq!(p[1], 1.0 / 3.0, max_relative = 1e-14);
        assert_relative_eq!(p[2], 0.0, epsilon = 1e-14);
        assert!(ctx.is_singular(0, 0));
        assert_eq!(ctx.singular_elements(0), &[0]);
    }

    #[test]
    fn nodal_collocation_is_shared() {
        let mut mesh = single_triangle(CollocationScheme::Nodal);
        mesh.nodes.push(Node {
            id: 4,
            coords: [1.0, 1.0, 0.0],
        });
        mesh.elements.push(Element {
            id: 2,
            type_index: 0,
            nodes: vec![2, 4, 3],
        });
        let ctx = MeshContext::new(&mesh).unwrap();
        // Four nodes, four shared collocation points.
        assert_eq!(ctx.collocation_count(), 4);
        // The shared edge nodes are singular on both elements.
        assert!(ctx.is_singular(0, 1));
        assert!(ctx.is_singular(1, 1));
        assert!(ctx.is_singular(0, 2));
        assert!(ctx.is_singular(1, 2));
        // The off-element corners are regular on the opposite element.
        assert!(ctx.is_singular(0, 0));
        assert!(!ctx.is_singular(1, 0));
        assert!(!ctx.is_singular(0, 3));
    }

    #[test]
    fn flat_triangle_geometry() {
        let ctx = MeshContext::new(&single_triangle(CollocationScheme::Centroid)).unwrap();
        let geometry = &ctx.regular_geometry[0];
        let tables = &ctx.regular_tables[0];
        for p in 0..tables.rule.npoints {
            // The Jacobian of the unit right triangle is 1 everywhere and the
            // normal is +z for counterclockwise circulation.
            assert_relative_eq!(geometry.jacobians[p], 1.0, max_relative = 1e-13);
            assert_relative_eq!(*geometry.normals.get([2, p]).unwrap(), 1.0, epsilon = 1e-13);
        }
        // Weighted Jacobians sum to the element area.
        let area: f64 = (0..tables.rule.npoints)
            .map(|p| tables.rule.weights[p] * geometry.jacobians[p])
            .sum();
        assert_relative_eq!(area, 0.5, max_relative = 1e-13);
    }

    #[test]
    fn line_element_normal() {
        let mesh = Mesh {
            nodes: vec![
                Node {
                    id: 1,
                    coords: [0.0, 0.0, 0.0],
                },
                Node {
                    id: 2,
                    coords: [2.0, 0.0, 0.0],
                },
            ],
            element_types: vec![
                ElementType::new(InterpolationSet::Line2, CollocationScheme::Nodal).unwrap(),
            ],
            elements: vec![Element {
                id: 1,
                type_index: 0,
                nodes: vec![1, 2],
            }],
        };
        let ctx = MeshContext::new(&mesh).unwrap();
        let geometry = &ctx.regular_geometry[0];
        for p in 0..ctx.regular_tables[0].rule.npoints {
            assert_relative_eq!(geometry.jacobians[p], 2.0, max_relative = 1e-14);
            assert_relative_eq!(*geometry.normals.get([0, p]).unwrap(), 0.0, epsilon = 1e-14);
            assert_relative_eq!(
                *geometry.normals.get([2, p]).unwrap(),
                -1.0,
                epsilon = 1e-14
            );
        }
    }

    #[test]
    fn mixed_dimension_is_rejected() {
        let mut mesh = single_triangle(CollocationScheme::Nodal);
        mesh.element_types
            .push(ElementType::new(InterpolationSet::Line2, CollocationScheme::Nodal).unwrap());
        assert!(matches!(
            MeshContext::new(&mesh),
            Err(BemError::InvalidMesh(_))
        ));
    }
}
