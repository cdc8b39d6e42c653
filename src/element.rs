//! Element types and interpolation.
//!
//! Element behaviour (shape family, interpolation basis, collocation scheme,
//! quadrature parameters) is described by a closed set of descriptors carrying
//! their data by value. The interpolation sets cover straight and curved line
//! elements for 2D meshes and triangles and quadrilaterals for 3D meshes.

use crate::types::{BemError, Result, RlstArray};
use rlst::{rlst_dynamic_array2, rlst_dynamic_array3, RandomAccessMut};

/// Parent shape family of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeFamily {
    /// Line element on a 2D boundary.
    Line,
    /// Triangular surface element.
    Triangle,
    /// Quadrilateral surface element.
    Quadrilateral,
}

impl ShapeFamily {
    /// Dimension of the reference domain.
    pub fn reference_dim(&self) -> usize {
        match self {
            ShapeFamily::Line => 1,
            _ => 2,
        }
    }

    /// Centre of the reference domain, used for centroid collocation.
    pub fn reference_centre(&self) -> [f64; 2] {
        match self {
            ShapeFamily::Line => [0.5, 0.0],
            ShapeFamily::Triangle => [1.0 / 3.0, 1.0 / 3.0],
            ShapeFamily::Quadrilateral => [0.5, 0.5],
        }
    }
}

/// An interpolation basis on a reference domain.
///
/// Line elements live on [0, 1], triangles on the unit reference triangle and
/// quadrilaterals on [0, 1]^2. `Constant` is the single-function basis used
/// for centroid collocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterpolationSet {
    /// Linear line element, nodes at the end points.
    Line2,
    /// Quadratic line element, end nodes then the midpoint.
    Line3,
    /// Linear triangle.
    Tri3,
    /// Quadratic triangle, corner nodes then midside nodes.
    Tri6,
    /// Bilinear quadrilateral, corners in circulation order.
    Quad4,
    /// Serendipity quadrilateral, corners then midsides.
    Quad8,
    /// Single constant function.
    Constant,
}

impl InterpolationSet {
    /// Number of basis functions (= nodes for the nodal sets).
    pub fn basis_count(&self) -> usize {
        match self {
            InterpolationSet::Line2 => 2,
            InterpolationSet::Line3 => 3,
            InterpolationSet::Tri3 => 3,
            InterpolationSet::Tri6 => 6,
            InterpolationSet::Quad4 => 4,
            InterpolationSet::Quad8 => 8,
            InterpolationSet::Constant => 1,
        }
    }

    /// Evaluate all basis functions at a reference point.
    pub fn evaluate(&self, xi: &[f64], values: &mut [f64]) {
        match self {
            InterpolationSet::Line2 => {
                values[0] = 1.0 - xi[0];
                values[1] = xi[0];
            }
            InterpolationSet::Line3 => {
                let x = xi[0];
                values[0] = (1.0 - x) * (1.0 - 2.0 * x);
                values[1] = x * (2.0 * x - 1.0);
                values[2] = 4.0 * x * (1.0 - x);
            }
            InterpolationSet::Tri3 => {
                values[0] = 1.0 - xi[0] - xi[1];
                values[1] = xi[0];
                values[2] = xi[1];
            }
            InterpolationSet::Tri6 => {
                let l = 1.0 - xi[0] - xi[1];
                let (x, y) = (xi[0], xi[1]);
                values[0] = l * (2.0 * l - 1.0);
                values[1] = x * (2.0 * x - 1.0);
                values[2] = y * (2.0 * y - 1.0);
                values[3] = 4.0 * x * l;
                values[4] = 4.0 * x * y;
                values[5] = 4.0 * y * l;
            }
            InterpolationSet::Quad4 => {
                let (x, y) = (xi[0], xi[1]);
                values[0] = (1.0 - x) * (1.0 - y);
                values[1] = x * (1.0 - y);
                values[2] = x * y;
                values[3] = (1.0 - x) * y;
            }
            InterpolationSet::Quad8 => {
                let a = 2.0 * xi[0] - 1.0;
                let b = 2.0 * xi[1] - 1.0;
                for (i, (ai, bi)) in CORNERS.iter().enumerate() {
                    values[i] = 0.25 * (1.0 + a * ai) * (1.0 + b * bi) * (a * ai + b * bi - 1.0);
                }
                values[4] = 0.5 * (1.0 - a * a) * (1.0 - b);
                values[5] = 0.5 * (1.0 + a) * (1.0 - b * b);
                values[6] = 0.5 * (1.0 - a * a) * (1.0 + b);
                values[7] = 0.5 * (1.0 - a) * (1.0 - b * b);
            }
            InterpolationSet::Constant => {
                values[0] = 1.0;
            }
        }
    }

    /// Evaluate all basis derivatives at a reference point.
    ///
    /// `derivs` holds, per basis function, the derivatives with respect to
    /// each reference coordinate: `derivs[dim * i + d]`.
    pub fn evaluate_derivs(&self, xi: &[f64], derivs: &mut [f64]) {
        match self {
            InterpolationSet::Line2 => {
                derivs[0] = -1.0;
                derivs[1] = 1.0;
            }
            InterpolationSet::Line3 => {
                let x = xi[0];
                derivs[0] = 4.0 * x - 3.0;
                derivs[1] = 4.0 * x - 1.0;
                derivs[2] = 4.0 - 8.0 * x;
            }
            InterpolationSet::Tri3 => {
                derivs[0] = -1.0;
                derivs[1] = -1.0;
                derivs[2] = 1.0;
                derivs[3] = 0.0;
                derivs[4] = 0.0;
                derivs[5] = 1.0;
            }
            InterpolationSet::Tri6 => {
                let l = 1.0 - xi[0] - xi[1];
                let (x, y) = (xi[0], xi[1]);
                derivs[0] = 1.0 - 4.0 * l;
                derivs[1] = 1.0 - 4.0 * l;
                derivs[2] = 4.0 * x - 1.0;
                derivs[3] = 0.0;
                derivs[4] = 0.0;
                derivs[5] = 4.0 * y - 1.0;
                derivs[6] = 4.0 * (l - x);
                derivs[7] = -4.0 * x;
                derivs[8] = 4.0 * y;
                derivs[9] = 4.0 * x;
                derivs[10] = -4.0 * y;
                derivs[11] = 4.0 * (l - y);
            }
            InterpolationSet::Quad4 => {
                let (x, y) = (xi[0], xi[1]);
                derivs[0] = y - 1.0;
                derivs[1] = x - 1.0;
                derivs[2] = 1.0 - y;
                derivs[3] = -x;
                derivs[4] = y;
                derivs[5] = x;
                derivs[6] = -y;
                derivs[7] = 1.0 - x;
            }
            InterpolationSet::Quad8 => {
                let a = 2.0 * xi[0] - 1.0;
                let b = 2.0 * xi[1] - 1.0;
                // Derivatives with respect to (a, b), scaled by d a / d xi = 2.
                for (i, (ai, bi)) in CORNERS.iter().enumerate() {
                    derivs[2 * i] =
                        2.0 * 0.25 * ai * (1.0 + b * bi) * (2.0 * a * ai + b * bi);
                    derivs[2 * i + 1] =
                        2.0 * 0.25 * bi * (1.0 + a * ai) * (a * ai + 2.0 * b * bi);
                }
                derivs[8] = 2.0 * (-a) * (1.0 - b);
                derivs[9] = 2.0 * (-0.5) * (1.0 - a * a);
                derivs[10] = 2.0 * 0.5 * (1.0 - b * b);
                derivs[11] = 2.0 * (-b) * (1.0 + a);
                derivs[12] = 2.0 * (-a) * (1.0 + b);
                derivs[13] = 2.0 * 0.5 * (1.0 - a * a);
                derivs[14] = 2.0 * (-0.5) * (1.0 - b * b);
                derivs[15] = 2.0 * (-b) * (1.0 - a);
            }
            InterpolationSet::Constant => {
                for d in derivs.iter_mut() {
                    *d = 0.0;
                }
            }
        }
    }

    /// Tabulate all basis functions at a set of reference points.
    ///
    /// The result has shape `[basis_count, npoints]`.
    pub fn tabulate(&self, points: &[f64], dim: usize) -> RlstArray<f64, 2> {
        let npoints = points.len() / dim;
        let nbasis = self.basis_count();
        let mut table = rlst_dynamic_array2!(f64, [nbasis, npoints]);
        let mut values = vec![0.0; nbasis];
        for p in 0..npoints {
            self.evaluate(&points[dim * p..dim * (p + 1)], &mut values);
            for (b, v) in values.iter().enumerate() {
                *table.get_mut([b, p]).unwrap() = *v;
            }
        }
        table
    }

    /// Tabulate all basis derivatives at a set of reference points.
    ///
    /// The result has shape `[basis_count, npoints, dim]`.
    pub fn tabulate_derivs(&self, points: &[f64], dim: usize) -> RlstArray<f64, 3> {
        let npoints = points.len() / dim;
        let nbasis = self.basis_count();
        let mut table = rlst_dynamic_array3!(f64, [nbasis, npoints, dim]);
        let mut derivs = vec![0.0; nbasis * dim];
        for p in 0..npoints {
            self.evaluate_derivs(&points[dim * p..dim * (p + 1)], &mut derivs);
            for b in 0..nbasis {
                for d in 0..dim {
                    *table.get_mut([b, p, d]).unwrap() = derivs[dim * b + d];
                }
            }
        }
        table
    }
}

/// Corner signs of the serendipity quadrilateral in (a, b) = 2 xi - 1.
const CORNERS: [(f64, f64); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

/// Placement of collocation points on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollocationScheme {
    /// One collocation point per node, shared between adjacent elements.
    Nodal,
    /// A single collocation point at the element centre.
    Centroid,
}

/// An element type: interpolation set, collocation scheme and quadrature
/// parameters for the regular and the singular integration scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementType {
    /// Geometry interpolation basis.
    pub shape: InterpolationSet,
    /// Collocation scheme.
    pub collocation: CollocationScheme,
    /// Gauss order of the regular scheme.
    pub n_gauss: usize,
    /// Subdivisions of the regular scheme (line/quadrilateral only).
    pub n_div: usize,
    /// Gauss order of the singular scheme.
    pub n_gauss_sing: usize,
    /// Subdivisions of the singular scheme.
    pub n_div_sing: usize,
}

impl ElementType {
    /// Element type with the default quadrature parameters of its family.
    pub fn new(shape: InterpolationSet, collocation: CollocationScheme) -> Result<Self> {
        let (n_gauss, n_div, n_gauss_sing, n_div_sing) = match shape.family()? {
            ShapeFamily::Line => (6, 1, 6, 2),
            ShapeFamily::Triangle => (7, 1, 6, 2),
            ShapeFamily::Quadrilateral => (6, 1, 4, 3),
        };
        Ok(Self {
            shape,
            collocation,
            n_gauss,
            n_div,
            n_gauss_sing,
            n_div_sing,
        })
    }

    /// Set the regular quadrature parameters.
    pub fn with_regular_quadrature(mut self, n_gauss: usize, n_div: usize) -> Self {
        self.n_gauss = n_gauss;
        self.n_div = n_div;
        self
    }

    /// Set the singular quadrature parameters.
    pub fn with_singular_quadrature(mut self, n_gauss: usize, n_div: usize) -> Self {
        self.n_gauss_sing = n_gauss;
        self.n_div_sing = n_div;
        self
    }

    /// Parent shape family.
    pub fn family(&self) -> ShapeFamily {
        self.shape.family().unwrap()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.shape.basis_count()
    }

    /// Number of collocation points.
    pub fn collocation_count(&self) -> usize {
        match self.collocation {
            CollocationScheme::Nodal => self.node_count(),
            CollocationScheme::Centroid => 1,
        }
    }

    /// Basis interpolating the boundary unknowns between collocation points.
    pub fn collocation_basis(&self) -> InterpolationSet {
        match self.collocation {
            CollocationScheme::Nodal => self.shape,
            CollocationScheme::Centroid => InterpolationSet::Constant,
        }
    }

    /// Geometric dimension of the problem this element belongs to.
    pub fn mesh_dimension(&self) -> usize {
        match self.family() {
            ShapeFamily::Line => 2,
            _ => 3,
        }
    }
}

impl InterpolationSet {
    /// Shape family of a geometry basis. `Constant` has no family.
    pub fn family(&self) -> Result<ShapeFamily> {
        match self {
            InterpolationSet::Line2 | InterpolationSet::Line3 => Ok(ShapeFamily::Line),
            InterpolationSet::Tri3 | InterpolationSet::Tri6 => Ok(ShapeFamily::Triangle),
            InterpolationSet::Quad4 | InterpolationSet::Quad8 => Ok(ShapeFamily::Quadrilateral),
            InterpolationSet::Constant => Err(BemError::InvalidMesh(
                "The constant basis does not define an element geometry.",
            )),
        }
    }

    /// Reference coordinates of the interpolation nodes.
    pub fn node_coordinates(&self) -> Vec<[f64; 2]> {
        match self {
            InterpolationSet::Line2 => vec![[0.0, 0.0], [1.0, 0.0]],
            InterpolationSet::Line3 => vec![[0.0, 0.0], [1.0, 0.0], [0.5, 0.0]],
            InterpolationSet::Tri3 => vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            InterpolationSet::Tri6 => vec![
                [0.0, 0.0],
                [1.0, 0.0],
                [0.0, 1.0],
                [0.5, 0.0],
                [0.5, 0.5],
                [0.0, 0.5],
            ],
            InterpolationSet::Quad4 => vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            InterpolationSet::Quad8 => vec![
                [0.0, 0.0],
                [1.0, 0.0],
                [1.0, 1.0],
                [0.0, 1.0],
                [0.5, 0.0],
                [1.0, 0.5],
                [0.5, 1.0],
                [0.0, 0.5],
            ],
            InterpolationSet::Constant => vec![],
        }
    }
}
