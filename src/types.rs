//! Types specific to elastobem

use rlst::{Array, BaseArray, VectorContainer};

/// An rlst dynamic array
pub type RlstArray<T, const DIM: usize> = Array<T, BaseArray<T, VectorContainer<T>, DIM>, DIM>;

/// Crate error type
#[derive(thiserror::Error, Debug)]
pub enum BemError {
    /// A singular-integration sample point coincides with its collocation
    /// point. The mesh is degenerate; the integral cannot be evaluated.
    #[error("An integration point coincides with the collocation point for singular integration.")]
    DegenerateGeometry,
    /// The fundamental solution name is not recognised.
    #[error("Unknown fundamental solution type '{0}'.")]
    UnknownKernel(String),
    /// Tabulated kernel data is inconsistent (non-monotonic grids or
    /// mismatched component shapes).
    #[error("Invalid kernel data: {0}")]
    InvalidKernelData(&'static str),
    /// A selection entry refers to a degree of freedom outside the model.
    #[error("Invalid selection: {0}")]
    InvalidSelection(&'static str),
    /// No quadrature rule with the requested number of points.
    #[error("No quadrature rule with the requested number of points.")]
    RuleNotFound,
    /// The mesh refers to an unknown node or element type.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(&'static str),
}

/// Result type
pub type Result<T> = std::result::Result<T, BemError>;

/// Component layout of a fundamental solution.
///
/// The layout fixes the number of local-frame kernel components and the number
/// of degrees of freedom per collocation point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelLayout {
    /// 2D out-of-plane (antiplane) motion: 1 displacement component, 2 stress
    /// components, 1 DOF per collocation point.
    OutOfPlane,
    /// 2D in-plane motion: 4 displacement components, 6 stress components,
    /// 2 DOF per collocation point.
    InPlane,
    /// 2.5D plane-harmonic motion on a 2D mesh: 9 displacement components,
    /// 18 stress components, 3 DOF per collocation point.
    PlaneHarmonic,
    /// 3D motion: 5 displacement components and 10 stress components in the
    /// local cylindrical frame, 3 DOF per collocation point.
    ThreeDimensional,
}

impl KernelLayout {
    /// Number of local-frame displacement components.
    pub fn displacement_components(&self) -> usize {
        match self {
            KernelLayout::OutOfPlane => 1,
            KernelLayout::InPlane => 4,
            KernelLayout::PlaneHarmonic => 9,
            KernelLayout::ThreeDimensional => 5,
        }
    }
    /// Number of local-frame stress components.
    pub fn traction_components(&self) -> usize {
        match self {
            KernelLayout::OutOfPlane => 2,
            KernelLayout::InPlane => 6,
            KernelLayout::PlaneHarmonic => 18,
            KernelLayout::ThreeDimensional => 10,
        }
    }
    /// Degrees of freedom per collocation point.
    pub fn dof(&self) -> usize {
        match self {
            KernelLayout::OutOfPlane => 1,
            KernelLayout::InPlane => 2,
            KernelLayout::PlaneHarmonic | KernelLayout::ThreeDimensional => 3,
        }
    }
    /// Geometric dimension of the meshes this layout applies to.
    pub fn mesh_dimension(&self) -> usize {
        match self {
            KernelLayout::ThreeDimensional => 3,
            _ => 2,
        }
    }
}

/// Real/imaginary presence flags of a fundamental solution.
///
/// A kernel may be purely real; imaginary output buffers are written only when
/// the corresponding flag is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Complexity {
    /// Displacement kernel has an imaginary part.
    pub ug: bool,
    /// Traction kernel has an imaginary part.
    pub tg: bool,
    /// Static (singular) traction part has an imaginary part.
    pub tg0: bool,
}
