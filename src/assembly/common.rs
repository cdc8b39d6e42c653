//! Shared state and helpers of the integration passes.

use crate::kernels::{FieldPoint, GreensFunction, KernelBatch};
use crate::mesh::ElementGeometry;
use crate::rotation::RotatedKernels;
use rlst::RandomAccessByRef;

/// Per-worker scratch buffers: one kernel batch and one rotated block,
/// reused across quadrature points.
pub(crate) struct Scratch {
    /// Local-frame kernel values.
    pub batch: KernelBatch,
    /// Rotated Cartesian blocks.
    pub rotated: RotatedKernels,
}

impl Scratch {
    pub(crate) fn new(kernel: &dyn GreensFunction) -> Self {
        Self {
            batch: KernelBatch::for_kernel(kernel),
            rotated: RotatedKernels::new(kernel.layout(), kernel.n_sets()),
        }
    }
}

/// Offset of a quadrature point from a collocation point, in the source's
/// local frame.
pub(crate) struct LocalOffset {
    /// Radial (2D: unsigned horizontal) offset.
    pub r: f64,
    /// Circumferential angle (3D only).
    pub theta: f64,
    /// Axial offset.
    pub z: f64,
    /// Sign of the horizontal offset (2D only; 1 for 3D).
    pub x_sign: f64,
}

impl LocalOffset {
    /// Exact coincidence of field and collocation point.
    pub(crate) fn is_coincident(&self) -> bool {
        self.r == 0.0 && self.z == 0.0
    }
}

/// Compute the local offset of quadrature point `p` from `coll_point`.
pub(crate) fn local_offset(
    dim: usize,
    geometry: &ElementGeometry,
    p: usize,
    coll_point: &[f64; 3],
) -> LocalOffset {
    let dx = *geometry.points.get([0, p]).unwrap() - coll_point[0];
    let dy = *geometry.points.get([1, p]).unwrap() - coll_point[1];
    let dz = *geometry.points.get([2, p]).unwrap() - coll_point[2];
    if dim == 3 {
        LocalOffset {
            r: (dx * dx + dy * dy).sqrt(),
            theta: dy.atan2(dx),
            z: dz,
            x_sign: 1.0,
        }
    } else {
        LocalOffset {
            r: dx.abs(),
            theta: 0.0,
            z: dz,
            x_sign: if dx == 0.0 { 1.0 } else { dx.signum() },
        }
    }
}

/// Unit outward normal at quadrature point `p`.
pub(crate) fn normal_at(geometry: &ElementGeometry, p: usize) -> [f64; 3] {
    [
        *geometry.normals.get([0, p]).unwrap(),
        *geometry.normals.get([1, p]).unwrap(),
        *geometry.normals.get([2, p]).unwrap(),
    ]
}

/// Evaluate the kernel at one field point, returning whether the provider
/// extrapolated.
pub(crate) fn evaluate_at(
    kernel: &dyn GreensFunction,
    point: FieldPoint,
    want_u: bool,
    want_t: bool,
    batch: &mut KernelBatch,
) -> bool {
    batch.extrapolated = false;
    kernel.evaluate(&point, want_u, want_t, batch);
    batch.extrapolated
}
