//! Fundamental solutions (Green's functions).
//!
//! A fundamental solution is consumed through the [`GreensFunction`]
//! capability: it reports its component [`KernelLayout`], the number of
//! parameter sets it carries (frequencies, time steps or load cases) and its
//! real/imaginary [`Complexity`] flags, and fills a [`KernelBatch`] with
//! local-frame components at a given source-receiver offset. The engine
//! rotates those components into the global frame (see [`crate::rotation`])
//! and never interprets them otherwise.
//!
//! Local component conventions:
//!
//! - `ThreeDimensional` displacements `[ur_h, ut_h, uz_h, ur_v, uz_v]`: the
//!   cos/sin azimuthal amplitudes of the radial, circumferential and axial
//!   displacement for a horizontal (`_h`) unit load and the axisymmetric
//!   radial and axial displacement for a vertical (`_v`) unit load. Stresses
//!   `[srr_h, stt_h, szz_h, srz_h, srt_h, stz_h, srr_v, stt_v, szz_v,
//!   srz_v]` are the matching cylindrical stress amplitudes.
//! - `InPlane` displacements `[uxx, uxz, uzx, uzz]` (load, displacement) and
//!   stresses `[sxx_x, szz_x, sxz_x, sxx_z, szz_z, sxz_z]`, evaluated at the
//!   unsigned horizontal offset; mirror signs are applied during rotation.
//! - `OutOfPlane` displacement `[uyy]` and stresses `[syx, syz]`.
//! - `PlaneHarmonic` displacements `[uxx .. uzz]` (9, row-major in load and
//!   displacement direction) and stresses, per load direction,
//!   `[sxx, syy, szz, sxy, syz, szx]`.

pub mod kelvin;
pub mod tabulated;

use crate::types::{BemError, Complexity, KernelLayout, Result};

/// Offset between a collocation (source) point and a field point, in the
/// local frame of the source: unsigned radial offset, axial offset, and the
/// absolute vertical coordinate of the source (used by tabulated solutions
/// for layered media).
#[derive(Debug, Clone, Copy)]
pub struct FieldPoint {
    /// Radial offset, `>= 0`.
    pub r: f64,
    /// Axial offset (field minus source).
    pub z: f64,
    /// Vertical coordinate of the source point.
    pub source_z: f64,
}

/// Local-frame kernel values at one field point, replicated over all
/// parameter sets. Components are stored set by set:
/// `u_re[n_components * set + component]`. Imaginary buffers exist only for
/// the parts whose complexity flag is set; a purely real kernel allocates
/// none.
pub struct KernelBatch {
    /// Component layout.
    pub layout: KernelLayout,
    /// Number of parameter sets.
    pub n_sets: usize,
    /// Complexity flags of the provider that fills this batch.
    pub complexity: Complexity,
    /// Displacement kernel, real parts.
    pub u_re: Vec<f64>,
    /// Displacement kernel, imaginary parts (empty unless `complexity.ug`).
    pub u_im: Vec<f64>,
    /// Traction kernel, real parts.
    pub t_re: Vec<f64>,
    /// Traction kernel, imaginary parts (empty unless `complexity.tg`).
    pub t_im: Vec<f64>,
    /// Static singular part of the traction kernel, real parts.
    pub t0_re: Vec<f64>,
    /// Static singular part, imaginary parts (empty unless `complexity.tg0`).
    pub t0_im: Vec<f64>,
    /// Set when the provider had to extrapolate beyond its tabulated range.
    pub extrapolated: bool,
}

impl KernelBatch {
    /// Allocate a zeroed batch for a provider.
    pub fn for_kernel(kernel: &dyn GreensFunction) -> Self {
        Self::new(kernel.layout(), kernel.n_sets(), kernel.complexity())
    }

    /// Allocate a zeroed batch for a layout, set count and complexity.
    pub fn new(layout: KernelLayout, n_sets: usize, complexity: Complexity) -> Self {
        let nu = layout.displacement_components() * n_sets;
        let nt = layout.traction_components() * n_sets;
        Self {
            layout,
            n_sets,
            complexity,
            u_re: vec![0.0; nu],
            u_im: vec![0.0; if complexity.ug { nu } else { 0 }],
            t_re: vec![0.0; nt],
            t_im: vec![0.0; if complexity.tg { nt } else { 0 }],
            t0_re: vec![0.0; nt],
            t0_im: vec![0.0; if complexity.tg0 { nt } else { 0 }],
            extrapolated: false,
        }
    }
}

/// A parameterized fundamental solution of the elastodynamic equations.
pub trait GreensFunction: Sync {
    /// Component layout.
    fn layout(&self) -> KernelLayout;
    /// Number of parameter sets evaluated per call.
    fn n_sets(&self) -> usize;
    /// Real/imaginary presence flags.
    fn complexity(&self) -> Complexity;
    /// Evaluate the local-frame kernels at one field point, writing all
    /// parameter sets into `out`. `want_u` and `want_t` mirror the engine's
    /// output-enable flags; a provider may skip the disabled parts.
    fn evaluate(&self, point: &FieldPoint, want_u: bool, want_t: bool, out: &mut KernelBatch);
}

/// Construct a built-in fundamental solution from its name.
///
/// Matching is case-insensitive. The closed set of built-in solutions covers
/// the static full-space variants; dynamic and layered-media solutions enter
/// through [`tabulated::TabulatedGreensFunction`].
pub fn from_name(name: &str, params: &[f64]) -> Result<Box<dyn GreensFunction>> {
    if name.eq_ignore_ascii_case("fsgreen3d0") {
        if params.len() != 2 {
            return Err(BemError::InvalidKernelData(
                "'fsgreen3d0' takes the parameters E and nu.",
            ));
        }
        Ok(Box::new(kelvin::Kelvin3d::new(params[0], params[1])?))
    } else if name.eq_ignore_ascii_case("fsgreen2d_inplane0") {
        if params.len() != 2 {
            return Err(BemError::InvalidKernelData(
                "'fsgreen2d_inplane0' takes the parameters E and nu.",
            ));
        }
        Ok(Box::new(kelvin::KelvinInPlane::new(params[0], params[1])?))
    } else if name.eq_ignore_ascii_case("fsgreen2d_outofplane0") {
        if params.len() != 1 {
            return Err(BemError::InvalidKernelData(
                "'fsgreen2d_outofplane0' takes the parameter mu.",
            ));
        }
        Ok(Box::new(kelvin::Antiplane::new(params[0])?))
    } else {
        Err(BemError::UnknownKernel(name.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_name_is_case_insensitive() {
        assert!(from_name("FsGreen3D0", &[1.0e7, 0.25]).is_ok());
        assert!(from_name("fsgreen2d_OUTOFPLANE0", &[5.0e6]).is_ok());
    }

    #[test]
    fn unknown_names_are_fatal() {
        assert!(matches!(
            from_name("fsgreen4d", &[]),
            Err(BemError::UnknownKernel(_))
        ));
    }

    #[test]
    fn parameter_counts_are_validated() {
        assert!(from_name("fsgreen3d0", &[1.0]).is_err());
        assert!(from_name("fsgreen2d_outofplane0", &[1.0, 2.0]).is_err());
    }
}
