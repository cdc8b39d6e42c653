//! Static full-space fundamental solutions.
//!
//! These are the closed-form elastostatic solutions (Kelvin solutions) used
//! for the diagonal regularization and as kernels in their own right. They
//! are real, carry a single parameter set, and are their own static singular
//! part: `T0 = T`.

use crate::kernels::{FieldPoint, GreensFunction, KernelBatch};
use crate::types::{BemError, Complexity, KernelLayout, Result};

fn check_elastic_constants(e: f64, nu: f64) -> Result<()> {
    if !(e > 0.0) {
        return Err(BemError::InvalidKernelData(
            "Young's modulus must be positive.",
        ));
    }
    if !(-1.0 < nu && nu < 0.5) {
        return Err(BemError::InvalidKernelData(
            "Poisson's ratio must lie in (-1, 0.5).",
        ));
    }
    Ok(())
}

/// Static full-space solution of 3D elasticity.
pub struct Kelvin3d {
    mu: f64,
    nu: f64,
}

impl Kelvin3d {
    /// Create from Young's modulus and Poisson's ratio.
    pub fn new(e: f64, nu: f64) -> Result<Self> {
        check_elastic_constants(e, nu)?;
        Ok(Self {
            mu: 0.5 * e / (1.0 + nu),
            nu,
        })
    }
}

impl GreensFunction for Kelvin3d {
    fn layout(&self) -> KernelLayout {
        KernelLayout::ThreeDimensional
    }
    fn n_sets(&self) -> usize {
        1
    }
    fn complexity(&self) -> Complexity {
        Complexity::default()
    }

    fn evaluate(&self, point: &FieldPoint, want_u: bool, want_t: bool, out: &mut KernelBatch) {
        let nu = self.nu;
        let big_r = (point.r * point.r + point.z * point.z).sqrt();
        let gr = point.r / big_r;
        let gz = point.z / big_r;

        if want_u {
            let c = 1.0 / (16.0 * std::f64::consts::PI * self.mu * (1.0 - nu));
            let k = 3.0 - 4.0 * nu;
            out.u_re[0] = c * (k + gr * gr) / big_r;
            out.u_re[1] = c * k / big_r;
            out.u_re[2] = c * gr * gz / big_r;
            out.u_re[3] = c * gr * gz / big_r;
            out.u_re[4] = c * (k + gz * gz) / big_r;
        }
        if want_t {
            let d = 1.0 / (8.0 * std::f64::consts::PI * (1.0 - nu) * big_r * big_r);
            let k = 1.0 - 2.0 * nu;
            out.t_re[0] = -d * (k * gr + 3.0 * gr.powi(3));
            out.t_re[1] = d * k * gr;
            out.t_re[2] = d * (k * gr - 3.0 * gr * gz * gz);
            out.t_re[3] = -d * (k * gz + 3.0 * gr * gr * gz);
            out.t_re[4] = -d * k * gr;
            out.t_re[5] = -d * k * gz;
            out.t_re[6] = d * (k * gz - 3.0 * gr * gr * gz);
            out.t_re[7] = d * k * gz;
            out.t_re[8] = -d * (k * gz + 3.0 * gz.powi(3));
            out.t_re[9] = -d * (k * gr + 3.0 * gr * gz * gz);
            out.t0_re.copy_from_slice(&out.t_re);
        }
    }
}

/// Static full-space solution of 2D plane-strain elasticity.
pub struct KelvinInPlane {
    mu: f64,
    nu: f64,
}

impl KelvinInPlane {
    /// Create from Young's modulus and Poisson's ratio.
    pub fn new(e: f64, nu: f64) -> Result<Self> {
        check_elastic_constants(e, nu)?;
        Ok(Self {
            mu: 0.5 * e / (1.0 + nu),
            nu,
        })
    }
}

impl GreensFunction for KelvinInPlane {
    fn layout(&self) -> KernelLayout {
        KernelLayout::InPlane
    }
    fn n_sets(&self) -> usize {
        1
    }
    fn complexity(&self) -> Complexity {
        Complexity::default()
    }

    fn evaluate(&self, point: &FieldPoint, want_u: bool, want_t: bool, out: &mut KernelBatch) {
        let nu = self.nu;
        let big_r = (point.r * point.r + point.z * point.z).sqrt();
        let gx = point.r / big_r;
        let gz = point.z / big_r;

        if want_u {
            let c = 1.0 / (8.0 * std::f64::consts::PI * self.mu * (1.0 - nu));
            let k = 3.0 - 4.0 * nu;
            let lnr = big_r.ln();
            out.u_re[0] = c * (-k * lnr + gx * gx);
            out.u_re[1] = c * gx * gz;
            out.u_re[2] = c * gx * gz;
            out.u_re[3] = c * (-k * lnr + gz * gz);
        }
        if want_t {
            let d = 1.0 / (4.0 * std::f64::consts::PI * (1.0 - nu) * big_r);
            let k = 1.0 - 2.0 * nu;
            // Load x: sxx, szz, sxz.
            out.t_re[0] = -d * (k * gx + 2.0 * gx.powi(3));
            out.t_re[1] = d * (k * gx - 2.0 * gx * gz * gz);
            out.t_re[2] = -d * (k * gz + 2.0 * gx * gx * gz);
            // Load z: sxx, szz, sxz.
            out.t_re[3] = d * (k * gz - 2.0 * gx * gx * gz);
            out.t_re[4] = -d * (k * gz + 2.0 * gz.powi(3));
            out.t_re[5] = -d * (k * gx + 2.0 * gx * gz * gz);
            out.t0_re.copy_from_slice(&out.t_re);
        }
    }
}

/// Static full-space solution of antiplane (out-of-plane) elasticity.
pub struct Antiplane {
    mu: f64,
}

impl Antiplane {
    /// Create from the shear modulus.
    pub fn new(mu: f64) -> Result<Self> {
        if !(mu > 0.0) {
            return Err(BemError::InvalidKernelData(
                "The shear modulus must be positive.",
            ));
        }
        Ok(Self { mu })
    }
}

impl GreensFunction for Antiplane {
    fn layout(&self) -> KernelLayout {
        KernelLayout::OutOfPlane
    }
    fn n_sets(&self) -> usize {
        1
    }
    fn complexity(&self) -> Complexity {
        Complexity::default()
    }

    fn evaluate(&self, point: &FieldPoint, want_u: bool, want_t: bool, out: &mut KernelBatch) {
        let big_r = (point.r * point.r + point.z * point.z).sqrt();
        if want_u {
            out.u_re[0] = -big_r.ln() / (2.0 * std::f64::consts::PI * self.mu);
        }
        if want_t {
            let d = 1.0 / (2.0 * std::f64::consts::PI * big_r);
            out.t_re[0] = -d * point.r / big_r;
            out.t_re[1] = -d * point.z / big_r;
            out.t0_re.copy_from_slice(&out.t_re);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn kelvin3d_reciprocity() {
        // The displacement kernel is symmetric in load and displacement
        // direction: the mixed radial-axial components coincide.
        let kernel = Kelvin3d::new(3.0e7, 0.3).unwrap();
        let mut batch = KernelBatch::for_kernel(&kernel);
        let point = FieldPoint {
            r: 0.7,
            z: -0.4,
            source_z: 0.0,
        };
        kernel.evaluate(&point, true, true, &mut batch);
        assert_relative_eq!(batch.u_re[2], batch.u_re[3], max_relative = 1e-14);
    }

    #[test]
    fn kelvin3d_decays_with_distance() {
        let kernel = Kelvin3d::new(3.0e7, 0.3).unwrap();
        let mut near = KernelBatch::for_kernel(&kernel);
        let mut far = KernelBatch::for_kernel(&kernel);
        kernel.evaluate(
            &FieldPoint {
                r: 1.0,
                z: 0.0,
                source_z: 0.0,
            },
            true,
            true,
            &mut near,
        );
        kernel.evaluate(
            &FieldPoint {
                r: 2.0,
                z: 0.0,
                source_z: 0.0,
            },
            true,
            true,
            &mut far,
        );
        // Displacements decay as 1/R, stresses as 1/R^2.
        assert_relative_eq!(near.u_re[0], 2.0 * far.u_re[0], max_relative = 1e-13);
        assert_relative_eq!(near.t_re[0], 4.0 * far.t_re[0], max_relative = 1e-13);
    }

    #[test]
    fn static_kernels_equal_their_singular_part() {
        let kernel = Kelvin3d::new(3.0e7, 0.25).unwrap();
        let mut batch = KernelBatch::for_kernel(&kernel);
        kernel.evaluate(
            &FieldPoint {
                r: 0.3,
                z: 0.8,
                source_z: 0.0,
            },
            false,
            true,
            &mut batch,
        );
        assert_eq!(batch.t_re, batch.t0_re);
    }

    #[test]
    fn antiplane_matches_the_logarithmic_potential() {
        let mu = 5.0e6;
        let kernel = Antiplane::new(mu).unwrap();
        let mut batch = KernelBatch::for_kernel(&kernel);
        kernel.evaluate(
            &FieldPoint {
                r: 2.0,
                z: 0.0,
                source_z: 0.0,
            },
            true,
            true,
            &mut batch,
        );
        assert_relative_eq!(
            batch.u_re[0],
            -(2.0f64).ln() / (2.0 * std::f64::consts::PI * mu),
            max_relative = 1e-14
        );
        assert_relative_eq!(
            batch.t_re[0],
            -1.0 / (2.0 * std::f64::consts::PI * 2.0),
            max_relative = 1e-14
        );
    }

    #[test]
    fn invalid_constants_are_rejected() {
        assert!(Kelvin3d::new(-1.0, 0.3).is_err());
        assert!(Kelvin3d::new(1.0e7, 0.5).is_err());
        assert!(Antiplane::new(0.0).is_err());
    }
}
