//! Rotation of local-frame kernels into the global Cartesian frame.
//!
//! Providers return kernel components in the local frame of the source point
//! (see [`crate::kernels`]); the integrators need the Cartesian tensor blocks
//! contracted with the field point's outward normal. [`rotate`] performs that
//! transformation for every parameter set of a batch. It is a pure function
//! of its inputs and writes only into the caller-supplied buffers.

use crate::kernels::KernelBatch;
use crate::types::KernelLayout;

/// Cartesian kernel blocks at one field point: a `dof x dof` displacement
/// block and, when tractions are requested, the traction block and the
/// rotated static singular part. Components are stored set by set, row-major
/// in (load direction, component): `u_re[dof * dof * set + dof * k + i]`.
pub struct RotatedKernels {
    /// Degrees of freedom per collocation point.
    pub dof: usize,
    /// Number of parameter sets.
    pub n_sets: usize,
    /// Displacement block, real parts.
    pub u_re: Vec<f64>,
    /// Displacement block, imaginary parts.
    pub u_im: Vec<f64>,
    /// Traction block, real parts.
    pub t_re: Vec<f64>,
    /// Traction block, imaginary parts.
    pub t_im: Vec<f64>,
    /// Rotated static singular part, real parts.
    pub t0_re: Vec<f64>,
    /// Rotated static singular part, imaginary parts.
    pub t0_im: Vec<f64>,
}

impl RotatedKernels {
    /// Allocate zeroed blocks for a layout and set count.
    pub fn new(layout: KernelLayout, n_sets: usize) -> Self {
        let n = layout.dof() * layout.dof() * n_sets;
        Self {
            dof: layout.dof(),
            n_sets,
            u_re: vec![0.0; n],
            u_im: vec![0.0; n],
            t_re: vec![0.0; n],
            t_im: vec![0.0; n],
            t0_re: vec![0.0; n],
            t0_im: vec![0.0; n],
        }
    }
}

/// Rotate one batch of local-frame kernels into the global frame.
///
/// `normal` is the unit outward normal at the field point, `theta` the
/// circumferential angle of the field point about the source (3D layouts),
/// and `x_sign` the sign of the horizontal offset (2D layouts; the kernels
/// are tabulated for non-negative offsets and mirrored here). Calling this
/// twice with the same inputs writes the same values: the rotation is
/// idempotent with respect to its output buffers.
pub fn rotate(
    batch: &KernelBatch,
    normal: [f64; 3],
    theta: f64,
    x_sign: f64,
    want_u: bool,
    want_t: bool,
    out: &mut RotatedKernels,
) {
    let layout = batch.layout;
    let nu = layout.displacement_components();
    let nt = layout.traction_components();
    let nd = layout.dof() * layout.dof();
    for set in 0..batch.n_sets {
        if want_u {
            rotate_u(
                layout,
                &batch.u_re[nu * set..nu * (set + 1)],
                theta,
                x_sign,
                &mut out.u_re[nd * set..nd * (set + 1)],
            );
            if batch.complexity.ug {
                rotate_u(
                    layout,
                    &batch.u_im[nu * set..nu * (set + 1)],
                    theta,
                    x_sign,
                    &mut out.u_im[nd * set..nd * (set + 1)],
                );
            }
        }
        if want_t {
            rotate_t(
                layout,
                &batch.t_re[nt * set..nt * (set + 1)],
                normal,
                theta,
                x_sign,
                &mut out.t_re[nd * set..nd * (set + 1)],
            );
            rotate_t(
                layout,
                &batch.t0_re[nt * set..nt * (set + 1)],
                normal,
                theta,
                x_sign,
                &mut out.t0_re[nd * set..nd * (set + 1)],
            );
            if batch.complexity.tg {
                rotate_t(
                    layout,
                    &batch.t_im[nt * set..nt * (set + 1)],
                    normal,
                    theta,
                    x_sign,
                    &mut out.t_im[nd * set..nd * (set + 1)],
                );
            }
            if batch.complexity.tg0 {
                rotate_t(
                    layout,
                    &batch.t0_im[nt * set..nt * (set + 1)],
                    normal,
                    theta,
                    x_sign,
                    &mut out.t0_im[nd * set..nd * (set + 1)],
                );
            }
        }
    }
}

fn rotate_u(layout: KernelLayout, local: &[f64], theta: f64, x_sign: f64, out: &mut [f64]) {
    match layout {
        KernelLayout::OutOfPlane => {
            out[0] = local[0];
        }
        KernelLayout::InPlane => {
            out[0] = local[0];
            out[1] = x_sign * local[1];
            out[2] = x_sign * local[2];
            out[3] = local[3];
        }
        KernelLayout::PlaneHarmonic => {
            // Components with an odd number of x-indices change sign under
            // the horizontal mirror.
            for (i, sign) in MIRROR_U9.iter().enumerate() {
                out[i] = if *sign { x_sign * local[i] } else { local[i] };
            }
        }
        KernelLayout::ThreeDimensional => {
            let (s, c) = theta.sin_cos();
            let (ur_h, ut_h, uz_h, ur_v, uz_v) =
                (local[0], local[1], local[2], local[3], local[4]);
            out[0] = ur_h * c * c + ut_h * s * s;
            out[1] = (ur_h - ut_h) * s * c;
            out[2] = uz_h * c;
            out[3] = (ur_h - ut_h) * s * c;
            out[4] = ur_h * s * s + ut_h * c * c;
            out[5] = uz_h * s;
            out[6] = ur_v * c;
            out[7] = ur_v * s;
            out[8] = uz_v;
        }
    }
}

/// Mirror parities of the nine plane-harmonic displacement components.
const MIRROR_U9: [bool; 9] = [
    false, true, true, // load x: xx, xy, xz
    true, false, false, // load y: yx, yy, yz
    true, false, false, // load z: zx, zy, zz
];

fn rotate_t(
    layout: KernelLayout,
    local: &[f64],
    normal: [f64; 3],
    theta: f64,
    x_sign: f64,
    out: &mut [f64],
) {
    match layout {
        KernelLayout::OutOfPlane => {
            out[0] = x_sign * local[0] * normal[0] + local[1] * normal[2];
        }
        KernelLayout::InPlane => {
            let (nx, nz) = (normal[0], normal[2]);
            // Load x: sxx and szz are odd under the mirror, sxz is even.
            out[0] = x_sign * local[0] * nx + local[2] * nz;
            out[1] = local[2] * nx + x_sign * local[1] * nz;
            // Load z: sxz is odd, sxx and szz are even.
            out[2] = local[3] * nx + x_sign * local[5] * nz;
            out[3] = x_sign * local[5] * nx + local[4] * nz;
        }
        KernelLayout::PlaneHarmonic => {
            let (nx, nz) = (normal[0], normal[2]);
            for k in 0..3 {
                let s = &local[6 * k..6 * (k + 1)];
                // Component order per load: sxx, syy, szz, sxy, syz, szx.
                // Mirror parity: odd iff the total count of x-indices
                // (including the load direction) is odd.
                let lx = k == 0;
                let m = |odd_without_load: bool| -> f64 {
                    if odd_without_load != lx {
                        x_sign
                    } else {
                        1.0
                    }
                };
                let sxx = m(false) * s[0];
                let szz = m(false) * s[2];
                let sxy = m(true) * s[3];
                let syz = m(false) * s[4];
                let szx = m(true) * s[5];
                out[3 * k] = sxx * nx + szx * nz;
                out[3 * k + 1] = sxy * nx + syz * nz;
                out[3 * k + 2] = szx * nx + szz * nz;
            }
        }
        KernelLayout::ThreeDimensional => {
            let (s, c) = theta.sin_cos();
            for k in 0..3 {
                // Cylindrical stress tensor for load direction k at angle
                // theta, from the harmonic amplitudes.
                let (srr, stt, szz, srz, srt, stz) = match k {
                    0 => (
                        local[0] * c,
                        local[1] * c,
                        local[2] * c,
                        local[3] * c,
                        -local[4] * s,
                        -local[5] * s,
                    ),
                    1 => (
                        local[0] * s,
                        local[1] * s,
                        local[2] * s,
                        local[3] * s,
                        local[4] * c,
                        local[5] * c,
                    ),
                    _ => (local[6], local[7], local[8], local[9], 0.0, 0.0),
                };
                // Rotate to Cartesian components.
                let sxx = c * c * srr - 2.0 * c * s * srt + s * s * stt;
                let syy = s * s * srr + 2.0 * c * s * srt + c * c * stt;
                let sxy = c * s * (srr - stt) + (c * c - s * s) * srt;
                let sxz = c * srz - s * stz;
                let syz = s * srz + c * stz;
                // Contract with the outward normal.
                out[3 * k] = sxx * normal[0] + sxy * normal[1] + sxz * normal[2];
                out[3 * k + 1] = sxy * normal[0] + syy * normal[1] + syz * normal[2];
                out[3 * k + 2] = sxz * normal[0] + syz * normal[1] + szz * normal[2];
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kernels::kelvin::{Kelvin3d, KelvinInPlane};
    use crate::kernels::{FieldPoint, GreensFunction, KernelBatch};
    use approx::assert_relative_eq;

    /// Direct Cartesian Kelvin displacement: u[3k + i] for a unit load in
    /// direction k.
    fn kelvin3d_u_cartesian(dx: [f64; 3], mu: f64, nu: f64) -> [f64; 9] {
        let r = (dx[0] * dx[0] + dx[1] * dx[1] + dx[2] * dx[2]).sqrt();
        let g = [dx[0] / r, dx[1] / r, dx[2] / r];
        let c = 1.0 / (16.0 * std::f64::consts::PI * mu * (1.0 - nu));
        let mut u = [0.0; 9];
        for k in 0..3 {
            for i in 0..3 {
                let delta = if i == k { 3.0 - 4.0 * nu } else { 0.0 };
                u[3 * k + i] = c * (delta + g[i] * g[k]) / r;
            }
        }
        u
    }

    /// Direct Cartesian Kelvin traction: t[3k + i] = sigma_ij^k n_j.
    fn kelvin3d_t_cartesian(dx: [f64; 3], n: [f64; 3], nu: f64) -> [f64; 9] {
        let r = (dx[0] * dx[0] + dx[1] * dx[1] + dx[2] * dx[2]).sqrt();
        let g = [dx[0] / r, dx[1] / r, dx[2] / r];
        let d = 1.0 / (8.0 * std::f64::consts::PI * (1.0 - nu) * r * r);
        let k2 = 1.0 - 2.0 * nu;
        let mut t = [0.0; 9];
        for k in 0..3 {
            for i in 0..3 {
                for j in 0..3 {
                    let mut sigma = 3.0 * g[i] * g[j] * g[k];
                    if i == k {
                        sigma += k2 * g[j];
                    }
                    if j == k {
                        sigma += k2 * g[i];
                    }
                    if i == j {
                        sigma -= k2 * g[k];
                    }
                    t[3 * k + i] += -d * sigma * n[j];
                }
            }
        }
        t
    }

    #[test]
    fn three_d_rotation_reproduces_the_cartesian_kelvin_tensor() {
        let (e, nu) = (3.0e7, 0.3);
        let kernel = Kelvin3d::new(e, nu).unwrap();
        let mu = 0.5 * e / (1.0 + nu);
        let offsets: [[f64; 3]; 4] = [
            [0.3, 0.0, 0.5],
            [-0.2, 0.4, -0.7],
            [0.6, -0.6, 0.1],
            [0.0, 0.8, -0.3],
        ];
        let normals = [
            [0.0, 0.0, 1.0],
            [0.6, 0.8, 0.0],
            [-0.48, 0.6, 0.64],
        ];
        let mut batch = KernelBatch::for_kernel(&kernel);
        let mut rotated = RotatedKernels::new(kernel.layout(), 1);
        for dx in offsets {
            let r = (dx[0] * dx[0] + dx[1] * dx[1]).sqrt();
            let theta = dx[1].atan2(dx[0]);
            kernel.evaluate(
                &FieldPoint {
                    r,
                    z: dx[2],
                    source_z: 0.0,
                },
                true,
                true,
                &mut batch,
            );
            for n in normals {
                rotate(&batch, n, theta, 1.0, true, true, &mut rotated);
                let u_ref = kelvin3d_u_cartesian(dx, mu, nu);
                let t_ref = kelvin3d_t_cartesian(dx, n, nu);
                for i in 0..9 {
                    assert_relative_eq!(rotated.u_re[i], u_ref[i], max_relative = 1e-12);
                    assert_relative_eq!(rotated.t_re[i], t_ref[i], max_relative = 1e-12);
                    assert_relative_eq!(rotated.t0_re[i], t_ref[i], max_relative = 1e-12);
                }
            }
        }
    }

    /// Direct Cartesian 2D Kelvin traction with a signed horizontal offset.
    fn kelvin2d_t_cartesian(dx: f64, dz: f64, n: [f64; 3], nu: f64) -> [f64; 4] {
        let r = (dx * dx + dz * dz).sqrt();
        let g = [dx / r, dz / r];
        let nvec = [n[0], n[2]];
        let d = 1.0 / (4.0 * std::f64::consts::PI * (1.0 - nu) * r);
        let k2 = 1.0 - 2.0 * nu;
        let mut t = [0.0; 4];
        for k in 0..2 {
            for i in 0..2 {
                for j in 0..2 {
                    let mut sigma = 2.0 * g[i] * g[j] * g[k];
                    if i == k {
                        sigma += k2 * g[j];
                    }
                    if j == k {
                        sigma += k2 * g[i];
                    }
                    if i == j {
                        sigma -= k2 * g[k];
                    }
                    t[2 * k + i] += -d * sigma * nvec[j];
                }
            }
        }
        t
    }

    #[test]
    fn in_plane_mirror_reproduces_signed_offsets() {
        let (e, nu) = (1.0e7, 0.25);
        let kernel = KelvinInPlane::new(e, nu).unwrap();
        let mut batch = KernelBatch::for_kernel(&kernel);
        let mut rotated = RotatedKernels::new(kernel.layout(), 1);
        for (dx, dz) in [(0.5f64, 0.3f64), (-0.5, 0.3), (-0.4, -0.9), (0.7, -0.2)] {
            let n = [0.8, 0.0, 0.6];
            kernel.evaluate(
                &FieldPoint {
                    r: dx.abs(),
                    z: dz,
                    source_z: 0.0,
                },
                true,
                true,
                &mut batch,
            );
            rotate(&batch, n, 0.0, dx.signum(), true, true, &mut rotated);
            let t_ref = kelvin2d_t_cartesian(dx, dz, n, nu);
            for i in 0..4 {
                assert_relative_eq!(rotated.t_re[i], t_ref[i], max_relative = 1e-12);
            }
            // Displacements: the mixed components are odd in the offset sign.
            let c = 1.0 / (8.0 * std::f64::consts::PI * (0.5 * e / (1.0 + nu)) * (1.0 - nu));
            let r = (dx * dx + dz * dz).sqrt();
            assert_relative_eq!(
                rotated.u_re[1],
                c * dx * dz / (r * r),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn rotation_is_idempotent() {
        let kernel = Kelvin3d::new(3.0e7, 0.3).unwrap();
        let mut batch = KernelBatch::for_kernel(&kernel);
        kernel.evaluate(
            &FieldPoint {
                r: 0.4,
                z: 0.9,
                source_z: 0.0,
            },
            true,
            true,
            &mut batch,
        );
        let mut first = RotatedKernels::new(kernel.layout(), 1);
        let n = [0.0, 0.6, 0.8];
        rotate(&batch, n, 0.3, 1.0, true, true, &mut first);
        let snapshot = first.t_re.clone();
        rotate(&batch, n, 0.3, 1.0, true, true, &mut first);
        assert_eq!(first.t_re, snapshot);
    }
}
