//! User-specified fundamental solutions tabulated on a grid.
//!
//! Dynamic and layered-media solutions enter the engine as tables sampled on
//! a (source depth, radial offset, axial coordinate) grid, one value per
//! kernel component and parameter set. Evaluation picks the nearest source
//! depth and interpolates bilinearly in the radial and axial directions.
//! Field points outside the tabulated range are extrapolated from the edge
//! intervals and flagged.

use crate::kernels::{FieldPoint, GreensFunction, KernelBatch};
use crate::types::{BemError, Complexity, KernelLayout, Result};

/// One tabulated kernel part (displacements, tractions or the static
/// traction part), real and optional imaginary values.
///
/// Values are indexed `comp + n_comp * (i_src + n_src * (i_r + n_r * (i_z +
/// n_z * set)))`, matching a column-major array of dimensions
/// `(n_comp, n_src, n_r, n_z, n_sets)`.
pub struct TabulatedPart {
    /// Real values.
    pub re: Vec<f64>,
    /// Imaginary values; empty for a real part.
    pub im: Vec<f64>,
}

/// A fundamental solution interpolated from tables.
pub struct TabulatedGreensFunction {
    layout: KernelLayout,
    n_sets: usize,
    source_z: Vec<f64>,
    r: Vec<f64>,
    z: Vec<f64>,
    u: TabulatedPart,
    t: Option<TabulatedPart>,
    t0: Option<TabulatedPart>,
}

fn check_monotonic(grid: &[f64], what: &'static str) -> Result<()> {
    if grid.is_empty() {
        return Err(BemError::InvalidKernelData(what));
    }
    if grid.windows(2).any(|w| w[0] >= w[1]) {
        return Err(BemError::InvalidKernelData(what));
    }
    Ok(())
}

fn check_part(
    part: &TabulatedPart,
    n_comp: usize,
    n_grid: usize,
    n_sets: usize,
    what: &'static str,
) -> Result<()> {
    if part.re.len() != n_comp * n_grid * n_sets {
        return Err(BemError::InvalidKernelData(what));
    }
    if !part.im.is_empty() && part.im.len() != part.re.len() {
        return Err(BemError::InvalidKernelData(what));
    }
    Ok(())
}

impl TabulatedGreensFunction {
    /// Create a tabulated solution.
    ///
    /// `source_z`, `r` and `z` must be strictly increasing. The traction
    /// tables may be omitted together when only displacement output is ever
    /// requested.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        layout: KernelLayout,
        n_sets: usize,
        source_z: Vec<f64>,
        r: Vec<f64>,
        z: Vec<f64>,
        u: TabulatedPart,
        t: Option<TabulatedPart>,
        t0: Option<TabulatedPart>,
    ) -> Result<Self> {
        check_monotonic(&source_z, "Source depths must be strictly increasing.")?;
        check_monotonic(&r, "Receiver offsets 'r' must be strictly increasing.")?;
        check_monotonic(&z, "Receiver coordinates 'z' must be strictly increasing.")?;
        let n_grid = source_z.len() * r.len() * z.len();
        check_part(
            &u,
            layout.displacement_components(),
            n_grid,
            n_sets,
            "Displacement table size does not match the grids.",
        )?;
        if t.is_some() != t0.is_some() {
            return Err(BemError::InvalidKernelData(
                "Traction tables and their static part must be supplied together.",
            ));
        }
        for part in [&t, &t0].into_iter().flatten() {
            check_part(
                part,
                layout.traction_components(),
                n_grid,
                n_sets,
                "Traction table size does not match the grids.",
            )?;
        }
        Ok(Self {
            layout,
            n_sets,
            source_z,
            r,
            z,
            u,
            t,
            t0,
        })
    }

    /// Bracket `value` in `grid`, returning the lower index and the
    /// interpolation weight. The weight leaves [0, 1] when extrapolating.
    fn bracket(grid: &[f64], value: f64, extrapolated: &mut bool) -> (usize, f64) {
        if grid.len() == 1 {
            if value != grid[0] {
                *extrapolated = true;
            }
            return (0, 0.0);
        }
        let upper = grid.partition_point(|x| *x < value).clamp(1, grid.len() - 1);
        let lower = upper - 1;
        let w = (value - grid[lower]) / (grid[upper] - grid[lower]);
        if !(0.0..=1.0).contains(&w) {
            *extrapolated = true;
        }
        (lower, w)
    }

    /// Nearest grid index.
    fn nearest(grid: &[f64], value: f64) -> usize {
        let upper = grid.partition_point(|x| *x < value);
        if upper == 0 {
            0
        } else if upper == grid.len() {
            grid.len() - 1
        } else if value - grid[upper - 1] <= grid[upper] - value {
            upper - 1
        } else {
            upper
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn interpolate(
        &self,
        part: &TabulatedPart,
        n_comp: usize,
        i_src: usize,
        ir: usize,
        wr: f64,
        iz: usize,
        wz: f64,
        out_re: &mut [f64],
        out_im: &mut [f64],
        complex: bool,
    ) {
        let n_src = self.source_z.len();
        let n_r = self.r.len();
        let ir1 = (ir + 1).min(n_r - 1);
        let iz1 = (iz + 1).min(self.z.len() - 1);
        let idx = |i_r: usize, i_z: usize, comp: usize, set: usize| {
            comp + n_comp * (i_src + n_src * (i_r + n_r * (i_z + self.z.len() * set)))
        };
        let w00 = (1.0 - wr) * (1.0 - wz);
        let w10 = wr * (1.0 - wz);
        let w01 = (1.0 - wr) * wz;
        let w11 = wr * wz;
        for set in 0..self.n_sets {
            for comp in 0..n_comp {
                out_re[n_comp * set + comp] = w00 * part.re[idx(ir, iz, comp, set)]
                    + w10 * part.re[idx(ir1, iz, comp, set)]
                    + w01 * part.re[idx(ir, iz1, comp, set)]
                    + w11 * part.re[idx(ir1, iz1, comp, set)];
                if complex {
                    out_im[n_comp * set + comp] = w00 * part.im[idx(ir, iz, comp, set)]
                        + w10 * part.im[idx(ir1, iz, comp, set)]
                        + w01 * part.im[idx(ir, iz1, comp, set)]
                        + w11 * part.im[idx(ir1, iz1, comp, set)];
                }
            }
        }
    }
}

impl GreensFunction for TabulatedGreensFunction {
    fn layout(&self) -> KernelLayout {
        self.layout
    }
    fn n_sets(&self) -> usize {
        self.n_sets
    }
    fn complexity(&self) -> Complexity {
        Complexity {
            ug: !self.u.im.is_empty(),
            tg: self.t.as_ref().is_some_and(|t| !t.im.is_empty()),
            tg0: self.t0.as_ref().is_some_and(|t| !t.im.is_empty()),
        }
    }

    fn evaluate(&self, point: &FieldPoint, want_u: bool, want_t: bool, out: &mut KernelBatch) {
        let mut extrapolated = false;
        let i_src = Self::nearest(&self.source_z, point.source_z);
        let (ir, wr) = Self::bracket(&self.r, point.r, &mut extrapolated);
        let (iz, wz) = Self::bracket(&self.z, point.z, &mut extrapolated);
        let complexity = self.complexity();

        if want_u {
            self.interpolate(
                &self.u,
                self.layout.displacement_components(),
                i_src,
                ir,
                wr,
                iz,
                wz,
                &mut out.u_re,
                &mut out.u_im,
                complexity.ug,
            );
        }
        if want_t {
            if let (Some(t), Some(t0)) = (&self.t, &self.t0) {
                let n_comp = self.layout.traction_components();
                self.interpolate(
                    t,
                    n_comp,
                    i_src,
                    ir,
                    wr,
                    iz,
                    wz,
                    &mut out.t_re,
                    &mut out.t_im,
                    complexity.tg,
                );
                self.interpolate(
                    t0,
                    n_comp,
                    i_src,
                    ir,
                    wr,
                    iz,
                    wz,
                    &mut out.t0_re,
                    &mut out.t0_im,
                    complexity.tg0,
                );
            }
        }
        if extrapolated {
            out.extrapolated = true;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    /// A 2x3 (r, z) grid for the antiplane layout with values r + 10 z per
    /// component scale, one source depth, one parameter set.
    fn linear_table() -> TabulatedGreensFunction {
        let r = vec![0.0, 1.0];
        let z = vec![-1.0, 0.0, 1.0];
        let mut u_re = Vec::new();
        let mut t_re = Vec::new();
        for iz in 0..3 {
            for ir in 0..2 {
                let v = r[ir] + 10.0 * z[iz];
                u_re.push(v);
                t_re.push(v);
                t_re.push(2.0 * v);
            }
        }
        TabulatedGreensFunction::new(
            KernelLayout::OutOfPlane,
            1,
            vec![0.0],
            r,
            z,
            TabulatedPart {
                re: u_re,
                im: vec![],
            },
            Some(TabulatedPart {
                re: t_re.clone(),
                im: vec![],
            }),
            Some(TabulatedPart {
                re: t_re,
                im: vec![],
            }),
        )
        .unwrap()
    }

    #[test]
    fn reproduces_grid_values() {
        let table = linear_table();
        let mut batch = KernelBatch::for_kernel(&table);
        table.evaluate(
            &FieldPoint {
                r: 1.0,
                z: 0.0,
                source_z: 0.0,
            },
            true,
            true,
            &mut batch,
        );
        assert_relative_eq!(batch.u_re[0], 1.0, max_relative = 1e-14);
        assert_relative_eq!(batch.t_re[1], 2.0, max_relative = 1e-14);
        assert!(!batch.extrapolated);
    }

    #[test]
    fn interpolates_bilinearly() {
        let table = linear_table();
        let mut batch = KernelBatch::for_kernel(&table);
        table.evaluate(
            &FieldPoint {
                r: 0.25,
                z: 0.5,
                source_z: 0.0,
            },
            true,
            false,
            &mut batch,
        );
        assert_relative_eq!(batch.u_re[0], 0.25 + 5.0, max_relative = 1e-13);
    }

    #[test]
    fn flags_extrapolation() {
        let table = linear_table();
        let mut batch = KernelBatch::for_kernel(&table);
        table.evaluate(
            &FieldPoint {
                r: 2.5,
                z: 0.0,
                source_z: 0.0,
            },
            true,
            false,
            &mut batch,
        );
        assert!(batch.extrapolated);
        // Linear extrapolation from the edge interval stays exact for a
        // linear table.
        assert_relative_eq!(batch.u_re[0], 2.5, max_relative = 1e-13);
    }

    #[test]
    fn rejects_inconsistent_tables() {
        let r = vec![0.0, 1.0];
        let z = vec![0.0];
        assert!(matches!(
            TabulatedGreensFunction::new(
                KernelLayout::OutOfPlane,
                1,
                vec![0.0],
                r.clone(),
                z.clone(),
                TabulatedPart {
                    re: vec![0.0; 3],
                    im: vec![]
                },
                None,
                None,
            ),
            Err(BemError::InvalidKernelData(_))
        ));
        assert!(matches!(
            TabulatedGreensFunction::new(
                KernelLayout::OutOfPlane,
                1,
                vec![0.0],
                vec![1.0, 0.5],
                z,
                TabulatedPart {
                    re: vec![0.0; 2],
                    im: vec![]
                },
                None,
                None,
            ),
            Err(BemError::InvalidKernelData(_))
        ));
    }

    #[test]
    fn complexity_follows_the_tables() {
        let table = linear_table();
        let c = table.complexity();
        assert!(!c.ug && !c.tg && !c.tg0);
    }
}
