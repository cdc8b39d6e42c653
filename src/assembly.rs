//! The integration and assembly engine.
//!
//! One call to [`assemble`] runs the implicit state machine
//! `Idle -> Classified -> {RegularPass, DiagonalPass, SingularPass} ->
//! Assembled`: the classification lives in the [`MeshContext`], the passes
//! pick the integration regime per (element, collocation point) pair, and
//! all contributions are purely additive, so the passes may run in any
//! order and no intermediate state is observable.
//!
//! Work is parallelized over row collocation points: every output row (or
//! selection slot) belongs to exactly one collocation point, so workers
//! write into disjoint parts of the shared buffers.

pub mod matrices;
pub mod selection;

mod common;
mod diagonal;
mod regular;
mod singular;

pub use matrices::InfluenceMatrix;
pub use selection::{SelectionEntry, SelectionSet};

use crate::kernels::GreensFunction;
use crate::mesh::MeshContext;
use crate::types::{BemError, Result};
use matrices::RawInfluenceData;
use rayon::prelude::*;
use selection::SelectionIndex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Options of one assembly call.
pub struct AssemblyOptions {
    /// Produce the displacement matrix U.
    pub compute_u: bool,
    /// Produce the traction matrix T.
    pub compute_t: bool,
    /// Compute only a sparse subset of the output entries.
    pub selection: Option<SelectionSet>,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            compute_u: true,
            compute_t: true,
            selection: None,
        }
    }
}

/// The assembled influence matrices.
pub struct BemMatrices {
    /// Displacement matrix, present when requested.
    pub u: Option<InfluenceMatrix>,
    /// Traction matrix, present when requested.
    pub t: Option<InfluenceMatrix>,
}

/// Assemble the boundary element influence matrices.
///
/// Dense output has shape `(nDof, nDof, n_sets)` with `nDof = dof x
/// collocation count`; under a selection the shape is the selection's
/// `(rows, cols, n_sets)`. Both matrices share `n_sets`. All failures abort
/// the whole assembly; no partial results are returned.
pub fn assemble(
    ctx: &MeshContext,
    kernel: &dyn GreensFunction,
    options: &AssemblyOptions,
) -> Result<BemMatrices> {
    let layout = kernel.layout();
    if layout.mesh_dimension() != ctx.dim {
        return Err(BemError::InvalidKernelData(
            "The fundamental solution's layout does not match the mesh dimension.",
        ));
    }
    let dof = layout.dof();
    let n_coll = ctx.collocation_count();
    let n_dof = dof * n_coll;
    let n_sets = kernel.n_sets();

    let index = match &options.selection {
        Some(selection) => Some(SelectionIndex::build(selection, dof, n_coll)?),
        None => None,
    };
    let [rows, cols] = match &options.selection {
        Some(selection) => selection.shape,
        None => [n_dof, n_dof],
    };

    let mut u_matrix = options
        .compute_u
        .then(|| InfluenceMatrix::new(rows, cols, n_sets));
    let mut t_matrix = options
        .compute_t
        .then(|| InfluenceMatrix::new(rows, cols, n_sets));
    let extrapolated = AtomicBool::new(false);

    {
        let u_raw = u_matrix.as_mut().map(RawInfluenceData::new);
        let t_raw = t_matrix.as_mut().map(RawInfluenceData::new);
        let u_raw = u_raw.as_ref();
        let t_raw = t_raw.as_ref();

        match (&options.selection, &index) {
            (Some(selection), Some(index)) => {
                log::debug!(
                    "Selective assembly: {} entries, {} unique row collocation points.",
                    selection.entries.len(),
                    index.rows.len()
                );
                index.rows.par_iter().try_for_each(|row| -> Result<()> {
                    let mut scratch = common::Scratch::new(kernel);
                    let mut extrap = regular::regular_pass_selected(
                        ctx,
                        kernel,
                        selection,
                        row,
                        u_raw,
                        t_raw,
                        &mut scratch,
                    );
                    if let Some(t_raw) = t_raw {
                        extrap |= diagonal::diagonal_pass_selected(
                            ctx,
                            kernel,
                            selection,
                            index,
                            row,
                            t_raw,
                            &mut scratch,
                        );
                    }
                    extrap |= singular::singular_pass(
                        ctx,
                        kernel,
                        row.coll,
                        Some((selection, index, row)),
                        u_raw,
                        t_raw,
                        &mut scratch,
                    )?;
                    if extrap {
                        extrapolated.store(true, Ordering::Relaxed);
                    }
                    Ok(())
                })?;
            }
            _ => {
                log::debug!(
                    "Dense assembly: {} collocation points, {} elements.",
                    n_coll,
                    ctx.element_count()
                );
                (0..n_coll).into_par_iter().try_for_each(|coll| -> Result<()> {
                    let mut scratch = common::Scratch::new(kernel);
                    let mut extrap =
                        regular::regular_pass_dense(ctx, kernel, coll, u_raw, t_raw, &mut scratch);
                    extrap |= singular::singular_pass(
                        ctx,
                        kernel,
                        coll,
                        None,
                        u_raw,
                        t_raw,
                        &mut scratch,
                    )?;
                    if extrap {
                        extrapolated.store(true, Ordering::Relaxed);
                    }
                    Ok(())
                })?;
            }
        }
    }

    if extrapolated.load(Ordering::Relaxed) {
        log::warn!("Field points outside the tabulated kernel range were extrapolated.");
    }

    Ok(BemMatrices {
        u: u_matrix,
        t: t_matrix,
    })
}
