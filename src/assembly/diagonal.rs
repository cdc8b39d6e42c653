//! Selective diagonal pass: the T0 regularization under a selection.
//!
//! When a selection is active, the regular pass skips the diagonal
//! subtraction of the static traction part and this pass applies it for
//! every requested diagonal-block entry of a regular row collocation point.
//! Two sub-paths exist: a block-diagonal fast path used when all local
//! components of the point's diagonal block are requested, and a sparse path
//! that walks the point's requested entries. The sparse path checks the
//! entry's column collocation against the element collocation being applied
//! before writing; the check protects against attributing a contribution to
//! the wrong column when the per-point entry lists are not perfectly
//! ordered.

use crate::assembly::common::{evaluate_at, local_offset, normal_at, Scratch};
use crate::assembly::matrices::RawInfluenceData;
use crate::assembly::selection::{RowRequests, SelectionIndex, SelectionSet};
use crate::kernels::{FieldPoint, GreensFunction};
use crate::mesh::MeshContext;
use crate::rotation::rotate;
use rlst::RandomAccessByRef;

/// Apply the diagonal T0 subtraction for one unique row collocation point.
#[allow(clippy::too_many_arguments)]
pub(crate) fn diagonal_pass_selected(
    ctx: &MeshContext,
    kernel: &dyn GreensFunction,
    selection: &SelectionSet,
    index: &SelectionIndex,
    row: &RowRequests,
    t: &RawInfluenceData,
    scratch: &mut Scratch,
) -> bool {
    let coll = row.coll;
    if !index.diag_requested.contains(&coll) {
        return false;
    }
    let dof = scratch.rotated.dof;
    let n_sets = kernel.n_sets();
    let complexity = kernel.complexity();
    let coll_point = ctx.collocation_points[coll];
    let block_diagonal = index.block_diagonal.contains(&coll);
    let mut extrapolated = false;

    for ielt in 0..ctx.element_count() {
        if ctx.is_singular(ielt, coll) {
            continue;
        }
        let tables = &ctx.regular_tables[ctx.element_type_index[ielt]];
        let geometry = &ctx.regular_geometry[ielt];
        let colls = &ctx.element_collocation[ielt];

        for p in 0..tables.rule.npoints {
            let off = local_offset(ctx.dim, geometry, p, &coll_point);
            extrapolated |= evaluate_at(
                kernel,
                FieldPoint {
                    r: off.r,
                    z: off.z,
                    source_z: coll_point[2],
                },
                false,
                true,
                &mut scratch.batch,
            );
            rotate(
                &scratch.batch,
                normal_at(geometry, p),
                off.theta,
                off.x_sign,
                false,
                true,
                &mut scratch.rotated,
            );

            let wjac = tables.rule.weights[p] * geometry.jacobians[p];
            for (jc, &col_coll) in colls.iter().enumerate() {
                let sumutil = wjac * *tables.m.get([jc, p]).unwrap();
                if block_diagonal {
                    // Every local component pair is requested; write through
                    // the precomputed slot map without membership checks.
                    for k in 0..dof {
                        for l in 0..dof {
                            let slot = index.diag_slots[&(coll, k, l)];
                            for set in 0..n_sets {
                                let c = dof * dof * set + dof * k + l;
                                unsafe {
                                    t.add_slot_re(slot, set, -sumutil * scratch.rotated.t0_re[c]);
                                    if complexity.tg0 {
                                        t.add_slot_im(
                                            slot,
                                            set,
                                            -sumutil * scratch.rotated.t0_im[c],
                                        );
                                    }
                                }
                            }
                        }
                    }
                } else {
                    if !index.col_collocations.contains(&col_coll) {
                        continue;
                    }
                    for &ie in &row.entries {
                        let entry = &selection.entries[ie];
                        if entry.col_coll != col_coll {
                            continue;
                        }
                        if let Some(&slot) =
                            index.diag_slots.get(&(coll, entry.row_comp, entry.col_comp))
                        {
                            for set in 0..n_sets {
                                let c =
                                    dof * dof * set + dof * entry.row_comp + entry.col_comp;
                                unsafe {
                                    t.add_slot_re(slot, set, -sumutil * scratch.rotated.t0_re[c]);
                                    if complexity.tg0 {
                                        t.add_slot_im(
                                            slot,
                                            set,
                                            -sumutil * scratch.rotated.t0_im[c],
                                        );
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    extrapolated
}
