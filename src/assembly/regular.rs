//! Regular integration: collocation points off the element.
//!
//! For every quadrature point of an element the kernel is evaluated at the
//! offset to the collocation point, rotated into the global frame, scaled by
//! `weight x collocation basis x Jacobian` and accumulated. When tractions
//! are assembled densely, the rotated static part T0 is simultaneously
//! subtracted on the row collocation point's own diagonal block; this is the
//! regularization that makes the discrete traction operator satisfy
//! rigid-body equilibrium. Under a selection the T0 term is handled by the
//! separate diagonal pass.

use crate::assembly::common::{evaluate_at, local_offset, normal_at, Scratch};
use crate::assembly::matrices::RawInfluenceData;
use crate::assembly::selection::{RowRequests, SelectionSet};
use crate::kernels::{FieldPoint, GreensFunction};
use crate::mesh::MeshContext;
use crate::rotation::rotate;
use rlst::RandomAccessByRef;

/// Dense regular pass for one row collocation point: integrate every element
/// the point is regular on, accumulating the full row block of U and T.
#[allow(clippy::too_many_arguments)]
pub(crate) fn regular_pass_dense(
    ctx: &MeshContext,
    kernel: &dyn GreensFunction,
    coll: usize,
    u: Option<&RawInfluenceData>,
    t: Option<&RawInfluenceData>,
    scratch: &mut Scratch,
) -> bool {
    let dof = scratch.rotated.dof;
    let n_sets = kernel.n_sets();
    let complexity = kernel.complexity();
    let coll_point = ctx.collocation_points[coll];
    let row_beg = dof * coll;
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
                u.is_some(),
                t.is_some(),
                &mut scratch.batch,
            );
            rotate(
                &scratch.batch,
                normal_at(geometry, p),
                off.theta,
                off.x_sign,
                u.is_some(),
                t.is_some(),
                &mut scratch.rotated,
            );

            let wjac = tables.rule.weights[p] * geometry.jacobians[p];
            for (jc, &col_coll) in colls.iter().enumerate() {
                let sumutil = wjac * *tables.m.get([jc, p]).unwrap();
                let col_beg = dof * col_coll;
                for set in 0..n_sets {
                    let base = dof * dof * set;
                    for k in 0..dof {
                        for l in 0..dof {
                            let c = base + dof * k + l;
                            if let Some(u_raw) = u {
                                unsafe {
                                    u_raw.add_re(
                                        row_beg + k,
                                        col_beg + l,
                                        set,
                                        sumutil * scratch.rotated.u_re[c],
                                    );
                                    if complexity.ug {
                                        u_raw.add_im(
                                            row_beg + k,
                                            col_beg + l,
                                            set,
                                            sumutil * scratch.rotated.u_im[c],
                                        );
                                    }
                                }
                            }
                            if let Some(t_raw) = t {
                                unsafe {
                                    t_raw.add_re(
                                        row_beg + k,
                                        col_beg + l,
                                        set,
                                        sumutil * scratch.rotated.t_re[c],
                                    );
                                    if complexity.tg {
                                        t_raw.add_im(
                                            row_beg + k,
                                            col_beg + l,
                                            set,
                                            sumutil * scratch.rotated.t_im[c],
                                        );
                                    }
                                    // Singular part of the kernel, subtracted
                                    // on the diagonal block.
                                    t_raw.add_re(
                                        row_beg + k,
                                        row_beg + l,
                                        set,
                                        -sumutil * scratch.rotated.t0_re[c],
                                    );
                                    if complexity.tg0 {
                                        t_raw.add_im(
                                            row_beg + k,
                                            row_beg + l,
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

/// Selective regular pass for one unique row collocation point: accumulate
/// only the requested entries. The diagonal T0 term is applied by the
/// diagonal pass, not here.
#[allow(clippy::too_many_arguments)]
pub(crate) fn regular_pass_selected(
    ctx: &MeshContext,
    kernel: &dyn GreensFunction,
    selection: &SelectionSet,
    row: &RowRequests,
    u: Option<&RawInfluenceData>,
    t: Option<&RawInfluenceData>,
    scratch: &mut Scratch,
) -> bool {
    let dof = scratch.rotated.dof;
    let n_sets = kernel.n_sets();
    let complexity = kernel.complexity();
    let coll = row.coll;
    let coll_point = ctx.collocation_points[coll];
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
                u.is_some(),
                t.is_some(),
                &mut scratch.batch,
            );
            rotate(
                &scratch.batch,
                normal_at(geometry, p),
                off.theta,
                off.x_sign,
                u.is_some(),
                t.is_some(),
                &mut scratch.rotated,
            );

            let wjac = tables.rule.weights[p] * geometry.jacobians[p];
            for (jc, &col_coll) in colls.iter().enumerate() {
                let sumutil = wjac * *tables.m.get([jc, p]).unwrap();
                for &ie in &row.entries {
                    let entry = &selection.entries[ie];
                    if entry.col_coll != col_coll {
                        continue;
                    }
                    for set in 0..n_sets {
                        let c = dof * dof * set + dof * entry.row_comp + entry.col_comp;
                        if let Some(u_raw) = u {
                            unsafe {
                                u_raw.add_slot_re(entry.slot, set, sumutil * scratch.rotated.u_re[c]);
                                if complexity.ug {
                                    u_raw.add_slot_im(
                                        entry.slot,
                                        set,
                                        sumutil * scratch.rotated.u_im[c],
                                    );
                                }
                            }
                        }
                        if let Some(t_raw) = t {
                            unsafe {
                                t_raw.add_slot_re(entry.slot, set, sumutil * scratch.rotated.t_re[c]);
                                if complexity.tg {
                                    t_raw.add_slot_im(
                                        entry.slot,
                                        set,
                                        sumutil * scratch.rotated.t_im[c],
                                    );
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
