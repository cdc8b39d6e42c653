//! Singular integration: the collocation point lies on the element.
//!
//! The singular scheme uses its own, finer quadrature (independent
//! subdivision and order from the regular scheme) whose sample points never
//! land on the collocation point; exact coincidence is a fatal mesh
//! degeneracy. The static traction part is subtracted at the matching
//! diagonal block inline, in the same quadrature sweep.

use crate::assembly::common::{evaluate_at, local_offset, normal_at, Scratch};
use crate::assembly::matrices::RawInfluenceData;
use crate::assembly::selection::{RowRequests, SelectionIndex, SelectionSet};
use crate::kernels::{FieldPoint, GreensFunction};
use crate::mesh::MeshContext;
use crate::rotation::rotate;
use crate::types::{BemError, Result};
use rlst::RandomAccessByRef;

/// Singular pass for one row collocation point: integrate every element the
/// point is singular on. Handles 1, 2 and 3 local degrees of freedom through
/// the kernel layout; the evaluation path is the same for all of them.
#[allow(clippy::too_many_arguments)]
pub(crate) fn singular_pass(
    ctx: &MeshContext,
    kernel: &dyn GreensFunction,
    coll: usize,
    selection: Option<(&SelectionSet, &SelectionIndex, &RowRequests)>,
    u: Option<&RawInfluenceData>,
    t: Option<&RawInfluenceData>,
    scratch: &mut Scratch,
) -> Result<bool> {
    let dof = scratch.rotated.dof;
    let n_sets = kernel.n_sets();
    let complexity = kernel.complexity();
    let coll_point = ctx.collocation_points[coll];
    let row_beg = dof * coll;
    let mut extrapolated = false;

    for &ielt in ctx.singular_elements(coll) {
        let tables = &ctx.singular_tables[ctx.element_type_index[ielt]];
        let geometry = &ctx.singular_geometry[ielt];
        let colls = &ctx.element_collocation[ielt];

        for p in 0..tables.rule.npoints {
            let off = local_offset(ctx.dim, geometry, p, &coll_point);
            if off.is_coincident() {
                return Err(BemError::DegenerateGeometry);
            }
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
                match selection {
                    None => {
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
                    Some((sel, index, row)) => {
                        for &ie in &row.entries {
                            let entry = &sel.entries[ie];
                            if entry.col_coll != col_coll {
                                continue;
                            }
                            for set in 0..n_sets {
                                let c =
                                    dof * dof * set + dof * entry.row_comp + entry.col_comp;
                                if let Some(u_raw) = u {
                                    unsafe {
                                        u_raw.add_slot_re(
                                            entry.slot,
                                            set,
                                            sumutil * scratch.rotated.u_re[c],
                                        );
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
                                        t_raw.add_slot_re(
                                            entry.slot,
                                            set,
                                            sumutil * scratch.rotated.t_re[c],
                                        );
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
                        // Inline diagonal regularization at the requested
                        // slots of this point's diagonal block.
                        if let Some(t_raw) = t {
                            for k in 0..dof {
                                for l in 0..dof {
                                    if let Some(&slot) = index.diag_slots.get(&(coll, k, l)) {
                                        for set in 0..n_sets {
                                            let c = dof * dof * set + dof * k + l;
                                            unsafe {
                                                t_raw.add_slot_re(
                                                    slot,
                                                    set,
                                                    -sumutil * scratch.rotated.t0_re[c],
                                                );
                                                if complexity.tg0 {
                                                    t_raw.add_slot_im(
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
            }
        }
    }
    Ok(extrapolated)
}
