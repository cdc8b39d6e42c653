//! Elastobem
//!
//! Boundary element influence matrices for elastodynamics: given a discretized
//! boundary mesh and an elastodynamic fundamental solution, assemble the dense
//! (or sparsely selected) displacement and traction system matrices of the
//! boundary integral equation.
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

#[macro_use]
extern crate lazy_static;

pub mod assembly;
pub mod element;
pub mod kernels;
pub mod mesh;
pub mod quadrature;
pub mod rotation;
pub mod shapes;
pub mod types;
