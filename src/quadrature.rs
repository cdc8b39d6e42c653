//! Quadrature rules for boundary element integration.
//!
//! Regular integration uses moderate-order rules; singular integration uses a
//! distinct, finer scheme built from uniform element subdivision so that no
//! sample point lands on the collocation point.
pub mod gauss;
pub mod triangle;
pub mod types;
