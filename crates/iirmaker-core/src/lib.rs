//! Coefficient table export for the CMSIS biquad equaliser.
//!
//! Reads the per-slot `facuIn<outer><inner>.txt` coefficient files of an 8x8
//! (bank, gain level) grid and renders them as one nested C initializer in
//! `outCoeffs.txt`.

pub mod domain;
pub mod modules;
