//! Internal helpers ported from external libraries.
//!
//! These modules contain code adapted from:
//! - numpy: floor/clip/isclose on point arrays

pub mod numpy;
