//! NumPy function port.
//!
//! Ported from:
//! - numpy.floor / numpy.clip / numpy.isclose
//! - numpy.append (row-wise)

mod array;

pub use array::*;
