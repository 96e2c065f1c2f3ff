//! PCRaster operators exposed as individual processing algorithms.
//!
//! The heavy lifting lives in the member crates, this crate only re-exports them.

pub use inf;
pub use pcr;
