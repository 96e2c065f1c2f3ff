//! The PCRaster operations exposed as parameterized algorithms.
//!
//! Algorithms are looked up through the [`Provider`], their parameters are described by
//! [`ParameterDefinition`]s and supplied as [`Parameters`]. Every algorithm writing a raster assigns
//! the coordinate system of its primary input layer to the result.

mod algorithm;
mod applications;
mod context;
mod conversion;
mod lookuptable;
mod operators;
mod parameter;
mod provider;

pub use algorithm::{assign_output_crs, documentation_url, Algorithm, Group, Outputs};
pub use context::ProcessingContext;
pub use parameter::{ParameterDefinition, ParameterKind, ParameterValue, Parameters, OUTPUT_RASTER_EXTENSION};
pub use provider::Provider;
