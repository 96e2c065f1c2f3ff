#![warn(clippy::unwrap_used)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub type Result<T = ()> = std::result::Result<T, Error>;

pub mod engine;
mod error;
pub mod expression;
mod feedback;
mod layer;
pub mod outputcrs;
pub mod processing;
mod runtimeconfiguration;
pub mod srs;
#[cfg(test)]
mod testutils;
mod valuescale;

#[doc(inline)]
pub use engine::Engine;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use feedback::Feedback;
#[doc(inline)]
pub use feedback::LogFeedback;
#[doc(inline)]
pub use layer::RasterLayer;
#[doc(inline)]
pub use outputcrs::{propagate_crs_from_layer, propagate_crs_from_wkt};
pub use runtimeconfiguration::RuntimeConfiguration;
#[doc(inline)]
pub use srs::SpatialReference;
#[doc(inline)]
pub use valuescale::ValueScale;
