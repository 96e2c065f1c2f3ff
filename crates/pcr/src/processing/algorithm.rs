use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use strum::{Display, EnumIter, EnumString};

use super::{ParameterDefinition, Parameters, ProcessingContext};
use crate::{Feedback, RasterLayer, Result};

const DOCUMENTATION_BASE_URL: &str = "https://pcraster.geo.uu.nl/pcraster/latest/documentation/pcraster_manual/sphinx";

/// Paths of the files written by an algorithm, keyed by output parameter name
pub type Outputs = BTreeMap<String, PathBuf>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Group {
    General,
    Area,
    Conditional,
    Data,
    DemDerivatives,
    Hydrological,
    Map,
    MissingValues,
    Operators,
    Order,
    Proximity,
    Window,
}

impl Group {
    pub fn display_name(&self) -> &'static str {
        match self {
            Group::General => "General",
            Group::Area => "Area operations",
            Group::Conditional => "Conditional operations",
            Group::Data => "Data management",
            Group::DemDerivatives => "DEM derivatives",
            Group::Hydrological => "Hydrology",
            Group::Map => "Map operations",
            Group::MissingValues => "Missing values",
            Group::Operators => "Mathematical operators",
            Group::Order => "Order",
            Group::Proximity => "Proximity",
            Group::Window => "Window operations",
        }
    }
}

pub fn documentation_url(page: &str) -> String {
    format!("{DOCUMENTATION_BASE_URL}/{page}")
}

pub trait Algorithm: Send + Sync {
    /// Unique identifier within the provider
    fn name(&self) -> &str;
    fn display_name(&self) -> &str;
    fn group(&self) -> Group;
    fn short_help(&self) -> &str;

    fn documentation_url(&self) -> Option<String> {
        None
    }

    fn parameters(&self) -> Vec<ParameterDefinition>;

    /// Runs the algorithm, the parameters are already resolved against [`Algorithm::parameters`]
    fn process(&self, ctx: &ProcessingContext, params: &Parameters, feedback: &mut dyn Feedback) -> Result<Outputs>;

    fn run(&self, ctx: &ProcessingContext, params: &Parameters, feedback: &mut dyn Feedback) -> Result<Outputs> {
        let params = params.resolve(&self.parameters())?;
        log::debug!("Running algorithm {}", self.name());
        self.process(ctx, &params, feedback)
    }
}

/// Stamps the coordinate system of `source` on a written output.
///
/// Failures never fail the algorithm, the output is still usable without projection.
pub fn assign_output_crs(output: &Path, source: &RasterLayer, feedback: &mut dyn Feedback) {
    if let Err(err) = crate::propagate_crs_from_layer(output, source.crs(), Some(&mut *feedback)) {
        let msg = format!("Could not assign CRS to output layer {} ({err})", output.display());
        log::warn!("{msg}");
        feedback.report_error(&msg);
    }
}

pub(crate) fn check_canceled(feedback: &dyn Feedback) -> Result<()> {
    if feedback.is_canceled() {
        return Err(crate::Error::Runtime("Operation canceled".to_string()));
    }

    Ok(())
}
