use super::algorithm::Algorithm;
use super::applications::{Col2map, Map2col, Resample};
use super::conversion::{BooleanOperators, ComparisonOperators, ConvertDataType, ConvertToPcraster, Cover, Lookup, Spatial};
use super::lookuptable::LookupTableFromRat;
use super::operators::OPERATORS;
use super::parameter::OUTPUT_RASTER_EXTENSION;
use crate::{Error, Result};

/// Registry of all PCRaster algorithms
pub struct Provider {
    algorithms: Vec<&'static dyn Algorithm>,
}

impl Provider {
    pub const ID: &'static str = "pcraster";
    pub const NAME: &'static str = "PCRaster";
    pub const VERSION: &'static str = "0.3.0";

    pub fn new() -> Self {
        let mut algorithms: Vec<&'static dyn Algorithm> = vec![
            &BooleanOperators,
            &ComparisonOperators,
            &ConvertDataType,
            &Spatial,
            &Lookup,
            &LookupTableFromRat,
            &Cover,
            &ConvertToPcraster,
            &Col2map,
            &Map2col,
            &Resample,
        ];
        algorithms.extend(OPERATORS.iter().map(|op| op as &'static dyn Algorithm));
        algorithms.sort_by(|a, b| a.name().cmp(b.name()));

        Provider { algorithms }
    }

    pub fn algorithms(&self) -> impl Iterator<Item = &'static dyn Algorithm> + '_ {
        self.algorithms.iter().copied()
    }

    pub fn algorithm(&self, name: &str) -> Result<&'static dyn Algorithm> {
        self.algorithms()
            .find(|alg| alg.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown algorithm: {name}")))
    }

    pub fn supported_output_raster_extensions(&self) -> &'static [&'static str] {
        &[OUTPUT_RASTER_EXTENSION]
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}
