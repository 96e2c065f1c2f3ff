use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::{Error, Result};

/// PCRaster data types, in the order they are offered as algorithm options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ValueScale {
    Boolean,
    Nominal,
    Ordinal,
    Scalar,
    Directional,
    Ldd,
}

impl ValueScale {
    pub const OPTIONS: &'static [&'static str] = &["Boolean", "Nominal", "Ordinal", "Scalar", "Directional", "LDD"];

    pub fn from_index(index: usize) -> Result<Self> {
        ValueScale::iter()
            .nth(index)
            .ok_or_else(|| Error::InvalidArgument(format!("Invalid value scale index: {index}")))
    }

    /// pcrcalc function converting an expression to this value scale
    pub fn conversion_function(&self) -> &'static str {
        match self {
            ValueScale::Boolean => "boolean",
            ValueScale::Nominal => "nominal",
            ValueScale::Ordinal => "ordinal",
            ValueScale::Scalar => "scalar",
            ValueScale::Directional => "directional",
            ValueScale::Ldd => "ldd",
        }
    }

    pub fn lookup_function(&self) -> &'static str {
        match self {
            ValueScale::Boolean => "lookupboolean",
            ValueScale::Nominal => "lookupnominal",
            ValueScale::Ordinal => "lookupordinal",
            ValueScale::Scalar => "lookupscalar",
            ValueScale::Directional => "lookupdirectional",
            ValueScale::Ldd => "lookupldd",
        }
    }

    /// Data type flag of the `col2map` application
    pub fn col2map_flag(&self) -> &'static str {
        match self {
            ValueScale::Boolean => "-B",
            ValueScale::Nominal => "-N",
            ValueScale::Ordinal => "-O",
            ValueScale::Scalar => "-S",
            ValueScale::Directional => "-D",
            ValueScale::Ldd => "-L",
        }
    }

    /// Value of the `PCRASTER_VALUESCALE` creation option of the GDAL PCRaster driver
    pub fn gdal_value_scale(&self) -> &'static str {
        match self {
            ValueScale::Boolean => "VS_BOOLEAN",
            ValueScale::Nominal => "VS_NOMINAL",
            ValueScale::Ordinal => "VS_ORDINAL",
            ValueScale::Scalar => "VS_SCALAR",
            ValueScale::Directional => "VS_DIRECTION",
            ValueScale::Ldd => "VS_LDD",
        }
    }

    /// GDAL storage type the PCRaster driver uses for this value scale
    pub fn gdal_data_type(&self) -> &'static str {
        match self {
            ValueScale::Boolean | ValueScale::Ldd => "Byte",
            ValueScale::Nominal | ValueScale::Ordinal => "Int32",
            ValueScale::Scalar | ValueScale::Directional => "Float32",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn option_order() -> Result<()> {
        assert_eq!(ValueScale::from_index(0)?, ValueScale::Boolean);
        assert_eq!(ValueScale::from_index(3)?, ValueScale::Scalar);
        assert_eq!(ValueScale::from_index(5)?, ValueScale::Ldd);
        assert!(ValueScale::from_index(6).is_err());
        assert_eq!(ValueScale::iter().count(), ValueScale::OPTIONS.len());

        Ok(())
    }

    #[test]
    fn parse_from_name() {
        assert_eq!(ValueScale::from_str("scalar"), Ok(ValueScale::Scalar));
        assert_eq!(ValueScale::from_str("LDD"), Ok(ValueScale::Ldd));
        assert!(ValueScale::from_str("float").is_err());
        assert_eq!(ValueScale::Directional.to_string(), "directional");
    }

    #[test]
    fn engine_mappings() {
        assert_eq!(ValueScale::Ordinal.col2map_flag(), "-O");
        assert_eq!(ValueScale::Directional.gdal_value_scale(), "VS_DIRECTION");
        assert_eq!(ValueScale::Ldd.gdal_data_type(), "Byte");
        assert_eq!(ValueScale::Nominal.lookup_function(), "lookupnominal");
    }
}
