//! Spatial reference system handling on top of the GDAL/OGR spatial reference API.

use gdal::errors::GdalError;
use gdal::spatial_ref::{AxisMappingStrategy, SpatialRef};
use inf::gdalinterop;

use crate::{Error, Result};

/// Well-known-text flavours that can be exported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WktFormat {
    Wkt1Gdal,
    Wkt2_2018,
}

impl WktFormat {
    /// The flavour GDAL 3 reads back most reliably, use this for anything written to disk
    pub fn gdal_preferred() -> Self {
        WktFormat::Wkt2_2018
    }

    fn export_option(&self) -> &'static str {
        match self {
            WktFormat::Wkt1Gdal => "FORMAT=WKT1_GDAL",
            WktFormat::Wkt2_2018 => "FORMAT=WKT2_2018",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpatialReference {
    srs: SpatialRef,
}

impl SpatialReference {
    pub fn new(srs: SpatialRef) -> Self {
        SpatialReference { srs }
    }

    /// Accepts anything GDAL understands as user input: `EPSG:xxxx`, WKT, PROJ strings, ...
    pub fn from_definition(def: &str) -> Result<Self> {
        if def.trim().is_empty() {
            return Err(Error::InvalidArgument("Empty spatial reference definition".into()));
        }

        let mut srs = SpatialRef::from_definition(def)?;
        srs.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
        Ok(SpatialReference { srs })
    }

    pub fn from_epsg(epsg: u32) -> Result<Self> {
        let mut srs = SpatialRef::from_epsg(epsg)?;
        srs.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
        Ok(SpatialReference { srs })
    }

    /// The spatial reference of a dataset, `None` when the dataset carries no valid projection
    pub fn from_dataset(ds: &gdal::Dataset) -> Option<Self> {
        ds.spatial_ref().ok().map(SpatialReference::new).filter(SpatialReference::is_valid)
    }

    pub fn is_valid(&self) -> bool {
        self.srs.to_wkt().is_ok_and(|wkt| !wkt.is_empty())
    }

    pub fn to_wkt(&self, format: WktFormat) -> Result<String> {
        let options = gdalinterop::create_string_list(&[format.export_option().to_string()])?;

        let mut wkt: *mut libc::c_char = std::ptr::null_mut();
        let rc = unsafe {
            gdal_sys::OSRExportToWktEx(
                self.srs.to_c_hsrs(),
                &mut wkt,
                options.as_ptr() as *const *const libc::c_char,
            )
        };

        let wkt = unsafe { gdalinterop::take_gdal_string(wkt) };
        if rc != gdal_sys::OGRErr::OGRERR_NONE {
            return Err(Error::GdalError(GdalError::OgrError {
                err: rc,
                method_name: "OSRExportToWktEx",
            }));
        }

        Ok(wkt)
    }

    pub fn srs(&self) -> &SpatialRef {
        &self.srs
    }
}
