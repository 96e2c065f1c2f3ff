use std::path::{Path, PathBuf};

use crate::{Error, Result, SpatialReference};

/// An input raster of an algorithm: its location and the coordinate system stored with it.
#[derive(Debug, Clone)]
pub struct RasterLayer {
    path: PathBuf,
    crs: Option<SpatialReference>,
}

impl RasterLayer {
    /// Opens the raster read-only to obtain its spatial reference
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::InvalidPath(path.to_path_buf()));
        }

        let options = gdal::DatasetOptions {
            open_flags: gdal::GdalOpenFlags::GDAL_OF_READONLY | gdal::GdalOpenFlags::GDAL_OF_RASTER,
            ..Default::default()
        };

        let ds = gdal::Dataset::open_ex(path, options)
            .map_err(|err| Error::Runtime(format!("Failed to open raster dataset: {} ({})", path.display(), err)))?;

        let crs = SpatialReference::from_dataset(&ds);
        if crs.is_none() {
            log::debug!("Raster {} has no spatial reference", path.display());
        }

        Ok(RasterLayer {
            path: path.to_path_buf(),
            crs,
        })
    }

    /// A layer with a known spatial reference, no file access is performed
    pub fn with_crs(path: impl Into<PathBuf>, crs: Option<SpatialReference>) -> Self {
        RasterLayer { path: path.into(), crs }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn crs(&self) -> Option<&SpatialReference> {
        self.crs.as_ref()
    }
}
