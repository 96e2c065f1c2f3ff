use std::path::{Path, PathBuf};

use bon::bon;
use inf::gdalinterop;

use crate::Result;

/// Process wide settings, apply them once before running algorithms
pub struct RuntimeConfiguration {
    gdal_config: gdalinterop::Config,
    pcraster_dir: Option<PathBuf>,
}

#[bon]
impl RuntimeConfiguration {
    #[builder]
    pub fn new(
        proj_db: Option<&Path>,
        gdal_debug_log: Option<bool>,
        config_options: Option<Vec<(String, String)>>,
        // directory containing the PCRaster executables, searched before PATH
        pcraster_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            gdal_config: gdalinterop::Config {
                debug_logging: gdal_debug_log.unwrap_or(false),
                proj_db_search_location: proj_db.map(Path::to_path_buf),
                config_options: config_options.unwrap_or_default(),
            },
            pcraster_dir,
        }
    }

    pub fn apply(&self) -> Result<()> {
        self.gdal_config.apply()?;
        Ok(())
    }

    pub fn pcraster_dir(&self) -> Option<&Path> {
        self.pcraster_dir.as_deref()
    }
}
