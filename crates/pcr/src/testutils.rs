use std::path::{Path, PathBuf};

use gdal::DriverManager;

use crate::processing::ProcessingContext;
use crate::{Engine, Feedback, Result, SpatialReference};

#[ctor::ctor]
fn init() {
    inf::gdalinterop::setup_logging(false);
}

/// Keeps every message so tests can assert on them
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    pub infos: Vec<String>,
    pub errors: Vec<String>,
}

impl Feedback for RecordingFeedback {
    fn push_info(&mut self, msg: &str) {
        self.infos.push(msg.to_string());
    }

    fn report_error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }
}

/// Reports cancellation as soon as an algorithm asks for it
#[derive(Debug, Default)]
pub struct CancelingFeedback {
    pub infos: Vec<String>,
}

impl Feedback for CancelingFeedback {
    fn push_info(&mut self, msg: &str) {
        self.infos.push(msg.to_string());
    }

    fn report_error(&mut self, _msg: &str) {}

    fn is_canceled(&self) -> bool {
        true
    }
}

/// Creates a small single band float raster without projection information
pub fn create_test_raster(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let mut ds = driver.create_with_band_type::<f32, _>(&path, 4, 3, 1)?;
    ds.set_geo_transform(&[150000.0, 100.0, 0.0, 300000.0, 0.0, -100.0])?;
    Ok(path)
}

/// Same as [`create_test_raster`] in the Vicgrid projection (EPSG:3111)
pub fn create_vicgrid_raster(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = create_test_raster(dir, name)?;
    let mut ds = gdal::Dataset::open_ex(
        &path,
        gdal::DatasetOptions {
            open_flags: gdal::GdalOpenFlags::GDAL_OF_UPDATE,
            ..Default::default()
        },
    )?;
    ds.set_spatial_ref(SpatialReference::from_epsg(3111)?.srs())?;
    Ok(path)
}

/// An engine whose pcrcalc copies a projection-less raster to the assignment target.
///
/// The target is taken from the last argument: `target = expression`
#[cfg(unix)]
pub fn fake_engine(dir: &Path) -> Result<Engine> {
    use std::os::unix::fs::PermissionsExt;

    let template = create_test_raster(dir, "pcrcalc_result.tif")?;
    let exe = dir.join("pcrcalc");
    std::fs::write(
        &exe,
        format!(
            "#!/bin/sh\nfor arg; do statement=\"$arg\"; done\ncp '{}' \"${{statement%% = *}}\"\n",
            template.display()
        ),
    )?;
    std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755))?;

    Engine::detect(Some(dir))
}

pub fn read_projection(path: &Path) -> Result<String> {
    Ok(gdal::Dataset::open(path)?.projection())
}

pub fn context_without_engine() -> ProcessingContext {
    ProcessingContext::without_engine("pcrcalc not found")
}
