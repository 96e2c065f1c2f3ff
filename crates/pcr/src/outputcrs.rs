//! Stamps a coordinate reference system onto rasters written by the PCRaster engine.
//!
//! The engine only knows about grids, the files it writes never carry projection information.
//! After an algorithm wrote its result, the projection of the input layer is assigned to the
//! output file in place: only the georeferencing metadata is touched, never the pixel data.
//! Depending on the format GDAL stores it in the file header or in an `.aux.xml` sidecar.
//!
//! Assigning the projection is best effort: parse and assignment failures are reported as warnings
//! through the [`Feedback`] sink and result in `Ok(false)`. Only a file that can not be opened for
//! update at all is returned as an error.

use std::path::{Path, PathBuf};

use gdal::errors::GdalError;
use gdal::spatial_ref::SpatialRef;

use crate::srs::WktFormat;
use crate::{Error, Feedback, Result, SpatialReference};

/// Assigns the spatial reference of the source layer to `output_file`.
///
/// Returns `Ok(false)` without touching the file when the source has no valid spatial reference.
pub fn propagate_crs_from_layer(
    output_file: impl AsRef<Path>,
    source_crs: Option<&SpatialReference>,
    feedback: Option<&mut dyn Feedback>,
) -> Result<bool> {
    let Some(crs) = source_crs.filter(|crs| crs.is_valid()) else {
        log::debug!("No valid source CRS, projection of {} is left as is", output_file.as_ref().display());
        return Ok(false);
    };

    let wkt = crs.to_wkt(WktFormat::gdal_preferred())?;
    propagate_crs_from_wkt(output_file, &wkt, feedback)
}

/// Assigns the coordinate system described by `wkt` to `output_file`.
///
/// Any definition GDAL accepts as user input is allowed (WKT, `EPSG:xxxx`, PROJ strings).
/// An empty definition is skipped without opening the file.
pub fn propagate_crs_from_wkt(output_file: impl AsRef<Path>, wkt: &str, feedback: Option<&mut dyn Feedback>) -> Result<bool> {
    if wkt.is_empty() {
        return Ok(false);
    }

    let output_file = output_file.as_ref();
    let mut ds = open_for_update(output_file)?;

    let normalized = match SpatialRef::from_definition(wkt) {
        Ok(srs) => SpatialReference::new(srs).to_wkt(WktFormat::gdal_preferred()),
        Err(err) => Err(Error::GdalError(err)),
    };

    let normalized = match normalized {
        Ok(normalized) => normalized,
        Err(err) => {
            report_failure(
                feedback,
                format!("Could not create output layer CRS. GDAL result code {}", result_code(&err)),
            );
            return Ok(false);
        }
    };

    if let Err(err) = ds.set_projection(&normalized) {
        report_failure(
            feedback,
            format!(
                "Could not assign CRS to output layer. GDAL result code {}",
                result_code(&Error::GdalError(err))
            ),
        );
        return Ok(false);
    }

    log::debug!("Assigned projection to {}", output_file.display());
    Ok(true)
}

fn open_for_update(path: &Path) -> Result<gdal::Dataset> {
    if !path.exists() {
        return Err(Error::InvalidPath(PathBuf::from(path)));
    }

    let options = gdal::DatasetOptions {
        open_flags: gdal::GdalOpenFlags::GDAL_OF_UPDATE | gdal::GdalOpenFlags::GDAL_OF_RASTER,
        ..Default::default()
    };

    gdal::Dataset::open_ex(path, options).map_err(|err| {
        Error::Runtime(format!(
            "Failed to open raster dataset for update ({}), check file correctness or driver configuration ({})",
            path.display(),
            err
        ))
    })
}

/// The numeric GDAL/OGR result code carried by the error, 0 means success in GDAL so it is never returned
fn result_code(err: &Error) -> i64 {
    match err {
        Error::GdalError(GdalError::OgrError { err, .. }) => *err as i64,
        Error::GdalError(GdalError::CplError { class, .. }) => *class as i64,
        _ => -1,
    }
}

fn report_failure(feedback: Option<&mut dyn Feedback>, msg: String) {
    log::warn!("{msg}");
    if let Some(feedback) = feedback {
        feedback.report_error(&msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{self, RecordingFeedback};

    #[test_log::test]
    fn absent_crs_is_skipped() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = testutils::create_test_raster(tmp.path(), "out.tif")?;
        let contents = std::fs::read(&path)?;

        assert!(!propagate_crs_from_layer(&path, None, None)?);

        let empty = SpatialReference::new(SpatialRef::new()?);
        let mut feedback = RecordingFeedback::default();
        assert!(!propagate_crs_from_layer(&path, Some(&empty), Some(&mut feedback))?);
        assert!(feedback.errors.is_empty());

        assert_eq!(std::fs::read(&path)?, contents);
        assert!(!tmp.path().join("out.tif.aux.xml").exists());

        Ok(())
    }

    #[test_log::test]
    fn empty_wkt_does_not_open_the_file() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        // the file does not exist, opening it would fail
        assert!(!propagate_crs_from_wkt(tmp.path().join("missing.map"), "", None)?);

        Ok(())
    }

    #[test_log::test]
    fn assign_epsg_definition() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = testutils::create_test_raster(tmp.path(), "out.tif")?;
        assert!(testutils::read_projection(&path)?.is_empty());

        assert!(propagate_crs_from_wkt(&path, "EPSG:3111", None)?);
        assert!(testutils::read_projection(&path)?.contains("GDA94 / Vicgrid"));

        Ok(())
    }

    #[test_log::test]
    fn assign_from_layer_crs() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = testutils::create_test_raster(tmp.path(), "out.tif")?;
        let crs = SpatialReference::from_definition("EPSG:3111")?;

        let mut feedback = RecordingFeedback::default();
        assert!(propagate_crs_from_layer(&path, Some(&crs), Some(&mut feedback))?);
        assert!(feedback.errors.is_empty());
        assert!(testutils::read_projection(&path)?.contains("GDA94 / Vicgrid"));

        Ok(())
    }

    #[test_log::test]
    fn assigning_twice_gives_the_same_result() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let once = testutils::create_test_raster(tmp.path(), "once.tif")?;
        let twice = testutils::create_test_raster(tmp.path(), "twice.tif")?;

        assert!(propagate_crs_from_wkt(&once, "EPSG:3111", None)?);
        assert!(propagate_crs_from_wkt(&twice, "EPSG:3111", None)?);
        assert!(propagate_crs_from_wkt(&twice, "EPSG:3111", None)?);

        assert_eq!(testutils::read_projection(&once)?, testutils::read_projection(&twice)?);

        Ok(())
    }

    #[test_log::test]
    fn invalid_wkt_is_reported_once() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = testutils::create_test_raster(tmp.path(), "out.tif")?;

        let mut feedback = RecordingFeedback::default();
        assert!(!propagate_crs_from_wkt(&path, "PROJCS[this is not wkt", Some(&mut feedback))?);
        assert_eq!(feedback.errors.len(), 1);
        assert!(feedback.errors[0].starts_with("Could not create output layer CRS. GDAL result code"));
        assert!(testutils::read_projection(&path)?.is_empty());

        // identical outcome without a feedback sink
        assert!(!propagate_crs_from_wkt(&path, "PROJCS[this is not wkt", None)?);

        Ok(())
    }

    #[test_log::test]
    fn missing_output_is_an_error() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let missing = tmp.path().join("missing.tif");

        assert!(matches!(
            propagate_crs_from_wkt(&missing, "EPSG:3111", None),
            Err(Error::InvalidPath(p)) if p == missing
        ));

        Ok(())
    }

    #[test_log::test]
    fn unreadable_output_is_an_error() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let garbage = tmp.path().join("garbage.map");
        std::fs::write(&garbage, b"this is not a raster")?;

        assert!(matches!(
            propagate_crs_from_wkt(&garbage, "EPSG:3111", None),
            Err(Error::Runtime(_))
        ));

        Ok(())
    }

    /// A PCRaster map has no projection header, without PAM sidecars GDAL can not store one
    #[test_log::test]
    fn rejected_assignment_is_reported_once() -> Result<()> {
        if !inf::gdalinterop::driver_available("PCRaster") {
            log::warn!("GDAL PCRaster driver not available, skipping");
            return Ok(());
        }

        let tmp = tempfile::tempdir()?;
        let tif = testutils::create_test_raster(tmp.path(), "out.tif")?;
        let map = tmp.path().join("out.map");

        gdal::config::set_thread_local_config_option("GDAL_PAM_ENABLED", "NO")?;
        {
            let src = gdal::Dataset::open(&tif)?;
            let driver = gdal::DriverManager::get_driver_by_name("PCRaster")?;
            let path = std::ffi::CString::new(map.to_string_lossy().as_ref())?;
            let handle = unsafe {
                gdal_sys::GDALCreateCopy(
                    driver.c_driver(),
                    path.as_ptr(),
                    src.c_dataset(),
                    0,
                    std::ptr::null_mut(),
                    None,
                    std::ptr::null_mut(),
                )
            };
            drop(unsafe { gdal::Dataset::from_c_dataset(inf::gdalinterop::check_gdal_pointer(handle, "GDALCreateCopy")?) });
        }

        let mut feedback = RecordingFeedback::default();
        let assigned = propagate_crs_from_wkt(&map, "EPSG:3111", Some(&mut feedback));
        gdal::config::clear_thread_local_config_option("GDAL_PAM_ENABLED")?;

        assert!(!assigned?);
        assert_eq!(feedback.errors.len(), 1);
        assert!(feedback.errors[0].starts_with("Could not assign CRS to output layer. GDAL result code"));
        assert!(!tmp.path().join("out.map.aux.xml").exists());

        Ok(())
    }
}
