use std::path::PathBuf;

use crate::Result;
use gdal::{cpl::CslStringList, errors::GdalError};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub debug_logging: bool,
    pub proj_db_search_location: Option<PathBuf>,
    pub config_options: Vec<(String, String)>,
}

impl Config {
    pub fn apply(&self) -> Result<()> {
        setup_logging(self.debug_logging);
        if let Some(proj_db) = &self.proj_db_search_location {
            let proj_db_path = proj_db.to_string_lossy().to_string();
            if !proj_db_path.is_empty() {
                gdal::config::set_config_option("PROJ_DATA", proj_db_path.as_str())?;

                // Also set the environment variable unless it is already set by the user
                // e.g. the PCRaster executables do not use gdal settings
                if std::env::var_os("PROJ_DATA").is_none() {
                    std::env::set_var("PROJ_DATA", proj_db_path.as_str());
                }
            }
        }

        for (key, value) in &self.config_options {
            gdal::config::set_config_option(key, value)?;
        }

        Ok(())
    }
}

pub fn setup_logging(debug: bool) {
    if debug && gdal::config::set_config_option("CPL_DEBUG", "ON").is_err() {
        log::debug!("Failed to set GDAL debug level")
    }

    gdal::config::set_error_handler(|sev, _ec, msg| {
        use gdal::errors::CplErrType;
        match sev {
            CplErrType::Debug => log::debug!("GDAL: {msg}"),
            CplErrType::Warning => log::warn!("GDAL: {msg}"),
            CplErrType::Failure | CplErrType::Fatal => log::error!("GDAL: {msg}"),
            CplErrType::None => {}
        }
    });
}

pub fn create_string_list(options: &[String]) -> Result<CslStringList> {
    let mut result = CslStringList::new();
    for opt in options {
        result.add_string(opt)?;
    }

    Ok(result)
}

/// Checks if the GDAL driver with the given short name is registered
pub fn driver_available(name: &str) -> bool {
    gdal::DriverManager::get_driver_by_name(name).is_ok()
}

pub fn check_gdal_pointer(
    ptr: *mut libc::c_void,
    method_name: &'static str,
) -> std::result::Result<*mut libc::c_void, GdalError> {
    if ptr.is_null() {
        let msg = last_error_message();
        unsafe { gdal_sys::CPLErrorReset() };
        Err(GdalError::NullPointer { method_name, msg })
    } else {
        Ok(ptr)
    }
}

/// Takes ownership of a string allocated by GDAL, the memory is released after the conversion.
///
/// # Safety
/// `raw_ptr` must be null or a nul terminated string allocated by GDAL that is not used afterwards.
pub unsafe fn take_gdal_string(raw_ptr: *mut libc::c_char) -> String {
    if raw_ptr.is_null() {
        return String::new();
    }

    let result = raw_string_to_string(raw_ptr);
    gdal_sys::VSIFree(raw_ptr.cast::<libc::c_void>());
    result
}

fn raw_string_to_string(raw_ptr: *const libc::c_char) -> String {
    let c_str = unsafe { std::ffi::CStr::from_ptr(raw_ptr) };
    c_str.to_string_lossy().into_owned()
}

fn last_error_message() -> String {
    raw_string_to_string(unsafe { gdal_sys::CPLGetLastErrorMsg() })
}
