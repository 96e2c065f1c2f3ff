//! Lookup tables for the PCRaster lookup operators, derived from the raster attribute table of a layer.

use std::ffi::CStr;
use std::marker::PhantomData;
use std::ops::Range;
use std::path::Path;

use gdal::Metadata;
use gdal::raster::RasterBand;
use gdal_sys::GDALRATFieldType;

use super::algorithm::{self, Algorithm, Group, Outputs};
use super::{ParameterDefinition, Parameters, ProcessingContext};
use crate::{Error, Feedback, Result};

const OUTPUT: &str = "OUTPUT";

/// Histogram and colour columns, never part of a lookup table
const SKIPPED_COLUMNS: &[&str] = &["Count", "R", "G", "B", "A"];

/// The default attribute table of a raster band, owned by the band
struct AttributeTable<'a> {
    handle: gdal_sys::GDALRasterAttributeTableH,
    _band: PhantomData<&'a ()>,
}

impl<'a> AttributeTable<'a> {
    fn of_band(band: &'a RasterBand<'_>) -> Option<Self> {
        let handle = unsafe { gdal_sys::GDALGetDefaultRAT(band.c_rasterband()) };
        (!handle.is_null()).then_some(AttributeTable {
            handle,
            _band: PhantomData,
        })
    }

    fn row_count(&self) -> i32 {
        unsafe { gdal_sys::GDALRATGetRowCount(self.handle) }
    }

    fn column_count(&self) -> i32 {
        unsafe { gdal_sys::GDALRATGetColumnCount(self.handle) }
    }

    fn column_name(&self, col: i32) -> String {
        unsafe { borrowed_string(gdal_sys::GDALRATGetNameOfCol(self.handle, col)) }
    }

    fn column_type(&self, col: i32) -> GDALRATFieldType::Type {
        unsafe { gdal_sys::GDALRATGetTypeOfCol(self.handle, col) }
    }

    /// The columns in `cols` that contribute to a lookup table
    fn lookup_columns(&self, cols: Range<i32>) -> impl Iterator<Item = i32> + '_ {
        cols.filter(|col| !SKIPPED_COLUMNS.contains(&self.column_name(*col).as_str()))
    }

    fn value(&self, row: i32, col: i32) -> String {
        match self.column_type(col) {
            GDALRATFieldType::GFT_Integer => unsafe { gdal_sys::GDALRATGetValueAsInt(self.handle, row, col) }.to_string(),
            GDALRATFieldType::GFT_Real => unsafe { gdal_sys::GDALRATGetValueAsDouble(self.handle, row, col) }.to_string(),
            _ => self.value_as_string(row, col),
        }
    }

    fn value_as_string(&self, row: i32, col: i32) -> String {
        unsafe { borrowed_string(gdal_sys::GDALRATGetValueAsString(self.handle, row, col)) }
    }

    /// Every lookup column as is: `value class`
    fn value_row(&self, row: i32) -> Vec<String> {
        self.lookup_columns(0..self.column_count())
            .map(|col| self.value(row, col))
            .collect()
    }

    /// The first two real columns form a range: `[min,max] class` for the first row,
    /// `<min,max] class` for the following rows
    fn range_row(&self, row: i32) -> Vec<String> {
        let mut fields: Vec<String> = self
            .lookup_columns(0..self.column_count().min(3))
            .map(|col| match (self.column_type(col), col) {
                (GDALRATFieldType::GFT_Real, 0) if row == 0 => format!("[{}", self.value_as_string(row, col)),
                (GDALRATFieldType::GFT_Real, 0) => format!("<{}", self.value_as_string(row, col)),
                (GDALRATFieldType::GFT_Real, 1) => format!("{}]", self.value_as_string(row, col)),
                _ => self.value(row, col),
            })
            .collect();

        if fields.len() >= 2 {
            let range = fields.drain(..2).collect::<Vec<_>>().join(",");
            fields.insert(0, range);
        }

        fields
    }
}

/// Copies a string that remains owned by GDAL
unsafe fn borrowed_string(ptr: *const libc::c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }

    let c_str = unsafe { CStr::from_ptr(ptr) };
    c_str.to_string_lossy().into_owned()
}

fn write_lookup_table(table: &AttributeTable, ranges: bool, path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    for row in 0..table.row_count() {
        let record = if ranges { table.range_row(row) } else { table.value_row(row) };
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Lookup table from the Value and Class columns of the raster attribute table.
///
/// Scalar PCRaster maps produce range lookup tables, all other layers a value per row.
pub struct LookupTableFromRat;

impl Algorithm for LookupTableFromRat {
    fn name(&self) -> &str {
        "lookuptablefromrat"
    }

    fn display_name(&self) -> &str {
        "Lookup table from RAT"
    }

    fn group(&self) -> Group {
        Group::Data
    }

    fn short_help(&self) -> &str {
        "Creates a lookup table from the Value and Class columns of the Raster Attribute Table"
    }

    fn parameters(&self) -> Vec<ParameterDefinition> {
        vec![
            ParameterDefinition::raster("INPUT", "Raster layer"),
            ParameterDefinition::file_destination(OUTPUT, "Output lookup table"),
        ]
    }

    fn process(&self, _ctx: &ProcessingContext, params: &Parameters, feedback: &mut dyn Feedback) -> Result<Outputs> {
        algorithm::check_canceled(feedback)?;

        let input = params.raster("INPUT")?;
        let output = params.destination(OUTPUT)?;

        let ds = gdal::Dataset::open(input.path())?;
        let ranges = ds
            .metadata_item("PCRASTER_VALUESCALE", "")
            .is_some_and(|vs| vs == "VS_SCALAR");
        let band = ds.rasterband(1)?;
        let table = AttributeTable::of_band(&band).ok_or_else(|| {
            Error::Runtime(format!("{} has no raster attribute table", input.path().display()))
        })?;

        feedback.push_info(&format!(
            "Writing {} rows of the attribute table to {}",
            table.row_count(),
            output.display()
        ));
        inf::fs::create_directory_for_file(output)?;
        write_lookup_table(&table, ranges, output)?;

        Ok(Outputs::from([(OUTPUT.to_string(), output.to_path_buf())]))
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;
    use std::path::PathBuf;

    use super::*;
    use crate::processing::ParameterValue;
    use crate::testutils::{self, RecordingFeedback};

    fn attach_attribute_table(path: &Path, columns: &[(&str, GDALRATFieldType::Type)], rows: &[&[&str]]) -> Result<()> {
        let ds = gdal::Dataset::open_ex(
            path,
            gdal::DatasetOptions {
                open_flags: gdal::GdalOpenFlags::GDAL_OF_UPDATE,
                ..Default::default()
            },
        )?;
        let band = ds.rasterband(1)?;

        unsafe {
            let rat = gdal_sys::GDALCreateRasterAttributeTable();
            for (name, field_type) in columns {
                let name = CString::new(*name)?;
                gdal_sys::GDALRATCreateColumn(rat, name.as_ptr(), *field_type, gdal_sys::GDALRATFieldUsage::GFU_Generic);
            }

            gdal_sys::GDALRATSetRowCount(rat, rows.len() as i32);
            for (row, values) in rows.iter().enumerate() {
                for (col, value) in values.iter().enumerate() {
                    let value = CString::new(*value)?;
                    gdal_sys::GDALRATSetValueAsString(rat, row as i32, col as i32, value.as_ptr());
                }
            }

            let rc = gdal_sys::GDALSetDefaultRAT(band.c_rasterband(), rat);
            gdal_sys::GDALDestroyRasterAttributeTable(rat);
            assert_eq!(rc, gdal_sys::CPLErr::CE_None);
        }

        Ok(())
    }

    fn run(input: PathBuf, output: PathBuf) -> Result<String> {
        let params = Parameters::new()
            .with("INPUT", ParameterValue::Raster(input))
            .with(OUTPUT, ParameterValue::Destination(output.clone()));

        let mut feedback = RecordingFeedback::default();
        let outputs = LookupTableFromRat.run(&testutils::context_without_engine(), &params, &mut feedback)?;
        assert_eq!(outputs[OUTPUT], output);
        assert!(feedback.errors.is_empty());

        Ok(std::fs::read_to_string(output)?)
    }

    #[test_log::test]
    fn classes_lookup_table() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let input = testutils::create_test_raster(tmp.path(), "landuse.tif")?;
        attach_attribute_table(
            &input,
            &[
                ("Value", GDALRATFieldType::GFT_Integer),
                ("Count", GDALRATFieldType::GFT_Integer),
                ("Class", GDALRATFieldType::GFT_String),
            ],
            &[&["1", "120", "forest"], &["2", "30", "water"], &["5", "2", "urban"]],
        )?;

        let table = run(input, tmp.path().join("tables").join("landuse.txt"))?;
        assert_eq!(table, "1 forest\n2 water\n5 urban\n");

        Ok(())
    }

    #[test_log::test]
    fn scalar_layer_gives_range_table() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let input = testutils::create_test_raster(tmp.path(), "depth.tif")?;
        {
            let mut ds = gdal::Dataset::open_ex(
                &input,
                gdal::DatasetOptions {
                    open_flags: gdal::GdalOpenFlags::GDAL_OF_UPDATE,
                    ..Default::default()
                },
            )?;
            ds.set_metadata_item("PCRASTER_VALUESCALE", "VS_SCALAR", "")?;
        }
        attach_attribute_table(
            &input,
            &[
                ("Min", GDALRATFieldType::GFT_Real),
                ("Max", GDALRATFieldType::GFT_Real),
                ("Class", GDALRATFieldType::GFT_Integer),
            ],
            &[&["0", "10", "1"], &["10", "20.5", "2"]],
        )?;

        let table = run(input, tmp.path().join("depth.txt"))?;
        assert_eq!(table, "[0,10] 1\n<10,20.5] 2\n");

        Ok(())
    }

    #[test_log::test]
    fn layer_without_attribute_table() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let input = testutils::create_test_raster(tmp.path(), "plain.tif")?;

        assert!(matches!(run(input, tmp.path().join("plain.txt")), Err(Error::Runtime(_))));
        assert!(!tmp.path().join("plain.txt").exists());

        Ok(())
    }
}
