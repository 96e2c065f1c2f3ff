//! Algorithms that build their pcrcalc expression from the parameter values, and the
//! conversion of GDAL rasters to the PCRaster format.

use std::ffi::CString;
use std::path::Path;

use inf::gdalinterop;

use super::algorithm::{self, Algorithm, Group, Outputs};
use super::{ParameterDefinition, Parameters, ProcessingContext};
use crate::engine::GlobalOptions;
use crate::expression::{Assignment, Expression};
use crate::{Error, Feedback, RasterLayer, Result, ValueScale};

const OUTPUT: &str = "OUTPUT";

/// Writes `expression` to the `OUTPUT` destination and stamps the CRS of the primary layer on it
fn evaluate(
    ctx: &ProcessingContext,
    params: &Parameters,
    expression: Expression,
    primary: &RasterLayer,
    feedback: &mut dyn Feedback,
) -> Result<Outputs> {
    let engine = ctx.engine()?;
    algorithm::check_canceled(feedback)?;

    let assignment = Assignment::new(params.destination(OUTPUT)?, expression);
    feedback.push_info(&format!("pcrcalc {assignment}"));
    engine.pcrcalc(&assignment, Some(primary.path()), &GlobalOptions::default())?;
    algorithm::assign_output_crs(&assignment.target, primary, feedback);

    Ok(Outputs::from([(OUTPUT.to_string(), assignment.target)]))
}

fn value_scale(params: &Parameters) -> Result<ValueScale> {
    ValueScale::from_index(params.choice("DATA_TYPE")?)
}

fn data_type_parameter() -> ParameterDefinition {
    ParameterDefinition::choice("DATA_TYPE", "Output data type", ValueScale::OPTIONS, 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BooleanOperator {
    And,
    Not,
    Or,
    Xor,
}

impl BooleanOperator {
    const OPTIONS: &'static [&'static str] = &["AND", "NOT", "OR", "XOR"];

    fn from_index(index: usize) -> Result<Self> {
        Ok(match index {
            0 => BooleanOperator::And,
            1 => BooleanOperator::Not,
            2 => BooleanOperator::Or,
            3 => BooleanOperator::Xor,
            _ => return Err(Error::InvalidArgument(format!("Invalid boolean operator index: {index}"))),
        })
    }

    fn expression(&self, lhs: Expression, rhs: Option<Expression>) -> Result<Expression> {
        let op = match self {
            BooleanOperator::Not => return Ok(Expression::prefix("not", lhs)),
            BooleanOperator::And => "and",
            BooleanOperator::Or => "or",
            BooleanOperator::Xor => "xor",
        };

        let rhs = rhs.ok_or_else(|| Error::MissingParameter("INPUT2".to_string()))?;
        Ok(Expression::infix(op, lhs, rhs))
    }
}

/// AND, OR, XOR of two boolean rasters or NOT of the first one
pub struct BooleanOperators;

impl Algorithm for BooleanOperators {
    fn name(&self) -> &str {
        "booleanoperators"
    }

    fn display_name(&self) -> &str {
        "boolean operators"
    }

    fn group(&self) -> Group {
        Group::Operators
    }

    fn short_help(&self) -> &str {
        "Boolean operators, NOT only uses the first raster"
    }

    fn documentation_url(&self) -> Option<String> {
        Some(algorithm::documentation_url("secfunclist.html#boolean-operators"))
    }

    fn parameters(&self) -> Vec<ParameterDefinition> {
        vec![
            ParameterDefinition::raster("INPUT", "Input boolean raster"),
            ParameterDefinition::choice("OPERATOR", "Boolean operator", BooleanOperator::OPTIONS, 0),
            ParameterDefinition::raster("INPUT2", "Input boolean raster").optional(),
            ParameterDefinition::raster_destination(OUTPUT, "Output boolean raster"),
        ]
    }

    fn process(&self, ctx: &ProcessingContext, params: &Parameters, feedback: &mut dyn Feedback) -> Result<Outputs> {
        let input = params.raster("INPUT")?;
        let rhs = params.optional_raster("INPUT2")?.map(|layer| Expression::file(layer.path()));
        let expression = BooleanOperator::from_index(params.choice("OPERATOR")?)?.expression(Expression::file(input.path()), rhs)?;

        evaluate(ctx, params, expression, &input, feedback)
    }
}

const COMPARISON_OPERATORS: &[&str] = &["==", ">=", ">", "<=", "<", "!="];

/// Cell by cell comparison of two rasters resulting in a boolean raster
pub struct ComparisonOperators;

impl Algorithm for ComparisonOperators {
    fn name(&self) -> &str {
        "comparisonoperators"
    }

    fn display_name(&self) -> &str {
        "comparison operators"
    }

    fn group(&self) -> Group {
        Group::Operators
    }

    fn short_help(&self) -> &str {
        "Comparison operators"
    }

    fn documentation_url(&self) -> Option<String> {
        Some(algorithm::documentation_url("secfunclist.html#comparison-operators"))
    }

    fn parameters(&self) -> Vec<ParameterDefinition> {
        vec![
            ParameterDefinition::raster("INPUT", "Input raster"),
            ParameterDefinition::choice("OPERATOR", "Comparison operator", COMPARISON_OPERATORS, 0),
            ParameterDefinition::raster("INPUT2", "Input raster"),
            ParameterDefinition::raster_destination(OUTPUT, "Output boolean raster"),
        ]
    }

    fn process(&self, ctx: &ProcessingContext, params: &Parameters, feedback: &mut dyn Feedback) -> Result<Outputs> {
        let lhs = params.raster("INPUT")?;
        let rhs = params.raster_path("INPUT2")?;
        let op = COMPARISON_OPERATORS
            .get(params.choice("OPERATOR")?)
            .copied()
            .ok_or_else(|| Error::InvalidArgument("Invalid comparison operator".to_string()))?;

        let expression = Expression::infix(op, Expression::file(lhs.path()), Expression::file(rhs));
        evaluate(ctx, params, expression, &lhs, feedback)
    }
}

pub struct ConvertDataType;

impl Algorithm for ConvertDataType {
    fn name(&self) -> &str {
        "convertdatatype"
    }

    fn display_name(&self) -> &str {
        "convert data type"
    }

    fn group(&self) -> Group {
        Group::Data
    }

    fn short_help(&self) -> &str {
        "Converts a raster to another PCRaster data type"
    }

    fn documentation_url(&self) -> Option<String> {
        Some(algorithm::documentation_url("secfunclist.html#data-type-conversion"))
    }

    fn parameters(&self) -> Vec<ParameterDefinition> {
        vec![
            ParameterDefinition::raster("INPUT", "Input raster layer"),
            data_type_parameter(),
            ParameterDefinition::raster_destination(OUTPUT, "Output raster layer"),
        ]
    }

    fn process(&self, ctx: &ProcessingContext, params: &Parameters, feedback: &mut dyn Feedback) -> Result<Outputs> {
        let input = params.raster("INPUT")?;
        let expression = Expression::call(
            value_scale(params)?.conversion_function(),
            vec![Expression::file(input.path())],
        );

        evaluate(ctx, params, expression, &input, feedback)
    }
}

/// Non spatial value converted to a raster covering the mask layer
pub struct Spatial;

impl Algorithm for Spatial {
    fn name(&self) -> &str {
        "spatial"
    }

    fn display_name(&self) -> &str {
        "spatial"
    }

    fn group(&self) -> Group {
        Group::Data
    }

    fn short_help(&self) -> &str {
        "Conversion of a non-spatial value to a spatial data type"
    }

    fn documentation_url(&self) -> Option<String> {
        Some(algorithm::documentation_url("op_spatial.html"))
    }

    fn parameters(&self) -> Vec<ParameterDefinition> {
        vec![
            ParameterDefinition::number("INPUT", "Input nonspatial", None),
            data_type_parameter(),
            ParameterDefinition::raster("MASK", "Mask layer"),
            ParameterDefinition::raster_destination(OUTPUT, "Output raster layer"),
        ]
    }

    fn process(&self, ctx: &ProcessingContext, params: &Parameters, feedback: &mut dyn Feedback) -> Result<Outputs> {
        let mask = params.raster("MASK")?;
        let value = Expression::call(
            value_scale(params)?.conversion_function(),
            vec![Expression::Number(params.number("INPUT")?)],
        );

        evaluate(ctx, params, Expression::call("spatial", vec![value]), &mask, feedback)
    }
}

/// Table lookup with a selectable output data type
pub struct Lookup;

impl Algorithm for Lookup {
    fn name(&self) -> &str {
        "lookup"
    }

    fn display_name(&self) -> &str {
        "lookup"
    }

    fn group(&self) -> Group {
        Group::Data
    }

    fn short_help(&self) -> &str {
        "Compares cell value(s) of one or more expression(s) with the search key in a table"
    }

    fn documentation_url(&self) -> Option<String> {
        Some(algorithm::documentation_url("op_lookup.html"))
    }

    fn parameters(&self) -> Vec<ParameterDefinition> {
        vec![
            ParameterDefinition::rasters("INPUT", "Input raster layer(s)"),
            ParameterDefinition::file("TABLE", "Input lookup table"),
            data_type_parameter(),
            ParameterDefinition::raster_destination(OUTPUT, "Output raster layer"),
        ]
    }

    fn process(&self, ctx: &ProcessingContext, params: &Parameters, feedback: &mut dyn Feedback) -> Result<Outputs> {
        let inputs = params.rasters("INPUT")?;
        let primary = inputs.first().ok_or_else(|| Error::MissingParameter("INPUT".to_string()))?;

        let mut args = vec![Expression::file(params.file("TABLE")?)];
        args.extend(inputs.iter().map(|layer| Expression::file(layer.path())));

        let expression = Expression::call(value_scale(params)?.lookup_function(), args);
        evaluate(ctx, params, expression, primary, feedback)
    }
}

/// Missing values substituted by the values of one or more cover rasters
pub struct Cover;

impl Algorithm for Cover {
    fn name(&self) -> &str {
        "cover"
    }

    fn display_name(&self) -> &str {
        "cover"
    }

    fn group(&self) -> Group {
        Group::MissingValues
    }

    fn short_help(&self) -> &str {
        "Missing values substituted for values from other raster(s)"
    }

    fn documentation_url(&self) -> Option<String> {
        Some(algorithm::documentation_url("op_cover.html"))
    }

    fn parameters(&self) -> Vec<ParameterDefinition> {
        vec![
            ParameterDefinition::raster("INPUT", "Input raster layer"),
            ParameterDefinition::rasters("COVER", "Input cover layer(s)"),
            ParameterDefinition::raster_destination(OUTPUT, "Output raster layer"),
        ]
    }

    fn process(&self, ctx: &ProcessingContext, params: &Parameters, feedback: &mut dyn Feedback) -> Result<Outputs> {
        let input = params.raster("INPUT")?;

        let mut args = vec![Expression::file(input.path())];
        args.extend(params.raster_paths("COVER")?.iter().map(Expression::file));

        evaluate(ctx, params, Expression::call("cover", args), &input, feedback)
    }
}

/// Any GDAL raster written as PCRaster map with the selected value scale
pub struct ConvertToPcraster;

impl ConvertToPcraster {
    fn translate_options(vs: ValueScale) -> Vec<String> {
        vec![
            "-of".to_string(),
            "PCRaster".to_string(),
            "-ot".to_string(),
            vs.gdal_data_type().to_string(),
            "-co".to_string(),
            format!("PCRASTER_VALUESCALE={}", vs.gdal_value_scale()),
        ]
    }
}

impl Algorithm for ConvertToPcraster {
    fn name(&self) -> &str {
        "converttopcrasterformat"
    }

    fn display_name(&self) -> &str {
        "Convert to PCRaster Format"
    }

    fn group(&self) -> Group {
        Group::Data
    }

    fn short_help(&self) -> &str {
        "Convert GDAL supported raster layers to PCRaster format with control of the output data type"
    }

    fn parameters(&self) -> Vec<ParameterDefinition> {
        vec![
            ParameterDefinition::raster("INPUT", "Raster layer"),
            data_type_parameter(),
            ParameterDefinition::raster_destination(OUTPUT, "PCRaster layer"),
        ]
    }

    fn process(&self, _ctx: &ProcessingContext, params: &Parameters, feedback: &mut dyn Feedback) -> Result<Outputs> {
        algorithm::check_canceled(feedback)?;
        if !gdalinterop::driver_available("PCRaster") {
            return Err(Error::Runtime("The GDAL PCRaster driver is not available".to_string()));
        }

        let input = params.raster("INPUT")?;
        let output = params.destination(OUTPUT)?;
        let options = Self::translate_options(value_scale(params)?);
        feedback.push_info(&format!("gdal_translate {} {} {}", options.join(" "), input.path().display(), output.display()));

        let src = gdal::Dataset::open(input.path())?;
        inf::fs::create_directory_for_file(output)?;
        translate(&src, output, &options)?;

        algorithm::assign_output_crs(output, &input, feedback);
        Ok(Outputs::from([(OUTPUT.to_string(), output.to_path_buf())]))
    }
}

struct TranslateOptionsWrapper {
    options: *mut gdal_sys::GDALTranslateOptions,
}

impl TranslateOptionsWrapper {
    fn new(opts: &[String]) -> Result<Self> {
        let c_opts = gdalinterop::create_string_list(opts)?;
        let options = unsafe { gdal_sys::GDALTranslateOptionsNew(c_opts.as_ptr(), std::ptr::null_mut()) };
        if options.is_null() {
            return Err(Error::InvalidArgument(format!("Invalid translate options: {}", opts.join(" "))));
        }

        Ok(TranslateOptionsWrapper { options })
    }
}

impl Drop for TranslateOptionsWrapper {
    fn drop(&mut self) {
        unsafe {
            gdal_sys::GDALTranslateOptionsFree(self.options);
        }
    }
}

fn translate(src_ds: &gdal::Dataset, dest_path: &Path, options: &[String]) -> Result<()> {
    let translate_options = TranslateOptionsWrapper::new(options)?;
    let path_str = CString::new(dest_path.to_string_lossy().to_string())?;

    unsafe {
        let mut user_error: libc::c_int = 0;
        let handle = gdal_sys::GDALTranslate(
            path_str.as_ptr(),
            src_ds.c_dataset(),
            translate_options.options,
            &mut user_error,
        );

        if user_error != 0 {
            return Err(Error::Runtime("GDAL Translate: invalid arguments".to_string()));
        }

        // closing the dataset flushes it to disk
        drop(gdal::Dataset::from_c_dataset(gdalinterop::check_gdal_pointer(
            handle,
            "GDALTranslate",
        )?));
    }

    Ok(())
}
