//! Algorithms running one of the PCRaster command line applications.

use std::ffi::OsString;

use super::algorithm::{self, Algorithm, Group, Outputs};
use super::{ParameterDefinition, Parameters, ProcessingContext};
use crate::engine::Application;
use crate::{Feedback, Result, ValueScale};

const OUTPUT: &str = "OUTPUT";

fn command_line(app: Application, args: &[OsString]) -> String {
    let args: Vec<_> = args.iter().map(|arg| arg.to_string_lossy()).collect();
    format!("{app} {}", args.join(" "))
}

/// Column file to PCRaster map
pub struct Col2map;

impl Col2map {
    fn args(params: &Parameters) -> Result<Vec<OsString>> {
        let vs = ValueScale::from_index(params.choice("DATA_TYPE")?)?;
        Ok(vec![
            vs.col2map_flag().into(),
            params.file("INPUT")?.into(),
            params.destination(OUTPUT)?.into(),
            "--clone".into(),
            params.raster_path("MASK")?.into(),
        ])
    }
}

impl Algorithm for Col2map {
    fn name(&self) -> &str {
        "col2map"
    }

    fn display_name(&self) -> &str {
        "Column file to PCRaster Map"
    }

    fn group(&self) -> Group {
        Group::Data
    }

    fn short_help(&self) -> &str {
        "Convert column files to PCRaster format with control of the output data type"
    }

    fn documentation_url(&self) -> Option<String> {
        Some(algorithm::documentation_url("app_col2map.html"))
    }

    fn parameters(&self) -> Vec<ParameterDefinition> {
        vec![
            ParameterDefinition::file("INPUT", "Input column table text file"),
            ParameterDefinition::raster("MASK", "Raster mask layer"),
            ParameterDefinition::choice("DATA_TYPE", "Output data type", ValueScale::OPTIONS, 0),
            ParameterDefinition::raster_destination(OUTPUT, "PCRaster layer"),
        ]
    }

    fn process(&self, ctx: &ProcessingContext, params: &Parameters, feedback: &mut dyn Feedback) -> Result<Outputs> {
        let engine = ctx.engine()?;
        let mask = params.raster("MASK")?;
        let output = params.destination(OUTPUT)?;
        let args = Self::args(params)?;

        algorithm::check_canceled(feedback)?;
        feedback.push_info(&command_line(Application::Col2map, &args));
        inf::fs::create_directory_for_file(output)?;
        engine.run(Application::Col2map, &args)?;

        algorithm::assign_output_crs(output, &mask, feedback);
        Ok(Outputs::from([(OUTPUT.to_string(), output.to_path_buf())]))
    }
}

/// PCRaster maps to a comma separated column file
pub struct Map2col;

impl Map2col {
    fn args(params: &Parameters) -> Result<Vec<OsString>> {
        let mut args: Vec<OsString> = vec!["-s".into(), ",".into()];
        args.extend(params.raster_paths("INPUT")?.iter().map(OsString::from));
        args.push(params.destination(OUTPUT)?.into());
        Ok(args)
    }
}

impl Algorithm for Map2col {
    fn name(&self) -> &str {
        "map2col"
    }

    fn display_name(&self) -> &str {
        "PCRaster maps to column file"
    }

    fn group(&self) -> Group {
        Group::Data
    }

    fn short_help(&self) -> &str {
        "Converts one or more PCRaster maps to a comma separated column file"
    }

    fn documentation_url(&self) -> Option<String> {
        Some(algorithm::documentation_url("app_map2col.html"))
    }

    fn parameters(&self) -> Vec<ParameterDefinition> {
        vec![
            ParameterDefinition::rasters("INPUT", "Input raster layer(s)"),
            ParameterDefinition::file_destination(OUTPUT, "Output text file with columns"),
        ]
    }

    fn process(&self, ctx: &ProcessingContext, params: &Parameters, feedback: &mut dyn Feedback) -> Result<Outputs> {
        let engine = ctx.engine()?;
        let output = params.destination(OUTPUT)?;
        let args = Self::args(params)?;

        algorithm::check_canceled(feedback)?;
        feedback.push_info(&command_line(Application::Map2col, &args));
        inf::fs::create_directory_for_file(output)?;
        engine.run(Application::Map2col, &args)?;

        // a text file, there is no coordinate system to assign
        Ok(Outputs::from([(OUTPUT.to_string(), output.to_path_buf())]))
    }
}

/// One or more rasters resampled onto the grid of the mask layer
pub struct Resample;

impl Resample {
    fn args(params: &Parameters) -> Result<Vec<OsString>> {
        let mut args: Vec<OsString> = params.raster_paths("INPUT")?.iter().map(OsString::from).collect();
        args.push(params.destination(OUTPUT)?.into());
        args.push("--clone".into());
        args.push(params.raster_path("MASK")?.into());
        Ok(args)
    }
}

impl Algorithm for Resample {
    fn name(&self) -> &str {
        "resample"
    }

    fn display_name(&self) -> &str {
        "resample"
    }

    fn group(&self) -> Group {
        Group::Data
    }

    fn short_help(&self) -> &str {
        "Cuts one or more maps out of a raster or joins them into one map, using the extent of the mask layer"
    }

    fn documentation_url(&self) -> Option<String> {
        Some(algorithm::documentation_url("app_resample.html"))
    }

    fn parameters(&self) -> Vec<ParameterDefinition> {
        vec![
            ParameterDefinition::rasters("INPUT", "Input raster layer(s)"),
            ParameterDefinition::raster("MASK", "Raster mask layer"),
            ParameterDefinition::raster_destination(OUTPUT, "Output resample raster layer"),
        ]
    }

    fn process(&self, ctx: &ProcessingContext, params: &Parameters, feedback: &mut dyn Feedback) -> Result<Outputs> {
        let engine = ctx.engine()?;
        let mask = params.raster("MASK")?;
        let output = params.destination(OUTPUT)?;
        let args = Self::args(params)?;

        algorithm::check_canceled(feedback)?;
        feedback.push_info(&command_line(Application::Resample, &args));
        inf::fs::create_directory_for_file(output)?;
        engine.run(Application::Resample, &args)?;

        algorithm::assign_output_crs(output, &mask, feedback);
        Ok(Outputs::from([(OUTPUT.to_string(), output.to_path_buf())]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::ParameterValue;
    use crate::testutils::{self, CancelingFeedback};

    #[test]
    fn resample_command_line() -> Result<()> {
        let params = Parameters::new()
            .with("INPUT", ParameterValue::Rasters(vec!["a.map".into(), "b.map".into()]))
            .with("MASK", ParameterValue::Raster("clone.map".into()))
            .with(OUTPUT, ParameterValue::Destination("out".into()))
            .resolve(&Resample.parameters())?;

        assert_eq!(
            command_line(Application::Resample, &Resample::args(&params)?),
            "resample a.map b.map out.map --clone clone.map"
        );

        Ok(())
    }

    #[test]
    fn map2col_command_line() -> Result<()> {
        let params = Parameters::new()
            .with("INPUT", ParameterValue::Raster("a.map".into()))
            .with(OUTPUT, ParameterValue::Destination("values.csv".into()))
            .resolve(&Map2col.parameters())?;

        assert_eq!(
            command_line(Application::Map2col, &Map2col::args(&params)?),
            "map2col -s , a.map values.csv"
        );

        Ok(())
    }

    #[test]
    fn col2map_command_line() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let table = tmp.path().join("points.txt");
        std::fs::write(&table, "150050 299950 1.5\n")?;

        let params = Parameters::new()
            .with("INPUT", ParameterValue::File(table.clone()))
            .with("MASK", ParameterValue::Raster("clone.map".into()))
            .with("DATA_TYPE", ParameterValue::Enum(2))
            .with(OUTPUT, ParameterValue::Destination("points.map".into()))
            .resolve(&Col2map.parameters())?;

        assert_eq!(
            command_line(Application::Col2map, &Col2map::args(&params)?),
            format!("col2map -O {} points.map --clone clone.map", table.display())
        );

        Ok(())
    }

    #[cfg(unix)]
    #[test_log::test]
    fn canceled_application_is_not_started() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let ctx = ProcessingContext::with_engine(testutils::fake_engine(tmp.path())?);
        let params = Parameters::new()
            .with("INPUT", ParameterValue::Raster(testutils::create_test_raster(tmp.path(), "a.tif")?))
            .with(OUTPUT, ParameterValue::Destination(tmp.path().join("columns").join("values.csv")));

        let mut feedback = CancelingFeedback::default();
        assert!(matches!(
            Map2col.run(&ctx, &params, &mut feedback),
            Err(crate::Error::Runtime(msg)) if msg == "Operation canceled"
        ));
        assert!(feedback.infos.is_empty());
        assert!(!tmp.path().join("columns").exists());

        Ok(())
    }
}
