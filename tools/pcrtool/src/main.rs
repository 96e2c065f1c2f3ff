use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::{Env, TimestampPrecision};
use pcr::processing::{Algorithm, ParameterKind, Parameters, ProcessingContext, Provider};
use pcr::{Feedback, LogFeedback, RuntimeConfiguration};

pub type Result<T = ()> = anyhow::Result<T>;

#[derive(Parser, Debug)]
#[command(name = "pcrtool", about = "Run PCRaster operators on GDAL rasters")]
struct Cli {
    #[arg(long = "pcraster-dir", env = "PCRASTER_DIR", help = "Directory containing the PCRaster executables")]
    pcraster_dir: Option<PathBuf>,

    #[arg(long = "proj-db", env = "PROJ_DATA", help = "Directory containing the proj.db database")]
    proj_db: Option<PathBuf>,

    #[arg(long = "gdal-debug", help = "Forward GDAL debug messages to the log")]
    gdal_debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "List the available algorithms")]
    List,
    #[command(about = "Show the parameters of an algorithm")]
    Describe { algorithm: String },
    #[command(about = "Run an algorithm")]
    Run {
        algorithm: String,
        #[arg(short = 'p', long = "param", value_name = "NAME=VALUE", help = "Algorithm parameter, repeat for multiple rasters")]
        params: Vec<String>,
    },
    #[command(name = "assign-crs", about = "Assign a coordinate system to an existing raster")]
    AssignCrs {
        file: PathBuf,
        #[arg(long = "crs", help = "WKT, EPSG:xxxx or PROJ definition")]
        crs: String,
    },
}

/// Prints the algorithm messages, errors end up on stderr
struct ConsoleFeedback;

impl Feedback for ConsoleFeedback {
    fn push_info(&mut self, msg: &str) {
        println!("{msg}");
    }

    fn report_error(&mut self, msg: &str) {
        eprintln!("{msg}");
    }
}

fn split_param(param: &str) -> Result<(&str, &str)> {
    param
        .split_once('=')
        .with_context(|| format!("Invalid parameter '{param}', expected NAME=VALUE"))
}

fn kind_description(kind: &ParameterKind) -> String {
    match kind {
        ParameterKind::Raster => "raster".to_string(),
        ParameterKind::MultipleRasters => "raster(s)".to_string(),
        ParameterKind::Number { default: Some(default) } => format!("number (default {default})"),
        ParameterKind::Number { default: None } => "number".to_string(),
        ParameterKind::Enum { options, default } => {
            let options: Vec<_> = options.iter().enumerate().map(|(i, opt)| format!("{i}: {opt}")).collect();
            format!("choice [{}] (default {default})", options.join(", "))
        }
        ParameterKind::File => "file".to_string(),
        ParameterKind::RasterDestination => "output raster".to_string(),
        ParameterKind::FileDestination => "output file".to_string(),
    }
}

fn describe(alg: &dyn Algorithm) {
    println!("{} ({})", alg.display_name(), alg.name());
    println!("Group: {}", alg.group().display_name());
    println!("{}", alg.short_help());
    if let Some(url) = alg.documentation_url() {
        println!("Documentation: {url}");
    }

    println!();
    for def in alg.parameters() {
        let optional = if def.optional { ", optional" } else { "" };
        println!("  {:<22} {} [{}{optional}]", def.name, def.description, kind_description(&def.kind));
    }
}

fn main() -> Result {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let config = RuntimeConfiguration::builder()
        .maybe_proj_db(cli.proj_db.as_deref())
        .gdal_debug_log(cli.gdal_debug)
        .maybe_pcraster_dir(cli.pcraster_dir)
        .build();
    config.apply().context("Failed to configure GDAL")?;
    log::debug!("PCRaster directory: {:?}", config.pcraster_dir());

    let provider = Provider::new();

    match cli.command {
        Commands::List => {
            println!("{} {}", Provider::NAME, Provider::VERSION);
            for alg in provider.algorithms() {
                println!("{:<32} {:<24} {}", alg.name(), alg.group().display_name(), alg.display_name());
            }
        }
        Commands::Describe { algorithm } => {
            describe(provider.algorithm(&algorithm)?);
        }
        Commands::Run { algorithm, params } => {
            let alg = provider.algorithm(&algorithm)?;
            let raw = params.iter().map(|p| split_param(p)).collect::<Result<Vec<_>>>()?;
            let params = Parameters::parse(&alg.parameters(), raw)?;
            log::debug!("{} parameters: {params:?}", alg.name());

            let ctx = ProcessingContext::new(&config);
            let outputs = alg
                .run(&ctx, &params, &mut ConsoleFeedback)
                .with_context(|| format!("Failed to run {}", alg.name()))?;

            for (name, path) in outputs {
                println!("{name}: {}", path.display());
            }
        }
        Commands::AssignCrs { file, crs } => {
            inf::fs::ensure_file_exists(&file)?;
            // warnings end up in the log
            if !pcr::propagate_crs_from_wkt(&file, &crs, Some(&mut LogFeedback))? {
                anyhow::bail!("No coordinate system assigned to {}", file.display());
            }
        }
    }

    Ok(())
}
