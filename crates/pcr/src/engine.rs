//! Invocation of the PCRaster command line applications.
//!
//! Every call spawns the executable directly with its own argument list, engine options
//! are passed as command line flags so invocations never share state.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use strum::Display;

use crate::expression::Assignment;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Application {
    Pcrcalc,
    Col2map,
    Map2col,
    Resample,
}

impl Application {
    fn executable_name(&self) -> String {
        format!("{}{}", self, std::env::consts::EXE_SUFFIX)
    }
}

/// Units used for distances and areas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthUnits {
    #[default]
    Map,
    Cells,
}

/// Handling of pits on the edge of a local drain direction network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PitsAtEdge {
    #[default]
    Keep,
    Remove,
}

/// How elevations in pits are modified when creating a depressionless DEM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PitElevation {
    #[default]
    Fill,
    Cut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Adjacency {
    #[default]
    Diagonal,
    NonDiagonal,
}

/// Engine options of a single pcrcalc run, only the options that are set are passed on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    pub units: Option<LengthUnits>,
    pub pits_at_edge: Option<PitsAtEdge>,
    pub pit_elevation: Option<PitElevation>,
    pub adjacency: Option<Adjacency>,
}

impl GlobalOptions {
    pub fn to_args(&self) -> Vec<&'static str> {
        let mut args = Vec::new();

        if let Some(units) = self.units {
            args.push(match units {
                LengthUnits::Map => "--unittrue",
                LengthUnits::Cells => "--unitcell",
            });
        }

        if let Some(edge) = self.pits_at_edge {
            args.push(match edge {
                PitsAtEdge::Keep => "--lddout",
                PitsAtEdge::Remove => "--lddin",
            });
        }

        if let Some(elevation) = self.pit_elevation {
            args.push(match elevation {
                PitElevation::Fill => "--lddfill",
                PitElevation::Cut => "--lddcut",
            });
        }

        if let Some(adjacency) = self.adjacency {
            args.push(match adjacency {
                Adjacency::Diagonal => "--diagonal",
                Adjacency::NonDiagonal => "--nondiagonal",
            });
        }

        args
    }
}

/// A located PCRaster installation
#[derive(Debug, Clone)]
pub struct Engine {
    search_dir: Option<PathBuf>,
    pcrcalc: PathBuf,
}

impl Engine {
    /// Locates the installation, the directory is searched before `PATH`.
    /// Fails with [`Error::EngineUnavailable`] when `pcrcalc` can not be found.
    pub fn detect(search_dir: Option<&Path>) -> Result<Engine> {
        let pcrcalc = find_executable(Application::Pcrcalc, search_dir)?;
        log::debug!("Using pcrcalc: {}", pcrcalc.display());

        Ok(Engine {
            search_dir: search_dir.map(Path::to_path_buf),
            pcrcalc,
        })
    }

    pub fn executable(&self, app: Application) -> Result<PathBuf> {
        match app {
            Application::Pcrcalc => Ok(self.pcrcalc.clone()),
            _ => find_executable(app, self.search_dir.as_deref()),
        }
    }

    /// Runs the application to completion and returns its standard output
    pub fn run<I, S>(&self, app: Application, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args.into_iter().map(|arg| arg.as_ref().to_os_string()).collect();
        let exe = self.executable(app)?;
        log::debug!(
            "{} {}",
            exe.display(),
            args.iter().map(|arg| arg.to_string_lossy()).collect::<Vec<_>>().join(" ")
        );

        let output = Command::new(&exe).args(&args).output()?;
        if !output.status.success() {
            return Err(Error::EngineFailure {
                application: app.to_string(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Evaluates a single assignment, the clone map defines the extent of non-spatial results
    pub fn pcrcalc(&self, assignment: &Assignment, clone: Option<&Path>, options: &GlobalOptions) -> Result<()> {
        inf::fs::create_directory_for_file(&assignment.target)?;
        self.run(Application::Pcrcalc, pcrcalc_args(assignment, clone, options))?;
        Ok(())
    }
}

fn pcrcalc_args(assignment: &Assignment, clone: Option<&Path>, options: &GlobalOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = options.to_args().into_iter().map(OsString::from).collect();
    if let Some(clone) = clone {
        args.push("--clone".into());
        args.push(clone.into());
    }
    args.push(assignment.to_string().into());
    args
}

fn find_executable(app: Application, search_dir: Option<&Path>) -> Result<PathBuf> {
    let path_env = std::env::var_os("PATH");
    let dirs = search_dir
        .map(Path::to_path_buf)
        .into_iter()
        .chain(path_env.iter().flat_map(std::env::split_paths));

    find_in_directories(&app.executable_name(), dirs)
}

fn find_in_directories(name: &str, dirs: impl IntoIterator<Item = PathBuf>) -> Result<PathBuf> {
    dirs.into_iter()
        .map(|dir| dir.join(name))
        .find(|exe| exe.is_file())
        .ok_or_else(|| Error::EngineUnavailable(format!("{name} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Expression;

    #[test]
    fn global_option_flags() {
        assert!(GlobalOptions::default().to_args().is_empty());

        let options = GlobalOptions {
            units: Some(LengthUnits::Cells),
            pits_at_edge: Some(PitsAtEdge::Keep),
            pit_elevation: Some(PitElevation::Cut),
            adjacency: Some(Adjacency::NonDiagonal),
        };
        assert_eq!(options.to_args(), ["--unitcell", "--lddout", "--lddcut", "--nondiagonal"]);

        let options = GlobalOptions {
            units: Some(LengthUnits::Map),
            pits_at_edge: Some(PitsAtEdge::Remove),
            ..Default::default()
        };
        assert_eq!(options.to_args(), ["--unittrue", "--lddin"]);
    }

    #[test]
    fn pcrcalc_command_line() {
        let assignment = Assignment::new("out.map", Expression::call("cellarea", vec![]));
        let options = GlobalOptions {
            units: Some(LengthUnits::Map),
            ..Default::default()
        };

        let args = pcrcalc_args(&assignment, Some(Path::new("clone.map")), &options);
        assert_eq!(args, ["--unittrue", "--clone", "clone.map", "out.map = cellarea()"]);
    }

    #[test_log::test]
    fn missing_installation() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        assert!(matches!(
            find_in_directories("map2col", [tmp.path().to_path_buf()]),
            Err(Error::EngineUnavailable(msg)) if msg == "map2col not found"
        ));

        Ok(())
    }

    #[cfg(unix)]
    #[test_log::test]
    fn executable_in_search_dir_takes_precedence() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let exe = tmp.path().join("pcrcalc");
        std::fs::write(&exe, "#!/bin/sh\necho \"$@\"\n")?;

        let engine = Engine::detect(Some(tmp.path()))?;
        assert_eq!(engine.executable(Application::Pcrcalc)?, exe);

        Ok(())
    }

    #[cfg(unix)]
    #[test_log::test]
    fn failing_application() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir()?;
        let exe = tmp.path().join("pcrcalc");
        std::fs::write(&exe, "#!/bin/sh\necho \"ERROR: unknown function\" >&2\nexit 1\n")?;
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755))?;

        let engine = Engine::detect(Some(tmp.path()))?;
        match engine.run(Application::Pcrcalc, ["out.map = foo(in.map)"]) {
            Err(Error::EngineFailure { application, code, stderr }) => {
                assert_eq!(application, "pcrcalc");
                assert_eq!(code, 1);
                assert_eq!(stderr, "ERROR: unknown function");
            }
            other => panic!("Unexpected result: {other:?}"),
        }

        Ok(())
    }
}
