use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::{Error, RasterLayer, Result};

/// Extension of the rasters written by the engine
pub const OUTPUT_RASTER_EXTENSION: &str = "map";

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterKind {
    Raster,
    MultipleRasters,
    Number { default: Option<f64> },
    Enum { options: &'static [&'static str], default: usize },
    File,
    RasterDestination,
    FileDestination,
}

impl ParameterKind {
    pub fn is_destination(&self) -> bool {
        matches!(self, ParameterKind::RasterDestination | ParameterKind::FileDestination)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParameterKind,
    pub optional: bool,
}

impl ParameterDefinition {
    pub const fn new(name: &'static str, description: &'static str, kind: ParameterKind) -> Self {
        ParameterDefinition {
            name,
            description,
            kind,
            optional: false,
        }
    }

    pub const fn raster(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, ParameterKind::Raster)
    }

    pub const fn rasters(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, ParameterKind::MultipleRasters)
    }

    pub const fn number(name: &'static str, description: &'static str, default: Option<f64>) -> Self {
        Self::new(name, description, ParameterKind::Number { default })
    }

    pub const fn choice(name: &'static str, description: &'static str, options: &'static [&'static str], default: usize) -> Self {
        Self::new(name, description, ParameterKind::Enum { options, default })
    }

    pub const fn file(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, ParameterKind::File)
    }

    pub const fn raster_destination(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, ParameterKind::RasterDestination)
    }

    pub const fn file_destination(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, ParameterKind::FileDestination)
    }

    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    fn parse(&self, value: &str) -> Result<ParameterValue> {
        Ok(match &self.kind {
            ParameterKind::Raster => ParameterValue::Raster(PathBuf::from(value)),
            ParameterKind::MultipleRasters => ParameterValue::Rasters(vec![PathBuf::from(value)]),
            ParameterKind::Number { .. } => {
                let number: f64 = value
                    .trim()
                    .parse()
                    .map_err(|_| self.invalid(format!("'{value}' is not a number")))?;
                // pcrcalc has no literal for these
                if !number.is_finite() {
                    return Err(self.invalid(format!("'{value}' is not a finite number")));
                }
                ParameterValue::Number(number)
            }
            ParameterKind::Enum { options, .. } => ParameterValue::Enum(self.parse_choice(options, value)?),
            ParameterKind::File => ParameterValue::File(PathBuf::from(value)),
            ParameterKind::RasterDestination | ParameterKind::FileDestination => {
                ParameterValue::Destination(PathBuf::from(value))
            }
        })
    }

    /// Accepts the option index or its label (case insensitive)
    fn parse_choice(&self, options: &[&str], value: &str) -> Result<usize> {
        let value = value.trim();
        if let Ok(index) = value.parse::<usize>() {
            return self.check_choice(options, index);
        }

        options
            .iter()
            .position(|opt| opt.eq_ignore_ascii_case(value))
            .ok_or_else(|| self.invalid(format!("'{value}' is not one of: {}", options.join(", "))))
    }

    fn check_choice(&self, options: &[&str], index: usize) -> Result<usize> {
        if index >= options.len() {
            return Err(self.invalid(format!("option index {index} out of range (0-{})", options.len() - 1)));
        }

        Ok(index)
    }

    fn default_value(&self) -> Option<ParameterValue> {
        match &self.kind {
            ParameterKind::Number { default } => default.map(ParameterValue::Number),
            ParameterKind::Enum { default, .. } => Some(ParameterValue::Enum(*default)),
            _ => None,
        }
    }

    /// Checks the value matches the kind of this parameter and normalizes it
    fn validate(&self, value: &ParameterValue) -> Result<ParameterValue> {
        match (&self.kind, value) {
            (ParameterKind::Raster, ParameterValue::Raster(_))
            | (ParameterKind::File, ParameterValue::File(_))
            | (ParameterKind::Number { .. }, ParameterValue::Number(_))
            | (ParameterKind::FileDestination, ParameterValue::Destination(_)) => Ok(value.clone()),
            (ParameterKind::MultipleRasters, ParameterValue::Rasters(paths)) => {
                if paths.is_empty() {
                    return Err(self.invalid("at least one raster is required"));
                }
                Ok(value.clone())
            }
            (ParameterKind::MultipleRasters, ParameterValue::Raster(path)) => Ok(ParameterValue::Rasters(vec![path.clone()])),
            (ParameterKind::Enum { options, .. }, ParameterValue::Enum(index)) => {
                Ok(ParameterValue::Enum(self.check_choice(options, *index)?))
            }
            (ParameterKind::RasterDestination, ParameterValue::Destination(path)) => {
                Ok(ParameterValue::Destination(self.raster_output_path(path)?))
            }
            _ => Err(self.invalid(format!("unexpected value {value:?}"))),
        }
    }

    /// The engine only writes PCRaster maps, a missing extension is added
    fn raster_output_path(&self, path: &Path) -> Result<PathBuf> {
        match path.extension() {
            None => Ok(path.with_extension(OUTPUT_RASTER_EXTENSION)),
            Some(ext) if ext.eq_ignore_ascii_case(OUTPUT_RASTER_EXTENSION) => Ok(path.to_path_buf()),
            Some(ext) => Err(self.invalid(format!(
                "unsupported output raster extension '{}', supported: {OUTPUT_RASTER_EXTENSION}",
                ext.to_string_lossy()
            ))),
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> Error {
        Error::InvalidParameter {
            name: self.name.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Raster(PathBuf),
    Rasters(Vec<PathBuf>),
    Number(f64),
    Enum(usize),
    File(PathBuf),
    Destination(PathBuf),
}

/// Parameter values of a single algorithm invocation, keyed by parameter name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: BTreeMap<String, ParameterValue>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: ParameterValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: ParameterValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Parses `NAME=VALUE` style input, repeating a multiple raster parameter appends to it
    pub fn parse<'a>(definitions: &[ParameterDefinition], raw: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Parameters> {
        let mut params = Parameters::new();
        for (name, value) in raw {
            let def = definitions
                .iter()
                .find(|def| def.name.eq_ignore_ascii_case(name.trim()))
                .ok_or_else(|| Error::InvalidParameter {
                    name: name.to_string(),
                    reason: "unknown parameter".to_string(),
                })?;

            let parsed = match (params.values.remove(def.name), def.parse(value)?) {
                (Some(ParameterValue::Rasters(mut existing)), ParameterValue::Rasters(extra)) => {
                    existing.extend(extra);
                    ParameterValue::Rasters(existing)
                }
                (_, parsed) => parsed,
            };
            params.set(def.name, parsed);
        }

        Ok(params)
    }

    /// Validates the values against the definitions, fills in defaults and rejects unknown or missing values
    pub fn resolve(&self, definitions: &[ParameterDefinition]) -> Result<Parameters> {
        if let Some(unknown) = self.values.keys().find(|name| !definitions.iter().any(|def| def.name == name.as_str())) {
            return Err(Error::InvalidParameter {
                name: unknown.clone(),
                reason: "unknown parameter".to_string(),
            });
        }

        let mut resolved = Parameters::new();
        for def in definitions {
            match self.values.get(def.name).map(|value| def.validate(value)).transpose()? {
                Some(value) => resolved.set(def.name, value),
                None => match def.default_value() {
                    Some(value) => resolved.set(def.name, value),
                    None if def.optional => {}
                    None => return Err(Error::MissingParameter(def.name.to_string())),
                },
            }
        }

        Ok(resolved)
    }

    fn get(&self, name: &str) -> Result<&ParameterValue> {
        self.values.get(name).ok_or_else(|| Error::MissingParameter(name.to_string()))
    }

    fn type_mismatch(name: &str, expected: &str) -> Error {
        Error::InvalidParameter {
            name: name.to_string(),
            reason: format!("expected a {expected}"),
        }
    }

    pub fn raster_path(&self, name: &str) -> Result<&Path> {
        match self.get(name)? {
            ParameterValue::Raster(path) => Ok(path),
            _ => Err(Self::type_mismatch(name, "raster")),
        }
    }

    /// Opens the raster layer, this also reads its spatial reference
    pub fn raster(&self, name: &str) -> Result<RasterLayer> {
        RasterLayer::open(self.raster_path(name)?)
    }

    pub fn optional_raster(&self, name: &str) -> Result<Option<RasterLayer>> {
        if !self.contains(name) {
            return Ok(None);
        }

        self.raster(name).map(Some)
    }

    pub fn raster_paths(&self, name: &str) -> Result<&[PathBuf]> {
        match self.get(name)? {
            ParameterValue::Rasters(paths) => Ok(paths),
            ParameterValue::Raster(path) => Ok(std::slice::from_ref(path)),
            _ => Err(Self::type_mismatch(name, "list of rasters")),
        }
    }

    pub fn rasters(&self, name: &str) -> Result<Vec<RasterLayer>> {
        self.raster_paths(name)?.iter().map(RasterLayer::open).collect()
    }

    pub fn number(&self, name: &str) -> Result<f64> {
        match self.get(name)? {
            ParameterValue::Number(value) => Ok(*value),
            _ => Err(Self::type_mismatch(name, "number")),
        }
    }

    pub fn choice(&self, name: &str) -> Result<usize> {
        match self.get(name)? {
            ParameterValue::Enum(index) => Ok(*index),
            _ => Err(Self::type_mismatch(name, "option index")),
        }
    }

    pub fn file(&self, name: &str) -> Result<&Path> {
        match self.get(name)? {
            ParameterValue::File(path) => {
                inf::fs::ensure_file_exists(path)?;
                Ok(path)
            }
            _ => Err(Self::type_mismatch(name, "file")),
        }
    }

    pub fn destination(&self, name: &str) -> Result<&Path> {
        match self.get(name)? {
            ParameterValue::Destination(path) => Ok(path),
            _ => Err(Self::type_mismatch(name, "destination")),
        }
    }
}
