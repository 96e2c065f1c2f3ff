//! PCRaster operators that map one to one on a pcrcalc function.
//!
//! Each operator is described by a static definition: the function arguments in call order,
//! the engine options it honours and the functions producing its outputs.
//! Every output is written by its own pcrcalc run, using the first raster argument as clone map.

use crate::engine::{Adjacency, GlobalOptions, LengthUnits, PitElevation, PitsAtEdge};
use crate::expression::{Assignment, Expression};
use crate::{Error, Feedback, RasterLayer, Result};

use super::algorithm::{self, Algorithm, Group, Outputs};
use super::{ParameterDefinition, Parameters, ProcessingContext};

#[derive(Debug, Clone, Copy)]
enum Argument {
    Raster(&'static str, &'static str),
    Number(&'static str, &'static str, f64),
    /// Text table passed to the function
    Table(&'static str, &'static str),
    /// Raster only defining the extent, not passed to the function
    Extent(&'static str, &'static str),
}

impl Argument {
    fn definition(&self) -> ParameterDefinition {
        match *self {
            Argument::Raster(name, description) | Argument::Extent(name, description) => {
                ParameterDefinition::raster(name, description)
            }
            Argument::Number(name, description, default) => ParameterDefinition::number(name, description, Some(default)),
            Argument::Table(name, description) => ParameterDefinition::file(name, description),
        }
    }

    fn raster_name(&self) -> Option<&'static str> {
        match *self {
            Argument::Raster(name, _) | Argument::Extent(name, _) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineOption {
    Units,
    PitsAtEdge,
    PitElevation,
    Adjacency,
}

impl EngineOption {
    fn definition(&self) -> ParameterDefinition {
        match self {
            EngineOption::Units => ParameterDefinition::choice("UNITS", "Units", &["Map units", "Cells"], 0),
            EngineOption::PitsAtEdge => ParameterDefinition::choice("EDGE", "Remove pits at edge?", &["No", "Yes"], 0),
            EngineOption::PitElevation => {
                ParameterDefinition::choice("DEM_MODE", "Assignment of elevation in pits", &["Fill", "Cut"], 0)
            }
            EngineOption::Adjacency => ParameterDefinition::choice(
                "ADJACENCY",
                "Neighbourhood",
                &["Diagonal (8 cell)", "Non-diagonal (4 cell)"],
                0,
            ),
        }
    }

    fn apply(&self, choice: usize, options: &mut GlobalOptions) {
        let first = choice == 0;
        match self {
            EngineOption::Units => options.units = Some(if first { LengthUnits::Map } else { LengthUnits::Cells }),
            EngineOption::PitsAtEdge => options.pits_at_edge = Some(if first { PitsAtEdge::Keep } else { PitsAtEdge::Remove }),
            EngineOption::PitElevation => {
                options.pit_elevation = Some(if first { PitElevation::Fill } else { PitElevation::Cut })
            }
            EngineOption::Adjacency => {
                options.adjacency = Some(if first { Adjacency::Diagonal } else { Adjacency::NonDiagonal })
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Output {
    name: &'static str,
    function: &'static str,
    description: &'static str,
}

/// A pcrcalc function exposed as algorithm
#[derive(Debug)]
pub struct Operator {
    name: &'static str,
    display_name: &'static str,
    group: Group,
    help: &'static str,
    page: &'static str,
    arguments: &'static [Argument],
    options: &'static [EngineOption],
    outputs: &'static [Output],
}

macro_rules! raster {
    ($name:literal, $desc:literal) => {
        Argument::Raster($name, $desc)
    };
}

macro_rules! number {
    ($name:literal, $desc:literal, $default:expr) => {
        Argument::Number($name, $desc, $default)
    };
}

macro_rules! output {
    ($name:literal, $function:literal, $desc:literal) => {
        Output {
            name: $name,
            function: $function,
            description: $desc,
        }
    };
}

macro_rules! operator {
    // single output computed by the function with the operator name
    ($name:literal, $group:ident, $help:literal, [$($arg:expr),* $(,)?], [$($opt:ident),* $(,)?], $out:literal) => {
        operator!(
            $name,
            $name,
            $group,
            concat!("op_", $name, ".html"),
            $help,
            [$($arg),*],
            [$($opt),*],
            [output!("OUTPUT", $name, $out)]
        )
    };
    ($name:literal, $display:expr, $group:ident, $page:expr, $help:literal,
     [$($arg:expr),* $(,)?], [$($opt:ident),* $(,)?], [$($out:expr),+ $(,)?]) => {
        Operator {
            name: $name,
            display_name: $display,
            group: Group::$group,
            help: $help,
            page: $page,
            arguments: &[$($arg),*],
            options: &[$(EngineOption::$opt),*],
            outputs: &[$($out),+],
        }
    };
}

/// Accumulation operators computing a flux and a state output
macro_rules! accumulation {
    ($flux:literal, $state:literal, $page:literal, $help:literal, $third:literal) => {
        operator!(
            $flux,
            concat!($flux, " and ", $state),
            Hydrological,
            $page,
            $help,
            [
                raster!("INPUT", "Flow direction (LDD) layer"),
                raster!("INPUT2", "Material layer"),
                raster!("INPUT3", $third),
            ],
            [],
            [
                output!("OUTPUT", $flux, "Material flux layer"),
                output!("OUTPUT2", $state, "State layer"),
            ]
        )
    };
}

pub(crate) static OPERATORS: &[Operator] = &[
    // mathematical operators
    operator!("abs", Operators, "Absolute value", [raster!("INPUT", "Raster layer")], [], "Absolute value layer"),
    operator!("acos", Operators, "Inverse cosine", [raster!("INPUT", "Scalar raster layer")], [], "Inverse cosine layer"),
    operator!("asin", Operators, "Inverse sine", [raster!("INPUT", "Scalar raster layer")], [], "Inverse sine layer"),
    operator!("cos", Operators, "Cosine", [raster!("INPUT", "Directional or scalar raster layer")], [], "Cosine layer"),
    operator!("tan", Operators, "Tangent", [raster!("INPUT", "Directional or scalar raster layer")], [], "Tangent layer"),
    operator!("exp", Operators, "Base e exponential", [raster!("INPUT", "Scalar raster layer")], [], "Exponential layer"),
    operator!("log10", Operators, "Log 10", [raster!("INPUT", "Scalar raster layer")], [], "Log 10 layer"),
    operator!("sqr", Operators, "Square", [raster!("INPUT", "Scalar raster layer")], [], "Square layer"),
    operator!(
        "rounddown",
        Operators,
        "Rounding down of cell values to whole numbers",
        [raster!("INPUT", "Scalar raster layer")],
        [],
        "Rounddown layer"
    ),
    operator!(
        "roundup",
        Operators,
        "Rounding up of cell values to whole numbers",
        [raster!("INPUT", "Scalar raster layer")],
        [],
        "Roundup layer"
    ),
    // hydrology
    operator!(
        "accuflux",
        Hydrological,
        "Accumulated material flowing into downstream cell",
        [raster!("INPUT", "Flow direction (LDD) layer"), raster!("INPUT2", "Material layer")],
        [],
        "Result flux layer"
    ),
    accumulation!(
        "accucapacityflux",
        "accucapacitystate",
        "op_accucapacity.html",
        "Transport of material downstream over a local drain direction network",
        "Transport capacity layer"
    ),
    accumulation!(
        "accufractionflux",
        "accufractionstate",
        "op_accufraction.html",
        "Fractional material transport downstream over local drain direction network",
        "Transport fraction layer"
    ),
    accumulation!(
        "accuthresholdflux",
        "accuthresholdstate",
        "op_accuthreshold.html",
        "Input of material downstream over a local drain direction network when transport threshold is exceeded",
        "Transport threshold layer"
    ),
    accumulation!(
        "accutriggerflux",
        "accutriggerstate",
        "op_accutrigger.html",
        "Input of material downstream over a local drain direction network when transport trigger is exceeded",
        "Transport trigger layer"
    ),
    operator!(
        "accutraveltimefractionflux",
        "accutraveltimefractionflux, accutraveltimefractionstate and accutraveltimefractionremoved",
        Hydrological,
        "op_accutraveltimefraction.html",
        "Transports material downstream over a distance dependent on a given velocity",
        [
            raster!("INPUT", "Flow direction (LDD) layer"),
            raster!("INPUT2", "Material layer"),
            raster!("INPUT3", "Velocity layer"),
            raster!("INPUT4", "Fraction layer"),
        ],
        [],
        [
            output!("OUTPUT", "accutraveltimefractionflux", "Material flux layer"),
            output!("OUTPUT2", "accutraveltimefractionstate", "State layer"),
            output!("OUTPUT3", "accutraveltimefractionremoved", "Removed material layer"),
        ]
    ),
    operator!(
        "catchment",
        Hydrological,
        "Catchment(s) of one or more specified cells",
        [raster!("INPUT", "LDD layer"), raster!("INPUT2", "Outlet layer")],
        [],
        "Catchment layer"
    ),
    operator!(
        "subcatchment",
        Hydrological,
        "(Sub-)Catchment(s) (watershed, basin) of each one or more specified cells",
        [raster!("INPUT", "LDD layer"), raster!("INPUT2", "Outlet layer")],
        [],
        "(Sub)catchment layer"
    ),
    operator!(
        "catchmenttotal",
        Hydrological,
        "Total catchment for the entire upstream area",
        [raster!("INPUT", "Material layer"), raster!("INPUT2", "LDD layer")],
        [],
        "Catchment total layer"
    ),
    operator!(
        "downstream",
        Hydrological,
        "Cell gets value of the neighbouring downstream cell",
        [raster!("INPUT", "LDD layer"), raster!("INPUT2", "Raster layer")],
        [],
        "Downstream layer"
    ),
    operator!(
        "upstream",
        Hydrological,
        "Sum of the cell values of its first upstream cell(s)",
        [raster!("INPUT", "LDD layer"), raster!("INPUT2", "Material layer")],
        [],
        "Upstream layer"
    ),
    operator!(
        "downstreamdist",
        Hydrological,
        "Distance to the first cell downstream",
        [raster!("INPUT", "LDD layer")],
        [Units],
        "Downstream distance layer"
    ),
    operator!(
        "lddcreate",
        Hydrological,
        "Local drain direction map with flow directions from each cell to its steepest downslope neighbour",
        [
            raster!("INPUT", "DEM layer"),
            number!("OUTFLOW_DEPTH", "Outflow depth", 9999999.0),
            number!("CORE_AREA", "Core area", 9999999.0),
            number!("CORE_VOLUME", "Core volume", 9999999.0),
            number!("PRECIPITATION", "Catchment precipitation", 9999999.0),
        ],
        [PitsAtEdge, Units],
        "Local drain direction layer"
    ),
    operator!(
        "lddcreatedem",
        Hydrological,
        "Modified digital elevation model",
        [
            raster!("INPUT", "DEM layer"),
            number!("OUTFLOW_DEPTH", "Outflow depth", 9999999.0),
            number!("CORE_AREA", "Core area", 9999999.0),
            number!("CORE_VOLUME", "Core volume", 9999999.0),
            number!("PRECIPITATION", "Catchment precipitation", 9999999.0),
        ],
        [PitsAtEdge, PitElevation, Units],
        "Filled DEM"
    ),
    operator!(
        "ldddist",
        Hydrological,
        "Friction-distance from the cell under consideration to downstream nearest TRUE cell",
        [
            raster!("INPUT", "LDD layer"),
            raster!("INPUT2", "Cells to which distance is calculated (boolean)"),
            raster!("INPUT3", "Friction layer"),
        ],
        [Units],
        "Result distance layer"
    ),
    operator!(
        "lddmask",
        Hydrological,
        "Local drain direction map cut into a (smaller) sound local drain direction map",
        [raster!("INPUT", "LDD layer"), raster!("INPUT2", "Mask layer")],
        [],
        "Result lddmask layer"
    ),
    operator!(
        "lddrepair",
        Hydrological,
        "Reparation of unsound local drain direction map",
        [raster!("INPUT", "LDD layer")],
        [],
        "Repaired LDD layer"
    ),
    operator!(
        "path",
        Hydrological,
        "Path over the local drain direction network downstream to its pit",
        [raster!("INPUT", "LDD layer"), raster!("INPUT2", "Points layer")],
        [],
        "Result path layer"
    ),
    operator!("pit", Hydrological, "Unique value for each pit cell", [raster!("INPUT", "LDD layer")], [], "Pit layer"),
    operator!(
        "streamorder",
        Hydrological,
        "Stream order index of all cells on a local drain direction network",
        [raster!("INPUT", "LDD layer")],
        [],
        "Stream order layer"
    ),
    operator!(
        "slopelength",
        Hydrological,
        "Accumulative-friction-distance of the longest accumulative-friction-path upstream over the local drain direction network cells against waterbasin divides",
        [raster!("INPUT", "LDD layer"), raster!("INPUT2", "Friction layer")],
        [Units],
        "Result slope length layer"
    ),
    operator!(
        "transient",
        Hydrological,
        "Simulates transient groundwater flow according to the implicit finite difference method",
        [
            raster!("INPUT", "Elevation layer"),
            raster!("INPUT2", "Recharge layer"),
            raster!("INPUT3", "Transmissivity layer"),
            raster!("INPUT4", "Flow condition layer"),
            number!("STORAGE", "Storage coefficient", 0.5),
            number!("TIMESTEP", "Time step", 10.0),
            number!("TOLERANCE", "Tolerance", 10.0),
        ],
        [],
        "Transient layer"
    ),
    // area operations
    operator!(
        "areaarea",
        Area,
        "The area of the area to which a cell belongs",
        [raster!("INPUT", "Class raster layer")],
        [Units],
        "Area layer"
    ),
    operator!(
        "areaaverage",
        Area,
        "Average cell value within an area",
        [raster!("INPUT", "Scalar raster layer"), raster!("INPUT2", "Class raster layer")],
        [],
        "Area average layer"
    ),
    operator!(
        "areadiversity",
        Area,
        "Number of unique cell values within an area",
        [raster!("INPUT", "Discrete raster layer"), raster!("INPUT2", "Class raster layer")],
        [],
        "Area diversity layer"
    ),
    operator!(
        "areamajority",
        Area,
        "Most often occurring cell value within an area",
        [raster!("INPUT", "Discrete raster layer"), raster!("INPUT2", "Class raster layer")],
        [],
        "Area majority layer"
    ),
    operator!(
        "areamaximum",
        Area,
        "Maximum cell value within an area",
        [raster!("INPUT", "Ordinal or scalar raster layer"), raster!("INPUT2", "Class raster layer")],
        [],
        "Area maximum layer"
    ),
    operator!(
        "areaminimum",
        Area,
        "Minimum cell value within an area",
        [raster!("INPUT", "Ordinal or scalar raster layer"), raster!("INPUT2", "Class raster layer")],
        [],
        "Area minimum layer"
    ),
    operator!(
        "areaorder",
        Area,
        "Within each area ordinal numbers to cells in ascending order",
        [raster!("INPUT", "Ordinal or scalar raster layer"), raster!("INPUT2", "Class raster layer")],
        [],
        "Area order layer"
    ),
    operator!(
        "areatotal",
        Area,
        "Sum of cell values within an area",
        [raster!("INPUT", "Scalar raster layer"), raster!("INPUT2", "Class raster layer")],
        [],
        "Area total layer"
    ),
    operator!(
        "areanormal",
        Area,
        "Value assigned to an area taken from a normal distribution",
        [raster!("INPUT", "Class raster layer")],
        [],
        "Area normal layer"
    ),
    operator!(
        "areauniform",
        Area,
        "Value assigned to area taken from a uniform distribution",
        [raster!("INPUT", "Class raster layer")],
        [],
        "Area uniform layer"
    ),
    operator!(
        "clump",
        Area,
        "Contiguous groups of cells with the same value ('clumps')",
        [raster!("INPUT", "Input raster layer")],
        [Adjacency],
        "Clump layer"
    ),
    // DEM derivatives
    operator!(
        "aspect",
        DemDerivatives,
        "Aspects of a map using a digital elevation model",
        [raster!("INPUT", "DEM layer")],
        [],
        "Aspect layer"
    ),
    operator!(
        "slope",
        DemDerivatives,
        "Slope of cells using a digital elevation model",
        [raster!("INPUT", "DEM layer")],
        [],
        "Slope layer"
    ),
    operator!(
        "plancurv",
        DemDerivatives,
        "Planform curvature calculation using a DEM",
        [raster!("INPUT", "DEM layer")],
        [],
        "Planform curvature layer"
    ),
    operator!(
        "profcurv",
        DemDerivatives,
        "Profile curvature calculation using a DEM",
        [raster!("INPUT", "DEM layer")],
        [],
        "Profile curvature layer"
    ),
    operator!(
        "horizontan",
        DemDerivatives,
        "Calculates the maximum tangent of the angles of neighbouring cells in the direction of the sun",
        [raster!("INPUT", "DEM layer"), number!("AZIMUTH", "Solar azimuth", 40.0)],
        [],
        "Horizontan layer"
    ),
    operator!(
        "view",
        DemDerivatives,
        "TRUE or FALSE value for visibility from viewpoint(s) defined by a digital elevation model",
        [raster!("INPUT", "DEM layer"), raster!("INPUT2", "Viewpoints layer")],
        [],
        "Viewshed layer"
    ),
    // map operations
    operator!(
        "cellarea",
        Map,
        "Area of one cell",
        [Argument::Extent("INPUT", "Raster layer")],
        [Units],
        "Cell area layer"
    ),
    operator!(
        "celllength",
        Map,
        "Horizontal and vertical length of a cell",
        [Argument::Extent("INPUT", "Raster layer")],
        [Units],
        "Cell length layer"
    ),
    operator!("maparea", Map, "Total map area", [raster!("INPUT", "Input raster layer")], [Units], "Map area layer"),
    operator!(
        "mapmaximum",
        Map,
        "Maximum cell value",
        [raster!("INPUT", "Input raster layer")],
        [],
        "Maximum value layer"
    ),
    operator!(
        "mapminimum",
        Map,
        "Minimum cell value",
        [raster!("INPUT", "Input raster layer")],
        [],
        "Minimum value layer"
    ),
    operator!("maptotal", Map, "Sum of all cell values", [raster!("INPUT", "Input raster layer")], [], "Map total layer"),
    operator!(
        "mapnormal",
        Map,
        "Cells get non spatial value taken from a normal distribution",
        [Argument::Extent("INPUT", "Mask raster layer")],
        [],
        "Map normal layer"
    ),
    operator!(
        "mapuniform",
        Map,
        "Cells get non spatial value taken from an uniform distribution",
        [Argument::Extent("INPUT", "Mask raster layer")],
        [],
        "Map uniform layer"
    ),
    // conditional and missing values
    operator!(
        "ifthen",
        "if then",
        Conditional,
        "op_ifthen.html",
        "Return missing values if condition is not met",
        [raster!("INPUT", "Boolean condition layer"), raster!("INPUT2", "True layer")],
        [],
        [output!("OUTPUT", "ifthen", "Output layer")]
    ),
    operator!(
        "ifthenelse",
        "if then else",
        Conditional,
        "op_ifthenelse.html",
        "Boolean condition determining whether value of the first or second expression is assigned to result",
        [
            raster!("INPUT", "Boolean condition layer"),
            raster!("INPUT2", "True layer"),
            raster!("INPUT3", "False layer"),
        ],
        [],
        [output!("OUTPUT", "ifthenelse", "Output layer")]
    ),
    operator!(
        "defined",
        MissingValues,
        "Boolean TRUE for non missing values and FALSE for missing values",
        [raster!("INPUT", "Raster layer")],
        [],
        "Defined layer"
    ),
    operator!(
        "inversedistance",
        MissingValues,
        "Interpolate values using inverse distance weighting",
        [
            raster!("INPUT", "Mask layer"),
            raster!("INPUT2", "Raster layer with values to be interpolated"),
            number!("POWER", "Power", 2.0),
            number!("RADIUS", "Radius", 0.0),
            number!("MAX_POINTS", "Maximum number of closest points", 0.0),
        ],
        [Units],
        "Inverse distance interpolation layer"
    ),
    // order
    operator!(
        "order",
        Order,
        "Ordinal numbers to cells in ascending order",
        [raster!("INPUT", "Scalar or ordinal raster layer")],
        [],
        "Order layer"
    ),
    operator!(
        "pred",
        Order,
        "Ordinal number of the next lower ordinal class",
        [raster!("INPUT", "Ordinal raster layer")],
        [],
        "Pred layer"
    ),
    operator!(
        "succ",
        Order,
        "Ordinal number of the next higher ordinal class",
        [raster!("INPUT", "Ordinal raster layer")],
        [],
        "Succ layer"
    ),
    operator!(
        "uniqueid",
        Order,
        "Unique whole value for each Boolean TRUE cell",
        [raster!("INPUT", "Boolean raster layer")],
        [],
        "Unique id layer"
    ),
    // proximity
    operator!(
        "spread",
        Proximity,
        "Total friction of the shortest accumulated friction path over a map with friction values from a source cell to cell under consideration",
        [
            raster!("INPUT", "Points layer"),
            raster!("INPUT2", "Initial friction layer"),
            raster!("INPUT3", "Friction layer"),
        ],
        [Units],
        "Shortest accumulated friction path layer"
    ),
    operator!(
        "spreadzone",
        Proximity,
        "Shortest friction-distance path over a map with friction from an identified source cell or cells to the cell under consideration",
        [
            raster!("INPUT", "Points layer"),
            raster!("INPUT2", "Initial friction layer"),
            raster!("INPUT3", "Friction layer"),
        ],
        [Units],
        "Spread zone layer"
    ),
    operator!(
        "spreadmax",
        Proximity,
        "Total friction of the shortest accumulated friction path over a map with friction values from a source cell to cell under consideration considering maximum spread distance",
        [
            raster!("INPUT", "Points layer"),
            raster!("INPUT2", "Initial friction layer"),
            raster!("INPUT3", "Friction layer"),
            number!("MAX_DISTANCE", "Maximum distance", 100.0),
        ],
        [Units],
        "Spread max layer"
    ),
    operator!(
        "spreadmaxzone",
        Proximity,
        "Shortest friction-distance path over a map with friction from an identified source cell or cells to the cell under consideration considering maximum spread distance",
        [
            raster!("INPUT", "Points layer"),
            raster!("INPUT2", "Initial friction layer"),
            raster!("INPUT3", "Friction layer"),
            number!("MAX_DISTANCE", "Maximum distance", 100.0),
        ],
        [Units],
        "Spread max zone layer"
    ),
    operator!(
        "spreadldd",
        Proximity,
        "Total friction of the shortest accumulated friction downstream path over a map with friction values from a source cell to cell under consideration",
        [
            raster!("INPUT", "LDD layer"),
            raster!("INPUT2", "Points layer"),
            raster!("INPUT3", "Initial friction layer"),
            raster!("INPUT4", "Friction layer"),
        ],
        [Units],
        "Spread LDD layer"
    ),
    operator!(
        "spreadlddzone",
        Proximity,
        "Shortest friction-distance path over map with friction from a source cell to cell under consideration, only paths in downstream direction from the source cell are considered",
        [
            raster!("INPUT", "LDD layer"),
            raster!("INPUT2", "Points layer"),
            raster!("INPUT3", "Initial friction layer"),
            raster!("INPUT4", "Friction layer"),
        ],
        [Units],
        "Spread LDD zone layer"
    ),
    operator!(
        "extentofview",
        Proximity,
        "Total length of the lines in a number of directions from the cell under consideration to the first cell with a different value",
        [raster!("INPUT", "Class raster layer"), number!("DIRECTIONS", "Number of directions", 4.0)],
        [],
        "Extent of view layer"
    ),
    // general
    operator!(
        "nodirection",
        General,
        "Cells with no direction (e.g. flat) get boolean TRUE and with direction get boolean FALSE",
        [raster!("INPUT", "Directional raster layer")],
        [],
        "No direction layer"
    ),
    operator!(
        "normal",
        General,
        "Boolean TRUE cell gets value taken from a normal distribution",
        [raster!("INPUT", "Boolean raster layer")],
        [],
        "Normal layer"
    ),
    operator!(
        "uniform",
        General,
        "Boolean TRUE cell gets value from an uniform distribution",
        [raster!("INPUT", "Boolean raster layer")],
        [],
        "Uniform layer"
    ),
    operator!(
        "lookuplinear",
        Data,
        "Assigns table key values with possible interpolation between key values",
        [Argument::Table("TABLE", "Lookup table"), raster!("INPUT", "Input raster layer")],
        [],
        "Output layer"
    ),
    // window operations
    operator!(
        "window4total",
        Window,
        "Sum the values of the four surrounding cells",
        [raster!("INPUT", "Scalar raster layer")],
        [],
        "Window4total layer"
    ),
    operator!(
        "windowaverage",
        Window,
        "Average of cell values within a specified square neighbourhood",
        [raster!("INPUT", "Input raster layer"), number!("WINDOW_LENGTH", "Window length", 100.0)],
        [Units],
        "Window average layer"
    ),
    operator!(
        "windowdiversity",
        Window,
        "Number of unique values within a specified square neighbourhood",
        [raster!("INPUT", "Input raster layer"), number!("WINDOW_LENGTH", "Window length", 100.0)],
        [Units],
        "Window diversity layer"
    ),
    operator!(
        "windowhighpass",
        Window,
        "Increases spatial frequency within a specified square neighbourhood",
        [raster!("INPUT", "Scalar raster layer"), number!("WINDOW_LENGTH", "Window length", 100.0)],
        [Units],
        "Window high pass layer"
    ),
    operator!(
        "windowtotal",
        Window,
        "Sum of values within a specified square neighbourhood",
        [raster!("INPUT", "Scalar raster layer"), number!("WINDOW_LENGTH", "Window length", 100.0)],
        [Units],
        "Window total layer"
    ),
];

impl Operator {
    /// The raster defining the extent of the outputs and providing their coordinate system
    fn primary_raster(&self) -> Result<&'static str> {
        self.arguments
            .iter()
            .find_map(Argument::raster_name)
            .ok_or_else(|| Error::Runtime(format!("Operator {} has no raster argument", self.name)))
    }

    fn global_options(&self, params: &Parameters) -> Result<GlobalOptions> {
        let mut options = GlobalOptions::default();
        for opt in self.options {
            opt.apply(params.choice(opt.definition().name)?, &mut options);
        }

        Ok(options)
    }

    fn call_arguments(&self, params: &Parameters) -> Result<Vec<Expression>> {
        let mut args = Vec::with_capacity(self.arguments.len());
        for arg in self.arguments {
            match *arg {
                Argument::Raster(name, _) => args.push(Expression::file(params.raster_path(name)?)),
                Argument::Number(name, _, _) => args.push(Expression::Number(params.number(name)?)),
                Argument::Table(name, _) => args.push(Expression::file(params.file(name)?)),
                Argument::Extent(..) => {}
            }
        }

        Ok(args)
    }
}

impl Algorithm for Operator {
    fn name(&self) -> &str {
        self.name
    }

    fn display_name(&self) -> &str {
        self.display_name
    }

    fn group(&self) -> Group {
        self.group
    }

    fn short_help(&self) -> &str {
        self.help
    }

    fn documentation_url(&self) -> Option<String> {
        Some(algorithm::documentation_url(self.page))
    }

    fn parameters(&self) -> Vec<ParameterDefinition> {
        self.arguments
            .iter()
            .map(Argument::definition)
            .chain(self.options.iter().map(EngineOption::definition))
            .chain(
                self.outputs
                    .iter()
                    .map(|out| ParameterDefinition::raster_destination(out.name, out.description)),
            )
            .collect()
    }

    fn process(&self, ctx: &ProcessingContext, params: &Parameters, feedback: &mut dyn Feedback) -> Result<Outputs> {
        let engine = ctx.engine()?;
        let primary = RasterLayer::open(params.raster_path(self.primary_raster()?)?)?;
        let options = self.global_options(params)?;
        let args = self.call_arguments(params)?;

        let mut outputs = Outputs::new();
        for out in self.outputs {
            algorithm::check_canceled(feedback)?;

            let assignment = Assignment::new(params.destination(out.name)?, Expression::call(out.function, args.clone()));
            feedback.push_info(&format!("pcrcalc {assignment}"));
            engine.pcrcalc(&assignment, Some(primary.path()), &options)?;

            algorithm::assign_output_crs(&assignment.target, &primary, feedback);
            outputs.insert(out.name.to_string(), assignment.target);
        }

        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::Path;

    use super::*;
    use crate::processing::ParameterValue;
    use crate::testutils::{self, CancelingFeedback, RecordingFeedback};

    fn operator(name: &str) -> &'static Operator {
        OPERATORS.iter().find(|op| op.name == name).unwrap()
    }

    #[test]
    fn operator_names_are_unique() {
        let names: HashSet<_> = OPERATORS.iter().map(|op| op.name).collect();
        assert_eq!(names.len(), OPERATORS.len());
    }

    #[test]
    fn every_operator_has_a_primary_raster() {
        for op in OPERATORS {
            assert!(op.primary_raster().is_ok(), "{}", op.name);

            let params = op.parameters();
            let names: HashSet<_> = params.iter().map(|def| def.name).collect();
            assert_eq!(names.len(), params.len(), "duplicate parameter names in {}", op.name);
        }
    }

    #[test]
    fn multi_output_operator() -> Result<()> {
        let op = operator("accutraveltimefractionflux");
        let params = Parameters::new()
            .with("INPUT", ParameterValue::Raster("ldd.map".into()))
            .with("INPUT2", ParameterValue::Raster("material.map".into()))
            .with("INPUT3", ParameterValue::Raster("velocity.map".into()))
            .with("INPUT4", ParameterValue::Raster("fraction.map".into()))
            .with("OUTPUT", ParameterValue::Destination("flux".into()))
            .with("OUTPUT2", ParameterValue::Destination("state".into()))
            .with("OUTPUT3", ParameterValue::Destination("removed".into()))
            .resolve(&op.parameters())?;

        let args = op.call_arguments(&params)?;
        let call = Expression::call(op.outputs[2].function, args).to_string();
        assert_eq!(
            call,
            "accutraveltimefractionremoved(ldd.map, material.map, velocity.map, fraction.map)"
        );
        assert_eq!(params.destination("OUTPUT3")?, Path::new("removed.map"));

        Ok(())
    }

    #[test]
    fn engine_options_with_defaults() -> Result<()> {
        let op = operator("lddcreatedem");
        let params = Parameters::new()
            .with("INPUT", ParameterValue::Raster("dem.map".into()))
            .with("DEM_MODE", ParameterValue::Enum(1))
            .with("OUTPUT", ParameterValue::Destination("filled.map".into()))
            .resolve(&op.parameters())?;

        assert_eq!(
            op.global_options(&params)?.to_args(),
            ["--unittrue", "--lddout", "--lddcut"]
        );
        assert_eq!(
            Expression::call("lddcreatedem", op.call_arguments(&params)?).to_string(),
            "lddcreatedem(dem.map, 9999999, 9999999, 9999999, 9999999)"
        );

        Ok(())
    }

    #[test]
    fn clone_only_operator() -> Result<()> {
        let op = operator("cellarea");
        let params = Parameters::new()
            .with("INPUT", ParameterValue::Raster("dem.map".into()))
            .with("UNITS", ParameterValue::Enum(1))
            .with("OUTPUT", ParameterValue::Destination("area.map".into()))
            .resolve(&op.parameters())?;

        assert!(op.call_arguments(&params)?.is_empty());
        assert_eq!(op.primary_raster()?, "INPUT");
        assert_eq!(op.global_options(&params)?.to_args(), ["--unitcell"]);

        Ok(())
    }

    #[test]
    fn documentation_page() {
        assert_eq!(
            operator("accucapacityflux").documentation_url().as_deref(),
            Some("https://pcraster.geo.uu.nl/pcraster/latest/documentation/pcraster_manual/sphinx/op_accucapacity.html")
        );
        assert_eq!(operator("slope").display_name(), "slope");
        assert_eq!(operator("accufractionflux").display_name(), "accufractionflux and accufractionstate");
    }

    #[cfg(unix)]
    fn accucapacity_params(dir: &Path) -> Result<Parameters> {
        Ok(Parameters::new()
            .with("INPUT", ParameterValue::Raster(testutils::create_vicgrid_raster(dir, "ldd.tif")?))
            .with("INPUT2", ParameterValue::Raster(testutils::create_test_raster(dir, "material.tif")?))
            .with("INPUT3", ParameterValue::Raster(testutils::create_test_raster(dir, "capacity.tif")?))
            .with("OUTPUT", ParameterValue::Destination(dir.join("out").join("flux")))
            .with("OUTPUT2", ParameterValue::Destination(dir.join("out").join("state"))))
    }

    #[cfg(unix)]
    #[test_log::test]
    fn every_output_gets_the_primary_projection() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let ctx = ProcessingContext::with_engine(testutils::fake_engine(tmp.path())?);

        let mut feedback = RecordingFeedback::default();
        let outputs = operator("accucapacityflux").run(&ctx, &accucapacity_params(tmp.path())?, &mut feedback)?;

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs["OUTPUT"], tmp.path().join("out").join("flux.map"));
        assert_eq!(outputs["OUTPUT2"], tmp.path().join("out").join("state.map"));
        for output in outputs.values() {
            assert!(testutils::read_projection(output)?.contains("GDA94 / Vicgrid"), "{}", output.display());
        }

        assert!(feedback.errors.is_empty(), "{:?}", feedback.errors);
        assert_eq!(feedback.infos.len(), 2);
        assert!(feedback.infos[1].starts_with("pcrcalc "));
        assert!(feedback.infos[1].contains("accucapacitystate("));

        Ok(())
    }

    #[cfg(unix)]
    #[test_log::test]
    fn canceled_operator_runs_nothing() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let ctx = ProcessingContext::with_engine(testutils::fake_engine(tmp.path())?);

        let mut feedback = CancelingFeedback::default();
        assert!(matches!(
            operator("accucapacityflux").run(&ctx, &accucapacity_params(tmp.path())?, &mut feedback),
            Err(Error::Runtime(msg)) if msg == "Operation canceled"
        ));
        assert!(feedback.infos.is_empty());
        assert!(!tmp.path().join("out").exists());

        Ok(())
    }
}
