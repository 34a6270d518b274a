use crate::error::PrepError;
use crate::io::datafile::{DataDocument, DataValue, IniDocument, RunConfigSink};
use crate::io::gauges::Gauge;
use crate::io::topo::{TopoHeader, TopoType};
use std::str::FromStr;

fn floats(vs: &[f64]) -> Vec<DataValue> {
    vs.iter().map(|&v| DataValue::Float(v)).collect()
}

fn ints(vs: &[i64]) -> Vec<DataValue> {
    vs.iter().map(|&v| DataValue::Int(v)).collect()
}

/// Rectangular computational extent in the projected frame.
#[derive(Debug, Clone, Copy)]
pub struct Domain {
    pub lower: [f64; 2],
    pub upper: [f64; 2],
}

impl Domain {
    /// Shrinks the topography footprint about its midpoint so the
    /// computational domain stays strictly inside the supplied bathymetry.
    pub fn from_topo(header: &TopoHeader, shrink: f64) -> Self {
        let ll = [header.xll, header.yll];
        let ur = [header.x_upper(), header.y_upper()];
        let mut lower = [0.0; 2];
        let mut upper = [0.0; 2];
        for d in 0..2 {
            let mid = ll[d] + 0.5 * (ur[d] - ll[d]);
            let half = 0.5 * shrink * (ur[d] - ll[d]);
            lower[d] = mid - half;
            upper[d] = mid + half;
        }
        Domain { lower, upper }
    }

    pub fn dims(&self) -> [f64; 2] {
        [
            self.upper[0] - self.lower[0],
            self.upper[1] - self.lower[1],
        ]
    }

    pub fn aspect_ratio(&self) -> f64 {
        let d = self.dims();
        d[0] / d[1]
    }

    pub fn validate(&self) -> Result<(), PrepError> {
        if self.upper[0] <= self.lower[0] || self.upper[1] <= self.lower[1] {
            return Err(PrepError::InvalidConfig(format!(
                "empty domain: lower {:?}, upper {:?}",
                self.lower, self.upper
            )));
        }
        Ok(())
    }
}

/// Edge boundary condition accepted by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCondition {
    User,
    Extrapolation,
    Periodic,
    Wall,
}

impl BoundaryCondition {
    pub fn code(self) -> i64 {
        match self {
            BoundaryCondition::User => 0,
            BoundaryCondition::Extrapolation => 1,
            BoundaryCondition::Periodic => 2,
            BoundaryCondition::Wall => 3,
        }
    }
}

impl FromStr for BoundaryCondition {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, PrepError> {
        match s {
            "user" => Ok(BoundaryCondition::User),
            "extrapolation" => Ok(BoundaryCondition::Extrapolation),
            "periodic" => Ok(BoundaryCondition::Periodic),
            "wall" => Ok(BoundaryCondition::Wall),
            other => Err(PrepError::InvalidConfig(format!(
                "unrecognized boundary condition {:?}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Ascii,
    NetCdf,
}

impl OutputFormat {
    pub fn code(self) -> i64 {
        match self {
            OutputFormat::Ascii => 1,
            OutputFormat::NetCdf => 2,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, PrepError> {
        match s {
            "ascii" => Ok(OutputFormat::Ascii),
            "netcdf" => Ok(OutputFormat::NetCdf),
            other => Err(PrepError::InvalidConfig(format!(
                "unrecognized output format {:?}",
                other
            ))),
        }
    }
}

/// Wave limiter, one per wave family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limiter {
    None,
    Minmod,
    Superbee,
    Mc,
    VanLeer,
}

impl Limiter {
    pub fn code(self) -> i64 {
        match self {
            Limiter::None => 0,
            Limiter::Minmod => 1,
            Limiter::Superbee => 2,
            Limiter::Mc => 3,
            Limiter::VanLeer => 4,
        }
    }
}

impl FromStr for Limiter {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, PrepError> {
        match s {
            "none" => Ok(Limiter::None),
            "minmod" => Ok(Limiter::Minmod),
            "superbee" => Ok(Limiter::Superbee),
            "mc" => Ok(Limiter::Mc),
            "vanleer" => Ok(Limiter::VanLeer),
            other => Err(PrepError::InvalidConfig(format!(
                "unrecognized limiter {:?}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSplit {
    None,
    Godunov,
    Strang,
}

impl SourceSplit {
    pub fn code(self) -> i64 {
        self as i64
    }
}

impl FromStr for SourceSplit {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, PrepError> {
        match s {
            "none" => Ok(SourceSplit::None),
            "godunov" => Ok(SourceSplit::Godunov),
            "strang" => Ok(SourceSplit::Strang),
            other => Err(PrepError::InvalidConfig(format!(
                "unrecognized source splitting {:?}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransverseWaves {
    None,
    Increment,
    All,
}

impl TransverseWaves {
    pub fn code(self) -> i64 {
        self as i64
    }
}

impl FromStr for TransverseWaves {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, PrepError> {
        match s {
            "none" => Ok(TransverseWaves::None),
            "increment" => Ok(TransverseWaves::Increment),
            "all" => Ok(TransverseWaves::All),
            other => Err(PrepError::InvalidConfig(format!(
                "unrecognized transverse wave option {:?}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionalSplit {
    Unsplit,
    Split,
}

impl DimensionalSplit {
    pub fn code(self) -> i64 {
        self as i64
    }
}

impl FromStr for DimensionalSplit {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, PrepError> {
        match s {
            "unsplit" => Ok(DimensionalSplit::Unsplit),
            "split" => Ok(DimensionalSplit::Split),
            other => Err(PrepError::InvalidConfig(format!(
                "unrecognized dimensional splitting {:?}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    Cartesian,
    LatLong,
}

impl CoordinateSystem {
    pub fn code(self) -> i64 {
        match self {
            CoordinateSystem::Cartesian => 1,
            CoordinateSystem::LatLong => 2,
        }
    }
}

/// How output frames are scheduled (styles 1 through 3 of the solver).
#[derive(Debug, Clone)]
pub enum OutputTimes {
    EquallySpaced {
        num_frames: usize,
        tfinal: f64,
        output_t0: bool,
    },
    Explicit {
        times: Vec<f64>,
    },
    StepInterval {
        interval: usize,
        total_steps: usize,
        output_t0: bool,
    },
}

impl OutputTimes {
    pub fn style(&self) -> i64 {
        match self {
            OutputTimes::EquallySpaced { .. } => 1,
            OutputTimes::Explicit { .. } => 2,
            OutputTimes::StepInterval { .. } => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub enum CheckpointStyle {
    None,
    AtFinal,
    Times(Vec<f64>),
    Interval(usize),
}

impl CheckpointStyle {
    pub fn style(&self) -> i64 {
        match self {
            CheckpointStyle::None => 0,
            CheckpointStyle::AtFinal => 1,
            CheckpointStyle::Times(_) => 2,
            CheckpointStyle::Interval(_) => 3,
        }
    }
}

/// Core solver parameters, one field per documented entry of the main
/// parameter file.
#[derive(Debug, Clone)]
pub struct ClawConfig {
    pub num_dim: usize,
    pub domain: Domain,
    pub num_cells: [usize; 2],
    pub num_eqn: usize,
    pub num_aux: usize,
    pub capa_index: usize,
    pub t0: f64,
    pub restart: bool,
    pub restart_file: String,
    pub output: OutputTimes,
    pub output_format: OutputFormat,
    pub output_q_components: String,
    pub output_aux_components: String,
    pub output_aux_onlyonce: bool,
    pub verbosity: usize,
    pub dt_variable: bool,
    pub dt_initial: f64,
    pub dt_max: f64,
    pub cfl_desired: f64,
    pub cfl_max: f64,
    pub steps_max: usize,
    pub order: usize,
    pub dimensional_split: DimensionalSplit,
    pub transverse_waves: TransverseWaves,
    pub num_waves: usize,
    pub limiters: Vec<Limiter>,
    pub use_fwaves: bool,
    pub source_split: SourceSplit,
    pub num_ghost: usize,
    pub bc_lower: [BoundaryCondition; 2],
    pub bc_upper: [BoundaryCondition; 2],
    pub checkpoint: CheckpointStyle,
}

impl ClawConfig {
    /// Dam-break benchmark defaults: half an hour of output at one frame
    /// per minute, second-order unsplit method, walls all around.
    pub fn benchmark(domain: Domain, num_cells: [usize; 2]) -> Self {
        ClawConfig {
            num_dim: 2,
            domain,
            num_cells,
            num_eqn: 3,
            num_aux: 1,
            capa_index: 0,
            t0: 0.0,
            restart: false,
            restart_file: "fort.chk00006".to_string(),
            output: OutputTimes::EquallySpaced {
                num_frames: 30,
                tfinal: 1800.0,
                output_t0: true,
            },
            output_format: OutputFormat::Ascii,
            output_q_components: "all".to_string(),
            output_aux_components: "none".to_string(),
            output_aux_onlyonce: true,
            verbosity: 1,
            dt_variable: true,
            dt_initial: 0.01,
            dt_max: 1e99,
            cfl_desired: 0.9,
            cfl_max: 1.0,
            steps_max: 5000,
            order: 2,
            dimensional_split: DimensionalSplit::Unsplit,
            transverse_waves: TransverseWaves::All,
            num_waves: 3,
            limiters: vec![Limiter::Mc; 3],
            use_fwaves: true,
            source_split: SourceSplit::Godunov,
            num_ghost: 2,
            bc_lower: [BoundaryCondition::Wall; 2],
            bc_upper: [BoundaryCondition::Wall; 2],
            checkpoint: CheckpointStyle::None,
        }
    }

    pub fn validate(&self) -> Result<(), PrepError> {
        self.domain.validate()?;
        if self.num_cells[0] == 0 || self.num_cells[1] == 0 {
            return Err(PrepError::InvalidConfig(format!(
                "cell counts must be positive, got {:?}",
                self.num_cells
            )));
        }
        if !(1..=2).contains(&self.order) {
            return Err(PrepError::InvalidConfig(format!(
                "order must be 1 or 2, got {}",
                self.order
            )));
        }
        if self.limiters.len() != self.num_waves {
            return Err(PrepError::InvalidConfig(format!(
                "{} limiters listed for {} wave families",
                self.limiters.len(),
                self.num_waves
            )));
        }
        if self.cfl_desired > self.cfl_max {
            return Err(PrepError::InvalidConfig(format!(
                "cfl_desired {} exceeds cfl_max {}",
                self.cfl_desired, self.cfl_max
            )));
        }
        if self.dt_variable && self.dt_initial <= 0.0 {
            return Err(PrepError::InvalidConfig(format!(
                "dt_initial must be positive, got {}",
                self.dt_initial
            )));
        }
        // periodic edges only make sense in matched pairs
        for d in 0..2 {
            let lo = self.bc_lower[d] == BoundaryCondition::Periodic;
            let up = self.bc_upper[d] == BoundaryCondition::Periodic;
            if lo != up {
                return Err(PrepError::InvalidConfig(format!(
                    "periodic boundary on axis {} must be set at both edges",
                    d
                )));
            }
        }
        Ok(())
    }

    pub fn to_document(&self) -> DataDocument {
        let mut doc = DataDocument::new();
        doc.put("num_dim", self.num_dim);
        doc.put_list("lower", floats(&self.domain.lower));
        doc.put_list("upper", floats(&self.domain.upper));
        doc.put_list(
            "num_cells",
            vec![
                DataValue::Int(self.num_cells[0] as i64),
                DataValue::Int(self.num_cells[1] as i64),
            ],
        );
        doc.blank();
        doc.put("num_eqn", self.num_eqn);
        doc.put("num_aux", self.num_aux);
        doc.put("capa_index", self.capa_index);
        doc.put("t0", self.t0);
        doc.blank();
        doc.put("restart", self.restart);
        doc.put("restart_file", self.restart_file.as_str());
        doc.blank();
        doc.put("output_style", self.output.style());
        match &self.output {
            OutputTimes::EquallySpaced {
                num_frames,
                tfinal,
                output_t0,
            } => {
                doc.put("num_output_times", *num_frames);
                doc.put("tfinal", *tfinal);
                doc.put("output_t0", *output_t0);
            }
            OutputTimes::Explicit { times } => {
                doc.put("num_output_times", times.len());
                doc.put_list("output_times", floats(times));
            }
            OutputTimes::StepInterval {
                interval,
                total_steps,
                output_t0,
            } => {
                doc.put("output_step_interval", *interval);
                doc.put("total_steps", *total_steps);
                doc.put("output_t0", *output_t0);
            }
        }
        doc.put("output_format", self.output_format.code());
        doc.put("output_q_components", self.output_q_components.as_str());
        doc.put("output_aux_components", self.output_aux_components.as_str());
        doc.put("output_aux_onlyonce", self.output_aux_onlyonce);
        doc.blank();
        doc.put("verbosity", self.verbosity);
        doc.put("dt_variable", self.dt_variable);
        doc.put("dt_initial", self.dt_initial);
        doc.put("dt_max", self.dt_max);
        doc.put("cfl_desired", self.cfl_desired);
        doc.put("cfl_max", self.cfl_max);
        doc.put("steps_max", self.steps_max);
        doc.blank();
        doc.put("order", self.order);
        doc.put("dimensional_split", self.dimensional_split.code());
        doc.put("transverse_waves", self.transverse_waves.code());
        doc.put("num_waves", self.num_waves);
        doc.put_list(
            "limiter",
            self.limiters.iter().map(|l| DataValue::Int(l.code())).collect(),
        );
        doc.put("use_fwaves", self.use_fwaves);
        doc.put("source_split", self.source_split.code());
        doc.blank();
        doc.put("num_ghost", self.num_ghost);
        doc.put_list(
            "bc_lower",
            vec![
                DataValue::Int(self.bc_lower[0].code()),
                DataValue::Int(self.bc_lower[1].code()),
            ],
        );
        doc.put_list(
            "bc_upper",
            vec![
                DataValue::Int(self.bc_upper[0].code()),
                DataValue::Int(self.bc_upper[1].code()),
            ],
        );
        doc.blank();
        doc.put("checkpt_style", self.checkpoint.style());
        match &self.checkpoint {
            CheckpointStyle::Times(times) => doc.put_list("checkpt_times", floats(times)),
            CheckpointStyle::Interval(n) => doc.put("checkpt_interval", *n),
            _ => {}
        }
        doc
    }
}

/// Geophysics parameters for the shallow-water layer.
#[derive(Debug, Clone)]
pub struct GeoConfig {
    pub gravity: f64,
    pub coordinate_system: CoordinateSystem,
    pub earth_radius: f64,
    pub coriolis_forcing: bool,
    pub sea_level: f64,
    pub dry_tolerance: f64,
    pub friction_forcing: bool,
    pub manning_coefficient: f64,
    pub friction_depth: f64,
}

impl GeoConfig {
    pub fn benchmark() -> Self {
        GeoConfig {
            gravity: 9.81,
            coordinate_system: CoordinateSystem::Cartesian,
            earth_radius: 6367.5e3,
            coriolis_forcing: false,
            sea_level: 0.0,
            dry_tolerance: 1e-4,
            friction_forcing: true,
            manning_coefficient: 0.05,
            friction_depth: 500.0,
        }
    }

    pub fn validate(&self) -> Result<(), PrepError> {
        if self.gravity <= 0.0 {
            return Err(PrepError::InvalidConfig(format!(
                "gravity must be positive, got {}",
                self.gravity
            )));
        }
        if self.dry_tolerance <= 0.0 {
            return Err(PrepError::InvalidConfig(format!(
                "dry_tolerance must be positive, got {}",
                self.dry_tolerance
            )));
        }
        if self.friction_forcing && self.manning_coefficient <= 0.0 {
            return Err(PrepError::InvalidConfig(format!(
                "manning_coefficient must be positive with friction on, got {}",
                self.manning_coefficient
            )));
        }
        Ok(())
    }
}

/// Depth- and speed-based AMR triggers for the shallow-water layer.
#[derive(Debug, Clone)]
pub struct RefinementConfig {
    pub wave_tolerance: f64,
    pub speed_tolerance: Vec<f64>,
    pub deep_depth: f64,
    pub max_level_deep: i64,
    pub variable_dt_refinement_ratios: bool,
}

impl RefinementConfig {
    pub fn benchmark(maxlevel: i64) -> Self {
        RefinementConfig {
            wave_tolerance: 1e-2,
            speed_tolerance: vec![1e-1; 6],
            deep_depth: 0.4,
            max_level_deep: maxlevel,
            variable_dt_refinement_ratios: true,
        }
    }

    pub fn validate(&self) -> Result<(), PrepError> {
        if self.wave_tolerance <= 0.0 {
            return Err(PrepError::InvalidConfig(format!(
                "wave_tolerance must be positive, got {}",
                self.wave_tolerance
            )));
        }
        Ok(())
    }
}

/// Registration of one topography raster with the solver.
#[derive(Debug, Clone)]
pub struct TopoFileEntry {
    pub topo_type: TopoType,
    pub minlevel: i64,
    pub maxlevel: i64,
    pub t1: f64,
    pub t2: f64,
    pub fname: String,
}

/// Registration of the initial-condition perturbation files.
#[derive(Debug, Clone)]
pub struct QinitConfig {
    pub qinit_type: i64,
    pub variable_eta_init: bool,
    pub files: Vec<QinitFileEntry>,
}

#[derive(Debug, Clone)]
pub struct QinitFileEntry {
    pub minlevel: i64,
    pub maxlevel: i64,
    pub fname: String,
}

/// Mesh-adaptation parameters.
#[derive(Debug, Clone)]
pub struct AmrConfig {
    pub amr_levels_max: i64,
    pub refinement_ratios_x: Vec<i64>,
    pub refinement_ratios_y: Vec<i64>,
    pub refinement_ratios_t: Vec<i64>,
    pub aux_type: Vec<String>,
    pub flag_richardson: bool,
    pub flag2refine: bool,
    pub flag2refine_tol: f64,
    pub regrid_interval: i64,
    pub regrid_buffer_width: i64,
    pub clustering_cutoff: f64,
    pub verbosity_regrid: i64,
    // developer print toggles, part of the file format
    pub dprint: bool,
    pub eprint: bool,
    pub edebug: bool,
    pub gprint: bool,
    pub nprint: bool,
    pub pprint: bool,
    pub rprint: bool,
    pub sprint: bool,
    pub tprint: bool,
    pub uprint: bool,
}

impl AmrConfig {
    pub fn benchmark(maxlevel: i64) -> Self {
        AmrConfig {
            amr_levels_max: maxlevel,
            refinement_ratios_x: vec![2; maxlevel as usize],
            refinement_ratios_y: vec![2; maxlevel as usize],
            refinement_ratios_t: vec![2; maxlevel as usize],
            aux_type: vec!["capacity".to_string()],
            flag_richardson: false,
            flag2refine: true,
            flag2refine_tol: 0.05,
            regrid_interval: 3,
            regrid_buffer_width: 2,
            clustering_cutoff: 0.7,
            verbosity_regrid: 0,
            dprint: false,
            eprint: false,
            edebug: false,
            gprint: false,
            nprint: false,
            pprint: false,
            rprint: false,
            sprint: false,
            tprint: true,
            uprint: false,
        }
    }

    pub fn validate(&self) -> Result<(), PrepError> {
        if self.amr_levels_max < 1 {
            return Err(PrepError::InvalidConfig(format!(
                "amr_levels_max must be at least 1, got {}",
                self.amr_levels_max
            )));
        }
        let n = self.amr_levels_max as usize;
        if self.refinement_ratios_x.len() != n
            || self.refinement_ratios_y.len() != n
            || self.refinement_ratios_t.len() != n
        {
            return Err(PrepError::InvalidConfig(format!(
                "refinement ratio lists must have {} entries",
                n
            )));
        }
        if !(0.0..=1.0).contains(&self.clustering_cutoff) {
            return Err(PrepError::InvalidConfig(format!(
                "clustering_cutoff must lie in [0, 1], got {}",
                self.clustering_cutoff
            )));
        }
        Ok(())
    }

    pub fn to_document(&self) -> DataDocument {
        let mut doc = DataDocument::new();
        doc.put("amr_levels_max", self.amr_levels_max);
        doc.put_list("refinement_ratios_x", ints(&self.refinement_ratios_x));
        doc.put_list("refinement_ratios_y", ints(&self.refinement_ratios_y));
        doc.put_list("refinement_ratios_t", ints(&self.refinement_ratios_t));
        doc.put_list(
            "aux_type",
            self.aux_type
                .iter()
                .map(|s| DataValue::Str(s.clone()))
                .collect(),
        );
        doc.blank();
        doc.put("flag_richardson", self.flag_richardson);
        doc.put("flag2refine", self.flag2refine);
        doc.put("flag2refine_tol", self.flag2refine_tol);
        doc.put("regrid_interval", self.regrid_interval);
        doc.put("regrid_buffer_width", self.regrid_buffer_width);
        doc.put("clustering_cutoff", self.clustering_cutoff);
        doc.put("verbosity_regrid", self.verbosity_regrid);
        doc.blank();
        doc.put("dprint", self.dprint);
        doc.put("eprint", self.eprint);
        doc.put("edebug", self.edebug);
        doc.put("gprint", self.gprint);
        doc.put("nprint", self.nprint);
        doc.put("pprint", self.pprint);
        doc.put("rprint", self.rprint);
        doc.put("sprint", self.sprint);
        doc.put("tprint", self.tprint);
        doc.put("uprint", self.uprint);
        doc
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinementCriteria {
    Value,
    Minmax,
    Difference,
    Gradient,
    User,
}

impl RefinementCriteria {
    pub fn as_str(self) -> &'static str {
        match self {
            RefinementCriteria::Value => "value",
            RefinementCriteria::Minmax => "minmax",
            RefinementCriteria::Difference => "difference",
            RefinementCriteria::Gradient => "gradient",
            RefinementCriteria::User => "user",
        }
    }
}

impl FromStr for RefinementCriteria {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, PrepError> {
        match s {
            "value" => Ok(RefinementCriteria::Value),
            "minmax" => Ok(RefinementCriteria::Minmax),
            "difference" => Ok(RefinementCriteria::Difference),
            "gradient" => Ok(RefinementCriteria::Gradient),
            "user" => Ok(RefinementCriteria::User),
            other => Err(PrepError::InvalidConfig(format!(
                "unrecognized refinement criteria {:?}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloodVerbosity {
    Silent,
    Essential,
    Production,
    Info,
    Debug,
}

impl FloodVerbosity {
    pub fn as_str(self) -> &'static str {
        match self {
            FloodVerbosity::Silent => "silent",
            FloodVerbosity::Essential => "essential",
            FloodVerbosity::Production => "production",
            FloodVerbosity::Info => "info",
            FloodVerbosity::Debug => "debug",
        }
    }
}

impl FromStr for FloodVerbosity {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, PrepError> {
        match s {
            "silent" => Ok(FloodVerbosity::Silent),
            "essential" => Ok(FloodVerbosity::Essential),
            "production" => Ok(FloodVerbosity::Production),
            "info" => Ok(FloodVerbosity::Info),
            "debug" => Ok(FloodVerbosity::Debug),
            other => Err(PrepError::InvalidConfig(format!(
                "unrecognized verbosity {:?}",
                other
            ))),
        }
    }
}

/// Flood-solver overlay options, written as an INI file.
#[derive(Debug, Clone)]
pub struct FloodConfig {
    pub minlevel: i64,
    pub maxlevel: i64,
    pub refine_threshold: f64,
    pub coarsen_threshold: f64,
    pub smooth_refine: bool,
    pub regrid_interval: i64,
    pub advance_one_step: bool,
    pub ghost_patch_pack_aux: bool,
    pub conservation_check: bool,
    pub subcycle: bool,
    pub output: bool,
    pub output_gauges: bool,
    pub mi: i64,
    pub mj: i64,
    pub tikz_out: bool,
    pub tikz_figsize: String,
    pub tikz_plot_prefix: String,
    pub tikz_plot_suffix: String,
    pub refinement_criteria: RefinementCriteria,
    pub verbosity: FloodVerbosity,
    pub user: Vec<(String, String)>,
}

impl FloodConfig {
    pub fn benchmark(minlevel: i64, maxlevel: i64, mi: i64, mj: i64) -> Self {
        FloodConfig {
            minlevel,
            maxlevel,
            refine_threshold: 0.01,
            coarsen_threshold: 0.005,
            smooth_refine: true,
            regrid_interval: 3,
            advance_one_step: false,
            ghost_patch_pack_aux: true,
            conservation_check: false,
            subcycle: true,
            output: true,
            output_gauges: true,
            mi,
            mj,
            tikz_out: true,
            tikz_figsize: "36 2".to_string(),
            tikz_plot_prefix: "dam_break".to_string(),
            tikz_plot_suffix: "png".to_string(),
            refinement_criteria: RefinementCriteria::Minmax,
            verbosity: FloodVerbosity::Production,
            user: vec![("example".to_string(), "1".to_string())],
        }
    }

    pub fn validate(&self) -> Result<(), PrepError> {
        if self.minlevel > self.maxlevel {
            return Err(PrepError::InvalidConfig(format!(
                "minlevel {} exceeds maxlevel {}",
                self.minlevel, self.maxlevel
            )));
        }
        if self.coarsen_threshold >= self.refine_threshold {
            return Err(PrepError::InvalidConfig(format!(
                "coarsen_threshold {} must be below refine_threshold {}",
                self.coarsen_threshold, self.refine_threshold
            )));
        }
        if self.mi < 1 || self.mj < 1 {
            return Err(PrepError::InvalidConfig(format!(
                "block dimensions must be positive, got {} x {}",
                self.mi, self.mj
            )));
        }
        Ok(())
    }

    pub fn to_ini(&self) -> IniDocument {
        let mut doc = IniDocument::new();
        for (key, value) in &self.user {
            doc.set("user", key, value);
        }
        doc.set("Options", "minlevel", self.minlevel);
        doc.set("Options", "maxlevel", self.maxlevel);
        doc.set("Options", "refine-threshold", self.refine_threshold);
        doc.set("Options", "coarsen-threshold", self.coarsen_threshold);
        doc.set("Options", "smooth-refine", DataValue::Bool(self.smooth_refine));
        doc.set("Options", "regrid-interval", self.regrid_interval);
        doc.set(
            "Options",
            "advance-one-step",
            DataValue::Bool(self.advance_one_step),
        );
        doc.set(
            "Options",
            "ghost-patch-pack-aux",
            DataValue::Bool(self.ghost_patch_pack_aux),
        );
        doc.set(
            "Options",
            "conservation-check",
            DataValue::Bool(self.conservation_check),
        );
        doc.set("Options", "subcycle", DataValue::Bool(self.subcycle));
        doc.set("Options", "output", DataValue::Bool(self.output));
        doc.set("Options", "output-gauges", DataValue::Bool(self.output_gauges));
        doc.set("Options", "mi", self.mi);
        doc.set("Options", "mj", self.mj);
        doc.set("Options", "tikz-out", DataValue::Bool(self.tikz_out));
        doc.set("Options", "tikz-figsize", &self.tikz_figsize);
        doc.set("Options", "tikz-plot-prefix", &self.tikz_plot_prefix);
        doc.set("Options", "tikz-plot-suffix", &self.tikz_plot_suffix);
        doc.set(
            "Options",
            "refinement-criteria",
            self.refinement_criteria.as_str(),
        );
        doc.set("Options", "verbosity", self.verbosity.as_str());
        doc
    }
}

/// Rectangle plus time window forcing a refinement level band.
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub minlevel: i64,
    pub maxlevel: i64,
    pub t1: f64,
    pub t2: f64,
    pub x1: f64,
    pub x2: f64,
    pub y1: f64,
    pub y2: f64,
}

impl Region {
    /// Keeps the reservoir west of the gate at the finest level for the
    /// whole run.
    pub fn reservoir(domain: Domain, gate_x: f64, maxlevel: i64) -> Self {
        Region {
            minlevel: maxlevel,
            maxlevel,
            t1: 0.0,
            t2: 1e10,
            x1: domain.lower[0],
            x2: gate_x,
            y1: domain.lower[1],
            y2: domain.upper[1],
        }
    }

    pub fn validate(&self) -> Result<(), PrepError> {
        if self.minlevel > self.maxlevel || self.x1 >= self.x2 || self.y1 >= self.y2
            || self.t1 >= self.t2
        {
            return Err(PrepError::InvalidConfig(format!(
                "degenerate refinement region {:?}",
                self
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowVariable {
    Depth,
    Momentum,
    Elevation,
}

impl FlowVariable {
    pub fn code(self) -> i64 {
        match self {
            FlowVariable::Depth => 1,
            FlowVariable::Momentum => 2,
            FlowVariable::Elevation => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowMeasure {
    Value,
    Gradient,
}

impl FlowMeasure {
    pub fn code(self) -> i64 {
        match self {
            FlowMeasure::Value => 1,
            FlowMeasure::Gradient => 2,
        }
    }
}

/// Overland-flow refinement trigger.
#[derive(Debug, Clone, Copy)]
pub struct Flowgrade {
    pub value: f64,
    pub variable: FlowVariable,
    pub measure: FlowMeasure,
    pub minlevel: i64,
}

/// Everything the solver reads at startup, plus the flood overlay.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub claw: ClawConfig,
    pub geo: GeoConfig,
    pub refinement: RefinementConfig,
    pub topo_files: Vec<TopoFileEntry>,
    pub qinit: QinitConfig,
    pub amr: AmrConfig,
    pub flood: FloodConfig,
    pub regions: Vec<Region>,
    pub gauges: Vec<Gauge>,
    pub flowgrades: Vec<Flowgrade>,
}

impl RunConfig {
    /// Assembles the dam-break benchmark run around a derived domain, a
    /// registered topography file, and the synthesized initializer. The
    /// reservoir refinement region reaches from the west edge to `gate_x`.
    pub fn benchmark(
        domain: Domain,
        gate_x: f64,
        topo_fname: String,
        topo_type: TopoType,
        qinit_fname: String,
        gauges: Vec<Gauge>,
    ) -> Self {
        let (minlevel, maxlevel) = (1, 3);
        let (mi, mj) = (18, 1);
        let claw = ClawConfig::benchmark(domain, [54, 54]);
        RunConfig {
            claw,
            geo: GeoConfig::benchmark(),
            refinement: RefinementConfig::benchmark(maxlevel),
            topo_files: vec![TopoFileEntry {
                topo_type,
                minlevel,
                maxlevel: minlevel,
                t1: 0.0,
                t2: 1e10,
                fname: topo_fname,
            }],
            qinit: QinitConfig {
                qinit_type: 1,
                variable_eta_init: true,
                files: vec![QinitFileEntry {
                    minlevel,
                    maxlevel: minlevel,
                    fname: qinit_fname,
                }],
            },
            amr: AmrConfig::benchmark(maxlevel),
            flood: FloodConfig::benchmark(minlevel, maxlevel, mi, mj),
            regions: vec![Region::reservoir(domain, gate_x, maxlevel)],
            gauges,
            flowgrades: vec![Flowgrade {
                value: 0.4,
                variable: FlowVariable::Elevation,
                measure: FlowMeasure::Value,
                minlevel: maxlevel,
            }],
        }
    }

    pub fn validate(&self) -> Result<(), PrepError> {
        self.claw.validate()?;
        self.geo.validate()?;
        self.refinement.validate()?;
        self.amr.validate()?;
        self.flood.validate()?;
        for region in &self.regions {
            region.validate()?;
        }
        if self.qinit.qinit_type != 0 && self.qinit.files.is_empty() {
            return Err(PrepError::InvalidConfig(format!(
                "qinit_type {} set but no initializer files registered",
                self.qinit.qinit_type
            )));
        }
        Ok(())
    }

    /// Validates, then emits every parameter file through the sink.
    /// Returns the file names written, in order.
    pub fn write_all(&self, sink: &mut dyn RunConfigSink) -> Result<Vec<&'static str>, PrepError> {
        self.validate()?;

        sink.write_data("claw.data", &self.claw.to_document())?;
        sink.write_data("geoclaw.data", &self.geo_document())?;
        sink.write_data("topo.data", &self.topo_document())?;
        sink.write_data("qinit.data", &self.qinit_document())?;
        sink.write_data("regions.data", &self.regions_document())?;
        sink.write_data("gauges.data", &self.gauges_document())?;
        sink.write_data("flowgrades.data", &self.flowgrades_document())?;
        sink.write_data("amr.data", &self.amr.to_document())?;
        sink.write_ini("geoflood.ini", &self.flood.to_ini())?;

        Ok(vec![
            "claw.data",
            "geoclaw.data",
            "topo.data",
            "qinit.data",
            "regions.data",
            "gauges.data",
            "flowgrades.data",
            "amr.data",
            "geoflood.ini",
        ])
    }

    fn geo_document(&self) -> DataDocument {
        let mut doc = DataDocument::new();
        doc.put("gravity", self.geo.gravity);
        doc.put("coordinate_system", self.geo.coordinate_system.code());
        doc.put("earth_radius", self.geo.earth_radius);
        doc.put("coriolis_forcing", self.geo.coriolis_forcing);
        doc.put("sea_level", self.geo.sea_level);
        doc.put("dry_tolerance", self.geo.dry_tolerance);
        doc.put("friction_forcing", self.geo.friction_forcing);
        doc.put("manning_coefficient", self.geo.manning_coefficient);
        doc.put("friction_depth", self.geo.friction_depth);
        doc.blank();
        doc.put("wave_tolerance", self.refinement.wave_tolerance);
        doc.put_list("speed_tolerance", floats(&self.refinement.speed_tolerance));
        doc.put("deep_depth", self.refinement.deep_depth);
        doc.put("max_level_deep", self.refinement.max_level_deep);
        doc.put(
            "variable_dt_refinement_ratios",
            self.refinement.variable_dt_refinement_ratios,
        );
        doc
    }

    fn topo_document(&self) -> DataDocument {
        let mut doc = DataDocument::new();
        doc.put("ntopofiles", self.topo_files.len());
        doc.blank();
        for t in &self.topo_files {
            doc.row(vec![
                DataValue::Int(t.topo_type.code()),
                DataValue::Int(t.minlevel),
                DataValue::Int(t.maxlevel),
                DataValue::Float(t.t1),
                DataValue::Float(t.t2),
                DataValue::Str(t.fname.clone()),
            ]);
        }
        doc
    }

    fn qinit_document(&self) -> DataDocument {
        let mut doc = DataDocument::new();
        doc.put("qinit_type", self.qinit.qinit_type);
        doc.put("variable_eta_init", self.qinit.variable_eta_init);
        doc.put("nqinitfiles", self.qinit.files.len());
        doc.blank();
        for q in &self.qinit.files {
            doc.row(vec![
                DataValue::Int(q.minlevel),
                DataValue::Int(q.maxlevel),
                DataValue::Str(q.fname.clone()),
            ]);
        }
        doc
    }

    fn regions_document(&self) -> DataDocument {
        let mut doc = DataDocument::new();
        doc.put("nregions", self.regions.len());
        doc.blank();
        for r in &self.regions {
            doc.row(vec![
                DataValue::Int(r.minlevel),
                DataValue::Int(r.maxlevel),
                DataValue::Float(r.t1),
                DataValue::Float(r.t2),
                DataValue::Float(r.x1),
                DataValue::Float(r.x2),
                DataValue::Float(r.y1),
                DataValue::Float(r.y2),
            ]);
        }
        doc
    }

    fn gauges_document(&self) -> DataDocument {
        let mut doc = DataDocument::new();
        doc.put("ngauges", self.gauges.len());
        doc.blank();
        for g in &self.gauges {
            doc.row(vec![
                DataValue::Int(g.id),
                DataValue::Float(g.x),
                DataValue::Float(g.y),
                DataValue::Float(g.t_start),
                DataValue::Float(g.t_end),
            ]);
        }
        doc
    }

    fn flowgrades_document(&self) -> DataDocument {
        let mut doc = DataDocument::new();
        doc.put("nflowgrades", self.flowgrades.len());
        doc.blank();
        for f in &self.flowgrades {
            doc.row(vec![
                DataValue::Float(f.value),
                DataValue::Int(f.variable.code()),
                DataValue::Int(f.measure.code()),
                DataValue::Int(f.minlevel),
            ]);
        }
        doc
    }
}
