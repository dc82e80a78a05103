//! Simulation-wide settings
//!
//! Defaults mirror what a fresh editing session starts with: one simulated
//! hour, 0.1 s steps, right-hand traffic, trip info and summary output on.

use serde::{Deserialize, Serialize};

use super::entities::CarFollowModel;

/// Traffic convention used when building the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DrivingSide {
    #[default]
    Right,
    Left,
}

impl DrivingSide {
    pub fn as_str(self) -> &'static str {
        match self {
            DrivingSide::Right => "right",
            DrivingSide::Left => "left",
        }
    }
}

/// Lane-change models known to SUMO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LaneChangeModel {
    #[default]
    LC2013,
    SL2015,
    DK2008,
}

impl LaneChangeModel {
    pub fn as_str(self) -> &'static str {
        match self {
            LaneChangeModel::LC2013 => "LC2013",
            LaneChangeModel::SL2015 => "SL2015",
            LaneChangeModel::DK2008 => "DK2008",
        }
    }
}

/// What the simulator does when two vehicles collide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionAction {
    None,
    #[default]
    Warn,
    Teleport,
    Remove,
}

impl CollisionAction {
    pub fn as_str(self) -> &'static str {
        match self {
            CollisionAction::None => "none",
            CollisionAction::Warn => "warn",
            CollisionAction::Teleport => "teleport",
            CollisionAction::Remove => "remove",
        }
    }
}

/// Simulator output files that can be switched on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputKind {
    TripInfo,
    Fcd,
    Emissions,
    Summary,
    EdgeData,
    LaneData,
}

impl OutputKind {
    pub const ALL: [OutputKind; 6] = [
        OutputKind::TripInfo,
        OutputKind::Fcd,
        OutputKind::Emissions,
        OutputKind::Summary,
        OutputKind::EdgeData,
        OutputKind::LaneData,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputKind::TripInfo => "tripinfo",
            OutputKind::Fcd => "fcd",
            OutputKind::Emissions => "emissions",
            OutputKind::Summary => "summary",
            OutputKind::EdgeData => "edgedata",
            OutputKind::LaneData => "lanedata",
        }
    }
}

/// Switch, period and target file of one output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    pub enabled: bool,
    /// Sampling period in seconds; `None` for outputs written per vehicle
    #[serde(default)]
    pub frequency: Option<f64>,
    pub file: String,
}

impl OutputSettings {
    fn new(enabled: bool, frequency: Option<f64>, file: &str) -> Self {
        Self {
            enabled,
            frequency,
            file: file.to_string(),
        }
    }
}

/// All configurable outputs, one slot per [`OutputKind`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Outputs {
    pub tripinfo: OutputSettings,
    pub fcd: OutputSettings,
    pub emissions: OutputSettings,
    pub summary: OutputSettings,
    pub edgedata: OutputSettings,
    pub lanedata: OutputSettings,
}

impl Default for Outputs {
    fn default() -> Self {
        Self {
            tripinfo: OutputSettings::new(true, None, "tripinfo.xml"),
            fcd: OutputSettings::new(false, Some(1.0), "fcd.xml"),
            emissions: OutputSettings::new(false, Some(60.0), "emissions.xml"),
            summary: OutputSettings::new(true, Some(60.0), "summary.xml"),
            edgedata: OutputSettings::new(false, Some(60.0), "edgeData.xml"),
            lanedata: OutputSettings::new(false, Some(60.0), "laneData.xml"),
        }
    }
}

impl Outputs {
    pub fn get(&self, kind: OutputKind) -> &OutputSettings {
        match kind {
            OutputKind::TripInfo => &self.tripinfo,
            OutputKind::Fcd => &self.fcd,
            OutputKind::Emissions => &self.emissions,
            OutputKind::Summary => &self.summary,
            OutputKind::EdgeData => &self.edgedata,
            OutputKind::LaneData => &self.lanedata,
        }
    }

    /// Enabled outputs in declaration order
    pub fn enabled(&self) -> impl Iterator<Item = (OutputKind, &OutputSettings)> {
        OutputKind::ALL
            .into_iter()
            .map(|kind| (kind, self.get(kind)))
            .filter(|(_, output)| output.enabled)
    }
}

/// Simulation-wide parameters written to the configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Simulation start in seconds
    pub begin: f64,
    /// Simulation end in seconds
    pub end: f64,
    pub step_length: f64,
    pub random_seed: Option<u64>,
    pub lane_change_model: LaneChangeModel,
    pub car_follow_model: CarFollowModel,
    /// Sublane resolution in metres; `None` disables the sublane model
    pub lateral_resolution: Option<f64>,
    /// Seconds a blocked vehicle waits before teleporting (negative disables)
    pub time_to_teleport: f64,
    pub collision_action: CollisionAction,
    pub driving_side: DrivingSide,
    pub outputs: Outputs,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            begin: 0.0,
            end: 3600.0,
            step_length: 0.1,
            random_seed: Some(42),
            lane_change_model: LaneChangeModel::LC2013,
            car_follow_model: CarFollowModel::Krauss,
            lateral_resolution: Some(0.8),
            time_to_teleport: 300.0,
            collision_action: CollisionAction::Warn,
            driving_side: DrivingSide::Right,
            outputs: Outputs::default(),
        }
    }
}

impl SimulationSettings {
    /// Total simulated time in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.begin
    }
}
