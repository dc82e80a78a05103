//! Typed scenario entities
//!
//! One record type per entity kind. Required fields are plain fields, optional
//! SUMO attributes are `Option`s and are only emitted when set.

use serde::{Deserialize, Serialize};

use super::settings::LaneChangeModel;
use super::types::{EdgeId, EntityKind, NodeId, Position, RouteId, VehicleTypeId};

/// Common behaviour of everything the entity store can hold
pub trait Entity: Clone {
    /// The kind this record belongs to
    const KIND: EntityKind;

    /// The identifier the record is keyed by
    fn key(&self) -> &str;
}

/// SUMO junction types accepted in node files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Priority,
    TrafficLight,
    RightBeforeLeft,
    LeftBeforeRight,
    AllwayStop,
    PriorityStop,
    Unregulated,
    TrafficLightRightOnRed,
    TrafficLightUnregulated,
    Zipper,
    DeadEnd,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Priority => "priority",
            NodeType::TrafficLight => "traffic_light",
            NodeType::RightBeforeLeft => "right_before_left",
            NodeType::LeftBeforeRight => "left_before_right",
            NodeType::AllwayStop => "allway_stop",
            NodeType::PriorityStop => "priority_stop",
            NodeType::Unregulated => "unregulated",
            NodeType::TrafficLightRightOnRed => "traffic_light_right_on_red",
            NodeType::TrafficLightUnregulated => "traffic_light_unregulated",
            NodeType::Zipper => "zipper",
            NodeType::DeadEnd => "dead_end",
        }
    }

    /// Whether a traffic-light program may be attached to this node
    pub fn is_controlled(self) -> bool {
        matches!(
            self,
            NodeType::TrafficLight
                | NodeType::TrafficLightRightOnRed
                | NodeType::TrafficLightUnregulated
        )
    }
}

/// A junction or end point of the road network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub position: Position,
    #[serde(default)]
    pub node_type: Option<NodeType>,
}

impl Node {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: NodeId::new(id),
            position: Position::new(x, y),
            node_type: None,
        }
    }

    pub fn with_type(mut self, node_type: NodeType) -> Self {
        self.node_type = Some(node_type);
        self
    }

    pub fn is_controlled(&self) -> bool {
        self.node_type.is_some_and(NodeType::is_controlled)
    }
}

impl Entity for Node {
    const KIND: EntityKind = EntityKind::Node;

    fn key(&self) -> &str {
        self.id.as_str()
    }
}

/// How lanes are spread relative to the edge geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpreadType {
    Right,
    Center,
    RoadCenter,
}

impl SpreadType {
    pub fn as_str(self) -> &'static str {
        match self {
            SpreadType::Right => "right",
            SpreadType::Center => "center",
            SpreadType::RoadCenter => "roadCenter",
        }
    }
}

fn default_lanes() -> u32 {
    1
}

fn default_speed() -> f64 {
    13.89
}

/// A directed road segment between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default = "default_lanes")]
    pub num_lanes: u32,
    /// Speed limit in m/s
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub lane_width: Option<f64>,
    /// Vehicle classes allowed on every lane (empty means unrestricted)
    #[serde(default)]
    pub allow: Vec<String>,
    #[serde(default)]
    pub disallow: Vec<String>,
    /// Geometry points written verbatim to the `shape` attribute
    #[serde(default)]
    pub shape: Vec<Position>,
    #[serde(default)]
    pub spread_type: Option<SpreadType>,
    #[serde(default)]
    pub end_offset: Option<f64>,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        num_lanes: u32,
        speed: f64,
    ) -> Self {
        Self {
            id: EdgeId::new(id),
            from: NodeId::new(from),
            to: NodeId::new(to),
            num_lanes,
            speed,
            priority: None,
            lane_width: None,
            allow: Vec::new(),
            disallow: Vec::new(),
            shape: Vec::new(),
            spread_type: None,
            end_offset: None,
        }
    }

    /// SUMO lane identifier for the given lane index, e.g. `e1_0`
    pub fn lane_id(&self, index: u32) -> String {
        format!("{}_{}", self.id, index)
    }
}

impl Entity for Edge {
    const KIND: EntityKind = EntityKind::Edge;

    fn key(&self) -> &str {
        self.id.as_str()
    }
}

/// Car-following models selectable per vehicle type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CarFollowModel {
    #[default]
    Krauss,
    #[serde(rename = "IDM")]
    Idm,
    #[serde(rename = "EIDM")]
    Eidm,
    Wiedemann,
    #[serde(rename = "ACC")]
    Acc,
    #[serde(rename = "CACC")]
    Cacc,
}

impl CarFollowModel {
    pub fn as_str(self) -> &'static str {
        match self {
            CarFollowModel::Krauss => "Krauss",
            CarFollowModel::Idm => "IDM",
            CarFollowModel::Eidm => "EIDM",
            CarFollowModel::Wiedemann => "Wiedemann",
            CarFollowModel::Acc => "ACC",
            CarFollowModel::Cacc => "CACC",
        }
    }
}

/// An RGB colour, rendered as `r,g,b`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Tuning of the lane-change model (`lcStrategic` and friends)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneChangeParams {
    pub strategic: Option<f64>,
    pub cooperative: Option<f64>,
    pub keep_right: Option<f64>,
    pub speed_gain: Option<f64>,
}

/// Physical and behavioural parameters shared by a class of vehicles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleType {
    pub id: VehicleTypeId,
    pub v_class: Option<String>,
    pub color: Option<Color>,
    /// Vehicle length in metres
    pub length: f64,
    pub min_gap: f64,
    /// Maximum speed in m/s
    pub max_speed: f64,
    pub accel: f64,
    pub decel: f64,
    pub emergency_decel: Option<f64>,
    /// Driver imperfection, 0..=1
    pub sigma: Option<f64>,
    /// Desired headway in seconds
    pub tau: Option<f64>,
    pub speed_factor: Option<f64>,
    pub speed_dev: Option<f64>,
    /// Falls back to the simulation-wide model when unset
    pub car_follow_model: Option<CarFollowModel>,
    /// Falls back to the simulation-wide model when unset
    pub lane_change_model: Option<LaneChangeModel>,
    pub lane_change: LaneChangeParams,
}

impl Default for VehicleType {
    fn default() -> Self {
        Self {
            id: VehicleTypeId::new(""),
            v_class: None,
            color: None,
            length: 5.0,
            min_gap: 2.5,
            max_speed: 33.33,
            accel: 2.6,
            decel: 4.5,
            emergency_decel: None,
            sigma: None,
            tau: None,
            speed_factor: None,
            speed_dev: None,
            car_follow_model: None,
            lane_change_model: None,
            lane_change: LaneChangeParams::default(),
        }
    }
}

impl VehicleType {
    /// A passenger-car type with SUMO's default dimensions
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: VehicleTypeId::new(id),
            ..Self::default()
        }
    }
}

impl Entity for VehicleType {
    const KIND: EntityKind = EntityKind::VehicleType;

    fn key(&self) -> &str {
        self.id.as_str()
    }
}

/// A named path through consecutive edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub edges: Vec<EdgeId>,
}

impl Route {
    pub fn new(id: impl Into<String>, edges: &[&str]) -> Self {
        Self {
            id: RouteId::new(id),
            edges: edges.iter().map(|edge| EdgeId::from(*edge)).collect(),
        }
    }
}

impl Entity for Route {
    const KIND: EntityKind = EntityKind::Route;

    fn key(&self) -> &str {
        self.id.as_str()
    }
}

/// Where the vehicles of a flow drive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowPath {
    /// A named route defined elsewhere in the demand file
    Route(RouteId),
    /// An inline edge list, emitted as an embedded route
    Edges(Vec<EdgeId>),
}

/// How often a flow inserts vehicles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowRate {
    VehsPerHour(f64),
    /// Seconds between insertions
    Period(f64),
    /// Insertion probability per second, in (0, 1]
    Probability(f64),
    /// Total vehicle count spread over the window
    Number(u32),
}

/// A time-windowed vehicle generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub id: String,
    pub vehicle_type: VehicleTypeId,
    pub path: FlowPath,
    pub begin: f64,
    pub end: f64,
    pub rate: FlowRate,
}

impl Flow {
    pub fn on_route(
        id: impl Into<String>,
        vehicle_type: impl Into<String>,
        route: impl Into<String>,
        begin: f64,
        end: f64,
        rate: FlowRate,
    ) -> Self {
        Self {
            id: id.into(),
            vehicle_type: VehicleTypeId::new(vehicle_type),
            path: FlowPath::Route(RouteId::new(route)),
            begin,
            end,
            rate,
        }
    }
}

impl Entity for Flow {
    const KIND: EntityKind = EntityKind::Flow;

    fn key(&self) -> &str {
        &self.id
    }
}

/// Origin and destination of a single trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripEndpoints {
    Edges { from: EdgeId, to: EdgeId },
    Junctions { from: NodeId, to: NodeId },
}

/// A single vehicle's origin-to-destination request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub vehicle_type: VehicleTypeId,
    /// Departure time in seconds
    pub depart: f64,
    pub endpoints: TripEndpoints,
}

impl Trip {
    pub fn between_edges(
        id: impl Into<String>,
        vehicle_type: impl Into<String>,
        depart: f64,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            vehicle_type: VehicleTypeId::new(vehicle_type),
            depart,
            endpoints: TripEndpoints::Edges {
                from: EdgeId::new(from),
                to: EdgeId::new(to),
            },
        }
    }
}

impl Entity for Trip {
    const KIND: EntityKind = EntityKind::Trip;

    fn key(&self) -> &str {
        &self.id
    }
}

/// An induction loop on one lane of an edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detector {
    pub id: String,
    pub edge: EdgeId,
    #[serde(default)]
    pub lane: u32,
    /// Offset from the lane start in metres
    pub position: f64,
    /// Aggregation period in seconds
    pub frequency: f64,
    pub file: String,
}

impl Detector {
    pub fn new(
        id: impl Into<String>,
        edge: impl Into<String>,
        lane: u32,
        position: f64,
        frequency: f64,
        file: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            edge: EdgeId::new(edge),
            lane,
            position,
            frequency,
            file: file.into(),
        }
    }

    pub fn lane_id(&self) -> String {
        format!("{}_{}", self.edge, self.lane)
    }
}

impl Entity for Detector {
    const KIND: EntityKind = EntityKind::Detector;

    fn key(&self) -> &str {
        &self.id
    }
}

/// Traffic-light controller algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsType {
    #[default]
    Static,
    Actuated,
    DelayBased,
}

impl TlsType {
    pub fn as_str(self) -> &'static str {
        match self {
            TlsType::Static => "static",
            TlsType::Actuated => "actuated",
            TlsType::DelayBased => "delay_based",
        }
    }
}

/// Characters SUMO accepts in a phase state string
pub const SIGNAL_STATES: &str = "rRgGyYuoOs";

/// One step of a traffic-light cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    /// Duration in seconds
    pub duration: f64,
    /// One signal character per controlled link
    pub state: String,
}

impl Phase {
    pub fn new(duration: f64, state: impl Into<String>) -> Self {
        Self {
            duration,
            state: state.into(),
        }
    }

    /// Characters in the state string that are not valid signals
    pub fn invalid_signals(&self) -> Vec<char> {
        self.state
            .chars()
            .filter(|c| !SIGNAL_STATES.contains(*c))
            .collect()
    }
}

fn default_program_id() -> String {
    "0".to_string()
}

/// A fixed or adaptive phase plan for a controlled node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficLightProgram {
    /// Must name a traffic-light controlled node
    pub id: NodeId,
    #[serde(default = "default_program_id")]
    pub program_id: String,
    #[serde(default)]
    pub kind: TlsType,
    #[serde(default)]
    pub offset: f64,
    pub phases: Vec<Phase>,
}

impl TrafficLightProgram {
    pub fn new(node: impl Into<String>, phases: Vec<Phase>) -> Self {
        Self {
            id: NodeId::new(node),
            program_id: default_program_id(),
            kind: TlsType::Static,
            offset: 0.0,
            phases,
        }
    }
}

impl Entity for TrafficLightProgram {
    const KIND: EntityKind = EntityKind::TrafficLightProgram;

    fn key(&self) -> &str {
        self.id.as_str()
    }
}
