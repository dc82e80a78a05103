//! Reference validation over a scenario snapshot
//!
//! Walks every outgoing reference of every entity and checks numeric ranges.
//! Errors block export; warnings are surfaced but never block. The pass is
//! pure: the same snapshot always yields the same findings in the same order.

use log::debug;
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::entities::{Edge, FlowPath, FlowRate, TripEndpoints};
use super::network::RoadGraph;
use super::store::Snapshot;
use super::types::{EdgeId, EntityKind, EntityRef};

/// Identifier used for findings about the simulation settings
pub const SETTINGS_ID: &str = "simulation";

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Blocks export
    Error,
    /// Reported, export proceeds
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// One problem found in a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    /// Kind of the entity the finding is about
    pub kind: EntityKind,
    /// Identifier of the entity the finding is about
    pub id: String,
    pub message: String,
    /// The entity that could not be resolved or is otherwise implicated
    pub reference: Option<EntityRef>,
}

impl Finding {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} '{}': {}", self.severity, self.kind, self.id, self.message)
    }
}

/// All findings of one validation pass, in deterministic order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|finding| finding.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|finding| !finding.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Whether export must be refused
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// No findings of any severity
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Findings about a particular entity
    pub fn for_entity<'a>(
        &'a self,
        kind: EntityKind,
        id: &'a str,
    ) -> impl Iterator<Item = &'a Finding> {
        self.findings
            .iter()
            .filter(move |finding| finding.kind == kind && finding.id == id)
    }
}

/// Runs every rule over the snapshot
pub fn validate(snapshot: &Snapshot) -> ValidationReport {
    let mut checker = Checker {
        snapshot,
        report: ValidationReport::default(),
    };

    checker.check_settings();
    checker.check_nodes();
    checker.check_edges();
    checker.check_vehicle_types();
    checker.check_routes();
    checker.check_flows();
    checker.check_trips();
    checker.check_detectors();
    checker.check_traffic_lights();

    let report = checker.report;
    debug!(
        "Validated {} entities: {} errors, {} warnings",
        snapshot.entity_count(),
        report.error_count(),
        report.warning_count()
    );
    report
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

struct Checker<'a> {
    snapshot: &'a Snapshot,
    report: ValidationReport,
}

impl Checker<'_> {
    fn push(
        &mut self,
        severity: Severity,
        kind: EntityKind,
        id: &str,
        reference: Option<EntityRef>,
        message: String,
    ) {
        self.report.findings.push(Finding {
            severity,
            kind,
            id: id.to_string(),
            message,
            reference,
        });
    }

    fn error(&mut self, kind: EntityKind, id: &str, message: String) {
        self.push(Severity::Error, kind, id, None, message);
    }

    fn dangling(&mut self, kind: EntityKind, id: &str, target: EntityRef) {
        let message = format!("references missing {}", target);
        self.push(Severity::Error, kind, id, Some(target), message);
    }

    fn warning(&mut self, kind: EntityKind, id: &str, message: String) {
        self.push(Severity::Warning, kind, id, None, message);
    }

    /// Reports `field` unless it is a finite number greater than zero
    fn require_positive(&mut self, kind: EntityKind, id: &str, field: &str, value: f64) {
        if !is_positive(value) {
            self.error(kind, id, format!("{} must be positive, got {}", field, value));
        }
    }

    /// Reports `field` if it is NaN or infinite
    fn require_finite(&mut self, kind: EntityKind, id: &str, field: &str, value: f64) {
        if !value.is_finite() {
            self.error(kind, id, format!("{} must be finite, got {}", field, value));
        }
    }

    fn require_optional_finite(
        &mut self,
        kind: EntityKind,
        id: &str,
        field: &str,
        value: Option<f64>,
    ) {
        if let Some(value) = value {
            self.require_finite(kind, id, field, value);
        }
    }

    fn require_optional_positive(
        &mut self,
        kind: EntityKind,
        id: &str,
        field: &str,
        value: Option<f64>,
    ) {
        if let Some(value) = value {
            self.require_positive(kind, id, field, value);
        }
    }

    fn check_settings(&mut self) {
        let snapshot = self.snapshot;
        let settings = &snapshot.settings;
        let kind = EntityKind::Settings;

        if !settings.begin.is_finite() || !settings.end.is_finite() {
            self.error(kind, SETTINGS_ID, "begin and end must be finite".to_string());
        } else if settings.duration() <= 0.0 {
            self.error(
                kind,
                SETTINGS_ID,
                format!(
                    "duration must be positive, begin {} and end {}",
                    settings.begin, settings.end
                ),
            );
        }
        self.require_positive(kind, SETTINGS_ID, "step length", settings.step_length);
        self.require_finite(kind, SETTINGS_ID, "time to teleport", settings.time_to_teleport);
        self.require_optional_positive(
            kind,
            SETTINGS_ID,
            "lateral resolution",
            settings.lateral_resolution,
        );

        // Two outputs writing one file clobber each other
        let mut owners: HashMap<&str, &str> = HashMap::new();
        for (output_kind, output) in settings.outputs.enabled() {
            let label = output_kind.as_str();
            if output.file.trim().is_empty() {
                self.error(kind, SETTINGS_ID, format!("{} output has no file name", label));
                continue;
            }
            self.require_optional_positive(
                kind,
                SETTINGS_ID,
                &format!("{} output frequency", label),
                output.frequency,
            );
            if let Some(previous) = owners.insert(output.file.as_str(), label) {
                self.warning(
                    kind,
                    SETTINGS_ID,
                    format!("{} and {} outputs both write '{}'", previous, label, output.file),
                );
            }
        }
    }

    fn check_nodes(&mut self) {
        let snapshot = self.snapshot;
        let kind = EntityKind::Node;

        for node in snapshot.nodes.list() {
            let id = node.id.as_str();
            if !node.position.is_finite() {
                self.error(kind, id, "coordinates must be finite".to_string());
            }

            let incident = snapshot
                .edges
                .list()
                .iter()
                .any(|edge| edge.from == node.id || edge.to == node.id);
            if !incident {
                self.warning(kind, id, "node has no incident edge".to_string());
            }
        }
    }

    fn check_edges(&mut self) {
        let snapshot = self.snapshot;
        let kind = EntityKind::Edge;

        for edge in snapshot.edges.list() {
            let id = edge.id.as_str();

            let mut missing: Vec<&str> = Vec::new();
            for endpoint in [&edge.from, &edge.to] {
                let endpoint = endpoint.as_str();
                if !snapshot.nodes.contains(endpoint) && !missing.contains(&endpoint) {
                    missing.push(endpoint);
                }
            }
            match missing.as_slice() {
                [] => {}
                [single] => self.dangling(kind, id, EntityRef::new(EntityKind::Node, *single)),
                several => {
                    let message = format!("references missing nodes '{}'", several.join("', '"));
                    let reference = EntityRef::new(EntityKind::Node, several[0]);
                    self.push(Severity::Error, kind, id, Some(reference), message);
                }
            }

            if edge.num_lanes == 0 {
                self.error(kind, id, "lane count must be positive, got 0".to_string());
            }
            self.require_positive(kind, id, "speed", edge.speed);
            self.require_optional_positive(kind, id, "lane width", edge.lane_width);
            self.require_optional_finite(kind, id, "end offset", edge.end_offset);
            if edge.shape.iter().any(|point| !point.is_finite()) {
                self.error(kind, id, "shape coordinates must be finite".to_string());
            }
        }
    }

    fn check_vehicle_types(&mut self) {
        let snapshot = self.snapshot;
        let kind = EntityKind::VehicleType;

        let referenced: HashSet<&str> = snapshot
            .flows
            .list()
            .iter()
            .map(|flow| flow.vehicle_type.as_str())
            .chain(snapshot.trips.list().iter().map(|trip| trip.vehicle_type.as_str()))
            .collect();

        for vehicle_type in snapshot.vehicle_types.list() {
            let id = vehicle_type.id.as_str();
            self.require_positive(kind, id, "length", vehicle_type.length);
            self.require_positive(kind, id, "max speed", vehicle_type.max_speed);
            self.require_positive(kind, id, "acceleration", vehicle_type.accel);
            self.require_positive(kind, id, "deceleration", vehicle_type.decel);
            self.require_optional_positive(
                kind,
                id,
                "emergency deceleration",
                vehicle_type.emergency_decel,
            );
            self.require_optional_positive(kind, id, "tau", vehicle_type.tau);
            self.require_optional_positive(kind, id, "speed factor", vehicle_type.speed_factor);
            self.require_optional_finite(kind, id, "speed deviation", vehicle_type.speed_dev);

            let params = &vehicle_type.lane_change;
            self.require_optional_finite(kind, id, "lcStrategic", params.strategic);
            self.require_optional_finite(kind, id, "lcCooperative", params.cooperative);
            self.require_optional_finite(kind, id, "lcKeepRight", params.keep_right);
            self.require_optional_finite(kind, id, "lcSpeedGain", params.speed_gain);

            if !vehicle_type.min_gap.is_finite() || vehicle_type.min_gap < 0.0 {
                self.error(
                    kind,
                    id,
                    format!("min gap must not be negative, got {}", vehicle_type.min_gap),
                );
            }
            if let Some(sigma) = vehicle_type.sigma {
                if !(0.0..=1.0).contains(&sigma) {
                    self.error(kind, id, format!("sigma must lie within 0..=1, got {}", sigma));
                }
            }

            if !referenced.contains(id) {
                self.warning(kind, id, "no flow or trip uses this vehicle type".to_string());
            }
        }
    }

    /// Checks that an edge list is non-empty, resolves and is contiguous
    fn check_edge_chain(&mut self, kind: EntityKind, id: &str, edges: &[EdgeId]) {
        let snapshot = self.snapshot;

        if edges.is_empty() {
            self.error(kind, id, "edge list is empty".to_string());
            return;
        }

        for edge_id in edges {
            if !snapshot.edges.contains(edge_id.as_str()) {
                self.dangling(kind, id, edge_id.to_ref());
            }
        }

        let resolved: Vec<Option<&Edge>> = edges
            .iter()
            .map(|edge_id| snapshot.edges.get(edge_id.as_str()))
            .collect();
        for pair in resolved.windows(2) {
            let (Some(current), Some(next)) = (pair[0], pair[1]) else {
                continue;
            };
            if current.to != next.from {
                let message = format!(
                    "edge '{}' ends at node '{}' but next edge '{}' starts at node '{}'",
                    current.id, current.to, next.id, next.from
                );
                self.push(Severity::Error, kind, id, Some(next.id.to_ref()), message);
            }
        }
    }

    fn check_routes(&mut self) {
        let snapshot = self.snapshot;
        for route in snapshot.routes.list() {
            self.check_edge_chain(EntityKind::Route, route.id.as_str(), &route.edges);
        }
    }

    fn check_flows(&mut self) {
        let snapshot = self.snapshot;
        let kind = EntityKind::Flow;

        for flow in snapshot.flows.list() {
            let id = flow.id.as_str();

            if !snapshot.vehicle_types.contains(flow.vehicle_type.as_str()) {
                self.dangling(kind, id, flow.vehicle_type.to_ref());
            }
            match &flow.path {
                FlowPath::Route(route) => {
                    if !snapshot.routes.contains(route.as_str()) {
                        self.dangling(kind, id, route.to_ref());
                    }
                }
                FlowPath::Edges(edges) => self.check_edge_chain(kind, id, edges),
            }

            if !flow.begin.is_finite() || !flow.end.is_finite() {
                self.error(kind, id, "begin and end must be finite".to_string());
            } else if flow.begin > flow.end {
                self.error(kind, id, format!("begin {} is after end {}", flow.begin, flow.end));
            } else if flow.begin < 0.0 {
                self.error(kind, id, format!("begin must not be negative, got {}", flow.begin));
            }

            match flow.rate {
                FlowRate::VehsPerHour(rate) => {
                    self.require_positive(kind, id, "vehicles per hour", rate)
                }
                FlowRate::Period(period) => self.require_positive(kind, id, "period", period),
                FlowRate::Probability(probability) => {
                    if !is_positive(probability) || probability > 1.0 {
                        self.error(
                            kind,
                            id,
                            format!("probability must lie within (0, 1], got {}", probability),
                        );
                    }
                }
                FlowRate::Number(0) => {
                    self.error(kind, id, "vehicle number must be positive, got 0".to_string())
                }
                FlowRate::Number(_) => {}
            }
        }
    }

    fn check_trips(&mut self) {
        let snapshot = self.snapshot;
        let kind = EntityKind::Trip;
        let graph = RoadGraph::from_store(snapshot);
        debug!(
            "Road graph has {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        for trip in snapshot.trips.list() {
            let id = trip.id.as_str();

            if !snapshot.vehicle_types.contains(trip.vehicle_type.as_str()) {
                self.dangling(kind, id, trip.vehicle_type.to_ref());
            }
            if !trip.depart.is_finite() || trip.depart < 0.0 {
                let message = format!("departure must not be negative, got {}", trip.depart);
                self.error(kind, id, message);
            }

            // Only the path between the resolved endpoints is checked for reachability
            let endpoints = match &trip.endpoints {
                TripEndpoints::Edges { from, to } => {
                    let origin = snapshot.edges.get(from.as_str());
                    let destination = snapshot.edges.get(to.as_str());
                    if origin.is_none() {
                        self.dangling(kind, id, from.to_ref());
                    }
                    if destination.is_none() && to != from {
                        self.dangling(kind, id, to.to_ref());
                    }
                    match (origin, destination) {
                        (Some(origin), Some(destination)) if origin.id != destination.id => {
                            Some((origin.to.clone(), destination.from.clone()))
                        }
                        _ => None,
                    }
                }
                TripEndpoints::Junctions { from, to } => {
                    let mut resolved = true;
                    for node in [from, to] {
                        if !snapshot.nodes.contains(node.as_str()) {
                            self.dangling(kind, id, node.to_ref());
                            resolved = false;
                        }
                        if from == to {
                            break;
                        }
                    }
                    resolved.then(|| (from.clone(), to.clone()))
                }
            };

            if let Some((start, end)) = endpoints {
                if !graph.is_reachable(&start, &end) {
                    let message = format!(
                        "destination is unreachable from origin (no path from node '{}' to '{}')",
                        start, end
                    );
                    self.warning(kind, id, message);
                }
            }
        }
    }

    fn check_detectors(&mut self) {
        let snapshot = self.snapshot;
        let kind = EntityKind::Detector;

        let output_files: HashSet<&str> = snapshot
            .settings
            .outputs
            .enabled()
            .map(|(_, output)| output.file.as_str())
            .collect();

        for detector in snapshot.detectors.list() {
            let id = detector.id.as_str();

            match snapshot.edges.get(detector.edge.as_str()) {
                None => self.dangling(kind, id, detector.edge.to_ref()),
                Some(edge) if detector.lane >= edge.num_lanes => {
                    let message = format!(
                        "lane index {} is out of range, edge '{}' has {} lanes",
                        detector.lane, edge.id, edge.num_lanes
                    );
                    self.push(Severity::Error, kind, id, Some(edge.id.to_ref()), message);
                }
                Some(_) => {}
            }

            if !detector.position.is_finite() {
                self.error(kind, id, "position must be finite".to_string());
            }
            self.require_positive(kind, id, "frequency", detector.frequency);

            if detector.file.trim().is_empty() {
                self.error(kind, id, "output file name is empty".to_string());
            } else if output_files.contains(detector.file.as_str()) {
                self.warning(
                    kind,
                    id,
                    format!("output file '{}' is also used by a simulation output", detector.file),
                );
            }
        }
    }

    fn check_traffic_lights(&mut self) {
        let snapshot = self.snapshot;
        let kind = EntityKind::TrafficLightProgram;

        for program in snapshot.traffic_lights.list() {
            let id = program.id.as_str();

            match snapshot.nodes.get(id) {
                None => self.dangling(kind, id, program.id.to_ref()),
                Some(node) if !node.is_controlled() => {
                    let message = format!("node '{}' is not traffic-light controlled", node.id);
                    self.push(Severity::Error, kind, id, Some(node.id.to_ref()), message);
                }
                Some(_) => {}
            }

            if !program.offset.is_finite() {
                self.error(kind, id, "offset must be finite".to_string());
            }
            if program.phases.is_empty() {
                self.error(kind, id, "program has no phases".to_string());
                continue;
            }

            let expected_links = program.phases[0].state.chars().count();
            for (index, phase) in program.phases.iter().enumerate() {
                let field = format!("phase {} duration", index);
                self.require_positive(kind, id, &field, phase.duration);

                let invalid = phase.invalid_signals();
                if phase.state.is_empty() {
                    self.error(kind, id, format!("phase {} has an empty state", index));
                } else if !invalid.is_empty() {
                    let signals: String = invalid.into_iter().collect();
                    self.error(
                        kind,
                        id,
                        format!("phase {} state contains invalid signals '{}'", index, signals),
                    );
                }
                if phase.state.chars().count() != expected_links {
                    self.error(
                        kind,
                        id,
                        format!(
                            "phase {} controls {} links but phase 0 controls {}",
                            index,
                            phase.state.chars().count(),
                            expected_links
                        ),
                    );
                }
            }
        }
    }
}
