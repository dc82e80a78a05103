//! The scenario a new editing session starts with

use super::entities::{
    CarFollowModel, Color, Detector, Edge, Flow, FlowRate, LaneChangeParams, Node, NodeType,
    Phase, Route, SpreadType, TrafficLightProgram, Trip, VehicleType,
};
use super::store::{EntityStore, StoreError};

impl EntityStore {
    /// Creates a small signalised corridor: three nodes, two edges, a car and
    /// a bus type, one flow, one trip, a detector and a fixed-time program
    pub fn create_demo_scenario() -> Result<Self, StoreError> {
        let mut store = Self::new();

        store.nodes.add(Node::new("n1", 0.0, 0.0).with_type(NodeType::Priority))?;
        store.nodes.add(Node::new("n2", 100.0, 0.0).with_type(NodeType::TrafficLight))?;
        store.nodes.add(Node::new("n3", 200.0, 0.0).with_type(NodeType::Priority))?;

        for (id, from, to) in [("e1", "n1", "n2"), ("e2", "n2", "n3")] {
            let mut edge = Edge::new(id, from, to, 2, 13.89);
            edge.priority = Some(1);
            edge.lane_width = Some(3.2);
            edge.spread_type = Some(SpreadType::Center);
            store.edges.add(edge)?;
        }

        store.vehicle_types.add(VehicleType {
            v_class: Some("passenger".to_string()),
            color: Some(Color::new(255, 0, 0)),
            emergency_decel: Some(9.0),
            sigma: Some(0.5),
            tau: Some(1.0),
            speed_factor: Some(1.0),
            speed_dev: Some(0.1),
            car_follow_model: Some(CarFollowModel::Idm),
            lane_change: LaneChangeParams {
                strategic: Some(1.0),
                cooperative: Some(1.0),
                keep_right: Some(0.8),
                speed_gain: Some(1.0),
            },
            ..VehicleType::new("car")
        })?;
        store.vehicle_types.add(VehicleType {
            v_class: Some("bus".to_string()),
            color: Some(Color::new(0, 0, 255)),
            length: 12.0,
            min_gap: 3.0,
            max_speed: 22.22,
            accel: 1.2,
            decel: 4.0,
            emergency_decel: Some(7.0),
            sigma: Some(0.5),
            tau: Some(1.2),
            speed_factor: Some(0.9),
            speed_dev: Some(0.05),
            car_follow_model: Some(CarFollowModel::Krauss),
            lane_change: LaneChangeParams {
                strategic: Some(1.0),
                cooperative: Some(1.0),
                keep_right: Some(0.8),
                speed_gain: Some(0.6),
            },
            ..VehicleType::new("bus")
        })?;

        store.routes.add(Route::new("r1", &["e1", "e2"]))?;
        store.flows.add(Flow::on_route(
            "f1",
            "car",
            "r1",
            0.0,
            3600.0,
            FlowRate::VehsPerHour(1000.0),
        ))?;
        store.trips.add(Trip::between_edges("t1", "bus", 0.0, "e1", "e2"))?;

        store
            .detectors
            .add(Detector::new("det1", "e1", 0, 50.0, 60.0, "e1_output.xml"))?;

        // One signal per lane-to-lane connection across n2
        let mut program = TrafficLightProgram::new(
            "n2",
            vec![
                Phase::new(30.0, "GG"),
                Phase::new(4.0, "yy"),
                Phase::new(30.0, "rr"),
            ],
        );
        program.program_id = "p1".to_string();
        store.traffic_lights.add(program)?;

        Ok(store)
    }
}
