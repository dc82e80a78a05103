//! File generation and command synthesis

use proptest::prelude::*;
use sumo_builder::codegen::{
    self, build_command, generate_additional, generate_configuration, generate_demand,
    generate_edges, generate_nodes, run_command, ArtifactKind, NETWORK_FILE,
};
use sumo_builder::codegen::xml::{escape, format_number};
use sumo_builder::scenario::{
    validate, Detector, DrivingSide, Edge, EdgeId, EntityStore, Flow, FlowPath, FlowRate, Node,
    NodeId, NodeType, Phase, Position, Route, TrafficLightProgram, Trip, TripEndpoints,
    VehicleType,
};

/// A, B; E1 A->B; V1; R1 = [E1]; F1 (V1, R1, 0..3600, 100 veh/h)
fn base_store() -> EntityStore {
    let mut store = EntityStore::new();
    store.nodes.add(Node::new("A", 0.0, 0.0)).unwrap();
    store.nodes.add(Node::new("B", 10.0, 0.0)).unwrap();
    store.edges.add(Edge::new("E1", "A", "B", 2, 13.9)).unwrap();
    store.vehicle_types.add(VehicleType::new("V1")).unwrap();
    store.routes.add(Route::new("R1", &["E1"])).unwrap();
    store
        .flows
        .add(Flow::on_route("F1", "V1", "R1", 0.0, 3600.0, FlowRate::VehsPerHour(100.0)))
        .unwrap();
    store
}

fn position_of(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("'{}' not found in:\n{}", needle, haystack))
}

#[test]
fn test_format_number() {
    assert_eq!(format_number(13.9), "13.9");
    assert_eq!(format_number(0.0), "0");
    assert_eq!(format_number(-0.0), "0");
    assert_eq!(format_number(-2.5), "-2.5");
    assert_eq!(format_number(3600.0), "3600");
    assert_eq!(format_number(1234567.891), "1234567.891");
    // Small values keep every significant digit
    assert_eq!(format_number(0.004), "0.004");
    assert_eq!(format_number(0.001), "0.001");
    assert_eq!(format_number(0.0001), "0.0001");
    assert_eq!(format_number(1.0e-7), "0.0000001");
}

#[test]
fn test_escape() {
    assert_eq!(escape("a&b<c>\"d'"), "a&amp;b&lt;c&gt;&quot;d&apos;");
    assert_eq!(escape("plain_id"), "plain_id");
}

#[test]
fn test_node_artifact() {
    let mut store = base_store();
    store
        .nodes
        .update("B", Node::new("B", 10.0, 0.0).with_type(NodeType::TrafficLight))
        .unwrap();

    let artifact = generate_nodes(&store.snapshot());
    assert_eq!(artifact.kind, ArtifactKind::Nodes);
    assert!(artifact.contents.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(artifact
        .contents
        .contains("xsi:noNamespaceSchemaLocation=\"http://sumo.dlr.de/xsd/nodes_file.xsd\""));
    assert!(artifact.contents.contains("<node id=\"A\" x=\"0\" y=\"0\"/>"));
    assert!(artifact
        .contents
        .contains("<node id=\"B\" x=\"10\" y=\"0\" type=\"traffic_light\"/>"));
    let first = position_of(&artifact.contents, "id=\"A\"");
    assert!(first < position_of(&artifact.contents, "id=\"B\""));
}

#[test]
fn test_edge_artifact() {
    let mut store = base_store();
    let mut edge = Edge::new("E2", "B", "A", 1, 8.0);
    edge.allow = vec!["bus".to_string(), "bicycle".to_string()];
    edge.shape = vec![Position::new(10.0, 0.0), Position::new(5.0, 3.0), Position::new(0.0, 0.0)];
    store.edges.add(edge).unwrap();

    let contents = generate_edges(&store.snapshot()).contents;
    assert!(contents.contains(
        "<edge id=\"E1\" from=\"A\" to=\"B\" numLanes=\"2\" speed=\"13.9\"/>"
    ));
    assert!(contents.contains("allow=\"bus bicycle\""));
    assert!(contents.contains("shape=\"10,0 5,3 0,0\""));
    assert!(contents.contains("<!-- Driving side: right-hand -->"));
}

#[test]
fn test_edge_artifact_notes_left_hand_traffic() {
    let mut store = base_store();
    store.settings.driving_side = DrivingSide::Left;

    let contents = generate_edges(&store.snapshot()).contents;
    assert!(contents.contains("left-hand"));
    assert!(contents.contains("--lefthand"));
}

#[test]
fn test_demand_emits_types_before_routes_before_flows_before_trips() {
    let mut store = EntityStore::new();
    store.nodes.add(Node::new("A", 0.0, 0.0)).unwrap();
    store.nodes.add(Node::new("B", 10.0, 0.0)).unwrap();
    store.edges.add(Edge::new("E1", "A", "B", 2, 13.9)).unwrap();
    // Insertion order deliberately differs from emission order
    store
        .trips
        .add(Trip::between_edges("T1", "V1", 0.0, "E1", "E1"))
        .unwrap();
    store
        .flows
        .add(Flow::on_route("F1", "V1", "R1", 0.0, 3600.0, FlowRate::VehsPerHour(100.0)))
        .unwrap();
    store.routes.add(Route::new("R1", &["E1"])).unwrap();
    store.vehicle_types.add(VehicleType::new("V1")).unwrap();

    let contents = generate_demand(&store.snapshot()).contents;
    let vtype = position_of(&contents, "<vType id=\"V1\"");
    let route = position_of(&contents, "<route id=\"R1\"");
    let flow = position_of(&contents, "<flow id=\"F1\"");
    let trip = position_of(&contents, "<trip id=\"T1\"");
    assert!(vtype < route && route < flow && flow < trip);
}

#[test]
fn test_single_edge_scenario_end_to_end() {
    let store = base_store();
    let snapshot = store.snapshot();

    let report = validate(&snapshot);
    assert_eq!(report.error_count(), 0);

    let artifacts = codegen::generate_all(&snapshot);
    let demand = &artifacts.demand.contents;
    assert!(position_of(demand, "<vType id=\"V1\"") < position_of(demand, "<route id=\"R1\""));
    assert!(position_of(demand, "<route id=\"R1\"") < position_of(demand, "<flow id=\"F1\""));
    assert!(demand.contains(
        "<flow id=\"F1\" type=\"V1\" route=\"R1\" begin=\"0\" end=\"3600\" vehsPerHour=\"100\"/>"
    ));

    // Configuration cross-references match the produced file names
    let config = &artifacts.configuration.contents;
    assert!(config.contains(&format!(
        "<route-files value=\"{}\"/>",
        artifacts.demand.file_name()
    )));
    assert!(config.contains(&format!(
        "<additional-files value=\"{}\"/>",
        artifacts.additional.file_name()
    )));
    assert!(config.contains(&format!("<net-file value=\"{}\"/>", NETWORK_FILE)));
    assert!(build_command(&snapshot.settings).contains(&format!("-o {}", NETWORK_FILE)));
    assert!(build_command(&snapshot.settings).contains(artifacts.nodes.file_name()));
    assert!(build_command(&snapshot.settings).contains(artifacts.edges.file_name()));
}

#[test]
fn test_route_edge_sequence_round_trips() {
    let mut store = base_store();
    store.nodes.add(Node::new("C", 20.0, 0.0)).unwrap();
    store.nodes.add(Node::new("D", 30.0, 0.0)).unwrap();
    store.edges.add(Edge::new("E2", "B", "C", 1, 13.9)).unwrap();
    store.edges.add(Edge::new("E3", "C", "D", 1, 13.9)).unwrap();
    store.routes.add(Route::new("R2", &["E1", "E2", "E3"])).unwrap();
    store
        .flows
        .add(Flow::on_route("F2", "V1", "R2", 0.0, 60.0, FlowRate::Number(5)))
        .unwrap();

    let snapshot = store.snapshot();
    assert!(!validate(&snapshot).has_errors());

    let contents = generate_demand(&snapshot).contents;
    assert!(contents.contains("<route id=\"R2\" edges=\"E1 E2 E3\"/>"));
    assert!(contents.contains("number=\"5\""));
}

#[test]
fn test_demand_optional_forms() {
    let mut store = base_store();
    store
        .flows
        .add(Flow {
            id: "F2".to_string(),
            vehicle_type: "V1".into(),
            path: FlowPath::Edges(vec![EdgeId::new("E1")]),
            begin: 10.0,
            end: 20.0,
            rate: FlowRate::Probability(0.5),
        })
        .unwrap();
    store
        .trips
        .add(Trip {
            id: "T1".to_string(),
            vehicle_type: "V1".into(),
            depart: 3.0,
            endpoints: TripEndpoints::Junctions {
                from: NodeId::new("A"),
                to: NodeId::new("B"),
            },
        })
        .unwrap();

    let snapshot = store.snapshot();
    let contents = generate_demand(&snapshot).contents;
    assert!(contents.contains(
        "<flow id=\"F2\" type=\"V1\" begin=\"10\" end=\"20\" probability=\"0.5\">"
    ));
    assert!(contents.contains("<route edges=\"E1\"/>"));
    assert!(contents.contains(
        "<trip id=\"T1\" type=\"V1\" depart=\"3\" fromJunction=\"A\" toJunction=\"B\"/>"
    ));

    // Junction trips need junction-taz in the configuration
    let config = generate_configuration(&snapshot).contents;
    assert!(config.contains("<junction-taz value=\"true\"/>"));
}

#[test]
fn test_vehicle_type_inherits_lane_change_model() {
    let mut store = base_store();
    store.settings.lane_change_model = sumo_builder::scenario::LaneChangeModel::SL2015;

    let contents = generate_demand(&store.snapshot()).contents;
    assert!(contents.contains("laneChangeModel=\"SL2015\""));
    assert!(!contents.contains("carFollowModel"));
}

#[test]
fn test_additional_artifact() {
    let mut store = base_store();
    store
        .nodes
        .update("B", Node::new("B", 10.0, 0.0).with_type(NodeType::TrafficLight))
        .unwrap();
    store
        .detectors
        .add(Detector::new("D1", "E1", 1, 5.5, 60.0, "d1.xml"))
        .unwrap();
    store
        .traffic_lights
        .add(TrafficLightProgram::new(
            "B",
            vec![Phase::new(30.0, "GG"), Phase::new(4.0, "yy")],
        ))
        .unwrap();
    store.settings.outputs.edgedata.enabled = true;

    let contents = generate_additional(&store.snapshot()).contents;
    assert!(contents.contains(
        "<inductionLoop id=\"D1\" lane=\"E1_1\" pos=\"5.5\" period=\"60\" file=\"d1.xml\"/>"
    ));
    assert!(contents.contains("<tlLogic id=\"B\" type=\"static\" programID=\"0\" offset=\"0\">"));
    assert!(contents.contains("<phase duration=\"30\" state=\"GG\"/>"));
    assert!(contents.contains("<phase duration=\"4\" state=\"yy\"/>"));
    assert!(contents.contains("<edgeData id=\"edgedata\" period=\"60\" file=\"edgeData.xml\"/>"));
    assert!(!contents.contains("laneData"));
    assert!(position_of(&contents, "<inductionLoop") < position_of(&contents, "<tlLogic"));
}

#[test]
fn test_configuration_outputs() {
    let mut store = base_store();
    store.settings.outputs.fcd.enabled = true;
    store.settings.outputs.summary.enabled = false;
    store.settings.random_seed = Some(7);

    let contents = generate_configuration(&store.snapshot()).contents;
    assert!(contents.contains("<tripinfo-output value=\"tripinfo.xml\"/>"));
    assert!(contents.contains("<fcd-output value=\"fcd.xml\"/>"));
    assert!(contents.contains("<device.fcd.period value=\"1\"/>"));
    assert!(!contents.contains("summary-output"));
    assert!(contents.contains("<seed value=\"7\"/>"));
    assert!(contents.contains("<step-length value=\"0.1\"/>"));
    assert!(contents.contains("<collision.action value=\"warn\"/>"));
    assert!(!contents.contains("junction-taz"));
}

#[test]
fn test_small_values_survive_generation() {
    let mut store = base_store();
    store
        .flows
        .add(Flow::on_route("F2", "V1", "R1", 0.0, 60.0, FlowRate::Probability(0.004)))
        .unwrap();
    store.settings.step_length = 0.001;
    let mut vehicle_type = VehicleType::new("V2");
    vehicle_type.tau = Some(0.005);
    store.vehicle_types.add(vehicle_type).unwrap();
    store
        .flows
        .add(Flow::on_route("F3", "V2", "R1", 0.0, 60.0, FlowRate::Period(0.25)))
        .unwrap();

    let snapshot = store.snapshot();
    assert!(!validate(&snapshot).has_errors());

    let artifacts = codegen::generate_all(&snapshot);
    assert!(artifacts.demand.contents.contains("probability=\"0.004\""));
    assert!(artifacts.demand.contents.contains("tau=\"0.005\""));
    assert!(artifacts.demand.contents.contains("period=\"0.25\""));
    assert!(artifacts
        .configuration
        .contents
        .contains("<step-length value=\"0.001\"/>"));
}

#[test]
fn test_reserved_characters_are_escaped() {
    let mut store = base_store();
    store.nodes.add(Node::new("x&<y>", 1.0, 1.0)).unwrap();
    store
        .detectors
        .add(Detector::new("D\"1", "E1", 0, 1.0, 60.0, "out'<1>.xml"))
        .unwrap();

    let snapshot = store.snapshot();
    let nodes = generate_nodes(&snapshot).contents;
    assert!(nodes.contains("id=\"x&amp;&lt;y&gt;\""));

    let additional = generate_additional(&snapshot).contents;
    assert!(additional.contains("id=\"D&quot;1\""));
    assert!(additional.contains("file=\"out&apos;&lt;1&gt;.xml\""));
}

#[test]
fn test_build_command_driving_side() {
    let mut store = base_store();
    assert_eq!(
        build_command(&store.settings),
        "netconvert -n nodes.nod.xml -e edges.edg.xml -o network.net.xml"
    );
    assert!(!build_command(&store.settings).contains("--lefthand"));

    store.settings.driving_side = DrivingSide::Left;
    assert!(build_command(&store.settings).ends_with(" --lefthand"));

    // Nothing else in the settings affects the command
    let before = build_command(&store.settings);
    store.settings.end = 60.0;
    store.settings.outputs.fcd.enabled = true;
    assert_eq!(build_command(&store.settings), before);
}

#[test]
fn test_run_command() {
    assert_eq!(run_command(), "sumo -c simulation.sumocfg");
}

#[test]
fn test_demo_scenario_generates() {
    let store = EntityStore::create_demo_scenario().unwrap();
    let artifacts = codegen::generate_all(&store.snapshot());

    let names: Vec<&str> = artifacts.iter().map(|artifact| artifact.file_name()).collect();
    assert_eq!(
        names,
        vec![
            "nodes.nod.xml",
            "edges.edg.xml",
            "routes.rou.xml",
            "additional.add.xml",
            "simulation.sumocfg"
        ]
    );
    assert!(artifacts.demand.contents.contains("carFollowModel=\"IDM\""));
    assert!(artifacts.demand.contents.contains("color=\"255,0,0\""));
    assert!(artifacts
        .additional
        .contents
        .contains("<tlLogic id=\"n2\" type=\"static\" programID=\"p1\""));
}

/// A chain of nodes joined by edges, with one route over the whole chain
fn chain_store(points: &[(f64, f64)], speeds: &[f64], left: bool) -> EntityStore {
    let mut store = EntityStore::new();
    for (index, (x, y)) in points.iter().enumerate() {
        store.nodes.add(Node::new(format!("n{}", index), *x, *y)).unwrap();
    }
    let mut edge_ids = Vec::new();
    for index in 1..points.len() {
        let speed = speeds[index % speeds.len()];
        let id = format!("e{}", index);
        let lanes = 1 + index as u32 % 3;
        let (from, to) = (format!("n{}", index - 1), format!("n{}", index));
        store
            .edges
            .add(Edge::new(id.clone(), from, to, lanes, speed))
            .unwrap();
        edge_ids.push(id);
    }
    let edge_refs: Vec<&str> = edge_ids.iter().map(String::as_str).collect();
    store.vehicle_types.add(VehicleType::new("car")).unwrap();
    store.routes.add(Route::new("main", &edge_refs)).unwrap();
    store
        .flows
        .add(Flow::on_route("f", "car", "main", 0.0, 600.0, FlowRate::Period(3.0)))
        .unwrap();
    if left {
        store.settings.driving_side = DrivingSide::Left;
    }
    store
}

proptest! {
    #[test]
    fn prop_generation_is_deterministic(
        points in prop::collection::vec((-1.0e4f64..1.0e4, -1.0e4f64..1.0e4), 2..12),
        speeds in prop::collection::vec(0.5f64..40.0, 1..4),
        left in any::<bool>(),
    ) {
        let store = chain_store(&points, &speeds, left);
        let snapshot = store.snapshot();
        prop_assert!(!validate(&snapshot).has_errors());

        let first = codegen::generate_all(&snapshot);
        let second = codegen::generate_all(&snapshot);
        prop_assert_eq!(&first, &second);

        // An independently built store with the same content renders identically
        let rebuilt = chain_store(&points, &speeds, left);
        prop_assert_eq!(first, codegen::generate_all(&rebuilt.snapshot()));
    }

    #[test]
    fn prop_route_lists_edges_in_order(len in 2usize..10) {
        let points: Vec<(f64, f64)> = (0..len).map(|i| (i as f64 * 10.0, 0.0)).collect();
        let store = chain_store(&points, &[13.9], false);
        let expected: Vec<String> = (1..len).map(|i| format!("e{}", i)).collect();

        let contents = generate_demand(&store.snapshot()).contents;
        let needle = format!("<route id=\"main\" edges=\"{}\"/>", expected.join(" "));
        prop_assert!(contents.contains(&needle));
    }
}
