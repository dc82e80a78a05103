//! Project packaging and export gating

use std::path::PathBuf;

use sumo_builder::codegen::{self, build_command, ArtifactKind};
use sumo_builder::export::{
    build_package, check_project_name, export_project, render_instructions, ExportError,
    INSTRUCTIONS_FILE,
};
use sumo_builder::scenario::{
    validate, Detector, DrivingSide, Edge, EntityStore, Flow, FlowRate, Node, Route, VehicleType,
};

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

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sumo_builder_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_export_contains_all_files() {
    let store = base_store();
    let outcome = export_project(&store, "demo").unwrap();

    assert_eq!(
        outcome.package.file_names(),
        vec![
            "nodes.nod.xml",
            "edges.edg.xml",
            "routes.rou.xml",
            "additional.add.xml",
            "simulation.sumocfg",
            INSTRUCTIONS_FILE
        ]
    );
    assert_eq!(outcome.package.project_name, "demo");
    assert!(outcome.report.is_clean());

    // Package contents are the generator output for the same store
    let artifacts = codegen::generate_all(&store.snapshot());
    for kind in ArtifactKind::ALL {
        let file = outcome.package.file(kind.file_name()).unwrap();
        assert_eq!(file.contents, artifacts.get(kind).contents);
    }
}

#[test]
fn test_instructions_contain_build_command() {
    let mut store = base_store();
    store.settings.driving_side = DrivingSide::Left;

    let outcome = export_project(&store, "lefty").unwrap();
    let instructions = outcome.package.instructions().unwrap();

    assert!(instructions.contains("# SUMO scenario: lefty"));
    assert!(instructions.contains(&build_command(&store.settings)));
    assert!(instructions.contains("--lefthand"));
    assert!(instructions.contains("sumo -c simulation.sumocfg"));
    assert!(instructions.contains("## Warnings\nNone."));
    assert!(instructions.contains("plain directory"));
}

#[test]
fn test_warnings_are_listed_and_do_not_block() {
    let mut store = base_store();
    store.vehicle_types.add(VehicleType::new("bus")).unwrap();

    let outcome = export_project(&store, "warned").unwrap();
    assert_eq!(outcome.report.warning_count(), 1);

    let instructions = outcome.package.instructions().unwrap();
    assert!(!instructions.contains("None."));
    assert!(instructions.contains("'bus'"));
}

#[test]
fn test_export_refused_on_validation_errors() {
    let mut store = base_store();
    store
        .detectors
        .add(Detector::new("D1", "E2", 0, 5.0, 60.0, "d1.xml"))
        .unwrap();

    match export_project(&store, "broken") {
        Err(ExportError::ValidationFailed { report }) => {
            assert_eq!(report.error_count(), 1);
            assert_eq!(report.errors().next().unwrap().id, "D1");
        }
        other => panic!("expected ValidationFailed, got {:?}", other),
    }
}

#[test]
fn test_build_package_blocks_on_error_findings() {
    let mut store = base_store();
    store.edges.add(Edge::new("E9", "B", "Z", 1, 13.9)).unwrap();
    let snapshot = store.snapshot();
    let report = validate(&snapshot);
    assert!(report.has_errors());

    // Generators run regardless; packaging is what gets refused
    let artifacts = codegen::generate_all(&snapshot);
    let result = build_package(
        "blocked",
        artifacts,
        &build_command(&snapshot.settings),
        &report.findings,
    );
    assert!(matches!(
        result,
        Err(ExportError::ExportBlocked { error_count: 1 })
    ));
}

#[test]
fn test_render_instructions_without_warnings() {
    let doc = render_instructions("plain", "netconvert -n a -e b -o c", &[]);
    assert!(doc.starts_with("# SUMO scenario: plain\n"));
    assert!(doc.contains("## 1) Build the network"));
    assert!(doc.contains("netconvert -n a -e b -o c\n"));
    for kind in ArtifactKind::ALL {
        assert!(doc.contains(&format!("- {}", kind.file_name())));
    }
}

#[test]
fn test_write_to_dir() {
    let store = base_store();
    let outcome = export_project(&store, "on_disk").unwrap();
    let dir = scratch_dir("write_to_dir");

    outcome.package.write_to_dir(&dir).unwrap();

    for file in &outcome.package.files {
        let written = std::fs::read_to_string(dir.join(&file.name)).unwrap();
        assert_eq!(written, file.contents);
    }

    // Writing again overwrites in place
    outcome.package.write_to_dir(&dir).unwrap();
    let count = std::fs::read_dir(&dir).unwrap().count();
    assert_eq!(count, outcome.package.files.len());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_write_to_dir_reports_path_on_failure() {
    let store = base_store();
    let outcome = export_project(&store, "blocked_path").unwrap();

    // A regular file where the directory should go
    let blocker = scratch_dir("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    match outcome.package.write_to_dir(&blocker) {
        Err(ExportError::Io { path, .. }) => assert_eq!(path, blocker),
        other => panic!("expected Io error, got {:?}", other),
    }

    std::fs::remove_file(&blocker).unwrap();
}

#[test]
fn test_project_name_must_be_a_single_directory() {
    for name in ["../escape", "/tmp/abs", "a/b", "a\\b", "", ".", "..", "c:x"] {
        assert!(
            matches!(
                check_project_name(name),
                Err(ExportError::InvalidProjectName { .. })
            ),
            "accepted {:?}",
            name
        );
    }
    for name in ["demo", "my_project", "run.2024"] {
        assert!(check_project_name(name).is_ok(), "rejected {:?}", name);
    }

    let store = base_store();
    assert!(matches!(
        export_project(&store, "../escape"),
        Err(ExportError::InvalidProjectName { .. })
    ));
    let snapshot = store.snapshot();
    let result = build_package(
        "x/y",
        codegen::generate_all(&snapshot),
        &build_command(&snapshot.settings),
        &[],
    );
    assert!(matches!(result, Err(ExportError::InvalidProjectName { .. })));
}
