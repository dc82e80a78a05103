//! Configuration file (`.sumocfg`) generation
//!
//! Cross-references the other artifacts by their kind-derived file names.

use super::xml::XmlElement;
use super::{Artifact, ArtifactKind, NETWORK_FILE};
use crate::scenario::{OutputKind, Snapshot, TripEndpoints};

fn option(name: &'static str, value: impl ToString) -> XmlElement {
    XmlElement::new(name).attr("value", value)
}

fn number_option(name: &'static str, value: f64) -> XmlElement {
    XmlElement::new(name).attr_number("value", value)
}

/// Option names for a simulator output and its sampling period
fn output_options(kind: OutputKind) -> Option<(&'static str, Option<&'static str>)> {
    match kind {
        OutputKind::TripInfo => Some(("tripinfo-output", None)),
        OutputKind::Fcd => Some(("fcd-output", Some("device.fcd.period"))),
        OutputKind::Emissions => Some(("emission-output", Some("device.emissions.period"))),
        OutputKind::Summary => Some(("summary-output", Some("summary-output.period"))),
        // Declared in the additional file
        OutputKind::EdgeData | OutputKind::LaneData => None,
    }
}

pub fn generate_configuration(snapshot: &Snapshot) -> Artifact {
    let kind = ArtifactKind::Configuration;
    let settings = &snapshot.settings;

    let input = XmlElement::new("input")
        .child(option("net-file", NETWORK_FILE))
        .child(option("route-files", ArtifactKind::Demand.file_name()))
        .child(option("additional-files", ArtifactKind::Additional.file_name()));

    let time = XmlElement::new("time")
        .child(number_option("begin", settings.begin))
        .child(number_option("end", settings.end))
        .child(number_option("step-length", settings.step_length));

    let mut processing = XmlElement::new("processing");
    if let Some(resolution) = settings.lateral_resolution {
        processing.push(number_option("lateral-resolution", resolution));
    }
    processing.push(number_option("time-to-teleport", settings.time_to_teleport));
    processing.push(option("collision.action", settings.collision_action.as_str()));
    processing.push(option("carfollow.model", settings.car_follow_model.as_str()));

    let mut root = XmlElement::schema_root("configuration", kind.schema())
        .child(input)
        .child(time)
        .child(processing);

    let junction_trips = snapshot
        .trips
        .list()
        .iter()
        .any(|trip| matches!(trip.endpoints, TripEndpoints::Junctions { .. }));
    if junction_trips {
        root.push(XmlElement::new("routing").child(option("junction-taz", true)));
    }

    if let Some(seed) = settings.random_seed {
        root.push(XmlElement::new("random_number").child(option("seed", seed)));
    }

    root.push(
        XmlElement::new("report")
            .child(option("verbose", true))
            .child(option("no-step-log", false)),
    );

    let mut output = XmlElement::new("output");
    for (output_kind, enabled) in settings.outputs.enabled() {
        let Some((file_option, period_option)) = output_options(output_kind) else {
            continue;
        };
        output.push(option(file_option, &enabled.file));
        if let (Some(period_option), Some(frequency)) = (period_option, enabled.frequency) {
            output.push(number_option(period_option, frequency));
        }
    }
    if !output.children().is_empty() {
        root.push(output);
    }

    Artifact::new(kind, root.to_document())
}
