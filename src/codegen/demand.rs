//! Demand file (`.rou.xml`) generation
//!
//! Emission order is fixed: vehicle types, routes, flows, trips. SUMO needs a
//! type or route defined before anything refers to it.

use super::xml::XmlElement;
use super::{Artifact, ArtifactKind};
use crate::scenario::{
    EdgeId, Flow, FlowPath, FlowRate, LaneChangeModel, Snapshot, Trip, TripEndpoints, VehicleType,
};

/// Space-separated edge list as used by `route` and `flow` elements
pub fn format_edge_list(edges: &[EdgeId]) -> String {
    edges
        .iter()
        .map(EdgeId::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

fn vehicle_type_element(
    vehicle_type: &VehicleType,
    default_lane_change: LaneChangeModel,
) -> XmlElement {
    let lane_change_model = vehicle_type.lane_change_model.unwrap_or(default_lane_change);
    let params = &vehicle_type.lane_change;

    XmlElement::new("vType")
        .attr("id", &vehicle_type.id)
        .attr_opt("vClass", vehicle_type.v_class.as_deref())
        .attr_opt(
            "color",
            vehicle_type
                .color
                .map(|color| format!("{},{},{}", color.r, color.g, color.b)),
        )
        .attr_number("length", vehicle_type.length)
        .attr_number("minGap", vehicle_type.min_gap)
        .attr_number("maxSpeed", vehicle_type.max_speed)
        .attr_number("accel", vehicle_type.accel)
        .attr_number("decel", vehicle_type.decel)
        .attr_opt_number("emergencyDecel", vehicle_type.emergency_decel)
        .attr_opt_number("sigma", vehicle_type.sigma)
        .attr_opt_number("tau", vehicle_type.tau)
        .attr_opt_number("speedFactor", vehicle_type.speed_factor)
        .attr_opt_number("speedDev", vehicle_type.speed_dev)
        .attr_opt(
            "carFollowModel",
            vehicle_type.car_follow_model.map(|model| model.as_str()),
        )
        .attr("laneChangeModel", lane_change_model.as_str())
        .attr_opt_number("lcStrategic", params.strategic)
        .attr_opt_number("lcCooperative", params.cooperative)
        .attr_opt_number("lcKeepRight", params.keep_right)
        .attr_opt_number("lcSpeedGain", params.speed_gain)
}

fn flow_element(flow: &Flow) -> XmlElement {
    let mut element = XmlElement::new("flow")
        .attr("id", &flow.id)
        .attr("type", &flow.vehicle_type);

    if let FlowPath::Route(route) = &flow.path {
        element = element.attr("route", route);
    }

    element = element
        .attr_number("begin", flow.begin)
        .attr_number("end", flow.end);

    element = match flow.rate {
        FlowRate::VehsPerHour(rate) => element.attr_number("vehsPerHour", rate),
        FlowRate::Period(period) => element.attr_number("period", period),
        FlowRate::Probability(probability) => element.attr_number("probability", probability),
        FlowRate::Number(number) => element.attr("number", number),
    };

    match &flow.path {
        FlowPath::Edges(edges) => {
            element.child(XmlElement::new("route").attr("edges", format_edge_list(edges)))
        }
        FlowPath::Route(_) => element,
    }
}

fn trip_element(trip: &Trip) -> XmlElement {
    let element = XmlElement::new("trip")
        .attr("id", &trip.id)
        .attr("type", &trip.vehicle_type)
        .attr_number("depart", trip.depart);

    match &trip.endpoints {
        TripEndpoints::Edges { from, to } => element.attr("from", from).attr("to", to),
        TripEndpoints::Junctions { from, to } => element
            .attr("fromJunction", from)
            .attr("toJunction", to),
    }
}

pub fn generate_demand(snapshot: &Snapshot) -> Artifact {
    let kind = ArtifactKind::Demand;
    let default_lane_change = snapshot.settings.lane_change_model;
    let mut root = XmlElement::schema_root("routes", kind.schema());

    for vehicle_type in snapshot.vehicle_types.list() {
        root.push(vehicle_type_element(vehicle_type, default_lane_change));
    }
    for route in snapshot.routes.list() {
        root.push(
            XmlElement::new("route")
                .attr("id", &route.id)
                .attr("edges", format_edge_list(&route.edges)),
        );
    }
    for flow in snapshot.flows.list() {
        root.push(flow_element(flow));
    }
    for trip in snapshot.trips.list() {
        root.push(trip_element(trip));
    }

    Artifact::new(kind, root.to_document())
}
