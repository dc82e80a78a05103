//! SUMO Scenario Builder Library
//!
//! Holds a traffic-simulation scenario, checks its cross-references and
//! renders it into the SUMO file set plus the network build command.

pub mod codegen;
pub mod export;
pub mod scenario;
