//! Error types for the flag search

use thiserror::Error;

/// Flag search error type
#[derive(Error, Debug)]
pub enum SearchError {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required input was never supplied
    #[error("Missing search input: {0}")]
    MissingInput(&'static str),

    /// Zone corners are out of order, non-finite or too far apart
    #[error("Malformed zone: {0}")]
    MalformedZone(String),

    /// Every ring waypoint lies outside the navigable bounds
    #[error("No reachable waypoint around the search zone")]
    Unreachable,

    /// The reachable waypoints split into more than one arc
    #[error("Reachable waypoints form {0} disjoint arcs")]
    DisjointArcs(usize),

    /// Planner bookkeeping went inconsistent
    #[error("Internal planner error: {0}")]
    Internal(String),

    /// Motion or sensing failed
    #[error("Hardware error: {0}")]
    Hardware(String),

    /// Reading a config file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A config document did not parse
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SearchError>;
