/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::path::PathBuf;
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::structs::{ElevatorId, Floor};

/***************************************/
/*            Error types              */
/***************************************/

/// Invalid or unreadable configuration. Fatal for whatever was being constructed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max capacity must be greater than zero")]
    ZeroCapacity,
    #[error("movement delay must be greater than zero milliseconds")]
    ZeroMovementDelay,
    #[error("at least one elevator must be configured")]
    NoElevators,
    #[error("failed to read configuration file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// The control loop was told to stop while suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cancelled")]
pub struct Cancelled;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Elevator #{0} not found")]
    UnknownElevator(ElevatorId),
    #[error("Elevator #{0} has already been started")]
    AlreadyStarted(ElevatorId),
    #[error("Elevator #{0} is offline")]
    Offline(ElevatorId),
    #[error("Elevator #{0} is running and cannot be driven directly")]
    Running(ElevatorId),
    #[error("failed to spawn control loop for elevator #{id}: {source}")]
    Spawn {
        id: ElevatorId,
        #[source]
        source: std::io::Error,
    },
    #[error("move of elevator #{0} was cancelled")]
    Cancelled(ElevatorId),
}

/// Rejections from the request builder, before anything reaches an elevator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("departure and destination are both {0}")]
    SameFloor(Floor),
    #[error("a request needs at least one passenger")]
    NoPassengers,
}
