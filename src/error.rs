//! Worker error taxonomy.
//!
//! Every failure here is a precondition violation on the consumer side
//! (referencing an identifier that was never created, or was already
//! removed). The dispatcher logs the error and moves on to the next message;
//! the simulation itself never aborts.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    #[error("unknown body `{0}`")]
    UnknownBody(String),
    #[error("unknown constraint `{0}`")]
    UnknownConstraint(String),
    #[error("unknown spring `{0}`")]
    UnknownSpring(String),
    #[error("unknown vehicle `{0}`")]
    UnknownVehicle(String),
    #[error("unknown ray `{0}`")]
    UnknownRay(String),
    #[error("wheel index {index} out of range for vehicle `{uuid}`")]
    WheelIndexOutOfRange { uuid: String, index: usize },
    #[error("invalid shape: {0}")]
    InvalidShape(String),
}
