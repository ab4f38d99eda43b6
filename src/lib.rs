//! Dynamo Physics - worker-thread rigid body simulation bridge
//!
//! The renderer never talks to the physics library directly: it posts typed
//! events into a worker and reads back per-frame transform buffers. This
//! crate is that worker.
//!
//! Architecture:
//! - core/      - Shared utilities (bounds-check macros for the hot path)
//! - protocol/  - Wire protocol: inbound events, outbound frames
//! - physics/   - rapier3d world ownership, shapes, joints, springs, vehicles
//! - worker/    - Dispatcher state machine, handlers, step loop
//! - bridge     - Native thread + channel bridge (non-wasm targets)
//! - facade     - wasm-bindgen surface for the JS worker shell (wasm32)

#[macro_use]
pub mod core;
pub mod error;
pub mod physics;
pub mod protocol;
pub mod worker;

#[cfg(not(target_arch = "wasm32"))]
pub mod bridge;

#[cfg(target_arch = "wasm32")]
pub mod facade;

pub use error::WorkerError;
pub use protocol::{WorkerEvent, WorkerOutput};
pub use worker::WorkerCore;

#[cfg(not(target_arch = "wasm32"))]
pub use bridge::PhysicsWorker;

#[cfg(target_arch = "wasm32")]
pub use facade::PhysicsWorkerFacade;
