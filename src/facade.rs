//! wasm-bindgen facade for running the worker inside a Web Worker.
//!
//! The JS worker shell forwards `onmessage` payloads here. Non-step events
//! travel as JSON strings; step buffers cross as `Float32Array`s so the shell
//! can post the frame back with a transfer list. Outbound messages queue up
//! as JSON and are drained with [`PhysicsWorkerFacade::poll_output`].

use std::collections::VecDeque;

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

use crate::protocol::{StepParams, WorkerEvent, WorkerOutput};
use crate::worker::WorkerCore;

#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the wasm module.
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    web_sys::console::log_1(&"dynamo-physics worker initialized".into());
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[wasm_bindgen]
pub struct PhysicsWorkerFacade {
    core: WorkerCore,
    outbox: VecDeque<String>,
    frame_positions: Vec<f32>,
    frame_quaternions: Vec<f32>,
}

#[wasm_bindgen]
impl PhysicsWorkerFacade {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            core: WorkerCore::new(),
            outbox: VecDeque::new(),
            frame_positions: Vec::new(),
            frame_quaternions: Vec::new(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn initialized(&self) -> bool {
        self.core.initialized()
    }

    /// Handle one JSON-encoded event (anything except `step`).
    #[wasm_bindgen(js_name = handleMessageJson)]
    pub fn handle_message_json(&mut self, json: &str) -> Result<(), JsValue> {
        let event: WorkerEvent =
            serde_json::from_str(json).map_err(|err| JsValue::from_str(&err.to_string()))?;
        let outputs = self.core.handle_event(event);
        self.enqueue(outputs);
        Ok(())
    }

    /// Run a step with the buffers handed over by the shell. The resulting
    /// frame buffers are retrieved with `framePositions`/`frameQuaternions`
    /// and the remaining frame fields with `pollOutput`.
    pub fn step(&mut self, time_elapsed: f32, positions: Float32Array, quaternions: Float32Array) {
        let event = WorkerEvent::Step {
            params: StepParams {
                time_elapsed,
                positions: positions.to_vec(),
                quaternions: quaternions.to_vec(),
            },
        };
        let outputs = self.core.handle_event(event);
        self.enqueue(outputs);
    }

    /// Latest frame's position buffer as a `Float32Array` view copy.
    #[wasm_bindgen(js_name = framePositions)]
    pub fn frame_positions(&self) -> Float32Array {
        Float32Array::from(self.frame_positions.as_slice())
    }

    #[wasm_bindgen(js_name = frameQuaternions)]
    pub fn frame_quaternions(&self) -> Float32Array {
        Float32Array::from(self.frame_quaternions.as_slice())
    }

    /// Drain one queued outbound message as JSON, `None` when empty.
    #[wasm_bindgen(js_name = pollOutput)]
    pub fn poll_output(&mut self) -> Option<String> {
        self.outbox.pop_front()
    }

    fn enqueue(&mut self, outputs: Vec<WorkerOutput>) {
        for output in outputs {
            if let WorkerOutput::Frame { positions, quaternions, .. } = &output {
                self.frame_positions = positions.clone();
                self.frame_quaternions = quaternions.clone();
            }
            match serde_json::to_string(&output) {
                Ok(json) => self.outbox.push_back(json),
                Err(err) => web_sys::console::error_1(&err.to_string().into()),
            }
        }
    }
}

impl Default for PhysicsWorkerFacade {
    fn default() -> Self {
        Self::new()
    }
}
