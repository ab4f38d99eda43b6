//! Native consumer-facing bridge.
//!
//! Spawns the worker loop on a dedicated thread: a single-consumer channel
//! read in a loop, one event handled to completion before the next is
//! dequeued. Outputs flow back over a second channel. Transfer buffers move
//! through both channels by value, so ownership is exchanged, never shared.
//!
//! Termination is abrupt: dropping the handle closes the event channel, the
//! loop ends and in-flight state is discarded.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::protocol::{StepParams, WorkerEvent, WorkerOutput};
use crate::worker::WorkerCore;

pub struct PhysicsWorker {
    events: Option<Sender<WorkerEvent>>,
    outputs: Receiver<WorkerOutput>,
    join: Option<JoinHandle<()>>,
}

impl PhysicsWorker {
    /// Spawn the worker thread. The worker stays in its buffering state until
    /// an `init` event arrives.
    pub fn spawn() -> std::io::Result<Self> {
        let (event_tx, event_rx) = unbounded::<WorkerEvent>();
        let (output_tx, output_rx) = unbounded::<WorkerOutput>();

        let join = thread::Builder::new()
            .name("dynamo-physics".into())
            .spawn(move || {
                let mut core = WorkerCore::new();
                for event in event_rx.iter() {
                    for output in core.handle_event(event) {
                        if output_tx.send(output).is_err() {
                            return;
                        }
                    }
                }
            })?;

        Ok(Self { events: Some(event_tx), outputs: output_rx, join: Some(join) })
    }

    /// Post one event. Returns `false` when the worker is gone.
    pub fn post(&self, event: WorkerEvent) -> bool {
        match &self.events {
            Some(events) => events.send(event).is_ok(),
            None => false,
        }
    }

    /// Post a step, handing the transfer buffers over to the worker. The
    /// buffers come back inside the next frame message; allocate fresh ones
    /// for the next call, do not reuse.
    pub fn post_step(&self, time_elapsed: f32, positions: Vec<f32>, quaternions: Vec<f32>) -> bool {
        self.post(WorkerEvent::Step {
            params: StepParams { time_elapsed, positions, quaternions },
        })
    }

    /// Block until the next output message, `None` once the worker is gone.
    pub fn recv(&self) -> Option<WorkerOutput> {
        self.outputs.recv().ok()
    }

    /// Channel of outbound messages, for consumers that integrate into their
    /// own select loop.
    pub fn outputs(&self) -> &Receiver<WorkerOutput> {
        &self.outputs
    }
}

impl Drop for PhysicsWorker {
    fn drop(&mut self) {
        // Close the channel first, then reap the thread.
        self.events.take();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}
