//! Paced frame streaming for interactive simulation runs.
//!
//! Each run gets its own worker thread owning the engine. Frames cross the
//! worker boundary as owned messages over a bounded channel; the worker
//! suspends only when the channel is full or while pacing between steps.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, bounded};
use log::debug;

use super::engine::{Simulation, SimulationFrame};

/// Minimum inter-step delay regardless of the requested speed.
const MIN_STEP_DELAY: Duration = Duration::from_millis(16);

/// Frames buffered before the worker blocks on its collaborator.
const FRAME_BUFFER: usize = 32;

/// Handle to a running simulation worker.
///
/// Frames arrive on [`SimulationRunner::frames`] in strictly increasing
/// generation order. The stream disconnects when the simulation terminates
/// or the worker is stopped.
pub struct SimulationRunner {
    frames: Receiver<SimulationFrame>,
    paused: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
    handle: Option<JoinHandle<Simulation>>,
}

impl SimulationRunner {
    /// Spawn a worker stepping `sim` at most `speed` generations per second.
    pub fn spawn(mut sim: Simulation, speed: u32) -> Self {
        let speed = speed.max(1);
        let delay = MIN_STEP_DELAY.max(Duration::from_millis(1000 / u64::from(speed)));
        let (sender, frames) = bounded(FRAME_BUFFER);
        let paused = Arc::new(AtomicBool::new(false));
        let stopped = Arc::new(AtomicBool::new(false));

        let worker_paused = Arc::clone(&paused);
        let worker_stopped = Arc::clone(&stopped);
        let handle = thread::spawn(move || {
            while !worker_stopped.load(Ordering::Relaxed) {
                if worker_paused.load(Ordering::Relaxed) {
                    thread::sleep(MIN_STEP_DELAY);
                    continue;
                }

                let frame = sim.step();
                let terminated = frame.stats.terminated;
                if sender.send(frame).is_err() {
                    // Collaborator dropped the stream.
                    break;
                }
                if terminated {
                    debug!("simulation terminated at generation {}", sim.stats().generation);
                    break;
                }

                thread::sleep(delay);
            }
            sim
        });

        Self {
            frames,
            paused,
            stopped,
            handle: Some(handle),
        }
    }

    /// The frame stream.
    pub fn frames(&self) -> &Receiver<SimulationFrame> {
        &self.frames
    }

    /// Halt stepping without destroying state.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    /// Resume stepping after a pause.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    /// Whether the worker is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// Stop the worker and reclaim the engine with its state intact.
    pub fn stop(mut self) -> Simulation {
        self.stopped.store(true, Ordering::Relaxed);
        // Unblock a worker waiting on a full channel.
        while self.frames.try_recv().is_ok() {}
        let handle = self.handle.take().expect("runner already stopped");
        handle.join().expect("simulation worker panicked")
    }

    /// Stop the worker and discard the simulation state.
    pub fn terminate(self) {
        let _ = self.stop();
    }
}

impl Drop for SimulationRunner {
    fn drop(&mut self) {
        self.stopped.store(true, Ordering::Relaxed);
    }
}
