//! WebAssembly bindings for Lattice Life.
//!
//! Provides thin wrappers around `Simulation` and `SearchEngine` for browser
//! environments. The JavaScript side owns pacing: it drives `step` at its
//! chosen rate and forwards the returned frames to rendering and audio.

use wasm_bindgen::prelude::*;

use crate::compute::Simulation;
use crate::compute::evolution::SearchEngine;
use crate::schema::{SearchConfig, SearchOptions, SimulationConfig, StopReason};

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages in browser
    console_error_panic_hook::set_once();

    // Initialize WASM logger
    wasm_logger::init(wasm_logger::Config::default());
}

/// WebAssembly wrapper for a lattice simulation.
#[wasm_bindgen]
pub struct WasmSimulation {
    sim: Simulation,
}

#[wasm_bindgen]
impl WasmSimulation {
    /// Create a new simulation from JSON configuration and an optional seed
    /// buffer (one byte per cell, non-zero meaning live, truncated to the
    /// cell count).
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, seed: Option<Vec<u8>>) -> Result<WasmSimulation, JsValue> {
        let config: SimulationConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config JSON: {e}")))?;

        let mut sim = Simulation::new(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {e}")))?;

        if let Some(seed) = seed {
            sim.apply_seed(&seed);
        }

        Ok(WasmSimulation { sim })
    }

    /// Perform one simulation step and return the resulting frame.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<JsValue, JsValue> {
        let frame = self.sim.step();
        serde_wasm_bindgen::to_value(&frame)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Current frame without stepping.
    #[wasm_bindgen(js_name = currentFrame)]
    pub fn current_frame(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.sim.frame())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Flip the live bit at `(x, y)` without stepping.
    #[wasm_bindgen]
    pub fn toggle(&mut self, x: usize, y: usize) -> Result<(), JsValue> {
        let config = self.sim.config();
        if x >= config.width || y >= config.height {
            return Err(JsValue::from_str(&format!(
                "Toggle out of range: ({x},{y}) on {}x{}",
                config.width, config.height
            )));
        }
        self.sim.toggle(x, y);
        Ok(())
    }

    /// Refill the grid with density-weighted random cells and reset tracking.
    #[wasm_bindgen]
    pub fn randomize(&mut self, density: f32, seed: u64) {
        self.sim.randomize(density, seed);
    }

    /// Replace the grid contents and reset tracking.
    #[wasm_bindgen]
    pub fn load(&mut self, cells: &[u8]) {
        self.sim.apply_seed(cells);
    }

    /// Measure raw stepping throughput on a scratch copy of this
    /// configuration for `duration_ms`, returning generations per second.
    /// The live simulation state is left untouched.
    #[wasm_bindgen]
    pub fn benchmark(&self, duration_ms: f64) -> Result<f64, JsValue> {
        let mut scratch = Simulation::new(self.sim.config().clone())
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {e}")))?;
        scratch.randomize(0.3, 0x5EED);

        let start = js_sys::Date::now();
        let mut generations = 0u64;
        while js_sys::Date::now() - start < duration_ms {
            // Raw buffer updates; termination freezing would stall the
            // measurement.
            scratch.advance();
            generations += 1;
        }

        let elapsed = (js_sys::Date::now() - start) / 1000.0;
        if elapsed <= 0.0 {
            return Ok(0.0);
        }
        Ok(generations as f64 / elapsed)
    }

    /// Get grid width.
    #[wasm_bindgen(js_name = getWidth)]
    pub fn get_width(&self) -> usize {
        self.sim.config().width
    }

    /// Get grid height.
    #[wasm_bindgen(js_name = getHeight)]
    pub fn get_height(&self) -> usize {
        self.sim.config().height
    }

    /// Get current generation.
    #[wasm_bindgen(js_name = getGeneration)]
    pub fn get_generation(&self) -> u64 {
        self.sim.stats().generation
    }

    /// Whether the simulation has terminated.
    #[wasm_bindgen(js_name = isTerminated)]
    pub fn is_terminated(&self) -> bool {
        self.sim.stats().terminated
    }
}

/// WebAssembly wrapper for the genetic methuselah search.
///
/// JavaScript drives the loop: call `step` once per GA generation (each
/// returns a progress record), then `getResult` once `isComplete` reports
/// true. A cancelled run yields no result.
#[wasm_bindgen]
pub struct WasmSearch {
    engine: SearchEngine,
}

#[wasm_bindgen]
impl WasmSearch {
    /// Create a search from config and options JSON; both are validated.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, options_json: &str) -> Result<WasmSearch, JsValue> {
        let config: SearchConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config JSON: {e}")))?;
        let options: SearchOptions = serde_json::from_str(options_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid options JSON: {e}")))?;

        let engine = SearchEngine::new(config, options)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {e}")))?;

        Ok(WasmSearch { engine })
    }

    /// Run one GA generation and return its progress record.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<JsValue, JsValue> {
        if self.engine.is_complete() {
            return Err(JsValue::from_str("Search already complete"));
        }
        let progress = self.engine.step();
        serde_wasm_bindgen::to_value(&progress)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Whether the run is over, by iteration count or cancellation.
    #[wasm_bindgen(js_name = isComplete)]
    pub fn is_complete(&self) -> bool {
        self.engine.is_complete()
    }

    /// Request cancellation; observed before the next GA generation.
    #[wasm_bindgen]
    pub fn cancel(&self) {
        self.engine
            .cancel_handle()
            .store(true, std::sync::atomic::Ordering::Relaxed);
    }

    /// Final result. Errors if the run is still going or was cancelled; a
    /// cancelled run emits no result.
    #[wasm_bindgen(js_name = getResult)]
    pub fn get_result(&self) -> Result<JsValue, JsValue> {
        if !self.engine.is_complete() {
            return Err(JsValue::from_str("Search still running"));
        }
        let result = self.engine.result();
        if result.stats.stop_reason == StopReason::Cancelled {
            return Err(JsValue::from_str("Search was cancelled"));
        }
        serde_wasm_bindgen::to_value(&result)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// GA generations completed so far.
    #[wasm_bindgen(js_name = getGeneration)]
    pub fn get_generation(&self) -> usize {
        self.engine.generation()
    }
}
