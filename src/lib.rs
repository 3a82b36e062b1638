//! Pose Particles - particle field driven by a tracked human skeleton
//!
//! Entry point for WASM module. Only contains:
//! - Module declarations
//! - wasm_bindgen entry points that delegate to submodules
//!
//! Keypoint stabilization, skeleton assembly and the force-field simulation
//! are plain Rust in `physics` / `simulation`; JS talks to them via `bridge`.

pub mod config;
pub mod detection;
pub mod logging;
pub mod physics;
pub mod renderer;
pub mod simulation;

mod bridge;

use wasm_bindgen::prelude::*;

// Re-export wasm_bindgen functions for JS access
pub use bridge::*;

pub use config::{ConfigError, SimulationConfig};
pub use simulation::{Simulation, TickStats};

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when WASM module loads
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

/// Set console log verbosity ("error", "warn", "info", "debug", "trace", "off")
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    logging::init(logging::parse_level(level));
}

/// Initialize the simulation from (partial) JSON config; "" keeps defaults
#[wasm_bindgen]
pub fn init(config_json: &str) -> Result<(), JsValue> {
    if !config_json.trim().is_empty() {
        bridge::configure(config_json)?;
    }
    log::info!("✅ Pose particles initialized ({} particles)", bridge::particle_count());
    Ok(())
}
