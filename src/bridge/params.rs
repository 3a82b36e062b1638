//! Parameter surface for the control panel

use wasm_bindgen::prelude::*;

use super::session::{with_simulation, BridgeError};
use crate::config::{self, ConfigChange, SimulationConfig};

/// Parameter table (name, min, max, step, kind, effect) as JSON
#[wasm_bindgen]
pub fn parameter_specs_json() -> String {
    config::parameters_json()
}

/// Current configuration as JSON
#[wasm_bindgen]
pub fn config_json() -> Result<String, JsValue> {
    with_simulation(|sim| serde_json::to_string(sim.config()))
        .map_err(|e| BridgeError::from(e).into())
}

/// Replace the configuration from (partial) JSON; missing fields use defaults
#[wasm_bindgen]
pub fn configure(json: &str) -> Result<(), JsValue> {
    let config: SimulationConfig = serde_json::from_str(json).map_err(BridgeError::from)?;
    with_simulation(|sim| sim.set_config(config)).map_err(BridgeError::from)?;
    Ok(())
}

/// Commit one numeric change; returns true when particles were regenerated
#[wasm_bindgen]
pub fn set_parameter(name: &str, value: f64) -> Result<bool, JsValue> {
    let change = with_simulation(|sim| sim.apply_change(name, value)).map_err(BridgeError::from)?;
    Ok(change == ConfigChange::Regenerate)
}

/// Commit one color change (`#rrggbb`); always regenerates
#[wasm_bindgen]
pub fn set_color(name: &str, hex: &str) -> Result<bool, JsValue> {
    let change = with_simulation(|sim| sim.apply_color(name, hex)).map_err(BridgeError::from)?;
    Ok(change == ConfigChange::Regenerate)
}

/// Current value of a numeric parameter (undefined if unknown)
#[wasm_bindgen]
pub fn get_parameter(name: &str) -> Option<f64> {
    with_simulation(|sim| sim.config().get(name))
}
