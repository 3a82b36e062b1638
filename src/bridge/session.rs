//! Shared simulation instance for the JS bridge

use std::cell::RefCell;

use thiserror::Error;
use wasm_bindgen::prelude::*;

use crate::config::ConfigError;
use crate::simulation::Simulation;

/// Errors surfaced to JavaScript
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid configuration JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl From<BridgeError> for JsValue {
    fn from(err: BridgeError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

// Thread-local storage (WASM is single-threaded)
thread_local! {
    static SIMULATION: RefCell<Simulation> = RefCell::new(Simulation::default());
}

/// Run `f` against the shared simulation
pub(crate) fn with_simulation<R>(f: impl FnOnce(&mut Simulation) -> R) -> R {
    SIMULATION.with(|cell| f(&mut cell.borrow_mut()))
}
