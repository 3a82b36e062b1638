//! Playback actions from the video controls

use wasm_bindgen::prelude::*;

use super::session::with_simulation;

/// Play / pause; detections are only requested while playing
#[wasm_bindgen]
pub fn set_playing(playing: bool) {
    with_simulation(|sim| sim.set_playing(playing));
}

/// Restart from the beginning: clear joint tracking and the last pose
#[wasm_bindgen]
pub fn restart() {
    with_simulation(|sim| sim.reset());
}

/// Seek: the previous pose no longer matches the frame on screen
#[wasm_bindgen]
pub fn seek() {
    with_simulation(|sim| sim.reset());
}
