//! Render buffer export
//!
//! Each call copies into a fresh Float32Array / Uint8Array on the JS side.

use wasm_bindgen::prelude::*;

use super::session::with_simulation;
use crate::renderer;

/// 33 × xyz stabilized joint positions
#[wasm_bindgen]
pub fn joint_positions() -> Vec<f32> {
    with_simulation(|sim| renderer::joint_buffers(sim.joints()).0)
}

/// 33 × 0/1 visibility flags
#[wasm_bindgen]
pub fn joint_visibility() -> Vec<u8> {
    with_simulation(|sim| renderer::joint_buffers(sim.joints()).1)
}

/// 12 bones × 2 endpoints × xyz; hidden bones sit at the origin
#[wasm_bindgen]
pub fn bone_positions() -> Vec<f32> {
    with_simulation(|sim| renderer::bone_buffers(&sim.bones()).0)
}

/// 12 × 0/1 bone visibility flags
#[wasm_bindgen]
pub fn bone_visibility() -> Vec<u8> {
    with_simulation(|sim| renderer::bone_buffers(&sim.bones()).1)
}

/// n × xyz live particle positions
#[wasm_bindgen]
pub fn particle_positions() -> Vec<f32> {
    with_simulation(|sim| renderer::particle_positions(sim.field()))
}

/// n × rgb particle colors
#[wasm_bindgen]
pub fn particle_colors() -> Vec<f32> {
    with_simulation(|sim| renderer::particle_colors(sim.field()))
}

/// n × (xyz, rgb) interleaved
#[wasm_bindgen]
pub fn particle_vertices() -> Vec<f32> {
    with_simulation(|sim| renderer::particle_vertices(sim.field()))
}

#[wasm_bindgen]
pub fn particle_count() -> usize {
    with_simulation(|sim| sim.field().len())
}

#[wasm_bindgen]
pub fn particle_size() -> f32 {
    with_simulation(|sim| sim.config().particle_size)
}

/// True once after the particle buffer changed (re-upload needed)
#[wasm_bindgen]
pub fn take_particles_dirty() -> bool {
    with_simulation(|sim| sim.field_mut().take_dirty())
}
