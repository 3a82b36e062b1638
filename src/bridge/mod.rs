//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod session;
mod pose;
mod params;
mod playback;
mod buffers;

pub use session::BridgeError;

pub use pose::{
    request_detection,
    submit_pose,
    tick,
    visible_joint_count,
};

pub use params::{
    parameter_specs_json,
    config_json,
    configure,
    set_parameter,
    set_color,
    get_parameter,
};

pub use playback::{set_playing, restart, seek};

pub use buffers::{
    joint_positions,
    joint_visibility,
    bone_positions,
    bone_visibility,
    particle_positions,
    particle_colors,
    particle_vertices,
    particle_count,
    particle_size,
    take_particles_dirty,
};
