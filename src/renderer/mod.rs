//! Renderer module - buffers and overlay data for the external 3D renderer
//!
//! Re-exports only. All logic in submodules.

mod vertices;
mod buffers;
mod debug_ui;

pub use vertices::{PointVertex, LineVertex, flatten};
pub use buffers::{joint_buffers, bone_buffers, particle_positions, particle_colors, particle_vertices};
pub use debug_ui::{Metrics, set_frame_metrics, set_detection_latency, get_debug_overlay_text};
pub(crate) use debug_ui::with_metrics;
