//! Pose hand-off from the JS detection loop, and the per-frame tick
//!
//! JS asks for a ticket with `request_detection`, runs the pose model
//! asynchronously, then returns the keypoints with `submit_pose`.

use wasm_bindgen::prelude::*;

use super::session::with_simulation;
use crate::physics::{Pose, JOINT_COUNT};
use crate::renderer::with_metrics;

/// Ask whether a detection should start at this video time (ms)
///
/// Returns the request ticket, or undefined while paused / throttled.
#[wasm_bindgen]
pub fn request_detection(video_time_ms: f64) -> Option<u64> {
    with_simulation(|sim| sim.request_detection(video_time_ms))
}

/// Called from JavaScript with the result of detection `ticket`
///
/// `data` is a flat Float32Array of `x, y, z, score` per joint (up to 33
/// joints); an empty array means nobody was detected. A negative or
/// non-finite timestamp lets the filters use their nominal rate.
/// Returns false when the result was superseded and dropped.
#[wasm_bindgen]
pub fn submit_pose(ticket: u64, data: &[f32], timestamp_ms: f64) -> bool {
    let Some(pose) = Pose::from_flat(data) else {
        log::warn!(
            "Invalid pose data length: {} (expected a multiple of 4, at most {})",
            data.len(),
            JOINT_COUNT * 4
        );
        return false;
    };
    let pose = (!pose.is_empty()).then_some(pose);
    let timestamp = (timestamp_ms.is_finite() && timestamp_ms >= 0.0).then(|| timestamp_ms / 1000.0);

    let applied = with_simulation(|sim| sim.submit_detection(ticket, pose, timestamp));
    if !applied {
        with_metrics(|m| m.record_stale_detection());
    }
    applied
}

/// Advance one frame; `elapsed_ms` is the time since the previous frame
#[wasm_bindgen]
pub fn tick(elapsed_ms: f32) {
    let start = now_ms();
    let stats = with_simulation(|sim| sim.tick(elapsed_ms.max(0.0) / 1000.0));
    let spent = (now_ms() - start) as f32;
    with_metrics(|m| m.record_tick(stats, spent));
}

/// Number of joints currently drawn
#[wasm_bindgen]
pub fn visible_joint_count() -> usize {
    with_simulation(|sim| sim.stabilizer().visible_count())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = now)]
    fn performance_now() -> f64;
}

#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    performance_now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    0.0
}
