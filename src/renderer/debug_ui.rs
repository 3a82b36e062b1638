//! Performance metrics for the debug overlay
//!
//! Tracks FPS, detection latency and per-tick simulation counts.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use crate::simulation::TickStats;

/// Weight of the newest sample in the moving averages
const SMOOTHING: f32 = 0.1;

/// Performance metrics storage
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metrics {
    fps: f32,
    frame_time_ms: f32,
    detection_latency_ms: f32,
    simulation_time_ms: f32,
    visible_joints: usize,
    pushed_particles: usize,
    stale_detections: u32,
}

impl Metrics {
    /// Record frame timing; implausible frame times are ignored
    /// (tab backgrounded or first frame)
    pub fn record_frame(&mut self, fps: f32, frame_time_ms: f32) {
        if !(1.0..=200.0).contains(&frame_time_ms) {
            return;
        }
        self.fps = ema(self.fps, fps);
        self.frame_time_ms = ema(self.frame_time_ms, frame_time_ms);
    }

    pub fn record_detection_latency(&mut self, ms: f32) {
        self.detection_latency_ms = ema(self.detection_latency_ms, ms);
    }

    pub fn record_tick(&mut self, stats: TickStats, simulation_time_ms: f32) {
        self.visible_joints = stats.visible_joints;
        self.pushed_particles = stats.pushed_particles;
        self.simulation_time_ms = ema(self.simulation_time_ms, simulation_time_ms);
    }

    pub fn record_stale_detection(&mut self) {
        self.stale_detections += 1;
    }

    pub fn overlay_text(&self) -> String {
        format!(
            "FPS: {:.0} | Frame: {:.1}ms\n\
             Detection: {:.0}ms | Stale: {}\n\
             Simulation: {:.1}ms\n\
             Joints: {} | Pushed: {}",
            self.fps,
            self.frame_time_ms,
            self.detection_latency_ms,
            self.stale_detections,
            self.simulation_time_ms,
            self.visible_joints,
            self.pushed_particles,
        )
    }
}

fn ema(current: f32, sample: f32) -> f32 {
    current * (1.0 - SMOOTHING) + sample * SMOOTHING
}

thread_local! {
    static METRICS: RefCell<Metrics> = RefCell::new(Metrics::default());
}

/// Run `f` against the shared metrics
pub(crate) fn with_metrics<R>(f: impl FnOnce(&mut Metrics) -> R) -> R {
    METRICS.with(|m| f(&mut m.borrow_mut()))
}

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Set frame timing (called from JS each frame)
#[wasm_bindgen]
pub fn set_frame_metrics(fps: f32, frame_time_ms: f32) {
    with_metrics(|m| m.record_frame(fps, frame_time_ms));
}

/// Set pose detection latency
#[wasm_bindgen]
pub fn set_detection_latency(ms: f32) {
    with_metrics(|m| m.record_detection_latency(ms));
}

/// Get formatted overlay text (called from JS to update HTML)
#[wasm_bindgen]
pub fn get_debug_overlay_text() -> String {
    with_metrics(|m| m.overlay_text())
}
