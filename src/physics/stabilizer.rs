//! Keypoint stabilizer - confidence gate + hold window per joint
//!
//! Each joint runs a small state machine:
//! - Good: confident detection, filters fed, position updated
//! - Held: recent good detection, last position kept visible
//! - Lost: hidden until the next confident detection

use nalgebra::Vector3;

use super::one_euro::{FilterParams, OneEuroFilter3D};
use super::skeleton::JOINT_COUNT;

/// A single keypoint from the pose provider (provider coordinates)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawKeypoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Detection confidence (0-1)
    pub score: f32,
}

impl RawKeypoint {
    pub fn new(x: f32, y: f32, z: f32, score: f32) -> Self {
        Self { x, y, z, score }
    }

    /// Position in renderer convention: vertical and depth axes negated
    pub fn to_render_space(self) -> Vector3<f32> {
        Vector3::new(self.x, -self.y, -self.z)
    }
}

/// One detection result: up to 33 keypoints, indexed by joint
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pose {
    keypoints: Vec<RawKeypoint>,
}

impl Pose {
    pub fn new(mut keypoints: Vec<RawKeypoint>) -> Self {
        keypoints.truncate(JOINT_COUNT);
        Self { keypoints }
    }

    /// Build from a flat `[x, y, z, score, ...]` array
    ///
    /// Returns None when the length is not a multiple of 4 or holds more
    /// than 33 joints. An empty slice is a pose with no keypoints.
    pub fn from_flat(data: &[f32]) -> Option<Self> {
        if data.len() % 4 != 0 || data.len() / 4 > JOINT_COUNT {
            return None;
        }
        let keypoints = data
            .chunks_exact(4)
            .map(|c| RawKeypoint::new(c[0], c[1], c[2], c[3]))
            .collect();
        Some(Self { keypoints })
    }

    pub fn get(&self, index: usize) -> Option<RawKeypoint> {
        self.keypoints.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

/// Tracking state of one joint after the latest update
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrackingState {
    Good,
    Held,
    #[default]
    Lost,
}

/// Gate and hold settings for the stabilizer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StabilizerParams {
    /// Minimum score to accept a keypoint
    pub confidence_threshold: f32,
    /// Consecutive bad frames a joint stays visible after a good one
    pub max_hold_frames: u32,
    pub filter: FilterParams,
}

impl Default for StabilizerParams {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            max_hold_frames: 5,
            filter: FilterParams::default(),
        }
    }
}

/// Per-joint stabilized state
#[derive(Clone, Debug)]
pub struct KeypointState {
    filters: OneEuroFilter3D,
    last_filtered_position: Vector3<f32>,
    frames_since_last_good_detection: u32,
    had_recent_good_detection: bool,
    is_visible_for_render: bool,
    tracking: TrackingState,
}

impl KeypointState {
    pub fn new(filter: FilterParams) -> Self {
        Self {
            filters: OneEuroFilter3D::new(filter),
            last_filtered_position: Vector3::zeros(),
            frames_since_last_good_detection: 0,
            had_recent_good_detection: false,
            is_visible_for_render: false,
            tracking: TrackingState::Lost,
        }
    }

    /// Run one tick of the gate / hold state machine
    fn update(&mut self, keypoint: Option<RawKeypoint>, timestamp: f64, params: &StabilizerParams) {
        match keypoint {
            Some(kp) if kp.score >= params.confidence_threshold => {
                self.last_filtered_position = self.filters.filter(kp.to_render_space(), timestamp);
                self.frames_since_last_good_detection = 0;
                self.had_recent_good_detection = true;
                self.is_visible_for_render = true;
                self.tracking = TrackingState::Good;
            }
            _ => {
                self.frames_since_last_good_detection =
                    self.frames_since_last_good_detection.saturating_add(1);

                if self.had_recent_good_detection
                    && self.frames_since_last_good_detection <= params.max_hold_frames
                {
                    self.is_visible_for_render = true;
                    self.tracking = TrackingState::Held;
                } else {
                    self.is_visible_for_render = false;
                    self.had_recent_good_detection = false;
                    self.tracking = TrackingState::Lost;
                }
            }
        }
    }

    fn reset(&mut self) {
        self.filters.reset();
        self.last_filtered_position = Vector3::zeros();
        self.frames_since_last_good_detection = 0;
        self.had_recent_good_detection = false;
        self.is_visible_for_render = false;
        self.tracking = TrackingState::Lost;
    }

    pub fn last_filtered_position(&self) -> Vector3<f32> {
        self.last_filtered_position
    }

    pub fn is_visible_for_render(&self) -> bool {
        self.is_visible_for_render
    }

    pub fn frames_since_last_good_detection(&self) -> u32 {
        self.frames_since_last_good_detection
    }

    pub fn had_recent_good_detection(&self) -> bool {
        self.had_recent_good_detection
    }

    pub fn tracking(&self) -> TrackingState {
        self.tracking
    }
}

impl Default for KeypointState {
    fn default() -> Self {
        Self::new(FilterParams::default())
    }
}

/// Stabilizer for the full 33-joint skeleton
pub struct KeypointStabilizer {
    joints: Vec<KeypointState>,
    params: StabilizerParams,
}

impl KeypointStabilizer {
    pub fn new(params: StabilizerParams) -> Self {
        Self {
            joints: (0..JOINT_COUNT).map(|_| KeypointState::new(params.filter)).collect(),
            params,
        }
    }

    /// Update one joint. Out-of-range indices are ignored.
    pub fn update(&mut self, joint_index: usize, keypoint: Option<RawKeypoint>, timestamp: f64) {
        let params = self.params;
        match self.joints.get_mut(joint_index) {
            Some(joint) => joint.update(keypoint, timestamp, &params),
            None => log::warn!("Ignoring keypoint for joint {} (expected < {})", joint_index, JOINT_COUNT),
        }
    }

    /// Update every joint from one detection; None means nobody detected
    pub fn update_all(&mut self, pose: Option<&Pose>, timestamp: f64) {
        for index in 0..JOINT_COUNT {
            let keypoint = pose.and_then(|p| p.get(index));
            self.update(index, keypoint, timestamp);
        }
    }

    /// Clear every joint (playback restart)
    pub fn reset(&mut self) {
        for joint in self.joints.iter_mut() {
            joint.reset();
        }
    }

    /// Retune gate, hold window and filters; filter state is kept
    pub fn set_params(&mut self, params: StabilizerParams) {
        if params.filter != self.params.filter {
            for joint in self.joints.iter_mut() {
                joint.filters.set_params(params.filter);
            }
        }
        self.params = params;
    }

    pub fn params(&self) -> StabilizerParams {
        self.params
    }

    pub fn joints(&self) -> &[KeypointState] {
        &self.joints
    }

    pub fn joint(&self, index: usize) -> Option<&KeypointState> {
        self.joints.get(index)
    }

    pub fn is_visible_for_render(&self, index: usize) -> bool {
        self.joints.get(index).is_some_and(KeypointState::is_visible_for_render)
    }

    pub fn last_filtered_position(&self, index: usize) -> Option<Vector3<f32>> {
        self.joints.get(index).map(KeypointState::last_filtered_position)
    }

    pub fn visible_count(&self) -> usize {
        self.joints.iter().filter(|j| j.is_visible_for_render).count()
    }
}

impl Default for KeypointStabilizer {
    fn default() -> Self {
        Self::new(StabilizerParams::default())
    }
}
