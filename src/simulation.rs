//! Simulation - owns all per-joint and per-particle state
//!
//! Lifecycle: `new` validates the config and generates particles,
//! `ingest_pose` stores the latest detection, `tick` stabilizes joints and
//! advances the particles, `reset` clears tracking on playback restart.

use crate::config::{ConfigChange, ConfigError, SimulationConfig};
use crate::detection::DetectionScheduler;
use crate::physics::{self, BoneSegment, KeypointStabilizer, KeypointState, ParticleField, Pose, BONE_COUNT};

/// Summary of one tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub visible_joints: usize,
    pub pushed_particles: usize,
}

/// Latest detection result handed over by the pose provider
#[derive(Clone, Debug)]
struct Detection {
    /// None = nobody detected
    pose: Option<Pose>,
    /// Seconds
    timestamp: f64,
}

pub struct Simulation {
    config: SimulationConfig,
    stabilizer: KeypointStabilizer,
    field: ParticleField,
    scheduler: DetectionScheduler,
    latest: Option<Detection>,
    /// Timestamp of the last ingested detection (seconds)
    last_timestamp: Option<f64>,
    playing: bool,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        log::info!(
            "Simulation created: {} particles, radius {}",
            config.particle_count,
            config.field_radius
        );
        Ok(Self::build(config))
    }

    fn build(config: SimulationConfig) -> Self {
        Self {
            stabilizer: KeypointStabilizer::new(config.stabilizer_params()),
            field: ParticleField::generate(&config),
            scheduler: DetectionScheduler::new(config.detection_interval_ms, config.discard_stale_detections),
            latest: None,
            last_timestamp: None,
            playing: false,
            config,
        }
    }

    /// Store a detection result; it is consumed from the next tick on
    ///
    /// `pose = None` means nobody was detected. Without a timestamp (seconds)
    /// one is synthesized `1 / filter_frequency` after the previous one.
    pub fn ingest_pose(&mut self, pose: Option<Pose>, timestamp: Option<f64>) {
        let timestamp = match (timestamp, self.last_timestamp) {
            (Some(t), _) => t,
            (None, Some(last)) => last + 1.0 / self.config.filter_frequency as f64,
            (None, None) => 0.0,
        };
        self.last_timestamp = Some(timestamp);
        let pose = pose.filter(|p| !p.is_empty());
        self.latest = Some(Detection { pose, timestamp });
    }

    /// Ask for a detection ticket at `video_time_ms`
    pub fn request_detection(&mut self, video_time_ms: f64) -> Option<u64> {
        self.scheduler.poll(video_time_ms, self.playing)
    }

    /// Hand back the result of request `seq`; returns false if it was stale
    pub fn submit_detection(&mut self, seq: u64, pose: Option<Pose>, timestamp: Option<f64>) -> bool {
        if !self.scheduler.accept(seq) {
            return false;
        }
        self.ingest_pose(pose, timestamp);
        true
    }

    /// Run one frame: stabilize joints from the latest detection, then
    /// advance the particles. `elapsed` is the frame time in seconds.
    pub fn tick(&mut self, elapsed: f32) -> TickStats {
        match &self.latest {
            Some(detection) => self.stabilizer.update_all(detection.pose.as_ref(), detection.timestamp),
            None => self.stabilizer.update_all(None, 0.0),
        }

        let pushed_particles = physics::step(&mut self.field, self.stabilizer.joints(), &self.config, elapsed);

        TickStats {
            visible_joints: self.stabilizer.visible_count(),
            pushed_particles,
        }
    }

    /// Playback restart: clear tracking and forget the last pose
    pub fn reset(&mut self) {
        self.stabilizer.reset();
        self.scheduler.reset();
        self.latest = None;
        self.last_timestamp = None;
        log::info!("Simulation reset");
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Apply one numeric parameter change
    pub fn apply_change(&mut self, name: &str, value: f64) -> Result<ConfigChange, ConfigError> {
        let change = self.config.set(name, value)?;
        self.commit(change);
        Ok(change)
    }

    /// Apply one color parameter change (`#rrggbb`)
    pub fn apply_color(&mut self, name: &str, hex: &str) -> Result<ConfigChange, ConfigError> {
        let change = self.config.set_color(name, hex)?;
        self.commit(change);
        Ok(change)
    }

    /// Replace the whole configuration
    pub fn set_config(&mut self, config: SimulationConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let regenerate = config.particle_count != self.config.particle_count
            || config.field_radius != self.config.field_radius
            || config.randomness != self.config.randomness
            || config.randomness_power != self.config.randomness_power
            || config.inside_color != self.config.inside_color
            || config.outside_color != self.config.outside_color
            || config.seed != self.config.seed;
        self.config = config;
        self.commit(if regenerate {
            ConfigChange::Regenerate
        } else {
            ConfigChange::Immediate
        });
        Ok(())
    }

    fn commit(&mut self, change: ConfigChange) {
        match change {
            ConfigChange::Regenerate => {
                self.field.regenerate(&self.config);
                log::info!("Regenerated {} particles", self.field.len());
            }
            ConfigChange::Immediate => {
                self.stabilizer.set_params(self.config.stabilizer_params());
                self.scheduler.set_interval_ms(self.config.detection_interval_ms);
                self.scheduler.set_discard_stale(self.config.discard_stale_detections);
            }
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn joints(&self) -> &[KeypointState] {
        self.stabilizer.joints()
    }

    pub fn stabilizer(&self) -> &KeypointStabilizer {
        &self.stabilizer
    }

    pub fn bones(&self) -> [BoneSegment; BONE_COUNT] {
        physics::assemble(self.stabilizer.joints())
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut ParticleField {
        &mut self.field
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::build(SimulationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{RawKeypoint, JOINT_COUNT, LEFT_WRIST};

    fn config() -> SimulationConfig {
        SimulationConfig {
            particle_count: 1000,
            max_hold_frames: 2,
            ..SimulationConfig::default()
        }
    }

    fn full_pose(score: f32) -> Pose {
        Pose::new((0..JOINT_COUNT).map(|i| RawKeypoint::new(i as f32 * 0.01, 0.5, 0.0, score)).collect())
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let bad = SimulationConfig {
            particle_count: 5,
            ..SimulationConfig::default()
        };
        assert!(Simulation::new(bad).is_err());
    }

    #[test]
    fn test_latest_pose_is_reused_until_replaced() {
        let mut sim = Simulation::new(config()).unwrap();
        sim.ingest_pose(Some(full_pose(0.9)), Some(0.0));
        for _ in 0..5 {
            assert_eq!(sim.tick(1.0 / 60.0).visible_joints, JOINT_COUNT);
        }
    }

    #[test]
    fn test_nobody_detected_degrades_after_hold_window() {
        let mut sim = Simulation::new(config()).unwrap();
        sim.ingest_pose(Some(full_pose(0.9)), Some(0.0));
        sim.tick(0.016);
        sim.ingest_pose(None, Some(0.1));
        assert_eq!(sim.tick(0.016).visible_joints, JOINT_COUNT);
        assert_eq!(sim.tick(0.016).visible_joints, JOINT_COUNT);
        assert_eq!(sim.tick(0.016).visible_joints, 0);
    }

    #[test]
    fn test_reset_forgets_last_pose() {
        let mut sim = Simulation::new(config()).unwrap();
        sim.ingest_pose(Some(full_pose(0.9)), Some(0.0));
        sim.tick(0.016);
        sim.reset();
        assert_eq!(sim.stabilizer().visible_count(), 0);
        assert_eq!(sim.tick(0.016).visible_joints, 0);
    }

    #[test]
    fn test_stale_detection_is_not_applied() {
        let mut sim = Simulation::new(config()).unwrap();
        sim.set_playing(true);
        let first = sim.request_detection(0.0).unwrap();
        let second = sim.request_detection(200.0).unwrap();
        assert!(sim.submit_detection(second, None, Some(0.2)));
        assert!(!sim.submit_detection(first, Some(full_pose(0.9)), Some(0.0)));
        assert_eq!(sim.tick(0.016).visible_joints, 0);
    }

    #[test]
    fn test_paused_playback_issues_no_requests() {
        let mut sim = Simulation::new(config()).unwrap();
        assert_eq!(sim.request_detection(0.0), None);
    }

    #[test]
    fn test_geometry_change_regenerates() {
        let mut sim = Simulation::new(config()).unwrap();
        let before = sim.field().particles()[0];
        assert_eq!(sim.apply_change("particle_count", 2000.0), Ok(ConfigChange::Regenerate));
        assert_eq!(sim.field().len(), 2000);

        assert_eq!(sim.apply_color("outside_color", "#ffffff"), Ok(ConfigChange::Regenerate));
        assert_ne!(sim.field().particles()[0].color, before.color);
    }

    #[test]
    fn test_simulation_change_keeps_particles() {
        let mut sim = Simulation::new(config()).unwrap();
        sim.field_mut().take_dirty();
        let before: Vec<_> = sim.field().particles().to_vec();
        assert_eq!(sim.apply_change("max_hold_frames", 10.0), Ok(ConfigChange::Immediate));
        assert_eq!(sim.stabilizer().params().max_hold_frames, 10);
        assert_eq!(sim.field().particles(), before.as_slice());
        assert!(!sim.field().is_dirty());
    }

    #[test]
    fn test_rejected_change_has_no_effect() {
        let mut sim = Simulation::new(config()).unwrap();
        assert!(sim.apply_change("particle_count", 1.0).is_err());
        assert_eq!(sim.field().len(), 1000);
    }

    #[test]
    fn test_joint_near_particles_pushes_them() {
        let mut sim = Simulation::new(SimulationConfig {
            particle_count: 5000,
            field_radius: 1.0,
            ..SimulationConfig::default()
        })
        .unwrap();
        let mut keypoints = vec![RawKeypoint::default(); JOINT_COUNT];
        keypoints[LEFT_WRIST] = RawKeypoint::new(0.0, 0.0, 0.0, 1.0);
        sim.ingest_pose(Some(Pose::new(keypoints)), None);
        let stats = sim.tick(0.016);
        assert_eq!(stats.visible_joints, 1);
        assert!(stats.pushed_particles > 0);
        assert!(sim.field().is_dirty());
    }

    #[test]
    fn test_bones_follow_visibility() {
        let mut sim = Simulation::new(config()).unwrap();
        assert!(sim.bones().iter().all(|b| !b.visible));
        sim.ingest_pose(Some(full_pose(0.9)), Some(0.0));
        sim.tick(0.016);
        assert!(sim.bones().iter().all(|b| b.visible));
    }

    #[test]
    fn test_untimed_samples_continue_after_timed_clock() {
        let mut sim = Simulation::new(config()).unwrap();
        let pose_at = |x: f32| Pose::new(vec![RawKeypoint::new(x, 0.5, 0.0, 0.9); JOINT_COUNT]);

        sim.ingest_pose(Some(pose_at(0.0)), Some(100.0));
        sim.tick(0.016);
        let start = sim.stabilizer().last_filtered_position(0).unwrap().x;

        let mut previous = start;
        for i in 1..=30 {
            sim.ingest_pose(Some(pose_at(i as f32)), None);
            sim.tick(0.016);
            let x = sim.stabilizer().last_filtered_position(0).unwrap().x;
            assert!(x > previous, "sample {} did not move the joint", i);
            previous = x;
        }
        assert!(previous > start + 1.0);
    }

    #[test]
    fn test_first_untimed_sample_starts_clock() {
        let mut sim = Simulation::new(config()).unwrap();
        sim.ingest_pose(Some(full_pose(0.9)), None);
        sim.ingest_pose(Some(full_pose(0.9)), None);
        assert_eq!(sim.tick(0.016).visible_joints, JOINT_COUNT);
        sim.reset();
        sim.ingest_pose(Some(full_pose(0.9)), None);
        assert_eq!(sim.tick(0.016).visible_joints, JOINT_COUNT);
    }

    #[test]
    fn test_default_matches_default_config() {
        let sim = Simulation::default();
        assert_eq!(sim.config(), &SimulationConfig::default());
        assert_eq!(sim.field().len(), SimulationConfig::default().particle_count);
        assert!(!sim.is_playing());
    }

    #[test]
    fn test_set_config_seed_change_regenerates() {
        let mut sim = Simulation::new(config()).unwrap();
        sim.field_mut().take_dirty();
        let before: Vec<_> = sim.field().particles().to_vec();
        let next = SimulationConfig {
            seed: 7,
            ..config()
        };
        sim.set_config(next).unwrap();
        assert_eq!(sim.config().seed, 7);
        assert_eq!(sim.field().len(), before.len());
        assert_ne!(sim.field().particles(), before.as_slice());
        assert!(sim.field().is_dirty());
    }

    #[test]
    fn test_set_config_force_change_keeps_particles() {
        let mut sim = Simulation::new(config()).unwrap();
        sim.field_mut().take_dirty();
        let before: Vec<_> = sim.field().particles().to_vec();
        let next = SimulationConfig {
            max_force: 0.9,
            ..config()
        };
        sim.set_config(next).unwrap();
        assert_eq!(sim.config().max_force, 0.9);
        assert_eq!(sim.field().particles(), before.as_slice());
        assert!(!sim.field().is_dirty());
    }
}
