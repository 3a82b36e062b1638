//! Force-field simulator - joints push and pull particles
//!
//! Each visible joint inside `influence_distance` contributes
//! `(1 - distance) · max_force` along the joint→particle direction. Past a
//! distance of 1 the magnitude turns negative and the joint attracts.
//! Particles with no net force relax back to their origin.

use nalgebra::Vector3;

use super::particles::ParticleField;
use super::stabilizer::KeypointState;
use crate::config::{SimulationConfig, TimeStep};

/// Below this distance a joint's contribution is skipped
pub const MIN_DISTANCE: f32 = 1e-6;

/// Net force components at or below this count as "no force"
pub const FORCE_EPSILON: f32 = 0.001;

/// Per-tick scaling derived from the time step mode
#[derive(Clone, Copy, Debug, PartialEq)]
struct TickScale {
    impulse: f32,
    relax: f32,
}

impl TickScale {
    fn new(config: &SimulationConfig, elapsed: f32) -> Self {
        match config.time_step {
            TimeStep::PerTick => Self {
                impulse: 1.0,
                relax: config.return_strength,
            },
            TimeStep::Normalized { reference_hz } => {
                let ticks = (elapsed * reference_hz).max(0.0);
                Self {
                    impulse: ticks,
                    relax: 1.0 - (1.0 - config.return_strength).powf(ticks),
                }
            }
        }
    }
}

/// Net force on a point from every visible joint
pub fn accumulate_force(position: Vector3<f32>, joints: &[KeypointState], config: &SimulationConfig) -> Vector3<f32> {
    let mut force = Vector3::zeros();

    for joint in joints.iter().filter(|j| j.is_visible_for_render()) {
        let d = position - joint.last_filtered_position();
        let distance = d.norm();
        if distance < MIN_DISTANCE {
            continue;
        }
        if distance < config.influence_distance {
            let magnitude = (1.0 - distance) * config.max_force;
            force += d / distance * magnitude;
        }
    }

    force
}

/// Advance every particle by one tick
///
/// `elapsed` (seconds) is only used by `TimeStep::Normalized`. Returns the
/// number of particles pushed by the field this tick.
pub fn step(field: &mut ParticleField, joints: &[KeypointState], config: &SimulationConfig, elapsed: f32) -> usize {
    let scale = TickScale::new(config, elapsed);
    let mut pushed = 0;
    let mut moved = false;

    for p in field.particles_mut().iter_mut() {
        let force = accumulate_force(p.position, joints, config);

        if force.iter().any(|c| c.abs() > FORCE_EPSILON) {
            p.position += force * (config.force_multiplier * scale.impulse);
            pushed += 1;
            moved = true;
        } else {
            let delta = (p.origin - p.position) * scale.relax;
            if delta != Vector3::zeros() {
                p.position += delta;
                moved = true;
            }
        }
    }

    if moved {
        field.mark_dirty();
    }
    pushed
}
