//! Particle field - origins, live positions and colors
//!
//! Particles fill a ball of `field_radius`. Origin and color are fixed at
//! generation; only positions move. The set is replaced as a whole when
//! geometry or colors change.

use std::f32::consts::TAU;

use nalgebra::Vector3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::SimulationConfig;

/// A single particle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Rest position the spring pulls back to
    pub origin: Vector3<f32>,
    /// Live position, mutated every tick
    pub position: Vector3<f32>,
    pub color: Vector3<f32>,
}

impl Particle {
    pub fn new(origin: Vector3<f32>, color: Vector3<f32>) -> Self {
        Self {
            origin,
            position: origin,
            color,
        }
    }
}

/// The full particle set plus a dirty flag for buffer re-upload
#[derive(Clone, Debug, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
    dirty: bool,
}

impl ParticleField {
    /// Generate a fresh set from the geometry and color settings
    pub fn generate(config: &SimulationConfig) -> Self {
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let radius = config.field_radius;
        let inside = config.inside_color;
        let outside = config.outside_color;

        let particles = (0..config.particle_count)
            .map(|_| {
                // Uniform direction, uniform density in the ball
                let phi = (1.0 - 2.0 * rng.random::<f32>()).clamp(-1.0, 1.0).acos();
                let theta = rng.random::<f32>() * TAU;
                let r = radius * rng.random::<f32>().cbrt();

                let direction = Vector3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
                let mut jitter = || {
                    let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                    sign * rng.random::<f32>().powf(config.randomness_power) * config.randomness * r
                };
                let offset = Vector3::new(jitter(), jitter(), jitter());

                let color = inside.lerp(outside, (r / radius).clamp(0.0, 1.0));
                Particle::new(direction * r + offset, color.to_vector())
            })
            .collect();

        log::debug!("Generated {} particles (radius {})", config.particle_count, radius);

        Self {
            particles,
            dirty: true,
        }
    }

    /// Build from an explicit particle list
    pub fn from_particles(particles: Vec<Particle>) -> Self {
        Self {
            particles,
            dirty: true,
        }
    }

    /// Replace the whole set in one step
    pub fn regenerate(&mut self, config: &SimulationConfig) {
        *self = Self::generate(config);
    }

    /// Snap every particle back to its origin
    pub fn restore_origins(&mut self) {
        for p in self.particles.iter_mut() {
            p.position = p.origin;
        }
        self.dirty = true;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Return and clear the dirty flag (renderer re-upload signal)
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Color;

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            particle_count: 500,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_generation_is_deterministic_for_seed() {
        let a = ParticleField::generate(&small_config());
        let b = ParticleField::generate(&small_config());
        assert_eq!(a.particles(), b.particles());

        let c = ParticleField::generate(&SimulationConfig {
            seed: 99,
            ..small_config()
        });
        assert_ne!(a.particles(), c.particles());
    }

    #[test]
    fn test_particles_start_at_origin_within_radius() {
        let config = SimulationConfig {
            randomness: 0.0,
            ..small_config()
        };
        let field = ParticleField::generate(&config);
        assert_eq!(field.len(), 500);
        for p in field.particles() {
            assert_eq!(p.position, p.origin);
            assert!(p.origin.norm() <= config.field_radius + 1e-4);
        }
    }

    #[test]
    fn test_colors_blend_between_inside_and_outside() {
        let config = SimulationConfig {
            inside_color: Color::new(1.0, 0.0, 0.0),
            outside_color: Color::new(0.0, 0.0, 1.0),
            randomness: 0.0,
            ..small_config()
        };
        let field = ParticleField::generate(&config);
        for p in field.particles() {
            assert!((p.color.x + p.color.z - 1.0).abs() < 1e-5);
            assert_eq!(p.color.y, 0.0);
            // Outer particles lean towards the outside color
            let t = p.origin.norm() / config.field_radius;
            assert!((p.color.z - t).abs() < 1e-4);
        }
    }

    #[test]
    fn test_regenerate_replaces_set_and_marks_dirty() {
        let mut field = ParticleField::generate(&small_config());
        assert!(field.take_dirty());
        assert!(!field.take_dirty());

        field.regenerate(&SimulationConfig {
            particle_count: 1200,
            ..small_config()
        });
        assert_eq!(field.len(), 1200);
        assert!(field.is_dirty());
    }

    #[test]
    fn test_restore_origins() {
        let mut field = ParticleField::from_particles(vec![Particle::new(Vector3::new(1.0, 0.0, 0.0), Vector3::zeros())]);
        field.particles_mut()[0].position = Vector3::new(4.0, 4.0, 4.0);
        field.take_dirty();
        field.restore_origins();
        assert_eq!(field.particles()[0].position, Vector3::new(1.0, 0.0, 0.0));
        assert!(field.is_dirty());
    }
}
