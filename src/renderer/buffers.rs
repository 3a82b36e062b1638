//! Flat buffers for joints, bones and particles
//!
//! Layouts match what a points/line-segments renderer uploads directly:
//! 3 floats per joint, 6 per bone, 3 per particle position and color.

use super::vertices::{flatten, to_array, LineVertex, PointVertex};
use crate::physics::{BoneSegment, KeypointState, ParticleField};

/// Joint positions (33 × xyz) and visibility flags (33 × 0/1)
pub fn joint_buffers(joints: &[KeypointState]) -> (Vec<f32>, Vec<u8>) {
    let positions: Vec<[f32; 3]> = joints.iter().map(|j| to_array(j.last_filtered_position())).collect();
    let visibility = joints.iter().map(|j| u8::from(j.is_visible_for_render())).collect();
    (flatten(&positions), visibility)
}

/// Bone endpoints (12 × 2 × xyz) and visibility flags (12 × 0/1)
pub fn bone_buffers(bones: &[BoneSegment]) -> (Vec<f32>, Vec<u8>) {
    let lines: Vec<LineVertex> = bones.iter().map(LineVertex::from).collect();
    let visibility = bones.iter().map(|b| u8::from(b.visible)).collect();
    (flatten(&lines), visibility)
}

/// Live particle positions (n × xyz)
pub fn particle_positions(field: &ParticleField) -> Vec<f32> {
    let positions: Vec<[f32; 3]> = field.particles().iter().map(|p| to_array(p.position)).collect();
    flatten(&positions)
}

/// Particle colors (n × rgb); fixed until the next regeneration
pub fn particle_colors(field: &ParticleField) -> Vec<f32> {
    let colors: Vec<[f32; 3]> = field.particles().iter().map(|p| to_array(p.color)).collect();
    flatten(&colors)
}

/// Interleaved position + color (n × 6)
pub fn particle_vertices(field: &ParticleField) -> Vec<f32> {
    let vertices: Vec<PointVertex> = field.particles().iter().map(PointVertex::from).collect();
    flatten(&vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{assemble, KeypointStabilizer, Particle, RawKeypoint, BONE_COUNT, JOINT_COUNT};
    use nalgebra::Vector3;

    #[test]
    fn test_joint_and_bone_buffer_sizes() {
        let mut s = KeypointStabilizer::default();
        s.update(0, Some(RawKeypoint::new(1.0, 2.0, 3.0, 1.0)), 0.0);

        let (positions, visibility) = joint_buffers(s.joints());
        assert_eq!(positions.len(), JOINT_COUNT * 3);
        assert_eq!(&positions[0..3], &[1.0, -2.0, -3.0]);
        assert_eq!(visibility[0], 1);
        assert_eq!(visibility.iter().map(|&v| v as usize).sum::<usize>(), 1);

        let (lines, flags) = bone_buffers(&assemble(s.joints()));
        assert_eq!(lines.len(), BONE_COUNT * 6);
        assert!(lines.iter().all(|&v| v == 0.0));
        assert!(flags.iter().all(|&f| f == 0));
    }

    #[test]
    fn test_particle_buffers() {
        let field = ParticleField::from_particles(vec![
            Particle::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.5, 0.5, 0.5)),
            Particle::new(Vector3::new(4.0, 5.0, 6.0), Vector3::new(1.0, 0.0, 0.0)),
        ]);
        assert_eq!(particle_positions(&field), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(particle_colors(&field), vec![0.5, 0.5, 0.5, 1.0, 0.0, 0.0]);
        assert_eq!(particle_vertices(&field).len(), 12);
    }
}
