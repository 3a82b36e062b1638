//! Skeleton topology and bone assembly
//!
//! Joint indices follow the 33-landmark BlazePose layout.

use nalgebra::Vector3;

use super::stabilizer::KeypointState;

/// Number of joints produced by the pose provider
pub const JOINT_COUNT: usize = 33;

pub const NOSE: usize = 0;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

/// Number of bones in the topology table
pub const BONE_COUNT: usize = 12;

/// Bone connections (pairs of joint indices): torso, arms, legs
pub const BONES: [(usize, usize); BONE_COUNT] = [
    (LEFT_SHOULDER, RIGHT_SHOULDER),
    (LEFT_SHOULDER, LEFT_ELBOW),
    (LEFT_ELBOW, LEFT_WRIST),
    (RIGHT_SHOULDER, RIGHT_ELBOW),
    (RIGHT_ELBOW, RIGHT_WRIST),
    (LEFT_SHOULDER, LEFT_HIP),
    (RIGHT_SHOULDER, RIGHT_HIP),
    (LEFT_HIP, RIGHT_HIP),
    (LEFT_HIP, LEFT_KNEE),
    (LEFT_KNEE, LEFT_ANKLE),
    (RIGHT_HIP, RIGHT_KNEE),
    (RIGHT_KNEE, RIGHT_ANKLE),
];

/// Line segment for one bone
///
/// Hidden bones collapse to a zero-length segment at the origin; `visible`
/// lets a renderer skip them instead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneSegment {
    pub start: Vector3<f32>,
    pub end: Vector3<f32>,
    pub visible: bool,
}

impl BoneSegment {
    pub const HIDDEN: Self = Self {
        start: Vector3::new(0.0, 0.0, 0.0),
        end: Vector3::new(0.0, 0.0, 0.0),
        visible: false,
    };

    pub fn length(&self) -> f32 {
        (self.end - self.start).norm()
    }
}

/// Map stabilized joints onto the bone table
pub fn assemble(joints: &[KeypointState]) -> [BoneSegment; BONE_COUNT] {
    let mut segments = [BoneSegment::HIDDEN; BONE_COUNT];

    for (segment, &(a, b)) in segments.iter_mut().zip(BONES.iter()) {
        if let (Some(start), Some(end)) = (joints.get(a), joints.get(b)) {
            if start.is_visible_for_render() && end.is_visible_for_render() {
                *segment = BoneSegment {
                    start: start.last_filtered_position(),
                    end: end.last_filtered_position(),
                    visible: true,
                };
            }
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::stabilizer::{KeypointStabilizer, RawKeypoint};

    #[test]
    fn test_topology_indices_in_range() {
        for &(a, b) in BONES.iter() {
            assert!(a < JOINT_COUNT && b < JOINT_COUNT);
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_nothing_visible_gives_degenerate_segments() {
        let s = KeypointStabilizer::default();
        for segment in assemble(s.joints()) {
            assert_eq!(segment, BoneSegment::HIDDEN);
        }
    }

    #[test]
    fn test_bone_visible_only_with_both_endpoints() {
        let mut s = KeypointStabilizer::default();
        s.update(LEFT_SHOULDER, Some(RawKeypoint::new(0.2, 0.4, 0.1, 1.0)), 0.0);
        s.update(LEFT_ELBOW, Some(RawKeypoint::new(0.3, 0.6, 0.1, 1.0)), 0.0);
        s.update(RIGHT_SHOULDER, Some(RawKeypoint::new(0.8, 0.4, 0.1, 0.2)), 0.0);

        let segments = assemble(s.joints());
        for (segment, &(a, b)) in segments.iter().zip(BONES.iter()) {
            if (a, b) == (LEFT_SHOULDER, LEFT_ELBOW) {
                assert!(segment.visible);
                assert_eq!(segment.start, Vector3::new(0.2, -0.4, -0.1));
                assert_eq!(segment.end, Vector3::new(0.3, -0.6, -0.1));
                assert!(segment.length() > 0.0);
            } else {
                assert!(!segment.visible, "bone {:?}", (a, b));
                assert_eq!(segment.start, Vector3::zeros());
                assert_eq!(segment.end, Vector3::zeros());
            }
        }
    }
}
