//! Physics module - keypoint stabilization and particle force field
//!
//! Re-exports only. All logic in submodules.

mod one_euro;
mod stabilizer;
mod skeleton;
mod particles;
mod force_field;

pub use one_euro::{FilterParams, OneEuroFilter, OneEuroFilter3D};
pub use stabilizer::{KeypointStabilizer, KeypointState, Pose, RawKeypoint, StabilizerParams, TrackingState};
pub use skeleton::{
    assemble, BoneSegment, BONES, BONE_COUNT, JOINT_COUNT,
    NOSE, LEFT_SHOULDER, RIGHT_SHOULDER,
    LEFT_ELBOW, RIGHT_ELBOW,
    LEFT_WRIST, RIGHT_WRIST,
    LEFT_HIP, RIGHT_HIP,
    LEFT_KNEE, RIGHT_KNEE,
    LEFT_ANKLE, RIGHT_ANKLE,
};
pub use particles::{Particle, ParticleField};
pub use force_field::{accumulate_force, step, FORCE_EPSILON, MIN_DISTANCE};
