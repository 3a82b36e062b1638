//! Vertex layouts handed to the external renderer

use nalgebra::Vector3;

use crate::physics::{BoneSegment, Particle};

/// Interleaved particle vertex: position then color
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl PointVertex {
    /// Floats per vertex
    pub const STRIDE: usize = std::mem::size_of::<PointVertex>() / std::mem::size_of::<f32>();
}

impl From<&Particle> for PointVertex {
    fn from(p: &Particle) -> Self {
        Self {
            position: to_array(p.position),
            color: to_array(p.color),
        }
    }
}

/// One bone as a line-list pair
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub start: [f32; 3],
    pub end: [f32; 3],
}

impl From<&BoneSegment> for LineVertex {
    fn from(b: &BoneSegment) -> Self {
        Self {
            start: to_array(b.start),
            end: to_array(b.end),
        }
    }
}

pub fn to_array(v: Vector3<f32>) -> [f32; 3] {
    [v.x, v.y, v.z]
}

/// Flatten any Pod vertex slice into raw floats
pub fn flatten<T: bytemuck::Pod>(vertices: &[T]) -> Vec<f32> {
    bytemuck::cast_slice::<T, f32>(vertices).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_vertex_layout() {
        assert_eq!(PointVertex::STRIDE, 6);
        let p = Particle::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.1, 0.2, 0.3));
        let flat = flatten(&[PointVertex::from(&p)]);
        assert_eq!(flat, vec![1.0, 2.0, 3.0, 0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_line_vertex_flattens_endpoints() {
        let bone = BoneSegment {
            start: Vector3::new(1.0, 1.0, 1.0),
            end: Vector3::new(2.0, 2.0, 2.0),
            visible: true,
        };
        assert_eq!(flatten(&[LineVertex::from(&bone)]), vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
    }
}
