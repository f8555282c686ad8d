//! Flat-colored vertices for the Duet scene
//!
//! `build_scene` emits vertices in world units; `RenderState::render` maps them
//! to clip space before upload, so the GPU only ever sees NDC positions.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// One corner of a triangle: position plus straight RGBA
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// World units in the scene, NDC once uploaded (`@location(0)`)
    pub position: [f32; 2],
    /// `@location(1)`, alpha blended
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn at(p: Vec2, color: [f32; 4]) -> Self {
        Self::new(p.x, p.y, color)
    }

    /// Buffer layout matching `vs_main` in shader.wgsl
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Palette: one hue per dot, neutral obstacles
pub mod colors {
    /// Dot on the pivot's -x side
    pub const DOT_LEFT: [f32; 4] = [0.95, 0.25, 0.3, 1.0];
    /// Dot on the pivot's +x side
    pub const DOT_RIGHT: [f32; 4] = [0.2, 0.6, 1.0, 1.0];
    /// Faint track the dots travel on
    pub const ORBIT: [f32; 4] = [1.0, 1.0, 1.0, 0.15];
    pub const OBSTACLE: [f32; 4] = [0.95, 0.95, 0.95, 1.0];
    /// Burst child part
    pub const OBSTACLE_CHILD: [f32; 4] = [1.0, 0.8, 0.35, 1.0];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_struct() {
        let desc = Vertex::desc();
        assert_eq!(desc.array_stride, 24);
        assert_eq!(desc.attributes[0].offset, 0);
        assert_eq!(desc.attributes[1].offset, 8);
        assert_eq!(desc.attributes[1].shader_location, 1);
    }

    #[test]
    fn test_casts_to_bytes() {
        let verts = [Vertex::at(Vec2::new(1.0, -2.0), colors::OBSTACLE)];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), 24);
        assert_eq!(bytemuck::cast_slice::<u8, f32>(bytes)[..2], [1.0, -2.0]);
    }
}
