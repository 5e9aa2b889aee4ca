use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

use crate::compose::Animate;
use crate::time::FrameTime;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Indexed triangle mesh with per-vertex normals. Triangles wind CCW when seen
/// from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
}

impl MeshData {
    /// Flat-shaded octahedron with unit-length vertex radius.
    pub fn octahedron() -> Self {
        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(24);

        for sx in [1.0f32, -1.0] {
            for sy in [1.0f32, -1.0] {
                for sz in [1.0f32, -1.0] {
                    let a = Vec3::new(sx, 0.0, 0.0);
                    let mut b = Vec3::new(0.0, sy, 0.0);
                    let mut c = Vec3::new(0.0, 0.0, sz);
                    // (b - a) x (c - a) points along (sy*sz, sx*sz, sx*sy); flip odd octants.
                    if sx * sy * sz < 0.0 {
                        std::mem::swap(&mut b, &mut c);
                    }
                    let normal = Vec3::new(sx, sy, sz).normalize();

                    let base = vertices.len() as u16;
                    for p in [a, b, c] {
                        vertices.push(MeshVertex {
                            position: p.to_array(),
                            normal: normal.to_array(),
                        });
                    }
                    indices.extend_from_slice(&[base, base + 1, base + 2]);
                }
            }
        }

        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// The demo scene: one mesh spinning around Y at a fixed step per tick.
#[derive(Debug, Clone)]
pub struct MeshScene {
    mesh: MeshData,
    pub rotation_y: f32,
    pub spin_per_tick: f32,
    pub scale: Vec3,
}

impl MeshScene {
    pub const DEFAULT_SPIN_PER_TICK: f32 = 0.01;

    pub fn new(mesh: MeshData) -> Self {
        Self {
            mesh,
            rotation_y: 0.0,
            spin_per_tick: Self::DEFAULT_SPIN_PER_TICK,
            scale: Vec3::ONE,
        }
    }

    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_rotation_y(self.rotation_y),
            Vec3::ZERO,
        )
    }
}

impl Animate for MeshScene {
    fn advance(&mut self, _time: &FrameTime) {
        self.rotation_y = (self.rotation_y + self.spin_per_tick) % TAU;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FrameClock;

    #[test]
    fn octahedron_has_eight_outward_faces() {
        let mesh = MeshData::octahedron();
        assert_eq!(mesh.triangle_count(), 8);

        for tri in mesh.indices.chunks(3) {
            let p = |i: u16| Vec3::from_array(mesh.vertices[i as usize].position);
            let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
            let face_normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(face_normal.dot(centroid) > 0.0, "inward face {tri:?}");

            let n = Vec3::from_array(mesh.vertices[tri[0] as usize].normal);
            assert!((n.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn advance_spins_by_fixed_step() {
        let mut scene = MeshScene::new(MeshData::octahedron());
        let mut clock = FrameClock::new();

        scene.advance(&clock.tick());
        scene.advance(&clock.tick());

        assert!((scene.rotation_y - 0.02).abs() < 1e-6);
    }

    #[test]
    fn rotation_wraps_at_full_turn() {
        let mut scene = MeshScene::new(MeshData::octahedron());
        scene.spin_per_tick = 4.0;
        let mut clock = FrameClock::new();

        scene.advance(&clock.tick());
        scene.advance(&clock.tick());

        assert!(scene.rotation_y < TAU);
        assert!((scene.rotation_y - (8.0 - TAU)).abs() < 1e-5);
    }
}
