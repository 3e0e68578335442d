use super::phong::InstanceState;
use crate::core::frame_buffer::Rgba;
use crate::core::shader::{Fragment, Shader, VertexOutput};
use crate::geometry::transform::to_clip;
use crate::geometry::vertex::SurfaceVertex;
use nalgebra::Matrix4;
use std::marker::PhantomData;

/// 从光源视角只写深度
pub struct DepthShader<'a, V> {
    pub light_view_projection: Matrix4<f32>,
    pub model: Matrix4<f32>,
    pub instances: Option<&'a [InstanceState]>,
    _vertex: PhantomData<fn() -> V>,
}

impl<'a, V: SurfaceVertex> DepthShader<'a, V> {
    pub fn new(light_view_projection: Matrix4<f32>, model: Matrix4<f32>) -> Self {
        Self {
            light_view_projection,
            model,
            instances: None,
            _vertex: PhantomData,
        }
    }

    pub fn with_instances(mut self, instances: &'a [InstanceState]) -> Self {
        self.instances = Some(instances);
        self
    }
}

impl<V: SurfaceVertex> Shader for DepthShader<'_, V> {
    type Vertex = V;
    type Varying = ();

    fn vertex(&self, vertex: &V, instance: usize) -> VertexOutput<()> {
        let instance_transform = self
            .instances
            .and_then(|instances| instances.get(instance))
            .map_or_else(Matrix4::identity, |state| state.transform);
        let mvp = self.light_view_projection * self.model * instance_transform;
        VertexOutput::new(to_clip(&mvp, &vertex.position()), ())
    }

    fn fragment(&self, _fragment: &Fragment<()>) -> Option<Rgba> {
        Some(Rgba::zeros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Geometry;
    use crate::core::rasterizer::{Primitive, Renderer};
    use crate::core::shadow_buffer::ShadowBuffer;
    use crate::geometry::vertex::PositionVertex;
    use nalgebra::Vector3;

    #[test]
    fn writes_depth_of_instanced_quads() {
        let quad = Geometry::from_vertices(&[
            PositionVertex::new(Vector3::new(-1.0, -1.0, 0.0)),
            PositionVertex::new(Vector3::new(1.0, -1.0, 0.0)),
            PositionVertex::new(Vector3::new(-1.0, 1.0, 0.0)),
            PositionVertex::new(Vector3::new(1.0, 1.0, 0.0)),
        ]);
        let instances = [
            InstanceState::default(),
            InstanceState::new(
                Matrix4::new_translation(&Vector3::new(0.0, 0.0, -0.5)),
                Rgba::zeros(),
            ),
        ];
        let shader = DepthShader::new(Matrix4::identity(), Matrix4::identity())
            .with_instances(&instances);

        let mut shadow = ShadowBuffer::new(8, 8);
        Renderer::default().draw_arrays_instanced(
            &mut shadow,
            &shader,
            &quad,
            Primitive::TriangleStrip,
            2,
        );
        // NDC z = -0.5 -> 窗口深度 0.25
        assert!((shadow.depth(4, 4) - 0.25).abs() < 1e-5);
    }
}
