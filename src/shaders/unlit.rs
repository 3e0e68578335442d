use crate::core::frame_buffer::Rgba;
use crate::core::shader::{Fragment, ProgramParams, Shader, ShaderProgram, VertexOutput};
use crate::geometry::transform::to_clip;
use crate::geometry::vertex::SurfaceVertex;
use nalgebra::Matrix4;
use serde::Deserialize;
use std::marker::PhantomData;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnlitParams {
    /// 颜色整体倍率
    pub intensity: f32,
}

impl Default for UnlitParams {
    fn default() -> Self {
        Self { intensity: 1.0 }
    }
}

impl ProgramParams for UnlitParams {
    const NAME: &'static str = "unlit";
}

/// 纯色着色器（线框、曲线）
pub struct UnlitShader<'a, V> {
    params: &'a UnlitParams,
    pub mvp: Matrix4<f32>,
    pub color: Rgba,
    _vertex: PhantomData<fn() -> V>,
}

impl<'a, V: SurfaceVertex> UnlitShader<'a, V> {
    pub fn new(program: &'a ShaderProgram<UnlitParams>, mvp: Matrix4<f32>) -> Self {
        Self {
            params: program.params(),
            mvp,
            color: Rgba::new(1.0, 1.0, 1.0, 1.0),
            _vertex: PhantomData,
        }
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }
}

impl<V: SurfaceVertex> Shader for UnlitShader<'_, V> {
    type Vertex = V;
    type Varying = ();

    fn vertex(&self, vertex: &V, _instance: usize) -> VertexOutput<()> {
        VertexOutput::new(to_clip(&self.mvp, &vertex.position()), ())
    }

    fn fragment(&self, _fragment: &Fragment<()>) -> Option<Rgba> {
        let rgb = self.color.xyz() * self.params.intensity;
        Some(rgb.push(self.color.w))
    }
}
