use crate::core::frame_buffer::{FrameBuffer, Rgba};
use crate::core::shader::{Fragment, ProgramParams, Shader, ShaderProgram, VertexOutput};
use crate::geometry::vertex::QuadVertex;
use nalgebra::{Vector2, Vector4};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlurParams {
    /// 高斯核的一半：中心权重在前，依次向外
    pub weights: [f32; 5],
}

impl Default for BlurParams {
    fn default() -> Self {
        Self {
            weights: [0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216],
        }
    }
}

impl ProgramParams for BlurParams {
    const NAME: &'static str = "blur";
}

/// 可分离高斯模糊的一个方向（9 个采样点）
pub struct BlurShader<'a> {
    params: &'a BlurParams,
    pub source: &'a FrameBuffer,
    pub horizontal: bool,
}

impl<'a> BlurShader<'a> {
    pub fn new(program: &'a ShaderProgram<BlurParams>, source: &'a FrameBuffer, horizontal: bool) -> Self {
        Self {
            params: program.params(),
            source,
            horizontal,
        }
    }
}

impl Shader for BlurShader<'_> {
    type Vertex = QuadVertex;
    type Varying = Vector2<f32>;

    fn vertex(&self, vertex: &QuadVertex, _instance: usize) -> VertexOutput<Vector2<f32>> {
        VertexOutput::new(
            Vector4::new(vertex.position.x, vertex.position.y, 0.0, 1.0),
            vertex.uv,
        )
    }

    fn fragment(&self, fragment: &Fragment<Vector2<f32>>) -> Option<Rgba> {
        let uv = fragment.varying;
        let step = if self.horizontal {
            Vector2::new(1.0 / self.source.width.max(1) as f32, 0.0)
        } else {
            Vector2::new(0.0, 1.0 / self.source.height.max(1) as f32)
        };

        let weights = &self.params.weights;
        let mut sum = self.source.sample(uv) * weights[0];
        for (i, weight) in weights.iter().enumerate().skip(1) {
            let offset = step * i as f32;
            sum += self.source.sample(uv + offset) * *weight;
            sum += self.source.sample(uv - offset) * *weight;
        }
        Some(sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_kernel_sums_to_one() {
        let w = BlurParams::default().weights;
        let total = w[0] + 2.0 * w[1..].iter().sum::<f32>();
        assert!((total - 1.0).abs() < 1e-3);
    }
}
