use crate::core::frame_buffer::{FrameBuffer, Rgba};
use crate::core::geometry::Geometry;
use crate::core::rasterizer::{BlendMode, PipelineState, Primitive, Renderer};
use crate::core::shader::ShaderProgram;
use crate::geometry::shapes::fullscreen_quad;
use crate::geometry::vertex::QuadVertex;
use crate::shaders::{BlurParams, BlurShader};
use log::debug;

/// 辉光：在低分辨率缓冲中渲染发光源，来回做水平/垂直模糊，
/// 最后一次垂直模糊以 (ONE, ONE) 叠加到目标帧缓冲上。
pub struct BlurEffect {
    width: usize,
    height: usize,
    buffers: [FrameBuffer; 2],
    quad: Geometry<QuadVertex>,
    program: ShaderProgram<BlurParams>,
}

impl BlurEffect {
    pub fn new(width: usize, height: usize, program: ShaderProgram<BlurParams>) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        debug!("创建模糊缓冲 {}x{}", width, height);
        Self {
            width,
            height,
            buffers: [FrameBuffer::new(width, height), FrameBuffer::new(width, height)],
            quad: Geometry::from_vertices(&fullscreen_quad()),
            program,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 发光源的绘制目标，调用方负责清除
    pub fn target(&mut self) -> &mut FrameBuffer {
        &mut self.buffers[0]
    }

    /// 执行 `passes` 轮模糊并叠加到 `dest`
    pub fn render(&mut self, dest: &mut FrameBuffer, passes: usize) {
        let state = PipelineState::default().with_depth_test(false);
        let copy = Renderer::new(state);
        let composite = Renderer::new(state.with_blend(BlendMode::Additive));
        let [ping, pong] = &mut self.buffers;

        for pass in 0..passes {
            let horizontal = BlurShader::new(&self.program, ping, true);
            copy.draw_arrays(pong, &horizontal, &self.quad, Primitive::TriangleStrip);

            let vertical = BlurShader::new(&self.program, pong, false);
            if pass + 1 < passes {
                copy.draw_arrays(ping, &vertical, &self.quad, Primitive::TriangleStrip);
            } else {
                composite.draw_arrays(dest, &vertical, &self.quad, Primitive::TriangleStrip);
            }
        }
    }

    /// 清空发光源缓冲
    pub fn clear(&mut self) {
        self.buffers[0].clear(Rgba::new(0.0, 0.0, 0.0, 0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame_buffer::RenderTarget;
    use std::path::Path;

    fn effect(width: usize, height: usize) -> BlurEffect {
        let program = ShaderProgram::from_source(
            Path::new("blur.toml"),
            "[program]\nname = \"blur\"\nstages = [\"vertex\", \"fragment\"]\n",
        )
        .unwrap();
        BlurEffect::new(width, height, program)
    }

    fn energy(fb: &FrameBuffer) -> f32 {
        fb.color_buffer().iter().map(|c| c.x).sum()
    }

    #[test]
    fn blur_spreads_a_point_and_keeps_its_energy() {
        let mut blur = effect(16, 16);
        blur.clear();
        blur.target().planes().color.unwrap()[8 * 16 + 8] = Rgba::new(1.0, 1.0, 1.0, 1.0);

        let mut dest = FrameBuffer::new(16, 16);
        dest.clear(Rgba::new(0.0, 0.0, 0.0, 1.0));
        blur.render(&mut dest, 1);

        let center = dest.pixel(8, 8).x;
        assert!(center > 0.0 && center < 0.1);
        assert!(dest.pixel(10, 8).x > 0.0);
        assert!(dest.pixel(8, 10).x > 0.0);
        assert!((energy(&dest) - 1.0).abs() < 1e-2);
    }

    #[test]
    fn composite_is_additive() {
        let mut blur = effect(4, 4);
        blur.target().clear(Rgba::new(0.25, 0.0, 0.0, 0.0));

        let mut dest = FrameBuffer::new(8, 8);
        dest.clear(Rgba::new(0.5, 0.5, 0.5, 1.0));
        blur.render(&mut dest, 2);

        let pixel = dest.pixel(3, 3);
        assert!((pixel.x - 0.75).abs() < 1e-3);
        assert!((pixel.y - 0.5).abs() < 1e-6);
    }
}
