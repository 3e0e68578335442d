use super::{camera, gray};
use crate::core::demo::{Demo, DemoContext};
use crate::core::frame_buffer::FrameBuffer;
use crate::core::geometry::Geometry;
use crate::core::rasterizer::{BlendMode, PipelineState, Primitive, Renderer};
use crate::core::shader::ShaderProgram;
use crate::error::Result;
use crate::geometry::shapes::{COIL_CIRCLE_VERTS, coil_strip};
use crate::geometry::transform::TransformFactory;
use crate::geometry::vertex::TexturedVertex;
use crate::shaders::{StripeParams, StripeShader, Transforms, VisibleRange};
use nalgebra::Vector3;
use std::f32::consts::TAU;

const COIL_RADIUS: f32 = 0.2;
const STRIP_LENGTH: f32 = 0.75;
const PALETTE: [[f32; 3]; 3] = [[69.0, 63.0, 120.0], [117.0, 154.0, 171.0], [250.0, 242.0, 161.0]];

/// 一条缠绕缎带：只显示沿路径滑动的一段
struct Strip {
    geometry: Geometry<TexturedVertex>,
    color: Vector3<f32>,
    offset: f32,
    speed: f32,
}

impl Strip {
    fn visible_range(&self, time: f32) -> VisibleRange {
        let start = (self.offset + time * self.speed).rem_euclid(1.0);
        VisibleRange::new(start, (start + STRIP_LENGTH).rem_euclid(1.0))
    }
}

/// 三条彩色缎带绕着圆角方形的环滑动
pub struct DonutDemo {
    program: ShaderProgram<StripeParams>,
    strips: Vec<Strip>,
    aspect: f32,
    cycle_duration: f32,
    time: f32,
}

impl DonutDemo {
    pub fn new(ctx: &mut DemoContext) -> Result<Self> {
        let cycle_duration = ctx.cycle_duration();
        let strips = PALETTE
            .iter()
            .enumerate()
            .map(|(i, rgb)| Strip {
                geometry: Geometry::from_vertices(&coil_strip(
                    i as f32 * TAU / PALETTE.len() as f32,
                    COIL_RADIUS,
                )),
                color: Vector3::from(*rgb) / 255.0,
                offset: 0.1 * i as f32,
                speed: 1.0 / cycle_duration / COIL_CIRCLE_VERTS as f32,
            })
            .collect();

        Ok(Self {
            program: ctx.load_program()?,
            strips,
            aspect: ctx.aspect(),
            cycle_duration,
            time: 0.0,
        })
    }
}

impl Demo for DonutDemo {
    fn update(&mut self, dt: f32) {
        self.time += dt;
    }

    fn render(&mut self, target: &mut FrameBuffer) {
        target.clear(gray(0.75));

        let view_projection = camera(self.aspect, Vector3::new(0.0, 0.0, 4.0));
        // 每个循环转过四分之一圈，与方形的角数对齐
        let angle = -self.time * TAU / self.cycle_duration / COIL_CIRCLE_VERTS as f32;
        let transforms = Transforms::new(TransformFactory::rotation_z(angle), &view_projection);

        let renderer = Renderer::new(PipelineState::default().with_blend(BlendMode::Alpha));
        for strip in &self.strips {
            let shader = StripeShader::new(&self.program, transforms)
                .with_light(Vector3::new(-1.0, -1.0, 3.0))
                .with_color(strip.color)
                .with_stripes(false)
                .with_visible_range(strip.visible_range(self.time));
            renderer.draw(target, &shader, &strip.geometry, Primitive::TriangleStrip);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_range_wraps_past_the_end() {
        let strip = Strip {
            geometry: Geometry::new(),
            color: Vector3::zeros(),
            offset: 0.5,
            speed: 0.0,
        };
        let range = strip.visible_range(0.0);
        assert!((range.start - 0.5).abs() < 1e-6);
        assert!((range.end - 0.25).abs() < 1e-6);
        assert!(range.contains(0.1) && !range.contains(0.4));
    }
}
