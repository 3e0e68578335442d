use super::{camera, gray, wobble};
use crate::core::demo::{Demo, DemoContext};
use crate::core::frame_buffer::FrameBuffer;
use crate::core::geometry::Geometry;
use crate::core::rasterizer::{BlendMode, PipelineState, Primitive, Renderer};
use crate::core::shader::ShaderProgram;
use crate::error::Result;
use crate::geometry::shapes::{Bezier, bezier_strip};
use crate::geometry::transform::TransformFactory;
use crate::geometry::vertex::NormalVertex;
use crate::shaders::{LambertParams, LambertShader, Pattern, Transforms};
use nalgebra::Vector3;
use std::f32::consts::TAU;

const CURVE_POINTS: usize = 20;
const LINE_WIDTH: f32 = 2.0;

/// 一条二次贝塞尔曲线，以折线绘制
pub struct StripsDemo {
    program: ShaderProgram<LambertParams>,
    strip: Geometry<NormalVertex>,
    aspect: f32,
    cycle_duration: f32,
    time: f32,
}

impl StripsDemo {
    pub fn new(ctx: &mut DemoContext) -> Result<Self> {
        let curve = Bezier::new(
            Vector3::new(-1.0, -1.0, -1.0),
            Vector3::new(0.0, 0.0, 2.0),
            Vector3::new(1.0, 1.0, -1.0),
        );
        Ok(Self {
            program: ctx.load_program()?,
            strip: Geometry::from_vertices(&bezier_strip(&curve, CURVE_POINTS)),
            aspect: ctx.aspect(),
            cycle_duration: ctx.cycle_duration(),
            time: 0.0,
        })
    }
}

impl Demo for StripsDemo {
    fn update(&mut self, dt: f32) {
        self.time += dt;
    }

    fn render(&mut self, target: &mut FrameBuffer) {
        target.clear(gray(0.75));

        let view_projection = camera(self.aspect, Vector3::new(2.5, -2.5, 2.5));
        let model = wobble(Vector3::new(-1.0, 1.0, 1.0), self.time, self.cycle_duration);
        let band_angle = 0.3 * (self.time * TAU / self.cycle_duration).sin();
        let shader = LambertShader::new(&self.program, Transforms::new(model, &view_projection))
            .with_light(Vector3::new(5.0, -5.0, 5.0))
            .with_pattern(Pattern::Bands {
                transform: TransformFactory::rotation(&Vector3::repeat(1.0), band_angle),
            });

        let state = PipelineState::default()
            .with_blend(BlendMode::Alpha)
            .with_line_width(LINE_WIDTH);
        Renderer::new(state).draw(target, &shader, &self.strip, Primitive::LineStrip);
    }
}
