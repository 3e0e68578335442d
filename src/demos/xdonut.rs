use super::camera;
use crate::core::demo::{Demo, DemoContext};
use crate::core::frame_buffer::{FrameBuffer, Rgba};
use crate::core::geometry::Geometry;
use crate::core::rasterizer::{PipelineState, Primitive, Renderer};
use crate::core::shader::ShaderProgram;
use crate::error::Result;
use crate::geometry::shapes::{TORUS_VERTEX_COUNT, twisted_torus};
use crate::geometry::vertex::TexturedVertex;
use crate::shaders::{StripeParams, StripeShader, Transforms};
use nalgebra::{Matrix4, Vector3};
use std::f32::consts::TAU;

const BIG_RADIUS: f32 = 1.0;
const SMALL_RADIUS: f32 = 0.3;

/// 方形截面的圆环随时间扭转，红色条纹沿环流动
pub struct XDonutDemo {
    program: ShaderProgram<StripeParams>,
    torus: Geometry<TexturedVertex>,
    aspect: f32,
    cycle_duration: f32,
    time: f32,
}

impl XDonutDemo {
    pub fn new(ctx: &mut DemoContext) -> Result<Self> {
        Ok(Self {
            program: ctx.load_program()?,
            torus: Geometry::from_vertices(&[TexturedVertex::default(); TORUS_VERTEX_COUNT]),
            aspect: ctx.aspect(),
            cycle_duration: ctx.cycle_duration(),
            time: 0.0,
        })
    }
}

impl Demo for XDonutDemo {
    fn update(&mut self, dt: f32) {
        self.time += dt;
    }

    fn render(&mut self, target: &mut FrameBuffer) {
        let angle = self.time * TAU / self.cycle_duration;
        let u_offset = self.time / self.cycle_duration / 4.0;
        self.torus
            .update_vertices(|verts| twisted_torus(verts, BIG_RADIUS, SMALL_RADIUS, angle, u_offset));

        target.clear(Rgba::new(0.0, 0.0, 0.0, 0.0));

        let view_projection = camera(self.aspect, Vector3::new(0.0, 0.0, 4.0));
        let shader = StripeShader::new(&self.program, Transforms::new(Matrix4::identity(), &view_projection))
            .with_light(Vector3::new(-1.0, -1.0, 3.0))
            .with_color(Vector3::new(1.0, 0.0, 0.0))
            .with_base_color(Vector3::zeros());
        Renderer::new(PipelineState::default()).draw(target, &shader, &self.torus, Primitive::Triangles);
    }
}
