use super::{camera, gray};
use crate::core::demo::{Demo, DemoContext};
use crate::core::frame_buffer::FrameBuffer;
use crate::core::geometry::Geometry;
use crate::core::rasterizer::{BlendMode, CullMode, PipelineState, Primitive, Renderer};
use crate::core::shader::ShaderProgram;
use crate::error::Result;
use crate::geometry::shapes::spiral_tube;
use crate::geometry::transform::TransformFactory;
use crate::geometry::vertex::TexturedVertex;
use crate::shaders::{LambertParams, LambertShader, Pattern, Transforms};
use log::info;
use nalgebra::{Vector2, Vector3};
use std::f32::consts::TAU;

const SURFACE_ALPHA: f32 = 0.75;

/// 从镜头正前方看进去的螺旋管，棋盘格沿管道滚动
pub struct SpiralDemo {
    program: ShaderProgram<LambertParams>,
    tube: Geometry<TexturedVertex>,
    aspect: f32,
    cycle_duration: f32,
    time: f32,
}

impl SpiralDemo {
    pub fn new(ctx: &mut DemoContext) -> Result<Self> {
        let (vertices, indices) = spiral_tube();
        info!("螺旋管: {} 个顶点, {} 个三角形", vertices.len(), indices.len() / 3);
        Ok(Self {
            program: ctx.load_program()?,
            tube: Geometry::from_indexed(&vertices, &indices),
            aspect: ctx.aspect(),
            cycle_duration: ctx.cycle_duration(),
            time: 0.0,
        })
    }
}

impl Demo for SpiralDemo {
    fn update(&mut self, dt: f32) {
        self.time += dt;
    }

    fn render(&mut self, target: &mut FrameBuffer) {
        target.clear(gray(0.5));

        let view_projection = camera(self.aspect, Vector3::new(0.0, -0.04, 0.3));
        let model = TransformFactory::rotation_z(self.time * TAU / self.cycle_duration);
        let scroll = self.time / self.cycle_duration;
        let shader = LambertShader::new(&self.program, Transforms::new(model, &view_projection))
            .with_light(Vector3::new(5.0, 7.0, 5.0))
            .with_color(Vector3::repeat(1.0), SURFACE_ALPHA)
            .with_pattern(Pattern::Checker {
                offset: Vector2::new(-scroll, scroll),
            });

        let state = PipelineState::default().with_blend(BlendMode::Alpha);
        for cull in [CullMode::Front, CullMode::Back] {
            Renderer::new(state.with_cull(cull)).draw_elements(
                target,
                &shader,
                &self.tube,
                Primitive::Triangles,
            );
        }
    }
}
