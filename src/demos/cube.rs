use super::{camera, gray, wobble};
use crate::core::demo::{Demo, DemoContext};
use crate::core::frame_buffer::FrameBuffer;
use crate::core::geometry::Geometry;
use crate::core::rasterizer::{BlendMode, CullMode, PipelineState, Primitive, Renderer};
use crate::core::shader::ShaderProgram;
use crate::error::Result;
use crate::geometry::shapes;
use crate::geometry::transform::TransformFactory;
use crate::geometry::vertex::NormalVertex;
use crate::shaders::{LambertParams, LambertShader, Pattern, Transforms};
use nalgebra::Vector3;
use std::f32::consts::TAU;

/// 带滚动条纹的半透明立方体：先画背面再画正面
pub struct CubeDemo {
    program: ShaderProgram<LambertParams>,
    cube: Geometry<NormalVertex>,
    aspect: f32,
    cycle_duration: f32,
    time: f32,
}

impl CubeDemo {
    pub fn new(ctx: &mut DemoContext) -> Result<Self> {
        Ok(Self {
            program: ctx.load_program()?,
            cube: Geometry::from_vertices(&shapes::cube(1.0)),
            aspect: ctx.aspect(),
            cycle_duration: ctx.cycle_duration(),
            time: 0.0,
        })
    }
}

impl Demo for CubeDemo {
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
            .with_color(Vector3::repeat(1.0), 0.75)
            .with_pattern(Pattern::Bands {
                transform: TransformFactory::rotation(&Vector3::repeat(1.0), band_angle),
            });

        let state = PipelineState::default().with_blend(BlendMode::Alpha);
        for cull in [CullMode::Front, CullMode::Back] {
            Renderer::new(state.with_cull(cull)).draw(target, &shader, &self.cube, Primitive::Triangles);
        }
    }
}
