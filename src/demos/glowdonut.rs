use super::{camera, gray, wobble};
use crate::core::demo::{Demo, DemoContext};
use crate::core::frame_buffer::{FrameBuffer, Rgba};
use crate::core::geometry::Geometry;
use crate::core::rasterizer::{PipelineState, Primitive, Renderer};
use crate::core::shader::ShaderProgram;
use crate::effects::BlurEffect;
use crate::error::Result;
use crate::geometry::shapes::{TORUS_VERTEX_COUNT, twisted_torus};
use crate::geometry::transform::TransformFactory;
use crate::geometry::vertex::TexturedVertex;
use crate::shaders::{StripeParams, StripeShader, Transforms};
use log::debug;
use nalgebra::{Matrix4, Vector3};
use std::f32::consts::{FRAC_PI_2, TAU};

const BIG_RADIUS: f32 = 1.0;
const SMALL_RADIUS: f32 = 0.25;
/// 辉光缓冲相对窗口的缩小倍数
const GLOW_DOWNSCALE: usize = 8;
const BLUR_PASSES: usize = 4;

/// 两个互相套住的扭转圆环，红色条纹发光
///
/// 辉光通道只画条纹（底色为黑），模糊后叠加到正常绘制的画面上。
pub struct GlowDonutDemo {
    program: ShaderProgram<StripeParams>,
    torus: Geometry<TexturedVertex>,
    blur: BlurEffect,
    aspect: f32,
    cycle_duration: f32,
    time: f32,
}

impl GlowDonutDemo {
    pub fn new(ctx: &mut DemoContext) -> Result<Self> {
        let blur = BlurEffect::new(
            ctx.width() / GLOW_DOWNSCALE,
            ctx.height() / GLOW_DOWNSCALE,
            ctx.load_program()?,
        );
        debug!("辉光缓冲 {}x{}", blur.width(), blur.height());
        Ok(Self {
            program: ctx.load_program()?,
            torus: Geometry::from_vertices(&[TexturedVertex::default(); TORUS_VERTEX_COUNT]),
            blur,
            aspect: ctx.aspect(),
            cycle_duration: ctx.cycle_duration(),
            time: 0.0,
        })
    }
}

/// 画两个圆环；`base_color` 为条纹之间的颜色
fn draw_tori(
    target: &mut FrameBuffer,
    program: &ShaderProgram<StripeParams>,
    torus: &Geometry<TexturedVertex>,
    view_projection: &Matrix4<f32>,
    model: &Matrix4<f32>,
    base_color: Vector3<f32>,
) {
    let placements: [Matrix4<f32>; 2] = [
        model
            * TransformFactory::rotation_x(FRAC_PI_2)
            * TransformFactory::translation(&Vector3::new(-0.5, 0.0, 0.0)),
        model * TransformFactory::translation(&Vector3::new(0.5, 0.0, 0.0)),
    ];

    let renderer = Renderer::new(PipelineState::default());
    for placement in placements {
        let shader = StripeShader::new(program, Transforms::new(placement, view_projection))
            .with_light(Vector3::new(-1.0, -1.0, 3.0))
            .with_color(Vector3::new(1.0, 0.0, 0.0))
            .with_base_color(base_color);
        renderer.draw(target, &shader, torus, Primitive::Triangles);
    }
}

impl Demo for GlowDonutDemo {
    fn update(&mut self, dt: f32) {
        self.time += dt;
    }

    fn render(&mut self, target: &mut FrameBuffer) {
        let angle = self.time * TAU / self.cycle_duration;
        let u_offset = self.time / self.cycle_duration / 4.0;
        self.torus
            .update_vertices(|verts| twisted_torus(verts, BIG_RADIUS, SMALL_RADIUS, angle, u_offset));

        let view_projection = camera(self.aspect, Vector3::new(-1.0, 2.0, 3.0));
        let model = wobble(Vector3::new(-1.0, 1.0, 1.0), self.time, self.cycle_duration);

        // 辉光源：只有条纹
        let glow = self.blur.target();
        glow.clear(Rgba::new(0.0, 0.0, 0.0, 0.0));
        draw_tori(glow, &self.program, &self.torus, &view_projection, &model, Vector3::zeros());

        target.clear(gray(0.25));
        draw_tori(target, &self.program, &self.torus, &view_projection, &model, Vector3::repeat(1.0));

        self.blur.render(target, BLUR_PASSES);
    }
}
