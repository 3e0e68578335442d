use super::{camera, look_at_origin};
use crate::core::buffer::{Buffer, BufferTarget};
use crate::core::demo::{Demo, DemoContext};
use crate::core::frame_buffer::{FrameBuffer, Rgba};
use crate::core::geometry::Geometry;
use crate::core::rasterizer::{PipelineState, Primitive, Renderer};
use crate::core::shader::ShaderProgram;
use crate::core::shadow_buffer::ShadowBuffer;
use crate::error::Result;
use crate::geometry::shapes::{cross_outline, tile_prism};
use crate::geometry::transform::TransformFactory;
use crate::geometry::vertex::NormalVertex;
use crate::shaders::{DepthShader, InstanceState, Light, PhongParams, PhongShader, ShadowMaps};
use crate::utils::tween::in_quadratic;
use nalgebra::{Matrix4, Vector3};
use rand::Rng;
use rand_distr::StandardNormal;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

const GRID_ROWS: usize = 25;
const GRID_COLUMNS: usize = 25;
const FLIP_DURATION: f32 = 0.8;
const SHADOW_SIZE: usize = 2048;
const TILE_THICKNESS: f32 = 0.2;
const TILE_INSET: f32 = 0.95;

/// 单块砖的翻转时间表
#[derive(Debug, Clone, Copy)]
struct FlipAnimation {
    /// 两次翻转的开始时刻
    s0: f32,
    s1: f32,
    /// 两次翻转时跳起的高度
    h0: f32,
    h1: f32,
    /// 绕 z 预先旋转的四分之一圈数，决定翻转方向
    flop: u32,
}

impl FlipAnimation {
    /// 返回 (绕 x 的角度, 离地高度)
    fn pose(&self, time: f32) -> (f32, f32) {
        let hop = |t: f32, height: f32| (1.0 - (2.0 * t - 1.0).powi(2)) * height;
        if time < self.s0 {
            (0.0, 0.0)
        } else if time < self.s0 + FLIP_DURATION {
            let t = (time - self.s0) / FLIP_DURATION;
            (in_quadratic(t) * PI, hop(t, self.h0))
        } else if time < self.s1 {
            (PI, 0.0)
        } else if time < self.s1 + FLIP_DURATION {
            let t = (time - self.s1) / FLIP_DURATION;
            (PI + in_quadratic(t) * PI, hop(t, self.h1))
        } else {
            (TAU, 0.0)
        }
    }
}

/// 正态分布 N(mean, std_dev²) 的一个样本
fn normal_sample<R: Rng>(rng: &mut R, mean: f32, std_dev: f32) -> f32 {
    let z: f32 = rng.sample(StandardNormal);
    mean + std_dev * z
}

/// 25x25 块十字砖，每块在随机时刻跳起翻面两次，带阴影
pub struct FlipTilingDemo {
    program: ShaderProgram<PhongParams>,
    tile: Geometry<NormalVertex>,
    animations: Vec<FlipAnimation>,
    states: Buffer<InstanceState>,
    shadow: ShadowBuffer,
    aspect: f32,
    cycle_duration: f32,
    time: f32,
}

impl FlipTilingDemo {
    pub fn new(ctx: &mut DemoContext) -> Result<Self> {
        let cycle_duration = ctx.cycle_duration();
        let rng = ctx.rng();
        let animations = (0..GRID_ROWS * GRID_COLUMNS)
            .map(|_| FlipAnimation {
                s0: normal_sample(rng, 0.25 * cycle_duration, 0.125).clamp(0.0, cycle_duration),
                s1: normal_sample(rng, 0.75 * cycle_duration, 0.125).clamp(0.0, cycle_duration),
                flop: rng.random_range(0..4),
                h0: 1.0 + 7.0 * rng.random::<f32>(),
                h1: 1.0 + 7.0 * rng.random::<f32>(),
            })
            .collect();

        let outline: Vec<_> = cross_outline().iter().map(|p| p * TILE_INSET).collect();
        Ok(Self {
            program: ctx.load_program()?,
            tile: Geometry::from_vertices(&tile_prism(
                &outline,
                -0.5 * TILE_THICKNESS,
                0.5 * TILE_THICKNESS,
            )),
            animations,
            states: Buffer::with_len(BufferTarget::ShaderStorage, GRID_ROWS * GRID_COLUMNS),
            shadow: ShadowBuffer::new(SHADOW_SIZE, SHADOW_SIZE),
            aspect: ctx.aspect(),
            cycle_duration,
            time: 0.0,
        })
    }

    fn update_tiles(&mut self, time: f32) {
        let states = self.states.map();
        for (index, (state, animation)) in states.iter_mut().zip(&self.animations).enumerate() {
            let (i, j) = (index / GRID_COLUMNS, index % GRID_COLUMNS);
            let mut x = 2.0 * (j as f32 - (0.5 * GRID_COLUMNS as f32 - 1.0));
            if i % 2 == 1 {
                x += 1.0;
            }
            let y = 1.5 * (i as f32 - 0.5 * (GRID_ROWS - 1) as f32);
            let (angle, height) = animation.pose(time);

            let transform = TransformFactory::translation(&Vector3::new(x, y, height))
                * TransformFactory::rotation_z(animation.flop as f32 * FRAC_PI_2)
                * TransformFactory::rotation_x(angle);
            *state = InstanceState::new(transform, Rgba::new(1.0, 1.0, 1.0, 1.0));
        }
    }
}

impl Demo for FlipTilingDemo {
    fn update(&mut self, dt: f32) {
        self.time += dt;
    }

    fn render(&mut self, target: &mut FrameBuffer) {
        self.update_tiles(self.time.rem_euclid(self.cycle_duration));
        let model = TransformFactory::rotation_z(FRAC_PI_4);

        // 阴影
        let light_position = Vector3::new(-6.0, 4.0, 6.0) * 2.5;
        let light_view_projection = TransformFactory::ortho_square(15.0, 1.0, 50.0)
            * look_at_origin(light_position);
        self.shadow.clear();
        let depth = DepthShader::new(light_view_projection, model).with_instances(self.states.as_slice());
        Renderer::new(PipelineState::default().with_polygon_offset(4.0, 4.0)).draw_arrays_instanced(
            &mut self.shadow,
            &depth,
            &self.tile,
            Primitive::Triangles,
            self.states.len(),
        );

        // 场景
        target.clear(Rgba::new(0.0, 0.0, 0.0, 0.0));
        let eye = Vector3::new(0.0, -6.0, 15.0) * 1.5;
        let lights = [Light::new(light_position, light_view_projection)];
        let shader = PhongShader::new(&self.program, model, camera(self.aspect, eye), eye, &lights)
            .with_shadows(ShadowMaps::Single(&self.shadow))
            .with_instances(self.states.as_slice());
        Renderer::new(PipelineState::default()).draw_arrays_instanced(
            target,
            &shader,
            &self.tile,
            Primitive::Triangles,
            self.states.len(),
        );
    }
}
