use super::{camera, gray, wobble};
use crate::core::buffer::{Buffer, BufferTarget};
use crate::core::demo::{Demo, DemoContext};
use crate::core::frame_buffer::{FrameBuffer, Rgba};
use crate::core::geometry::Geometry;
use crate::core::rasterizer::{BlendMode, CullMode, PipelineState, Primitive, Renderer};
use crate::core::shader::ShaderProgram;
use crate::error::Result;
use crate::geometry::shapes;
use crate::geometry::transform::TransformFactory;
use crate::geometry::vertex::NormalVertex;
use crate::shaders::{InstanceState, Light, PhongParams, PhongShader};
use crate::utils::tween::{in_quadratic, out_bounce};
use nalgebra::{Matrix4, Vector3};
use rand::Rng;

const GRID_SIZE: usize = 5;
const CELL_SIZE: f32 = 1.0 / GRID_SIZE as f32;
const COLLAPSE_DURATION: f32 = 0.5;
const EXPANSION_START: f32 = 1.2;
const EXPANSION_DURATION: f32 = 1.5;
const CENTER: usize = (GRID_SIZE / 2) * GRID_SIZE * GRID_SIZE + (GRID_SIZE / 2) * GRID_SIZE + GRID_SIZE / 2;

/// 5x5x5 的方块依次随机塌缩消失，中心方块弹跳着长大填满整个网格
pub struct CollapseDemo {
    program: ShaderProgram<PhongParams>,
    cube: Geometry<NormalVertex>,
    states: Buffer<InstanceState>,
    /// 每个方块开始塌缩的时刻，取自 U[0.5, 1.5)
    collapse_start: Vec<f32>,
    aspect: f32,
    cycle_duration: f32,
    time: f32,
}

/// 返回 (缩放, 不透明度)
fn cell_state(index: usize, start: f32, time: f32) -> (f32, f32) {
    if index == CENTER {
        let scale = if time < EXPANSION_START {
            1.0
        } else if time > EXPANSION_START + EXPANSION_DURATION {
            GRID_SIZE as f32
        } else {
            let t = (time - EXPANSION_START) / EXPANSION_DURATION;
            1.0 + out_bounce(t) * (GRID_SIZE as f32 - 1.0)
        };
        return (scale, 1.0);
    }

    if time < start {
        (1.0, 1.0)
    } else if time > start + COLLAPSE_DURATION {
        (0.0, 0.0)
    } else {
        let t = (time - start) / COLLAPSE_DURATION;
        (in_quadratic(1.0 - t), 1.0 - t)
    }
}

impl CollapseDemo {
    pub fn new(ctx: &mut DemoContext) -> Result<Self> {
        let count = GRID_SIZE.pow(3);
        let collapse_start = (0..count)
            .map(|_| ctx.rng().random_range(0.5..1.5))
            .collect();
        Ok(Self {
            program: ctx.load_program()?,
            cube: Geometry::from_vertices(&shapes::cube(1.0)),
            states: Buffer::with_len(BufferTarget::ShaderStorage, count),
            collapse_start,
            aspect: ctx.aspect(),
            cycle_duration: ctx.cycle_duration(),
            time: 0.0,
        })
    }

    fn update_grid_state(&mut self) {
        let half = 0.5 * (GRID_SIZE - 1) as f32;
        let time = self.time.rem_euclid(self.cycle_duration);
        let states = self.states.map();
        for (index, (state, &start)) in states.iter_mut().zip(&self.collapse_start).enumerate() {
            let (i, j, k) = (index / (GRID_SIZE * GRID_SIZE), (index / GRID_SIZE) % GRID_SIZE, index % GRID_SIZE);
            let position = Vector3::new(i as f32 - half, j as f32 - half, k as f32 - half) * CELL_SIZE;
            let (scale, alpha) = cell_state(index, start, time);
            *state = InstanceState::new(
                TransformFactory::translation(&position) * TransformFactory::scaling(scale * 0.5 * CELL_SIZE),
                Rgba::new(1.0, 0.0, 0.0, alpha),
            );
        }
    }
}

impl Demo for CollapseDemo {
    fn update(&mut self, dt: f32) {
        self.time += dt;
    }

    fn render(&mut self, target: &mut FrameBuffer) {
        self.update_grid_state();
        target.clear(gray(0.75));

        let eye = Vector3::new(1.5, -1.5, 1.5);
        let view_projection = camera(self.aspect, eye);
        let model = wobble(Vector3::new(-1.0, 1.0, 1.0), self.time, self.cycle_duration);
        let lights = [Light::new(Vector3::new(5.0, -5.0, 5.0), Matrix4::identity())];
        let shader = PhongShader::new(&self.program, model, view_projection, eye, &lights)
            .with_instances(self.states.as_slice());

        let state = PipelineState::default()
            .with_cull(CullMode::Back)
            .with_blend(BlendMode::Alpha);
        Renderer::new(state).draw_arrays_instanced(
            target,
            &shader,
            &self.cube,
            Primitive::Triangles,
            self.states.len(),
        );
    }
}
