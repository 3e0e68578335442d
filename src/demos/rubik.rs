use super::{camera, gray};
use crate::core::buffer::{Buffer, BufferTarget};
use crate::core::demo::{Demo, DemoContext};
use crate::core::frame_buffer::{FrameBuffer, Rgba};
use crate::core::geometry::Geometry;
use crate::core::rasterizer::{BlendMode, CullMode, PipelineState, Primitive, Renderer};
use crate::core::shader::ShaderProgram;
use crate::error::Result;
use crate::geometry::transform::TransformFactory;
use crate::geometry::vertex::NormalVertex;
use crate::shaders::{InstanceState, Light, PhongParams, PhongShader};
use crate::utils::tween::in_quadratic;
use log::{debug, info};
use nalgebra::{Matrix4, Vector3};
use rand::Rng;
use rand::rngs::StdRng;
use std::f32::consts::FRAC_PI_2;

const GRID_SIZE: usize = 3;
const CELL_SIZE: f32 = 1.0 / GRID_SIZE as f32;
const MOTION_DURATION: f32 = 0.25;
/// 每个切片占一位；随机掩码取自 [0, 7)，三片不会同时转动
const SLICE_MASKS: u32 = (1 << GRID_SIZE) - 1;

/// 3x3x3 魔方，每 0.25 秒随机转动若干个 x 切片
pub struct RubikDemo {
    program: ShaderProgram<PhongParams>,
    cube: Geometry<NormalVertex>,
    states: Buffer<InstanceState>,
    rng: StdRng,
    aspect: f32,
    time: f32,
    /// 正在转动的切片（位掩码）
    moving: u32,
    /// 反向转动的切片（位掩码）
    reversed: u32,
    /// 每次转动后整体绕 y 翻转 90°，让转轴交替
    flip: bool,
}

impl RubikDemo {
    pub fn new(ctx: &mut DemoContext) -> Result<Self> {
        let mesh = ctx.load_mesh("beveled-cube.obj")?;
        info!("魔方: {} 个小块, 每块 {} 个三角形", GRID_SIZE.pow(3), mesh.triangle_count());
        Ok(Self {
            program: ctx.load_program()?,
            cube: mesh.into_geometry(),
            states: Buffer::with_len(BufferTarget::ShaderStorage, GRID_SIZE.pow(3)),
            rng: ctx.fork_rng(),
            aspect: ctx.aspect(),
            time: 0.0,
            moving: 1,
            reversed: 1,
            flip: false,
        })
    }

    fn update_grid_state(&mut self) {
        let motion = in_quadratic((self.time / MOTION_DURATION).clamp(0.0, 1.0));
        let half = 0.5 * (GRID_SIZE - 1) as f32;
        let scale = TransformFactory::scaling(0.95 * 0.5 * CELL_SIZE);

        let states = self.states.map();
        for i in 0..GRID_SIZE {
            let bit = 1 << i;
            let mut angle = 0.0;
            if self.moving & bit != 0 {
                angle = motion * FRAC_PI_2;
                if self.reversed & bit != 0 {
                    angle = -angle;
                }
            }
            let slice = TransformFactory::translation(&Vector3::new((i as f32 - half) * CELL_SIZE, 0.0, 0.0))
                * TransformFactory::rotation_x(angle);

            for j in 0..GRID_SIZE {
                for k in 0..GRID_SIZE {
                    let offset = Vector3::new(0.0, j as f32 - half, k as f32 - half) * CELL_SIZE;
                    states[(i * GRID_SIZE + j) * GRID_SIZE + k] = InstanceState::new(
                        slice * TransformFactory::translation(&offset) * scale,
                        Rgba::new(1.0, 1.0, 1.0, 1.0),
                    );
                }
            }
        }
    }
}

impl Demo for RubikDemo {
    fn update(&mut self, dt: f32) {
        self.time += dt;
        while self.time >= MOTION_DURATION {
            self.flip = !self.flip;
            self.moving = self.rng.random_range(0..SLICE_MASKS);
            self.reversed = self.rng.random_range(0..SLICE_MASKS);
            self.time -= MOTION_DURATION;
            debug!("新一轮转动: moving = {:03b}, reversed = {:03b}", self.moving, self.reversed);
        }
    }

    fn render(&mut self, target: &mut FrameBuffer) {
        self.update_grid_state();
        target.clear(gray(0.75));

        let eye = Vector3::new(1.5, -1.5, 1.5);
        let view_projection = camera(self.aspect, eye);
        let model = if self.flip {
            TransformFactory::rotation_y(FRAC_PI_2)
        } else {
            Matrix4::identity()
        };
        let lights = [Light::new(Vector3::new(5.0, -5.0, 5.0), Matrix4::identity())];
        let shader = PhongShader::new(&self.program, model, view_projection, eye, &lights)
            .with_instances(self.states.as_slice());

        let state = PipelineState::default()
            .with_cull(CullMode::Back)
            .with_blend(BlendMode::Alpha);
        Renderer::new(state).draw_elements_instanced(
            target,
            &shader,
            &self.cube,
            Primitive::Triangles,
            self.states.len(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn demo() -> RubikDemo {
        let program = ShaderProgram::from_source(
            std::path::Path::new("phong.toml"),
            "[program]\nname = \"phong\"\nstages = [\"vertex\", \"fragment\"]\n",
        )
        .unwrap();
        RubikDemo {
            program,
            cube: Geometry::new(),
            states: Buffer::with_len(BufferTarget::ShaderStorage, GRID_SIZE.pow(3)),
            rng: StdRng::seed_from_u64(3),
            aspect: 1.0,
            time: 0.0,
            moving: 0b001,
            reversed: 0,
            flip: false,
        }
    }

    #[test]
    fn only_moving_slices_rotate() {
        let mut demo = demo();
        demo.time = MOTION_DURATION;
        demo.update_grid_state();
        let states = demo.states.as_slice();
        // 第 0 片转了 90°，y 轴被转到 z 轴上
        let turned = states[0].transform.transform_vector(&Vector3::y());
        assert!(turned.y.abs() < 1e-5 && turned.z > 0.0);
        let still = states[GRID_SIZE * GRID_SIZE].transform.transform_vector(&Vector3::y());
        assert!(still.z.abs() < 1e-5 && still.y > 0.0);
    }

    #[test]
    fn each_motion_flips_and_picks_new_slices() {
        let mut demo = demo();
        demo.update(MOTION_DURATION * 1.5);
        assert!(demo.flip);
        assert!(demo.moving < SLICE_MASKS && demo.reversed < SLICE_MASKS);
        assert!((demo.time - 0.5 * MOTION_DURATION).abs() < 1e-6);
    }
}
