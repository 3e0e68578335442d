use super::{camera, gray};
use crate::core::demo::{Demo, DemoContext};
use crate::core::frame_buffer::FrameBuffer;
use crate::core::geometry::Geometry;
use crate::core::rasterizer::{BlendMode, PipelineState, Primitive, Renderer};
use crate::core::shader::ShaderProgram;
use crate::error::Result;
use crate::geometry::bsp::{ExplodeTiming, SliceOptions, SliceTree, cube_mesh, triangulate};
use crate::geometry::transform::TransformFactory;
use crate::geometry::vertex::ColoredVertex;
use crate::shaders::{LambertParams, LambertShader, Transforms};
use log::info;
use nalgebra::Vector3;
use rand::Rng;
use std::f32::consts::TAU;

/// 随机切分的立方体及其每个碎块的几何体
pub(crate) struct SlicedCube {
    pub tree: SliceTree,
    pub pieces: Vec<Geometry<ColoredVertex>>,
}

impl SlicedCube {
    pub fn build<R: Rng>(options: &SliceOptions, rng: &mut R) -> Self {
        let tree = SliceTree::build(cube_mesh(1.0, Vector3::repeat(1.0)), options, rng);
        let pieces = tree
            .leaves()
            .iter()
            .map(|leaf| Geometry::from_vertices(&triangulate(leaf)))
            .collect();
        Self { tree, pieces }
    }
}

/// 被随机平面反复切开的立方体，碎块沿切面法线分开再合拢
pub struct SlicesDemo {
    program: ShaderProgram<LambertParams>,
    cube: SlicedCube,
    aspect: f32,
    cycle_duration: f32,
    time: f32,
}

impl SlicesDemo {
    pub fn new(ctx: &mut DemoContext) -> Result<Self> {
        let options = SliceOptions {
            cycle_duration: ctx.cycle_duration(),
            timing: ExplodeTiming::default()
                .with_tweens(ctx.settings().explode_tween, ctx.settings().implode_tween),
            ..SliceOptions::default()
        };
        let cube = SlicedCube::build(&options, ctx.rng());
        info!("切分完成: {} 个碎块", cube.pieces.len());
        Ok(Self {
            program: ctx.load_program()?,
            cube,
            aspect: ctx.aspect(),
            cycle_duration: ctx.cycle_duration(),
            time: 0.0,
        })
    }
}

impl Demo for SlicesDemo {
    fn update(&mut self, dt: f32) {
        self.time += dt;
    }

    fn render(&mut self, target: &mut FrameBuffer) {
        target.clear(gray(0.75));

        let view_projection = camera(self.aspect, Vector3::new(3.5, -3.5, 3.5));
        let angle = 0.3 * (self.time * TAU / self.cycle_duration).cos();
        let model = TransformFactory::rotation(&Vector3::new(-1.0, 2.0, 1.0), angle);
        let time = self.time.rem_euclid(self.cycle_duration);

        let renderer = Renderer::new(PipelineState::default().with_blend(BlendMode::Alpha));
        for (leaf, transform) in self.cube.tree.leaf_transforms(&model, time) {
            let shader = LambertShader::new(&self.program, Transforms::new(transform, &view_projection))
                .with_light(Vector3::new(5.0, -5.0, 5.0))
                .with_vertex_color(true);
            renderer.draw(target, &shader, &self.cube.pieces[leaf], Primitive::Triangles);
        }
    }
}
