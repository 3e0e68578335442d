use super::slices::SlicedCube;
use super::{camera, gray, look_at_origin};
use crate::core::demo::{Demo, DemoContext};
use crate::core::frame_buffer::FrameBuffer;
use crate::core::geometry::Geometry;
use crate::core::rasterizer::{PipelineState, Primitive, Renderer};
use crate::core::shader::ShaderProgram;
use crate::core::shadow_buffer::ShadowBuffer;
use crate::error::Result;
use crate::geometry::bsp::{ExplodeTiming, SliceOptions};
use crate::geometry::shapes;
use crate::geometry::transform::TransformFactory;
use crate::geometry::vertex::NormalVertex;
use crate::shaders::{DepthShader, Light, PhongParams, PhongShader, ShadowMaps};
use log::debug;
use nalgebra::{Matrix4, Vector3};
use rand::rngs::StdRng;
use std::f32::consts::{FRAC_PI_4, TAU};

const SHADOW_SIZE: usize = 2048;

/// 切片立方体悬在地面上方投下阴影，每个循环重新随机切分
pub struct SlicesShadowsDemo {
    program: ShaderProgram<PhongParams>,
    cube: SlicedCube,
    plane: Geometry<NormalVertex>,
    shadow: ShadowBuffer,
    options: SliceOptions,
    rng: StdRng,
    aspect: f32,
    cycle_duration: f32,
    /// 当前循环内的时间
    time: f32,
}

impl SlicesShadowsDemo {
    pub fn new(ctx: &mut DemoContext) -> Result<Self> {
        let options = SliceOptions {
            cycle_duration: ctx.cycle_duration(),
            timing: ExplodeTiming::default()
                .with_tweens(ctx.settings().explode_tween, ctx.settings().implode_tween),
            cap_color: Vector3::new(1.0, 1.0, 0.0),
            ..SliceOptions::default()
        };
        let mut rng = ctx.fork_rng();
        Ok(Self {
            program: ctx.load_program()?,
            cube: SlicedCube::build(&options, &mut rng),
            plane: Geometry::from_vertices(&shapes::plane(
                Vector3::new(0.0, 0.0, -2.5),
                Vector3::new(10.0, 0.0, 0.0),
                Vector3::new(0.0, 10.0, 0.0),
            )),
            shadow: ShadowBuffer::new(SHADOW_SIZE, SHADOW_SIZE),
            options,
            rng,
            aspect: ctx.aspect(),
            cycle_duration: ctx.cycle_duration(),
            time: 0.0,
        })
    }
}

impl Demo for SlicesShadowsDemo {
    fn update(&mut self, dt: f32) {
        self.time += dt;
        if self.time >= self.cycle_duration {
            self.time -= self.cycle_duration;
            self.cube = SlicedCube::build(&self.options, &mut self.rng);
            debug!("重新切分: {} 个碎块", self.cube.pieces.len());
        }
    }

    fn render(&mut self, target: &mut FrameBuffer) {
        let light_position = Vector3::new(3.0, -3.0, 5.0);
        let light_view_projection = TransformFactory::ortho_square(5.0, 1.0, 12.5)
            * look_at_origin(light_position);
        let angle = 0.3 * (self.time * TAU / self.cycle_duration).cos();
        let model = TransformFactory::rotation(&Vector3::new(-1.0, 1.0, 1.0), angle)
            * TransformFactory::rotation_x(FRAC_PI_4)
            * TransformFactory::rotation_y(FRAC_PI_4);
        let pieces = self.cube.tree.leaf_transforms(&model, self.time);

        // 阴影
        self.shadow.clear();
        let shadow_pass = Renderer::new(PipelineState::default().with_polygon_offset(4.0, 4.0));
        let plane_depth = DepthShader::new(light_view_projection, Matrix4::identity());
        shadow_pass.draw(&mut self.shadow, &plane_depth, &self.plane, Primitive::Triangles);
        for (leaf, transform) in &pieces {
            let depth = DepthShader::new(light_view_projection, *transform);
            shadow_pass.draw(&mut self.shadow, &depth, &self.cube.pieces[*leaf], Primitive::Triangles);
        }

        // 场景
        target.clear(gray(0.75));
        let eye = Vector3::new(0.0, 0.0, 7.0);
        let view_projection = camera(self.aspect, eye);
        let lights = [Light::new(light_position, light_view_projection)];
        let shadows = ShadowMaps::Single(&self.shadow);
        let renderer = Renderer::new(PipelineState::default());

        let plane_shader = PhongShader::new(&self.program, Matrix4::identity(), view_projection, eye, &lights)
            .with_shadows(shadows);
        renderer.draw(target, &plane_shader, &self.plane, Primitive::Triangles);
        for (leaf, transform) in &pieces {
            let shader = PhongShader::new(&self.program, *transform, view_projection, eye, &lights)
                .with_shadows(shadows);
            renderer.draw(target, &shader, &self.cube.pieces[*leaf], Primitive::Triangles);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::demo_settings::DemoSettings;
    use std::path::Path;

    #[test]
    fn tree_is_rebuilt_at_the_end_of_each_cycle() {
        let mut ctx = DemoContext::new(DemoSettings {
            seed: Some(9),
            cycle_duration: 1.0,
            assets: Path::new(env!("CARGO_MANIFEST_DIR")).join("assets"),
            ..DemoSettings::default()
        });
        let mut demo = SlicesShadowsDemo::new(&mut ctx).unwrap();
        demo.update(0.75);
        assert!((demo.time - 0.75).abs() < 1e-6);
        demo.update(0.5);
        assert!((demo.time - 0.25).abs() < 1e-6);
        assert!(!demo.cube.pieces.is_empty());
    }
}
