use super::{camera, gray, look_at_origin};
use crate::core::demo::{Demo, DemoContext};
use crate::core::frame_buffer::FrameBuffer;
use crate::core::geometry::Geometry;
use crate::core::rasterizer::{PipelineState, Primitive, Renderer};
use crate::core::shader::ShaderProgram;
use crate::core::shadow_buffer::MultiShadowBuffer;
use crate::error::Result;
use crate::geometry::shapes;
use crate::geometry::transform::TransformFactory;
use crate::geometry::vertex::NormalVertex;
use crate::shaders::{DepthShader, Light, PhongParams, PhongShader, ShadowMaps};
use log::info;
use nalgebra::{Matrix4, Vector3};

const SHADOW_SIZE: usize = 2048;
const LIGHT_POSITIONS: [[f32; 3]; 4] = [[-4.0, 4.0, 7.0], [5.0, -5.0, 9.0], [3.0, 3.0, 6.0], [-3.0, -2.0, 8.0]];

/// 网格模型悬在平面上方，四个光源各自投下一层阴影
pub struct MultiShadowDemo {
    program: ShaderProgram<PhongParams>,
    mesh: Geometry<NormalVertex>,
    plane: Geometry<NormalVertex>,
    lights: Vec<Light>,
    shadows: MultiShadowBuffer,
    aspect: f32,
    time: f32,
}

impl MultiShadowDemo {
    pub fn new(ctx: &mut DemoContext) -> Result<Self> {
        let projection = TransformFactory::ortho_square(5.0, 1.0, 12.5);
        let lights: Vec<Light> = LIGHT_POSITIONS
            .iter()
            .map(|p| {
                let position = Vector3::from(*p);
                Light::new(position, projection * look_at_origin(position))
            })
            .collect();
        info!("{} 个投射阴影的光源", lights.len());

        Ok(Self {
            program: ctx.load_program()?,
            mesh: ctx.load_mesh("knot.obj")?.into_geometry(),
            plane: Geometry::from_vertices(&shapes::plane(
                Vector3::new(0.0, 0.0, -2.0),
                Vector3::new(3.0, 0.0, 0.0),
                Vector3::new(0.0, 4.0, 0.0),
            )),
            shadows: MultiShadowBuffer::new(SHADOW_SIZE, SHADOW_SIZE, lights.len()),
            lights,
            aspect: ctx.aspect(),
            time: 0.0,
        })
    }
}

impl Demo for MultiShadowDemo {
    fn update(&mut self, dt: f32) {
        self.time += dt;
    }

    fn render(&mut self, target: &mut FrameBuffer) {
        // 模型每秒绕 y 转一弧度
        let mesh_model = TransformFactory::rotation_y(self.time);

        // 每个光源一层阴影
        self.shadows.clear();
        let shadow_pass = Renderer::new(PipelineState::default().with_polygon_offset(4.0, 4.0));
        for (index, light) in self.lights.iter().enumerate() {
            let layer = self.shadows.layer_mut(index);
            let plane_depth = DepthShader::new(light.view_projection, Matrix4::identity());
            shadow_pass.draw(layer, &plane_depth, &self.plane, Primitive::Triangles);
            let mesh_depth = DepthShader::new(light.view_projection, mesh_model);
            shadow_pass.draw(layer, &mesh_depth, &self.mesh, Primitive::Triangles);
        }

        // 场景
        target.clear(gray(0.75));
        let eye = Vector3::new(2.0, 2.0, 7.0);
        let view_projection = camera(self.aspect, eye);
        let renderer = Renderer::new(PipelineState::default());
        for (model, geometry) in [(Matrix4::identity(), &self.plane), (mesh_model, &self.mesh)] {
            let shader = PhongShader::new(&self.program, model, view_projection, eye, &self.lights)
                .with_shadows(ShadowMaps::Layered(&self.shadows));
            renderer.draw(target, &shader, geometry, Primitive::Triangles);
        }
    }
}
