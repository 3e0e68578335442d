use super::facing_normal;
use crate::core::frame_buffer::Rgba;
use crate::core::shader::{Fragment, ProgramParams, Shader, ShaderProgram, VertexOutput};
use crate::core::shadow_buffer::{MultiShadowBuffer, ShadowBuffer, shadow_coord};
use crate::geometry::transform::{to_clip, transform_point};
use crate::geometry::vertex::SurfaceVertex;
use nalgebra::{Matrix3, Matrix4, Vector2, Vector3, Vector4};
use serde::Deserialize;
use std::marker::PhantomData;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhongParams {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
    /// 完全处于阴影时去掉的直接光比例
    pub shadow_strength: f32,
    /// 深度比较前从参考深度中减去的偏移
    pub shadow_bias: f32,
}

impl Default for PhongParams {
    fn default() -> Self {
        Self {
            ambient: 0.2,
            diffuse: 0.8,
            specular: 0.3,
            shininess: 32.0,
            shadow_strength: 0.6,
            shadow_bias: 0.0005,
        }
    }
}

impl ProgramParams for PhongParams {
    const NAME: &'static str = "phong";
}

/// 每个实例的状态，存放在 ShaderStorage 缓冲中
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceState {
    pub transform: Matrix4<f32>,
    pub color: Rgba,
}

impl Default for InstanceState {
    fn default() -> Self {
        Self {
            transform: Matrix4::identity(),
            color: Rgba::new(1.0, 1.0, 1.0, 1.0),
        }
    }
}

impl InstanceState {
    pub fn new(transform: Matrix4<f32>, color: Rgba) -> Self {
        Self { transform, color }
    }
}

/// 点光源；`view_projection` 用于阴影查找
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vector3<f32>,
    pub view_projection: Matrix4<f32>,
}

impl Light {
    pub fn new(position: Vector3<f32>, view_projection: Matrix4<f32>) -> Self {
        Self {
            position,
            view_projection,
        }
    }
}

/// 阴影贴图来源：单张对应第一个光源，分层按光源序号取层
#[derive(Debug, Clone, Copy, Default)]
pub enum ShadowMaps<'a> {
    #[default]
    None,
    Single(&'a ShadowBuffer),
    Layered(&'a MultiShadowBuffer),
}

impl ShadowMaps<'_> {
    fn lit(&self, light: usize, coord: &Vector3<f32>, bias: f32) -> f32 {
        let uv = Vector2::new(coord.x, coord.y);
        if !(0.0..=1.0).contains(&uv.x) || !(0.0..=1.0).contains(&uv.y) {
            return 1.0;
        }
        let reference = coord.z - bias;
        match self {
            ShadowMaps::None => 1.0,
            ShadowMaps::Single(buffer) if light == 0 => buffer.sample_compare(uv, reference),
            ShadowMaps::Single(_) => 1.0,
            ShadowMaps::Layered(buffers) => buffers.sample_compare(light, uv, reference),
        }
    }
}

type PhongVarying = (Vector3<f32>, Vector3<f32>, Vector4<f32>);

/// Blinn-Phong 着色器，支持实例化与多光源阴影
pub struct PhongShader<'a, V> {
    params: &'a PhongParams,
    pub model: Matrix4<f32>,
    pub view_projection: Matrix4<f32>,
    pub eye_position: Vector3<f32>,
    pub lights: &'a [Light],
    pub shadows: ShadowMaps<'a>,
    /// 有值时按实例号取变换与颜色
    pub instances: Option<&'a [InstanceState]>,
    pub color: Rgba,
    _vertex: PhantomData<fn() -> V>,
}

impl<'a, V: SurfaceVertex> PhongShader<'a, V> {
    pub fn new(
        program: &'a ShaderProgram<PhongParams>,
        model: Matrix4<f32>,
        view_projection: Matrix4<f32>,
        eye_position: Vector3<f32>,
        lights: &'a [Light],
    ) -> Self {
        Self {
            params: program.params(),
            model,
            view_projection,
            eye_position,
            lights,
            shadows: ShadowMaps::None,
            instances: None,
            color: Rgba::new(1.0, 1.0, 1.0, 1.0),
            _vertex: PhantomData,
        }
    }

    pub fn with_shadows(mut self, shadows: ShadowMaps<'a>) -> Self {
        self.shadows = shadows;
        self
    }

    pub fn with_instances(mut self, instances: &'a [InstanceState]) -> Self {
        self.instances = Some(instances);
        self
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    fn instance(&self, index: usize) -> InstanceState {
        self.instances
            .and_then(|instances| instances.get(index).copied())
            .unwrap_or_default()
    }
}

impl<V: SurfaceVertex> Shader for PhongShader<'_, V> {
    type Vertex = V;
    type Varying = PhongVarying;

    fn vertex(&self, vertex: &V, instance: usize) -> VertexOutput<PhongVarying> {
        let state = self.instance(instance);
        let model = self.model * state.transform;
        let world = transform_point(&model, &vertex.position());
        // 实例变换只含旋转和均匀缩放，上三角 3x3 即可变换法线
        let linear: Matrix3<f32> = model.fixed_view::<3, 3>(0, 0).into_owned();
        let normal = linear * vertex.normal();
        let color = self
            .color
            .component_mul(&state.color)
            .component_mul(&vertex.color().push(1.0));
        VertexOutput::new(
            to_clip(&self.view_projection, &world),
            (world, normal, color),
        )
    }

    fn fragment(&self, fragment: &Fragment<PhongVarying>) -> Option<Rgba> {
        let (world, normal, color) = &fragment.varying;
        let p = self.params;
        let n = facing_normal(normal, fragment.front_facing);
        let view = (self.eye_position - world)
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3::z);

        let mut direct = 0.0;
        let mut highlight = 0.0;
        for (index, light) in self.lights.iter().enumerate() {
            let Some(l) = (light.position - world).try_normalize(1e-12) else {
                continue;
            };
            let coord = shadow_coord(&light.view_projection, world);
            let lit = self.shadows.lit(index, &coord, p.shadow_bias);
            let shadow = 1.0 - p.shadow_strength * (1.0 - lit);

            let half = (l + view).try_normalize(1e-12).unwrap_or(n);
            direct += shadow * p.diffuse * n.dot(&l).max(0.0);
            highlight += lit * p.specular * n.dot(&half).max(0.0).powf(p.shininess);
        }
        let count = self.lights.len().max(1) as f32;
        let rgb = color.xyz() * (p.ambient + direct / count) + Vector3::repeat(highlight / count);
        Some(rgb.push(color.w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame_buffer::RenderTarget;
    use crate::geometry::vertex::NormalVertex;
    use std::path::Path;

    fn program() -> ShaderProgram<PhongParams> {
        ShaderProgram::from_source(
            Path::new("phong.toml"),
            "[program]\nname = \"phong\"\nstages = [\"vertex\", \"fragment\"]\n[params]\nspecular = 0.0\n",
        )
        .unwrap()
    }

    fn fragment_at(world: Vector3<f32>) -> Fragment<PhongVarying> {
        Fragment {
            varying: (world, Vector3::z(), Rgba::new(1.0, 1.0, 1.0, 1.0)),
            coord: Vector2::zeros(),
            depth: 0.5,
            front_facing: true,
        }
    }

    #[test]
    fn instances_pick_transform_and_color() {
        let program = program();
        let lights = [Light::new(Vector3::new(0.0, 0.0, 5.0), Matrix4::identity())];
        let instances = [
            InstanceState::default(),
            InstanceState::new(
                Matrix4::new_translation(&Vector3::new(2.0, 0.0, 0.0)),
                Rgba::new(1.0, 0.0, 0.0, 0.5),
            ),
        ];
        let shader: PhongShader<NormalVertex> = PhongShader::new(
            &program,
            Matrix4::identity(),
            Matrix4::identity(),
            Vector3::new(0.0, 0.0, 5.0),
            &lights,
        )
        .with_instances(&instances);

        let vertex = NormalVertex::new(Vector3::zeros(), Vector3::z());
        let first = shader.vertex(&vertex, 0);
        let second = shader.vertex(&vertex, 1);
        assert_eq!(first.varying.0, Vector3::zeros());
        assert_eq!(second.varying.0, Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(second.varying.2, Rgba::new(1.0, 0.0, 0.0, 0.5));
    }

    #[test]
    fn shadowed_fragments_are_darker() {
        let program = program();
        let lights = [Light::new(Vector3::new(0.0, 0.0, 5.0), Matrix4::identity())];
        let mut occluder = ShadowBuffer::new(4, 4);
        occluder.planes().depth.fill(0.0);
        let open = ShadowBuffer::new(4, 4);

        let shade = |buffer: &ShadowBuffer| {
            let shader: PhongShader<NormalVertex> = PhongShader::new(
                &program,
                Matrix4::identity(),
                Matrix4::identity(),
                Vector3::new(0.0, 0.0, 5.0),
                &lights,
            )
            .with_shadows(ShadowMaps::Single(buffer));
            shader.fragment(&fragment_at(Vector3::new(0.0, 0.0, 0.5))).unwrap()
        };

        let lit = shade(&open);
        let shadowed = shade(&occluder);
        assert!(lit.x > shadowed.x);
        let p = program.params();
        let expected = p.ambient + (1.0 - p.shadow_strength) * p.diffuse;
        assert!((shadowed.x - expected).abs() < 1e-4);
    }
}
