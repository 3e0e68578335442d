use super::{Transforms, facing_normal, fract, lambert_term};
use crate::core::frame_buffer::Rgba;
use crate::core::shader::{Fragment, ProgramParams, Shader, ShaderProgram, VertexOutput};
use crate::geometry::transform::{to_clip, transform_point};
use crate::geometry::vertex::SurfaceVertex;
use nalgebra::{Matrix4, Vector2, Vector3};
use serde::Deserialize;
use std::marker::PhantomData;

/// 漫反射程序的常量
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LambertParams {
    pub ambient: f32,
    pub diffuse: f32,
    /// 棋盘格在 u / v 方向上的重复次数
    pub checker_frequency: [f32; 2],
    /// 空间条纹每单位长度的重复次数
    pub band_frequency: f32,
    /// 暗色条纹的亮度倍率
    pub stripe_shade: f32,
}

impl Default for LambertParams {
    fn default() -> Self {
        Self {
            ambient: 0.3,
            diffuse: 0.7,
            checker_frequency: [60.0, 4.0],
            band_frequency: 2.0,
            stripe_shade: 0.6,
        }
    }
}

impl ProgramParams for LambertParams {
    const NAME: &'static str = "lambert";
}

/// 程序化表面图案
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pattern {
    Plain,
    /// 按 uv 划分的棋盘格，随偏移滚动
    Checker { offset: Vector2<f32> },
    /// 物体空间中沿 y 的平行条纹，先经 `transform` 变换
    Bands { transform: Matrix4<f32> },
}

type LambertVarying = (Vector3<f32>, Vector3<f32>, Vector3<f32>, Vector2<f32>, Vector3<f32>);

/// 环境光 + 漫反射着色器，可叠加程序化图案
pub struct LambertShader<'a, V> {
    params: &'a LambertParams,
    pub transforms: Transforms,
    pub light_position: Vector3<f32>,
    pub color: Vector3<f32>,
    pub alpha: f32,
    pub pattern: Pattern,
    /// 是否把顶点颜色乘到 `color` 上
    pub vertex_color: bool,
    _vertex: PhantomData<fn() -> V>,
}

impl<'a, V: SurfaceVertex> LambertShader<'a, V> {
    pub fn new(program: &'a ShaderProgram<LambertParams>, transforms: Transforms) -> Self {
        Self {
            params: program.params(),
            transforms,
            light_position: Vector3::new(5.0, -5.0, 5.0),
            color: Vector3::repeat(1.0),
            alpha: 1.0,
            pattern: Pattern::Plain,
            vertex_color: false,
            _vertex: PhantomData,
        }
    }

    pub fn with_light(mut self, position: Vector3<f32>) -> Self {
        self.light_position = position;
        self
    }

    pub fn with_color(mut self, color: Vector3<f32>, alpha: f32) -> Self {
        self.color = color;
        self.alpha = alpha;
        self
    }

    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_vertex_color(mut self, enabled: bool) -> Self {
        self.vertex_color = enabled;
        self
    }

    fn pattern_shade(&self, uv: &Vector2<f32>, pattern_position: &Vector3<f32>) -> f32 {
        let dark = match self.pattern {
            Pattern::Plain => false,
            Pattern::Checker { offset } => {
                let [fu, fv] = self.params.checker_frequency;
                let a = fract((uv.x + offset.x) * fu) < 0.5;
                let b = fract((uv.y + offset.y) * fv) < 0.5;
                a != b
            }
            Pattern::Bands { .. } => fract(pattern_position.y * self.params.band_frequency) < 0.5,
        };
        if dark { self.params.stripe_shade } else { 1.0 }
    }
}

impl<V: SurfaceVertex> Shader for LambertShader<'_, V> {
    type Vertex = V;
    type Varying = LambertVarying;

    fn vertex(&self, vertex: &V, _instance: usize) -> VertexOutput<LambertVarying> {
        let position = vertex.position();
        let world = transform_point(&self.transforms.model, &position);
        let normal = self.transforms.normal * vertex.normal();
        let color = if self.vertex_color {
            vertex.color().component_mul(&self.color)
        } else {
            self.color
        };
        let pattern_position = match &self.pattern {
            Pattern::Bands { transform } => transform_point(transform, &position),
            _ => position,
        };
        VertexOutput::new(
            to_clip(&self.transforms.mvp, &position),
            (world, normal, color, vertex.uv(), pattern_position),
        )
    }

    fn fragment(&self, fragment: &Fragment<LambertVarying>) -> Option<Rgba> {
        let (world, normal, color, uv, pattern_position) = &fragment.varying;
        let n = facing_normal(normal, fragment.front_facing);
        let light = lambert_term(
            &n,
            world,
            &self.light_position,
            self.params.ambient,
            self.params.diffuse,
        );
        let rgb = color * light * self.pattern_shade(uv, pattern_position);
        Some(rgb.push(self.alpha))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::vertex::TexturedVertex;
    use std::path::Path;

    fn program() -> ShaderProgram<LambertParams> {
        ShaderProgram::from_source(
            Path::new("lambert.toml"),
            "[program]\nname = \"lambert\"\nstages = [\"vertex\", \"fragment\"]\n",
        )
        .unwrap()
    }

    fn fragment_at(uv: Vector2<f32>) -> Fragment<LambertVarying> {
        Fragment {
            varying: (Vector3::zeros(), Vector3::z(), Vector3::repeat(1.0), uv, Vector3::zeros()),
            coord: Vector2::zeros(),
            depth: 0.5,
            front_facing: true,
        }
    }

    #[test]
    fn light_facing_surface_is_fully_lit() {
        let program = program();
        let shader: LambertShader<TexturedVertex> =
            LambertShader::new(&program, Transforms::new(Matrix4::identity(), &Matrix4::identity()))
                .with_light(Vector3::new(0.0, 0.0, 10.0))
                .with_color(Vector3::new(1.0, 0.5, 0.0), 0.5);
        let vertex = TexturedVertex::new(Vector3::zeros(), Vector3::z(), Vector2::zeros());
        let fragment = Fragment {
            varying: shader.vertex(&vertex, 0).varying,
            ..fragment_at(Vector2::zeros())
        };
        let color = shader.fragment(&fragment).unwrap();
        assert!((color.x - 1.0).abs() < 1e-5);
        assert!((color.y - 0.5).abs() < 1e-5);
        assert_eq!(color.w, 0.5);
    }

    #[test]
    fn checker_alternates_and_scrolls() {
        let program = program();
        let [fu, _] = program.params().checker_frequency;
        let shader: LambertShader<TexturedVertex> =
            LambertShader::new(&program, Transforms::new(Matrix4::identity(), &Matrix4::identity()))
                .with_light(Vector3::new(0.0, 0.0, 10.0))
                .with_pattern(Pattern::Checker { offset: Vector2::zeros() });
        let cell = 1.0 / fu;
        let a = shader.fragment(&fragment_at(Vector2::new(0.25 * cell, 0.01))).unwrap();
        let b = shader.fragment(&fragment_at(Vector2::new(0.75 * cell, 0.01))).unwrap();
        assert!(a.x > b.x);

        let scrolled = shader.with_pattern(Pattern::Checker {
            offset: Vector2::new(0.5 * cell, 0.0),
        });
        let c = scrolled.fragment(&fragment_at(Vector2::new(0.25 * cell, 0.01))).unwrap();
        assert!((c.x - b.x).abs() < 1e-6);
    }
}
