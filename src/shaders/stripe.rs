use super::{Transforms, facing_normal, fract, lambert_term};
use crate::core::frame_buffer::Rgba;
use crate::core::shader::{Fragment, ProgramParams, Shader, ShaderProgram, VertexOutput};
use crate::geometry::transform::{to_clip, transform_point};
use crate::geometry::vertex::TexturedVertex;
use nalgebra::{Vector2, Vector3};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StripeParams {
    pub ambient: f32,
    pub diffuse: f32,
    /// 条纹在一个 u 周期内所占比例
    pub stripe_width: f32,
}

impl Default for StripeParams {
    fn default() -> Self {
        Self {
            ambient: 0.25,
            diffuse: 0.75,
            stripe_width: 0.5,
        }
    }
}

impl ProgramParams for StripeParams {
    const NAME: &'static str = "stripe";
}

/// 沿 v 的可见区间，`start > end` 时跨越 1 回绕
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRange {
    pub start: f32,
    pub end: f32,
}

impl VisibleRange {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, v: f32) -> bool {
        if self.start <= self.end {
            (self.start..=self.end).contains(&v)
        } else {
            v >= self.start || v <= self.end
        }
    }
}

type StripeVarying = (Vector3<f32>, Vector3<f32>, Vector2<f32>);

/// 圆环/缎带着色器
///
/// 开启条纹时，`fract(u)` 落在条纹宽度内的片元取 `color`，其余取 `base_color`；
/// 关闭时整个表面取 `color`。设置了可见区间时，区间外的片元被丢弃。
pub struct StripeShader<'a> {
    params: &'a StripeParams,
    pub transforms: Transforms,
    pub light_position: Vector3<f32>,
    pub color: Vector3<f32>,
    pub base_color: Vector3<f32>,
    pub alpha: f32,
    pub stripes: bool,
    pub visible: Option<VisibleRange>,
}

impl<'a> StripeShader<'a> {
    pub fn new(program: &'a ShaderProgram<StripeParams>, transforms: Transforms) -> Self {
        Self {
            params: program.params(),
            transforms,
            light_position: Vector3::new(-1.0, -1.0, 3.0),
            color: Vector3::new(1.0, 0.0, 0.0),
            base_color: Vector3::zeros(),
            alpha: 1.0,
            stripes: true,
            visible: None,
        }
    }

    pub fn with_light(mut self, position: Vector3<f32>) -> Self {
        self.light_position = position;
        self
    }

    pub fn with_color(mut self, color: Vector3<f32>) -> Self {
        self.color = color;
        self
    }

    pub fn with_base_color(mut self, base_color: Vector3<f32>) -> Self {
        self.base_color = base_color;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_stripes(mut self, stripes: bool) -> Self {
        self.stripes = stripes;
        self
    }

    pub fn with_visible_range(mut self, range: VisibleRange) -> Self {
        self.visible = Some(range);
        self
    }
}

impl Shader for StripeShader<'_> {
    type Vertex = TexturedVertex;
    type Varying = StripeVarying;

    fn vertex(&self, vertex: &TexturedVertex, _instance: usize) -> VertexOutput<StripeVarying> {
        let world = transform_point(&self.transforms.model, &vertex.position);
        let normal = self.transforms.normal * vertex.normal;
        VertexOutput::new(
            to_clip(&self.transforms.mvp, &vertex.position),
            (world, normal, vertex.uv),
        )
    }

    fn fragment(&self, fragment: &Fragment<StripeVarying>) -> Option<Rgba> {
        let (world, normal, uv) = &fragment.varying;
        if let Some(range) = &self.visible {
            if !range.contains(uv.y) {
                return None;
            }
        }

        let surface = if !self.stripes || fract(uv.x) < self.params.stripe_width {
            self.color
        } else {
            self.base_color
        };
        let n = facing_normal(normal, fragment.front_facing);
        let light = lambert_term(
            &n,
            world,
            &self.light_position,
            self.params.ambient,
            self.params.diffuse,
        );
        Some((surface * light).push(self.alpha))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix4;
    use std::path::Path;

    fn program() -> ShaderProgram<StripeParams> {
        ShaderProgram::from_source(
            Path::new("stripe.toml"),
            "[program]\nname = \"stripe\"\nstages = [\"vertex\", \"fragment\"]\n",
        )
        .unwrap()
    }

    fn fragment_at(uv: Vector2<f32>) -> Fragment<StripeVarying> {
        Fragment {
            varying: (Vector3::zeros(), Vector3::z(), uv),
            coord: Vector2::zeros(),
            depth: 0.5,
            front_facing: true,
        }
    }

    #[test]
    fn wrapped_range_spans_the_seam() {
        let range = VisibleRange::new(0.8, 0.2);
        assert!(range.contains(0.9));
        assert!(range.contains(0.1));
        assert!(!range.contains(0.5));

        let plain = VisibleRange::new(0.2, 0.6);
        assert!(plain.contains(0.4));
        assert!(!plain.contains(0.7));
    }

    #[test]
    fn fragments_outside_range_are_discarded() {
        let program = program();
        let shader = StripeShader::new(&program, Transforms::new(Matrix4::identity(), &Matrix4::identity()))
            .with_stripes(false)
            .with_visible_range(VisibleRange::new(0.1, 0.3));
        assert!(shader.fragment(&fragment_at(Vector2::new(0.0, 0.5))).is_none());
        assert!(shader.fragment(&fragment_at(Vector2::new(0.0, 0.2))).is_some());
    }

    #[test]
    fn stripes_alternate_with_base_color() {
        let program = program();
        let shader = StripeShader::new(&program, Transforms::new(Matrix4::identity(), &Matrix4::identity()))
            .with_light(Vector3::new(0.0, 0.0, 10.0))
            .with_color(Vector3::new(1.0, 0.0, 0.0))
            .with_base_color(Vector3::new(0.0, 0.0, 1.0));
        let stripe = shader.fragment(&fragment_at(Vector2::new(2.25, 0.0))).unwrap();
        let base = shader.fragment(&fragment_at(Vector2::new(2.75, 0.0))).unwrap();
        assert!(stripe.x > 0.9 && stripe.z == 0.0);
        assert!(base.z > 0.9 && base.x == 0.0);
    }
}
