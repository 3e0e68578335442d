//! 演示用的着色器程序
//!
//! 每个程序由一个 Rust 着色器类型和 `assets/shaders/<name>.toml` 程序源组成，
//! 程序源提供光照系数、模糊权重等常量。阴影深度通道没有常量，不需要程序源。

pub mod blur;
pub mod depth;
pub mod lambert;
pub mod phong;
pub mod stripe;
pub mod unlit;

use crate::geometry::transform::compute_normal_matrix;
use nalgebra::{Matrix3, Matrix4, Vector3};

pub use blur::{BlurParams, BlurShader};
pub use depth::DepthShader;
pub use lambert::{LambertParams, LambertShader, Pattern};
pub use phong::{InstanceState, Light, PhongParams, PhongShader, ShadowMaps};
pub use stripe::{StripeParams, StripeShader, VisibleRange};
pub use unlit::{UnlitParams, UnlitShader};

/// 模型矩阵及其派生矩阵，按绘制调用计算一次
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transforms {
    pub model: Matrix4<f32>,
    pub mvp: Matrix4<f32>,
    pub normal: Matrix3<f32>,
}

impl Transforms {
    pub fn new(model: Matrix4<f32>, view_projection: &Matrix4<f32>) -> Self {
        Self {
            model,
            mvp: view_projection * model,
            normal: compute_normal_matrix(&model),
        }
    }
}

/// 双面光照：背面片元翻转法线
#[inline]
pub(crate) fn facing_normal(normal: &Vector3<f32>, front_facing: bool) -> Vector3<f32> {
    let n = normal.try_normalize(1e-12).unwrap_or_else(Vector3::z);
    if front_facing { n } else { -n }
}

/// 环境光 + 漫反射系数
#[inline]
pub(crate) fn lambert_term(
    normal: &Vector3<f32>,
    world: &Vector3<f32>,
    light_position: &Vector3<f32>,
    ambient: f32,
    diffuse: f32,
) -> f32 {
    let l = (light_position - world).try_normalize(1e-12).unwrap_or_else(Vector3::z);
    ambient + diffuse * normal.dot(&l).max(0.0)
}

/// 取小数部分，负数同样落在 [0, 1)
#[inline]
pub(crate) fn fract(x: f32) -> f32 {
    x.rem_euclid(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fract_wraps_negative_values() {
        assert!((fract(-0.25) - 0.75).abs() < 1e-6);
        assert!((fract(2.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn back_faces_flip_normal() {
        let n = Vector3::new(0.0, 0.0, 2.0);
        assert_eq!(facing_normal(&n, true), Vector3::z());
        assert_eq!(facing_normal(&n, false), -Vector3::z());
    }

    #[test]
    fn lambert_term_is_ambient_when_light_is_behind() {
        let term = lambert_term(
            &Vector3::z(),
            &Vector3::zeros(),
            &Vector3::new(0.0, 0.0, -5.0),
            0.25,
            0.75,
        );
        assert!((term - 0.25).abs() < 1e-6);
    }
}
