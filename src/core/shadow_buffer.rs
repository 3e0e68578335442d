use crate::core::frame_buffer::{DEPTH_CLEAR, RenderTarget, TargetPlanes};
use nalgebra::{Matrix4, Vector2, Vector3, Vector4};
use rayon::prelude::*;

/// 纯深度渲染目标，用作阴影贴图
#[derive(Debug)]
pub struct ShadowBuffer {
    pub width: usize,
    pub height: usize,
    depth_buffer: Vec<f32>,
}

impl ShadowBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            depth_buffer: vec![DEPTH_CLEAR; width * height],
        }
    }

    pub fn clear(&mut self) {
        self.depth_buffer
            .par_iter_mut()
            .for_each(|d| *d = DEPTH_CLEAR);
    }

    pub fn depth(&self, x: usize, y: usize) -> f32 {
        self.depth_buffer[y * self.width + x]
    }

    /// 深度比较采样（LEQUAL），2x2 双线性 PCF，边缘钳制
    ///
    /// 返回受光比例：1.0 完全受光，0.0 完全处于阴影中。
    pub fn sample_compare(&self, uv: Vector2<f32>, reference: f32) -> f32 {
        if self.width == 0 || self.height == 0 || reference > DEPTH_CLEAR {
            return 1.0;
        }
        let x = uv.x * self.width as f32 - 0.5;
        let y = uv.y * self.height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;

        let lit = |tx: f32, ty: f32| {
            let tx = (tx.max(0.0) as usize).min(self.width - 1);
            let ty = (ty.max(0.0) as usize).min(self.height - 1);
            if reference <= self.depth_buffer[ty * self.width + tx] {
                1.0
            } else {
                0.0
            }
        };

        let top = lit(x0, y0) * (1.0 - fx) + lit(x0 + 1.0, y0) * fx;
        let bottom = lit(x0, y0 + 1.0) * (1.0 - fx) + lit(x0 + 1.0, y0 + 1.0) * fx;
        top * (1.0 - fy) + bottom * fy
    }
}

impl RenderTarget for ShadowBuffer {
    fn planes(&mut self) -> TargetPlanes<'_> {
        TargetPlanes {
            width: self.width,
            height: self.height,
            color: None,
            depth: &mut self.depth_buffer,
        }
    }
}

/// 分层阴影缓冲（纹理数组），每层对应一个光源
#[derive(Debug)]
pub struct MultiShadowBuffer {
    layers: Vec<ShadowBuffer>,
}

impl MultiShadowBuffer {
    pub fn new(width: usize, height: usize, layers: usize) -> Self {
        Self {
            layers: (0..layers).map(|_| ShadowBuffer::new(width, height)).collect(),
        }
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, index: usize) -> &ShadowBuffer {
        &self.layers[index]
    }

    /// 取出某一层作为绘制目标
    pub fn layer_mut(&mut self, index: usize) -> &mut ShadowBuffer {
        &mut self.layers[index]
    }

    pub fn clear(&mut self) {
        self.layers.iter_mut().for_each(ShadowBuffer::clear);
    }

    pub fn sample_compare(&self, layer: usize, uv: Vector2<f32>, reference: f32) -> f32 {
        self.layers
            .get(layer)
            .map_or(1.0, |buffer| buffer.sample_compare(uv, reference))
    }
}

/// 把世界坐标投影到光源空间，返回 (u, v, depth)
///
/// 与光栅化器的约定一致：u/v 原点在左上角，深度映射到 [0, 1]。
pub fn shadow_coord(light_view_projection: &Matrix4<f32>, world: &Vector3<f32>) -> Vector3<f32> {
    let clip: Vector4<f32> = light_view_projection * world.push(1.0);
    let w = if clip.w.abs() > 1e-8 { clip.w } else { 1e-8 };
    let ndc = clip.xyz() / w;
    Vector3::new(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5, ndc.z * 0.5 + 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_occluded() -> ShadowBuffer {
        // 左半边有遮挡物，深度 0.3
        let mut buffer = ShadowBuffer::new(4, 4);
        let planes = buffer.planes();
        for y in 0..4 {
            for x in 0..2 {
                planes.depth[y * 4 + x] = 0.3;
            }
        }
        buffer
    }

    #[test]
    fn compare_reports_lit_and_shadowed_texels() {
        let buffer = half_occluded();
        assert_eq!(buffer.sample_compare(Vector2::new(0.125, 0.5), 0.6), 0.0);
        assert_eq!(buffer.sample_compare(Vector2::new(0.875, 0.5), 0.6), 1.0);
        assert_eq!(buffer.sample_compare(Vector2::new(0.125, 0.5), 0.2), 1.0);
    }

    #[test]
    fn compare_filters_across_the_edge() {
        let buffer = half_occluded();
        let value = buffer.sample_compare(Vector2::new(0.5, 0.5), 0.6);
        assert!((value - 0.5).abs() < 1e-6);
    }

    #[test]
    fn beyond_far_plane_is_lit() {
        let buffer = half_occluded();
        assert_eq!(buffer.sample_compare(Vector2::new(0.1, 0.1), 1.5), 1.0);
    }

    #[test]
    fn layers_are_independent() {
        let mut multi = MultiShadowBuffer::new(2, 2, 3);
        multi.layer_mut(1).planes().depth.fill(0.1);
        assert_eq!(multi.layer_count(), 3);
        assert_eq!(multi.sample_compare(0, Vector2::new(0.5, 0.5), 0.5), 1.0);
        assert_eq!(multi.sample_compare(1, Vector2::new(0.5, 0.5), 0.5), 0.0);
        assert_eq!(multi.sample_compare(7, Vector2::new(0.5, 0.5), 0.5), 1.0);

        multi.clear();
        assert_eq!(multi.layer(1).depth(0, 0), DEPTH_CLEAR);
    }

    #[test]
    fn shadow_coord_maps_ndc_to_texture_space() {
        let identity = Matrix4::identity();
        let coord = shadow_coord(&identity, &Vector3::new(1.0, 1.0, 0.0));
        assert_eq!(coord, Vector3::new(1.0, 0.0, 0.5));
    }
}
