use super::{BandTarget, CullMode, PipelineState, RowSpan, ScreenVertex};
use crate::core::rasterizer::varying::Varying;
use crate::core::shader::Shader;
use crate::geometry::interpolation::{
    covered_barycentric, edge_function, perspective_weights, snap_to_subpixel,
};
use nalgebra::Point2;

/// glPolygonOffset 中 units 对应的最小可分辨深度差（24 位深度）
const DEPTH_UNIT: f32 = 1.0 / (1 << 24) as f32;

/// 完成设置、可直接光栅化的屏幕空间三角形
pub struct ScreenTriangle<V> {
    /// 已调整为正向环绕的顶点
    vertices: [ScreenVertex<V>; 3],
    snapped: [Point2<f64>; 3],
    area_x2: f64,
    min_x: usize,
    max_x: usize,
    pub(crate) rows: RowSpan,
    front_facing: bool,
    depth_offset: f32,
}

impl<V: Varying> ScreenTriangle<V> {
    /// 三角形设置：朝向判定、剔除、包围盒与多边形偏移
    ///
    /// 完全在屏幕外、退化或被剔除时返回 None。
    pub fn setup(
        vertices: [ScreenVertex<V>; 3],
        width: usize,
        height: usize,
        state: &PipelineState,
    ) -> Option<Self> {
        let mut snapped = vertices
            .each_ref()
            .map(|v| Point2::new(snap_to_subpixel(v.x), snap_to_subpixel(v.y)));
        let area_x2 = edge_function(snapped[0], snapped[1], snapped[2]);
        if area_x2 == 0.0 || !area_x2.is_finite() {
            return None;
        }

        // 屏幕 y 轴向下，NDC 中的逆时针在这里面积为负
        let front_facing = area_x2 < 0.0;
        match state.cull {
            CullMode::Back if !front_facing => return None,
            CullMode::Front if front_facing => return None,
            _ => {}
        }

        let min_xf = vertices.iter().map(|v| v.x).fold(f32::INFINITY, f32::min);
        let max_xf = vertices.iter().map(|v| v.x).fold(f32::NEG_INFINITY, f32::max);
        let min_yf = vertices.iter().map(|v| v.y).fold(f32::INFINITY, f32::min);
        let max_yf = vertices.iter().map(|v| v.y).fold(f32::NEG_INFINITY, f32::max);
        if max_xf < 0.0 || max_yf < 0.0 || min_xf >= width as f32 || min_yf >= height as f32 {
            return None;
        }

        let depth_offset = match state.polygon_offset {
            Some((factor, units)) => {
                let [v0, v1, v2] = &vertices;
                let area = (v1.x - v0.x) * (v2.y - v0.y) - (v2.x - v0.x) * (v1.y - v0.y);
                let (dz1, dz2) = (v1.z - v0.z, v2.z - v0.z);
                let dzdx = (dz1 * (v2.y - v0.y) - dz2 * (v1.y - v0.y)) / area;
                let dzdy = (dz2 * (v1.x - v0.x) - dz1 * (v2.x - v0.x)) / area;
                let slope = dzdx.abs().max(dzdy.abs());
                let slope = if slope.is_finite() { slope } else { 0.0 };
                factor * slope + units * DEPTH_UNIT
            }
            None => 0.0,
        };

        let mut vertices = vertices;
        let mut area_x2 = area_x2;
        if area_x2 < 0.0 {
            vertices.swap(1, 2);
            snapped.swap(1, 2);
            area_x2 = -area_x2;
        }

        Some(Self {
            vertices,
            snapped,
            area_x2,
            min_x: min_xf.floor().max(0.0) as usize,
            max_x: (max_xf.ceil() as usize).min(width - 1),
            rows: RowSpan {
                min_y: min_yf.floor().max(0.0) as usize,
                max_y: (max_yf.ceil() as usize).min(height - 1),
            },
            front_facing,
            depth_offset,
        })
    }

    /// 在一个条带内扫描包围盒并着色被覆盖的像素
    pub fn rasterize<S: Shader<Varying = V>>(
        &self,
        band: &mut BandTarget<'_>,
        shader: &S,
        state: &PipelineState,
    ) {
        let [v0, v1, v2] = &self.vertices;
        let [p0, p1, p2] = self.snapped;
        let inv_w = [v0.inv_w, v1.inv_w, v2.inv_w];
        let y_start = self.rows.min_y.max(band.y0);
        let y_end = (self.rows.max_y + 1).min(band.y1);

        for y in y_start..y_end {
            for x in self.min_x..=self.max_x {
                let center = Point2::new(x as f64 + 0.5, y as f64 + 0.5);
                let Some(bary) = covered_barycentric(center, p0, p1, p2, self.area_x2) else {
                    continue;
                };
                let depth = bary.x * v0.z + bary.y * v1.z + bary.z * v2.z + self.depth_offset;
                band.shade(shader, state, x, y, depth, self.front_facing, || {
                    let weights = perspective_weights(bary, inv_w);
                    V::interpolate([&v0.varying, &v1.varying, &v2.varying], weights)
                });
            }
        }
    }
}
