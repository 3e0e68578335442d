use super::{BandTarget, PipelineState, RowSpan, ScreenVertex};
use crate::core::rasterizer::varying::Varying;
use crate::core::shader::Shader;

/// 屏幕空间线段，按 DDA 步进，线宽沿次轴方向扩展
pub struct ScreenLine<V> {
    vertices: [ScreenVertex<V>; 2],
    thickness: usize,
    width: usize,
    pub(crate) rows: RowSpan,
}

impl<V: Varying> ScreenLine<V> {
    pub fn setup(
        vertices: [ScreenVertex<V>; 2],
        width: usize,
        height: usize,
        line_width: f32,
    ) -> Option<Self> {
        let thickness = line_width.round().max(1.0) as usize;
        let half = thickness as f32 * 0.5;
        let [a, b] = &vertices;
        let min_y = a.y.min(b.y) - half;
        let max_y = a.y.max(b.y) + half;
        let min_x = a.x.min(b.x) - half;
        let max_x = a.x.max(b.x) + half;
        if !(min_x.is_finite() && max_x.is_finite() && min_y.is_finite() && max_y.is_finite()) {
            return None;
        }
        if max_x < 0.0 || max_y < 0.0 || min_x >= width as f32 || min_y >= height as f32 {
            return None;
        }

        Some(Self {
            vertices,
            thickness,
            width,
            rows: RowSpan {
                min_y: min_y.floor().max(0.0) as usize,
                max_y: (max_y.ceil() as usize).min(height - 1),
            },
        })
    }

    pub fn rasterize<S: Shader<Varying = V>>(
        &self,
        band: &mut BandTarget<'_>,
        shader: &S,
        state: &PipelineState,
    ) {
        let [a, b] = &self.vertices;
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let x_major = dx.abs() >= dy.abs();
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        let spread = (self.thickness as i64 - 1) / 2;

        // Liang-Barsky：只步进落在当前条带（含线宽余量）内的参数区间
        let margin = self.thickness as f32 + 1.0;
        let bounds = [
            (-dx, a.x + margin),
            (dx, self.width as f32 + margin - a.x),
            (-dy, a.y - (band.y0 as f32 - margin)),
            (dy, band.y1 as f32 + margin - a.y),
        ];
        let (mut t0, mut t1) = (0.0f32, 1.0f32);
        for (p, q) in bounds {
            if p == 0.0 {
                if q < 0.0 {
                    return;
                }
            } else if p < 0.0 {
                t0 = t0.max(q / p);
            } else {
                t1 = t1.min(q / p);
            }
        }
        if t0 > t1 {
            return;
        }
        let first = (t0 * steps as f32).floor() as usize;
        let last = ((t1 * steps as f32).ceil() as usize).min(steps);

        for step in first..=last {
            let t = step as f32 / steps as f32;
            let base_x = (a.x + dx * t).floor() as i64;
            let base_y = (a.y + dy * t).floor() as i64;
            let depth = a.z + (b.z - a.z) * t;

            for k in 0..self.thickness as i64 {
                let offset = k - spread;
                let (x, y) = if x_major {
                    (base_x, base_y + offset)
                } else {
                    (base_x + offset, base_y)
                };
                if x < 0 || x >= self.width as i64 || y < band.y0 as i64 || y >= band.y1 as i64 {
                    continue;
                }
                band.shade(shader, state, x as usize, y as usize, depth, true, || {
                    // 透视校正
                    let wa = (1.0 - t) * a.inv_w;
                    let wb = t * b.inv_w;
                    let sum = wa + wb;
                    let s = if sum.abs() > 1e-20 { wb / sum } else { t };
                    V::lerp(&a.varying, &b.varying, s)
                });
            }
        }
    }
}
