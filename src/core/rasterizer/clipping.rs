use crate::core::rasterizer::varying::Varying;
use crate::core::shader::VertexOutput;

/// 到近平面 (z = -w) 的有符号距离，非负表示在可见一侧
#[inline]
fn near_distance<V>(vertex: &VertexOutput<V>) -> f32 {
    vertex.position.z + vertex.position.w
}

fn intersect<V: Varying>(a: &VertexOutput<V>, b: &VertexOutput<V>) -> VertexOutput<V> {
    let da = near_distance(a);
    let db = near_distance(b);
    let t = da / (da - db);
    VertexOutput {
        position: a.position.lerp(&b.position, t),
        varying: V::lerp(&a.varying, &b.varying, t),
    }
}

/// 用近平面裁剪三角形（Sutherland-Hodgman），结果按扇形拆分为三角形
pub fn clip_triangle<V: Varying>(triangle: [VertexOutput<V>; 3]) -> Vec<[VertexOutput<V>; 3]> {
    let distances = triangle.each_ref().map(near_distance);
    if distances.iter().all(|&d| d >= 0.0) {
        return vec![triangle];
    }
    if distances.iter().all(|&d| d < 0.0) {
        return Vec::new();
    }

    let mut polygon: Vec<VertexOutput<V>> = Vec::with_capacity(4);
    for i in 0..3 {
        let current = &triangle[i];
        let next = &triangle[(i + 1) % 3];
        let current_inside = distances[i] >= 0.0;
        let next_inside = distances[(i + 1) % 3] >= 0.0;

        if current_inside {
            polygon.push(*current);
        }
        if current_inside != next_inside {
            polygon.push(intersect(current, next));
        }
    }

    (1..polygon.len().saturating_sub(1))
        .map(|i| [polygon[0], polygon[i], polygon[i + 1]])
        .collect()
}

/// 用近平面裁剪线段，完全不可见时返回 None
pub fn clip_line<V: Varying>(line: [VertexOutput<V>; 2]) -> Option<[VertexOutput<V>; 2]> {
    let d0 = near_distance(&line[0]);
    let d1 = near_distance(&line[1]);
    match (d0 >= 0.0, d1 >= 0.0) {
        (true, true) => Some(line),
        (false, false) => None,
        (true, false) => Some([line[0], intersect(&line[0], &line[1])]),
        (false, true) => Some([intersect(&line[0], &line[1]), line[1]]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector4;

    fn vertex(z: f32, tag: f32) -> VertexOutput<f32> {
        VertexOutput::new(Vector4::new(tag, 0.0, z, 1.0), tag)
    }

    #[test]
    fn visible_triangle_is_untouched() {
        let clipped = clip_triangle([vertex(0.0, 0.0), vertex(0.5, 1.0), vertex(-0.5, 2.0)]);
        assert_eq!(clipped.len(), 1);
    }

    #[test]
    fn triangle_behind_near_plane_is_dropped() {
        let clipped = clip_triangle([vertex(-2.0, 0.0), vertex(-3.0, 1.0), vertex(-1.5, 2.0)]);
        assert!(clipped.is_empty());
    }

    #[test]
    fn one_vertex_behind_yields_quad() {
        let clipped = clip_triangle([vertex(-3.0, 0.0), vertex(0.0, 1.0), vertex(0.0, 2.0)]);
        assert_eq!(clipped.len(), 2);
        for triangle in &clipped {
            for v in triangle {
                assert!(v.position.z + v.position.w >= -1e-6);
            }
        }
    }

    #[test]
    fn two_vertices_behind_yields_single_triangle() {
        let clipped = clip_triangle([vertex(-3.0, 0.0), vertex(-3.0, 1.0), vertex(1.0, 2.0)]);
        assert_eq!(clipped.len(), 1);
        // 交点处的 varying 随位置一起插值
        let [a, _, _] = clipped[0];
        assert!((a.varying - a.position.x).abs() < 1e-6);
    }

    #[test]
    fn line_is_shortened_at_near_plane() {
        let line = clip_line([vertex(-3.0, 0.0), vertex(1.0, 4.0)]).unwrap();
        assert!((line[0].position.z + 1.0).abs() < 1e-6);
        assert!((line[0].varying - 2.0).abs() < 1e-6);
        assert!(clip_line([vertex(-3.0, 0.0), vertex(-2.0, 4.0)]).is_none());
    }
}
