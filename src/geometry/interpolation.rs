use nalgebra::{Point2, Vector3};

const EPSILON: f64 = 1e-12; // 判定退化三角形的面积阈值

/// 屏幕坐标的子像素精度（1/256 像素）
pub const SUBPIXEL_STEPS: f64 = 256.0;

/// 把像素坐标量化到子像素网格
///
/// 量化后的坐标在 f64 下计算边函数是精确的，共享边两侧得到的值严格互为相反数。
#[inline]
pub fn snap_to_subpixel(value: f32) -> f64 {
    (value as f64 * SUBPIXEL_STEPS).round() / SUBPIXEL_STEPS
}

/// 边函数：点 p 相对有向边 a->b 的叉积
#[inline]
pub fn edge_function(a: Point2<f64>, b: Point2<f64>, p: Point2<f64>) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// 恰好落在边上的像素只归属于方向为"下行或向左水平"的那条有向边
///
/// 相邻三角形以相反方向经过共享边，因此共享边上的像素只会被填充一次。
#[inline]
pub fn owns_boundary(a: Point2<f64>, b: Point2<f64>) -> bool {
    let dy = b.y - a.y;
    dy > 0.0 || (dy == 0.0 && b.x < a.x)
}

/// 计算点 p 关于三角形 (v0, v1, v2) 的重心坐标
///
/// 三角形面积为零时返回 None。分量依次对应 v0、v1、v2。
pub fn barycentric_coordinates(
    p: Point2<f64>,
    v0: Point2<f64>,
    v1: Point2<f64>,
    v2: Point2<f64>,
) -> Option<Vector3<f64>> {
    let area_x2 = edge_function(v0, v1, v2);
    if area_x2.abs() < EPSILON {
        return None;
    }
    let inv_area_x2 = 1.0 / area_x2;
    Some(Vector3::new(
        edge_function(v1, v2, p) * inv_area_x2,
        edge_function(v2, v0, p) * inv_area_x2,
        edge_function(v0, v1, p) * inv_area_x2,
    ))
}

/// 覆盖测试：三角形须为正向（面积为正），返回重心坐标
pub fn covered_barycentric(
    p: Point2<f64>,
    v0: Point2<f64>,
    v1: Point2<f64>,
    v2: Point2<f64>,
    area_x2: f64,
) -> Option<Vector3<f32>> {
    let edges = [(v1, v2), (v2, v0), (v0, v1)];
    let mut weights = [0.0f64; 3];
    for (weight, (a, b)) in weights.iter_mut().zip(edges) {
        let e = edge_function(a, b, p);
        if e < 0.0 || (e == 0.0 && !owns_boundary(a, b)) {
            return None;
        }
        *weight = e / area_x2;
    }
    Some(Vector3::new(
        weights[0] as f32,
        weights[1] as f32,
        weights[2] as f32,
    ))
}

/// 透视校正：屏幕空间重心坐标按各顶点 1/w 加权后归一化
#[inline]
pub fn perspective_weights(bary: Vector3<f32>, inv_w: [f32; 3]) -> [f32; 3] {
    let w0 = bary.x * inv_w[0];
    let w1 = bary.y * inv_w[1];
    let w2 = bary.z * inv_w[2];
    let sum = w0 + w1 + w2;
    if sum.abs() > 1e-20 {
        [w0 / sum, w1 / sum, w2 / sum]
    } else {
        // 退化时退回线性插值
        [bary.x, bary.y, bary.z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barycentric_of_vertices_and_centroid() {
        let v0 = Point2::new(0.0, 0.0);
        let v1 = Point2::new(3.0, 0.0);
        let v2 = Point2::new(0.0, 3.0);
        let at_v1 = barycentric_coordinates(v1, v0, v1, v2).unwrap();
        assert_eq!(at_v1, Vector3::new(0.0, 1.0, 0.0));

        let centroid = barycentric_coordinates(Point2::new(1.0, 1.0), v0, v1, v2).unwrap();
        assert!((centroid - Vector3::repeat(1.0 / 3.0)).norm() < 1e-12);

        assert!(barycentric_coordinates(v0, v0, v0, v1).is_none());
    }

    #[test]
    fn shared_edge_pixels_belong_to_exactly_one_triangle() {
        // 正方形沿对角线拆成两个正向三角形
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(4.0, 0.0);
        let c = Point2::new(4.0, 4.0);
        let d = Point2::new(0.0, 4.0);
        let first = (a, b, c);
        let second = (a, c, d);
        let area_first = edge_function(first.0, first.1, first.2);
        let area_second = edge_function(second.0, second.1, second.2);
        assert!(area_first > 0.0 && area_second > 0.0);

        for y in 0..4 {
            for x in 0..4 {
                let p = Point2::new(x as f64 + 0.5, y as f64 + 0.5);
                let hits = [
                    covered_barycentric(p, first.0, first.1, first.2, area_first),
                    covered_barycentric(p, second.0, second.1, second.2, area_second),
                ]
                .iter()
                .filter(|hit| hit.is_some())
                .count();
                assert_eq!(hits, 1, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn perspective_weights_follow_inverse_w() {
        let bary = Vector3::new(0.5, 0.5, 0.0);
        let equal = perspective_weights(bary, [1.0, 1.0, 1.0]);
        assert_eq!(equal, [0.5, 0.5, 0.0]);

        // 较近的顶点（w 小）权重更大
        let skewed = perspective_weights(bary, [1.0, 0.25, 1.0]);
        assert!((skewed[0] - 0.8).abs() < 1e-6);
        assert!((skewed[1] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn snapping_quantizes_to_subpixel_grid() {
        assert_eq!(snap_to_subpixel(1.0 + 1.0 / 1024.0), 1.0);
        assert_eq!(snap_to_subpixel(2.5), 2.5);
    }
}
