//! 程序化几何体：立方体、缎带线圈、扭转圆环、螺旋管、贝塞尔曲线、铺砖棱柱等

use crate::geometry::vertex::{NormalVertex, PositionVertex, QuadVertex, TexturedVertex};
use nalgebra::{Vector2, Vector3};
use std::f32::consts::{PI, TAU};

/// 二次贝塞尔曲线
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bezier {
    pub p0: Vector3<f32>,
    pub p1: Vector3<f32>,
    pub p2: Vector3<f32>,
}

impl Bezier {
    pub fn new(p0: Vector3<f32>, p1: Vector3<f32>, p2: Vector3<f32>) -> Self {
        Self { p0, p1, p2 }
    }

    /// 以 `corner` 为控制点、两侧中点为端点的平滑过渡段
    pub fn through_midpoints(prev: &Vector3<f32>, corner: &Vector3<f32>, next: &Vector3<f32>) -> Self {
        Self::new(0.5 * (prev + corner), *corner, 0.5 * (corner + next))
    }

    pub fn position(&self, t: f32) -> Vector3<f32> {
        let s = 1.0 - t;
        s * s * self.p0 + 2.0 * s * t * self.p1 + t * t * self.p2
    }

    /// 切线方向（导数的一半，未归一化）
    pub fn direction(&self, t: f32) -> Vector3<f32> {
        (t - 1.0) * self.p0 + (1.0 - 2.0 * t) * self.p1 + t * self.p2
    }

    /// 在 [0, 1] 上均匀取 `count` 个点（含两端）
    pub fn sample(&self, count: usize) -> Vec<Vector3<f32>> {
        let last = count.saturating_sub(1).max(1) as f32;
        (0..count).map(|i| self.position(i as f32 / last)).collect()
    }
}

/// 用于 `LineStrip` 的曲线顶点，法线存放切线方向
pub fn bezier_strip(curve: &Bezier, count: usize) -> Vec<NormalVertex> {
    let last = count.saturating_sub(1).max(1) as f32;
    (0..count)
        .map(|i| {
            let t = i as f32 / last;
            NormalVertex::new(curve.position(t), curve.direction(t).normalize())
        })
        .collect()
}

/// 沿一串控制点生成平滑折线：每个控制点展开为一段二次贝塞尔，首尾钳制
pub fn smooth_path(control_points: &[Vector3<f32>], points_per_segment: usize) -> Vec<PositionVertex> {
    let n = control_points.len();
    let mut out = Vec::with_capacity(n * points_per_segment);
    for i in 0..n {
        let prev = &control_points[i.saturating_sub(1)];
        let next = &control_points[(i + 1).min(n - 1)];
        let segment = Bezier::through_midpoints(prev, &control_points[i], next);
        out.extend(segment.sample(points_per_segment).into_iter().map(PositionVertex::new));
    }
    out
}

/// 立方体 [-half, half]^3，每个面两个三角形，逆时针朝外
pub fn cube(half: f32) -> Vec<NormalVertex> {
    let corner = |x: f32, y: f32, z: f32| Vector3::new(x, y, z) * half;
    let v0 = corner(-1.0, -1.0, -1.0);
    let v1 = corner(-1.0, 1.0, -1.0);
    let v2 = corner(1.0, 1.0, -1.0);
    let v3 = corner(1.0, -1.0, -1.0);
    let v4 = corner(-1.0, -1.0, 1.0);
    let v5 = corner(-1.0, 1.0, 1.0);
    let v6 = corner(1.0, 1.0, 1.0);
    let v7 = corner(1.0, -1.0, 1.0);

    let faces = [
        [v0, v1, v2, v3],
        [v1, v5, v6, v2],
        [v0, v4, v5, v1],
        [v7, v4, v0, v3],
        [v7, v3, v2, v6],
        [v4, v7, v6, v5],
    ];

    let mut verts = Vec::with_capacity(36);
    for [a, b, c, d] in faces {
        let n = (b - a).cross(&(d - a)).normalize();
        for p in [a, b, c, c, d, a] {
            verts.push(NormalVertex::new(p, n));
        }
    }
    verts
}

/// 矩形平面，两个三角形；法线为 `up × side`
pub fn plane(center: Vector3<f32>, up: Vector3<f32>, side: Vector3<f32>) -> Vec<NormalVertex> {
    let n = up.cross(&side).normalize();
    [
        center - up - side,
        center + up - side,
        center + up + side,
        center + up + side,
        center - up + side,
        center - up - side,
    ]
    .into_iter()
    .map(|p| NormalVertex::new(p, n))
    .collect()
}

/// 覆盖整个视口的四边形（`TriangleStrip`，4 个顶点）
///
/// uv 原点在左上角，与帧缓冲的采样约定一致。
pub fn fullscreen_quad() -> Vec<QuadVertex> {
    [
        ((-1.0, -1.0), (0.0, 1.0)),
        ((-1.0, 1.0), (0.0, 0.0)),
        ((1.0, -1.0), (1.0, 1.0)),
        ((1.0, 1.0), (1.0, 0.0)),
    ]
    .into_iter()
    .map(|((x, y), (u, v))| QuadVertex {
        position: Vector2::new(x, y),
        uv: Vector2::new(u, v),
    })
    .collect()
}

// ===== 缎带线圈 =====

/// 圆角方形路径的顶点数
pub const COIL_CIRCLE_VERTS: usize = 4;
/// 每段贝塞尔上的采样点
const COIL_POINTS_PER_SEGMENT: usize = 60;
/// 缎带半宽
const TAPE_WIDTH: f32 = 0.03;

/// 递归二分线段，收集起点（不含终点）
fn subdivide(points: &mut Vec<Vector3<f32>>, from: Vector3<f32>, to: Vector3<f32>, level: u32) {
    if level == 0 {
        points.push(from);
        return;
    }
    let mid = 0.5 * (from + to);
    subdivide(points, from, mid, level - 1);
    subdivide(points, mid, to, level - 1);
}

/// 绕圆角方形（z = 1 平面）缠绕的缎带，按 `TriangleStrip` 排列
///
/// uv.y 沿路径从 0 增长到 1，用于按可见区间裁剪。
pub fn coil_strip(angle_offset: f32, coil_radius: f32) -> Vec<TexturedVertex> {
    let vertex_at = |index: usize| {
        let angle = index as f32 * TAU / COIL_CIRCLE_VERTS as f32;
        Vector3::new(angle.cos(), angle.sin(), 1.0)
    };

    let mut control_points = Vec::new();
    for i in 0..COIL_CIRCLE_VERTS {
        subdivide(&mut control_points, vertex_at(i), vertex_at(i + 1), 1);
    }

    // 路径上的点及其相对中心线的法向
    let n = control_points.len();
    let mut path = Vec::with_capacity(n * COIL_POINTS_PER_SEGMENT);
    for i in 0..n {
        let segment = Bezier::through_midpoints(
            &control_points[(i + n - 1) % n],
            &control_points[i],
            &control_points[(i + 1) % n],
        );
        for j in 0..COIL_POINTS_PER_SEGMENT {
            let t = j as f32 / COIL_POINTS_PER_SEGMENT as f32;
            let p = segment.position(t);
            let d = segment.direction(t).normalize();
            let s = d.cross(&Vector3::z());
            let up = s.cross(&d);
            let a = angle_offset + j as f32 * TAU / COIL_POINTS_PER_SEGMENT as f32;
            let r = p + (a.cos() * s + a.sin() * up) * coil_radius;
            path.push((r, (r - p).normalize()));
        }
    }

    let count = path.len();
    let mut verts = Vec::with_capacity(2 * (count + 1));
    for i in 0..=count {
        let (v0, n0) = path[i % count];
        let (v1, _) = path[(i + 1) % count];
        let d = (v1 - v0).normalize();
        let s = d.cross(&n0);
        let normal = s.cross(&d);
        let t = i as f32 / count as f32;
        verts.push(TexturedVertex::new(v0 - TAPE_WIDTH * s, normal, Vector2::new(0.0, t)));
        verts.push(TexturedVertex::new(v0 + TAPE_WIDTH * s, normal, Vector2::new(1.0, t)));
    }
    verts
}

// ===== 扭转圆环 =====

pub const TORUS_SEGMENTS_OUTER: usize = 128;
pub const TORUS_SEGMENTS_INNER: usize = 4;
/// 扭转圆环的顶点数（非索引三角形）
pub const TORUS_VERTEX_COUNT: usize = TORUS_SEGMENTS_OUTER * TORUS_SEGMENTS_INNER * 6;

/// 截面为方形、随 `angle_offset` 扭转的圆环，写入已分配好的顶点缓冲
///
/// uv.x 绕大圆走 4 圈并平移 `u_offset`，uv.y 绕截面一圈。
pub fn twisted_torus(
    out: &mut [TexturedVertex],
    big_radius: f32,
    small_radius: f32,
    angle_offset: f32,
    u_offset: f32,
) {
    let vert_at = |i: usize, j: usize| {
        let a = i as f32 * TAU / TORUS_SEGMENTS_OUTER as f32;
        let b = j as f32 * TAU / TORUS_SEGMENTS_INNER as f32 + a + angle_offset;
        let center = Vector3::new(a.cos(), a.sin(), 0.0) * big_radius;
        let radial = Vector3::new(a.cos(), a.sin(), 0.0);
        let pos = center + (b.sin() * radial + b.cos() * Vector3::z()) * small_radius;
        (pos, (pos - center).normalize())
    };

    let cells = (0..TORUS_SEGMENTS_OUTER)
        .flat_map(|i| (0..TORUS_SEGMENTS_INNER).map(move |j| (i, j)));
    for (quad, (i, j)) in out.chunks_exact_mut(6).zip(cells) {
        let i1 = (i + 1) % TORUS_SEGMENTS_OUTER;
        let j1 = (j + 1) % TORUS_SEGMENTS_INNER;
        let (v0, n0) = vert_at(i, j);
        let (v1, n1) = vert_at(i1, j);
        let (v2, n2) = vert_at(i1, j1);
        let (v3, n3) = vert_at(i, j1);

        // 截面每条边使用平直法线，得到硬边方管
        let na = (n0 + n3).normalize();
        let nb = (n1 + n2).normalize();

        let s0 = 4.0 * (i as f32 / TORUS_SEGMENTS_OUTER as f32 + u_offset);
        let s1 = 4.0 * ((i + 1) as f32 / TORUS_SEGMENTS_OUTER as f32 + u_offset);
        let t0 = j as f32 / TORUS_SEGMENTS_INNER as f32;
        let t1 = (j + 1) as f32 / TORUS_SEGMENTS_INNER as f32;

        quad.copy_from_slice(&[
            TexturedVertex::new(v0, na, Vector2::new(s0, t0)),
            TexturedVertex::new(v1, nb, Vector2::new(s1, t0)),
            TexturedVertex::new(v2, nb, Vector2::new(s1, t1)),
            TexturedVertex::new(v2, nb, Vector2::new(s1, t1)),
            TexturedVertex::new(v3, na, Vector2::new(s0, t1)),
            TexturedVertex::new(v0, na, Vector2::new(s0, t0)),
        ]);
    }
}

// ===== 螺旋管 =====

const SPIRAL_RINGS: usize = 450;
const SPIRAL_SLICES: usize = 20;
const SPIRAL_TURNS: f32 = 3.0;

/// 半径指数增长的螺旋管，返回 (顶点, 三角形索引)
pub fn spiral_tube() -> (Vec<TexturedVertex>, Vec<u32>) {
    let mut verts = Vec::with_capacity(SPIRAL_RINGS * SPIRAL_SLICES);
    for i in 0..SPIRAL_RINGS {
        let big_radius = 1.0005f32.powf(10.5 * i as f32) * i as f32 * 0.0001;
        let small_radius = big_radius * 0.45;
        let phi = i as f32 / SPIRAL_RINGS as f32 * TAU * SPIRAL_TURNS;
        let (sin_phi, cos_phi) = phi.sin_cos();
        let rotate = |v: Vector3<f32>| {
            Vector3::new(cos_phi * v.x - sin_phi * v.y, sin_phi * v.x + cos_phi * v.y, v.z)
        };
        let center = rotate(Vector3::new(0.0, big_radius, 0.0));
        for j in 0..SPIRAL_SLICES {
            let theta = j as f32 / SPIRAL_SLICES as f32 * TAU;
            let p = rotate(Vector3::new(
                0.0,
                big_radius + small_radius * theta.cos(),
                small_radius * theta.sin(),
            ));
            let offset = p - center;
            let normal = if offset.norm_squared() > 0.0 {
                offset.normalize()
            } else {
                Vector3::z()
            };
            let uv = Vector2::new(
                i as f32 / SPIRAL_RINGS as f32,
                j as f32 / SPIRAL_SLICES as f32,
            );
            verts.push(TexturedVertex::new(p, normal, uv));
        }
    }

    let mut indices = Vec::with_capacity((SPIRAL_RINGS - 1) * SPIRAL_SLICES * 6);
    for i in 0..SPIRAL_RINGS - 1 {
        for j in 0..SPIRAL_SLICES {
            let at = |ring: usize, slice: usize| (ring * SPIRAL_SLICES + slice % SPIRAL_SLICES) as u32;
            let (i0, i1, i2, i3) = (at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1));
            indices.extend_from_slice(&[i0, i1, i2, i2, i3, i0]);
        }
    }
    (verts, indices)
}

// ===== 铺砖 =====

/// 正六边形轮廓（外接圆半径 1）
pub fn hexagon_outline() -> Vec<Vector2<f32>> {
    let c = (PI / 6.0).cos();
    vec![
        Vector2::new(c, 0.5),
        Vector2::new(0.0, 1.0),
        Vector2::new(-c, 0.5),
        Vector2::new(-c, -0.5),
        Vector2::new(0.0, -1.0),
        Vector2::new(c, -0.5),
    ]
}

/// 填充六边形间隙的菱形轮廓
pub fn diamond_outline() -> Vec<Vector2<f32>> {
    let c = (PI / 6.0).cos();
    vec![
        Vector2::new(c, 0.0),
        Vector2::new(0.0, 0.5),
        Vector2::new(-c, 0.0),
        Vector2::new(0.0, -0.5),
    ]
}

/// 十字形（十二边形）轮廓
pub fn cross_outline() -> Vec<Vector2<f32>> {
    [
        (-1.0, 0.5),
        (-0.5, 0.5),
        (-0.5, 1.0),
        (0.5, 1.0),
        (0.5, 0.5),
        (1.0, 0.5),
        (1.0, -0.5),
        (0.5, -0.5),
        (0.5, -1.0),
        (-0.5, -1.0),
        (-0.5, -0.5),
        (-1.0, -0.5),
    ]
    .into_iter()
    .map(|(x, y)| Vector2::new(x, y))
    .collect()
}

/// 把二维轮廓沿 z 挤出为棱柱：侧壁 + 顶面 + 底面
///
/// 轮廓须相对其质心星形（凸多边形、十字形均满足），环绕方向任意。
pub fn tile_prism(outline: &[Vector2<f32>], bottom: f32, top: f32) -> Vec<NormalVertex> {
    let n = outline.len();
    if n < 3 {
        return Vec::new();
    }
    let signed_area: f32 = (0..n)
        .map(|i| {
            let (a, b) = (outline[i], outline[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum();
    let mut ring = outline.to_vec();
    if signed_area < 0.0 {
        ring.reverse();
    }
    let centroid = ring.iter().sum::<Vector2<f32>>() / n as f32;
    let at = |p: &Vector2<f32>, z: f32| Vector3::new(p.x, p.y, z);

    let mut verts = Vec::with_capacity(n * 12);
    for i in 0..n {
        let a = &ring[i];
        let b = &ring[(i + 1) % n];

        let edge = b - a;
        let outward = Vector3::new(edge.y, -edge.x, 0.0).normalize();
        for p in [at(a, bottom), at(b, bottom), at(b, top), at(b, top), at(a, top), at(a, bottom)] {
            verts.push(NormalVertex::new(p, outward));
        }

        for p in [at(&centroid, top), at(a, top), at(b, top)] {
            verts.push(NormalVertex::new(p, Vector3::z()));
        }
        for p in [at(&centroid, bottom), at(b, bottom), at(a, bottom)] {
            verts.push(NormalVertex::new(p, -Vector3::z()));
        }
    }
    verts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_normal(a: &Vector3<f32>, b: &Vector3<f32>, c: &Vector3<f32>) -> Vector3<f32> {
        (b - a).cross(&(c - a))
    }

    #[test]
    fn bezier_endpoints_and_tangent() {
        let curve = Bezier::new(
            Vector3::new(-1.0, -1.0, -1.0),
            Vector3::new(0.0, 0.0, 2.0),
            Vector3::new(1.0, 1.0, -1.0),
        );
        assert_eq!(curve.position(0.0), curve.p0);
        assert_eq!(curve.position(1.0), curve.p2);
        assert_eq!(curve.direction(0.0), curve.p1 - curve.p0);
        assert_eq!(curve.direction(1.0), curve.p2 - curve.p1);

        let strip = bezier_strip(&curve, 20);
        assert_eq!(strip.len(), 20);
        assert!(strip.iter().all(|v| (v.normal.norm() - 1.0).abs() < 1e-5));
    }

    #[test]
    fn cube_faces_point_outward() {
        let verts = cube(1.0);
        assert_eq!(verts.len(), 36);
        for tri in verts.chunks(3) {
            let geometric = triangle_normal(&tri[0].position, &tri[1].position, &tri[2].position);
            let center = (tri[0].position + tri[1].position + tri[2].position) / 3.0;
            assert!(geometric.dot(&tri[0].normal) > 0.0);
            assert!(center.dot(&tri[0].normal) > 0.0);
        }
    }

    #[test]
    fn smooth_path_is_continuous_between_segments() {
        let control: Vec<_> = (0..5).map(|i| Vector3::new(i as f32, (i % 2) as f32, 0.0)).collect();
        let path = smooth_path(&control, 20);
        assert_eq!(path.len(), 100);
        // 相邻段首尾重合
        for segment in 0..4 {
            let end = path[segment * 20 + 19].position;
            let start = path[(segment + 1) * 20].position;
            assert!((end - start).norm() < 1e-5);
        }
        assert_eq!(path[0].position, control[0]);
    }

    #[test]
    fn coil_strip_closes_on_itself() {
        let strip = coil_strip(0.0, 0.2);
        assert_eq!(strip.len() % 2, 0);
        let first = &strip[0];
        let last = &strip[strip.len() - 2];
        assert!((first.position - last.position).norm() < 1e-4);
        assert_eq!(first.uv.y, 0.0);
        assert!((last.uv.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn twisted_torus_fills_every_vertex() {
        let mut verts = vec![TexturedVertex::default(); TORUS_VERTEX_COUNT];
        twisted_torus(&mut verts, 1.0, 0.3, 0.7, 0.1);
        for v in &verts {
            let ring = Vector2::new(v.position.x, v.position.y).norm();
            assert!(ring > 0.69 && ring < 1.31, "{ring}");
            assert!((v.normal.norm() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn spiral_indices_stay_in_range() {
        let (verts, indices) = spiral_tube();
        assert_eq!(indices.len() % 3, 0);
        assert!(indices.iter().all(|&i| (i as usize) < verts.len()));
    }

    #[test]
    fn prism_walls_face_away_from_center() {
        for outline in [hexagon_outline(), diamond_outline(), cross_outline()] {
            let verts = tile_prism(&outline, -0.1, 0.1);
            assert_eq!(verts.len(), outline.len() * 12);
            for tri in verts.chunks(3) {
                let geometric = triangle_normal(&tri[0].position, &tri[1].position, &tri[2].position);
                assert!(geometric.dot(&tri[0].normal) > 0.0);
            }
        }
    }

    #[test]
    fn plane_normal_follows_up_cross_side() {
        let verts = plane(Vector3::zeros(), Vector3::x() * 3.0, Vector3::y() * 4.0);
        assert_eq!(verts.len(), 6);
        assert!(verts.iter().all(|v| v.normal == Vector3::z()));
    }
}
