//! 凸多边形的平面切分与随机切分树（"爆炸视图"）

use crate::geometry::transform::TransformFactory;
use crate::geometry::vertex::ColoredVertex;
use crate::utils::tween::Tween;
use log::debug;
use nalgebra::{Matrix4, Vector3};
use rand::Rng;

/// 切面多边形的半边长
const CAP_HALF_SIZE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vector3<f32>,
    pub normal: Vector3<f32>,
}

impl Plane {
    pub fn new(point: Vector3<f32>, normal: Vector3<f32>) -> Self {
        Self { point, normal }
    }

    #[inline]
    pub fn signed_distance(&self, v: &Vector3<f32>) -> f32 {
        (v - self.point).dot(&self.normal)
    }

    /// 点在平面负侧
    #[inline]
    pub fn is_behind(&self, v: &Vector3<f32>) -> bool {
        self.signed_distance(v) < 0.0
    }
}

/// 带法线和颜色的凸多边形
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub normal: Vector3<f32>,
    pub color: Vector3<f32>,
    pub vertices: Vec<Vector3<f32>>,
}

impl Polygon {
    /// 多边形所在平面（法线朝外）
    pub fn plane(&self) -> Plane {
        Plane::new(self.vertices[0], self.normal)
    }
}

pub type Mesh = Vec<Polygon>;

/// 用平面切分凸多边形，返回 (正侧, 负侧) 顶点列表
///
/// 落在平面上的顶点算作正侧；跨越平面的边的交点同时加入两侧。
/// 没有分到顶点的一侧为空。
pub fn split_polygon(
    vertices: &[Vector3<f32>],
    plane: &Plane,
) -> (Vec<Vector3<f32>>, Vec<Vector3<f32>>) {
    let mut front = Vec::new();
    let mut back = Vec::new();

    for (i, v0) in vertices.iter().enumerate() {
        let v1 = &vertices[(i + 1) % vertices.len()];
        let b0 = plane.is_behind(v0);
        let b1 = plane.is_behind(v1);

        if b0 {
            back.push(*v0);
        } else {
            front.push(*v0);
        }

        if b0 != b1 {
            let t = (plane.point - v0).dot(&plane.normal) / (v1 - v0).dot(&plane.normal);
            let m = v0 + (v1 - v0) * t;
            front.push(m);
            back.push(m);
        }
    }

    (front, back)
}

/// 用平面切分凸网格，返回 (正侧, 负侧)
///
/// 两侧都非空时，在切面上补一个封口多边形：正侧封口法线为 -normal，负侧为 +normal。
pub fn split_mesh(mesh: &[Polygon], plane: &Plane, cap_color: Vector3<f32>) -> (Mesh, Mesh) {
    let mut front_mesh = Mesh::new();
    let mut back_mesh = Mesh::new();

    for polygon in mesh {
        let (front, back) = split_polygon(&polygon.vertices, plane);
        if !front.is_empty() {
            front_mesh.push(Polygon {
                vertices: front,
                ..polygon.clone()
            });
        }
        if !back.is_empty() {
            back_mesh.push(Polygon {
                vertices: back,
                ..polygon.clone()
            });
        }
    }

    if !front_mesh.is_empty() && !back_mesh.is_empty() {
        if let Some(cap) = cap_polygon(mesh, plane) {
            let mut reversed = cap.clone();
            reversed.reverse();
            front_mesh.push(Polygon {
                normal: -plane.normal,
                color: cap_color,
                vertices: reversed,
            });
            back_mesh.push(Polygon {
                normal: plane.normal,
                color: cap_color,
                vertices: cap,
            });
        }
    }

    (front_mesh, back_mesh)
}

/// 切面上的大正方形，被网格每个面的平面裁剪后保留内侧部分
///
/// 顶点绕 plane.normal 逆时针排列。
fn cap_polygon(mesh: &[Polygon], plane: &Plane) -> Option<Vec<Vector3<f32>>> {
    let normal = plane.normal.normalize();
    let reference = if normal.y.abs() > 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let right = reference.cross(&normal).normalize();
    let up = normal.cross(&right);

    let mut cap = vec![
        plane.point + (-right - up) * CAP_HALF_SIZE,
        plane.point + (right - up) * CAP_HALF_SIZE,
        plane.point + (right + up) * CAP_HALF_SIZE,
        plane.point + (-right + up) * CAP_HALF_SIZE,
    ];
    for polygon in mesh {
        let (_, inside) = split_polygon(&cap, &polygon.plane());
        cap = inside;
        if cap.len() < 3 {
            return None;
        }
    }
    Some(cap)
}

/// 以 [-half, half]^3 为范围的立方体，六个面法线朝外
pub fn cube_mesh(half: f32, color: Vector3<f32>) -> Mesh {
    let face = |v0: Vector3<f32>, v1: Vector3<f32>, v2: Vector3<f32>, v3: Vector3<f32>| {
        let normal = (v1 - v0).cross(&(v3 - v0)).normalize();
        Polygon {
            normal,
            color,
            vertices: vec![v0, v1, v2, v3],
        }
    };

    let h = half;
    let v0 = Vector3::new(-h, -h, -h);
    let v1 = Vector3::new(-h, h, -h);
    let v2 = Vector3::new(h, h, -h);
    let v3 = Vector3::new(h, -h, -h);
    let v4 = Vector3::new(-h, -h, h);
    let v5 = Vector3::new(-h, h, h);
    let v6 = Vector3::new(h, h, h);
    let v7 = Vector3::new(h, -h, h);

    vec![
        face(v0, v1, v2, v3),
        face(v1, v5, v6, v2),
        face(v0, v4, v5, v1),
        face(v7, v4, v0, v3),
        face(v7, v3, v2, v6),
        face(v4, v7, v6, v5),
    ]
}

/// 扇形三角化网格，得到可直接绘制的三角形列表
pub fn triangulate(mesh: &[Polygon]) -> Vec<ColoredVertex> {
    let mut vertices = Vec::new();
    for polygon in mesh {
        let verts = &polygon.vertices;
        for i in 1..verts.len().saturating_sub(1) {
            for v in [verts[0], verts[i], verts[i + 1]] {
                vertices.push(ColoredVertex::new(v, polygon.normal, polygon.color));
            }
        }
    }
    vertices
}

/// 爆炸动画参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplodeTiming {
    pub max_offset: f32,
    pub explode_duration: f32,
    pub implode_duration: f32,
    pub explode_tween: Tween,
    pub implode_tween: Tween,
}

impl Default for ExplodeTiming {
    fn default() -> Self {
        Self {
            max_offset: 0.3,
            explode_duration: 0.25,
            implode_duration: 0.125,
            explode_tween: Tween::InQuadratic,
            implode_tween: Tween::OutQuadratic,
        }
    }
}

impl ExplodeTiming {
    pub fn with_tweens(mut self, explode: Tween, implode: Tween) -> Self {
        self.explode_tween = explode;
        self.implode_tween = implode;
        self
    }

    /// 某个切分节点在 `time` 时刻沿法线的分离距离
    pub fn offset(&self, time: f32, start_explode: f32, start_implode: f32) -> f32 {
        if time < start_explode {
            0.0
        } else if time < start_explode + self.explode_duration {
            let t = (time - start_explode) / self.explode_duration;
            self.explode_tween.eval(t) * self.max_offset
        } else if time < start_implode {
            self.max_offset
        } else if time < start_implode + self.implode_duration {
            let t = (time - start_implode) / self.implode_duration;
            self.implode_tween.eval(1.0 - t) * self.max_offset
        } else {
            0.0
        }
    }
}

/// 切分树的构建参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceOptions {
    pub max_depth: usize,
    pub cycle_duration: f32,
    pub cap_color: Vector3<f32>,
    pub timing: ExplodeTiming,
}

impl Default for SliceOptions {
    fn default() -> Self {
        Self {
            max_depth: 7,
            cycle_duration: 3.0,
            cap_color: Vector3::new(1.0, 0.0, 0.0),
            timing: ExplodeTiming::default(),
        }
    }
}

#[derive(Debug)]
enum SliceNode {
    Leaf(usize),
    Split {
        normal: Vector3<f32>,
        start_explode: f32,
        start_implode: f32,
        front: Box<SliceNode>,
        back: Box<SliceNode>,
    },
}

/// 随机切分树：叶子是切出来的小块，内部节点记录切面与动画时间
#[derive(Debug)]
pub struct SliceTree {
    root: SliceNode,
    leaves: Vec<Mesh>,
    timing: ExplodeTiming,
}

impl SliceTree {
    pub fn build<R: Rng>(mesh: Mesh, options: &SliceOptions, rng: &mut R) -> Self {
        let mut leaves = Vec::new();
        let root = build_node(mesh, 0, options, rng, &mut leaves);
        debug!("切分树构建完成: {} 个叶子", leaves.len());
        Self {
            root,
            leaves,
            timing: options.timing,
        }
    }

    pub fn leaves(&self) -> &[Mesh] {
        &self.leaves
    }

    /// 计算每个叶子在 `time` 时刻的模型矩阵，返回 (叶子序号, 矩阵)
    pub fn leaf_transforms(&self, model: &Matrix4<f32>, time: f32) -> Vec<(usize, Matrix4<f32>)> {
        let mut out = Vec::with_capacity(self.leaves.len());
        self.collect(&self.root, *model, time, &mut out);
        out
    }

    fn collect(
        &self,
        node: &SliceNode,
        model: Matrix4<f32>,
        time: f32,
        out: &mut Vec<(usize, Matrix4<f32>)>,
    ) {
        match node {
            SliceNode::Leaf(index) => out.push((*index, model)),
            SliceNode::Split {
                normal,
                start_explode,
                start_implode,
                front,
                back,
            } => {
                let offset = self.timing.offset(time, *start_explode, *start_implode);
                let front_model = model * TransformFactory::translation(&(normal * offset));
                let back_model = model * TransformFactory::translation(&(normal * -offset));
                self.collect(front, front_model, time, out);
                self.collect(back, back_model, time, out);
            }
        }
    }
}

fn random_vector<R: Rng>(rng: &mut R) -> Vector3<f32> {
    Vector3::new(
        rng.random_range(-1.0..1.0),
        rng.random_range(-1.0..1.0),
        rng.random_range(-1.0..1.0),
    )
}

fn build_node<R: Rng>(
    mesh: Mesh,
    depth: usize,
    options: &SliceOptions,
    rng: &mut R,
    leaves: &mut Vec<Mesh>,
) -> SliceNode {
    let mut make_leaf = |mesh: Mesh| {
        leaves.push(mesh);
        SliceNode::Leaf(leaves.len() - 1)
    };

    if depth >= options.max_depth {
        return make_leaf(mesh);
    }

    let point = random_vector(rng);
    let mut normal = random_vector(rng);
    while normal.norm() < 1e-3 {
        normal = random_vector(rng);
    }
    let plane = Plane::new(point, normal.normalize());

    let (front, back) = split_mesh(&mesh, &plane, options.cap_color);
    if front.is_empty() || back.is_empty() {
        return make_leaf(mesh);
    }

    let timing = &options.timing;
    let start_explode = 0.25 + 0.25 * depth as f32;
    let start_implode = options.cycle_duration
        - 0.25
        - timing.implode_duration
        - 0.5 * timing.implode_duration * depth as f32;

    SliceNode::Split {
        normal: plane.normal,
        start_explode,
        start_implode,
        front: Box::new(build_node(front, depth + 1, options, rng, leaves)),
        back: Box::new(build_node(back, depth + 1, options, rng, leaves)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const EPS: f32 = 1e-5;

    fn white() -> Vector3<f32> {
        Vector3::repeat(1.0)
    }

    /// Newell 法计算多边形面积
    fn area(vertices: &[Vector3<f32>]) -> f32 {
        let mut sum = Vector3::zeros();
        for (i, a) in vertices.iter().enumerate() {
            let b = vertices[(i + 1) % vertices.len()];
            sum += a.cross(&b);
        }
        sum.norm() * 0.5
    }

    fn unit_square() -> Vec<Vector3<f32>> {
        vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn non_intersecting_plane_leaves_polygon_whole() {
        let square = unit_square();
        let plane = Plane::new(Vector3::new(5.0, 0.0, 0.0), Vector3::x());
        let (front, back) = split_polygon(&square, &plane);
        assert!(front.is_empty());
        assert_eq!(back, square);

        let plane = Plane::new(Vector3::new(-5.0, 0.0, 0.0), Vector3::x());
        let (front, back) = split_polygon(&square, &plane);
        assert_eq!(front, square);
        assert!(back.is_empty());
    }

    #[test]
    fn plane_through_centroid_splits_into_two_pieces() {
        let square = unit_square();
        let centroid = Vector3::new(0.5, 0.5, 0.0);
        let plane = Plane::new(centroid, Vector3::new(1.0, 2.0, 3.0).normalize());
        let (front, back) = split_polygon(&square, &plane);

        assert!(front.len() >= 3 && back.len() >= 3);
        assert!(front.len() + back.len() >= square.len());
        assert!((area(&front) + area(&back) - 1.0).abs() < EPS);
    }

    #[test]
    fn mesh_missed_by_plane_is_returned_unchanged() {
        let cube = cube_mesh(1.0, white());
        let plane = Plane::new(Vector3::new(2.0, 0.0, 0.0), Vector3::x());
        let (front, back) = split_mesh(&cube, &plane, Vector3::x());
        assert!(front.is_empty());
        assert_eq!(back, cube);
    }

    #[test]
    fn axis_aligned_split_of_cube_gives_two_boxes() {
        let cube = cube_mesh(1.0, white());
        let plane = Plane::new(Vector3::zeros(), Vector3::x());
        let cap_color = Vector3::new(1.0, 0.0, 0.0);
        let (front, back) = split_mesh(&cube, &plane, cap_color);

        assert_eq!(front.len(), 6);
        assert_eq!(back.len(), 6);
        for polygon in &front {
            for v in &polygon.vertices {
                assert!(v.x >= -EPS && v.x <= 1.0 + EPS, "front vertex {v:?}");
            }
        }
        for polygon in &back {
            for v in &polygon.vertices {
                assert!(v.x >= -1.0 - EPS && v.x <= EPS, "back vertex {v:?}");
            }
        }

        // 两半各有一个 2x2 的封口
        let front_cap = front.last().unwrap();
        let back_cap = back.last().unwrap();
        assert_eq!(front_cap.color, cap_color);
        assert_eq!(front_cap.normal, -Vector3::x());
        assert_eq!(back_cap.normal, Vector3::x());
        assert!((area(&front_cap.vertices) - 4.0).abs() < 1e-3);
        for v in &back_cap.vertices {
            assert!(v.x.abs() < EPS);
            assert!(v.y.abs() <= 1.0 + EPS && v.z.abs() <= 1.0 + EPS);
        }

        // 每一半的表面积都是 1x2x2 长方体的表面积
        let surface = |mesh: &Mesh| mesh.iter().map(|p| area(&p.vertices)).sum::<f32>();
        assert!((surface(&front) - 16.0).abs() < 1e-3);
        assert!((surface(&back) - 16.0).abs() < 1e-3);
    }

    #[test]
    fn cap_winding_matches_its_normal() {
        let cube = cube_mesh(1.0, white());
        let plane = Plane::new(Vector3::new(0.1, 0.2, 0.0), Vector3::new(1.0, 1.0, 0.5).normalize());
        let (front, back) = split_mesh(&cube, &plane, white());
        for cap in [front.last().unwrap(), back.last().unwrap()] {
            let v = &cap.vertices;
            let winding = (v[1] - v[0]).cross(&(v[2] - v[0]));
            assert!(winding.dot(&cap.normal) > 0.0);
        }
    }

    #[test]
    fn triangulation_fans_each_polygon() {
        let cube = cube_mesh(0.5, white());
        let vertices = triangulate(&cube);
        assert_eq!(vertices.len(), 6 * 2 * 3);
        assert!(vertices.iter().all(|v| v.position.abs().max() <= 0.5 + EPS));
    }

    #[test]
    fn explode_offset_follows_timeline() {
        let timing = ExplodeTiming::default();
        assert_eq!(timing.offset(0.1, 0.25, 2.0), 0.0);
        assert!((timing.offset(0.375, 0.25, 2.0) - 0.25 * timing.max_offset).abs() < EPS);
        assert_eq!(timing.offset(1.0, 0.25, 2.0), timing.max_offset);
        let implode = timing.offset(2.0625, 0.25, 2.0);
        assert!(implode > 0.0 && implode < timing.max_offset);
        assert_eq!(timing.offset(2.5, 0.25, 2.0), 0.0);
    }

    #[test]
    fn configured_tweens_shape_the_offset() {
        let timing = ExplodeTiming::default().with_tweens(Tween::Linear, Tween::Linear);
        // 分离阶段走到一半
        assert!((timing.offset(0.375, 0.25, 2.0) - 0.5 * timing.max_offset).abs() < EPS);
        // 合拢阶段走到一半
        assert!((timing.offset(2.0625, 0.25, 2.0) - 0.5 * timing.max_offset).abs() < EPS);
    }

    #[test]
    fn random_tree_keeps_every_piece() {
        let mut rng = StdRng::seed_from_u64(7);
        let options = SliceOptions {
            max_depth: 4,
            ..SliceOptions::default()
        };
        let tree = SliceTree::build(cube_mesh(1.0, white()), &options, &mut rng);

        assert!(!tree.leaves().is_empty());
        assert!(tree.leaves().len() <= 16);
        assert!(tree.leaves().iter().all(|leaf| !leaf.is_empty()));

        let model = Matrix4::identity();
        let at_rest = tree.leaf_transforms(&model, 0.0);
        assert_eq!(at_rest.len(), tree.leaves().len());
        assert!(at_rest.iter().all(|(_, m)| *m == model));

        let exploded = tree.leaf_transforms(&model, 1.5);
        if tree.leaves().len() > 1 {
            assert!(exploded.iter().any(|(_, m)| *m != model));
        }
    }
}
