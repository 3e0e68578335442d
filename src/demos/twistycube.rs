use super::{camera, gray};
use crate::core::demo::{Demo, DemoContext};
use crate::core::frame_buffer::{FrameBuffer, Rgba};
use crate::core::geometry::Geometry;
use crate::core::rasterizer::{PipelineState, Primitive, Renderer};
use crate::core::shader::ShaderProgram;
use crate::effects::BlurEffect;
use crate::error::Result;
use crate::geometry::shapes::smooth_path;
use crate::geometry::transform::TransformFactory;
use crate::geometry::vertex::PositionVertex;
use crate::shaders::{UnlitParams, UnlitShader};
use crate::utils::tween::{in_quadratic, out_quadratic};
use nalgebra::{Matrix4, Vector3};
use rand::Rng;
use std::f32::consts::TAU;

const CONTROL_POINTS: usize = 5;
const SEGMENT_POINTS: usize = 20;
const GLOW_LINE_WIDTH: f32 = 8.0;
const LINE_WIDTH: f32 = 2.0;
const BLUR_PASSES: usize = 2;
/// 随机形状的控制点落在 [-SCATTER, SCATTER]^3 内
const SCATTER: f32 = 2.5;

/// 立方体的一条棱：每个控制点有"棱上"和"随机"两个位置
struct Edge {
    straight: [Vector3<f32>; CONTROL_POINTS],
    scattered: [Vector3<f32>; CONTROL_POINTS],
}

impl Edge {
    fn new<R: Rng>(from: Vector3<f32>, to: Vector3<f32>, rng: &mut R) -> Self {
        let straight = std::array::from_fn(|i| from.lerp(&to, i as f32 / (CONTROL_POINTS - 1) as f32));
        let scattered = std::array::from_fn(|_| {
            Vector3::from_fn(|_, _| rng.random_range(-1.0..=1.0)) * SCATTER
        });
        Self { straight, scattered }
    }

    fn control_points(&self, t: f32) -> Vec<Vector3<f32>> {
        self.straight
            .iter()
            .zip(&self.scattered)
            .map(|(a, b)| a.lerp(b, t))
            .collect()
    }
}

/// 一个循环内从立方体到随机形状的插值进度
fn morph_progress(time: f32, cycle_duration: f32) -> f32 {
    let transition = 0.15 * cycle_duration;
    let t0 = 0.25 * cycle_duration;
    let t1 = 0.75 * cycle_duration;
    let time = time.rem_euclid(cycle_duration);
    if time < t0 {
        0.0
    } else if time < t0 + transition {
        in_quadratic((time - t0) / transition)
    } else if time < t1 {
        1.0
    } else if time < t1 + transition {
        out_quadratic(1.0 - (time - t1) / transition)
    } else {
        0.0
    }
}

/// 立方体线框的十二条棱弯成随机曲线再恢复，红色辉光衬底
pub struct TwistyCubeDemo {
    program: ShaderProgram<UnlitParams>,
    edges: Vec<Edge>,
    paths: Vec<Geometry<PositionVertex>>,
    blur: BlurEffect,
    aspect: f32,
    cycle_duration: f32,
    time: f32,
}

impl TwistyCubeDemo {
    pub fn new(ctx: &mut DemoContext) -> Result<Self> {
        let corner = |x: f32, y: f32, z: f32| Vector3::new(x, y, z);
        let v = [
            corner(-1.0, -1.0, 1.0),
            corner(-1.0, 1.0, 1.0),
            corner(1.0, 1.0, 1.0),
            corner(1.0, -1.0, 1.0),
            corner(-1.0, -1.0, -1.0),
            corner(-1.0, 1.0, -1.0),
            corner(1.0, 1.0, -1.0),
            corner(1.0, -1.0, -1.0),
        ];
        let pairs = [
            (0, 1), (1, 2), (2, 3), (3, 0),
            (4, 5), (5, 6), (6, 7), (7, 4),
            (4, 0), (5, 1), (6, 2), (7, 3),
        ];
        let rng = ctx.rng();
        let edges: Vec<Edge> = pairs.iter().map(|&(a, b)| Edge::new(v[a], v[b], rng)).collect();
        let paths = edges
            .iter()
            .map(|_| Geometry::from_vertices(&[PositionVertex::default(); CONTROL_POINTS * SEGMENT_POINTS]))
            .collect();

        Ok(Self {
            program: ctx.load_program()?,
            edges,
            paths,
            blur: BlurEffect::new(ctx.width(), ctx.height(), ctx.load_program()?),
            aspect: ctx.aspect(),
            cycle_duration: ctx.cycle_duration(),
            time: 0.0,
        })
    }

    fn update_paths(&mut self) {
        let t = morph_progress(self.time, self.cycle_duration);
        for (edge, path) in self.edges.iter().zip(&mut self.paths) {
            let points = smooth_path(&edge.control_points(t), SEGMENT_POINTS);
            path.update_vertices(|verts| verts.copy_from_slice(&points));
        }
    }
}

fn draw_paths(
    target: &mut FrameBuffer,
    program: &ShaderProgram<UnlitParams>,
    paths: &[Geometry<PositionVertex>],
    mvp: Matrix4<f32>,
    color: Rgba,
    line_width: f32,
) {
    let shader = UnlitShader::new(program, mvp).with_color(color);
    let renderer = Renderer::new(
        PipelineState::default()
            .with_depth_test(false)
            .with_line_width(line_width),
    );
    for path in paths {
        renderer.draw(target, &shader, path, Primitive::LineStrip);
    }
}

impl Demo for TwistyCubeDemo {
    fn update(&mut self, dt: f32) {
        self.time += dt;
    }

    fn render(&mut self, target: &mut FrameBuffer) {
        self.update_paths();

        let angle = 0.5 * (self.time * TAU / self.cycle_duration).cos();
        let mvp = camera(self.aspect, Vector3::new(0.0, 4.0, 4.0)) * TransformFactory::rotation_y(angle);

        // 辉光源：粗红线
        let glow = self.blur.target();
        glow.clear(Rgba::new(0.0, 0.0, 0.0, 0.0));
        draw_paths(glow, &self.program, &self.paths, mvp, Rgba::new(1.0, 0.0, 0.0, 1.0), GLOW_LINE_WIDTH);

        target.clear(gray(0.25));
        draw_paths(target, &self.program, &self.paths, mvp, Rgba::new(1.0, 1.0, 1.0, 1.0), LINE_WIDTH);

        self.blur.render(target, BLUR_PASSES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn morph_holds_the_cube_at_cycle_start_and_end() {
        assert_eq!(morph_progress(0.1, 4.0), 0.0);
        assert_eq!(morph_progress(2.0, 4.0), 1.0);
        assert_eq!(morph_progress(3.9, 4.0), 0.0);
        let rising = morph_progress(1.0 + 0.3, 4.0);
        assert!(rising > 0.0 && rising < 1.0);
    }

    #[test]
    fn straight_edge_runs_between_its_corners() {
        let mut rng = StdRng::seed_from_u64(2);
        let edge = Edge::new(-Vector3::x(), Vector3::x(), &mut rng);
        let points = edge.control_points(0.0);
        assert_eq!(points[0], -Vector3::x());
        assert_eq!(points[CONTROL_POINTS - 1], Vector3::x());
        assert!(edge.control_points(1.0).iter().all(|p| p.abs().max() <= SCATTER));
    }
}
