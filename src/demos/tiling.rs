use super::{camera, look_at_origin};
use crate::core::buffer::{Buffer, BufferTarget};
use crate::core::demo::{Demo, DemoContext};
use crate::core::frame_buffer::{FrameBuffer, Rgba};
use crate::core::geometry::Geometry;
use crate::core::rasterizer::{CullMode, PipelineState, Primitive, Renderer};
use crate::core::shader::ShaderProgram;
use crate::core::shadow_buffer::ShadowBuffer;
use crate::error::Result;
use crate::geometry::shapes::{diamond_outline, hexagon_outline, tile_prism};
use crate::geometry::transform::TransformFactory;
use crate::geometry::vertex::NormalVertex;
use crate::shaders::{DepthShader, InstanceState, Light, PhongParams, PhongShader, ShadowMaps};
use crate::utils::tween::out_quadratic;
use nalgebra::{Matrix4, Vector2, Vector3};
use rand::Rng;
use std::f32::consts::{FRAC_PI_4, PI};

const GRID_ROWS: usize = 12;
const GRID_COLUMNS: usize = 15;
const SHADOW_SIZE: usize = 2048;
const STEP_HEIGHT: f32 = 3.0;
const DROP_DURATION: f32 = 0.3;
/// 砖块厚度与轮廓收缩比例（相邻砖块之间留缝）
const TILE_THICKNESS: f32 = 0.25;
const TILE_INSET: f32 = 0.9;

fn cos_30() -> f32 {
    (PI / 6.0).cos()
}

/// 一组同形状的砖块，共享一份几何体，按实例绘制
struct TileSet {
    prism: Geometry<NormalVertex>,
    /// 每个实例在网格中的 (x, y) 与所在行
    cells: Vec<(Vector2<f32>, usize)>,
    states: Buffer<InstanceState>,
    color: Rgba,
}

impl TileSet {
    fn new(outline: &[Vector2<f32>], cells: Vec<(Vector2<f32>, usize)>, color: Rgba) -> Self {
        let inset: Vec<_> = outline.iter().map(|p| p * TILE_INSET).collect();
        Self {
            prism: Geometry::from_vertices(&tile_prism(&inset, -TILE_THICKNESS, 0.0)),
            states: Buffer::with_len(BufferTarget::ShaderStorage, cells.len()),
            cells,
            color,
        }
    }

    fn update(&mut self, model: &Matrix4<f32>, x_offset: f32, drop_starts: &[f32]) {
        let states = self.states.map();
        for (state, (cell, row)) in states.iter_mut().zip(&self.cells) {
            let height = tile_height(cell.x, x_offset, drop_starts[*row]);
            *state = InstanceState::new(
                model * TransformFactory::translation(&Vector3::new(cell.x, cell.y, height)),
                self.color,
            );
        }
    }
}

/// 砖块在台阶上的高度：左侧为 0，右侧为一级台阶，
/// 中间过渡区里每行在各自的时刻落下
fn tile_height(x: f32, x_offset: f32, drop_start: f32) -> f32 {
    let x = x - x_offset;
    let max_offset = 2.0 * cos_30();
    if x < -max_offset {
        return 0.0;
    }
    if x > max_offset {
        return STEP_HEIGHT;
    }
    let drop_start = drop_start * (1.0 - DROP_DURATION);
    let t = (x + max_offset) / (2.0 * max_offset);
    let s = ((t - drop_start) / DROP_DURATION).clamp(0.0, 1.0);
    out_quadratic(s) * STEP_HEIGHT
}

/// 六边形与菱形铺成的地面，随时间平移并逐行升上台阶，带阴影
pub struct TilingDemo {
    program: ShaderProgram<PhongParams>,
    hexagons: TileSet,
    diamonds: TileSet,
    hexagon_drop_starts: Vec<f32>,
    diamond_drop_starts: Vec<f32>,
    shadow: ShadowBuffer,
    aspect: f32,
    cycle_duration: f32,
    time: f32,
}

impl TilingDemo {
    pub fn new(ctx: &mut DemoContext) -> Result<Self> {
        let c = cos_30();
        let hexagon_cells = (0..GRID_ROWS)
            .flat_map(|i| {
                (0..GRID_COLUMNS).map(move |j| {
                    let x = 2.0 * c * (j as f32 - 0.5 * (GRID_COLUMNS - 1) as f32);
                    let y = 2.0 * (i as f32 - 0.5 * (GRID_ROWS - 1) as f32);
                    (Vector2::new(x, y), i)
                })
            })
            .collect();
        let diamond_cells = (0..GRID_ROWS - 1)
            .flat_map(|i| {
                (0..GRID_COLUMNS - 1).map(move |j| {
                    let x = 2.0 * c * (j as f32 - 0.5 * (GRID_COLUMNS - 2) as f32);
                    let y = 2.0 * (i as f32 - 0.5 * (GRID_ROWS - 2) as f32);
                    (Vector2::new(x, y), i)
                })
            })
            .collect();

        let rng = ctx.rng();
        let hexagon_drop_starts = (0..GRID_ROWS).map(|_| rng.random::<f32>()).collect();
        let diamond_drop_starts = (0..GRID_ROWS - 1).map(|_| rng.random::<f32>()).collect();

        Ok(Self {
            program: ctx.load_program()?,
            hexagons: TileSet::new(&hexagon_outline(), hexagon_cells, Rgba::new(0.9, 0.9, 0.9, 1.0)),
            diamonds: TileSet::new(&diamond_outline(), diamond_cells, Rgba::new(0.9, 0.4, 0.2, 1.0)),
            hexagon_drop_starts,
            diamond_drop_starts,
            shadow: ShadowBuffer::new(SHADOW_SIZE, SHADOW_SIZE),
            aspect: ctx.aspect(),
            cycle_duration: ctx.cycle_duration(),
            time: 0.0,
        })
    }
}

impl Demo for TilingDemo {
    fn update(&mut self, dt: f32) {
        self.time += dt;
    }

    fn render(&mut self, target: &mut FrameBuffer) {
        let x_offset = (self.time / self.cycle_duration).rem_euclid(1.0) * 4.0 * cos_30();
        let model = TransformFactory::rotation_z(FRAC_PI_4)
            * TransformFactory::translation(&Vector3::new(-x_offset, 0.0, 0.0));
        self.hexagons.update(&model, x_offset, &self.hexagon_drop_starts);
        self.diamonds.update(&model, x_offset, &self.diamond_drop_starts);

        // 阴影
        let light_position = Vector3::new(-6.0, 4.0, 6.0);
        let light_view_projection = TransformFactory::ortho_square(10.0, 1.0, 50.0)
            * look_at_origin(light_position);
        self.shadow.clear();
        let shadow_pass = Renderer::new(PipelineState::default().with_polygon_offset(4.0, 4.0));
        for tiles in [&self.hexagons, &self.diamonds] {
            let depth = DepthShader::new(light_view_projection, Matrix4::identity())
                .with_instances(tiles.states.as_slice());
            shadow_pass.draw_arrays_instanced(
                &mut self.shadow,
                &depth,
                &tiles.prism,
                Primitive::Triangles,
                tiles.states.len(),
            );
        }

        // 场景
        target.clear(Rgba::new(0.0, 0.0, 0.0, 0.0));
        let eye = Vector3::new(0.0, -6.0, 15.0);
        let lights = [Light::new(light_position, light_view_projection)];
        let view_projection = camera(self.aspect, eye);
        let renderer = Renderer::new(PipelineState::default().with_cull(CullMode::Back));
        for tiles in [&self.hexagons, &self.diamonds] {
            let shader = PhongShader::new(&self.program, Matrix4::identity(), view_projection, eye, &lights)
                .with_shadows(ShadowMaps::Single(&self.shadow))
                .with_instances(tiles.states.as_slice());
            renderer.draw_arrays_instanced(
                target,
                &shader,
                &tiles.prism,
                Primitive::Triangles,
                tiles.states.len(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_step_up_across_the_transition() {
        let max_offset = 2.0 * cos_30();
        assert_eq!(tile_height(-max_offset - 0.1, 0.0, 0.5), 0.0);
        assert_eq!(tile_height(max_offset + 0.1, 0.0, 0.5), STEP_HEIGHT);
        // 过渡区内单调不减
        let heights: Vec<f32> = (0..=20)
            .map(|i| tile_height(-max_offset + i as f32 * 0.1 * max_offset, 0.0, 0.3))
            .collect();
        assert!(heights.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn scrolling_shifts_the_staircase() {
        let max_offset = 2.0 * cos_30();
        assert_eq!(tile_height(0.0, max_offset + 0.5, 0.5), 0.0);
        assert_eq!(tile_height(0.0, -max_offset - 0.5, 0.5), STEP_HEIGHT);
    }
}
