//! # 软件光栅化管线
//!
//! 类 OpenGL 的固定流程：顶点着色 -> 图元装配 -> 近平面裁剪 -> 背面剔除
//! -> 按水平条带并行光栅化 -> 深度测试 -> 片元着色 -> 混合。
//! 每个条带内按提交顺序处理图元，因此混合结果是确定的。

pub mod clipping;
pub mod line;
pub mod triangle;
pub mod varying;

use crate::core::frame_buffer::{RenderTarget, Rgba, TargetPlanes};
use crate::core::geometry::Geometry;
use crate::core::shader::{Fragment, Shader, VertexOutput};
use crate::geometry::transform::{clip_to_ndc, ndc_to_pixel};
use line::ScreenLine;
use log::{trace, warn};
use nalgebra::Vector2;
use rayon::prelude::*;
use triangle::ScreenTriangle;

pub use varying::Varying;

/// 每个并行条带包含的像素行数
pub const BAND_HEIGHT: usize = 16;

/// 图元拓扑
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
    TriangleStrip,
    Lines,
    LineStrip,
    LineLoop,
}

/// 面剔除模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullMode {
    #[default]
    None,
    /// 剔除正面（逆时针）
    Front,
    /// 剔除背面（顺时针）
    Back,
}

/// 颜色混合模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// 直接覆盖
    #[default]
    Replace,
    /// SRC_ALPHA, ONE_MINUS_SRC_ALPHA
    Alpha,
    /// ONE, ONE
    Additive,
}

impl BlendMode {
    #[inline]
    pub fn apply(self, src: Rgba, dst: Rgba) -> Rgba {
        let blended = match self {
            BlendMode::Replace => src,
            BlendMode::Alpha => src * src.w + dst * (1.0 - src.w),
            BlendMode::Additive => src + dst,
        };
        blended.map(|c| c.clamp(0.0, 1.0))
    }
}

/// 管线状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineState {
    pub depth_test: bool,
    pub depth_write: bool,
    pub cull: CullMode,
    pub blend: BlendMode,
    /// (factor, units)，语义同 glPolygonOffset
    pub polygon_offset: Option<(f32, f32)>,
    /// 线宽（像素）
    pub line_width: f32,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            depth_test: true,
            depth_write: true,
            cull: CullMode::None,
            blend: BlendMode::Replace,
            polygon_offset: None,
            line_width: 1.0,
        }
    }
}

impl PipelineState {
    pub fn with_depth_test(mut self, enabled: bool) -> Self {
        self.depth_test = enabled;
        self
    }

    pub fn with_depth_write(mut self, enabled: bool) -> Self {
        self.depth_write = enabled;
        self
    }

    pub fn with_cull(mut self, cull: CullMode) -> Self {
        self.cull = cull;
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn with_polygon_offset(mut self, factor: f32, units: f32) -> Self {
        self.polygon_offset = Some((factor, units));
        self
    }

    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }
}

/// 屏幕空间顶点：像素坐标、窗口深度、1/w 以及待插值数据
#[derive(Debug, Clone, Copy)]
pub struct ScreenVertex<V> {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub inv_w: f32,
    pub varying: V,
}

impl<V: Copy> ScreenVertex<V> {
    fn from_clip(vertex: &VertexOutput<V>, width: usize, height: usize) -> Self {
        let (ndc, inv_w) = clip_to_ndc(&vertex.position);
        let screen = ndc_to_pixel(&ndc, width as f32, height as f32);
        Self {
            x: screen.x,
            y: screen.y,
            z: screen.z,
            inv_w,
            varying: vertex.varying,
        }
    }
}

/// 图元覆盖的像素行范围 [min_y, max_y]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    pub min_y: usize,
    pub max_y: usize,
}

impl RowSpan {
    #[inline]
    fn overlaps(&self, y0: usize, y1: usize) -> bool {
        self.min_y < y1 && self.max_y >= y0
    }
}

enum RasterPrimitive<V> {
    Triangle(ScreenTriangle<V>),
    Line(ScreenLine<V>),
}

/// 一个条带对应的目标切片
pub struct BandTarget<'a> {
    pub width: usize,
    pub y0: usize,
    pub y1: usize,
    color: Option<&'a mut [Rgba]>,
    depth: &'a mut [f32],
}

impl BandTarget<'_> {
    /// 对单个像素执行深度测试、片元着色和混合
    #[inline]
    pub fn shade<S: Shader>(
        &mut self,
        shader: &S,
        state: &PipelineState,
        x: usize,
        y: usize,
        depth: f32,
        front_facing: bool,
        varying: impl FnOnce() -> S::Varying,
    ) {
        if !(0.0..=1.0).contains(&depth) {
            return;
        }
        let index = (y - self.y0) * self.width + x;
        if state.depth_test && depth >= self.depth[index] {
            return;
        }

        let fragment = Fragment {
            varying: varying(),
            coord: Vector2::new(x as f32 + 0.5, y as f32 + 0.5),
            depth,
            front_facing,
        };
        let Some(color) = shader.fragment(&fragment) else {
            return;
        };

        if state.depth_test && state.depth_write {
            self.depth[index] = depth;
        }
        if let Some(plane) = self.color.as_deref_mut() {
            plane[index] = state.blend.apply(color, plane[index]);
        }
    }
}

/// 渲染器：持有管线状态并执行绘制调用
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    pub state: PipelineState,
}

impl Renderer {
    pub fn new(state: PipelineState) -> Self {
        Self { state }
    }

    /// 按几何体是否带索引自动选择 draw_elements / draw_arrays
    pub fn draw<S: Shader, T: RenderTarget + ?Sized>(
        &self,
        target: &mut T,
        shader: &S,
        geometry: &Geometry<S::Vertex>,
        primitive: Primitive,
    ) {
        self.submit(target, shader, geometry.vertices(), geometry.indices(), primitive, 1);
    }

    pub fn draw_arrays<S: Shader, T: RenderTarget + ?Sized>(
        &self,
        target: &mut T,
        shader: &S,
        geometry: &Geometry<S::Vertex>,
        primitive: Primitive,
    ) {
        self.draw_arrays_instanced(target, shader, geometry, primitive, 1);
    }

    pub fn draw_arrays_instanced<S: Shader, T: RenderTarget + ?Sized>(
        &self,
        target: &mut T,
        shader: &S,
        geometry: &Geometry<S::Vertex>,
        primitive: Primitive,
        instances: usize,
    ) {
        self.submit(target, shader, geometry.vertices(), None, primitive, instances);
    }

    pub fn draw_elements<S: Shader, T: RenderTarget + ?Sized>(
        &self,
        target: &mut T,
        shader: &S,
        geometry: &Geometry<S::Vertex>,
        primitive: Primitive,
    ) {
        self.draw_elements_instanced(target, shader, geometry, primitive, 1);
    }

    pub fn draw_elements_instanced<S: Shader, T: RenderTarget + ?Sized>(
        &self,
        target: &mut T,
        shader: &S,
        geometry: &Geometry<S::Vertex>,
        primitive: Primitive,
        instances: usize,
    ) {
        match geometry.indices() {
            Some(indices) => self.submit(
                target,
                shader,
                geometry.vertices(),
                Some(indices),
                primitive,
                instances,
            ),
            None => warn!("draw_elements 调用的几何体没有索引缓冲，跳过"),
        }
    }

    fn submit<S: Shader, T: RenderTarget + ?Sized>(
        &self,
        target: &mut T,
        shader: &S,
        vertices: &[S::Vertex],
        indices: Option<&[u32]>,
        primitive: Primitive,
        instances: usize,
    ) {
        let TargetPlanes {
            width,
            height,
            color,
            depth,
        } = target.planes();
        if width == 0 || height == 0 || vertices.is_empty() {
            return;
        }

        let mut primitives = Vec::new();
        for instance in 0..instances {
            let shaded: Vec<VertexOutput<S::Varying>> = vertices
                .par_iter()
                .map(|vertex| shader.vertex(vertex, instance))
                .collect();
            self.assemble(&shaded, indices, primitive, width, height, &mut primitives);
        }
        trace!("绘制调用: {:?} x{} -> {} 个图元", primitive, instances, primitives.len());
        if primitives.is_empty() {
            return;
        }

        let state = &self.state;
        let band_len = BAND_HEIGHT * width;
        let rasterize_band = |band_index: usize, color: Option<&mut [Rgba]>, depth: &mut [f32]| {
            let y0 = band_index * BAND_HEIGHT;
            let mut band = BandTarget {
                width,
                y0,
                y1: (y0 + BAND_HEIGHT).min(height),
                color,
                depth,
            };
            for primitive in &primitives {
                match primitive {
                    RasterPrimitive::Triangle(triangle) => {
                        if triangle.rows.overlaps(band.y0, band.y1) {
                            triangle.rasterize(&mut band, shader, state);
                        }
                    }
                    RasterPrimitive::Line(line) => {
                        if line.rows.overlaps(band.y0, band.y1) {
                            line.rasterize(&mut band, shader, state);
                        }
                    }
                }
            }
        };

        match color {
            Some(color) => color
                .par_chunks_mut(band_len)
                .zip(depth.par_chunks_mut(band_len))
                .enumerate()
                .for_each(|(band_index, (color, depth))| {
                    rasterize_band(band_index, Some(color), depth)
                }),
            None => depth
                .par_chunks_mut(band_len)
                .enumerate()
                .for_each(|(band_index, depth)| rasterize_band(band_index, None, depth)),
        }
    }

    /// 图元装配 + 裁剪 + 屏幕映射
    fn assemble<V: Varying>(
        &self,
        shaded: &[VertexOutput<V>],
        indices: Option<&[u32]>,
        primitive: Primitive,
        width: usize,
        height: usize,
        out: &mut Vec<RasterPrimitive<V>>,
    ) {
        let count = indices.map_or(shaded.len(), <[u32]>::len);
        let fetch = |i: usize| -> Option<VertexOutput<V>> {
            let index = match indices {
                Some(indices) => *indices.get(i)? as usize,
                None => i,
            };
            shaded.get(index).copied()
        };

        let mut push_triangle = |a: usize, b: usize, c: usize| {
            let (Some(v0), Some(v1), Some(v2)) = (fetch(a), fetch(b), fetch(c)) else {
                return;
            };
            for clipped in clipping::clip_triangle([v0, v1, v2]) {
                let screen = clipped.map(|v| ScreenVertex::from_clip(&v, width, height));
                if let Some(triangle) = ScreenTriangle::setup(screen, width, height, &self.state) {
                    out.push(RasterPrimitive::Triangle(triangle));
                }
            }
        };

        match primitive {
            Primitive::Triangles => {
                for i in 0..count / 3 {
                    push_triangle(3 * i, 3 * i + 1, 3 * i + 2);
                }
                return;
            }
            Primitive::TriangleStrip => {
                for i in 0..count.saturating_sub(2) {
                    // 保持一致的环绕方向
                    if i % 2 == 0 {
                        push_triangle(i, i + 1, i + 2);
                    } else {
                        push_triangle(i + 1, i, i + 2);
                    }
                }
                return;
            }
            Primitive::Lines | Primitive::LineStrip | Primitive::LineLoop => {}
        }

        let segments: Vec<(usize, usize)> = match primitive {
            Primitive::Lines => (0..count / 2).map(|i| (2 * i, 2 * i + 1)).collect(),
            Primitive::LineStrip => (0..count.saturating_sub(1)).map(|i| (i, i + 1)).collect(),
            _ => {
                let mut segments: Vec<_> =
                    (0..count.saturating_sub(1)).map(|i| (i, i + 1)).collect();
                if count > 2 {
                    segments.push((count - 1, 0));
                }
                segments
            }
        };
        for (a, b) in segments {
            let (Some(v0), Some(v1)) = (fetch(a), fetch(b)) else {
                continue;
            };
            if let Some(clipped) = clipping::clip_line([v0, v1]) {
                let screen = clipped.map(|v| ScreenVertex::from_clip(&v, width, height));
                if let Some(line) = ScreenLine::setup(screen, width, height, self.state.line_width)
                {
                    out.push(RasterPrimitive::Line(line));
                }
            }
        }
    }
}
