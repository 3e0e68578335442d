use nalgebra::{Vector2, Vector4};
use rayon::prelude::*;

/// 线性 RGBA 颜色，各分量范围 [0, 1]
pub type Rgba = Vector4<f32>;

/// 深度缓冲清除值（远平面）
pub const DEPTH_CLEAR: f32 = 1.0;

/// 渲染目标各平面的可变视图，供光栅化器写入
pub struct TargetPlanes<'a> {
    pub width: usize,
    pub height: usize,
    /// 颜色平面；纯深度目标（阴影缓冲）为 None
    pub color: Option<&'a mut [Rgba]>,
    pub depth: &'a mut [f32],
}

/// 可以作为绘制目标的缓冲区
pub trait RenderTarget {
    fn planes(&mut self) -> TargetPlanes<'_>;
}

/// 帧缓冲区：颜色 + 深度，同时可以作为纹理被采样
#[derive(Debug)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    color_buffer: Vec<Rgba>,
    depth_buffer: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let num_pixels = width * height;
        FrameBuffer {
            width,
            height,
            color_buffer: vec![Rgba::new(0.0, 0.0, 0.0, 1.0); num_pixels],
            depth_buffer: vec![DEPTH_CLEAR; num_pixels],
        }
    }

    /// 同时清除颜色与深度
    pub fn clear(&mut self, color: Rgba) {
        self.clear_color(color);
        self.clear_depth();
    }

    pub fn clear_color(&mut self, color: Rgba) {
        let color = color.map(|c| c.clamp(0.0, 1.0));
        self.color_buffer.par_iter_mut().for_each(|c| *c = color);
    }

    pub fn clear_depth(&mut self) {
        self.depth_buffer.par_iter_mut().for_each(|d| *d = DEPTH_CLEAR);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        self.color_buffer[y * self.width + x]
    }

    pub fn depth(&self, x: usize, y: usize) -> f32 {
        self.depth_buffer[y * self.width + x]
    }

    pub fn color_buffer(&self) -> &[Rgba] {
        &self.color_buffer
    }

    /// 把帧缓冲当作纹理采样：双线性过滤，边缘钳制
    ///
    /// `uv` 原点在左上角，与像素行顺序一致。
    pub fn sample(&self, uv: Vector2<f32>) -> Rgba {
        if self.width == 0 || self.height == 0 {
            return Rgba::zeros();
        }
        let x = uv.x * self.width as f32 - 0.5;
        let y = uv.y * self.height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;

        let texel = |tx: f32, ty: f32| {
            let tx = (tx.max(0.0) as usize).min(self.width - 1);
            let ty = (ty.max(0.0) as usize).min(self.height - 1);
            self.color_buffer[ty * self.width + tx]
        };

        let top = texel(x0, y0) * (1.0 - fx) + texel(x0 + 1.0, y0) * fx;
        let bottom = texel(x0, y0 + 1.0) * (1.0 - fx) + texel(x0 + 1.0, y0 + 1.0) * fx;
        top * (1.0 - fy) + bottom * fy
    }

    /// 读回 RGB8 字节（首行为图像顶部）
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.width * self.height * 3];
        bytes
            .par_chunks_mut(3)
            .zip(self.color_buffer.par_iter())
            .for_each(|(out, color)| {
                out[0] = unit_to_u8(color.x);
                out[1] = unit_to_u8(color.y);
                out[2] = unit_to_u8(color.z);
            });
        bytes
    }

    /// 读回 RGBA8 字节，alpha 固定为不透明（用于窗口显示）
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.width * self.height * 4];
        bytes
            .par_chunks_mut(4)
            .zip(self.color_buffer.par_iter())
            .for_each(|(out, color)| {
                out[0] = unit_to_u8(color.x);
                out[1] = unit_to_u8(color.y);
                out[2] = unit_to_u8(color.z);
                out[3] = 255;
            });
        bytes
    }
}

impl RenderTarget for FrameBuffer {
    fn planes(&mut self) -> TargetPlanes<'_> {
        TargetPlanes {
            width: self.width,
            height: self.height,
            color: Some(&mut self.color_buffer),
            depth: &mut self.depth_buffer,
        }
    }
}

#[inline]
fn unit_to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}
