use crate::vertex_layout;
use nalgebra::{Vector2, Vector3};

/// 表面着色器读取顶点属性的统一接口；缺省属性给出中性值
pub trait SurfaceVertex: crate::core::geometry::Vertex {
    fn position(&self) -> Vector3<f32>;

    fn normal(&self) -> Vector3<f32> {
        Vector3::z()
    }

    fn color(&self) -> Vector3<f32> {
        Vector3::repeat(1.0)
    }

    fn uv(&self) -> Vector2<f32> {
        Vector2::zeros()
    }
}

/// 仅位置（线框、曲线）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct PositionVertex {
    pub position: Vector3<f32>,
}

/// 位置 + 法线
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct NormalVertex {
    pub position: Vector3<f32>,
    pub normal: Vector3<f32>,
}

/// 位置 + 法线 + 颜色
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct ColoredVertex {
    pub position: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub color: Vector3<f32>,
}

/// 位置 + 法线 + 纹理坐标
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct TexturedVertex {
    pub position: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub uv: Vector2<f32>,
}

/// 全屏四边形顶点（NDC 位置 + 纹理坐标）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct QuadVertex {
    pub position: Vector2<f32>,
    pub uv: Vector2<f32>,
}

vertex_layout!(PositionVertex { position: 3 });
vertex_layout!(NormalVertex { position: 3, normal: 3 });
vertex_layout!(ColoredVertex { position: 3, normal: 3, color: 3 });
vertex_layout!(TexturedVertex { position: 3, normal: 3, uv: 2 });
vertex_layout!(QuadVertex { position: 2, uv: 2 });

impl PositionVertex {
    pub fn new(position: Vector3<f32>) -> Self {
        Self { position }
    }
}

impl NormalVertex {
    pub fn new(position: Vector3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

impl ColoredVertex {
    pub fn new(position: Vector3<f32>, normal: Vector3<f32>, color: Vector3<f32>) -> Self {
        Self {
            position,
            normal,
            color,
        }
    }
}

impl TexturedVertex {
    pub fn new(position: Vector3<f32>, normal: Vector3<f32>, uv: Vector2<f32>) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

impl SurfaceVertex for PositionVertex {
    fn position(&self) -> Vector3<f32> {
        self.position
    }
}

impl SurfaceVertex for NormalVertex {
    fn position(&self) -> Vector3<f32> {
        self.position
    }

    fn normal(&self) -> Vector3<f32> {
        self.normal
    }
}

impl SurfaceVertex for ColoredVertex {
    fn position(&self) -> Vector3<f32> {
        self.position
    }

    fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    fn color(&self) -> Vector3<f32> {
        self.color
    }
}

impl SurfaceVertex for TexturedVertex {
    fn position(&self) -> Vector3<f32> {
        self.position
    }

    fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    fn uv(&self) -> Vector2<f32> {
        self.uv
    }
}
