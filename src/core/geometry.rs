use crate::core::buffer::{Buffer, BufferTarget};

/// 单个顶点属性的布局描述
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: &'static str,
    /// 分量个数（均为 f32）
    pub components: usize,
    /// 在顶点结构中的字节偏移
    pub offset: usize,
}

/// 顶点类型需要提供自己的属性布局
pub trait Vertex: Copy + Default + Send + Sync {
    const ATTRIBUTES: &'static [VertexAttribute];

    fn stride() -> usize {
        std::mem::size_of::<Self>()
    }
}

/// 由属性列表推导偏移量，供 `Vertex` 实现使用
#[macro_export]
macro_rules! vertex_layout {
    ($ty:ty { $($field:ident : $components:expr),+ $(,)? }) => {
        impl $crate::core::geometry::Vertex for $ty {
            const ATTRIBUTES: &'static [$crate::core::geometry::VertexAttribute] = &[
                $($crate::core::geometry::VertexAttribute {
                    name: stringify!($field),
                    components: $components,
                    offset: ::std::mem::offset_of!($ty, $field),
                }),+
            ];
        }
    };
}

/// 顶点缓冲 + 可选索引缓冲 + 顶点布局
#[derive(Debug)]
pub struct Geometry<V: Vertex> {
    vertices: Buffer<V>,
    indices: Option<Buffer<u32>>,
}

impl<V: Vertex> Default for Geometry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Vertex> Geometry<V> {
    pub fn new() -> Self {
        Self {
            vertices: Buffer::with_len(BufferTarget::Array, 0),
            indices: None,
        }
    }

    pub fn from_vertices(vertices: &[V]) -> Self {
        let mut geometry = Self::new();
        geometry.set_data(vertices);
        geometry
    }

    pub fn from_indexed(vertices: &[V], indices: &[u32]) -> Self {
        let mut geometry = Self::new();
        geometry.set_indexed_data(vertices, indices);
        geometry
    }

    /// 设置非索引顶点数据
    pub fn set_data(&mut self, vertices: &[V]) {
        self.vertices.set_data(vertices);
        self.indices = None;
    }

    /// 设置顶点数据与索引数据
    pub fn set_indexed_data(&mut self, vertices: &[V], indices: &[u32]) {
        self.vertices.set_data(vertices);
        self.indices = Some(Buffer::new(BufferTarget::ElementArray, indices));
    }

    /// 原地修改顶点（动态几何体）
    pub fn update_vertices(&mut self, update: impl FnOnce(&mut [V])) {
        update(self.vertices.map());
    }

    pub fn vertices(&self) -> &[V] {
        self.vertices.as_slice()
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_ref().map(Buffer::as_slice)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.as_ref().map_or(0, Buffer::len)
    }

    pub fn layout(&self) -> &'static [VertexAttribute] {
        V::ATTRIBUTES
    }
}
