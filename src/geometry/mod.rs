// geometry/mod.rs
// 导出几何、变换与程序化网格相关模块
pub mod bsp;
pub mod interpolation;
pub mod shapes;
pub mod transform;
pub mod vertex;
