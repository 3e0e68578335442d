pub mod buffer;
pub mod demo;
pub mod frame_buffer;
pub mod geometry;
pub mod rasterizer;
pub mod shader;
pub mod shadow_buffer;
