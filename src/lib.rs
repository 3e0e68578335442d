//! 软件光栅化的实时渲染小品合集
//!
//! `core` 提供类 GPU 的缓冲、帧缓冲、阴影缓冲、着色器与光栅化管线，
//! `demos` 中每个演示对应 `src/bin/` 下的一个可执行程序。

pub mod app;
pub mod core;
pub mod demos;
pub mod effects;
pub mod error;
pub mod geometry;
pub mod io;
pub mod shaders;
pub mod ui;
pub mod utils;

pub use error::{DemoError, Result};
