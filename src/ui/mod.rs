//! 演示窗口

pub mod window;

pub use window::run_window;
