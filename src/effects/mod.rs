//! 后处理效果

pub mod blur;

pub use blur::BlurEffect;
