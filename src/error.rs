use std::path::PathBuf;
use thiserror::Error;

/// 演示程序的统一错误类型
///
/// 所有错误在可执行入口处都是致命的：打印到 stderr 后以状态码 1 退出。
#[derive(Error, Debug)]
pub enum DemoError {
    // ===== 文件与资源 =====
    /// 读取文件失败（着色器源、配置文件等）
    #[error("读取文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 着色器程序源无法解析
    #[error("着色器 {path:?} 编译失败: {message}")]
    ShaderCompile { path: PathBuf, message: String },

    /// 着色器程序声明与 Rust 端着色器类型不匹配
    #[error("着色器 {path:?} 链接失败: {message}")]
    ShaderLink { path: PathBuf, message: String },

    /// 网格文件缺失或格式错误
    #[error("加载网格 {path:?} 失败: {message}")]
    MeshLoad { path: PathBuf, message: String },

    // ===== 配置 =====
    /// 配置文件或命令行参数非法
    #[error("配置错误: {0}")]
    Config(String),

    // ===== 运行时 =====
    /// 缓冲区访问越界
    #[error("缓冲区越界: 偏移 {offset} + 长度 {count} 超出容量 {len}")]
    BufferRange {
        offset: usize,
        count: usize,
        len: usize,
    },

    /// 写出帧图像失败
    #[error("保存帧 {path:?} 失败: {message}")]
    FrameDump { path: PathBuf, message: String },

    /// 窗口系统错误
    #[error("窗口系统错误: {0}")]
    Window(#[from] eframe::Error),
}

pub type Result<T> = std::result::Result<T, DemoError>;

impl DemoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DemoError::Io {
            path: path.into(),
            source,
        }
    }
}
