//! 可执行入口的公共流程：日志、参数解析、窗口或离屏循环，以及统一的致命错误处理

use crate::core::demo::{Demo, DemoContext, FrameLoop};
use crate::core::frame_buffer::FrameBuffer;
use crate::error::Result;
use crate::io::args::Args;
use crate::io::config_loader::{DemoConfig, TomlConfigLoader};
use crate::io::demo_settings::{DemoDefaults, DemoSettings};
use crate::ui::run_window;
use clap::Parser;
use env_logger::{Builder, Env};
use log::{error, info};
use std::time::Instant;

/// 初始化日志（`RUST_LOG`，默认 info）
pub fn init_logging() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("wgpu_hal", log::LevelFilter::Error)
        .filter_module("eframe", log::LevelFilter::Warn)
        .filter_module("egui_glow", log::LevelFilter::Warn)
        .init();
}

/// 运行一个演示；任何错误都会打印到 stderr 并以状态码 1 退出
pub fn run<D, F>(title: &str, defaults: DemoDefaults, factory: F)
where
    D: Demo + 'static,
    F: FnOnce(&mut DemoContext) -> Result<D>,
{
    init_logging();
    if let Err(e) = try_run(title, defaults, factory) {
        error!("{}", e);
        eprintln!("{}: {}", title, e);
        std::process::exit(1);
    }
}

fn try_run<D, F>(title: &str, defaults: DemoDefaults, factory: F) -> Result<()>
where
    D: Demo + 'static,
    F: FnOnce(&mut DemoContext) -> Result<D>,
{
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => TomlConfigLoader::load_from_file(path)?,
        None => DemoConfig::default(),
    };
    let settings = DemoSettings::resolve(&args, &config, &defaults);
    settings.validate()?;
    info!(
        "{}: {}x{}, 循环 {}s, {} fps, 资源目录 {:?}",
        title, settings.width, settings.height, settings.cycle_duration, settings.fps, settings.assets
    );

    let mut context = DemoContext::new(settings.clone());
    let mut demo = factory(&mut context)?;

    if settings.headless {
        run_headless(&mut demo, &settings)?;
        Ok(())
    } else {
        run_window(title, demo, &settings)
    }
}

/// 不打开窗口，以固定步长渲染所有帧，返回最后一帧
pub fn run_headless(demo: &mut dyn Demo, settings: &DemoSettings) -> Result<FrameBuffer> {
    let settings = DemoSettings {
        headless: true,
        ..settings.clone()
    };
    let mut frame_loop = FrameLoop::new(&settings)?;
    let mut target = FrameBuffer::new(settings.width, settings.height);

    let start = Instant::now();
    while frame_loop.step(demo, &mut target)? {}
    info!(
        "离屏渲染 {} 帧，用时 {:.2?}",
        frame_loop.frame(),
        start.elapsed()
    );
    Ok(target)
}
