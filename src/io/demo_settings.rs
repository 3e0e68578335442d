use crate::error::{DemoError, Result};
use crate::io::args::Args;
use crate::io::config_loader::DemoConfig;
use crate::io::frame_dump::DumpFormat;
use crate::utils::tween::Tween;
use std::path::PathBuf;

/// 导出帧时的默认帧率
pub const DEFAULT_FPS: u32 = 40;

/// 每个演示自带的默认值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoDefaults {
    pub width: usize,
    pub height: usize,
    pub cycle_duration: f32,
}

impl Default for DemoDefaults {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            cycle_duration: 3.0,
        }
    }
}

impl DemoDefaults {
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_cycle_duration(mut self, cycle_duration: f32) -> Self {
        self.cycle_duration = cycle_duration;
        self
    }
}

/// 解析完成的运行设置（命令行 > 配置文件 > 演示默认值）
#[derive(Debug, Clone, PartialEq)]
pub struct DemoSettings {
    pub width: usize,
    pub height: usize,
    pub cycle_duration: f32,
    pub fps: u32,
    pub seed: Option<u64>,
    /// 切片演示的分离与合拢曲线（仅来自配置文件）
    pub explode_tween: Tween,
    pub implode_tween: Tween,
    pub dump: bool,
    pub dump_dir: PathBuf,
    pub dump_format: DumpFormat,
    pub headless: bool,
    pub frames: Option<usize>,
    pub assets: PathBuf,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self::resolve(&Args::default(), &DemoConfig::default(), &DemoDefaults::default())
    }
}

impl DemoSettings {
    pub fn resolve(args: &Args, config: &DemoConfig, defaults: &DemoDefaults) -> Self {
        Self {
            width: args.width.or(config.width).unwrap_or(defaults.width),
            height: args.height.or(config.height).unwrap_or(defaults.height),
            cycle_duration: args
                .cycle_duration
                .or(config.cycle_duration)
                .unwrap_or(defaults.cycle_duration),
            fps: args.fps.or(config.fps).unwrap_or(DEFAULT_FPS),
            seed: args.seed.or(config.seed),
            explode_tween: config.explode_tween.unwrap_or(Tween::InQuadratic),
            implode_tween: config.implode_tween.unwrap_or(Tween::OutQuadratic),
            dump: args.dump || config.dump.unwrap_or(false),
            dump_dir: args
                .dump_dir
                .clone()
                .or_else(|| config.dump_dir.clone())
                .unwrap_or_else(|| PathBuf::from(".")),
            dump_format: args.dump_format.or(config.dump_format).unwrap_or_default(),
            headless: args.headless || config.headless.unwrap_or(false),
            frames: args.frames.or(config.frames),
            assets: args
                .assets
                .clone()
                .or_else(|| config.assets.clone())
                .unwrap_or_else(|| PathBuf::from("assets")),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(DemoError::Config("窗口宽度和高度必须大于0".to_string()));
        }
        if !(self.cycle_duration.is_finite() && self.cycle_duration > 0.0) {
            return Err(DemoError::Config(format!(
                "循环时长必须为正数，实际为 {}",
                self.cycle_duration
            )));
        }
        if self.fps == 0 {
            return Err(DemoError::Config("帧率必须大于0".to_string()));
        }
        if self.frames == Some(0) {
            return Err(DemoError::Config("帧数必须大于0".to_string()));
        }
        Ok(())
    }

    /// 固定步长模式下的总帧数
    pub fn total_frames(&self) -> usize {
        self.frames
            .unwrap_or_else(|| (self.cycle_duration * self.fps as f32).round() as usize)
    }

    /// 固定步长（秒）
    pub fn frame_time(&self) -> f32 {
        1.0 / self.fps as f32
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// 是否使用固定步长（导出或离屏渲染）
    pub fn fixed_step(&self) -> bool {
        self.dump || self.headless
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_config_overrides_defaults() {
        let args = Args {
            width: Some(320),
            ..Default::default()
        };
        let config = DemoConfig {
            width: Some(640),
            height: Some(480),
            dump_format: Some(DumpFormat::Png),
            implode_tween: Some(Tween::OutBounce),
            ..Default::default()
        };
        let defaults = DemoDefaults::default().with_size(512, 512).with_cycle_duration(4.0);

        let settings = DemoSettings::resolve(&args, &config, &defaults);
        assert_eq!(settings.width, 320);
        assert_eq!(settings.height, 480);
        assert_eq!(settings.cycle_duration, 4.0);
        assert_eq!(settings.fps, DEFAULT_FPS);
        assert_eq!(settings.dump_format, DumpFormat::Png);
        assert_eq!(settings.assets, PathBuf::from("assets"));
        assert_eq!(settings.explode_tween, Tween::InQuadratic);
        assert_eq!(settings.implode_tween, Tween::OutBounce);
    }

    #[test]
    fn total_frames_covers_one_cycle_unless_overridden() {
        let mut settings = DemoSettings::default();
        assert_eq!(settings.total_frames(), 120);
        settings.frames = Some(5);
        assert_eq!(settings.total_frames(), 5);
    }

    #[test]
    fn validation_rejects_degenerate_values() {
        let valid = DemoSettings::default();
        assert!(valid.validate().is_ok());

        for broken in [
            DemoSettings { width: 0, ..valid.clone() },
            DemoSettings { cycle_duration: -1.0, ..valid.clone() },
            DemoSettings { fps: 0, ..valid.clone() },
            DemoSettings { frames: Some(0), ..valid.clone() },
        ] {
            assert!(matches!(broken.validate(), Err(DemoError::Config(_))));
        }
    }
}
