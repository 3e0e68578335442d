use crate::io::frame_dump::DumpFormat;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// 演示程序的公共命令行参数
///
/// 未给出的选项依次回退到配置文件和演示自身的默认值。
#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(version, about, long_about = None, disable_help_flag = true)]
pub struct Args {
    // ===== 窗口 =====
    /// 窗口（帧缓冲）宽度
    #[arg(short, long)]
    pub width: Option<usize>,

    /// 窗口（帧缓冲）高度
    #[arg(short = 'h', long)]
    pub height: Option<usize>,

    // ===== 动画 =====
    /// 一个动画循环的时长（秒）
    #[arg(short, long)]
    pub cycle_duration: Option<f32>,

    /// 导出帧时的固定帧率
    #[arg(short, long)]
    pub fps: Option<u32>,

    /// 随机种子，省略时每次运行不同
    #[arg(long)]
    pub seed: Option<u64>,

    // ===== 输出 =====
    /// 逐帧导出图像，导出一个循环后退出
    #[arg(short, long, default_value_t = false)]
    pub dump: bool,

    /// 帧图像输出目录
    #[arg(long)]
    pub dump_dir: Option<PathBuf>,

    /// 帧图像格式
    #[arg(long, value_enum)]
    pub dump_format: Option<DumpFormat>,

    /// 不打开窗口，直接离屏渲染
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// 渲染的总帧数，覆盖 cycle_duration * fps
    #[arg(long)]
    pub frames: Option<usize>,

    // ===== 文件 =====
    /// TOML 配置文件
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 资源根目录（包含 shaders/ 与 meshes/）
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// 显示帮助信息
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_flags_match_the_demo_conventions() {
        let args = Args::try_parse_from(["cube", "-w", "640", "-h", "480", "-c", "2.5", "-f", "30", "-d"])
            .unwrap();
        assert_eq!(args.width, Some(640));
        assert_eq!(args.height, Some(480));
        assert_eq!(args.cycle_duration, Some(2.5));
        assert_eq!(args.fps, Some(30));
        assert!(args.dump);
    }

    #[test]
    fn long_options_parse() {
        let args = Args::try_parse_from([
            "spiral",
            "--dump-format",
            "png",
            "--dump-dir",
            "out",
            "--headless",
            "--frames",
            "3",
            "--seed",
            "42",
        ])
        .unwrap();
        assert_eq!(args.dump_format, Some(DumpFormat::Png));
        assert_eq!(args.dump_dir, Some(PathBuf::from("out")));
        assert!(args.headless);
        assert_eq!(args.frames, Some(3));
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.width, None);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Args::try_parse_from(["cube", "-w", "wide"]).is_err());
        assert!(Args::try_parse_from(["cube", "--dump-format", "gif"]).is_err());
    }
}
