use crate::error::{DemoError, Result};
use crate::io::frame_dump::DumpFormat;
use crate::utils::tween::Tween;
use log::{info, warn};
use std::path::{Path, PathBuf};
use toml::Value;

/// 配置文件中的设置，缺省项为 None
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemoConfig {
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub cycle_duration: Option<f32>,
    pub fps: Option<u32>,
    pub seed: Option<u64>,
    pub explode_tween: Option<Tween>,
    pub implode_tween: Option<Tween>,
    pub dump: Option<bool>,
    pub dump_dir: Option<PathBuf>,
    pub dump_format: Option<DumpFormat>,
    pub headless: Option<bool>,
    pub frames: Option<usize>,
    pub assets: Option<PathBuf>,
}

/// TOML 配置加载器
///
/// ```toml
/// [window]
/// width = 800
/// height = 800
///
/// [animation]
/// cycle_duration = 3.0
/// fps = 40
/// seed = 7
/// explode = "in_quadratic"
/// implode = "out_bounce"
///
/// [output]
/// dump = true
/// dir = "frames"
/// format = "png"
/// headless = true
/// frames = 120
///
/// [assets]
/// root = "assets"
/// ```
pub struct TomlConfigLoader;

impl TomlConfigLoader {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<DemoConfig> {
        let path = path.as_ref();
        info!("加载配置文件: {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| DemoError::io(path, e))?;
        Self::load_from_content(&content)
    }

    pub fn load_from_content(content: &str) -> Result<DemoConfig> {
        let toml: Value = toml::from_str(content)
            .map_err(|e| DemoError::Config(format!("解析TOML失败: {}", e)))?;

        let mut config = DemoConfig::default();
        if let Some(table) = toml.as_table() {
            for key in table.keys() {
                if !["window", "animation", "output", "assets"].contains(&key.as_str()) {
                    warn!("忽略未知的配置段 [{}]", key);
                }
            }
        }

        if let Some(window) = section(&toml, "window")? {
            Self::parse_window_section(&mut config, window)?;
        }
        if let Some(animation) = section(&toml, "animation")? {
            Self::parse_animation_section(&mut config, animation)?;
        }
        if let Some(output) = section(&toml, "output")? {
            Self::parse_output_section(&mut config, output)?;
        }
        if let Some(assets) = section(&toml, "assets")? {
            Self::parse_assets_section(&mut config, assets)?;
        }
        Ok(config)
    }

    // ===== 各个 section 的解析 =====

    fn parse_window_section(config: &mut DemoConfig, window: &toml::Table) -> Result<()> {
        config.width = get_uint(window, "window", "width")?;
        config.height = get_uint(window, "window", "height")?;
        Ok(())
    }

    fn parse_animation_section(config: &mut DemoConfig, animation: &toml::Table) -> Result<()> {
        config.cycle_duration = get_f32(animation, "animation", "cycle_duration")?;
        config.fps = get_uint(animation, "animation", "fps")?;
        config.seed = get_uint(animation, "animation", "seed")?;
        config.explode_tween = get_tween(animation, "animation", "explode")?;
        config.implode_tween = get_tween(animation, "animation", "implode")?;
        Ok(())
    }

    fn parse_output_section(config: &mut DemoConfig, output: &toml::Table) -> Result<()> {
        config.dump = get_bool(output, "output", "dump")?;
        config.dump_dir = get_str(output, "output", "dir")?.map(PathBuf::from);
        config.dump_format = match get_str(output, "output", "format")? {
            Some("ppm") => Some(DumpFormat::Ppm),
            Some("png") => Some(DumpFormat::Png),
            Some(other) => {
                return Err(DemoError::Config(format!(
                    "[output] format 只能是 ppm 或 png，实际为 '{}'",
                    other
                )));
            }
            None => None,
        };
        config.headless = get_bool(output, "output", "headless")?;
        config.frames = get_uint(output, "output", "frames")?;
        Ok(())
    }

    fn parse_assets_section(config: &mut DemoConfig, assets: &toml::Table) -> Result<()> {
        config.assets = get_str(assets, "assets", "root")?.map(PathBuf::from);
        Ok(())
    }
}

fn section<'a>(toml: &'a Value, name: &str) -> Result<Option<&'a toml::Table>> {
    match toml.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_table()
            .map(Some)
            .ok_or_else(|| DemoError::Config(format!("[{}] 必须是一个表", name))),
    }
}

fn type_error(section: &str, key: &str, expected: &str) -> DemoError {
    DemoError::Config(format!("[{}] {} 应为{}", section, key, expected))
}

/// 读取非负整数；超出目标类型范围同样是错误
fn get_uint<T: TryFrom<i64>>(table: &toml::Table, section: &str, key: &str) -> Result<Option<T>> {
    match table.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_integer()
            .filter(|v| *v >= 0)
            .and_then(|v| T::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| {
                type_error(
                    section,
                    key,
                    &format!("不超过 {} 位的非负整数", std::mem::size_of::<T>() * 8),
                )
            }),
    }
}

fn get_f32(table: &toml::Table, section: &str, key: &str) -> Result<Option<f32>> {
    match table.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_float()
            .or_else(|| value.as_integer().map(|v| v as f64))
            .map(|v| Some(v as f32))
            .ok_or_else(|| type_error(section, key, "数字")),
    }
}

fn get_bool(table: &toml::Table, section: &str, key: &str) -> Result<Option<bool>> {
    match table.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| type_error(section, key, "布尔值")),
    }
}

fn get_tween(table: &toml::Table, section: &str, key: &str) -> Result<Option<Tween>> {
    match table.get(key) {
        None => Ok(None),
        Some(value) => value
            .clone()
            .try_into::<Tween>()
            .map(Some)
            .map_err(|_| type_error(section, key, "缓动曲线名（如 in_quadratic、out_back）")),
    }
}

fn get_str<'a>(table: &'a toml::Table, section: &str, key: &str) -> Result<Option<&'a str>> {
    match table.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or_else(|| type_error(section, key, "字符串")),
    }
}
