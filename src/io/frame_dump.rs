use crate::core::frame_buffer::FrameBuffer;
use crate::error::{DemoError, Result};
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, ImageEncoder};
use log::debug;
use serde::Deserialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// 帧图像格式
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpFormat {
    /// 二进制 PPM (P6)
    #[default]
    Ppm,
    Png,
}

impl DumpFormat {
    pub fn extension(self) -> &'static str {
        match self {
            DumpFormat::Ppm => "ppm",
            DumpFormat::Png => "png",
        }
    }
}

/// 逐帧写出 `%05d.<ext>`，首行为图像顶部
pub struct FrameDumper {
    dir: PathBuf,
    format: DumpFormat,
    frame: usize,
}

impl FrameDumper {
    pub fn new<P: AsRef<Path>>(dir: P, format: DumpFormat) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| DemoError::io(&dir, e))?;
        Ok(Self {
            dir,
            format,
            frame: 0,
        })
    }

    /// 已写出的帧数
    pub fn frames_written(&self) -> usize {
        self.frame
    }

    pub fn dump(&mut self, frame_buffer: &FrameBuffer) -> Result<PathBuf> {
        let path = self
            .dir
            .join(format!("{:05}.{}", self.frame, self.format.extension()));
        let rgb = frame_buffer.to_rgb8();
        let (width, height) = (frame_buffer.width as u32, frame_buffer.height as u32);

        let to_error = |message: String| DemoError::FrameDump {
            path: path.clone(),
            message,
        };
        match self.format {
            DumpFormat::Ppm => {
                let file = File::create(&path).map_err(|e| DemoError::io(&path, e))?;
                PnmEncoder::new(BufWriter::new(file))
                    .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary))
                    .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
                    .map_err(|e| to_error(e.to_string()))?;
            }
            DumpFormat::Png => {
                image::save_buffer(&path, &rgb, width, height, ExtendedColorType::Rgb8)
                    .map_err(|e| to_error(e.to_string()))?;
            }
        }

        debug!("帧已保存: {}", path.display());
        self.frame += 1;
        Ok(path)
    }
}
