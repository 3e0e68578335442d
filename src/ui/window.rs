use crate::core::demo::{Demo, FrameLoop};
use crate::core::frame_buffer::FrameBuffer;
use crate::error::{DemoError, Result};
use crate::io::demo_settings::DemoSettings;
use egui::{Color32, ColorImage, TextureHandle, TextureOptions};
use log::{error, info};
use std::cell::RefCell;
use std::rc::Rc;

/// 每帧运行演示并把帧缓冲作为纹理显示；ESC 关闭窗口
struct DemoWindow<D: Demo> {
    demo: D,
    frame_loop: FrameLoop,
    frame_buffer: FrameBuffer,
    texture: Option<TextureHandle>,
    /// 循环中出现的致命错误，窗口关闭后交给调用方
    failure: Rc<RefCell<Option<DemoError>>>,
    finished: bool,
}

impl<D: Demo> DemoWindow<D> {
    fn upload(&mut self, ctx: &egui::Context) {
        let size = [self.frame_buffer.width, self.frame_buffer.height];
        let texture = self.texture.get_or_insert_with(|| {
            ctx.load_texture(
                "demo_frame",
                ColorImage::new(size, Color32::BLACK),
                TextureOptions::default(),
            )
        });
        texture.set(
            ColorImage::from_rgba_unmultiplied(size, &self.frame_buffer.to_rgba8()),
            TextureOptions::default(),
        );
    }
}

impl<D: Demo> eframe::App for DemoWindow<D> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        if !self.finished {
            match self.frame_loop.step(&mut self.demo, &mut self.frame_buffer) {
                Ok(true) => {}
                Ok(false) => {
                    self.finished = true;
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
                Err(e) => {
                    error!("渲染循环失败: {}", e);
                    self.failure.borrow_mut().replace(e);
                    self.finished = true;
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            }
            self.upload(ctx);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if let Some(texture) = &self.texture {
                    ui.add(egui::Image::new(texture).fit_to_exact_size(ui.available_size()));
                }
            });

        ctx.request_repaint();
    }
}

/// 打开窗口运行演示，直到 ESC、窗口关闭或导出完成
pub fn run_window<D: Demo + 'static>(title: &str, demo: D, settings: &DemoSettings) -> Result<()> {
    let frame_loop = FrameLoop::new(settings)?;
    let failure = Rc::new(RefCell::new(None));
    let app = DemoWindow {
        demo,
        frame_loop,
        frame_buffer: FrameBuffer::new(settings.width, settings.height),
        texture: None,
        failure: Rc::clone(&failure),
        finished: false,
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.width as f32, settings.height as f32])
            .with_resizable(false),
        ..Default::default()
    };

    info!("打开窗口 '{}' ({}x{})", title, settings.width, settings.height);
    eframe::run_native(title, options, Box::new(|_cc| Ok(Box::new(app))))?;

    match failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
