//! 演示的公共骨架：`Demo` 接口、运行上下文与逐帧循环

use crate::core::frame_buffer::FrameBuffer;
use crate::core::shader::{ProgramParams, ShaderProgram};
use crate::error::Result;
use crate::io::demo_settings::DemoSettings;
use crate::io::frame_dump::FrameDumper;
use crate::io::obj_loader::{ObjMesh, load_obj_mesh};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// 每个演示实现的两个钩子
pub trait Demo {
    /// 推进动画时间
    fn update(&mut self, dt: f32);

    /// 绘制一帧（包括清屏）
    fn render(&mut self, target: &mut FrameBuffer);
}

/// 构造演示时可用的环境：设置、资源路径、随机数
pub struct DemoContext {
    settings: DemoSettings,
    seed: u64,
    rng: StdRng,
}

impl DemoContext {
    pub fn new(settings: DemoSettings) -> Self {
        let seed = settings.seed.unwrap_or_else(|| rand::rng().random());
        info!("随机种子: {}", seed);
        Self {
            settings,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn settings(&self) -> &DemoSettings {
        &self.settings
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn width(&self) -> usize {
        self.settings.width
    }

    pub fn height(&self) -> usize {
        self.settings.height
    }

    pub fn aspect(&self) -> f32 {
        self.settings.aspect()
    }

    pub fn cycle_duration(&self) -> f32 {
        self.settings.cycle_duration
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// 派生一个独立的随机数生成器，供演示在运行期间持有
    pub fn fork_rng(&mut self) -> StdRng {
        StdRng::seed_from_u64(self.rng.random())
    }

    /// 加载 `<assets>/shaders/<name>.toml`
    pub fn load_program<P: ProgramParams>(&self) -> Result<ShaderProgram<P>> {
        let path = self
            .settings
            .assets
            .join("shaders")
            .join(format!("{}.toml", P::NAME));
        ShaderProgram::load(path)
    }

    /// 加载 `<assets>/meshes/<name>`
    pub fn load_mesh(&self, name: &str) -> Result<ObjMesh> {
        load_obj_mesh(self.settings.assets.join("meshes").join(name))
    }
}

/// 帧间隔来源
#[derive(Debug, Clone, Copy)]
pub enum FrameClock {
    /// 墙上时钟
    Realtime { last: Instant },
    /// 固定步长（导出帧、离屏渲染）
    Fixed { dt: f32 },
}

impl FrameClock {
    pub fn realtime() -> Self {
        FrameClock::Realtime {
            last: Instant::now(),
        }
    }

    pub fn fixed(dt: f32) -> Self {
        FrameClock::Fixed { dt }
    }

    /// 返回距上次调用经过的时间（秒）
    pub fn tick(&mut self) -> f32 {
        match self {
            FrameClock::Realtime { last } => {
                let now = Instant::now();
                let dt = now.duration_since(*last).as_secs_f32();
                *last = now;
                dt
            }
            FrameClock::Fixed { dt } => *dt,
        }
    }
}

/// 逐帧循环：render -> update(dt) -> 可选导出，达到总帧数后结束
pub struct FrameLoop {
    clock: FrameClock,
    dumper: Option<FrameDumper>,
    total_frames: Option<usize>,
    frame: usize,
}

impl FrameLoop {
    pub fn new(settings: &DemoSettings) -> Result<Self> {
        let dumper = if settings.dump {
            info!(
                "导出帧到 {:?} ({:?}, {} fps)",
                settings.dump_dir, settings.dump_format, settings.fps
            );
            Some(FrameDumper::new(&settings.dump_dir, settings.dump_format)?)
        } else {
            None
        };

        let (clock, total_frames) = if settings.fixed_step() {
            (
                FrameClock::fixed(settings.frame_time()),
                Some(settings.total_frames()),
            )
        } else {
            (FrameClock::realtime(), settings.frames)
        };

        Ok(Self {
            clock,
            dumper,
            total_frames,
            frame: 0,
        })
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn total_frames(&self) -> Option<usize> {
        self.total_frames
    }

    /// 执行一帧；返回 false 表示循环已结束
    pub fn step(&mut self, demo: &mut dyn Demo, target: &mut FrameBuffer) -> Result<bool> {
        demo.render(target);
        let dt = self.clock.tick();
        demo.update(dt);

        if let Some(dumper) = &mut self.dumper {
            dumper.dump(target)?;
        }
        self.frame += 1;
        debug!("第 {} 帧完成, dt = {:.4}", self.frame, dt);

        let finished = self.total_frames.is_some_and(|total| self.frame >= total);
        if finished {
            info!("已渲染 {} 帧，结束", self.frame);
        }
        Ok(!finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame_buffer::Rgba;

    #[derive(Default)]
    struct Recorder {
        time: f32,
        log: Vec<(&'static str, f32)>,
    }

    impl Demo for Recorder {
        fn update(&mut self, dt: f32) {
            self.time += dt;
            self.log.push(("update", self.time));
        }

        fn render(&mut self, target: &mut FrameBuffer) {
            target.clear(Rgba::new(self.time, 0.0, 0.0, 1.0));
            self.log.push(("render", self.time));
        }
    }

    fn fixed_settings(frames: Option<usize>) -> DemoSettings {
        DemoSettings {
            width: 4,
            height: 4,
            cycle_duration: 0.5,
            fps: 4,
            headless: true,
            frames,
            ..DemoSettings::default()
        }
    }

    #[test]
    fn fixed_loop_renders_before_update_and_stops_after_a_cycle() {
        let settings = fixed_settings(None);
        let mut frame_loop = FrameLoop::new(&settings).unwrap();
        let mut demo = Recorder::default();
        let mut target = FrameBuffer::new(4, 4);

        let mut steps = 0;
        while frame_loop.step(&mut demo, &mut target).unwrap() {
            steps += 1;
        }
        // cycle 0.5s * 4 fps = 2 帧
        assert_eq!(steps + 1, 2);
        assert_eq!(frame_loop.frame(), 2);
        assert_eq!(
            demo.log,
            vec![("render", 0.0), ("update", 0.25), ("render", 0.25), ("update", 0.5)]
        );
    }

    #[test]
    fn frame_count_override_wins() {
        let settings = fixed_settings(Some(3));
        let frame_loop = FrameLoop::new(&settings).unwrap();
        assert_eq!(frame_loop.total_frames(), Some(3));
    }

    #[test]
    fn seeded_contexts_are_reproducible() {
        let settings = DemoSettings {
            seed: Some(11),
            ..DemoSettings::default()
        };
        let mut a = DemoContext::new(settings.clone());
        let mut b = DemoContext::new(settings);
        assert_eq!(a.seed(), 11);
        assert_eq!(a.rng().random::<u64>(), b.rng().random::<u64>());
        assert_eq!(a.fork_rng().random::<u32>(), b.fork_rng().random::<u32>());
    }

    #[test]
    fn realtime_clock_is_monotonic() {
        let mut clock = FrameClock::realtime();
        assert!(clock.tick() >= 0.0);
        let mut fixed = FrameClock::fixed(0.025);
        assert_eq!(fixed.tick(), 0.025);
    }
}
