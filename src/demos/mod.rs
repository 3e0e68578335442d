//! 各个演示的场景逻辑；可执行入口见 `src/bin/`

pub mod collapse;
pub mod cube;
pub mod donut;
pub mod fliptiling;
pub mod glowdonut;
pub mod multishadow;
pub mod rubik;
pub mod slices;
pub mod slicesshadows;
pub mod spiral;
pub mod strips;
pub mod tiling;
pub mod twistycube;
pub mod xdonut;

use crate::core::frame_buffer::Rgba;
use crate::geometry::transform::TransformFactory;
use nalgebra::{Matrix4, Vector3};
use std::f32::consts::{PI, TAU};

/// 所有演示共用的透视参数
const FOV_Y: f32 = PI / 4.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

/// 45° 透视投影 * 看向原点、y 轴朝上的视图矩阵
pub(crate) fn camera(aspect: f32, eye: Vector3<f32>) -> Matrix4<f32> {
    let projection = TransformFactory::perspective(FOV_Y, aspect, NEAR, FAR);
    projection * look_at_origin(eye)
}

pub(crate) fn look_at_origin(eye: Vector3<f32>) -> Matrix4<f32> {
    TransformFactory::look_at(&eye, &Vector3::zeros())
}

/// 绕 `axis` 随循环来回摆动 ±0.3 弧度
pub(crate) fn wobble(axis: Vector3<f32>, time: f32, cycle_duration: f32) -> Matrix4<f32> {
    let angle = 0.3 * (time * TAU / cycle_duration).cos();
    TransformFactory::rotation(&axis, angle)
}

/// 不透明灰色
pub(crate) fn gray(level: f32) -> Rgba {
    Rgba::new(level, level, level, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::run_headless;
    use crate::core::demo::{Demo, DemoContext};
    use crate::error::Result;
    use crate::io::demo_settings::DemoSettings;
    use std::path::Path;

    fn context() -> DemoContext {
        DemoContext::new(DemoSettings {
            width: 48,
            height: 40,
            cycle_duration: 3.0,
            fps: 2,
            frames: Some(3),
            seed: Some(1),
            headless: true,
            assets: Path::new(env!("CARGO_MANIFEST_DIR")).join("assets"),
            ..DemoSettings::default()
        })
    }

    /// 离屏跑几帧，检查最后一帧不是纯色
    fn smoke<D: Demo>(factory: impl FnOnce(&mut DemoContext) -> Result<D>) {
        let mut ctx = context();
        let mut demo = factory(&mut ctx).unwrap();
        let frame = run_headless(&mut demo, ctx.settings()).unwrap();
        let first = frame.pixel(0, 0);
        assert!(
            frame.color_buffer().iter().any(|c| (c - first).norm() > 1e-3),
            "画面没有任何内容"
        );
    }

    #[test]
    fn camera_looks_at_the_origin() {
        let vp = camera(1.0, Vector3::new(0.0, 0.0, 4.0));
        let clip = vp * Vector3::zeros().push(1.0);
        assert!(clip.x.abs() < 1e-6 && clip.y.abs() < 1e-6);
        assert!(clip.w > 0.0);
    }

    #[test]
    fn wobble_peaks_at_cycle_start() {
        let m = wobble(Vector3::z(), 0.0, 3.0);
        let expected = TransformFactory::rotation_z(0.3);
        assert!((m - expected).norm() < 1e-5);
    }

    #[test]
    fn cube_renders() {
        smoke(cube::CubeDemo::new);
    }

    #[test]
    fn donut_renders() {
        smoke(donut::DonutDemo::new);
    }

    #[test]
    fn xdonut_renders() {
        smoke(xdonut::XDonutDemo::new);
    }

    #[test]
    fn glowdonut_renders() {
        smoke(glowdonut::GlowDonutDemo::new);
    }

    #[test]
    fn rubik_renders() {
        smoke(rubik::RubikDemo::new);
    }

    #[test]
    fn collapse_renders() {
        smoke(collapse::CollapseDemo::new);
    }

    #[test]
    fn spiral_renders() {
        smoke(spiral::SpiralDemo::new);
    }

    #[test]
    fn strips_renders() {
        smoke(strips::StripsDemo::new);
    }

    #[test]
    fn tiling_renders() {
        smoke(tiling::TilingDemo::new);
    }

    #[test]
    fn fliptiling_renders() {
        smoke(fliptiling::FlipTilingDemo::new);
    }

    #[test]
    fn slices_renders() {
        smoke(slices::SlicesDemo::new);
    }

    #[test]
    fn slicesshadows_renders() {
        smoke(slicesshadows::SlicesShadowsDemo::new);
    }

    #[test]
    fn multishadow_renders() {
        smoke(multishadow::MultiShadowDemo::new);
    }

    #[test]
    fn twistycube_renders() {
        smoke(twistycube::TwistyCubeDemo::new);
    }
}
