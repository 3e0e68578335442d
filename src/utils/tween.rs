//! 缓动函数：把归一化时间 t ∈ [0, 1] 映射为缓动后的进度

use serde::Deserialize;

/// 回弹曲线的过冲系数
const BACK_OVERSHOOT: f32 = 1.70158;

/// 由"缓入"曲线构造"缓出"曲线：1 - f(1 - t)
#[inline]
pub fn out(f: fn(f32) -> f32, t: f32) -> f32 {
    1.0 - f(1.0 - t)
}

/// 由"缓入"曲线构造"缓入缓出"曲线
#[inline]
pub fn in_out(f: fn(f32) -> f32, t: f32) -> f32 {
    if t < 0.5 {
        0.5 * f(2.0 * t)
    } else {
        0.5 + 0.5 * out(f, 2.0 * t - 1.0)
    }
}

pub fn linear(t: f32) -> f32 {
    t
}

pub fn in_quadratic(t: f32) -> f32 {
    t * t
}

pub fn out_quadratic(t: f32) -> f32 {
    out(in_quadratic, t)
}

pub fn in_out_quadratic(t: f32) -> f32 {
    in_out(in_quadratic, t)
}

pub fn in_back(t: f32) -> f32 {
    t * t * ((BACK_OVERSHOOT + 1.0) * t - BACK_OVERSHOOT)
}

pub fn out_back(t: f32) -> f32 {
    out(in_back, t)
}

pub fn in_out_back(t: f32) -> f32 {
    in_out(in_back, t)
}

/// Penner 弹跳曲线的分段抛物线
pub fn out_bounce(t: f32) -> f32 {
    const SCALE: f32 = 7.5625;
    const STEP: f32 = 2.75;
    if t < 1.0 / STEP {
        SCALE * t * t
    } else if t < 2.0 / STEP {
        let t = t - 1.5 / STEP;
        SCALE * t * t + 0.75
    } else if t < 2.5 / STEP {
        let t = t - 2.25 / STEP;
        SCALE * t * t + 0.9375
    } else {
        let t = t - 2.625 / STEP;
        SCALE * t * t + 0.984375
    }
}

pub fn in_bounce(t: f32) -> f32 {
    out(out_bounce, t)
}

pub fn in_out_bounce(t: f32) -> f32 {
    in_out(in_bounce, t)
}

/// 具名缓动曲线，配置文件中写作 `in_quadratic`、`out_bounce` 等
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tween {
    Linear,
    #[default]
    InQuadratic,
    OutQuadratic,
    InOutQuadratic,
    InBack,
    OutBack,
    InOutBack,
    InBounce,
    OutBounce,
    InOutBounce,
}

impl Tween {
    pub const ALL: [Tween; 10] = [
        Tween::Linear,
        Tween::InQuadratic,
        Tween::OutQuadratic,
        Tween::InOutQuadratic,
        Tween::InBack,
        Tween::OutBack,
        Tween::InOutBack,
        Tween::InBounce,
        Tween::OutBounce,
        Tween::InOutBounce,
    ];

    pub fn function(self) -> fn(f32) -> f32 {
        match self {
            Tween::Linear => linear,
            Tween::InQuadratic => in_quadratic,
            Tween::OutQuadratic => out_quadratic,
            Tween::InOutQuadratic => in_out_quadratic,
            Tween::InBack => in_back,
            Tween::OutBack => out_back,
            Tween::InOutBack => in_out_back,
            Tween::InBounce => in_bounce,
            Tween::OutBounce => out_bounce,
            Tween::InOutBounce => in_out_bounce,
        }
    }

    /// 对 t 先钳制到 [0, 1] 再求值
    pub fn eval(self, t: f32) -> f32 {
        (self.function())(t.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn every_curve_starts_at_zero_and_ends_at_one() {
        for tween in Tween::ALL {
            assert!(tween.eval(0.0).abs() < EPS, "{tween:?} at 0");
            assert!((tween.eval(1.0) - 1.0).abs() < EPS, "{tween:?} at 1");
        }
    }

    #[test]
    fn in_out_curves_pass_through_midpoint() {
        for tween in [Tween::InOutQuadratic, Tween::InOutBack, Tween::InOutBounce] {
            assert!((tween.eval(0.5) - 0.5).abs() < EPS, "{tween:?}");
        }
    }

    #[test]
    fn out_is_point_reflection_of_in() {
        for i in 0..=20 {
            let t = i as f32 / 20.0;
            assert!((out_quadratic(t) + in_quadratic(1.0 - t) - 1.0).abs() < EPS);
            assert!((out_back(t) + in_back(1.0 - t) - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn quadratic_values() {
        assert_eq!(in_quadratic(0.5), 0.25);
        assert_eq!(out_quadratic(0.5), 0.75);
        assert!((in_out_quadratic(0.25) - 0.125).abs() < EPS);
    }

    #[test]
    fn back_overshoots_below_zero() {
        let min = (1..100)
            .map(|i| in_back(i as f32 / 100.0))
            .fold(f32::INFINITY, f32::min);
        assert!(min < -0.09 && min > -0.11);
        assert!(out_back(0.6) > 1.0);
    }

    #[test]
    fn bounce_segments_are_continuous() {
        for boundary in [1.0 / 2.75, 2.0 / 2.75, 2.5 / 2.75] {
            let before = out_bounce(boundary - 1e-4);
            let after = out_bounce(boundary + 1e-4);
            assert!((before - after).abs() < 1e-2, "jump at {boundary}");
        }
        assert!((out_bounce(1.0 / 2.75) - 1.0).abs() < EPS);
    }

    #[test]
    fn names_deserialize_in_snake_case() {
        let parse = |name: &str| toml::Value::String(name.to_string()).try_into::<Tween>();
        assert_eq!(parse("in_quadratic").unwrap(), Tween::InQuadratic);
        assert_eq!(parse("in_out_bounce").unwrap(), Tween::InOutBounce);
        assert!(parse("InQuadratic").is_err());
    }

    #[test]
    fn eval_clamps_input() {
        assert_eq!(Tween::OutQuadratic.eval(-3.0), 0.0);
        assert_eq!(Tween::Linear.eval(7.0), 1.0);
    }
}
