pub mod tween;
