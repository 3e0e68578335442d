use nalgebra::{Vector2, Vector3, Vector4};

/// 顶点着色器输出、在图元内插值后交给片元着色器的数据
pub trait Varying: Copy + Send + Sync {
    /// 按权重组合三个顶点的值，权重之和为 1
    fn interpolate(values: [&Self; 3], weights: [f32; 3]) -> Self;

    /// 两点间线性插值（线段光栅化、裁剪时使用）
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        Self::interpolate([a, b, b], [1.0 - t, t, 0.0])
    }
}

impl Varying for () {
    fn interpolate(_: [&Self; 3], _: [f32; 3]) -> Self {}
}

macro_rules! impl_varying_linear {
    ($($ty:ty),+) => {
        $(
            impl Varying for $ty {
                #[inline]
                fn interpolate(values: [&Self; 3], weights: [f32; 3]) -> Self {
                    *values[0] * weights[0] + *values[1] * weights[1] + *values[2] * weights[2]
                }
            }
        )+
    };
}

impl_varying_linear!(f32, Vector2<f32>, Vector3<f32>, Vector4<f32>);

macro_rules! impl_varying_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Varying),+> Varying for ($($name,)+) {
            #[inline]
            fn interpolate(values: [&Self; 3], weights: [f32; 3]) -> Self {
                ($(
                    <$name as Varying>::interpolate(
                        [&values[0].$idx, &values[1].$idx, &values[2].$idx],
                        weights,
                    ),
                )+)
            }
        }
    };
}

impl_varying_tuple!(A: 0);
impl_varying_tuple!(A: 0, B: 1);
impl_varying_tuple!(A: 0, B: 1, C: 2);
impl_varying_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_varying_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
