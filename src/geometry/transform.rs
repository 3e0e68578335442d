use log::warn;
use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Unit, Vector3, Vector4};

/// 演示用到的模型、视图与投影矩阵
///
/// 右手系、y 轴朝上，裁剪空间 z ∈ [-w, w]，与 OpenGL 相同。
pub struct TransformFactory;

impl TransformFactory {
    /// 绕任意轴旋转，轴不必归一化
    pub fn rotation(axis: &Vector3<f32>, angle_rad: f32) -> Matrix4<f32> {
        Self::about(Unit::new_normalize(*axis), angle_rad)
    }

    pub fn rotation_x(angle_rad: f32) -> Matrix4<f32> {
        Self::about(Vector3::x_axis(), angle_rad)
    }

    pub fn rotation_y(angle_rad: f32) -> Matrix4<f32> {
        Self::about(Vector3::y_axis(), angle_rad)
    }

    pub fn rotation_z(angle_rad: f32) -> Matrix4<f32> {
        Self::about(Vector3::z_axis(), angle_rad)
    }

    fn about(axis: Unit<Vector3<f32>>, angle_rad: f32) -> Matrix4<f32> {
        Rotation3::from_axis_angle(&axis, angle_rad).to_homogeneous()
    }

    pub fn translation(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    /// 均匀缩放
    pub fn scaling(factor: f32) -> Matrix4<f32> {
        Matrix4::new_scaling(factor)
    }

    /// 从 `eye` 看向 `target` 的视图矩阵，y 轴朝上
    pub fn look_at(eye: &Vector3<f32>, target: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::look_at_rh(&Point3::from(*eye), &Point3::from(*target), &Vector3::y())
    }

    /// 透视投影，参数顺序同 gluPerspective
    pub fn perspective(fov_y_rad: f32, aspect_ratio: f32, near: f32, far: f32) -> Matrix4<f32> {
        Matrix4::new_perspective(aspect_ratio, fov_y_rad, near, far)
    }

    /// 以视线为中心、横纵半径都是 `extent` 的正交投影（光源阴影用）
    pub fn ortho_square(extent: f32, near: f32, far: f32) -> Matrix4<f32> {
        Matrix4::new_orthographic(-extent, extent, -extent, extent, near, far)
    }
}

/// 计算法线变换矩阵（模型矩阵的逆转置）
pub fn compute_normal_matrix(model_matrix: &Matrix4<f32>) -> Matrix3<f32> {
    model_matrix.try_inverse().map_or_else(
        || {
            warn!("模型矩阵不可逆，使用单位矩阵代替法线矩阵");
            Matrix3::identity()
        },
        |inv| inv.transpose().fixed_view::<3, 3>(0, 0).into_owned(),
    )
}

/// 变换一个点（w = 1），结果不做透视除法
#[inline]
pub fn transform_point(matrix: &Matrix4<f32>, point: &Vector3<f32>) -> Vector3<f32> {
    (matrix * point.push(1.0)).xyz()
}

/// 变换到裁剪空间（齐次坐标）
#[inline]
pub fn to_clip(matrix: &Matrix4<f32>, point: &Vector3<f32>) -> Vector4<f32> {
    matrix * point.push(1.0)
}

/// 将NDC坐标转换为屏幕像素坐标，z 映射为窗口深度 [0, 1]
#[inline]
pub fn ndc_to_pixel(ndc: &Point3<f32>, width: f32, height: f32) -> Point3<f32> {
    let screen_x = (ndc.x + 1.0) * 0.5 * width;
    // 翻转Y轴：NDC中+1是顶部，屏幕坐标中0是顶部
    let screen_y = (1.0 - (ndc.y + 1.0) * 0.5) * height;
    Point3::new(screen_x, screen_y, ndc.z * 0.5 + 0.5)
}

/// 裁剪空间 -> NDC（透视除法），返回 NDC 与 1/w
#[inline]
pub fn clip_to_ndc(clip: &Vector4<f32>) -> (Point3<f32>, f32) {
    let w = if clip.w.abs() > 1e-8 { clip.w } else { 1e-8 };
    let inv_w = 1.0 / w;
    (
        Point3::new(clip.x * inv_w, clip.y * inv_w, clip.z * inv_w),
        inv_w,
    )
}
