use crate::core::frame_buffer::Rgba;
use crate::core::geometry::Vertex;
use crate::core::rasterizer::varying::Varying;
use crate::error::{DemoError, Result};
use log::{debug, info};
use nalgebra::{Vector2, Vector4};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// 顶点着色器的输出
#[derive(Debug, Clone, Copy)]
pub struct VertexOutput<V> {
    /// 裁剪空间坐标
    pub position: Vector4<f32>,
    pub varying: V,
}

impl<V> VertexOutput<V> {
    pub fn new(position: Vector4<f32>, varying: V) -> Self {
        Self { position, varying }
    }
}

/// 片元着色器的输入
#[derive(Debug, Clone, Copy)]
pub struct Fragment<V> {
    pub varying: V,
    /// 像素中心坐标（左上角为原点）
    pub coord: Vector2<f32>,
    /// 窗口空间深度 [0, 1]
    pub depth: f32,
    pub front_facing: bool,
}

/// 可编程着色阶段；uniform 即着色器值本身的字段
pub trait Shader: Sync {
    type Vertex: Vertex;
    type Varying: Varying;

    fn vertex(&self, vertex: &Self::Vertex, instance: usize) -> VertexOutput<Self::Varying>;

    /// 返回 None 表示丢弃该片元
    fn fragment(&self, fragment: &Fragment<Self::Varying>) -> Option<Rgba>;
}

/// 着色器程序源中声明的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// 程序常量参数；`NAME` 必须与程序源中的声明一致
pub trait ProgramParams: DeserializeOwned + Default {
    const NAME: &'static str;
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProgramHeader {
    name: String,
    stages: Vec<ShaderStage>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, bound(deserialize = "P: DeserializeOwned + Default"))]
struct ProgramSource<P> {
    program: ProgramHeader,
    #[serde(default)]
    params: P,
}

/// 已加载的着色器程序：程序源经过"编译"（解析）与"链接"（校验）
#[derive(Debug)]
pub struct ShaderProgram<P: ProgramParams> {
    path: PathBuf,
    params: P,
}

impl<P: ProgramParams> ShaderProgram<P> {
    /// 从文件读取程序源
    pub fn load<Q: AsRef<Path>>(path: Q) -> Result<Self> {
        let path = path.as_ref();
        info!("加载着色器程序: {:?}", path);
        let source = std::fs::read_to_string(path).map_err(|e| DemoError::io(path, e))?;
        Self::from_source(path, &source)
    }

    /// 从内存中的程序源构建，`path` 只用于报错
    pub fn from_source(path: &Path, source: &str) -> Result<Self> {
        let parsed: ProgramSource<P> =
            toml::from_str(source).map_err(|e| DemoError::ShaderCompile {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let link_error = |message: String| DemoError::ShaderLink {
            path: path.to_path_buf(),
            message,
        };

        if parsed.program.name != P::NAME {
            return Err(link_error(format!(
                "程序名 '{}' 与期望的 '{}' 不符",
                parsed.program.name,
                P::NAME
            )));
        }
        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            if !parsed.program.stages.contains(&stage) {
                return Err(link_error(format!("缺少 {:?} 阶段", stage)));
            }
        }

        debug!("着色器程序 '{}' 链接完成", P::NAME);
        Ok(Self {
            path: path.to_path_buf(),
            params: parsed.params,
        })
    }

    pub fn name(&self) -> &'static str {
        P::NAME
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn params(&self) -> &P {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default, deny_unknown_fields)]
    struct TestParams {
        gain: f32,
    }

    impl ProgramParams for TestParams {
        const NAME: &'static str = "test";
    }

    fn compile(source: &str) -> Result<ShaderProgram<TestParams>> {
        ShaderProgram::from_source(Path::new("test.toml"), source)
    }

    #[test]
    fn valid_source_links() {
        let program = compile(
            "[program]\nname = \"test\"\nstages = [\"vertex\", \"fragment\"]\n[params]\ngain = 2.5\n",
        )
        .unwrap();
        assert_eq!(program.params().gain, 2.5);
        assert_eq!(program.name(), "test");
    }

    #[test]
    fn params_section_is_optional() {
        let program =
            compile("[program]\nname = \"test\"\nstages = [\"fragment\", \"vertex\"]\n").unwrap();
        assert_eq!(program.params(), &TestParams::default());
    }

    #[test]
    fn syntax_and_unknown_keys_fail_to_compile() {
        assert!(matches!(
            compile("[program\nname = \"test\""),
            Err(DemoError::ShaderCompile { .. })
        ));
        assert!(matches!(
            compile(
                "[program]\nname = \"test\"\nstages = [\"vertex\", \"fragment\"]\n[params]\ngian = 1.0\n"
            ),
            Err(DemoError::ShaderCompile { .. })
        ));
    }

    #[test]
    fn mismatched_program_fails_to_link() {
        assert!(matches!(
            compile("[program]\nname = \"other\"\nstages = [\"vertex\", \"fragment\"]\n"),
            Err(DemoError::ShaderLink { .. })
        ));
        assert!(matches!(
            compile("[program]\nname = \"test\"\nstages = [\"vertex\"]\n"),
            Err(DemoError::ShaderLink { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = ShaderProgram::<TestParams>::load("does/not/exist.toml");
        assert!(matches!(result, Err(DemoError::Io { .. })));
    }
}
