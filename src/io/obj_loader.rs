use crate::core::geometry::Geometry;
use crate::error::{DemoError, Result};
use crate::geometry::vertex::NormalVertex;
use log::{debug, info, warn};
use nalgebra::Vector3;
use std::path::Path;

/// 三角化后的 OBJ 网格（统一索引）
#[derive(Debug, Clone, Default)]
pub struct ObjMesh {
    pub vertices: Vec<NormalVertex>,
    pub indices: Vec<u32>,
}

impl ObjMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn into_geometry(self) -> Geometry<NormalVertex> {
        Geometry::from_indexed(&self.vertices, &self.indices)
    }

    /// 展开为非索引三角形列表
    pub fn flattened(&self) -> Vec<NormalVertex> {
        self.indices
            .iter()
            .filter_map(|&i| self.vertices.get(i as usize).copied())
            .collect()
    }
}

/// 生成平滑的顶点法线，按面积加权平均面法线
fn generate_smooth_vertex_normals(
    positions: &[Vector3<f32>],
    indices: &[u32],
) -> Vec<Vector3<f32>> {
    let mut normals = vec![Vector3::zeros(); positions.len()];

    for (face, triangle) in indices.chunks_exact(3).enumerate() {
        let [i0, i1, i2] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
            warn!("面 {} 包含越界的顶点索引，跳过", face);
            continue;
        }
        // 叉积长度即两倍面积
        let face_normal = (positions[i1] - positions[i0]).cross(&(positions[i2] - positions[i0]));
        normals[i0] += face_normal;
        normals[i1] += face_normal;
        normals[i2] += face_normal;
    }

    let mut zero_norm_count = 0;
    for normal in normals.iter_mut() {
        if normal.norm_squared() > 1e-12 {
            normal.normalize_mut();
        } else {
            *normal = Vector3::y();
            zero_norm_count += 1;
        }
    }
    if zero_norm_count > 0 {
        warn!("{} 个顶点的法线为零，设置为默认值 [0, 1, 0]", zero_norm_count);
    }
    normals
}

/// 加载 OBJ 文件：三角化，合并所有对象，缺少法线时生成平滑法线
pub fn load_obj_mesh<P: AsRef<Path>>(path: P) -> Result<ObjMesh> {
    let path = path.as_ref();
    info!("加载 OBJ 文件: {:?}", path);

    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };
    let (models, _materials) =
        tobj::load_obj(path, &load_options).map_err(|e| DemoError::MeshLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut mesh = ObjMesh::default();
    for model in &models {
        let source = &model.mesh;
        let positions: Vec<Vector3<f32>> = source
            .positions
            .chunks_exact(3)
            .map(|p| Vector3::new(p[0], p[1], p[2]))
            .collect();

        let normals = if source.normals.len() == source.positions.len() {
            source
                .normals
                .chunks_exact(3)
                .map(|n| Vector3::new(n[0], n[1], n[2]))
                .collect()
        } else {
            debug!("网格 '{}' 没有法线，生成平滑法线", model.name);
            generate_smooth_vertex_normals(&positions, &source.indices)
        };

        let base = mesh.vertices.len() as u32;
        mesh.vertices.extend(
            positions
                .iter()
                .zip(&normals)
                .map(|(p, n)| NormalVertex::new(*p, *n)),
        );
        mesh.indices.extend(source.indices.iter().map(|i| base + i));
    }

    if mesh.indices.is_empty() {
        return Err(DemoError::MeshLoad {
            path: path.to_path_buf(),
            message: "文件中没有三角形".to_string(),
        });
    }
    info!(
        "网格加载完成: {} 个对象, {} 个顶点, {} 个三角形",
        models.len(),
        mesh.vertices.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn mesh_path(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("assets/meshes")
            .join(name)
    }

    #[test]
    fn beveled_cube_loads_with_unit_normals() {
        let mesh = load_obj_mesh(mesh_path("beveled-cube.obj")).unwrap();
        // 6 个面 + 12 条倒角 + 8 个角：6*2 + 12*2 + 8 = 44 个三角形
        assert_eq!(mesh.triangle_count(), 44);
        for v in &mesh.vertices {
            assert!((v.normal.norm() - 1.0).abs() < 1e-4);
            assert!(v.position.abs().max() <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn knot_loads() {
        let mesh = load_obj_mesh(mesh_path("knot.obj")).unwrap();
        assert!(mesh.triangle_count() > 1000);
        assert_eq!(mesh.flattened().len(), mesh.indices.len());
    }

    #[test]
    fn missing_file_is_a_mesh_error() {
        assert!(matches!(
            load_obj_mesh("no/such/mesh.obj"),
            Err(DemoError::MeshLoad { .. })
        ));
    }

    #[test]
    fn smooth_normals_point_away_from_a_ccw_face() {
        let positions = [Vector3::zeros(), Vector3::x(), Vector3::y()];
        let normals = generate_smooth_vertex_normals(&positions, &[0, 1, 2]);
        assert!(normals.iter().all(|n| (n - Vector3::z()).norm() < 1e-6));
    }
}
