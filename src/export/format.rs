use crate::error::{RecorderError, Result};
use crate::geometry::MeshData;
use crate::session::{PointCloud, QuestionnaireAnswer};

/// Fixed six-decimal formatting; negative zero prints as zero
fn fixed6(value: f64) -> String {
    format!("{:.6}", value + 0.0)
}

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn csv_text(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| RecorderError::Csv(e.into_error().into()))?;
    String::from_utf8(bytes).map_err(|e| RecorderError::InvalidInput(format!("CSV is not UTF-8: {}", e)))
}

/// `x,y,z,timestamp` header plus one row per accepted point
pub fn point_cloud_csv(cloud: &PointCloud) -> Result<String> {
    let mut writer = csv_writer();
    writer.write_record(["x", "y", "z", "timestamp"])?;
    for p in cloud.points() {
        writer.write_record([
            fixed6(p.position.x as f64),
            fixed6(p.position.y as f64),
            fixed6(p.position.z as f64),
            fixed6(p.timestamp),
        ])?;
    }
    csv_text(writer)
}

/// `estX,estY,estZ,answer,timestamp` header plus one row per answer
///
/// Answer labels holding separators or quotes are quoted.
pub fn questionnaire_csv(answers: &[QuestionnaireAnswer]) -> Result<String> {
    let mut writer = csv_writer();
    writer.write_record(["estX", "estY", "estZ", "answer", "timestamp"])?;
    for qa in answers {
        writer.write_record([
            fixed6(qa.estimated_position.x as f64).as_str(),
            fixed6(qa.estimated_position.y as f64).as_str(),
            fixed6(qa.estimated_position.z as f64).as_str(),
            qa.answer.as_str(),
            fixed6(qa.timestamp).as_str(),
        ])?;
    }
    csv_text(writer)
}

/// Wavefront OBJ text for a mesh, indices 1-based and shared across v/vt/vn
///
/// Faces are written in the mesh's own winding; callers reverse it first
/// when they mirror the geometry.
pub fn mesh_obj(mesh: &MeshData) -> String {
    let mut out = String::from("# Exported Gaze Object\n");

    for v in &mesh.vertices {
        out.push_str(&format!(
            "v {} {} {}\n",
            fixed6(v.x as f64),
            fixed6(v.y as f64),
            fixed6(v.z as f64)
        ));
    }
    for n in &mesh.normals {
        out.push_str(&format!(
            "vn {} {} {}\n",
            fixed6(n.x as f64),
            fixed6(n.y as f64),
            fixed6(n.z as f64)
        ));
    }
    for uv in &mesh.uvs {
        out.push_str(&format!("vt {} {}\n", fixed6(uv.x as f64), fixed6(uv.y as f64)));
    }

    let has_uvs = !mesh.uvs.is_empty();
    for tri in mesh.triangles() {
        let corners: Vec<String> = tri
            .iter()
            .map(|&i| {
                let i = i + 1;
                if has_uvs {
                    format!("{i}/{i}/{i}")
                } else {
                    format!("{i}//{i}")
                }
            })
            .collect();
        out.push_str(&format!("f {}\n", corners.join(" ")));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;

    #[test]
    fn test_negative_zero_prints_as_zero() {
        assert_eq!(fixed6(-0.0), "0.000000");
        assert_eq!(fixed6(-1.5), "-1.500000");
    }

    fn answer(label: &str) -> QuestionnaireAnswer {
        QuestionnaireAnswer {
            timestamp: 1.0,
            answer: label.to_string(),
            estimated_position: Vec3::zeros(),
        }
    }

    #[test]
    fn test_answer_labels_are_quoted_when_needed() {
        let csv = questionnaire_csv(&[answer("plain"), answer("a,\"b\"")]).unwrap();
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows[1], "0.000000,0.000000,0.000000,plain,1.000000");
        assert_eq!(rows[2], "0.000000,0.000000,0.000000,\"a,\"\"b\"\"\",1.000000");
    }

    #[test]
    fn test_empty_point_cloud_is_header_only() {
        assert_eq!(point_cloud_csv(&PointCloud::default()).unwrap(), "x,y,z,timestamp\n");
    }

    #[test]
    fn test_obj_without_uvs_uses_double_slash() {
        let mesh = MeshData {
            vertices: vec![Vec3::zeros(), Vec3::x(), Vec3::y()],
            normals: vec![Vec3::z(); 3],
            uvs: Vec::new(),
            submeshes: vec![vec![0, 1, 2]],
        };
        let obj = mesh_obj(&mesh);
        assert!(obj.contains("f 1//1 2//2 3//3\n"));
        assert!(!obj.contains("vt "));
    }
}
