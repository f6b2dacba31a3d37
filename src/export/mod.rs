//! Session export to portable files
//!
//! Layout per artifact: `{session_dir}/{artifact_id}/` holding
//! `pointcloud.csv`, `model.obj`, `qa.csv`, `session_audio_{n}.wav` and
//! `filelist.txt`. Each kind is written independently so one failure does
//! not stop the others.

mod format;

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::audio::AudioChunkSet;
use crate::error::{RecorderError, Result};
use crate::geometry::{MeshData, Vec3};
use crate::session::{PointCloud, QuestionnaireAnswer};

pub use format::{mesh_obj, point_cloud_csv, questionnaire_csv};

pub const POINT_CLOUD_FILE: &str = "pointcloud.csv";
pub const MODEL_FILE: &str = "model.obj";
pub const QUESTIONNAIRE_FILE: &str = "qa.csv";
pub const MANIFEST_FILE: &str = "filelist.txt";

/// Outcome of [`SessionExporter::export_all`], one entry per file kind
#[derive(Debug)]
pub struct ExportReport {
    pub artifact_dir: PathBuf,
    pub point_cloud: Result<PathBuf>,
    pub mesh: Result<PathBuf>,
    /// `Ok(None)` when there were no answers to write
    pub questionnaire: Result<Option<PathBuf>>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.point_cloud.is_ok() && self.mesh.is_ok() && self.questionnaire.is_ok()
    }

    pub fn errors(&self) -> Vec<&RecorderError> {
        let mut errors = Vec::new();
        if let Err(e) = &self.point_cloud {
            errors.push(e);
        }
        if let Err(e) = &self.mesh {
            errors.push(e);
        }
        if let Err(e) = &self.questionnaire {
            errors.push(e);
        }
        errors
    }
}

/// Writes session data below a session directory
#[derive(Debug, Clone)]
pub struct SessionExporter {
    session_dir: PathBuf,
}

impl SessionExporter {
    pub fn new(session_dir: impl Into<PathBuf>) -> Self {
        Self {
            session_dir: session_dir.into(),
        }
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    /// `{session_dir}/{artifact_id}`
    pub fn artifact_dir(&self, artifact_id: &str) -> PathBuf {
        self.session_dir.join(artifact_id)
    }

    /// Point cloud, mesh and questionnaire; the audio manifest is written separately
    pub fn export_all(
        &self,
        artifact_id: &str,
        euler_degrees: &Vec3,
        point_cloud: &PointCloud,
        mesh: Option<&MeshData>,
        answers: &[QuestionnaireAnswer],
    ) -> ExportReport {
        let point_cloud = self.export_point_cloud(artifact_id, point_cloud);
        let mesh = match mesh {
            Some(mesh) => self.export_mesh(artifact_id, mesh, euler_degrees),
            None => Err(RecorderError::MissingDependency(format!(
                "mesh for artifact {}",
                artifact_id
            ))),
        };
        let questionnaire = self.export_questionnaire(artifact_id, answers);

        let report = ExportReport {
            artifact_dir: self.artifact_dir(artifact_id),
            point_cloud,
            mesh,
            questionnaire,
        };

        if report.is_complete() {
            info!("Saved session data at: {}", report.artifact_dir.display());
        } else {
            for e in report.errors() {
                error!("Export for {} incomplete: {}", artifact_id, e);
            }
        }

        report
    }

    pub fn export_point_cloud(&self, artifact_id: &str, cloud: &PointCloud) -> Result<PathBuf> {
        let path = self.write(artifact_id, POINT_CLOUD_FILE, &point_cloud_csv(cloud)?)?;
        info!("Point cloud saved: {} ({} points)", path.display(), cloud.len());
        Ok(path)
    }

    /// Map the mesh into the authoring frame and write it as OBJ
    pub fn export_mesh(
        &self,
        artifact_id: &str,
        mesh: &MeshData,
        euler_degrees: &Vec3,
    ) -> Result<PathBuf> {
        let authored = mesh.to_authoring_frame(euler_degrees)?;
        let path = self.write(artifact_id, MODEL_FILE, &mesh_obj(&authored))?;
        info!(
            "Mesh saved: {} ({} vertices, {} triangles)",
            path.display(),
            authored.vertices.len(),
            authored.triangle_count()
        );
        Ok(path)
    }

    /// Skipped when there are no answers
    pub fn export_questionnaire(
        &self,
        artifact_id: &str,
        answers: &[QuestionnaireAnswer],
    ) -> Result<Option<PathBuf>> {
        if answers.is_empty() {
            warn!("No questionnaire answers for {}, skipping {}", artifact_id, QUESTIONNAIRE_FILE);
            return Ok(None);
        }
        let path = self.write(artifact_id, QUESTIONNAIRE_FILE, &questionnaire_csv(answers)?)?;
        info!("Questionnaire saved: {} ({} answers)", path.display(), answers.len());
        Ok(Some(path))
    }

    pub fn write_manifest(&self, artifact_id: &str, chunks: &AudioChunkSet) -> Result<PathBuf> {
        let path = self.write(artifact_id, MANIFEST_FILE, &chunks.manifest())?;
        info!("File list saved to: {} ({} chunks)", path.display(), chunks.len());
        Ok(path)
    }

    fn write(&self, artifact_id: &str, file_name: &str, contents: &str) -> Result<PathBuf> {
        let dir = self.artifact_dir(artifact_id);
        fs::create_dir_all(&dir).map_err(|e| RecorderError::storage(&dir, e))?;

        let path = dir.join(file_name);
        fs::write(&path, contents).map_err(|e| RecorderError::storage(&path, e))?;
        Ok(path)
    }
}
