use crate::error::{RecorderError, Result};

use super::{unapply_rotation, Vec2, Vec3};

/// Shared mesh data as reported by the artifact's renderer
///
/// `submeshes` hold triangle index lists (three indices per triangle).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub submeshes: Vec<Vec<u32>>,
}

impl MeshData {
    /// Check triangle lists and UV count against the vertex array
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertices.len();

        if !self.uvs.is_empty() && self.uvs.len() != vertex_count {
            return Err(RecorderError::InvalidInput(format!(
                "mesh has {} UVs for {} vertices",
                self.uvs.len(),
                vertex_count
            )));
        }

        for (i, triangles) in self.submeshes.iter().enumerate() {
            if triangles.len() % 3 != 0 {
                return Err(RecorderError::InvalidInput(format!(
                    "submesh {} index count {} is not a multiple of 3",
                    i,
                    triangles.len()
                )));
            }
            if let Some(bad) = triangles.iter().find(|&&idx| idx as usize >= vertex_count) {
                return Err(RecorderError::InvalidInput(format!(
                    "submesh {} references vertex {} (only {} vertices)",
                    i, bad, vertex_count
                )));
            }
        }

        Ok(())
    }

    /// All triangles across submeshes, in submesh order
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.submeshes
            .iter()
            .flat_map(|tris| tris.chunks_exact(3).map(|t| [t[0], t[1], t[2]]))
    }

    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(|tris| tris.len() / 3).sum()
    }

    /// Copy of this mesh mapped back into the authoring frame
    ///
    /// Every vertex goes through [`unapply_rotation`] and normals are
    /// recomputed on the mirrored vertices with the source winding. Because
    /// the mirror flips handedness, each triangle then has its first and
    /// third index swapped so the written faces keep pointing outwards.
    pub fn to_authoring_frame(&self, euler_degrees: &Vec3) -> Result<MeshData> {
        self.validate()?;

        let mut mesh = MeshData {
            vertices: self
                .vertices
                .iter()
                .map(|v| unapply_rotation(v, euler_degrees))
                .collect(),
            normals: Vec::new(),
            uvs: self.uvs.clone(),
            submeshes: self.submeshes.clone(),
        };
        mesh.recalculate_normals();

        for tris in &mut mesh.submeshes {
            for t in tris.chunks_exact_mut(3) {
                t.swap(0, 2);
            }
        }

        Ok(mesh)
    }

    /// Area-weighted vertex normals from the current geometry and winding
    ///
    /// Vertices not used by any triangle get a zero normal.
    pub fn recalculate_normals(&mut self) {
        let mut normals = vec![Vec3::zeros(); self.vertices.len()];

        for [a, b, c] in self.triangles() {
            let (a, b, c) = (a as usize, b as usize, c as usize);
            if a >= normals.len() || b >= normals.len() || c >= normals.len() {
                continue;
            }
            let face = (self.vertices[b] - self.vertices[a]).cross(&(self.vertices[c] - self.vertices[a]));
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }

        self.normals = normals
            .into_iter()
            .map(|n| n.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros))
            .collect();
    }
}
