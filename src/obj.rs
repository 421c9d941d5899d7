use std::path::Path;

use glam::{dvec2, dvec3};

use crate::{element::VH, error::Error, mesh::Mesh};

impl Mesh {
    /// Load a mesh from a Wavefront OBJ file.
    ///
    /// Polygonal faces are kept as-is. When the file carries texture
    /// coordinates, they are wired onto the face corners, preserving any UV
    /// seams the file encodes.
    pub fn load_obj(path: &Path) -> Result<Self, Error> {
        let options = tobj::LoadOptions {
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };
        let (models, _) =
            tobj::load_obj(path, &options).map_err(|e| Error::ObjLoadFailed(format!("{}", e)))?;
        let (nverts, nfaces) = models
            .iter()
            .fold((0usize, 0usize), |(nverts, nfaces), model| {
                let msh = &model.mesh;
                let arity = if msh.face_arities.is_empty() {
                    msh.indices.len() / 3
                } else {
                    msh.face_arities.len()
                };
                (nverts + (msh.positions.len() / 3), nfaces + arity)
            });
        let nedges = nfaces * 3 / 2; // Estimate.
        let mut outmesh = Mesh::with_capacity(nverts, nedges, nfaces);
        let mut voffset = 0u32;
        let mut fvs: Vec<VH> = Vec::new();
        for model in models {
            let mesh = model.mesh;
            if mesh.positions.len() % 3 != 0 {
                return Err(Error::IncorrectNumberOfCoordinates(mesh.positions.len()));
            }
            let nverts = (mesh.positions.len() / 3) as u32;
            for triplet in mesh.positions.chunks(3) {
                outmesh.add_vertex(dvec3(triplet[0], triplet[1], triplet[2]))?;
            }
            // An empty arity list means the model is all triangles.
            let arities: Vec<usize> = if mesh.face_arities.is_empty() {
                vec![3; mesh.indices.len() / 3]
            } else {
                mesh.face_arities.iter().map(|a| *a as usize).collect()
            };
            let has_uvs =
                !mesh.texcoords.is_empty() && mesh.texcoord_indices.len() == mesh.indices.len();
            let mut start = 0usize;
            for size in arities {
                let indices = &mesh.indices[start..(start + size)];
                fvs.clear();
                fvs.extend(indices.iter().map(|i| VH::from(i + voffset)));
                let f = outmesh.add_face(&fvs)?;
                if has_uvs {
                    for (k, v) in fvs.iter().enumerate() {
                        let ti = mesh.texcoord_indices[start + k] as usize;
                        let uv = dvec2(mesh.texcoords[2 * ti], mesh.texcoords[2 * ti + 1]);
                        if let Some(h) = outmesh.face_corner(f, *v) {
                            outmesh.set_uv(h, uv)?;
                        }
                    }
                }
                start += size;
            }
            voffset += nverts;
        }
        Ok(outmesh)
    }
}
