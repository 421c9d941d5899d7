use glam::DVec2;

use crate::{
    element::HasTopology,
    error::Error,
    iterator,
    marks::Marks,
    mesh::Mesh,
    set::{ElementSet, FaceSet},
};

/// Componentwise tolerance for treating two corner UVs as the same point.
pub const UV_EPSILON: f64 = 1e-6;

/// Componentwise almost-equality of two UV coordinates. Symmetric by
/// construction.
pub fn uv_almost_equal(a: DVec2, b: DVec2) -> bool {
    (a.x - b.x).abs() <= UV_EPSILON && (a.y - b.y).abs() <= UV_EPSILON
}

impl FaceSet {
    /// Partition this face set into UV islands.
    ///
    /// Two member faces belong to the same island when flood fill can walk
    /// from one to the other through corners that sit at a shared vertex
    /// with almost-equal UV coordinates. Corners that coincide in 3D but
    /// differ in UV are a seam: the faces on either side land in different
    /// islands even though they share geometry.
    pub fn uv_islands(&self, mesh: &Mesh) -> Result<Vec<FaceSet>, Error> {
        let topol = mesh.topology();
        let uvs = mesh.uvs();
        let uvs = uvs.try_borrow()?;
        let member = self.membership(topol);
        let mut visited = Marks::new(topol.num_faces());
        let mut islands = Vec::new();
        let mut stack = Vec::new();
        for seed in self.iter() {
            if visited.mark(seed) {
                continue;
            }
            let mut island = Vec::new();
            stack.push(seed);
            while let Some(f) = stack.pop() {
                island.push(f);
                for h in iterator::fh_iter(topol, f) {
                    let uv = uvs[h];
                    let v = topol.head_vertex(h);
                    for h2 in iterator::vih_iter(topol, v) {
                        let Some(f2) = topol.halfedge_face(h2) else {
                            continue;
                        };
                        if visited.check(f2) || !member.check(f2) {
                            continue;
                        }
                        if uv_almost_equal(uv, uvs[h2]) {
                            visited.set(f2);
                            stack.push(f2);
                        }
                    }
                }
            }
            islands.push(ElementSet::new(island));
        }
        Ok(islands)
    }
}
