use glam::{DVec2, DVec3};

use crate::{
    element::{EH, FH, HH, Handle, HasTopology, VH},
    error::Error,
    iterator,
    property::Property,
    topol::{FaceCache, Topology},
};

/// A polygon mesh: halfedge topology plus f64 geometry.
///
/// Vertex positions are stored as a vertex property, texture coordinates as
/// a halfedge property so that the corners of different faces meeting at one
/// vertex can carry different UV values (a UV seam).
pub struct Mesh {
    topol: Topology,
    cache: FaceCache,
    points: Property<VH, DVec3>,
    uvs: Property<HH, DVec2>,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl HasTopology for Mesh {
    fn topology(&self) -> &Topology {
        &self.topol
    }
}

impl Mesh {
    pub fn new() -> Self {
        Self::with_capacity(0, 0, 0)
    }

    pub fn with_capacity(nverts: usize, nedges: usize, nfaces: usize) -> Self {
        let mut topol = Topology::with_capacity(nverts, nedges, nfaces);
        let points = topol.create_vertex_prop(DVec3::ZERO);
        let uvs = topol.create_halfedge_prop(DVec2::ZERO);
        Mesh {
            topol,
            cache: FaceCache::default(),
            points,
            uvs,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.topol.num_vertices()
    }

    pub fn num_edges(&self) -> usize {
        self.topol.num_edges()
    }

    pub fn num_halfedges(&self) -> usize {
        self.topol.num_halfedges()
    }

    pub fn num_faces(&self) -> usize {
        self.topol.num_faces()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> {
        self.topol.vertices()
    }

    pub fn halfedges(&self) -> impl Iterator<Item = HH> {
        self.topol.halfedges()
    }

    pub fn edges(&self) -> impl Iterator<Item = EH> {
        self.topol.edges()
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> {
        self.topol.faces()
    }

    pub fn add_vertex(&mut self, pos: DVec3) -> Result<VH, Error> {
        let vi = self.topol.add_vertex()?;
        self.points.set(vi, pos)?;
        Ok(vi)
    }

    pub fn add_face(&mut self, verts: &[VH]) -> Result<FH, Error> {
        self.topol.add_face(verts, &mut self.cache)
    }

    pub fn add_tri_face(&mut self, v0: VH, v1: VH, v2: VH) -> Result<FH, Error> {
        self.add_face(&[v0, v1, v2])
    }

    pub fn add_quad_face(&mut self, v0: VH, v1: VH, v2: VH, v3: VH) -> Result<FH, Error> {
        self.add_face(&[v0, v1, v2, v3])
    }

    pub fn point(&self, v: VH) -> Result<DVec3, Error> {
        self.points.get_cloned(v)
    }

    pub fn set_point(&mut self, v: VH, pos: DVec3) -> Result<(), Error> {
        self.points.set(v, pos)
    }

    /// The vertex position property. The returned handle is a cheap clone
    /// pointing at the same buffer; borrow it once when reading positions in
    /// a loop.
    pub fn points(&self) -> Property<VH, DVec3> {
        self.points.clone()
    }

    /// The texture coordinate of the corner represented by halfedge `h`.
    pub fn uv(&self, h: HH) -> Result<DVec2, Error> {
        self.uvs.get_cloned(h)
    }

    pub fn set_uv(&mut self, h: HH, uv: DVec2) -> Result<(), Error> {
        self.uvs.set(h, uv)
    }

    /// The per-corner texture coordinate property.
    pub fn uvs(&self) -> Property<HH, DVec2> {
        self.uvs.clone()
    }

    /// The corner of face `f` at vertex `v`: the halfedge of `f` pointing at
    /// `v`, if `v` lies on `f`.
    pub fn face_corner(&self, f: FH, v: VH) -> Option<HH> {
        iterator::fh_iter(&self.topol, f).find(|h| self.topol.head_vertex(*h) == v)
    }

    /// Compute the normal of a face with Newell's method. The `points` slice
    /// must be the borrowed position buffer.
    pub fn calc_face_normal(&self, f: FH, points: &[DVec3]) -> DVec3 {
        let mut normal = DVec3::ZERO;
        for h in iterator::fh_iter(&self.topol, f) {
            let pc = points[self.topol.tail_vertex(h).index() as usize];
            let pn = points[self.topol.head_vertex(h).index() as usize];
            let a = pc - pn;
            let b = pc + pn;
            normal.x += a.y * b.z;
            normal.y += a.z * b.x;
            normal.z += a.x * b.y;
        }
        normal.normalize_or_zero()
    }

    /// Same as [`calc_face_normal`](Self::calc_face_normal), borrowing the
    /// position property internally.
    pub fn try_calc_face_normal(&self, f: FH) -> Result<DVec3, Error> {
        let points = self.points.try_borrow()?;
        Ok(self.calc_face_normal(f, &points))
    }

    /// Compute the normal of a vertex as the average of its incident face
    /// normals.
    pub fn calc_vertex_normal(&self, v: VH, points: &[DVec3]) -> DVec3 {
        iterator::vf_iter(&self.topol, v)
            .fold(DVec3::ZERO, |total, f| {
                total + self.calc_face_normal(f, points)
            })
            .normalize_or_zero()
    }

    /// The centroid of a face: the average of its vertex positions.
    pub fn calc_face_centroid(&self, f: FH, points: &[DVec3]) -> DVec3 {
        let (total, count) = iterator::fv_iter(&self.topol, f).fold(
            (DVec3::ZERO, 0usize),
            |(total, count), v| (total + points[v.index() as usize], count + 1),
        );
        total / (count.max(1) as f64)
    }

    pub fn find_halfedge(&self, from: VH, to: VH) -> Option<HH> {
        self.topol.find_halfedge(from, to)
    }

    pub fn find_edge(&self, a: VH, b: VH) -> Result<EH, Error> {
        self.topol.find_edge(a, b)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::Mesh;
    use crate::macros::assert_float_eq;
    use glam::{DVec2, DVec3, dvec2, dvec3};

    /// Makes an `nx` by `ny` grid of unit quads in the XY plane with a
    /// continuous UV chart over the unit square.
    pub(crate) fn grid_mesh(nx: usize, ny: usize) -> Mesh {
        let nvx = nx + 1;
        let mut mesh = Mesh::with_capacity(nvx * (ny + 1), 2 * nx * ny + nx + ny, nx * ny);
        for y in 0..=ny {
            for x in 0..=nx {
                mesh.add_vertex(dvec3(x as f64, y as f64, 0.0))
                    .expect("Unable to add vertex");
            }
        }
        for y in 0..ny {
            for x in 0..nx {
                let v = (y * nvx + x) as u32;
                let f = mesh
                    .add_face(&[
                        v.into(),
                        (v + 1).into(),
                        (v + 1 + nvx as u32).into(),
                        (v + nvx as u32).into(),
                    ])
                    .expect("Unable to add face");
                // Continuous chart: corner UV is the vertex position scaled
                // into the unit square.
                for vi in [v, v + 1, v + 1 + nvx as u32, v + nvx as u32] {
                    let h = mesh
                        .face_corner(f, vi.into())
                        .expect("Vertex must be a corner of the face");
                    let (gx, gy) = ((vi as usize % nvx) as f64, (vi as usize / nvx) as f64);
                    mesh.set_uv(h, dvec2(gx / nx as f64, gy / ny as f64))
                        .expect("Unable to set UV");
                }
            }
        }
        mesh
    }

    #[test]
    fn t_grid_mesh_geometry() {
        let mesh = grid_mesh(2, 2);
        assert_eq!(mesh.num_vertices(), 9);
        assert_eq!(mesh.num_faces(), 4);
        let points = mesh.points();
        let points = points.try_borrow().expect("Cannot borrow points");
        let n = mesh.calc_face_normal(0.into(), &points);
        assert_float_eq!((n - DVec3::Z).length(), 0.0, 1e-12);
        let c = mesh.calc_face_centroid(0.into(), &points);
        assert_float_eq!((c - dvec3(0.5, 0.5, 0.0)).length(), 0.0, 1e-12);
        let vn = mesh.calc_vertex_normal(4.into(), &points);
        assert_float_eq!((vn - DVec3::Z).length(), 0.0, 1e-12);
    }

    #[test]
    fn t_grid_mesh_uvs_continuous() {
        let mesh = grid_mesh(2, 2);
        // The corner UVs of every face meeting at the center vertex agree.
        let center = 4.into();
        let uvs: Vec<DVec2> = mesh
            .faces()
            .filter_map(|f| mesh.face_corner(f, center))
            .map(|h| mesh.uv(h).expect("Cannot read UV"))
            .collect();
        assert_eq!(uvs.len(), 4);
        assert!(uvs.iter().all(|uv| (*uv - dvec2(0.5, 0.5)).length() < 1e-12));
    }
}
