use crate::{iterator, topol::Topology};
use std::fmt::{Debug, Display};

/**
 * All mesh elements are identified by their index. Handles are only
 * meaningful for the mesh they came from, and a topology-changing edit
 * invalidates every handle issued before it.
 */
pub trait Handle {
    /**
     * The index of the element.
     */
    fn index(&self) -> u32;
}

/**
 * Vertex handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct VH {
    idx: u32,
}

/**
 * Halfedge handle.
 *
 * An interior halfedge (one with an incident face) doubles as a face-corner:
 * the corner of its face at its head vertex. Per-corner attributes such as
 * texture coordinates are keyed by halfedge.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct HH {
    idx: u32,
}

/**
 * Edge handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EH {
    idx: u32,
}

/**
 * Face handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FH {
    idx: u32,
}

impl Handle for VH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for VH {
    fn from(idx: u32) -> Self {
        VH { idx }
    }
}

impl Handle for HH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for HH {
    fn from(idx: u32) -> Self {
        HH { idx }
    }
}

impl Handle for EH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for EH {
    fn from(idx: u32) -> Self {
        EH { idx }
    }
}

impl Handle for FH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for FH {
    fn from(idx: u32) -> Self {
        FH { idx }
    }
}

impl Display for VH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VH({})", self.index())
    }
}

impl Display for HH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HH({})", self.index())
    }
}

impl Display for EH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EH({})", self.index())
    }
}

impl Display for FH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FH({})", self.index())
    }
}

impl Debug for VH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VH({})", self.index())
    }
}

impl Debug for HH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HH({})", self.index())
    }
}

impl Debug for EH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EH({})", self.index())
    }
}

impl Debug for FH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FH({})", self.index())
    }
}

/**
 * Anything that can hand out a reference to a halfedge topology. Implemented
 * by [`Topology`] itself and by [`Mesh`](crate::mesh::Mesh), so that element
 * queries work against either.
 */
pub trait HasTopology {
    fn topology(&self) -> &Topology;
}

impl VH {
    pub fn halfedge(self, mesh: &impl HasTopology) -> Option<HH> {
        mesh.topology().vertex_halfedge(self)
    }

    /// Check if this vertex is valid for the `mesh`.
    ///
    /// The index has to be less than the number of vertices in the mesh.
    pub fn is_valid(self, mesh: &impl HasTopology) -> bool {
        (self.idx as usize) < mesh.topology().num_vertices()
    }

    /// Check if this vertex is on the boundary of the `mesh`.
    pub fn is_boundary(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().is_boundary_vertex(self)
    }

    /// Check if this vertex is manifold, i.e. it has at most one incident
    /// boundary gap when circulating around it.
    pub fn is_manifold(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().is_manifold_vertex(self)
    }

    /// The number of edges incident on this vertex.
    pub fn valence(self, mesh: &impl HasTopology) -> usize {
        iterator::voh_iter(mesh.topology(), self).count()
    }
}

impl HH {
    pub fn head(self, mesh: &impl HasTopology) -> VH {
        mesh.topology().head_vertex(self)
    }

    pub fn tail(self, mesh: &impl HasTopology) -> VH {
        mesh.topology().tail_vertex(self)
    }

    pub fn opposite(self) -> HH {
        (self.idx ^ 1).into()
    }

    pub fn prev(self, mesh: &impl HasTopology) -> HH {
        mesh.topology().prev_halfedge(self)
    }

    pub fn next(self, mesh: &impl HasTopology) -> HH {
        mesh.topology().next_halfedge(self)
    }

    pub fn face(self, mesh: &impl HasTopology) -> Option<FH> {
        mesh.topology().halfedge_face(self)
    }

    /// The edge this halfedge belongs to.
    pub fn edge(self) -> EH {
        (self.idx >> 1).into()
    }

    /// Check if this halfedge is on the boundary of `mesh`, i.e. it has no
    /// incident face.
    pub fn is_boundary(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().halfedge_face(self).is_none()
    }

    /// Check if this halfedge represents a face-corner.
    ///
    /// Interior halfedges are the corners of their face: this halfedge is the
    /// corner at its head vertex.
    pub fn is_corner(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().halfedge_face(self).is_some()
    }
}

impl EH {
    /// The pair of halfedges of this edge.
    pub fn halfedges(self) -> (HH, HH) {
        let hi = self.idx << 1;
        (hi.into(), (hi | 1).into())
    }

    pub fn halfedge(self, flag: bool) -> HH {
        ((self.idx << 1) | u32::from(flag)).into()
    }

    /// The two end vertices of this edge.
    pub fn vertices(self, mesh: &impl HasTopology) -> (VH, VH) {
        let (h, oh) = self.halfedges();
        let topol = mesh.topology();
        (topol.head_vertex(oh), topol.head_vertex(h))
    }

    /// The end vertex of this edge that is not `v`.
    ///
    /// `v` must be one of the edge's end vertices.
    pub fn opposite_vertex(self, mesh: &impl HasTopology, v: VH) -> VH {
        let (a, b) = self.vertices(mesh);
        if a == v { b } else { a }
    }

    /// Check if the edge is a boundary edge, i.e. it has fewer than two
    /// incident faces.
    pub fn is_boundary(self, mesh: &impl HasTopology) -> bool {
        let (h, oh) = self.halfedges();
        h.is_boundary(mesh) || oh.is_boundary(mesh)
    }

    /// The number of faces incident on this edge: 0, 1 or 2.
    pub fn link_face_count(self, mesh: &impl HasTopology) -> usize {
        let (h, oh) = self.halfedges();
        let topol = mesh.topology();
        usize::from(topol.halfedge_face(h).is_some())
            + usize::from(topol.halfedge_face(oh).is_some())
    }
}

impl FH {
    pub fn halfedge(self, mesh: &impl HasTopology) -> HH {
        mesh.topology().face_halfedge(self)
    }

    /// The number of vertices (equivalently edges or corners) of this face.
    pub fn valence(self, mesh: &impl HasTopology) -> usize {
        mesh.topology().face_valence(self)
    }

    /// Check if this face is a quadrilateral.
    pub fn is_quad(self, mesh: &impl HasTopology) -> bool {
        self.valence(mesh) == 4
    }
}

impl HasTopology for Topology {
    fn topology(&self) -> &Topology {
        self
    }
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Vertex {
    pub(crate) halfedge: Option<HH>,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Halfedge {
    pub(crate) face: Option<FH>,
    pub(crate) vertex: VH,
    pub(crate) next: HH,
    pub(crate) prev: HH,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Edge {
    pub(crate) halfedges: [Halfedge; 2],
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Face {
    pub(crate) halfedge: HH,
}
