use crate::{
    element::{EH, FH, HH, Handle, HasTopology, VH},
    error::Error,
    iterator,
    marks::Marks,
    property::Property,
    status::Status,
    topol::Topology,
};

/// A kind of mesh element that can populate an [`ElementSet`].
///
/// The trait supplies the pieces the generic set algorithms need:
/// enumeration of all elements of the kind, access to the kind's status
/// property, and the kind-specific adjacency relation used by
/// connected-component grouping.
pub trait SetElement: Handle + Copy + PartialEq + 'static {
    fn element_count(topol: &Topology) -> usize;

    fn elements(topol: &Topology) -> impl Iterator<Item = Self>;

    fn statuses(topol: &Topology) -> Property<Self, Status>;

    /// Push the neighbors of `item` onto `out`, each with the edge the
    /// connection runs through when one exists. With `via_edges` set, face
    /// adjacency narrows from shared-vertex to shared-edge neighbors so that
    /// every crossing has an edge a barrier predicate can test; the other
    /// kinds ignore the flag.
    fn neighbors(topol: &Topology, item: Self, via_edges: bool, out: &mut Vec<(Self, Option<EH>)>);
}

impl SetElement for VH {
    fn element_count(topol: &Topology) -> usize {
        topol.num_vertices()
    }

    fn elements(topol: &Topology) -> impl Iterator<Item = Self> {
        topol.vertices()
    }

    fn statuses(topol: &Topology) -> Property<Self, Status> {
        topol.vertex_statuses()
    }

    fn neighbors(topol: &Topology, item: Self, _via_edges: bool, out: &mut Vec<(Self, Option<EH>)>) {
        out.extend(
            iterator::voh_iter(topol, item)
                .map(|h| (topol.head_vertex(h), Some(topol.halfedge_edge(h)))),
        );
    }
}

impl SetElement for EH {
    fn element_count(topol: &Topology) -> usize {
        topol.num_edges()
    }

    fn elements(topol: &Topology) -> impl Iterator<Item = Self> {
        topol.edges()
    }

    fn statuses(topol: &Topology) -> Property<Self, Status> {
        topol.edge_statuses()
    }

    fn neighbors(topol: &Topology, item: Self, _via_edges: bool, out: &mut Vec<(Self, Option<EH>)>) {
        for v in iterator::ev_iter(topol, item) {
            out.extend(
                iterator::ve_iter(topol, v)
                    .filter(|e| *e != item)
                    .map(|e| (e, Some(e))),
            );
        }
    }
}

impl SetElement for FH {
    fn element_count(topol: &Topology) -> usize {
        topol.num_faces()
    }

    fn elements(topol: &Topology) -> impl Iterator<Item = Self> {
        topol.faces()
    }

    fn statuses(topol: &Topology) -> Property<Self, Status> {
        topol.face_statuses()
    }

    fn neighbors(topol: &Topology, item: Self, via_edges: bool, out: &mut Vec<(Self, Option<EH>)>) {
        if via_edges {
            out.extend(iterator::fh_iter(topol, item).filter_map(|h| {
                topol
                    .halfedge_face(topol.opposite_halfedge(h))
                    .map(|f| (f, Some(topol.halfedge_edge(h))))
            }));
        } else {
            for v in iterator::fv_iter(topol, item) {
                out.extend(
                    iterator::vf_iter(topol, v)
                        .filter(|f| *f != item)
                        .map(|f| (f, None)),
                );
            }
        }
    }
}

impl SetElement for HH {
    fn element_count(topol: &Topology) -> usize {
        topol.num_halfedges()
    }

    /// Corners only: the interior halfedges of the mesh.
    fn elements(topol: &Topology) -> impl Iterator<Item = Self> {
        topol.halfedges().filter(|h| !topol.is_boundary_halfedge(*h))
    }

    fn statuses(topol: &Topology) -> Property<Self, Status> {
        topol.halfedge_statuses()
    }

    /// The other corners at the same vertex.
    fn neighbors(topol: &Topology, item: Self, _via_edges: bool, out: &mut Vec<(Self, Option<EH>)>) {
        let v = topol.head_vertex(item);
        out.extend(
            iterator::vih_iter(topol, v)
                .filter(|h| *h != item && !topol.is_boundary_halfedge(*h))
                .map(|h| (h, None)),
        );
    }
}

/// An ordered set of mesh elements of one kind.
///
/// Sets are plain ordered sequences: the constructors build them duplicate
/// free, and once built a set is treated as immutable data. Derived sets
/// (the projections to adjacent kinds, groups, chains) are new values.
#[derive(Clone)]
pub struct ElementSet<H>
where
    H: SetElement,
{
    items: Vec<H>,
}

/// Set of vertices.
pub type VertexSet = ElementSet<VH>;
/// Set of edges.
pub type EdgeSet = ElementSet<EH>;
/// Set of faces.
pub type FaceSet = ElementSet<FH>;
/// Set of face-corners, represented by interior halfedges.
pub type CornerSet = ElementSet<HH>;

impl<H> ElementSet<H>
where
    H: SetElement,
{
    pub fn new(items: Vec<H>) -> Self {
        ElementSet { items }
    }

    pub fn empty() -> Self {
        ElementSet { items: Vec::new() }
    }

    /// All elements of this kind whose `selected` status bit is set.
    ///
    /// An empty selection yields an empty set, not an error.
    pub fn from_selection(mesh: &impl HasTopology) -> Result<Self, Error> {
        let topol = mesh.topology();
        let status = H::statuses(topol);
        let status = status.try_borrow()?;
        Ok(ElementSet {
            items: H::elements(topol).filter(|h| status[*h].selected()).collect(),
        })
    }

    /// All elements of this kind, skipping hidden ones unless
    /// `include_hidden` is set.
    pub fn from_mesh(mesh: &impl HasTopology, include_hidden: bool) -> Result<Self, Error> {
        let topol = mesh.topology();
        let status = H::statuses(topol);
        let status = status.try_borrow()?;
        Ok(ElementSet {
            items: H::elements(topol)
                .filter(|h| include_hidden || !status[*h].hidden())
                .collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = H> + use<'_, H> {
        self.items.iter().copied()
    }

    pub fn handles(&self) -> &[H] {
        &self.items
    }

    pub fn contains(&self, h: H) -> bool {
        self.items.contains(&h)
    }

    pub fn into_vec(self) -> Vec<H> {
        self.items
    }

    /// Membership marks for this set, for O(1) membership tests during
    /// traversals.
    pub(crate) fn membership(&self, topol: &Topology) -> Marks<H> {
        let mut marks = Marks::new(H::element_count(topol));
        for item in &self.items {
            marks.set(*item);
        }
        marks
    }

    /// Set the `selected` status bit on every member. With `replace`, the
    /// selection of this element kind is cleared first.
    pub fn select(&self, mesh: &impl HasTopology, replace: bool) -> Result<(), Error> {
        let mut status = H::statuses(mesh.topology());
        let mut status = status.try_borrow_mut()?;
        if replace {
            for s in status.iter_mut() {
                s.set_selected(false);
            }
        }
        for item in &self.items {
            status[*item].set_selected(true);
        }
        Ok(())
    }

    /// Set the `tagged` scratch bit on every member. Callers own the tag
    /// bit and are responsible for clearing what they set.
    pub fn tag(&self, mesh: &impl HasTopology, flag: bool) -> Result<(), Error> {
        let mut status = H::statuses(mesh.topology());
        let mut status = status.try_borrow_mut()?;
        for item in &self.items {
            status[*item].set_tagged(flag);
        }
        Ok(())
    }
}

impl<H> FromIterator<H> for ElementSet<H>
where
    H: SetElement,
{
    fn from_iter<T: IntoIterator<Item = H>>(iter: T) -> Self {
        ElementSet {
            items: iter.into_iter().collect(),
        }
    }
}

/// Collects `items` mapped through `adjacent` into a deduplicated set,
/// keeping first-seen order.
fn project<A, B, I>(topol: &Topology, items: &[A], adjacent: impl Fn(A) -> I) -> ElementSet<B>
where
    A: SetElement,
    B: SetElement,
    I: Iterator<Item = B>,
{
    let mut seen = Marks::new(B::element_count(topol));
    let mut out = Vec::new();
    for item in items {
        for b in adjacent(*item) {
            if !seen.mark(b) {
                out.push(b);
            }
        }
    }
    ElementSet::new(out)
}

impl VertexSet {
    /// The edges incident on the member vertices.
    pub fn edges(&self, mesh: &impl HasTopology) -> EdgeSet {
        let topol = mesh.topology();
        project(topol, &self.items, |v| iterator::ve_iter(topol, v))
    }

    /// The faces incident on the member vertices.
    pub fn faces(&self, mesh: &impl HasTopology) -> FaceSet {
        let topol = mesh.topology();
        project(topol, &self.items, |v| iterator::vf_iter(topol, v))
    }

    /// The corners at the member vertices.
    pub fn corners(&self, mesh: &impl HasTopology) -> CornerSet {
        let topol = mesh.topology();
        project(topol, &self.items, |v| {
            iterator::vih_iter(topol, v).filter(|h| !topol.is_boundary_halfedge(*h))
        })
    }
}

impl EdgeSet {
    /// The end vertices of the member edges.
    pub fn vertices(&self, mesh: &impl HasTopology) -> VertexSet {
        let topol = mesh.topology();
        project(topol, &self.items, |e| iterator::ev_iter(topol, e))
    }

    /// The faces incident on the member edges.
    pub fn faces(&self, mesh: &impl HasTopology) -> FaceSet {
        let topol = mesh.topology();
        project(topol, &self.items, |e| iterator::ef_iter(topol, e))
    }

    /// Set the `seam` status bit on every member edge.
    pub fn mark_seams(&self, mesh: &impl HasTopology, flag: bool) -> Result<(), Error> {
        let mut status = mesh.topology().edge_statuses();
        let mut status = status.try_borrow_mut()?;
        for e in &self.items {
            status[*e].set_seam(flag);
        }
        Ok(())
    }
}

impl FaceSet {
    /// The vertices of the member faces.
    pub fn vertices(&self, mesh: &impl HasTopology) -> VertexSet {
        let topol = mesh.topology();
        project(topol, &self.items, |f| iterator::fv_iter(topol, f))
    }

    /// The edges of the member faces.
    pub fn edges(&self, mesh: &impl HasTopology) -> EdgeSet {
        let topol = mesh.topology();
        project(topol, &self.items, |f| iterator::fe_iter(topol, f))
    }

    /// The corners of the member faces.
    pub fn corners(&self, mesh: &impl HasTopology) -> CornerSet {
        let topol = mesh.topology();
        project(topol, &self.items, |f| iterator::fh_iter(topol, f))
    }
}

impl CornerSet {
    /// The vertices the member corners sit at.
    pub fn vertices(&self, mesh: &impl HasTopology) -> VertexSet {
        let topol = mesh.topology();
        project(topol, &self.items, |h| {
            std::iter::once(topol.head_vertex(h))
        })
    }

    /// The faces the member corners belong to.
    pub fn faces(&self, mesh: &impl HasTopology) -> FaceSet {
        let topol = mesh.topology();
        project(topol, &self.items, |h| {
            topol.halfedge_face(h).into_iter()
        })
    }
}

#[cfg(test)]
mod test {
    use super::{EdgeSet, FaceSet, VertexSet};
    use crate::{
        element::{FH, Handle},
        topol::test::quad_box,
    };

    #[test]
    fn t_from_selection_empty() {
        let qbox = quad_box();
        let set = VertexSet::from_selection(&qbox).expect("Cannot build set");
        assert!(set.is_empty());
        assert!(set.group(&qbox, false).is_empty());
    }

    #[test]
    fn t_from_mesh_counts() {
        let qbox = quad_box();
        assert_eq!(VertexSet::from_mesh(&qbox, false).unwrap().len(), 8);
        assert_eq!(EdgeSet::from_mesh(&qbox, false).unwrap().len(), 12);
        assert_eq!(FaceSet::from_mesh(&qbox, false).unwrap().len(), 6);
    }

    #[test]
    fn t_from_mesh_skips_hidden() {
        let qbox = quad_box();
        {
            let mut status = qbox.face_statuses();
            let mut status = status.try_borrow_mut().expect("Cannot borrow status");
            status[FH::from(5)].set_hidden(true);
        }
        assert_eq!(FaceSet::from_mesh(&qbox, false).unwrap().len(), 5);
        assert_eq!(FaceSet::from_mesh(&qbox, true).unwrap().len(), 6);
    }

    #[test]
    fn t_select_and_reselect() {
        let qbox = quad_box();
        VertexSet::new(vec![0.into(), 1.into()])
            .select(&qbox, false)
            .expect("Cannot select");
        let set = VertexSet::from_selection(&qbox).expect("Cannot build set");
        assert_eq!(
            set.iter().map(|v| v.index()).collect::<Vec<_>>(),
            [0u32, 1]
        );
        // Replacing drops the previous selection.
        VertexSet::new(vec![5.into()])
            .select(&qbox, true)
            .expect("Cannot select");
        let set = VertexSet::from_selection(&qbox).expect("Cannot build set");
        assert_eq!(set.iter().map(|v| v.index()).collect::<Vec<_>>(), [5u32]);
        // Appending keeps it.
        VertexSet::new(vec![2.into()])
            .select(&qbox, false)
            .expect("Cannot select");
        assert_eq!(VertexSet::from_selection(&qbox).unwrap().len(), 2);
    }

    #[test]
    fn t_tag_roundtrip() {
        let qbox = quad_box();
        let set = EdgeSet::new(vec![0.into(), 3.into()]);
        set.tag(&qbox, true).expect("Cannot tag");
        assert!(qbox.edge_status(0.into()).unwrap().tagged());
        assert!(qbox.edge_status(3.into()).unwrap().tagged());
        assert!(!qbox.edge_status(1.into()).unwrap().tagged());
        set.tag(&qbox, false).expect("Cannot untag");
        assert!(!qbox.edge_status(0.into()).unwrap().tagged());
    }

    #[test]
    fn t_face_projections() {
        let qbox = quad_box();
        let faces = FaceSet::new(vec![0.into()]);
        // One quad face: 4 vertices, 4 edges, 4 corners; all deduplicated.
        assert_eq!(faces.vertices(&qbox).len(), 4);
        assert_eq!(faces.edges(&qbox).len(), 4);
        assert_eq!(faces.corners(&qbox).len(), 4);
        // Two adjacent faces share an edge and two vertices.
        let faces = FaceSet::new(vec![0.into(), 1.into()]);
        assert_eq!(faces.vertices(&qbox).len(), 6);
        assert_eq!(faces.edges(&qbox).len(), 7);
    }

    #[test]
    fn t_vertex_projections() {
        let qbox = quad_box();
        let verts = VertexSet::new(vec![0.into()]);
        // A box corner touches 3 edges and 3 faces.
        assert_eq!(verts.edges(&qbox).len(), 3);
        assert_eq!(verts.faces(&qbox).len(), 3);
        assert_eq!(verts.corners(&qbox).len(), 3);
    }

    #[test]
    fn t_edge_projections() {
        let qbox = quad_box();
        let edges = EdgeSet::new(vec![0.into()]);
        assert_eq!(edges.vertices(&qbox).len(), 2);
        assert_eq!(edges.faces(&qbox).len(), 2);
    }
}
