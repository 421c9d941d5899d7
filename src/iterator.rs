use crate::{
    element::{EH, FH, HH, VH},
    topol::Topology,
};

/// Circulates counter-clockwise over the halfedges going out of one vertex.
struct OutgoingHalfedgeIter<'a> {
    topol: &'a Topology,
    hstart: Option<HH>,
    hcurrent: Option<HH>,
}

impl Iterator for OutgoingHalfedgeIter<'_> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        match self.hcurrent {
            Some(current) => {
                let next = self
                    .topol
                    .opposite_halfedge(self.topol.prev_halfedge(current));
                self.hcurrent = match self.hstart {
                    Some(start) if start != next => Some(next),
                    _ => None,
                };
                Some(current)
            }
            None => None,
        }
    }
}

/// Walks the `next` links of a halfedge loop, starting at `hstart`.
struct LoopHalfedgeIter<'a> {
    topol: &'a Topology,
    hstart: HH,
    hcurrent: Option<HH>,
}

impl Iterator for LoopHalfedgeIter<'_> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        match self.hcurrent {
            Some(current) => {
                let next = self.topol.next_halfedge(current);
                self.hcurrent = if next == self.hstart {
                    None
                } else {
                    Some(next)
                };
                Some(current)
            }
            None => None,
        }
    }
}

pub(crate) fn voh_iter(topol: &Topology, v: VH) -> impl Iterator<Item = HH> + use<'_> {
    let h = topol.vertex_halfedge(v);
    OutgoingHalfedgeIter {
        topol,
        hstart: h,
        hcurrent: h,
    }
}

pub(crate) fn vih_iter(topol: &Topology, v: VH) -> impl Iterator<Item = HH> + use<'_> {
    voh_iter(topol, v).map(|h| topol.opposite_halfedge(h))
}

pub(crate) fn vv_iter(topol: &Topology, v: VH) -> impl Iterator<Item = VH> + use<'_> {
    voh_iter(topol, v).map(|h| topol.head_vertex(h))
}

pub(crate) fn ve_iter(topol: &Topology, v: VH) -> impl Iterator<Item = EH> + use<'_> {
    voh_iter(topol, v).map(|h| topol.halfedge_edge(h))
}

pub(crate) fn vf_iter(topol: &Topology, v: VH) -> impl Iterator<Item = FH> + use<'_> {
    voh_iter(topol, v).filter_map(|h| topol.halfedge_face(h))
}

pub(crate) fn eh_iter(topol: &Topology, e: EH) -> impl Iterator<Item = HH> + use<'_> {
    [false, true]
        .iter()
        .map(move |flag| topol.edge_halfedge(e, *flag))
}

pub(crate) fn ev_iter(topol: &Topology, e: EH) -> impl Iterator<Item = VH> + use<'_> {
    eh_iter(topol, e).map(|h| topol.head_vertex(h))
}

pub(crate) fn ef_iter(topol: &Topology, e: EH) -> impl Iterator<Item = FH> + use<'_> {
    eh_iter(topol, e).filter_map(|h| topol.halfedge_face(h))
}

pub(crate) fn loop_iter(topol: &Topology, hstart: HH) -> impl Iterator<Item = HH> + use<'_> {
    LoopHalfedgeIter {
        topol,
        hstart,
        hcurrent: Some(hstart),
    }
}

pub(crate) fn fh_iter(topol: &Topology, f: FH) -> impl Iterator<Item = HH> + use<'_> {
    loop_iter(topol, topol.face_halfedge(f))
}

pub(crate) fn fv_iter(topol: &Topology, f: FH) -> impl Iterator<Item = VH> + use<'_> {
    fh_iter(topol, f).map(|h| topol.head_vertex(h))
}

pub(crate) fn fe_iter(topol: &Topology, f: FH) -> impl Iterator<Item = EH> + use<'_> {
    fh_iter(topol, f).map(|h| topol.halfedge_edge(h))
}

pub(crate) fn ff_iter(topol: &Topology, f: FH) -> impl Iterator<Item = FH> + use<'_> {
    fh_iter(topol, f).filter_map(|h| topol.halfedge_face(topol.opposite_halfedge(h)))
}
