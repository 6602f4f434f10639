// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Face-face intersection and the face splitting pass

use super::face::{Face, FaceId};
use super::mesh::Mesh;
use super::segment::{Line, Segment};
use super::triangulate::{plan_split, Corner, SplitPlan};
use super::vertex::VertexId;
use crate::config::CsgConfig;
use crate::error::{CsgError, Result};
use crate::utils::math::{sign_of, triangle_normal, EPS};
use nalgebra::Point3;

/// Overlapping segments of two crossing faces on their common line
#[derive(Debug, Clone, Copy)]
pub struct FaceIntersection {
    pub line: Line,
    pub this: Segment,
    pub that: Segment,
}

fn one_sided(distances: &[f64; 3]) -> bool {
    let signs = distances.map(sign_of);
    signs[0] == signs[1] && signs[1] == signs[2]
}

/// Intersect two faces. `None` when either face lies entirely on one side of
/// (or in) the other's plane, the planes are parallel, or the two segments
/// share no length.
pub fn intersect_faces(this: &Face, that: &Face) -> Option<FaceIntersection> {
    let this_to_that = this.points().map(|p| that.distance(&p));
    if one_sided(&this_to_that) {
        return None;
    }
    let that_to_this = that.points().map(|p| this.distance(&p));
    if one_sided(&that_to_this) {
        return None;
    }

    let line = Line::from_planes(this, that)?;
    let this_segment = Segment::new(&line, this, this_to_that)?;
    let that_segment = Segment::new(&line, that, that_to_this)?;
    if !this_segment.overlaps(&that_segment) {
        return None;
    }

    Some(FaceIntersection {
        line,
        this: this_segment,
        that: that_segment,
    })
}

/// Position along the edge from `a` to `b` of a point lying strictly inside it
fn edge_parameter(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> Option<f64> {
    let edge = b - a;
    let length = edge.norm();
    if length < EPS {
        return None;
    }
    let t = (p - a).dot(&edge) / (length * length);
    if t * length < EPS || t * length > length - EPS {
        return None;
    }
    let offset = (p - a) - edge * t;
    (offset.norm() < EPS).then_some(t)
}

/// Split a face in two at a vertex lying inside one of its edges
fn split_at_edge_vertex(mesh: &mut Mesh, id: FaceId, vertex: VertexId) -> bool {
    let Some(face) = mesh.face(id) else {
        return false;
    };
    let ids = face.vertices();
    let points = *face.points();
    let position = *mesh.vertex(vertex).position();

    let Some(i) = (0..3).find(|&i| {
        ids[i] != vertex
            && ids[(i + 1) % 3] != vertex
            && edge_parameter(&position, &points[i], &points[(i + 1) % 3]).is_some()
    }) else {
        return false;
    };
    let (p, q, r) = (ids[i], ids[(i + 1) % 3], ids[(i + 2) % 3]);

    log::trace!("closing edge of face {} at vertex {}", id.index(), vertex.index());
    mesh.replace_face(id, &[[p, vertex, r], [vertex, q, r]]);
    true
}

/// Insert `vertex` into every face that still uses the edge `a`-`b` it lies on.
/// When the edge has already been subdivided, descend into the piece holding
/// the vertex.
fn close_edge(mesh: &mut Mesh, vertex: VertexId, a: VertexId, b: VertexId) {
    let position = *mesh.vertex(vertex).position();
    let mut pending = vec![(a, b)];

    while let Some((a, b)) = pending.pop() {
        if a == vertex || b == vertex {
            continue;
        }
        let shared: Vec<FaceId> = mesh
            .vertex(a)
            .members()
            .iter()
            .copied()
            .filter(|f| mesh.vertex(b).members().contains(f))
            .collect();
        if !shared.is_empty() {
            for id in shared {
                split_at_edge_vertex(mesh, id, vertex);
            }
            continue;
        }

        let (pa, pb) = (*mesh.vertex(a).position(), *mesh.vertex(b).position());
        let Some(t) = edge_parameter(&position, &pa, &pb) else {
            continue;
        };
        let middle = mesh
            .vertex(a)
            .members()
            .iter()
            .filter_map(|f| mesh.face(*f))
            .flat_map(|face| face.vertices())
            .find_map(|w| {
                edge_parameter(mesh.vertex(w).position(), &pa, &pb).map(|tw| (w, tw))
            });
        match middle {
            Some((m, _)) if m == vertex => {}
            Some((m, tm)) if t < tm => pending.push((a, m)),
            Some((m, _)) => pending.push((m, b)),
            None => {}
        }
    }
}

/// Replace `id` by the planned triangles. Returns false, leaving the mesh
/// untouched, when the plan collapses back to the original face.
///
/// Cut points placed inside an edge are also inserted into the face on the
/// other side of that edge.
fn apply_split(mesh: &mut Mesh, id: FaceId, face: &Face, plan: &SplitPlan) -> bool {
    let mut triangles: Vec<[VertexId; 3]> = Vec::with_capacity(plan.triangles.len());
    let mut cuts: Vec<VertexId> = Vec::new();
    for corners in &plan.triangles {
        let ids = corners.map(|corner| match corner {
            Corner::Vertex(vertex) => vertex,
            Corner::Cut(position) => {
                let vertex = mesh.vertex_at(position);
                mesh.mark_boundary(vertex);
                if !cuts.contains(&vertex) {
                    cuts.push(vertex);
                }
                vertex
            }
        });
        let [a, b, c] = ids.map(|v| *mesh.vertex(v).position());
        if triangle_normal(&a, &b, &c).is_some()
            && ids[0] != ids[1]
            && ids[1] != ids[2]
            && ids[2] != ids[0]
        {
            triangles.push(ids);
        }
    }

    if triangles.len() == 1 {
        let mut kept = triangles[0];
        let mut original = face.vertices();
        kept.sort();
        original.sort();
        if kept == original {
            return false;
        }
    }
    if triangles.is_empty() {
        log::warn!("{} split of face {} collapsed entirely", plan.kind, id.index());
        return false;
    }

    log::trace!(
        "{} split of face {} into {} faces",
        plan.kind,
        id.index(),
        triangles.len()
    );
    mesh.replace_face(id, &triangles);

    let ids = face.vertices();
    let points = face.points();
    for vertex in cuts {
        let position = *mesh.vertex(vertex).position();
        for i in 0..3 {
            let j = (i + 1) % 3;
            if edge_parameter(&position, &points[i], &points[j]).is_some() {
                close_edge(mesh, vertex, ids[i], ids[j]);
            }
        }
    }
    true
}

/// Split every face of `this` that crosses a face of `that` so no face of
/// `this` straddles the surface of `that`. New faces are appended and
/// revisited until no further split applies.
///
/// Returns the number of splits performed.
pub fn split_faces(this: &mut Mesh, that: &Mesh, config: &CsgConfig) -> Result<usize> {
    let that_bound = that.bound();
    if !this.bound().overlap(&that_bound) {
        log::debug!("bounds are disjoint, no faces to split");
        return Ok(0);
    }

    let limit = config
        .max_split_growth
        .saturating_mul(this.face_count() + that.face_count());
    let that_faces = that.face_ids();
    let mut splits = 0;
    let mut index = 0;

    while index < this.face_slots() {
        let id = FaceId(index as u32);
        index += 1;

        let face = match this.face(id) {
            Some(face) if face.bound().overlap(&that_bound) => face.clone(),
            _ => continue,
        };

        for &other_id in &that_faces {
            let Some(other) = that.face(other_id) else {
                continue;
            };
            if !face.bound().overlap(other.bound()) {
                continue;
            }
            let Some(hit) = intersect_faces(&face, other) else {
                continue;
            };

            let outcome = plan_split(&face, &hit.this, &hit.that)?;
            for vertex in outcome.boundary {
                this.mark_boundary(vertex);
            }
            if let Some(plan) = outcome.plan {
                if apply_split(this, id, &face, &plan) {
                    splits += 1;
                    break;
                }
            }
        }

        if this.face_count() > limit {
            return Err(CsgError::degenerate(format!(
                "face splitting did not converge: {} faces after {} splits",
                this.face_count(),
                splits
            )));
        }
    }

    log::debug!(
        "split pass done: {} splits, {} faces",
        splits,
        this.face_count()
    );
    Ok(splits)
}
