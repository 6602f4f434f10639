// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Re-triangulation of a face along an intersection segment
//!
//! The segment of the face is clipped to the overlap with the other face's
//! segment. Each clipped end sits on a vertex, an edge or the interior of the
//! face, and that pair of locations picks one of the fixed splitting patterns
//! below. Every pattern keeps the original winding and covers the original
//! triangle exactly.

use super::face::Face;
use super::segment::{EndKind, Segment};
use super::vertex::VertexId;
use crate::error::{CsgError, Result};
use crate::utils::math::EPS;
use nalgebra::Point3;
use std::fmt;

/// Splitting pattern applied to a face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitKind {
    /// One point on an edge the segment runs along
    EdgePoint,
    /// Two points on an edge the segment runs along
    EdgeTwoPoints,
    /// From a vertex to a point on the opposite edge
    VertexToEdge,
    /// From a vertex to an interior point
    VertexToInterior,
    /// Between points on two different edges
    EdgeToEdge,
    /// A single interior point
    InteriorPoint,
    /// From an edge point to an interior point
    EdgeToInterior,
    /// Between two interior points
    InteriorToInterior,
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SplitKind::EdgePoint => "edge-point",
            SplitKind::EdgeTwoPoints => "edge-two-points",
            SplitKind::VertexToEdge => "vertex-to-edge",
            SplitKind::VertexToInterior => "vertex-to-interior",
            SplitKind::EdgeToEdge => "edge-to-edge",
            SplitKind::InteriorPoint => "interior-point",
            SplitKind::EdgeToInterior => "edge-to-interior",
            SplitKind::InteriorToInterior => "interior-to-interior",
        };
        f.write_str(name)
    }
}

/// A corner of a replacement triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Corner {
    /// An existing vertex of the face
    Vertex(VertexId),
    /// A new point on the cut
    Cut(Point3<f64>),
}

use Corner::{Cut, Vertex as V};

/// Replacement triangles for one face
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPlan {
    pub kind: SplitKind,
    pub triangles: Vec<[Corner; 3]>,
}

/// Result of planning a split: vertices found on the cut, and the
/// replacement triangles when the face has to change
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SplitOutcome {
    pub boundary: Vec<VertexId>,
    pub plan: Option<SplitPlan>,
}

/// Face vertices rotated so that `first` comes first
fn rotated(face: &Face, first: VertexId) -> Option<[VertexId; 3]> {
    let v = face.vertices();
    let k = v.iter().position(|id| *id == first)?;
    Some([v[k], v[(k + 1) % 3], v[(k + 2) % 3]])
}

fn next_of(face: &Face, id: VertexId) -> Option<VertexId> {
    rotated(face, id).map(|r| r[1])
}

fn missing_vertex(id: VertexId) -> CsgError {
    CsgError::illegal(format!(
        "segment vertex {} does not belong to the split face",
        id.index()
    ))
}

/// Split on the edge that starts at `p`, one point `v` on it
fn edge_point(face: &Face, p: VertexId, v: Point3<f64>) -> Result<Vec<[Corner; 3]>> {
    let [p, q, r] = rotated(face, p).ok_or_else(|| missing_vertex(p))?;
    Ok(vec![[V(p), Cut(v), V(r)], [Cut(v), V(q), V(r)]])
}

/// Split on the edge that starts at `p`; `v1` is the point nearer `p`
fn edge_two_points(
    face: &Face,
    p: VertexId,
    v1: Point3<f64>,
    v2: Point3<f64>,
) -> Result<Vec<[Corner; 3]>> {
    let [p, q, r] = rotated(face, p).ok_or_else(|| missing_vertex(p))?;
    Ok(vec![
        [V(p), Cut(v1), V(r)],
        [Cut(v1), Cut(v2), V(r)],
        [Cut(v2), V(q), V(r)],
    ])
}

/// Fan around one interior point
fn fan(face: &Face, v: Point3<f64>) -> Vec<[Corner; 3]> {
    let [a, b, c] = face.vertices();
    vec![
        [V(a), V(b), Cut(v)],
        [V(b), V(c), Cut(v)],
        [V(c), V(a), Cut(v)],
    ]
}

/// Cut off the corner shared by the edge starting at `p` (holding `vp`)
/// and the following edge (holding `vq`)
fn corner_cut(
    face: &Face,
    p: VertexId,
    vp: Point3<f64>,
    vq: Point3<f64>,
) -> Result<Vec<[Corner; 3]>> {
    let [p, q, r] = rotated(face, p).ok_or_else(|| missing_vertex(p))?;
    Ok(vec![
        [V(p), Cut(vp), Cut(vq)],
        [V(p), Cut(vq), V(r)],
        [Cut(vp), V(q), Cut(vq)],
    ])
}

/// From `v1` on the edge starting at `p` to the interior point `v2`
fn edge_to_interior(
    face: &Face,
    p: VertexId,
    v1: Point3<f64>,
    v2: Point3<f64>,
) -> Result<Vec<[Corner; 3]>> {
    let [p, q, r] = rotated(face, p).ok_or_else(|| missing_vertex(p))?;
    Ok(vec![
        [V(p), Cut(v1), Cut(v2)],
        [Cut(v1), V(q), Cut(v2)],
        [V(q), V(r), Cut(v2)],
        [V(r), V(p), Cut(v2)],
    ])
}

/// Two interior points roughly in line with vertex `p`; `v2` is the one nearer `p`
fn interior_to_interior(
    face: &Face,
    p: VertexId,
    v1: Point3<f64>,
    v2: Point3<f64>,
) -> Result<Vec<[Corner; 3]>> {
    let [p, q, r] = rotated(face, p).ok_or_else(|| missing_vertex(p))?;
    Ok(vec![
        [V(q), V(r), Cut(v1)],
        [V(q), Cut(v1), Cut(v2)],
        [V(r), Cut(v2), Cut(v1)],
        [V(q), Cut(v2), V(p)],
        [V(r), V(p), Cut(v2)],
    ])
}

/// Plan how `face` is split by the overlap of its segment `this` with the
/// other face's segment `that`
pub fn plan_split(face: &Face, this: &Segment, that: &Segment) -> Result<SplitOutcome> {
    let (start_pos, start_kind, start_dist) = if that.start.distance > this.start.distance + EPS
    {
        (that.start.position, this.middle, that.start.distance)
    } else {
        (this.start.position, this.start.kind, this.start.distance)
    };
    let (end_pos, end_kind, end_dist) = if that.end.distance < this.end.distance - EPS {
        (that.end.position, this.middle, that.end.distance)
    } else {
        (this.end.position, this.end.kind, this.end.distance)
    };
    let start_vertex = this.start.vertex;
    let end_vertex = this.end.vertex;

    let mut outcome = SplitOutcome::default();
    if start_kind == EndKind::Vertex {
        outcome.boundary.push(start_vertex);
    }
    if end_kind == EndKind::Vertex && end_vertex != start_vertex {
        outcome.boundary.push(end_vertex);
    }

    let (kind, triangles) = match (start_kind, end_kind) {
        (EndKind::Vertex, EndKind::Vertex) => return Ok(outcome),
        _ if this.middle == EndKind::Edge => {
            // the segment runs along the edge between start_vertex and end_vertex
            let forward = next_of(face, start_vertex) == Some(end_vertex);
            let edge_start = if forward { start_vertex } else { end_vertex };
            if !forward && next_of(face, end_vertex) != Some(start_vertex) {
                return Err(CsgError::illegal("edge segment endpoints are not adjacent"));
            }
            if start_kind == EndKind::Vertex {
                (SplitKind::EdgePoint, edge_point(face, edge_start, end_pos)?)
            } else if end_kind == EndKind::Vertex {
                (SplitKind::EdgePoint, edge_point(face, edge_start, start_pos)?)
            } else if (start_dist - end_dist).abs() < EPS {
                (SplitKind::EdgePoint, edge_point(face, edge_start, end_pos)?)
            } else if forward {
                (
                    SplitKind::EdgeTwoPoints,
                    edge_two_points(face, edge_start, start_pos, end_pos)?,
                )
            } else {
                (
                    SplitKind::EdgeTwoPoints,
                    edge_two_points(face, edge_start, end_pos, start_pos)?,
                )
            }
        }
        (EndKind::Vertex, EndKind::Edge) => {
            (SplitKind::VertexToEdge, edge_point(face, end_vertex, end_pos)?)
        }
        (EndKind::Edge, EndKind::Vertex) => {
            (SplitKind::VertexToEdge, edge_point(face, start_vertex, start_pos)?)
        }
        (EndKind::Vertex, EndKind::Face) => (SplitKind::VertexToInterior, fan(face, end_pos)),
        (EndKind::Face, EndKind::Vertex) => (SplitKind::VertexToInterior, fan(face, start_pos)),
        (EndKind::Edge, EndKind::Edge) => {
            let triangles = if next_of(face, start_vertex) == Some(end_vertex) {
                corner_cut(face, start_vertex, start_pos, end_pos)?
            } else if next_of(face, end_vertex) == Some(start_vertex) {
                corner_cut(face, end_vertex, end_pos, start_pos)?
            } else {
                return Err(CsgError::degenerate(
                    "segment enters and leaves a face through the same edge",
                ));
            };
            (SplitKind::EdgeToEdge, triangles)
        }
        (EndKind::Edge, EndKind::Face) => (
            SplitKind::EdgeToInterior,
            edge_to_interior(face, start_vertex, start_pos, end_pos)?,
        ),
        (EndKind::Face, EndKind::Edge) => (
            SplitKind::EdgeToInterior,
            edge_to_interior(face, end_vertex, end_pos, start_pos)?,
        ),
        (EndKind::Face, EndKind::Face) => {
            if (start_dist - end_dist).abs() < EPS {
                (SplitKind::InteriorPoint, fan(face, start_pos))
            } else {
                let lined = lined_vertex(face, &start_pos, &end_pos);
                let lined_pos = face.points()[lined];
                let lined_id = face.vertices()[lined];
                let triangles = if (lined_pos - start_pos).norm() > (lined_pos - end_pos).norm() {
                    interior_to_interior(face, lined_id, start_pos, end_pos)?
                } else {
                    interior_to_interior(face, lined_id, end_pos, start_pos)?
                };
                (SplitKind::InteriorToInterior, triangles)
            }
        }
    };

    outcome.plan = Some(SplitPlan { kind, triangles });
    Ok(outcome)
}

/// Index of the face vertex most nearly in line with the segment, seen from its end
fn lined_vertex(face: &Face, start: &Point3<f64>, end: &Point3<f64>) -> usize {
    let direction = (start - end).normalize();
    let alignment = |p: &Point3<f64>| {
        let to_end = end - p;
        let length = to_end.norm();
        if length < EPS {
            1.0
        } else {
            direction.dot(&(to_end / length)).abs()
        }
    };
    let points = face.points();
    let scores = [
        alignment(&points[0]),
        alignment(&points[1]),
        alignment(&points[2]),
    ];
    if scores[0] > scores[1] && scores[0] > scores[2] {
        0
    } else if scores[1] > scores[2] && scores[1] > scores[0] {
        1
    } else {
        2
    }
}
