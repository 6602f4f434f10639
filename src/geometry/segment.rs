// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Lines and the segments where a face meets another face's plane

use super::face::Face;
use super::vertex::VertexId;
use crate::utils::math::{sign_of, EPS};
use nalgebra::{Point3, Vector3};
use rand::Rng;

/// Infinite line with a unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    point: Point3<f64>,
    direction: Vector3<f64>,
}

impl Line {
    /// Line through a point; `None` for a zero direction
    pub fn new(point: Point3<f64>, direction: Vector3<f64>) -> Option<Self> {
        let length = direction.norm();
        if length < EPS || !length.is_finite() {
            return None;
        }
        Some(Self {
            point,
            direction: direction / length,
        })
    }

    /// Intersection line of two face planes; `None` when the planes are parallel
    pub fn from_planes(a: &Face, b: &Face) -> Option<Self> {
        let (n1, n2) = (a.normal(), b.normal());
        let (d1, d2) = (a.plane_offset(), b.plane_offset());
        let dir = n1.cross(n2);
        if dir.norm() < EPS {
            return None;
        }

        // Fix the coordinate along the dominant direction axis at zero and
        // solve the two plane equations for the remaining pair.
        let abs = dir.map(f64::abs);
        let point = if abs.x >= abs.y && abs.x >= abs.z {
            Point3::new(
                0.0,
                (d2 * n1.z - d1 * n2.z) / dir.x,
                (d1 * n2.y - d2 * n1.y) / dir.x,
            )
        } else if abs.y >= abs.z {
            Point3::new(
                (d1 * n2.z - d2 * n1.z) / dir.y,
                0.0,
                (d2 * n1.x - d1 * n2.x) / dir.y,
            )
        } else {
            Point3::new(
                (d2 * n1.y - d1 * n2.y) / dir.z,
                (d1 * n2.x - d2 * n1.x) / dir.z,
                0.0,
            )
        };

        Self::new(point, dir)
    }

    pub fn point(&self) -> &Point3<f64> {
        &self.point
    }

    pub fn direction(&self) -> &Vector3<f64> {
        &self.direction
    }

    /// Signed position of a point's projection along the line
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        (p - self.point).dot(&self.direction)
    }

    pub fn at(&self, t: f64) -> Point3<f64> {
        self.point + self.direction * t
    }

    /// Where the line meets a plane. A line lying in the plane returns its own point.
    pub fn plane_intersection(
        &self,
        normal: &Vector3<f64>,
        plane_point: &Point3<f64>,
    ) -> Option<Point3<f64>> {
        let numerator = normal.dot(&(self.point - plane_point));
        let denominator = normal.dot(&self.direction);
        if denominator.abs() < EPS {
            if numerator.abs() < EPS {
                Some(self.point)
            } else {
                None
            }
        } else {
            Some(self.at(-numerator / denominator))
        }
    }

    /// Nudge the direction by a random offset of the given magnitude
    pub fn perturb<R: Rng>(&mut self, rng: &mut R, magnitude: f64) {
        let offset = Vector3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        ) * magnitude;
        let direction = self.direction + offset;
        let length = direction.norm();
        if length > EPS {
            self.direction = direction / length;
        }
    }
}

/// What a segment endpoint (or its interior) coincides with on the face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndKind {
    Vertex,
    Edge,
    Face,
}

/// One end of a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentEnd {
    pub kind: EndKind,
    /// The vertex for `Vertex` ends, the first vertex of the crossed edge for `Edge` ends
    pub vertex: VertexId,
    pub position: Point3<f64>,
    /// Position along the intersection line
    pub distance: f64,
}

/// Portion of the plane/plane intersection line inside one face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: SegmentEnd,
    pub end: SegmentEnd,
    pub middle: EndKind,
}

impl Segment {
    /// Build the segment of `face` on `line` from the signed distances of the
    /// face's vertices to the other face's plane. `None` when the face only
    /// grazes the plane at fewer than two ends.
    pub fn new(line: &Line, face: &Face, distances: [f64; 3]) -> Option<Self> {
        let signs = distances.map(sign_of);
        let ids = face.vertices();
        let points = face.points();
        let mut ends: Vec<SegmentEnd> = Vec::with_capacity(2);
        let mut middle = EndKind::Face;

        let add_vertex = |ends: &mut Vec<SegmentEnd>, middle: &mut EndKind, i: usize| {
            if ends.len() >= 2 {
                return;
            }
            ends.push(SegmentEnd {
                kind: EndKind::Vertex,
                vertex: ids[i],
                position: points[i],
                distance: line.signed_distance(&points[i]),
            });
            if ends.len() == 2 {
                *middle = if ends[0].vertex == ends[1].vertex {
                    EndKind::Vertex
                } else {
                    EndKind::Edge
                };
            }
        };

        for i in 0..3 {
            if signs[i] == 0 {
                add_vertex(&mut ends, &mut middle, i);
                // a lone touching vertex with both others on one side is a point segment
                if signs[(i + 1) % 3] == signs[(i + 2) % 3] {
                    add_vertex(&mut ends, &mut middle, i);
                }
            }
        }

        for i in 0..3 {
            let j = (i + 1) % 3;
            if ends.len() < 2 && signs[i] * signs[j] == -1 {
                let t = distances[i] / (distances[i] - distances[j]);
                let position = points[i] + (points[j] - points[i]) * t;
                ends.push(SegmentEnd {
                    kind: EndKind::Edge,
                    vertex: ids[i],
                    position,
                    distance: line.signed_distance(&position),
                });
                if ends.len() == 2 {
                    middle = EndKind::Face;
                }
            }
        }

        if ends.len() < 2 {
            return None;
        }
        let (mut start, mut end) = (ends[0], ends[1]);
        if start.distance > end.distance {
            std::mem::swap(&mut start, &mut end);
        }
        Some(Self { start, end, middle })
    }

    /// Whether two segments on the same line share more than `EPS` of length
    pub fn overlaps(&self, other: &Segment) -> bool {
        !(self.end.distance < other.start.distance + EPS
            || other.end.distance < self.start.distance + EPS)
    }

    pub fn length(&self) -> f64 {
        self.end.distance - self.start.distance
    }
}
