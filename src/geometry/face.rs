// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Oriented triangular faces

use super::bound::Bound;
use super::vertex::{VertexId, VertexState};
use crate::utils::math::{sign_of, triangle_area, triangle_centroid, triangle_normal, EPS};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a face in its mesh's face arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaceId(pub(crate) u32);

impl FaceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Position of a face relative to the other operand of a boolean operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FaceState {
    #[default]
    Unknown,
    Inside,
    Outside,
    /// Coplanar with a face of the other solid, normals agree
    Same,
    /// Coplanar with a face of the other solid, normals disagree
    Opposite,
}

impl fmt::Display for FaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FaceState::Unknown => "Unknown",
            FaceState::Inside => "Inside",
            FaceState::Outside => "Outside",
            FaceState::Same => "Same",
            FaceState::Opposite => "Opposite",
        };
        f.write_str(name)
    }
}

/// Triangle whose winding (a, b, c) gives an outward normal by the right-hand rule
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    vertices: [VertexId; 3],
    points: [Point3<f64>; 3],
    normal: Vector3<f64>,
    bound: Bound,
    state: FaceState,
    inverted: bool,
}

impl Face {
    /// Build a face from vertex ids and their positions; `None` for a degenerate triangle
    pub fn new(vertices: [VertexId; 3], points: [Point3<f64>; 3]) -> Option<Self> {
        if vertices[0] == vertices[1] || vertices[1] == vertices[2] || vertices[2] == vertices[0] {
            return None;
        }
        let normal = triangle_normal(&points[0], &points[1], &points[2])?;
        Some(Self {
            vertices,
            points,
            normal,
            bound: Bound::from_points(points.iter()),
            state: FaceState::Unknown,
            inverted: false,
        })
    }

    pub fn vertices(&self) -> [VertexId; 3] {
        self.vertices
    }

    pub fn points(&self) -> &[Point3<f64>; 3] {
        &self.points
    }

    pub fn normal(&self) -> &Vector3<f64> {
        &self.normal
    }

    /// Plane offset `d` such that `normal · p + d = 0` on the face plane
    pub fn plane_offset(&self) -> f64 {
        -self.normal.dot(&self.points[0].coords)
    }

    pub fn bound(&self) -> &Bound {
        &self.bound
    }

    pub fn state(&self) -> FaceState {
        self.state
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn area(&self) -> f64 {
        triangle_area(&self.points[0], &self.points[1], &self.points[2])
    }

    pub fn centroid(&self) -> Point3<f64> {
        triangle_centroid(&self.points[0], &self.points[1], &self.points[2])
    }

    /// Signed distance from a point to the face plane, positive on the normal side
    pub fn distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&(point - self.points[0]))
    }

    /// Sign (-1, 0 or 1) of `distance` with an `EPS` band
    pub fn sdistance(&self, point: &Point3<f64>) -> i8 {
        sign_of(self.distance(point))
    }

    /// Classify a point against the face plane: in front is outside, behind is inside
    pub fn classify_point(&self, point: &Point3<f64>) -> VertexState {
        match self.sdistance(point) {
            1 => VertexState::Outside,
            -1 => VertexState::Inside,
            _ => VertexState::Boundary,
        }
    }

    /// Whether a point on the face plane lies inside the triangle or on its edges
    pub fn contains_point(&self, point: &Point3<f64>) -> bool {
        (0..3).all(|i| {
            let start = &self.points[i];
            let end = &self.points[(i + 1) % 3];
            let edge = end - start;
            let length = edge.norm();
            // signed distance from the edge line, measured inside the face plane
            edge.cross(&(point - start)).dot(&self.normal) / length >= -EPS
        })
    }

    pub(crate) fn set_state(&mut self, state: FaceState) {
        self.state = state;
    }

    /// Flip the winding and the normal
    pub(crate) fn invert(&mut self) {
        self.vertices.swap(1, 2);
        self.points.swap(1, 2);
        self.normal = -self.normal;
        self.inverted = !self.inverted;
    }
}
