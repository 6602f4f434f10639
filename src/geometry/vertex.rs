// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh vertices and their classification state

use crate::utils::math::{snap_point, EPS};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::face::FaceId;

/// Index of a vertex in its mesh's vertex arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub(crate) u32);

impl VertexId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Position of a vertex relative to the other operand of a boolean operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VertexState {
    #[default]
    Unknown,
    Inside,
    Outside,
    /// Lies on the intersection curve of the two surfaces
    Boundary,
}

impl fmt::Display for VertexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VertexState::Unknown => "Unknown",
            VertexState::Inside => "Inside",
            VertexState::Outside => "Outside",
            VertexState::Boundary => "Boundary",
        };
        f.write_str(name)
    }
}

/// A unique point of a mesh together with the faces that reference it
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    position: Point3<f64>,
    state: VertexState,
    members: Vec<FaceId>,
}

impl Vertex {
    /// Create a vertex; coordinates within `EPS` of zero are snapped to zero
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position: snap_point(&position),
            state: VertexState::Unknown,
            members: Vec::new(),
        }
    }

    pub fn position(&self) -> &Point3<f64> {
        &self.position
    }

    pub fn state(&self) -> VertexState {
        self.state
    }

    /// Faces currently referencing this vertex
    pub fn members(&self) -> &[FaceId] {
        &self.members
    }

    /// A vertex no live face references
    pub fn is_orphan(&self) -> bool {
        self.members.is_empty()
    }

    /// Lexicographic ordering by x, y then z, treating coordinates within `EPS` as equal
    pub fn compare(&self, other: &Vertex) -> Ordering {
        let (a, b) = (&self.position, &other.position);
        for (x, y) in [(a.x, b.x), (a.y, b.y), (a.z, b.z)] {
            if (x - y).abs() >= EPS {
                return x.total_cmp(&y);
            }
        }
        Ordering::Equal
    }

    /// Detached copy carrying the same position and state
    pub fn copy(&self) -> Vertex {
        Vertex {
            position: self.position,
            state: self.state,
            members: Vec::new(),
        }
    }

    pub(crate) fn set_state(&mut self, state: VertexState) {
        self.state = state;
    }

    pub(crate) fn add_member(&mut self, face: FaceId) {
        if !self.members.contains(&face) {
            self.members.push(face);
        }
    }

    pub(crate) fn remove_member(&mut self, face: FaceId) {
        self.members.retain(|f| *f != face);
    }
}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.position.x.to_bits().hash(state);
        self.position.y.to_bits().hash(state);
        self.position.z.to_bits().hash(state);
    }
}
