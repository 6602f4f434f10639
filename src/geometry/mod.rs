// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - solid representation and boolean operations

mod analytics;
mod boolean;
mod bound;
mod classify;
mod face;
mod intersection;
mod mesh;
mod primitives;
mod segment;
mod solid;
mod triangulate;
mod vertex;

pub use analytics::{analyze, analyze_mesh, SolidStats};
pub use boolean::{assemble, BooleanOp};
pub use bound::Bound;
pub use classify::{classify_faces, ray_trace};
pub use face::{Face, FaceId, FaceState};
pub use intersection::{intersect_faces, split_faces, FaceIntersection};
pub use mesh::Mesh;
pub use primitives::{circle_segments, CirclePlane, Primitive};
pub use segment::{EndKind, Line, Segment, SegmentEnd};
pub use solid::{CompiledSolid, Provenance, Solid};
pub use triangulate::{plan_split, Corner, SplitKind, SplitOutcome, SplitPlan};
pub use vertex::{Vertex, VertexId, VertexState};
