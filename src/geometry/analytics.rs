// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Solid analytics and statistics

use super::bound::Bound;
use super::face::FaceState;
use super::mesh::Mesh;
use super::solid::Solid;
use super::vertex::{VertexId, VertexState};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Solid statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolidStats {
    pub name: String,
    /// Enclosed volume in cubic units
    pub volume: f64,
    /// Volume before taking the absolute value; negative for inside-out meshes
    pub signed_volume: f64,
    /// Total surface area in square units
    pub surface_area: f64,
    pub bound: Bound,
    /// Mean of the vertex positions [x, y, z]
    pub centroid: [f64; 3],
    pub vertex_count: usize,
    pub face_count: usize,
    /// Vertices lying on an intersection curve
    pub boundary_vertex_count: usize,
    /// Face count per classification state, in `FaceState` order
    pub faces_by_state: [usize; 5],
    /// Every directed edge is matched by its reverse
    pub is_watertight: bool,
}

impl SolidStats {
    /// Create empty stats
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            volume: 0.0,
            signed_volume: 0.0,
            surface_area: 0.0,
            bound: Bound::empty(),
            centroid: [0.0, 0.0, 0.0],
            vertex_count: 0,
            face_count: 0,
            boundary_vertex_count: 0,
            faces_by_state: [0; 5],
            is_watertight: true,
        }
    }

    /// Pretty print statistics
    pub fn print(&self) {
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║ {:<56} ║", truncate(&self.name, 56));
        println!("╠══════════════════════════════════════════════════════════╣");
        println!("║ Volume:          {:>14.4}                          ║", self.volume);
        println!("║ Surface Area:    {:>14.4}                          ║", self.surface_area);
        println!(
            "║ Centroid:        ({:>9.3}, {:>9.3}, {:>9.3})         ║",
            self.centroid[0], self.centroid[1], self.centroid[2]
        );
        if !self.bound.is_empty() {
            println!(
                "║ Min:             ({:>9.3}, {:>9.3}, {:>9.3})         ║",
                self.bound.min.x, self.bound.min.y, self.bound.min.z
            );
            println!(
                "║ Max:             ({:>9.3}, {:>9.3}, {:>9.3})         ║",
                self.bound.max.x, self.bound.max.y, self.bound.max.z
            );
        }
        println!("║                                                          ║");
        println!("║ Vertices:        {:>10}                              ║", self.vertex_count);
        println!("║ Boundary:        {:>10}                              ║", self.boundary_vertex_count);
        println!("║ Faces:           {:>10}                              ║", self.face_count);
        println!(
            "║ Watertight:      {:>10}                              ║",
            if self.is_watertight { "Yes" } else { "No" }
        );
        println!("╚══════════════════════════════════════════════════════════╝");
    }
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn state_slot(state: FaceState) -> usize {
    match state {
        FaceState::Unknown => 0,
        FaceState::Inside => 1,
        FaceState::Outside => 2,
        FaceState::Same => 3,
        FaceState::Opposite => 4,
    }
}

/// Analyze a solid
pub fn analyze(solid: &Solid) -> SolidStats {
    let mut stats = analyze_mesh(solid.mesh());
    stats.name = solid.name().to_string();
    stats
}

/// Analyze mesh geometry and compute statistics
pub fn analyze_mesh(mesh: &Mesh) -> SolidStats {
    if mesh.is_empty() {
        return SolidStats::empty("");
    }

    let signed_volume = calculate_signed_volume(mesh);
    let mut faces_by_state = [0; 5];
    for (_, face) in mesh.faces() {
        faces_by_state[state_slot(face.state())] += 1;
    }

    SolidStats {
        name: String::new(),
        volume: signed_volume.abs(),
        signed_volume,
        surface_area: mesh.faces().map(|(_, f)| f.area()).sum(),
        bound: mesh.bound(),
        centroid: calculate_centroid(mesh),
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        boundary_vertex_count: mesh
            .vertices()
            .filter(|(_, v)| v.state() == VertexState::Boundary)
            .count(),
        faces_by_state,
        is_watertight: check_watertight(mesh),
    }
}

/// Sum of signed tetrahedron volumes against the origin
fn calculate_signed_volume(mesh: &Mesh) -> f64 {
    mesh.faces()
        .map(|(_, face)| {
            let [v0, v1, v2] = face.points();
            v0.coords.dot(&v1.coords.cross(&v2.coords)) / 6.0
        })
        .sum()
}

fn calculate_centroid(mesh: &Mesh) -> [f64; 3] {
    let mut sum = nalgebra::Vector3::zeros();
    let mut count = 0usize;
    for (_, vertex) in mesh.vertices() {
        sum += vertex.position().coords;
        count += 1;
    }
    if count == 0 {
        return [0.0; 3];
    }
    let c = sum / count as f64;
    [c.x, c.y, c.z]
}

/// Every directed edge must be matched by exactly one reverse edge
fn check_watertight(mesh: &Mesh) -> bool {
    let mut edges: AHashMap<(VertexId, VertexId), i32> = AHashMap::new();

    for (_, face) in mesh.faces() {
        let v = face.vertices();
        for i in 0..3 {
            let (a, b) = (v[i], v[(i + 1) % 3]);
            if a < b {
                *edges.entry((a, b)).or_insert(0) += 1;
            } else {
                *edges.entry((b, a)).or_insert(0) -= 1;
            }
        }
    }

    edges.values().all(|&balance| balance == 0)
}
