// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Classification of faces against the other operand
//!
//! A face with any `Inside` or `Outside` vertex takes that state directly.
//! Faces whose vertices are all `Boundary` or `Unknown` cast a ray from their
//! centroid along their normal into the other solid; the result is then
//! flooded through the face's vertices so neighbours classify cheaply.

use super::face::{Face, FaceId, FaceState};
use super::mesh::Mesh;
use super::segment::Line;
use super::vertex::VertexState;
use crate::config::CsgConfig;
use crate::error::{CsgError, Result};
use crate::utils::math::EPS;
use rand::Rng;

/// Classify every face of `this` against the closed surface `that`
pub fn classify_faces<R: Rng>(
    this: &mut Mesh,
    that: &Mesh,
    config: &CsgConfig,
    rng: &mut R,
) -> Result<()> {
    let that_bound = that.bound();
    let mut traced = 0usize;

    for id in this.face_ids() {
        let state = match simple_classify(this, id) {
            Some(state) => state,
            None => {
                let face = this
                    .face(id)
                    .ok_or_else(|| CsgError::illegal("face vanished during classification"))?;
                if !face.bound().overlap(&that_bound) {
                    FaceState::Outside
                } else {
                    traced += 1;
                    ray_trace(face, that, config, rng)?
                }
            }
        };
        this.set_face_state(id, state);

        let vertex_state = match state {
            FaceState::Inside => VertexState::Inside,
            FaceState::Outside => VertexState::Outside,
            FaceState::Same | FaceState::Opposite => VertexState::Boundary,
            FaceState::Unknown => continue,
        };
        if let Some(vertices) = this.face(id).map(|face| face.vertices()) {
            for vertex in vertices {
                this.classify(vertex, vertex_state);
            }
        }
    }

    log::debug!(
        "classified {} faces, {} by ray tracing",
        this.face_count(),
        traced
    );
    Ok(())
}

/// State implied by the first `Inside` or `Outside` vertex of a face
fn simple_classify(mesh: &Mesh, id: FaceId) -> Option<FaceState> {
    let face = mesh.face(id)?;
    face.vertices()
        .iter()
        .find_map(|v| match mesh.vertex(*v).state() {
            VertexState::Inside => Some(FaceState::Inside),
            VertexState::Outside => Some(FaceState::Outside),
            _ => None,
        })
}

/// Classify a face by casting a ray from its centroid along its normal.
///
/// The nearest face of `that` hit ahead of the centroid decides: facing the
/// same way means the face is inside, facing back means outside. A hit at
/// the centroid itself means the faces are coplanar. No hit means outside.
pub fn ray_trace<R: Rng>(
    face: &Face,
    that: &Mesh,
    config: &CsgConfig,
    rng: &mut R,
) -> Result<FaceState> {
    let mut ray = Line::new(face.centroid(), *face.normal())
        .ok_or_else(|| CsgError::illegal("face without a normal"))?;
    let mut perturbations = 0u32;

    'cast: loop {
        let mut closest: Option<(f64, f64)> = None;

        for (_, other) in that.faces() {
            let dot = other.normal().dot(ray.direction());
            let Some(hit) = ray.plane_intersection(other.normal(), &other.points()[0]) else {
                continue;
            };
            let distance = ray.signed_distance(&hit);

            if distance.abs() < EPS && dot.abs() < EPS {
                // the ray runs inside this face's plane
                perturbations += 1;
                if perturbations > config.max_ray_perturbations {
                    return Err(CsgError::degenerate(format!(
                        "ray from face centroid {:?} stayed degenerate after {} perturbations",
                        face.centroid(),
                        config.max_ray_perturbations
                    )));
                }
                ray.perturb(rng, config.ray_perturbation);
                continue 'cast;
            }

            if distance.abs() < EPS {
                if other.contains_point(&hit) {
                    closest = Some((0.0, dot));
                    break;
                }
            } else if dot.abs() > EPS && distance > EPS {
                let nearer = closest.map_or(true, |(d, _)| distance < d);
                if nearer && other.contains_point(&hit) {
                    closest = Some((distance, dot));
                }
            }
        }

        if perturbations > 0 {
            log::trace!("ray cast needed {} perturbations", perturbations);
        }

        let state = match closest {
            None => FaceState::Outside,
            Some((distance, dot)) if distance.abs() < EPS => {
                if dot > EPS {
                    FaceState::Same
                } else if dot < -EPS {
                    FaceState::Opposite
                } else {
                    FaceState::Outside
                }
            }
            Some((_, dot)) => {
                if dot > EPS {
                    FaceState::Inside
                } else {
                    FaceState::Outside
                }
            }
        };
        return Ok(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Axis-aligned box with outward winding
    fn cube(min: [f64; 3], max: [f64; 3]) -> Mesh {
        let mut mesh = Mesh::new();
        let p = |x: usize, y: usize, z: usize| {
            Point3::new(
                if x == 0 { min[0] } else { max[0] },
                if y == 0 { min[1] } else { max[1] },
                if z == 0 { min[2] } else { max[2] },
            )
        };
        let quads = [
            [p(0, 0, 0), p(0, 1, 0), p(1, 1, 0), p(1, 0, 0)],
            [p(0, 0, 1), p(1, 0, 1), p(1, 1, 1), p(0, 1, 1)],
            [p(0, 0, 0), p(1, 0, 0), p(1, 0, 1), p(0, 0, 1)],
            [p(0, 1, 0), p(0, 1, 1), p(1, 1, 1), p(1, 1, 0)],
            [p(0, 0, 0), p(0, 0, 1), p(0, 1, 1), p(0, 1, 0)],
            [p(1, 0, 0), p(1, 1, 0), p(1, 1, 1), p(1, 0, 1)],
        ];
        for [a, b, c, d] in quads {
            mesh.add_face(a, b, c).unwrap();
            mesh.add_face(a, c, d).unwrap();
        }
        mesh
    }

    fn sample_face(center: Point3<f64>) -> Face {
        let mut mesh = Mesh::new();
        let id = mesh
            .add_face(
                center,
                center + nalgebra::Vector3::new(0.1, 0.0, 0.0),
                center + nalgebra::Vector3::new(0.0, 0.1, 0.0),
            )
            .unwrap();
        mesh.face(id).unwrap().clone()
    }

    #[test]
    fn test_ray_trace_inside_and_outside() {
        let solid = cube([0.0; 3], [1.0; 3]);
        let config = CsgConfig::default();
        let mut rng = StdRng::seed_from_u64(config.ray_seed);

        let inside = sample_face(Point3::new(0.3, 0.3, 0.5));
        assert_eq!(
            ray_trace(&inside, &solid, &config, &mut rng).unwrap(),
            FaceState::Inside
        );

        let outside = sample_face(Point3::new(3.0, 3.0, 0.5));
        assert_eq!(
            ray_trace(&outside, &solid, &config, &mut rng).unwrap(),
            FaceState::Outside
        );

        let below = sample_face(Point3::new(0.3, 0.3, -2.0));
        assert_eq!(
            ray_trace(&below, &solid, &config, &mut rng).unwrap(),
            FaceState::Outside
        );
    }

    #[test]
    fn test_ray_trace_coplanar() {
        let solid = cube([0.0; 3], [1.0; 3]);
        let config = CsgConfig::default();
        let mut rng = StdRng::seed_from_u64(config.ray_seed);

        // lies on the top face, facing up like it
        let same = sample_face(Point3::new(0.3, 0.3, 1.0));
        assert_eq!(
            ray_trace(&same, &solid, &config, &mut rng).unwrap(),
            FaceState::Same
        );

        // lies on the top face of the cube below, facing up against its bottom
        let below = cube([0.0, 0.0, 1.0], [1.0, 1.0, 2.0]);
        assert_eq!(
            ray_trace(&same, &below, &config, &mut rng).unwrap(),
            FaceState::Opposite
        );
    }

    #[test]
    fn test_ray_in_face_plane_needs_perturbation() {
        let solid = cube([0.0; 3], [1.0; 3]);
        // faces +x from its centroid (-1, 0, 0.5), so the ray runs in the plane y = 0
        let mut mesh = Mesh::new();
        let id = mesh
            .add_face(
                Point3::new(-1.0, -0.1, 0.4),
                Point3::new(-1.0, 0.1, 0.4),
                Point3::new(-1.0, 0.0, 0.7),
            )
            .unwrap();
        let face = mesh.face(id).unwrap().clone();

        let strict = CsgConfig {
            max_ray_perturbations: 0,
            ..CsgConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(strict.ray_seed);
        let err = ray_trace(&face, &solid, &strict, &mut rng).unwrap_err();
        assert!(err.is_degenerate(), "{}", err);

        let config = CsgConfig::default();
        let mut rng = StdRng::seed_from_u64(config.ray_seed);
        assert_eq!(
            ray_trace(&face, &solid, &config, &mut rng).unwrap(),
            FaceState::Outside
        );
    }

    #[test]
    fn test_classify_faces_disjoint() {
        let mut a = cube([0.0; 3], [1.0; 3]);
        let b = cube([5.0; 3], [6.0; 3]);
        let config = CsgConfig::default();
        let mut rng = StdRng::seed_from_u64(config.ray_seed);
        classify_faces(&mut a, &b, &config, &mut rng).unwrap();
        assert!(a.faces().all(|(_, f)| f.state() == FaceState::Outside));
        assert!(a.vertices().all(|(_, v)| v.state() == VertexState::Outside));
    }

    #[test]
    fn test_classify_faces_nested() {
        let mut inner = cube([0.25; 3], [0.75; 3]);
        let outer = cube([0.0; 3], [1.0; 3]);
        let config = CsgConfig::default();
        let mut rng = StdRng::seed_from_u64(config.ray_seed);
        classify_faces(&mut inner, &outer, &config, &mut rng).unwrap();
        assert!(inner.faces().all(|(_, f)| f.state() == FaceState::Inside));
    }
}
