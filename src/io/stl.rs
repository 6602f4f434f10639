// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL export of compiled solids

use crate::error::Result;
use crate::geometry::CompiledSolid;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Export a compiled solid to STL.
///
/// Paths ending in `.stl` are written as binary STL, anything else as ASCII.
pub fn export_stl(compiled: &CompiledSolid, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let binary = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("stl"))
        .unwrap_or(false);

    log::debug!(
        "exporting {} triangles to {} ({})",
        compiled.triangle_count(),
        path.display(),
        if binary { "binary" } else { "ascii" }
    );

    if binary {
        export_stl_binary(compiled, path)
    } else {
        export_stl_ascii(compiled, path)
    }
}

fn export_stl_binary(compiled: &CompiledSolid, path: &Path) -> Result<()> {
    use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

    let triangles: Vec<StlTriangle> = compiled
        .triangles()
        .zip(compiled.face_normals())
        .map(|([a, b, c], n)| StlTriangle {
            normal: Normal::new(n),
            vertices: [StlVertex::new(a), StlVertex::new(b), StlVertex::new(c)],
        })
        .collect();

    let mut file = BufWriter::new(File::create(path)?);
    stl_io::write_stl(&mut file, triangles.iter())?;
    file.flush()?;
    Ok(())
}

fn export_stl_ascii(compiled: &CompiledSolid, path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "solid trisolid")?;
    for (corners, n) in compiled.triangles().zip(compiled.face_normals()) {
        writeln!(file, "  facet normal {} {} {}", n[0], n[1], n[2])?;
        writeln!(file, "    outer loop")?;
        for v in corners {
            writeln!(file, "      vertex {} {} {}", v[0], v[1], v[2])?;
        }
        writeln!(file, "    endloop")?;
        writeln!(file, "  endfacet")?;
    }
    writeln!(file, "endsolid trisolid")?;
    file.flush()?;
    Ok(())
}

/// Read the triangle corners of an STL file, binary or ASCII
pub fn read_stl_triangles(path: impl AsRef<Path>) -> Result<Vec<[[f32; 3]; 3]>> {
    let mut file = File::open(path)?;
    let mesh = stl_io::read_stl(&mut file)?;
    Ok(mesh
        .faces
        .iter()
        .map(|face| face.vertices.map(|i| {
            let v = &mesh.vertices[i];
            [v[0], v[1], v[2]]
        }))
        .collect())
}
