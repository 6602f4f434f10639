// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Configuration files driving boolean operations

use anyhow::Result;
use nalgebra::Vector3;
use std::io::Write;
use tempfile::NamedTempFile;
use trisolid::{CsgConfig, CsgError, Primitive};

#[test]
fn test_config_file_roundtrip() -> Result<()> {
    let config = CsgConfig {
        circle_error: 0.5,
        ray_seed: 7,
        ..CsgConfig::default()
    };
    let file = NamedTempFile::with_suffix(".toml")?;
    config.save(file.path())?;

    let loaded = CsgConfig::from_file(file.path())?;
    assert_eq!(loaded, config);
    Ok(())
}

#[test]
fn test_bad_config_file_is_reported() -> Result<()> {
    let mut file = NamedTempFile::with_suffix(".toml")?;
    writeln!(file, "circle_error = -1.0")?;

    let err = CsgConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, CsgError::Config(_)), "{}", err);
    assert_eq!(err.to_string().matches("configuration error").count(), 1);
    Ok(())
}

#[test]
fn test_config_file_rejects_circle_error_out_of_range() -> Result<()> {
    for value in ["20.0", "1e-9"] {
        let mut file = NamedTempFile::with_suffix(".toml")?;
        writeln!(file, "circle_error = {}", value)?;
        let err = CsgConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, CsgError::Config(_)), "{}", err);
    }
    Ok(())
}

#[test]
fn test_missing_config_file_is_io_error() {
    let err = CsgConfig::from_file("/nonexistent/trisolid.toml").unwrap_err();
    assert!(matches!(err, CsgError::Io(_)), "{}", err);
}

#[test]
fn test_growth_limit_is_enforced() -> Result<()> {
    let a = Primitive::cuboid(Vector3::new(4.0, 4.0, 4.0)).to_solid()?;
    let mut b = Primitive::cuboid(Vector3::new(2.0, 2.0, 2.0)).to_solid()?;
    b.translate(Vector3::new(2.0, 0.3, 0.7));

    // with no growth budget the split pass gives up as soon as it starts
    let strict = CsgConfig {
        max_split_growth: 0,
        ..CsgConfig::default()
    };
    let err = a.union_with(&b, &strict).unwrap_err();
    assert!(err.is_degenerate(), "{}", err);

    assert!(a.union_with(&b, &CsgConfig::default()).is_ok());
    Ok(())
}
