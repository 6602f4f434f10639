// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Trisolid CLI

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use nalgebra::Vector3;
use trisolid::{analyze, export_stl, BooleanOp, CirclePlane, CsgConfig, Primitive, Solid};

#[derive(Parser)]
#[command(name = "trisolid")]
#[command(about = "Trisolid - boolean operations on triangle-mesh solids", long_about = None)]
struct Cli {
    /// Operation to apply to the demo pair
    #[arg(value_enum, default_value = "difference")]
    op: Op,

    /// Demo solid pair
    #[arg(short, long, value_enum, default_value = "cylinders")]
    demo: Demo,

    /// Print dimensions and statistics of the result
    #[arg(long)]
    dim: bool,

    /// Print every face of the result
    #[arg(long)]
    geom: bool,

    /// Print statistics and render buffers as JSON
    #[arg(long)]
    json: bool,

    /// Write the result as STL
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// TOML configuration file (defaults to ./trisolid.toml if present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Op {
    Union,
    Intersection,
    Difference,
}

impl From<Op> for BooleanOp {
    fn from(op: Op) -> Self {
        match op {
            Op::Union => BooleanOp::Union,
            Op::Intersection => BooleanOp::Intersection,
            Op::Difference => BooleanOp::Difference,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Demo {
    /// A 10-radius cylinder and a longer 5-radius cylinder through its axis
    Cylinders,
    /// A torus and a cylinder crossing its ring
    Torus,
    /// Two overlapping cubes
    Boxes,
}

fn demo_pair(demo: Demo, error: f64) -> Result<(Solid, Solid)> {
    let pair = match demo {
        Demo::Cylinders => (
            Primitive::cylinder(CirclePlane::XY, 10.0, 10.0, error).to_solid()?,
            Primitive::cylinder(CirclePlane::XY, 5.0, 12.0, error).to_solid()?,
        ),
        Demo::Torus => {
            let torus = Primitive::torus(4.0, 10.0, error).to_solid()?;
            let mut bar = Primitive::cylinder(CirclePlane::YZ, 2.0, 30.0, error).to_solid()?;
            bar.translate(Vector3::new(0.0, 7.0, 0.0));
            (torus, bar)
        }
        Demo::Boxes => {
            let a = Primitive::cuboid(Vector3::new(10.0, 10.0, 10.0)).to_solid()?;
            let mut b = Primitive::cuboid(Vector3::new(10.0, 10.0, 10.0)).to_solid()?;
            b.translate(Vector3::new(5.0, 5.0, 5.0));
            (a, b)
        }
    };
    Ok(pair)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CsgConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path))?,
        None => CsgConfig::load().context("Failed to load config")?,
    };

    let (a, b) = demo_pair(cli.demo, config.circle_error)?;
    let op = BooleanOp::from(cli.op);

    if cli.verbose {
        println!("{} {}", "A:".bold(), a.name().cyan());
        println!("{} {}", "B:".bold(), b.name().cyan());
    }

    let start = std::time::Instant::now();
    let mut result = a
        .combine(op, &b, &config)
        .with_context(|| format!("{} failed", op))?;
    let elapsed = start.elapsed();

    if cli.verbose {
        println!(
            "{} {} faces in {:.2?}",
            "Result:".bold(),
            result.face_count(),
            elapsed
        );
    }

    if cli.geom {
        println!("{}", result);
    }

    let stats = analyze(&result);
    if cli.dim {
        stats.print();
    }

    if cli.json {
        let report = serde_json::json!({
            "stats": stats,
            "compiled": result.compile(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if let Some(output) = &cli.output {
        export_stl(result.compile(), output)
            .with_context(|| format!("Failed to export {}", output))?;
        println!("{} {}", "Exported:".green().bold(), output);
    }

    if !stats.is_watertight {
        eprintln!("{} result is not watertight", "Warning:".yellow().bold());
    }

    Ok(())
}
