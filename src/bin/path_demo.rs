use anyhow::{bail, Context, Result};
use std::fs;
use tank_path_core::common::types::Point2D;
use tank_path_core::curve::CubicSpline2D;
use tank_path_core::path::codec::{decode_from_slice, encode_to_vec};
use tank_path_core::render::{color_by, render, SvgRenderer};
use tank_path_core::{parse_parameters, PathGenerator};

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Initializing tank path demo...");

    // Arguments are key=value generator parameters plus an optional SVG output file
    let (param_args, outputs): (Vec<String>, Vec<String>) =
        std::env::args().skip(1).partition(|arg| arg.contains('='));
    if outputs.len() > 1 {
        bail!("expected at most one output file, got {:?}", outputs);
    }
    let params = parse_parameters(&param_args)?;

    let mut generator = PathGenerator::default();
    generator
        .configure(&params)
        .context("failed to configure path generator")?;
    log::info!("Generator configuration: {:?}", generator.config());

    // S-curve through a handful of waypoints
    let waypoints = [
        Point2D::new(0.0, 0.0),
        Point2D::new(1.0, 0.5),
        Point2D::new(2.0, 0.0),
        Point2D::new(3.0, -0.5),
        Point2D::new(4.0, 0.0),
    ];
    let spline = CubicSpline2D::new(&waypoints)?;
    let path = generator.generate(&spline)?;

    if let Some((left, right)) = path.final_positions() {
        log::info!(
            "Planned path with {} samples: left wheel {:.3}, right wheel {:.3}",
            path.len(),
            left,
            right
        );
    }

    // The wire format must reproduce the path exactly
    let bytes = encode_to_vec(&path)?;
    let decoded = decode_from_slice(&bytes)?;
    if decoded != path {
        bail!("decoded path differs from the generated one");
    }
    log::info!("Round-tripped path through {} bytes", bytes.len());

    let peak = path
        .iter()
        .map(|(left, right)| left.velocity().abs().max(right.velocity().abs()))
        .fold(0.0, f64::max);
    let mut svg = SvgRenderer::default();
    render(&color_by(&path, peak), &mut svg);
    let document = svg.into_document();

    match outputs.first() {
        Some(file) => {
            fs::write(file, document).with_context(|| format!("failed to write {}", file))?;
            log::info!("Wrote {}", file);
        }
        None => print!("{}", document),
    }

    Ok(())
}
