use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tank_path_core::common::types::Point2D;
use tank_path_core::curve::CubicSpline2D;
use tank_path_core::path::codec::{decode_from_async_stream, encode_to_async_stream};
use tank_path_core::{parse_parameters, Path, PathGenerator, Renderable};
use tokio::net::{TcpListener, TcpStream};

const USAGE: &str = "usage: path_server serve <addr> [key=value ...] | path_server fetch <addr>";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [command, addr, params @ ..] if command == "serve" => serve(addr, params).await,
        [command, addr] if command == "fetch" => fetch(addr).await,
        _ => bail!(USAGE),
    }
}

/// Generate one path and hand it to every client that connects
async fn serve(addr: &str, params: &[String]) -> Result<()> {
    let mut generator = PathGenerator::default();
    generator
        .configure(&parse_parameters(params)?)
        .context("failed to configure path generator")?;

    let spline = CubicSpline2D::new(&[
        Point2D::new(0.0, 0.0),
        Point2D::new(1.5, 1.0),
        Point2D::new(3.0, 1.0),
        Point2D::new(4.5, 0.0),
    ])?;
    let path = Arc::new(generator.generate(&spline)?);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    log::info!(
        "Serving path with {} samples on {}",
        path.len(),
        listener.local_addr()?
    );

    loop {
        let (mut stream, peer) = listener.accept().await?;
        let path = Arc::clone(&path);
        tokio::spawn(async move {
            match encode_to_async_stream(&path, &mut stream).await {
                Ok(()) => log::info!("Sent path to {}", peer),
                Err(e) => log::error!("Failed to send path to {}: {}", peer, e),
            }
        });
    }
}

/// Download a path and log a summary of it
async fn fetch(addr: &str) -> Result<()> {
    let mut stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("failed to connect to {}", addr))?;
    let path: Path = decode_from_async_stream(&mut stream).await?;

    match (path.final_positions(), path.bounding_rectangle()) {
        (Some((left, right)), Some(bounds)) => log::info!(
            "Received path with {} samples: left wheel {:.3}, right wheel {:.3}, bounds {:?}",
            path.len(),
            left,
            right,
            bounds
        ),
        _ => log::info!("Received an empty path"),
    }
    Ok(())
}
