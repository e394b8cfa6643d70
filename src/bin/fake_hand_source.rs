//! Fake hand source - streams synthetic hand-landmark frames over UDP.
//!
//! Drop-in replacement for the camera hand tracker when no camera is around.
//! The wrist orbits the arm base with a bobbing height and a little random
//! jitter; every so often it swings past the reach gate so the hold-pose path
//! gets exercised too.
//!
//! Usage:
//!   fake-hand-source [OPTIONS]
//!
//! Options:
//!   --target <addr>          Where to send frames (default: 127.0.0.1:5052)
//!   --rate <hz>              Frames per second (default: 30)
//!   --radius <len>           Orbit radius in scene units (default: 2.5)
//!   --jitter <len>           Max random offset per axis (default: 0.02)
//!   --excursion-every <n>    Push the hand out of reach every n frames (default: 300, 0 = never)
//!   --malformed-every <n>    Send a truncated frame every n frames (default: 0 = never)
//!   --offset-x <v>           Encoder x offset (default: 8.5)
//!   --scale <v>              Encoder scale (default: 100)

use anyhow::{bail, Context, Result};
use handarm::landmarks::{encode, LandmarkFrame, LANDMARK_COUNT};
use handarm::DecoderConfig;
use nalgebra::{Point3, Vector3};
use rand::Rng;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;

struct Args {
    target: SocketAddr,
    rate_hz: f64,
    radius: f32,
    jitter: f32,
    excursion_every: u64,
    malformed_every: u64,
    encoder: DecoderConfig,
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T> {
    let value = value.with_context(|| format!("{} requires a value", flag))?;
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid value for {}: {}", flag, value))
}

fn parse_args() -> Result<Option<Args>> {
    let args: Vec<String> = std::env::args().collect();
    let mut result = Args {
        target: SocketAddr::from(([127, 0, 0, 1], handarm::config::DEFAULT_PORT)),
        rate_hz: 30.0,
        radius: 2.5,
        jitter: 0.02,
        excursion_every: 300,
        malformed_every: 0,
        encoder: DecoderConfig::default(),
    };

    let mut i = 1;
    while i < args.len() {
        let next = args.get(i + 1);
        match args[i].as_str() {
            "--target" => {
                result.target = parse_value("--target", next)?;
                i += 2;
            }
            "--rate" => {
                result.rate_hz = parse_value("--rate", next)?;
                i += 2;
            }
            "--radius" => {
                result.radius = parse_value("--radius", next)?;
                i += 2;
            }
            "--jitter" => {
                result.jitter = parse_value("--jitter", next)?;
                i += 2;
            }
            "--excursion-every" => {
                result.excursion_every = parse_value("--excursion-every", next)?;
                i += 2;
            }
            "--malformed-every" => {
                result.malformed_every = parse_value("--malformed-every", next)?;
                i += 2;
            }
            "--offset-x" => {
                result.encoder.offset_x = parse_value("--offset-x", next)?;
                i += 2;
            }
            "--scale" => {
                result.encoder.scale = parse_value("--scale", next)?;
                i += 2;
            }
            "--help" | "-h" => return Ok(None),
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
                i += 1;
            }
        }
    }

    if !(result.rate_hz.is_finite() && result.rate_hz > 0.0) {
        bail!("--rate must be positive");
    }
    if !(result.jitter.is_finite() && result.jitter >= 0.0) {
        bail!("--jitter must be non-negative");
    }
    result.encoder.validate()?;

    Ok(Some(result))
}

fn print_usage() {
    println!("Fake Hand Source - streams synthetic hand-landmark frames over UDP");
    println!();
    println!("Usage: fake-hand-source [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --target <addr>          Where to send frames (default: 127.0.0.1:5052)");
    println!("  --rate <hz>              Frames per second (default: 30)");
    println!("  --radius <len>           Orbit radius in scene units (default: 2.5)");
    println!("  --jitter <len>           Max random offset per axis (default: 0.02)");
    println!("  --excursion-every <n>    Push the hand out of reach every n frames (default: 300, 0 = never)");
    println!("  --malformed-every <n>    Send a truncated frame every n frames (default: 0 = never)");
    println!("  --offset-x <v>           Encoder x offset (default: 8.5)");
    println!("  --scale <v>              Encoder scale (default: 100)");
}

/// Rough open-hand layout relative to the wrist: five fingers of four joints
/// fanned out above it.
fn hand_layout() -> [Vector3<f32>; LANDMARK_COUNT] {
    let mut offsets = [Vector3::zeros(); LANDMARK_COUNT];
    for finger in 0..5 {
        let spread = (finger as f32 - 2.0) * 0.12;
        for joint in 0..4 {
            let reach = 0.15 + joint as f32 * 0.1;
            offsets[1 + finger * 4 + joint] = Vector3::new(spread * reach * 4.0, reach, 0.0);
        }
    }
    offsets
}

/// Wrist position for frame `n`.
fn wrist_at(n: u64, args: &Args) -> Point3<f32> {
    let t = n as f32 / args.rate_hz as f32;
    let angle = t * 0.6;
    let height = 1.0 + 0.6 * (t * 1.3).sin();

    let excursion = args.excursion_every > 0 && n % args.excursion_every < args.excursion_every / 10;
    let radius = if excursion { args.radius * 3.0 } else { args.radius };

    Point3::new(radius * angle.cos(), height, radius * angle.sin())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("handarm=info".parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    let args = match parse_args()? {
        Some(a) => a,
        None => {
            print_usage();
            return Ok(());
        }
    };

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    tracing::info!(
        "Sending landmark frames to {} at {} Hz",
        args.target,
        args.rate_hz
    );

    let layout = hand_layout();
    let mut rng = rand::rng();
    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / args.rate_hz));
    let mut n: u64 = 0;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = interval.tick() => {
                let payload = if args.malformed_every > 0 && n % args.malformed_every == args.malformed_every - 1 {
                    tracing::debug!("Frame {}: sending truncated frame", n);
                    "[1,2,3]".to_string()
                } else {
                    let wrist = wrist_at(n, &args);
                    let mut points = [Point3::origin(); LANDMARK_COUNT];
                    for (point, offset) in points.iter_mut().zip(layout.iter()) {
                        let noise = if args.jitter > 0.0 {
                            Vector3::new(
                                rng.random_range(-args.jitter..args.jitter),
                                rng.random_range(-args.jitter..args.jitter),
                                rng.random_range(-args.jitter..args.jitter),
                            )
                        } else {
                            Vector3::zeros()
                        };
                        *point = wrist + offset + noise;
                    }
                    encode(&LandmarkFrame::new(points), &args.encoder)
                };

                if let Err(e) = socket.send_to(payload.as_bytes(), args.target).await {
                    tracing::warn!("Send failed: {}", e);
                }
                if n % 300 == 0 {
                    tracing::info!("Sent {} frames", n);
                }
                n += 1;
            }
        }
    }

    tracing::info!("Stopped after {} frames", n);
    Ok(())
}
