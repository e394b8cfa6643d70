//! Hand-driven arm - follow a UDP hand-landmark stream with a two-link arm.
//!
//! Listens for landmark text frames (`[x0,y0,z0,...,x20,y20,z20]`), decodes
//! the latest one every tick and solves the arm toward the wrist.
//!
//! Usage:
//!   hand-arm [OPTIONS]
//!
//! Options:
//!   --bind <addr>        UDP address to listen on (default: 0.0.0.0:5052)
//!   --rate <hz>          Tick rate (default: 60)
//!   --upper-arm <len>    Segment 1 length (default: 2.0)
//!   --forearm <len>      Segment 2 length (default: 1.5)
//!   --max-reach <len>    Reach gate radius (default: 3.5)
//!   --base <x,z>         Floor pivot placement (default: 0,0)
//!   --offset-x <v>       Decoder x offset (default: 8.5)
//!   --scale <v>          Decoder scale divisor (default: 100)
//!   --json               Print one JSON line per tick to stdout
//!   --gizmos             Include debug draw primitives in JSON lines
//!
//! Examples:
//!   hand-arm                                  # defaults, logs only
//!   hand-arm --json --gizmos > poses.jsonl    # stream poses for a viewer

use anyhow::{bail, Context, Result};
#[cfg(feature = "json")]
use handarm::DebugDraw;
use handarm::{
    ArmConfig, DecoderConfig, HandArmRig, LandmarkReceiver, LogObserver, ReceiverConfig,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

struct Args {
    receiver: ReceiverConfig,
    arm: ArmConfig,
    decoder: DecoderConfig,
    rate_hz: f64,
    json: bool,
    gizmos: bool,
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
        receiver: ReceiverConfig::default(),
        arm: ArmConfig::default(),
        decoder: DecoderConfig::default(),
        rate_hz: 60.0,
        json: false,
        gizmos: false,
    };

    let mut i = 1;
    while i < args.len() {
        let next = args.get(i + 1);
        match args[i].as_str() {
            "--bind" => {
                result.receiver.bind = parse_value("--bind", next)?;
                i += 2;
            }
            "--rate" => {
                result.rate_hz = parse_value("--rate", next)?;
                i += 2;
            }
            "--upper-arm" => {
                result.arm.upper_arm_length = parse_value("--upper-arm", next)?;
                i += 2;
            }
            "--forearm" => {
                result.arm.forearm_length = parse_value("--forearm", next)?;
                i += 2;
            }
            "--max-reach" => {
                result.arm.max_reach = parse_value("--max-reach", next)?;
                i += 2;
            }
            "--base" => {
                let value: String = parse_value("--base", next)?;
                let Some((x, z)) = value.split_once(',') else {
                    bail!("--base expects x,z");
                };
                result.arm.base_x = x.trim().parse().context("--base x")?;
                result.arm.base_z = z.trim().parse().context("--base z")?;
                i += 2;
            }
            "--offset-x" => {
                result.decoder.offset_x = parse_value("--offset-x", next)?;
                i += 2;
            }
            "--scale" => {
                result.decoder.scale = parse_value("--scale", next)?;
                i += 2;
            }
            "--json" => {
                result.json = true;
                i += 1;
            }
            "--gizmos" => {
                result.gizmos = true;
                i += 1;
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

    Ok(Some(result))
}

fn print_usage() {
    println!("Hand Arm - follow a UDP hand-landmark stream with a two-link arm");
    println!();
    println!("Usage: hand-arm [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --bind <addr>        UDP address to listen on (default: 0.0.0.0:5052)");
    println!("  --rate <hz>          Tick rate (default: 60)");
    println!("  --upper-arm <len>    Segment 1 length (default: 2.0)");
    println!("  --forearm <len>      Segment 2 length (default: 1.5)");
    println!("  --max-reach <len>    Reach gate radius (default: 3.5)");
    println!("  --base <x,z>         Floor pivot placement (default: 0,0)");
    println!("  --offset-x <v>       Decoder x offset (default: 8.5)");
    println!("  --scale <v>          Decoder scale divisor (default: 100)");
    println!("  --json               Print one JSON line per tick to stdout");
    println!("  --gizmos             Include debug draw primitives in JSON lines");
    println!();
    println!("Examples:");
    println!("  hand-arm                                  # defaults, logs only");
    println!("  hand-arm --json --gizmos > poses.jsonl    # stream poses for a viewer");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so --json output stays clean.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
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

    let mut rig = HandArmRig::new(args.arm, args.decoder)?;
    rig.add_observer(LogObserver::new());
    if args.json {
        #[cfg(feature = "json")]
        {
            let mut observer = handarm::JsonObserver::new(std::io::stdout());
            if args.gizmos {
                observer = observer.with_gizmos(DebugDraw::new(&args.arm).with_hand(true));
            }
            rig.add_observer(observer);
        }
        #[cfg(not(feature = "json"))]
        tracing::warn!("Built without the json feature, ignoring --json");
    } else if args.gizmos {
        tracing::warn!("--gizmos has no effect without --json");
    }

    tracing::info!(
        "Arm: upper={} fore={} reach={} base=({}, {})",
        args.arm.upper_arm_length,
        args.arm.forearm_length,
        args.arm.max_reach,
        args.arm.base_x,
        args.arm.base_z
    );
    tracing::info!(
        "Decoder: offset_x={} scale={}",
        args.decoder.offset_x,
        args.decoder.scale
    );

    let receiver = LandmarkReceiver::bind(&args.receiver).await?;
    let slot = receiver.slot();

    let cancel = CancellationToken::new();
    let receiver_task = tokio::spawn(receiver.run(cancel.clone()));

    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / args.rate_hz));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut seen = 0u64;

    tracing::info!("Ticking at {} Hz, Ctrl+C to stop", args.rate_hz);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("Shutting down");
                break;
            }
            _ = interval.tick() => {
                // Only decode frames that arrived since the last tick.
                if let Some((seq, raw)) = slot.latest_since(seen) {
                    seen = seq;
                    rig.tick(&raw);
                } else if let Some(frame) = rig.latest_frame().copied() {
                    rig.tick_frame(&frame);
                }
            }
        }
    }

    cancel.cancel();
    receiver_task.await??;

    let decoder = rig.decoder();
    tracing::info!(
        "Ticks: {}, frames accepted: {}, dropped: {}",
        rig.ticks(),
        decoder.accepted(),
        decoder.rejected()
    );
    Ok(())
}
