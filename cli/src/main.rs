use std::time::Duration;

use canvas::engine::EngineCore;
use canvas::input::ActiveColor;
use canvas::normalize::Point;
use canvas::render::RecordingSurface;
use clap::{Args, Parser, Subcommand};
use cli::session::{SessionConfig, SessionError, SessionEvent, SessionHost};
use tokio::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("health check failed: HTTP {0}")]
    HealthCheck(u16),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("canvas must be non-empty, got {width}x{height}")]
    EmptyCanvas { width: f64, height: f64 },
    #[error("{0}")]
    ConnectionLost(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "sketch", about = "Shared sketch canvas participant")]
struct Cli {
    #[arg(long, env = "SKETCH_SERVER_URL", default_value = "http://127.0.0.1:3000")]
    server_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the relay is up.
    Ping,
    /// Join a room and draw one straight stroke.
    Draw(DrawArgs),
    /// Join a room and print every stroke peers draw.
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
struct JoinArgs {
    #[arg(long, env = "SKETCH_NAME")]
    name: String,

    #[arg(long, env = "SKETCH_ROOM")]
    room: String,

    #[arg(long, default_value_t = 1000.0)]
    width: f64,

    #[arg(long, default_value_t = 800.0)]
    height: f64,

    #[arg(long, default_value_t = 5000, help = "Join acknowledgment timeout")]
    join_timeout_ms: u64,
}

#[derive(Args, Debug)]
struct DrawArgs {
    #[command(flatten)]
    join: JoinArgs,

    #[arg(long, value_parser = parse_point, help = "Start point in pixels, e.g. 100,100")]
    from: Point,

    #[arg(long, value_parser = parse_point, help = "End point in pixels, e.g. 200,100")]
    to: Point,

    #[arg(
        long,
        default_value = canvas::consts::DEFAULT_COLOR,
        value_parser = clap::builder::PossibleValuesParser::new(canvas::consts::PALETTE)
    )]
    color: String,

    #[arg(long, default_value_t = 20, help = "Pointer moves between start and end")]
    steps: u32,

    #[arg(long, default_value_t = 16, help = "Delay between pointer moves")]
    step_ms: u64,
}

#[derive(Args, Debug)]
struct WatchArgs {
    #[command(flatten)]
    join: JoinArgs,

    #[arg(long, help = "Exit after this many segments")]
    count: Option<usize>,

    #[arg(long, default_value_t = false, help = "Print segments as JSON lines")]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Ping => run_ping(&cli.server_url).await,
        Command::Draw(args) => run_draw(&cli.server_url, args).await,
        Command::Watch(args) => run_watch(&cli.server_url, args).await,
    }
}

async fn run_ping(server_url: &str) -> Result<(), CliError> {
    let url = format!("{}/healthz", server_url.trim_end_matches('/'));
    let response = reqwest::Client::new().get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::HealthCheck(status.as_u16()));
    }
    println!("ok");
    Ok(())
}

/// Replay a straight drag as pointer events through the engine, sending every
/// segment it emits.
async fn run_draw(server_url: &str, args: DrawArgs) -> Result<(), CliError> {
    let mut engine = engine_for(&args.join)?;
    if !engine.active_color().set(args.color.as_str()) {
        warn!(color = %args.color, "draw: color not in palette, keeping default");
    }

    let mut host = SessionHost::new(session_config(server_url, &args.join)?);
    let session = host.mount(&args.join.name, &args.join.room).await?;

    let started = Instant::now();
    let mut sent = 0_usize;
    engine.on_pointer_down(args.from);
    for step in 1..=args.steps {
        tokio::time::sleep(Duration::from_millis(args.step_ms)).await;
        let at = lerp(args.from, args.to, f64::from(step) / f64::from(args.steps + 1));
        let now_ms = started.elapsed().as_secs_f64() * 1000.0;
        if let Some(segment) = engine.on_pointer_move(at, now_ms) {
            sent += usize::from(session.send_segment(&segment));
        }
    }
    if let Some(segment) = engine.on_pointer_up(args.to) {
        sent += usize::from(session.send_segment(&segment));
    }

    info!(sent, moves = args.steps, "draw: stroke sent");
    // Give the writer a moment to flush before closing.
    tokio::time::sleep(Duration::from_millis(100)).await;
    host.unmount().await;
    println!("sent {sent} segments");
    Ok(())
}

/// Print every relayed segment, denormalized against the local canvas size.
async fn run_watch(server_url: &str, args: WatchArgs) -> Result<(), CliError> {
    let mut engine = engine_for(&args.join)?;
    let mut host = SessionHost::new(session_config(server_url, &args.join)?);
    let session = host.mount(&args.join.name, &args.join.room).await?;
    eprintln!("watching room {} as {}", args.join.room, args.join.name);

    let mut seen = 0_usize;
    while args.count.is_none_or(|limit| seen < limit) {
        let Some(event) = session.next_event().await else {
            break;
        };
        match event {
            SessionEvent::Drawing { from, segment } => {
                if !engine.apply_remote(&segment) {
                    warn!("watch: segment skipped");
                    continue;
                }
                seen += 1;
                if args.json {
                    println!("{}", serde_json::to_string(&segment)?);
                    continue;
                }
                if let Some(line) = engine.surface().lines().last() {
                    println!(
                        "{} {}: ({:.1}, {:.1}) -> ({:.1}, {:.1})",
                        from.as_deref().unwrap_or(&segment.name),
                        line.color,
                        line.from.x,
                        line.from.y,
                        line.to.x,
                        line.to.y,
                    );
                }
            }
            SessionEvent::ConnectError(_) | SessionEvent::Closed => {
                let notice = session.notice().unwrap_or_else(|| "connection closed".to_owned());
                return Err(CliError::ConnectionLost(notice));
            }
        }
    }

    host.unmount().await;
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

fn session_config(server_url: &str, join: &JoinArgs) -> Result<SessionConfig, CliError> {
    Ok(SessionConfig::from_base_url(server_url)?.with_join_timeout(Duration::from_millis(join.join_timeout_ms)))
}

fn engine_for(join: &JoinArgs) -> Result<EngineCore<RecordingSurface>, CliError> {
    let mut engine = EngineCore::new(RecordingSurface::new(), join.name.trim(), ActiveColor::default());
    engine.set_viewport(join.width, join.height);
    if engine.canvas_size().is_none() {
        return Err(CliError::EmptyCanvas { width: join.width, height: join.height });
    }
    Ok(engine)
}

fn lerp(from: Point, to: Point, t: f64) -> Point {
    Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t)
}

fn parse_point(raw: &str) -> Result<Point, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {raw:?}"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("invalid x: {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("invalid y: {e}"))?;
    Ok(Point::new(x, y))
}
