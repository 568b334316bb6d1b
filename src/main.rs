use anyhow::{bail, Context, Result};
use serde::Deserialize;
use sketch_solver::draw::input::{PointerPhase, PointerSample};
use sketch_solver::draw::model::{Color, Tool};
use sketch_solver::solve::{service_from_settings, SolveService, UnconfiguredService};
use sketch_solver::typeset::LogTypesetter;
use sketch_solver::{logging, Session, Settings};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

const USAGE: &str = "usage: sketch_solver <strokes.json> [--settings <settings.json>] [--snapshot <out.png>]";

#[derive(Debug, Deserialize)]
struct Recording {
    width: u32,
    height: u32,
    strokes: Vec<RecordedStroke>,
}

#[derive(Debug, Deserialize)]
struct RecordedStroke {
    #[serde(default)]
    tool: Tool,
    #[serde(default)]
    color: Option<Color>,
    #[serde(default)]
    width: Option<u32>,
    points: Vec<(i32, i32)>,
}

struct Args {
    strokes: String,
    settings: String,
    snapshot: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut strokes = None;
    let mut settings = "settings.json".to_owned();
    let mut snapshot = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--settings" => settings = args.next().context(USAGE)?,
            "--snapshot" => snapshot = Some(PathBuf::from(args.next().context(USAGE)?)),
            "-h" | "--help" => bail!(USAGE),
            _ if strokes.is_none() => strokes = Some(arg),
            _ => bail!("unexpected argument '{arg}'\n{USAGE}"),
        }
    }
    Ok(Args {
        strokes: strokes.context(USAGE)?,
        settings,
        snapshot,
    })
}

fn replay(session: &mut Session, recording: &Recording) {
    for stroke in &recording.strokes {
        let Some((first, rest)) = stroke.points.split_first() else {
            continue;
        };
        match (stroke.tool, stroke.color) {
            (Tool::Pencil, Some(color)) => session.set_color(color),
            (tool, _) => session.set_tool(tool),
        }
        if let Some(width) = stroke.width {
            session.set_stroke_width(width);
        }
        session.pointer(PointerSample::new(first.0, first.1, PointerPhase::Down));
        for &(x, y) in rest {
            session.pointer(PointerSample::new(x, y, PointerPhase::Move));
        }
        session.pointer(PointerSample::new(first.0, first.1, PointerPhase::Up));
    }
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let mut settings = Settings::load(&args.settings)?;
    settings.apply_env_overrides();
    logging::init(settings.debug_logging, settings.log_file.clone().map(PathBuf::from));

    let content = std::fs::read_to_string(&args.strokes)
        .with_context(|| format!("read stroke recording {}", args.strokes))?;
    let recording: Recording = serde_json::from_str(&content)
        .with_context(|| format!("parse stroke recording {}", args.strokes))?;

    let service: Arc<dyn SolveService> = if args.snapshot.is_some() {
        Arc::new(UnconfiguredService::new("snapshot mode does not solve"))
    } else {
        service_from_settings(&settings)?
    };

    let mut session = Session::new(
        &settings,
        (recording.width, recording.height),
        service,
        Box::new(LogTypesetter::default()),
    )?;
    replay(&mut session, &recording);
    tracing::info!(segments = session.segments_rendered(), "replayed recording");

    if let Some(path) = args.snapshot {
        let png = session.surface().encode_png()?;
        std::fs::write(&path, png).with_context(|| format!("write snapshot {}", path.display()))?;
        println!("{}", path.display());
        return Ok(());
    }

    if session.trigger_solve().is_some()
        && !session.wait_for_solve(settings.request_timeout() + Duration::from_secs(5))
    {
        tracing::warn!("solve service did not answer in time");
    }
    while let Some(due) = session.next_display_due() {
        std::thread::sleep(due.saturating_duration_since(Instant::now()));
        session.pump(Instant::now());
    }

    for notice in session.take_notices() {
        eprintln!("{}", notice.message);
    }
    println!("{}", serde_json::to_string_pretty(session.overlay().entries())?);
    Ok(())
}
