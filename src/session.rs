use crate::draw::input::{PointerSample, Segment, StrokeRecorder};
use crate::draw::model::{Color, EraserMode, Tool, ToolState};
use crate::draw::render::draw_segment;
use crate::draw::surface::RasterSurface;
use crate::settings::Settings;
use crate::solve::{
    result_markup, CompletedSolve, DisplaySchedule, Position, ResultOverlay, SolveCoordinator,
    SolveError, SolveService, SubmitOutcome, VariableBindings,
};
use crate::typeset::Typesetter;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// A non-fatal message for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub error: Option<SolveError>,
    pub at: DateTime<Local>,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            error: None,
            at: Local::now(),
        }
    }

    fn from_error(error: SolveError) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: error.user_message(),
            error: Some(error),
            at: Local::now(),
        }
    }
}

/// All mutable state of one drawing session.
///
/// Every change goes through a method here so that [`Session::reset`] can
/// clear the surface, overlay, bindings and pending displays together.
pub struct Session {
    tools: ToolState,
    surface: RasterSurface,
    recorder: StrokeRecorder,
    bindings: VariableBindings,
    overlay: ResultOverlay,
    /// Batch that produced each overlay entry, by entry index.
    entry_batches: Vec<u64>,
    schedule: DisplaySchedule,
    coordinator: SolveCoordinator,
    typesetter: Box<dyn Typesetter>,
    notices: Vec<Notice>,
    eraser_mode: EraserMode,
    display_delay: Duration,
    display_stagger: Duration,
    segments_rendered: u64,
}

impl Session {
    /// Fails only when the surface cannot be created for the viewport.
    pub fn new(
        settings: &Settings,
        viewport: (u32, u32),
        service: Arc<dyn SolveService>,
        typesetter: Box<dyn Typesetter>,
    ) -> Result<Self> {
        let surface = RasterSurface::new(viewport.0, viewport.1, settings.background_color)
            .context("create drawing surface")?;
        let mut session = Self {
            tools: settings.tool_state(),
            surface,
            recorder: StrokeRecorder::default(),
            bindings: VariableBindings::default(),
            overlay: ResultOverlay::default(),
            entry_batches: Vec::new(),
            schedule: DisplaySchedule::default(),
            coordinator: SolveCoordinator::new(service),
            typesetter,
            notices: Vec::new(),
            eraser_mode: settings.eraser_mode,
            display_delay: settings.result_display_delay(),
            display_stagger: settings.result_display_stagger(),
            segments_rendered: 0,
        };
        if let Err(err) = session.typesetter.initialize() {
            tracing::warn!("typesetter initialisation failed: {err:#}");
        }
        session.typeset();
        Ok(session)
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    pub fn bindings(&self) -> &VariableBindings {
        &self.bindings
    }

    pub fn overlay(&self) -> &ResultOverlay {
        &self.overlay
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn segments_rendered(&self) -> u64 {
        self.segments_rendered
    }

    pub fn is_solve_pending(&self) -> bool {
        self.coordinator.is_pending()
    }

    /// Earliest instant at which [`Session::pump`] has a result to show.
    pub fn next_display_due(&self) -> Option<Instant> {
        self.schedule.next_due()
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tools.set_tool(tool);
    }

    pub fn set_color(&mut self, color: Color) {
        self.tools.set_color(color);
    }

    pub fn set_stroke_width(&mut self, width: u32) -> u32 {
        self.tools.set_stroke_width(width)
    }

    pub fn select_swatch(&mut self, index: usize) -> Option<Color> {
        self.tools.select_swatch(index)
    }

    /// Feeds one pointer sample through the stroke recorder and renders the
    /// resulting segment with the tool state as it is right now.
    pub fn pointer(&mut self, sample: impl Into<PointerSample>) -> Option<Segment> {
        let segment = self.recorder.handle(sample.into())?;
        let color = match self.tools.tool() {
            Tool::Pencil => self.tools.color(),
            Tool::Eraser => match self.eraser_mode {
                EraserMode::Clear => Color::TRANSPARENT,
                EraserMode::PaintBackground => self.surface.background(),
            },
        };
        draw_segment(&mut self.surface, segment, color, self.tools.stroke_width());
        self.segments_rendered += 1;
        Some(segment)
    }

    /// Matches the surface to a new viewport. Content is discarded.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.surface
            .resize(width, height)
            .context("resize drawing surface")?;
        self.recorder.cancel();
        tracing::debug!(width, height, "surface resized");
        Ok(())
    }

    pub fn reset(&mut self) {
        self.surface.clear();
        self.recorder.cancel();
        self.overlay.reset();
        self.entry_batches.clear();
        self.bindings.reset();
        let cancelled = self.schedule.cancel_all();
        let abandoned = self.coordinator.abandon();
        tracing::info!(cancelled, abandoned, "session reset");
        self.typeset();
    }

    /// Moves one entry. Entries of the same response that are still waiting
    /// to be shown will appear at the new position.
    pub fn move_entry(&mut self, index: usize, position: Position) -> bool {
        if !self.overlay.move_entry(index, position) {
            tracing::debug!(index, "ignoring move of unknown overlay entry");
            return false;
        }
        if let Some(&batch) = self.entry_batches.get(index) {
            let retargeted = self.schedule.move_batch(batch, position);
            if retargeted > 0 {
                tracing::debug!(batch, retargeted, "pending results follow dragged entry");
            }
        }
        true
    }

    /// Starts a solve request. Failures become notices; the returned id is
    /// `None` when nothing was sent.
    pub fn trigger_solve(&mut self) -> Option<u64> {
        match self.coordinator.submit(&self.surface, &self.bindings) {
            Ok(SubmitOutcome::Submitted { request_id }) => Some(request_id),
            Ok(SubmitOutcome::AlreadyPending) => {
                tracing::debug!("solve already in progress");
                self.notices
                    .push(Notice::info("A solve is already in progress."));
                None
            }
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    /// Drives the session from the UI loop: collects a finished response and
    /// shows every result whose display time has passed.
    pub fn pump(&mut self, now: Instant) {
        if let Some(done) = self.coordinator.poll() {
            self.handle_completed(done, now);
        }
        self.show_due(now);
    }

    /// Blocks until the outstanding response arrives or `timeout` elapses.
    pub fn wait_for_solve(&mut self, timeout: Duration) -> bool {
        match self.coordinator.wait(timeout) {
            Some(done) => {
                self.handle_completed(done, Instant::now());
                true
            }
            None => false,
        }
    }

    fn handle_completed(&mut self, done: CompletedSolve, received: Instant) {
        let results = match done.outcome {
            Ok(results) => results,
            Err(err) => {
                self.report(err);
                return;
            }
        };
        if results.is_empty() {
            self.notices
                .push(Notice::info("No expression was recognised in the drawing."));
            return;
        }

        tracing::info!(
            request_id = done.request_id,
            results = results.len(),
            "solve results received"
        );
        for result in &results {
            self.bindings.apply(result);
        }
        self.schedule.schedule_batch(
            done.request_id,
            results,
            done.anchor,
            received,
            self.display_delay,
            self.display_stagger,
        );
    }

    fn show_due(&mut self, now: Instant) {
        let due = self.schedule.take_due(now);
        if due.is_empty() {
            return;
        }
        for display in due {
            if display.first_in_batch {
                self.surface.clear();
            }
            let markup = result_markup(&display.result.expression, &display.result.answer);
            self.overlay.add_entry(markup, display.position);
            self.entry_batches.push(display.batch);
            self.typeset();
        }
    }

    fn typeset(&mut self) {
        let markup = self.overlay.markup_list();
        if let Err(err) = self.typesetter.render(&markup) {
            tracing::warn!("typesetting failed: {err:#}");
        }
    }

    fn report(&mut self, err: SolveError) {
        tracing::warn!("solve failed: {err}");
        self.notices.push(Notice::from_error(err));
    }
}
