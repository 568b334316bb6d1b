#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Leave,
}

/// Surface-local pointer input, independent of the device that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerSample {
    pub x: i32,
    pub y: i32,
    pub phase: PointerPhase,
}

impl PointerSample {
    pub fn new(x: i32, y: i32, phase: PointerPhase) -> Self {
        Self { x, y, phase }
    }

    pub fn point(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// Device events as delivered by the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawPointerEvent {
    /// Mouse/pen coordinates already relative to the surface origin.
    Mouse { offset: (f32, f32), phase: PointerPhase },
    /// Touch coordinates relative to the viewport, plus where the surface sits in it.
    Touch {
        client: (f32, f32),
        surface_origin: (f32, f32),
        phase: PointerPhase,
    },
}

impl RawPointerEvent {
    pub fn normalize(self) -> PointerSample {
        let ((x, y), phase) = match self {
            RawPointerEvent::Mouse { offset, phase } => (offset, phase),
            RawPointerEvent::Touch {
                client,
                surface_origin,
                phase,
            } => ((client.0 - surface_origin.0, client.1 - surface_origin.1), phase),
        };
        PointerSample::new(x.round() as i32, y.round() as i32, phase)
    }
}

impl From<RawPointerEvent> for PointerSample {
    fn from(event: RawPointerEvent) -> Self {
        event.normalize()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub from: (i32, i32),
    pub to: (i32, i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeState {
    Idle,
    Drawing { last: (i32, i32) },
}

/// Turns pointer samples into line segments, one per move while drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrokeRecorder {
    state: StrokeState,
}

impl Default for StrokeRecorder {
    fn default() -> Self {
        Self {
            state: StrokeState::Idle,
        }
    }
}

impl StrokeRecorder {
    pub fn state(&self) -> StrokeState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing { .. })
    }

    /// Returns the segment to render for this sample, if any.
    pub fn handle(&mut self, sample: PointerSample) -> Option<Segment> {
        match (sample.phase, self.state) {
            (PointerPhase::Down, _) => {
                self.state = StrokeState::Drawing {
                    last: sample.point(),
                };
                None
            }
            (PointerPhase::Move, StrokeState::Drawing { last }) => {
                let to = sample.point();
                self.state = StrokeState::Drawing { last: to };
                Some(Segment { from: last, to })
            }
            (PointerPhase::Move, StrokeState::Idle) => None,
            (PointerPhase::Up | PointerPhase::Leave, _) => {
                self.state = StrokeState::Idle;
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        self.state = StrokeState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: i32, y: i32, phase: PointerPhase) -> PointerSample {
        PointerSample::new(x, y, phase)
    }

    #[test]
    fn tap_produces_no_segment() {
        let mut recorder = StrokeRecorder::default();
        assert_eq!(recorder.handle(sample(4, 4, PointerPhase::Down)), None);
        assert!(recorder.is_drawing());
        assert_eq!(recorder.handle(sample(4, 4, PointerPhase::Up)), None);
        assert_eq!(recorder.state(), StrokeState::Idle);
    }

    #[test]
    fn each_move_while_drawing_yields_one_chained_segment() {
        let mut recorder = StrokeRecorder::default();
        recorder.handle(sample(0, 0, PointerPhase::Down));

        let first = recorder.handle(sample(5, 0, PointerPhase::Move));
        let second = recorder.handle(sample(5, 5, PointerPhase::Move));

        assert_eq!(first, Some(Segment { from: (0, 0), to: (5, 0) }));
        assert_eq!(second, Some(Segment { from: (5, 0), to: (5, 5) }));
    }

    #[test]
    fn moves_outside_a_stroke_are_ignored() {
        let mut recorder = StrokeRecorder::default();
        assert_eq!(recorder.handle(sample(1, 1, PointerPhase::Move)), None);

        recorder.handle(sample(0, 0, PointerPhase::Down));
        recorder.handle(sample(2, 2, PointerPhase::Leave));
        assert_eq!(recorder.handle(sample(3, 3, PointerPhase::Move)), None);
    }

    #[test]
    fn second_down_restarts_path_at_new_point() {
        let mut recorder = StrokeRecorder::default();
        recorder.handle(sample(0, 0, PointerPhase::Down));
        recorder.handle(sample(9, 9, PointerPhase::Down));
        assert_eq!(
            recorder.handle(sample(10, 9, PointerPhase::Move)),
            Some(Segment { from: (9, 9), to: (10, 9) })
        );
    }

    #[test]
    fn touch_and_mouse_normalize_to_the_same_sample() {
        let mouse = RawPointerEvent::Mouse {
            offset: (30.0, 40.0),
            phase: PointerPhase::Move,
        };
        let touch = RawPointerEvent::Touch {
            client: (130.0, 90.4),
            surface_origin: (100.0, 50.0),
            phase: PointerPhase::Move,
        };
        assert_eq!(mouse.normalize(), touch.normalize());
        assert_eq!(PointerSample::from(touch), sample(30, 40, PointerPhase::Move));
    }
}
