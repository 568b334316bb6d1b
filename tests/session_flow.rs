use sketch_solver::draw::input::{PointerPhase, PointerSample, RawPointerEvent};
use sketch_solver::solve::service::parse_response;
use sketch_solver::solve::{
    from_fn, service_from_settings, Position, SolveError, SolveRequest, SolveResult,
};
use sketch_solver::typeset::Typesetter;
use sketch_solver::{NoticeLevel, Session, Settings};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(5);

#[derive(Clone, Default)]
struct RecordingTypesetter {
    initialized: Rc<RefCell<bool>>,
    renders: Rc<RefCell<Vec<Vec<String>>>>,
}

impl Typesetter for RecordingTypesetter {
    fn initialize(&mut self) -> anyhow::Result<()> {
        *self.initialized.borrow_mut() = true;
        Ok(())
    }

    fn render(&mut self, markup: &[String]) -> anyhow::Result<()> {
        self.renders.borrow_mut().push(markup.to_vec());
        Ok(())
    }
}

fn session_with<F>(solve: F) -> (Session, RecordingTypesetter)
where
    F: Fn(&SolveRequest) -> Result<Vec<SolveResult>, SolveError> + Send + Sync + 'static,
{
    let typesetter = RecordingTypesetter::default();
    let mut settings = Settings::default();
    settings.default_stroke_width = 1;
    let session = Session::new(
        &settings,
        (120, 100),
        from_fn(solve),
        Box::new(typesetter.clone()),
    )
    .expect("session");
    (session, typesetter)
}

fn stroke(session: &mut Session, points: &[(i32, i32)]) {
    let (first, rest) = points.split_first().expect("points");
    session.pointer(PointerSample::new(first.0, first.1, PointerPhase::Down));
    for &(x, y) in rest {
        session.pointer(PointerSample::new(x, y, PointerPhase::Move));
    }
    session.pointer(PointerSample::new(0, 0, PointerPhase::Up));
}

fn solve_and_show(session: &mut Session) {
    session.trigger_solve().expect("request submitted");
    assert!(session.wait_for_solve(WAIT), "solver did not answer");
    session.pump(Instant::now() + Duration::from_secs(2));
}

#[test]
fn only_moves_inside_a_stroke_render_segments() {
    let (mut session, _) = session_with(|_| Ok(Vec::new()));

    session.pointer(PointerSample::new(3, 3, PointerPhase::Move));
    session.pointer(PointerSample::new(5, 5, PointerPhase::Down));
    for i in 0..7 {
        session.pointer(PointerSample::new(6 + i, 5, PointerPhase::Move));
    }
    session.pointer(PointerSample::new(13, 5, PointerPhase::Leave));
    session.pointer(PointerSample::new(20, 20, PointerPhase::Move));

    assert_eq!(session.segments_rendered(), 7);
}

#[test]
fn touch_input_draws_like_mouse_input() {
    let (mut session, _) = session_with(|_| Ok(Vec::new()));
    let origin = (40.0, 10.0);
    let touch = |x: f32, y: f32, phase| RawPointerEvent::Touch {
        client: (x + origin.0, y + origin.1),
        surface_origin: origin,
        phase,
    };

    session.pointer(touch(10.0, 10.0, PointerPhase::Down));
    session.pointer(touch(20.0, 10.0, PointerPhase::Move));
    session.pointer(touch(20.0, 10.0, PointerPhase::Up));

    assert_eq!(session.surface().pixel(15, 10).a, 255);
    assert_eq!(session.segments_rendered(), 1);
}

#[test]
fn end_to_end_result_is_anchored_at_drawing_center() {
    let (mut session, typesetter) =
        session_with(|_| Ok(vec![SolveResult::new("2+2", "4", false)]));
    stroke(&mut session, &[(10, 20), (90, 60)]);

    session.trigger_solve().expect("request submitted");
    assert!(session.wait_for_solve(WAIT));

    session.pump(Instant::now());
    assert!(session.overlay().is_empty(), "results appear only after the display delay");
    assert!(!session.surface().is_blank());

    session.pump(Instant::now() + Duration::from_secs(2));
    let entries = session.overlay().entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].markup.contains("2+2 = 4"));
    assert_eq!(entries[0].position, Position::new(50.0, 40.0));
    assert!(session.surface().is_blank());
    assert!(session.bindings().is_empty());

    assert!(*typesetter.initialized.borrow());
    let renders = typesetter.renders.borrow();
    assert_eq!(renders.first(), Some(&Vec::new()));
    assert_eq!(renders.last().map(Vec::len), Some(1));
}

#[test]
fn only_assigned_results_become_bindings() {
    let (mut session, _) = session_with(|_| {
        Ok(vec![
            SolveResult::new("x", "5", true),
            SolveResult::new("2+2", "4", false),
        ])
    });
    stroke(&mut session, &[(10, 10), (30, 30)]);
    solve_and_show(&mut session);

    assert_eq!(session.bindings().len(), 1);
    assert_eq!(session.bindings().get("x"), Some("5"));
    assert_eq!(session.overlay().len(), 2);
    let entries = session.overlay().entries();
    assert_eq!(entries[0].position, entries[1].position);
}

#[test]
fn sequential_solves_accumulate_entries_and_send_bindings() {
    let requests: Arc<Mutex<Vec<SolveRequest>>> = Arc::default();
    let seen = requests.clone();
    let (mut session, _) = session_with(move |req| {
        let mut seen = seen.lock().unwrap();
        seen.push(req.clone());
        if seen.len() == 1 {
            Ok(vec![SolveResult::new("x", "3", true)])
        } else {
            Ok(vec![SolveResult::new("x+1", "4", false)])
        }
    });

    stroke(&mut session, &[(10, 10), (20, 20)]);
    solve_and_show(&mut session);
    stroke(&mut session, &[(60, 60), (80, 70)]);
    solve_and_show(&mut session);

    let markup = session.overlay().markup_list();
    assert_eq!(markup.len(), 2);
    assert!(markup[0].contains("x = 3"));
    assert!(markup[1].contains("x+1 = 4"));

    let requests = requests.lock().unwrap();
    assert!(requests[0].bindings.is_empty());
    assert_eq!(requests[1].bindings.get("x").map(String::as_str), Some("3"));
}

#[test]
fn dragging_an_entry_moves_only_that_entry() {
    let (mut session, _) = session_with(|_| {
        Ok(vec![
            SolveResult::new("a", "1", false),
            SolveResult::new("b", "2", false),
        ])
    });
    stroke(&mut session, &[(10, 10), (20, 20)]);
    solve_and_show(&mut session);

    assert!(session.move_entry(0, Position::new(100.0, 5.0)));
    assert!(!session.move_entry(5, Position::new(0.0, 0.0)));
    let entries = session.overlay().entries();
    assert_eq!(entries[0].position, Position::new(100.0, 5.0));
    assert_eq!(entries[1].position, Position::new(15.0, 15.0));
}

#[test]
fn reset_clears_everything_and_suppresses_pending_results() {
    let (mut session, _) = session_with(|_| Ok(vec![SolveResult::new("y", "7", true)]));
    stroke(&mut session, &[(10, 10), (40, 40)]);
    solve_and_show(&mut session);

    stroke(&mut session, &[(50, 50), (60, 60)]);
    session.trigger_solve().expect("request submitted");
    assert!(session.wait_for_solve(WAIT));
    assert!(session.next_display_due().is_some());

    session.reset();
    session.pump(Instant::now() + Duration::from_secs(10));

    assert!(session.surface().is_blank());
    assert!(session.overlay().is_empty());
    assert!(session.bindings().is_empty());
    assert_eq!(session.next_display_due(), None);

    session.reset();
    assert!(session.surface().is_blank());
    assert!(session.overlay().is_empty());
}

/// Draws, solves against a failing service and checks that only a warning
/// notice is left behind.
fn assert_failure_leaves_state_untouched(session: &mut Session) -> SolveError {
    stroke(session, &[(10, 10), (40, 40)]);
    let before = session.surface().clone();

    session.trigger_solve().expect("request submitted");
    assert!(session.wait_for_solve(WAIT));
    session.pump(Instant::now() + Duration::from_secs(2));

    assert_eq!(session.surface(), &before);
    assert!(session.overlay().is_empty());
    assert!(session.bindings().is_empty());
    assert_eq!(session.next_display_due(), None);
    let mut notices = session.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    notices.remove(0).error.expect("notice carries the error")
}

#[test]
fn failed_solve_leaves_state_untouched() {
    let (mut session, _) = session_with(|_| {
        Err(SolveError::Service {
            status: 500,
            message: "boom".into(),
        })
    });
    let err = assert_failure_leaves_state_untouched(&mut session);
    assert!(matches!(err, SolveError::Service { status: 500, .. }));
}

#[test]
fn network_failure_leaves_state_untouched() {
    let (mut session, _) =
        session_with(|_| Err(SolveError::Network("connection refused".into())));
    let err = assert_failure_leaves_state_untouched(&mut session);
    assert_eq!(err, SolveError::Network("connection refused".into()));
}

#[test]
fn partly_invalid_response_binds_nothing() {
    let (mut session, _) = session_with(|_| {
        parse_response(
            200,
            r#"{"data": [{"expr": "x", "result": 5, "assign": true}, {"expr": "y", "result": {"n": 1}, "assign": true}], "status": "success"}"#,
        )
    });
    let err = assert_failure_leaves_state_untouched(&mut session);
    assert!(matches!(err, SolveError::MalformedResponse(_)));
}

#[test]
fn unreadable_response_leaves_state_untouched() {
    let (mut session, _) = session_with(|_| parse_response(200, "<html>gateway</html>"));
    let err = assert_failure_leaves_state_untouched(&mut session);
    assert!(matches!(err, SolveError::MalformedResponse(_)));
}

#[test]
fn missing_endpoint_is_reported_when_solving() {
    let settings = Settings {
        api_url: None,
        default_stroke_width: 1,
        ..Settings::default()
    };
    let service = service_from_settings(&settings).expect("service");
    let mut session = Session::new(
        &settings,
        (120, 100),
        service,
        Box::new(RecordingTypesetter::default()),
    )
    .expect("session");

    let err = assert_failure_leaves_state_untouched(&mut session);
    assert!(matches!(err, SolveError::Config(_)));
    assert!(!session.surface().is_blank());
}

#[test]
fn pending_results_follow_a_dragged_sibling() {
    let settings = Settings {
        default_stroke_width: 1,
        result_display_stagger_ms: 500,
        ..Settings::default()
    };
    let service = from_fn(|_: &SolveRequest| {
        Ok(vec![
            SolveResult::new("a", "1", false),
            SolveResult::new("b", "2", false),
        ])
    });
    let mut session = Session::new(
        &settings,
        (120, 100),
        service,
        Box::new(RecordingTypesetter::default()),
    )
    .expect("session");

    stroke(&mut session, &[(10, 10), (20, 20)]);
    session.trigger_solve().expect("request submitted");
    assert!(session.wait_for_solve(WAIT));
    let first_due = session.next_display_due().expect("first result scheduled");

    session.pump(first_due);
    assert_eq!(session.overlay().len(), 1);
    assert!(session.move_entry(0, Position::new(90.0, 30.0)));

    session.pump(first_due + Duration::from_secs(1));
    let entries = session.overlay().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].position, Position::new(90.0, 30.0));
}

#[test]
fn drawing_while_pending_does_not_move_the_anchor() {
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    let release_rx = Mutex::new(release_rx);
    let (mut session, _) = session_with(move |_| {
        let _ = release_rx.lock().unwrap().recv();
        Ok(vec![SolveResult::new("1+1", "2", false)])
    });
    stroke(&mut session, &[(10, 10), (30, 30)]);
    session.trigger_solve().expect("request submitted");

    stroke(&mut session, &[(100, 90), (110, 95)]);
    assert_eq!(session.trigger_solve(), None);
    assert_eq!(session.take_notices().len(), 1);

    release_tx.send(()).expect("release solver");
    assert!(session.wait_for_solve(WAIT));
    session.pump(Instant::now() + Duration::from_secs(2));

    assert_eq!(session.overlay().entries()[0].position, Position::new(20.0, 20.0));
}

#[test]
fn empty_response_adds_nothing_and_keeps_drawing() {
    let (mut session, _) = session_with(|_| Ok(Vec::new()));
    stroke(&mut session, &[(10, 10), (40, 40)]);
    solve_and_show(&mut session);

    assert!(session.overlay().is_empty());
    assert!(!session.surface().is_blank());
    assert_eq!(session.take_notices().len(), 1);
}
