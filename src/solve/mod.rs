pub mod bindings;
pub mod coordinator;
pub mod error;
pub mod overlay;
pub mod schedule;
pub mod service;

pub use bindings::VariableBindings;
pub use coordinator::{CompletedSolve, SolveCoordinator, SubmitOutcome};
pub use error::SolveError;
pub use overlay::{result_markup, OverlayEntry, Position, ResultOverlay};
pub use schedule::{DisplaySchedule, DueDisplay};
pub use service::{
    from_fn, service_from_settings, HttpSolveService, SolveRequest, SolveService, UnconfiguredService,
};

/// One recognised expression returned by the solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveResult {
    pub expression: String,
    pub answer: String,
    pub assign: bool,
}

impl SolveResult {
    pub fn new(expression: impl Into<String>, answer: impl Into<String>, assign: bool) -> Self {
        Self {
            expression: expression.into(),
            answer: answer.into(),
            assign,
        }
    }
}
