use crate::draw::bounds::scan_content_bounds;
use crate::draw::surface::RasterSurface;
use crate::solve::bindings::VariableBindings;
use crate::solve::error::SolveError;
use crate::solve::overlay::Position;
use crate::solve::service::{SolveRequest, SolveService};
use crate::solve::SolveResult;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted { request_id: u64 },
    AlreadyPending,
}

#[derive(Debug)]
enum WorkerToSession {
    Completed {
        request_id: u64,
        outcome: Result<Vec<SolveResult>, SolveError>,
    },
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    request_id: u64,
    anchor: Position,
    submitted: Instant,
}

/// A finished round trip together with the anchor captured at submit time.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSolve {
    pub request_id: u64,
    pub anchor: Position,
    pub outcome: Result<Vec<SolveResult>, SolveError>,
}

/// Runs one solve request at a time on a worker thread.
pub struct SolveCoordinator {
    service: Arc<dyn SolveService>,
    worker_tx: Sender<WorkerToSession>,
    worker_rx: Receiver<WorkerToSession>,
    in_flight: Option<InFlight>,
    next_request_id: u64,
}

impl SolveCoordinator {
    pub fn new(service: Arc<dyn SolveService>) -> Self {
        let (worker_tx, worker_rx) = mpsc::channel();
        Self {
            service,
            worker_tx,
            worker_rx,
            in_flight: None,
            next_request_id: 1,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Snapshots the surface and bindings and starts the request.
    ///
    /// Nothing is sent when the surface is blank or a request is already outstanding.
    pub fn submit(
        &mut self,
        surface: &RasterSurface,
        bindings: &VariableBindings,
    ) -> Result<SubmitOutcome, SolveError> {
        if self.in_flight.is_some() {
            return Ok(SubmitOutcome::AlreadyPending);
        }

        let bounds = scan_content_bounds(surface).ok_or(SolveError::EmptyCanvas)?;
        let image_png = surface
            .encode_png()
            .map_err(|err| SolveError::Snapshot(format!("{err:#}")))?;
        let request = SolveRequest {
            image_png,
            bindings: bindings.snapshot(),
        };

        let request_id = self.next_request_id;
        let service = Arc::clone(&self.service);
        let tx = self.worker_tx.clone();
        std::thread::Builder::new()
            .name(format!("solve-request-{request_id}"))
            .spawn(move || {
                let outcome = service.solve(&request);
                let _ = tx.send(WorkerToSession::Completed {
                    request_id,
                    outcome,
                });
            })
            .map_err(|err| SolveError::Network(format!("spawn solve worker: {err}")))?;

        self.next_request_id += 1;
        self.in_flight = Some(InFlight {
            request_id,
            anchor: Position::from(bounds.center()),
            submitted: Instant::now(),
        });
        tracing::info!(
            request_id,
            min_x = bounds.min_x,
            min_y = bounds.min_y,
            max_x = bounds.max_x,
            max_y = bounds.max_y,
            "solve request submitted"
        );
        Ok(SubmitOutcome::Submitted { request_id })
    }

    /// Non-blocking check for the outstanding response.
    pub fn poll(&mut self) -> Option<CompletedSolve> {
        loop {
            match self.worker_rx.try_recv() {
                Ok(message) => {
                    if let Some(done) = self.accept(message) {
                        return Some(done);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return None,
            }
        }
    }

    /// Blocks up to `timeout` for the outstanding response.
    pub fn wait(&mut self, timeout: Duration) -> Option<CompletedSolve> {
        let deadline = Instant::now() + timeout;
        while self.in_flight.is_some() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.worker_rx.recv_timeout(remaining) {
                Ok(message) => {
                    if let Some(done) = self.accept(message) {
                        return Some(done);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        None
    }

    /// Forgets the outstanding request; its response is dropped when it arrives.
    pub fn abandon(&mut self) -> bool {
        match self.in_flight.take() {
            Some(flight) => {
                tracing::debug!(request_id = flight.request_id, "abandoning solve request");
                true
            }
            None => false,
        }
    }

    fn accept(&mut self, message: WorkerToSession) -> Option<CompletedSolve> {
        let WorkerToSession::Completed {
            request_id,
            outcome,
        } = message;
        match self.in_flight {
            Some(flight) if flight.request_id == request_id => {
                self.in_flight = None;
                tracing::debug!(
                    request_id,
                    elapsed_ms = flight.submitted.elapsed().as_millis() as u64,
                    ok = outcome.is_ok(),
                    "solve request finished"
                );
                Some(CompletedSolve {
                    request_id,
                    anchor: flight.anchor,
                    outcome,
                })
            }
            _ => {
                tracing::debug!(request_id, "discarding stale solve response");
                None
            }
        }
    }
}
