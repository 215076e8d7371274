//! Background game analysis.
//!
//! Runs an [`EvaluationPipeline`] on a blocking tokio worker and reports
//! progress over a channel. Cancellation is cooperative: the pipeline checks
//! the shared flag before each ply.

use crate::{AnalysisError, EvaluationPipeline, Limit, Oracle, PipelineOutcome, Progress, ScoringPolicy};
use chess_game::Ply;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Message from a running analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisEvent {
    Progress(Progress),
    Finished(PipelineOutcome),
}

/// Handle to a game analysis running in the background.
pub struct AnalysisTask {
    events: mpsc::UnboundedReceiver<AnalysisEvent>,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl AnalysisTask {
    /// Starts analysing `plies` on a blocking worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<O, P>(
        pipeline: EvaluationPipeline<P>,
        plies: Vec<Ply>,
        mut oracle: O,
        limit: Limit,
    ) -> Self
    where
        O: Oracle + 'static,
        P: ScoringPolicy + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();

        let handle = tokio::task::spawn_blocking(move || {
            let progress_tx = tx.clone();
            let mut report = move |p: Progress| {
                // The receiver may be gone; analysis still runs to completion.
                let _ = progress_tx.send(AnalysisEvent::Progress(p));
            };
            let outcome = pipeline.run(&plies, &mut oracle, limit, &mut report, &flag);
            let _ = tx.send(AnalysisEvent::Finished(outcome));
        });

        Self {
            events: rx,
            cancel,
            handle,
        }
    }

    /// Asks the analysis to stop at the next ply boundary.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Shared cancel flag, e.g. for a signal handler.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Next event, or `None` once the analysis has ended.
    pub async fn next_event(&mut self) -> Option<AnalysisEvent> {
        self.events.recv().await
    }

    /// Waits for the analysis to finish, discarding progress events.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Task`] if the worker panicked.
    pub async fn wait(mut self) -> Result<PipelineOutcome, AnalysisError> {
        while let Some(event) = self.events.recv().await {
            if let AnalysisEvent::Finished(outcome) = event {
                return Ok(outcome);
            }
        }
        match self.handle.await {
            Ok(()) => Err(AnalysisError::Task(
                "analysis ended without a result".to_string(),
            )),
            Err(e) => Err(AnalysisError::Task(e.to_string())),
        }
    }
}
