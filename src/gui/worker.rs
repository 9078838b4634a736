use crate::api::ApiClient;
use crate::app::{Job, JobOutcome};
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// Runs [`Job`]s on background threads and hands their outcomes back to the
/// UI thread.
pub struct JobRunner {
    api: Arc<dyn ApiClient>,
    tx: Sender<JobOutcome>,
    rx: Receiver<JobOutcome>,
    running: usize,
}

impl JobRunner {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        let (tx, rx) = channel();
        Self {
            api,
            tx,
            rx,
            running: 0,
        }
    }

    pub fn spawn(&mut self, job: Job, ctx: &egui::Context) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        tracing::debug!(?job, "spawning job");
        self.running += 1;
        std::thread::spawn(move || {
            let outcome = job.run(api.as_ref());
            if tx.send(outcome).is_err() {
                tracing::debug!("job finished after the UI closed");
            }
            ctx.request_repaint();
        });
    }

    /// Outcomes finished since the last poll.
    pub fn poll(&mut self) -> Vec<JobOutcome> {
        let done: Vec<_> = self.rx.try_iter().collect();
        self.running = self.running.saturating_sub(done.len());
        done
    }

    pub fn is_busy(&self) -> bool {
        self.running > 0
    }
}
