use tokio::sync::Mutex;

use crate::{
    models::{Lead, ScrapedLead},
    pipeline::{LocationFilter, SeenSet},
    sink::SharedSink,
};

#[derive(Debug, Default)]
struct RunState {
    seen: SeenSet,
    emitted: usize,
}

/// State shared by every request of one crawl run.
///
/// Dedup, cap check and emission for a batch happen under one lock, so
/// concurrent requests can neither emit the same identity twice nor overshoot
/// `max_leads`.
pub struct RunContext {
    max_leads: usize,
    filter: LocationFilter,
    sink: SharedSink,
    state: Mutex<RunState>,
}

impl RunContext {
    pub fn new(max_leads: usize, filter: LocationFilter, sink: SharedSink) -> Self {
        Self {
            max_leads,
            filter,
            sink,
            state: Mutex::new(RunState::default()),
        }
    }

    pub fn max_leads(&self) -> usize {
        self.max_leads
    }

    pub async fn emitted(&self) -> usize {
        self.state.lock().await.emitted
    }

    pub async fn seen(&self) -> usize {
        self.state.lock().await.seen.len()
    }

    /// Once true, stays true for the rest of the run.
    pub async fn is_saturated(&self) -> bool {
        self.emitted().await >= self.max_leads
    }

    /// Dedup, filter and emit one batch in order. Returns how many leads were emitted.
    ///
    /// Leads left over once the cap is hit are dropped.
    pub async fn intake(&self, leads: Vec<Lead>, keyword: &str) -> usize {
        let mut state = self.state.lock().await;
        let mut accepted = 0;
        let total = leads.len();

        for (position, lead) in leads.into_iter().enumerate() {
            if state.emitted >= self.max_leads {
                log::info!(
                    "Max leads reached, dropping {} remaining leads",
                    total - position
                );
                break;
            }

            if !state.seen.accept(&lead) {
                log::debug!("Duplicate or unleadable lead {}", lead.lead_id);
                continue;
            }

            if !self.filter.passes(&lead) {
                log::debug!(
                    "Lead {} filtered out by location {:?}",
                    lead.lead_id,
                    lead.location
                );
                continue;
            }

            let record = ScrapedLead::capture(lead, keyword);
            match self.sink.push(&record).await {
                Ok(()) => {
                    state.emitted += 1;
                    accepted += 1;
                }
                Err(e) => log::error!(
                    "Failed to emit {} to {}: {}",
                    record.lead.lead_id,
                    self.sink.name(),
                    e
                ),
            }
        }

        accepted
    }
}
