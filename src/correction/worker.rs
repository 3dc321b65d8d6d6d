use super::corrector::{CorrectionVerdict, SentenceCorrector};
use crate::hub::{PeerId, RelayHub};
use crate::protocol::{CorrectionResponse, WireMessage};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// A correction request routed from the hub, tagged with its originator
#[derive(Debug)]
pub struct CorrectionJob {
    pub peer_id: PeerId,
    pub sentence_id: u64,
    pub sentence: String,
}

/// Services correction jobs from the hub's side-channel.
///
/// Each job runs as its own task, so one slow provider call never delays
/// other jobs or hub message handling. The response goes back to the
/// originating peer only; if that peer disconnected meanwhile the send is
/// silently dropped.
pub struct CorrectionWorker {
    corrector: Arc<dyn SentenceCorrector>,
    hub: Arc<RelayHub>,
}

impl CorrectionWorker {
    pub fn new(corrector: Arc<dyn SentenceCorrector>, hub: Arc<RelayHub>) -> Self {
        Self { corrector, hub }
    }

    /// Consume jobs until the hub side of the channel closes
    pub async fn run(self, mut jobs: mpsc::UnboundedReceiver<CorrectionJob>) {
        info!("Correction worker started");

        while let Some(job) = jobs.recv().await {
            let corrector = Arc::clone(&self.corrector);
            let hub = Arc::clone(&self.hub);

            tokio::spawn(async move {
                Self::process(corrector, hub, job).await;
            });
        }

        info!("Correction worker stopped");
    }

    async fn process(corrector: Arc<dyn SentenceCorrector>, hub: Arc<RelayHub>, job: CorrectionJob) {
        debug!(sentence_id = job.sentence_id, "processing correction request");

        let verdict = match corrector.correct(&job.sentence).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!("Correction failed for sentence {}: {}", job.sentence_id, e);
                CorrectionVerdict::error(e.to_string())
            }
        };

        let response = WireMessage::CorrectionResponse(CorrectionResponse {
            sentence_id: job.sentence_id,
            status: verdict.status,
            original: job.sentence,
            corrected: verdict.corrected,
            timestamp: Utc::now().to_rfc3339(),
            error: verdict.error,
        });

        if !hub.send_to(job.peer_id, response.to_json()).await {
            debug!(
                peer_id = %job.peer_id,
                "requesting peer gone before correction completed"
            );
        }
    }
}
