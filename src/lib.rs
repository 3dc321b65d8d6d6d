pub mod client;
pub mod config;
pub mod correction;
pub mod hub;
pub mod protocol;
pub mod server;
pub mod session;

pub use client::{RelayClient, ViewerSession};
pub use config::Config;
pub use correction::{
    CorrectionCache, CorrectionError, CorrectionJob, CorrectionVerdict, CorrectionWorker,
    GeminiCorrector, SentenceCorrector,
};
pub use hub::{HubAction, PeerId, RelayHub};
pub use protocol::{
    CaptionEvent, CorrectionRequest, CorrectionResponse, Greeting, VerdictStatus, WireMessage,
};
pub use server::{create_router, AppState};
pub use session::{
    EventKind, FinalizedSentence, InputSource, SessionReconciler, StreamKey,
};
