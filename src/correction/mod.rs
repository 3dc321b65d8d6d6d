//! Grammar correction side-channel
//!
//! This module provides the correction worker that services viewer
//! requests, the provider boundary (`SentenceCorrector`), and the
//! per-viewer verdict cache. Provider failures never escape the worker:
//! they fold into an `error` verdict so the viewer renders the original
//! sentence unannotated.

mod cache;
mod corrector;
mod worker;

pub use cache::CorrectionCache;
pub use corrector::{CorrectionError, CorrectionVerdict, GeminiCorrector, SentenceCorrector};
pub use worker::{CorrectionJob, CorrectionWorker};
