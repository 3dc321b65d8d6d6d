pub mod messages;

pub use messages::{
    CaptionEvent, CorrectionRequest, CorrectionResponse, Greeting, VerdictStatus, WireMessage,
};
