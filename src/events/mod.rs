//! Event construction subsystem.
//!
//! # Data Flow
//! ```text
//! RequestContext (at socket assignment / stream end)
//!     + LoggerConfig (per matched logger)
//!     → capture.rs (body gate: content-type, length, chunked, ceiling)
//!     → builder.rs (StartEvent / EndEvent, one fresh object per logger)
//!     → Formatter
//! ```
//!
//! # Design Decisions
//! - Events are plain owned data; sinks never see the context
//! - Chunked or unknown-length bodies are never inspected
//! - Malformed JSON under an enabled capture is an error for that logger only

pub mod builder;
pub mod capture;
pub mod types;

pub use builder::{build_end_event, build_start_event};
pub use capture::{
    wants_request_capture, wants_response_capture, BodyDirection, BodyGate, CaptureError,
};
pub use types::{
    header_fields, EndEvent, HeaderFields, LogEvent, RequestContent, ResponseContent, StartEvent,
    Timing,
};
