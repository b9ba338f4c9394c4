pub mod degradation;
pub mod fallback;
pub mod filter;
pub mod listen_log;
pub mod pipeline;
pub mod session;

pub use degradation::{Acquisition, AcquisitionKind, DegradationPolicy, Diagnostic};
pub use fallback::FallbackDataset;
pub use filter::filter_podcasts;
pub use listen_log::{ListenLog, DEFAULT_RECENT_LIMIT};
pub use pipeline::{
    AcquisitionPipeline, Debouncer, FetchOutcome, PipelineOptions, PipelineSnapshot, SkipReason, StreamState,
};
pub use session::SessionStore;
