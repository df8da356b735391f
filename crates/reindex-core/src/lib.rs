pub mod config;
pub mod logging;

pub mod driver;
pub mod retry;
pub mod sequencer;
pub mod surface;
pub mod tracker;
pub mod transport;

pub use driver::{CategoryReport, ReindexDriver};
pub use sequencer::{CategorySequencer, RunError, RunOutcome, RunPhase, RunReport};
pub use surface::ProgressSurface;
pub use tracker::{ProgressTracker, TrackerError};
pub use transport::{BatchTransport, CurlTransport};
