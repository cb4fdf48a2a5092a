pub mod trackname;

pub use trackname::{infer, parse, InferredSession, ParsedTrack, TimePeriod};

/// Application name, used by the CLI harness for its own logging context.
pub const APP_NAME: &str = "archivist";
