pub mod chapters;
pub mod drill;
pub mod events;
pub mod listening;
pub mod matching;
pub mod music;
pub mod scheduler;
pub mod stats;
pub mod timer;

pub use chapters::{ChapterBook, ChapterId, ChapterOutcome, ChapterStatus, ProgressUpdate};
pub use drill::{DrillEngine, DrillSettings, GameMode, Phase, SessionSummary};
pub use events::{DrillEvent, Notice, Severity};
pub use listening::{ListeningEngine, ListeningEvent, ListeningState, ListeningStatus};
