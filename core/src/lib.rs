pub mod context;
pub mod countdown;
pub mod duty;
pub mod events;
pub mod game_data;
pub mod grouping;
pub mod import;
pub mod marker;
pub mod playback;
pub mod recorder;
pub mod session;
pub mod storage;
pub mod timeline;

// Re-exports for convenience
pub use context::AppConfig;
pub use countdown::{CountdownDetector, CountdownSignal};
pub use duty::DutyBinder;
pub use events::{ActionUsage, CoreSignal, HostEvent, PullSource, SignalHandler};
pub use game_data::{ActionCatalog, StaticActionCatalog};
pub use marker::{ActionMarker, Marker, MarkerKind, MarkerStore};
pub use playback::{PlaybackEngine, PlaybackEvent, PlaybackState};
pub use recorder::{ActionRecorder, RecordedAction, RecordedEncounter};
pub use session::OverlaySession;
pub use storage::{JsonDirectoryStore, MemoryStore, RecordingStore, StorageError, TimelineStore};
pub use timeline::{Timeline, TimelineLibrary};
