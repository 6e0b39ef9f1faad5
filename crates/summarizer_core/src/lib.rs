pub mod domain;
pub mod handoff;
pub mod persistence;
pub mod ports;
pub mod seed;
pub mod state;
pub mod store;

pub use domain::{
    KnowledgeLevel, OutputType, SourceType, Summary, SummaryDraft, SummaryInput, SummaryLength,
    SummaryOptions, SummaryPatch, SummaryRequest, YouTubeVideo,
};
pub use persistence::{MemoryStorage, PersistedState, RehydrationOutcome, STORAGE_KEY};
pub use ports::{PortError, PortResult, StateStorage, SummarizationService};
pub use state::{AppState, Snapshot};
pub use store::{Action, Dispatcher, SelectionError, Store, SubscriptionId};
