pub mod sync_use_case;

pub use sync_use_case::{RunSummary, SyncUseCase};
