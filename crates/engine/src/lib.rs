//! Platform switch engine.
//!
//! Several installations ("platforms") of one game share a single install
//! root. The engine decides, for a requested entry, whether to do nothing,
//! update metadata only, or swap the installed files, and remembers what it
//! installed so the next switch (or a reset) can remove it again.
//!
//! # Operations
//!
//! - **Run**: switch to an entry and launch it on a worker thread
//! - **Reset**: remove the last installed platform from the root
//! - **Entries**: add, copy, edit (with rename cascade), delete, reorder
//! - **Backup**: timestamped copy of platforms, saves and state files

pub mod backup;
pub mod entries;
pub mod error;
pub mod paths;
pub mod switcher;
pub mod traits;

pub use entries::EntryList;
pub use error::EngineError;
pub use paths::PathLayout;
pub use switcher::{Collaborators, RunOutcome, SwitchEngine, Transition};
pub use traits::{
    Activation, ActivationSink, InstanceGuard, LaunchError, ProcessLauncher, SinkError,
};
