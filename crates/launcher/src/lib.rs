//! OS-facing collaborators for the switch engine.
//!
//! - [`ProcessManager`]: launches the game and reports whether it runs
//! - [`platform_sink`]: registry activation on Windows, logging elsewhere
//! - [`is_another_instance_running`]: platswap's own single-instance check

mod activation;
mod instance;
mod process;

#[cfg(windows)]
pub use activation::RegistryActivation;
pub use activation::{GAME_REGISTRY_KEY, LogActivation, platform_sink};
pub use instance::is_another_instance_running;
pub use process::{GAME_PROCESS_NAMES, ProcessManager};
