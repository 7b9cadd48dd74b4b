//! Activation sinks: where the active save path is published.

use std::sync::Arc;

use platswap_engine::{Activation, ActivationSink, SinkError};
use tracing::info;

/// Registry key the game reads its save and install paths from.
pub const GAME_REGISTRY_KEY: &str = r"Software\Blizzard Entertainment\Diablo II";

/// Writes the save directory and install root to the game's registry key
/// under `HKEY_CURRENT_USER`.
#[cfg(windows)]
#[derive(Debug, Clone, Default)]
pub struct RegistryActivation;

#[cfg(windows)]
impl ActivationSink for RegistryActivation {
    fn update(&self, activation: &Activation) -> Result<(), SinkError> {
        use winreg::RegKey;
        use winreg::enums::HKEY_CURRENT_USER;

        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let (key, _) = hkcu.create_subkey(GAME_REGISTRY_KEY)?;
        let save_dir = activation.save_dir.to_string_lossy().into_owned();
        let root_dir = activation.root_dir.to_string_lossy().into_owned();
        key.set_value("Save Path", &save_dir)?;
        key.set_value("NewSavePath", &save_dir)?;
        key.set_value("InstallPath", &root_dir)?;
        info!(save_dir = %save_dir, "registry updated");
        Ok(())
    }
}

/// Records the activation in the log only. Used where there is no registry.
#[derive(Debug, Clone, Default)]
pub struct LogActivation;

impl ActivationSink for LogActivation {
    fn update(&self, activation: &Activation) -> Result<(), SinkError> {
        info!(
            entry = %activation.entry,
            save_dir = %activation.save_dir.display(),
            root = %activation.root_dir.display(),
            "active entry changed"
        );
        Ok(())
    }
}

/// The sink for this platform: the registry on Windows, the log elsewhere.
pub fn platform_sink() -> Arc<dyn ActivationSink> {
    #[cfg(windows)]
    {
        Arc::new(RegistryActivation)
    }
    #[cfg(not(windows))]
    {
        Arc::new(LogActivation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platswap_model::Entry;
    use std::path::PathBuf;

    #[test]
    fn log_sink_accepts_activation() {
        let activation = Activation {
            entry: Entry::new("LOD", Some("HC"), "Game.exe", ""),
            save_dir: PathBuf::from("/games/d2/Saves/LOD/HC"),
            root_dir: PathBuf::from("/games/d2"),
        };
        LogActivation.update(&activation).unwrap();
    }
}
