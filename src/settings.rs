use camjigsaw_core::GameConfig;
use gloo::storage::errors::StorageError;
use gloo::storage::{LocalStorage, Storage};

const CONFIG_KEY: &str = "camjigsaw.config.v1";

/// Stored overrides merged over the defaults. Anything unreadable is ignored.
pub(crate) fn load_config() -> GameConfig {
    match LocalStorage::get::<GameConfig>(CONFIG_KEY) {
        Ok(config) => {
            gloo::console::log!("config: loaded overrides");
            config.validated()
        }
        Err(StorageError::KeyNotFound(_)) => GameConfig::default(),
        Err(err) => {
            gloo::console::warn!("config: ignoring stored value", err.to_string());
            GameConfig::default()
        }
    }
}
