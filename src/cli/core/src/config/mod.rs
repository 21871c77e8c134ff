/* src/cli/core/src/config/mod.rs */

mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use loader::{CONFIG_FILE, find_vitrine_config, load_vitrine_config, parse_vitrine_config};
pub use types::VitrineConfig;
