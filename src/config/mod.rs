// Configuration: settings structs and loading

mod loader;
mod settings;

pub use loader::load_config;
pub use settings::{AiConfig, Config, GitLabConfig};
