// Configuration loading

pub mod dotenv;
pub mod secrets;
pub mod settings;

pub use dotenv::DotEnv;
pub use secrets::{KeyLookup, KeySource};
pub use settings::{process_env, ConfigError, LookupSettings, OutputSettings, Settings, TelegramSettings};
