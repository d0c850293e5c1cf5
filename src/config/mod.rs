pub mod load;
pub mod save;
pub mod types;

pub use types::{
    Config, DEFAULT_MIN_SIZE_BYTES, DigestMode, Language, MAX_RECENT_PATHS, RunConfig,
    UserSettings,
};
