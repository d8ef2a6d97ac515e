pub mod settings;

pub use settings::{
    CacheConfig, DatabaseConfig, EngineConfig, IdpConfig, JwtConfig, LoggingConfig,
    ObjectStoreConfig, ServerConfig, Settings,
};
