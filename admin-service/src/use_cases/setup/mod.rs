pub mod seed_defaults;

pub use seed_defaults::SeedDefaultsUseCase;
