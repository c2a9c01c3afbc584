//! Helpers for exercising the engine against a real SQLite file and a scripted gateway.
pub mod fake_gateway;
pub mod prepare_env;
