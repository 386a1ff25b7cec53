/// Database configuration and connection management
pub mod database;

/// Club settings, QR encoder settings and seed members from config.toml
pub mod club;
