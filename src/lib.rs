pub mod audio;
pub mod config;
pub mod prosody;
pub mod types;
