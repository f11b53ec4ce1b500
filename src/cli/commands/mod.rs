pub mod ats;
pub mod config;
pub mod jobs;
pub mod profile;
pub mod tasks;
