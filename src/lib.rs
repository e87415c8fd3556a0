// mrplan - UI test plans for GitLab merge requests via a local Ollama model
// Library exports

pub mod config;
pub mod error;
pub mod gitlab;
pub mod models;
pub mod ollama;
pub mod pipeline;
pub mod report;
