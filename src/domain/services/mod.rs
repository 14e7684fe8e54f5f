pub mod actions;
mod app_state;
mod auth_gate;
mod conversation;
mod courses;
mod ingestion;
mod local_store;
mod orchestrator;
mod persistence;
mod study_materials;
#[cfg(test)]
pub mod test_backend;

pub use app_state::*;
pub use conversation::*;
pub use courses::*;
pub use ingestion::*;
pub use local_store::*;
pub use orchestrator::*;
