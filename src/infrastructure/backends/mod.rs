pub mod lectern_api;

use std::sync::Arc;

use anyhow::Result;

use crate::domain::models::BackendBox;

pub struct BackendManager {}

impl BackendManager {
    /// The HTTP backend configured through `api-url` and `request-timeout`.
    pub fn get() -> Result<BackendBox> {
        return Ok(Arc::new(lectern_api::LecternApi::from_config()?));
    }
}
