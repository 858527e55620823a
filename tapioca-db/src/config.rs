//! `ProjectConfig`: a project's stored defaults (spec.md §4.7.2 supplement,
//! grounded on the original `tapioca/config.py`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub project_id: String,
    pub max_block_size: u32,
    pub default_branch: String,
}

impl ProjectConfig {
    pub fn new(project_id: impl Into<String>, max_block_size: u32, default_branch: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            max_block_size,
            default_branch: default_branch.into(),
        }
    }
}
