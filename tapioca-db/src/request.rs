//! `BuildRef`: the `(project, branch, build)` triple every build-scoped
//! operation addresses (spec.md §4.7, §6 `GET /build/{project}/{target}...`).

use tapioca_hash::{build_key, BuildKey};

/// Identifies one build within one branch of one project. The triple maps
/// to an 8-byte [`BuildKey`] via [`tapioca_hash::build_key`] for use as the
/// `builds`/`build_blocks` table key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildRef {
    pub project: String,
    pub branch: String,
    pub build: String,
}

impl BuildRef {
    pub fn new(project: impl Into<String>, branch: impl Into<String>, build: impl Into<String>) -> Self {
        Self { project: project.into(), branch: branch.into(), build: build.into() }
    }

    pub fn key(&self) -> BuildKey {
        build_key(&self.project, &self.branch, &self.build)
    }
}
