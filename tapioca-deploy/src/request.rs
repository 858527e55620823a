//! `BuildRequest`: the external build-dispatch request shape (spec.md §6
//! `POST /deploy/{handler}/{project}[/{branch}[/{build}]]`).

use tapioca_db::BuildRef;

/// Identifies which handler to run and which build it is producing.
/// `branch`/`build` default the way the HTTP surface's path segments do:
/// an absent branch means the project's default branch, an absent build
/// means "the next build id," both resolved by the caller before handing
/// this to a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub handler: String,
    pub project: String,
    pub branch: String,
    pub build: String,
}

impl BuildRequest {
    pub fn new(
        handler: impl Into<String>,
        project: impl Into<String>,
        branch: impl Into<String>,
        build: impl Into<String>,
    ) -> Self {
        Self {
            handler: handler.into(),
            project: project.into(),
            branch: branch.into(),
            build: build.into(),
        }
    }

    pub fn build_ref(&self) -> BuildRef {
        BuildRef::new(&self.project, &self.branch, &self.build)
    }
}
