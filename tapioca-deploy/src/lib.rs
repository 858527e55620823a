//! Deployment handler dispatch: the out-of-scope HTTP server's dispatch
//! target, restated as Rust traits (spec.md §4.8).

pub mod error;
pub mod handler;
pub mod request;
pub mod zip_handler;

pub use error::{Error, Result};
pub use handler::{BuildOutcome, DeploymentHandler, HandlerRegistry};
pub use request::BuildRequest;
pub use zip_handler::ZipDeploymentHandler;
