//! Runtime module — the container runtime CLI wrapper.

pub mod driver;
pub mod fake;

pub use driver::{CliRuntime, Runtime, BACKEND_DIAL_TIMEOUT};
pub use fake::FakeRuntime;
