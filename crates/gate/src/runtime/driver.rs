//! Runtime Driver — wraps the container runtime's CLI surface (spec.md
//! §4.1, §6.3).
//!
//! `Runtime` is hand-rolled object-safe the way the teacher's
//! `DockerOps` trait is (`Pin<Box<dyn Future>>` returns instead of
//! `async-trait`), so a fake implementation can stand in during tests
//! without a real container runtime on PATH.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

/// Graceful-stop grace period (spec.md §5, §6.3).
const STOP_GRACE_SECS: &str = "5";

pub trait Runtime: Send + Sync {
    /// Query whether a container with the exact name exists and is
    /// running. Errors from the runtime are downgraded to `false`
    /// (spec.md §4.1: "never propagate as fatal").
    fn is_running<'a>(&'a self, name: &'a str) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>>;

    /// Force-remove any stale same-named container, then launch a new
    /// one. Returns once the launch is initiated — does not wait for
    /// readiness (that's the Health Prober's job).
    fn start<'a>(
        &'a self,
        name: &'a str,
        image: &'a str,
        port: u16,
        volumes: &'a [String],
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

    /// Graceful stop with a small grace period; force-remove on failure.
    fn stop<'a>(&'a self, name: &'a str) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

/// Real implementation: shells out to the runtime's CLI binary (`docker`
/// by default, overridable via `GATE_RUNTIME_BIN` for tests).
pub struct CliRuntime {
    bin: String,
}

impl CliRuntime {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
        cmd
    }

    /// Presence probe with captured stdout, since `is_running` needs the
    /// output rather than just suppressing it.
    fn probe_command(&self) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::null());
        cmd
    }

    async fn is_running_impl(&self, name: &str) -> bool {
        let filter = format!("name=^{name}$");
        let output = self
            .probe_command()
            .args(["ps", "-q", "-f", &filter])
            .output()
            .await;

        match output {
            Ok(out) => !String::from_utf8_lossy(&out.stdout).trim().is_empty(),
            Err(err) => {
                tracing::warn!(name, error = %err, "runtime ps failed, treating as not running");
                false
            }
        }
    }

    async fn force_remove(&self, name: &str) {
        let status = self.command().args(["rm", "-f", name]).status().await;
        if let Err(err) = status {
            tracing::warn!(name, error = %err, "runtime rm -f failed");
        }
    }

    async fn start_impl(&self, name: &str, image: &str, port: u16, volumes: &[String]) {
        self.force_remove(name).await;

        let mut cmd = self.command();
        cmd.args([
            "run",
            "--rm",
            "--name",
            name,
            "-p",
            &format!("127.0.0.1:{port}:{port}"),
        ]);
        for vol in volumes {
            cmd.args(["-v", vol]);
        }
        cmd.arg(image);

        match cmd.spawn() {
            Ok(mut child) => {
                // `docker run` without `-d` stays attached for the
                // container's lifetime; don't await it inline, just reap
                // it in the background so it never becomes a zombie.
                tokio::spawn(async move {
                    let _ = child.wait().await;
                });
            }
            Err(err) => {
                tracing::warn!(name, image, error = %err, "runtime run failed to launch");
            }
        }
    }

    async fn stop_impl(&self, name: &str) {
        let status = self
            .command()
            .args(["stop", "-t", STOP_GRACE_SECS, name])
            .status()
            .await;

        let stopped = matches!(status, Ok(s) if s.success());
        if !stopped {
            tracing::warn!(name, "runtime stop failed, retrying as rm -f");
            self.force_remove(name).await;
        }
    }
}

impl Runtime for CliRuntime {
    fn is_running<'a>(&'a self, name: &'a str) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(self.is_running_impl(name))
    }

    fn start<'a>(
        &'a self,
        name: &'a str,
        image: &'a str,
        port: u16,
        volumes: &'a [String],
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(self.start_impl(name, image, port, volumes))
    }

    fn stop<'a>(&'a self, name: &'a str) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(self.stop_impl(name))
    }
}

/// Dial timeout used when the gate connects onward to a backend after a
/// successful health probe (spec.md §5).
pub const BACKEND_DIAL_TIMEOUT: Duration = Duration::from_secs(5);
