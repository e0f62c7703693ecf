//! Launching external programs.

use std::process::Stdio;

use tokio::process::Command;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Fire-and-forget program launcher.
pub trait Spawner {
    fn spawn(&self, argv: &[String]);
}

/// Spawns children on the tokio runtime and reaps them there.
pub struct TokioSpawner {
    runtime: Handle,
}

impl TokioSpawner {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }
}

impl Spawner for TokioSpawner {
    fn spawn(&self, argv: &[String]) {
        let Some((program, args)) = argv.split_first() else {
            warn!("Ignoring launch with an empty command");
            return;
        };

        // tokio::process needs the runtime context to register the child
        let _guard = self.runtime.enter();
        let spawned = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .process_group(0)
            .spawn();

        match spawned {
            Ok(mut child) => {
                info!("Launched {} (pid {:?})", program, child.id());
                let program = program.clone();
                self.runtime.spawn(async move {
                    match child.wait().await {
                        Ok(status) => debug!("{} exited with {}", program, status),
                        Err(e) => warn!("Failed to reap {}: {}", program, e),
                    }
                });
            }
            Err(e) => warn!("Failed to launch {}: {}", program, e),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawned_child_is_reaped() {
        let spawner = TokioSpawner::new(Handle::current());
        spawner.spawn(&["true".to_string()]);
        // reaping happens on the runtime; nothing to observe but no panic
        tokio::task::yield_now().await;
    }

    #[tokio::test]
    async fn test_missing_program_is_not_fatal() {
        let spawner = TokioSpawner::new(Handle::current());
        spawner.spawn(&["/nonexistent/slate-test-binary".to_string()]);
        spawner.spawn(&[]);
    }
}
