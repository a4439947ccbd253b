//! Ctrl-C handling.
//!
//! The first interrupt cancels the running pass: the call in flight
//! completes, no further calls are issued, and the command still persists
//! the partial snapshot. A second interrupt exits immediately.

use std::future::Future;
use std::io;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use ctfd_gateway::CancelToken;
use tracing::warn;

/// Exit status of a process stopped by a second interrupt (128 + SIGINT).
const EXIT_INTERRUPTED: i32 = 130;

/// Cancel `token` when the process receives Ctrl-C.
pub fn cancel_on_interrupt(token: CancelToken) -> Result<()> {
    spawn_watcher(token, tokio::signal::ctrl_c)?;
    Ok(())
}

fn spawn_watcher<F, Fut>(token: CancelToken, next_interrupt: F) -> Result<JoinHandle<()>>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = io::Result<()>>,
{
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build signal runtime")?;

    std::thread::Builder::new()
        .name("ctfd-sync-interrupt".to_string())
        .spawn(move || {
            rt.block_on(async move {
                if let Err(e) = next_interrupt().await {
                    warn!(error = %e, "interrupt/unavailable");
                    return;
                }
                warn!("interrupt/received: finishing the current call, then saving state");
                token.cancel();

                if next_interrupt().await.is_ok() {
                    warn!("interrupt/received again: exiting without saving state");
                    std::process::exit(EXIT_INTERRUPTED);
                }
            })
        })
        .context("failed to spawn interrupt watcher")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[test]
    fn first_interrupt_cancels_the_token() {
        let token = CancelToken::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);

        spawn_watcher(token.clone(), move || {
            let first = counter.fetch_add(1, Ordering::SeqCst) == 0;
            async move {
                if first {
                    Ok(())
                } else {
                    std::future::pending().await
                }
            }
        })
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !token.is_cancelled() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(token.is_cancelled());
    }

    #[test]
    fn unavailable_signal_leaves_the_token_alone() {
        let token = CancelToken::new();
        let handle = spawn_watcher(token.clone(), || async {
            Err(io::Error::new(io::ErrorKind::Other, "no signal driver"))
        })
        .unwrap();

        handle.join().unwrap();
        assert!(!token.is_cancelled());
    }
}
