//! # Supervisor termination signals.
//!
//! Provides [`wait_for_termination`], an async helper that completes when the
//! process receives a signal asking the supervisor itself to stop, and
//! reports which one so the shutdown log says why. Child-death notification
//! (SIGCHLD) is a separate concern and lives in [`crate::core`].
//!
//! On Unix the termination set is `SIGINT`, `SIGTERM`, and `SIGQUIT`;
//! elsewhere only Ctrl-C is observable.

/// Waits for a termination signal and returns its name.
///
/// Each call creates independent signal listeners. Returns `Err` only if
/// listener registration fails.
#[cfg(unix)]
pub async fn wait_for_termination() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = sigint.recv() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
        _ = sigquit.recv() => "SIGQUIT",
    };
    Ok(name)
}

/// Waits for a termination signal and returns its name.
///
/// Each call creates independent signal listeners. Returns `Err` only if
/// listener registration fails.
#[cfg(not(unix))]
pub async fn wait_for_termination() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::future::Future;
    use std::task::Poll;

    #[tokio::test]
    async fn completes_on_sigterm_and_names_it() {
        let fut = wait_for_termination();
        tokio::pin!(fut);

        // First poll registers the listeners; the signal must not be raised
        // before that.
        std::future::poll_fn(|cx| match fut.as_mut().poll(cx) {
            Poll::Pending => Poll::Ready(()),
            Poll::Ready(res) => panic!("completed before any signal was sent: {res:?}"),
        })
        .await;

        nix::sys::signal::kill(nix::unistd::Pid::this(), nix::sys::signal::Signal::SIGTERM)
            .unwrap();

        assert_eq!(fut.await.unwrap(), "SIGTERM");
    }
}
