//! Idle keepalive pings.

use std::time::Duration;

use tokio::io::AsyncWrite;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::connection::writer::WeakWriter;
use crate::protocol::OpCode;

/// Re-armable one-shot timer that pings the peer if the reader stays idle.
///
/// One background task serves the whole socket. [`arm`](Self::arm) moves its
/// deadline to `now + period`; dropping the returned guard disarms it. Each
/// arming sends at most one ping, and a ping that has already started is
/// written to completion. The task ends when the timer is dropped.
#[derive(Debug)]
pub(crate) struct IdleTimer {
    deadline: watch::Sender<Option<Instant>>,
    period: Duration,
}

/// Keeps the timer armed until dropped.
#[derive(Debug)]
pub(crate) struct Armed<'a> {
    timer: &'a IdleTimer,
}

impl Drop for Armed<'_> {
    fn drop(&mut self) {
        self.timer.deadline.send_replace(None);
    }
}

impl IdleTimer {
    /// Spawn the timer task, initially disarmed.
    ///
    /// The task only holds a weak handle to the write path, and gives the
    /// ping write the same `period` to finish.
    pub(crate) fn spawn<W>(writer: WeakWriter<W>, period: Duration) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (deadline, armed) = watch::channel(None);
        tokio::spawn(run(writer, armed, period));
        Self { deadline, period }
    }

    /// Arm the timer for one period from now.
    pub(crate) fn arm(&self) -> Armed<'_> {
        self.deadline.send_replace(Some(Instant::now() + self.period));
        Armed { timer: self }
    }
}

async fn run<W>(writer: WeakWriter<W>, mut armed: watch::Receiver<Option<Instant>>, period: Duration)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    loop {
        let deadline = *armed.borrow_and_update();
        if let Some(deadline) = deadline {
            tokio::select! {
                changed = armed.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    continue;
                }
                () = tokio::time::sleep_until(deadline) => {
                    let Some(writer) = writer.upgrade() else {
                        return;
                    };
                    match writer.write_control(&[], OpCode::Ping, period).await {
                        Ok(()) => {
                            #[cfg(feature = "logging")]
                            log::debug!("idle for {period:?}, sent keepalive ping");
                        }
                        Err(_err) => {
                            #[cfg(feature = "logging")]
                            log::debug!("keepalive ping failed: {_err}");
                        }
                    }
                }
            }
        }

        // fired or disarmed: wait to be armed again
        if armed.changed().await.is_err() {
            return;
        }
    }
}
