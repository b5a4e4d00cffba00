//! Background alert worker.
//!
//! The dispatcher itself is synchronous; this worker owns it on a tokio task
//! and accepts out-of-band messages, so expiry alerts fire independently of
//! whatever the foreground display loop is doing. The message surface
//! mirrors the two things the outside world may ask for: "the timer
//! finished" and "stop the noise".

use tokio::sync::{mpsc, oneshot};
use tracing::info;

use super::{AlertDispatcher, SoundHandle};
use crate::storage::Settings;
use crate::timer::Category;

#[derive(Debug)]
pub enum AlertMessage {
    TimerFinished { category: Category },
    /// Early stop for a continuous alert tone.
    StopSound,
    /// Acknowledged once every earlier message has been processed; the
    /// channel is FIFO, so the ack proves prior dispatches ran.
    Flush(oneshot::Sender<()>),
}

/// Sending half of the worker channel.
#[derive(Clone)]
pub struct AlertHandle {
    tx: mpsc::UnboundedSender<AlertMessage>,
}

impl AlertHandle {
    pub fn timer_finished(&self, category: Category) {
        let _ = self.tx.send(AlertMessage::TimerFinished { category });
    }

    pub fn stop_sound(&self) {
        let _ = self.tx.send(AlertMessage::StopSound);
    }

    /// Wait until the worker has processed everything sent so far. Callers
    /// that are about to exit use this so an expiry dispatch cannot be lost
    /// in the queue.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(AlertMessage::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }
}

/// Spawn the worker on the current tokio runtime.
pub fn spawn_worker(dispatcher: AlertDispatcher, settings: Settings) -> AlertHandle {
    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut sound: Option<SoundHandle> = None;
        while let Some(msg) = rx.recv().await {
            match msg {
                AlertMessage::TimerFinished { category } => {
                    let report = dispatcher.dispatch(&settings, category);
                    info!(
                        %category,
                        notification = report.notification_shown,
                        sound = report.sound.is_some(),
                        vibrated = report.vibrated,
                        "expiry alerts dispatched"
                    );
                    sound = report.sound;
                }
                AlertMessage::StopSound => {
                    if let Some(handle) = sound.take() {
                        handle.stop();
                    }
                }
                AlertMessage::Flush(ack) => {
                    let _ = ack.send(());
                }
            }
        }
    });
    AlertHandle { tx }
}
