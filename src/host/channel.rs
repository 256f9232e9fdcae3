//! Channel-backed scroll event source

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::events::RawScrollEvent;
use super::traits::{HostError, HostResult, ScrollEventSource};

/// A scroll event source fed through a tokio channel.
///
/// Whatever delivers the host's notifications (a hook callback, a polling
/// loop, a test) pushes into the sender returned by `new`.
pub struct ChannelScrollSource {
    rx: Option<mpsc::Receiver<RawScrollEvent>>,
    running: bool,
}

impl ChannelScrollSource {
    pub fn new(capacity: usize) -> (Self, mpsc::Sender<RawScrollEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                rx: Some(rx),
                running: false,
            },
            tx,
        )
    }
}

#[async_trait]
impl ScrollEventSource for ChannelScrollSource {
    async fn start(&mut self) -> HostResult<mpsc::Receiver<RawScrollEvent>> {
        let rx = self.rx.take().ok_or(HostError::AlreadyStarted)?;
        self.running = true;
        tracing::debug!("Channel scroll source started");
        Ok(rx)
    }

    async fn stop(&mut self) -> HostResult<()> {
        if !self.running {
            return Err(HostError::NotStarted);
        }
        self.running = false;
        tracing::debug!("Channel scroll source stopped");
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
