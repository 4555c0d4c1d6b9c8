use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use kotoba_translator::Transport;
use kotoba_types::PageEvent;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::host::PageHost;
use crate::state::AppState;
use crate::watcher::{SelectionWatcher, WatcherInput, WatcherSettings};

/// Handle the host uses to forward page events to the watcher
#[derive(Clone)]
pub struct PageEvents {
    tx: AsyncSender<WatcherInput>,
}

impl PageEvents {
    pub async fn send(&self, event: PageEvent) -> anyhow::Result<()> {
        self.tx.send(WatcherInput::Page(event)).await?;
        Ok(())
    }

    /// For synchronous host callbacks. Drops the event when the inbox is full.
    pub fn try_send(&self, event: PageEvent) -> anyhow::Result<bool> {
        Ok(self.tx.try_send(WatcherInput::Page(event))?)
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    inbox: (AsyncSender<WatcherInput>, AsyncReceiver<WatcherInput>),
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub async fn new(state: Arc<AppState>) -> Self {
        let capacity = state.config.read().await.channel_capacity;
        Self {
            inbox: kanal::bounded_async(capacity),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn page_events(&self) -> PageEvents {
        PageEvents {
            tx: self.inbox.0.clone(),
        }
    }

    pub async fn spawn_tasks(
        &self,
        host: Arc<dyn PageHost>,
        transport: Arc<dyn Transport>,
    ) -> JoinSet<anyhow::Result<()>> {
        let settings = {
            let config = self.state.config.read().await;
            WatcherSettings::from(&*config)
        };

        let metadata = transport.metadata();
        tracing::info!(
            "Starting watcher (debounce {:?}, trigger {:?}, transport {})",
            settings.debounce,
            settings.trigger,
            metadata.name
        );
        if !metadata.streaming {
            tracing::warn!("Transport {} does not stream, popup fills in at once", metadata.name);
        }

        let mut tasks = JoinSet::new();

        let watcher = SelectionWatcher::new(host, transport, settings, self.inbox.clone());
        tasks.spawn(watcher.run(self.cancel_token.child_token()));

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
