use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use kotoba_config::{Config, TriggerMode};
use kotoba_core::resolve_anchor_with_margin;
use kotoba_translator::Transport;
use kotoba_types::{
    Anchor, NodeId, PageEvent, PartialSnapshot, SelectionEvent, SessionEvent, SessionId,
    SessionPhase, SessionUpdate,
};
use tokio_util::sync::CancellationToken;

use crate::debounce::Debouncer;
use crate::host::{MountedSurface, PageHost};
use crate::session::TranslationSession;

/// Everything the watcher reacts to. Page events, debounce timers and
/// session updates share one inbox so no receive is ever raced.
#[derive(Debug, Clone)]
pub enum WatcherInput {
    Page(PageEvent),
    DebounceElapsed(u64),
    Session(SessionUpdate),
}

#[derive(Debug, Clone)]
pub struct WatcherSettings {
    pub debounce: Duration,
    pub trigger: TriggerMode,
    pub margin: f64,
    pub stall_timeout: Option<Duration>,
}

impl From<&Config> for WatcherSettings {
    fn from(config: &Config) -> Self {
        Self {
            debounce: Duration::from_millis(config.watcher.debounce_ms),
            trigger: config.watcher.trigger,
            margin: config.placement.margin,
            stall_timeout: config.translator.stall_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// The single popup slot. While occupied, new selections are ignored.
struct MountedPopup {
    surface: Box<dyn MountedSurface>,
    anchor: Anchor,
    text: String,
    session: SessionId,
    phase: SessionPhase,
    cancel: CancellationToken,
}

/// Bridges page events to the popup lifecycle. Sole owner of the popup slot.
pub struct SelectionWatcher {
    host: Arc<dyn PageHost>,
    transport: Arc<dyn Transport>,
    settings: WatcherSettings,
    inbox_tx: AsyncSender<WatcherInput>,
    inbox: AsyncReceiver<WatcherInput>,
    debouncer: Debouncer,
    popup: Option<MountedPopup>,
}

impl SelectionWatcher {
    pub fn new(
        host: Arc<dyn PageHost>,
        transport: Arc<dyn Transport>,
        settings: WatcherSettings,
        inbox: (AsyncSender<WatcherInput>, AsyncReceiver<WatcherInput>),
    ) -> Self {
        let (inbox_tx, inbox) = inbox;
        Self {
            host,
            transport,
            settings,
            inbox_tx,
            inbox,
            debouncer: Debouncer::new(),
            popup: None,
        }
    }

    /// Watcher loop, runs until cancelled or the inbox closes
    pub async fn run(mut self, cancel: CancellationToken) -> anyhow::Result<()> {
        tracing::info!("[WATCHER] Waiting for page events");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                input = self.inbox.recv() => match input {
                    Ok(input) => self.handle_input(input),
                    Err(_) => break,
                },
            }
        }

        self.debouncer.cancel();
        self.dismiss();
        tracing::info!("[WATCHER] Stopped");
        Ok(())
    }

    fn handle_input(&mut self, input: WatcherInput) {
        match input {
            WatcherInput::Page(PageEvent::PointerUp { target }) => self.on_pointer_up(target),
            WatcherInput::Page(PageEvent::PointerDown { target }) => self.on_pointer_down(target),
            WatcherInput::DebounceElapsed(generation) => {
                if !self.debouncer.is_current(generation) {
                    tracing::trace!("[WATCHER] Stale debounce {}", generation);
                    return;
                }
                self.debouncer.complete();
                self.evaluate_selection();
            }
            WatcherInput::Session(update) => self.handle_update(update),
        }
    }

    fn on_pointer_up(&mut self, target: NodeId) {
        if self.popup_contains(target) {
            tracing::trace!("[WATCHER] Pointer up inside popup, ignored");
            return;
        }

        let tx = self.inbox_tx.clone();
        self.debouncer
            .schedule(self.settings.debounce, move |generation| async move {
                let _ = tx.send(WatcherInput::DebounceElapsed(generation)).await;
            });
    }

    fn on_pointer_down(&mut self, target: NodeId) {
        let Some(popup) = &self.popup else {
            return;
        };

        if !popup.surface.contains(target) {
            tracing::debug!("[WATCHER] Pointer down outside popup, dismissing");
            self.dismiss();
            return;
        }

        if self.settings.trigger == TriggerMode::Button && popup.phase == SessionPhase::Idle {
            tracing::debug!("[WATCHER] Trigger pressed");
            self.start_session();
        }
    }

    fn evaluate_selection(&mut self) {
        let Some(selection) = self.host.selection() else {
            return;
        };
        if selection.collapsed {
            return;
        }
        let Some(event) = SelectionEvent::new(&selection.text, selection.rect) else {
            return;
        };

        if self.popup.is_some() {
            tracing::debug!("[WATCHER] Popup already open, selection ignored");
            return;
        }

        self.accept(event);
    }

    fn accept(&mut self, event: SelectionEvent) {
        let (text, rect) = event.into_parts();
        let anchor = resolve_anchor_with_margin(&rect, &self.host.viewport(), self.settings.margin);

        let surface = match self.host.mount(&anchor) {
            Ok(surface) => surface,
            Err(e) => {
                tracing::error!("[WATCHER] Failed to mount popup: {}", e);
                return;
            }
        };

        tracing::info!(
            "[WATCHER] Accepted selection ({} chars) at top={} left={}",
            text.chars().count(),
            anchor.top,
            anchor.left
        );

        self.popup = Some(MountedPopup {
            surface,
            anchor,
            text,
            session: SessionId::new(),
            phase: SessionPhase::Idle,
            cancel: CancellationToken::new(),
        });

        match self.settings.trigger {
            TriggerMode::Immediate => self.start_session(),
            TriggerMode::Button => {
                if let Some(popup) = self.popup.as_mut() {
                    let view = kotoba_ui::render_trigger(&popup.anchor);
                    popup.surface.draw(&view);
                }
            }
        }
    }

    fn start_session(&mut self) {
        let Some(popup) = self.popup.as_mut() else {
            return;
        };

        popup.phase = SessionPhase::Requesting;

        if let Some(view) = kotoba_ui::render(Some(&popup.anchor), &PartialSnapshot::default()) {
            popup.surface.draw(&view);
        }

        let session = TranslationSession {
            id: popup.session,
            text: popup.text.clone(),
            transport: self.transport.clone(),
            updates: self.inbox_tx.clone(),
            cancel: popup.cancel.clone(),
            stall_timeout: self.settings.stall_timeout,
        };
        tokio::spawn(session.run());
    }

    fn handle_update(&mut self, update: SessionUpdate) {
        let Some(popup) = self.popup.as_mut() else {
            return;
        };
        if update.session != popup.session {
            tracing::trace!("[WATCHER] Update from stale session {}", update.session);
            return;
        }

        popup.phase = update.event.phase();

        let snapshot = match update.event {
            SessionEvent::Snapshot(snapshot) => snapshot,
            SessionEvent::Completed(result) => PartialSnapshot::from(result),
            SessionEvent::Failed(reason) => {
                tracing::warn!("[WATCHER] Session {} failed: {}", popup.session, reason);
                return;
            }
            SessionEvent::Requesting | SessionEvent::Streaming => return,
        };

        if let Some(view) = kotoba_ui::render(Some(&popup.anchor), &snapshot) {
            popup.surface.draw(&view);
        }
    }

    fn popup_contains(&self, target: NodeId) -> bool {
        self.popup
            .as_ref()
            .is_some_and(|popup| popup.surface.contains(target))
    }

    /// Unmount the popup and abandon its session, whatever state it is in
    fn dismiss(&mut self) {
        if let Some(popup) = self.popup.take() {
            popup.cancel.cancel();
            tracing::info!(
                "[WATCHER] Dismissed session {} ({:?})",
                popup.session,
                popup.phase
            );
            popup.surface.remove();
        }
    }
}
