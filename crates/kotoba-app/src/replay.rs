//! Scripted page host for driving the popup without a browser.
//!
//! A script is JSON lines, one step per line. Blank lines and lines starting
//! with `#` are skipped.
//!
//! ```text
//! {"viewport": {"width": 1000, "height": 800}}
//! {"select": {"text": "猫が好き", "rect": {"top": 700, "bottom": 750, "left": 100, "right": 200}}}
//! {"event": {"type": "pointer_up", "target": 5}}
//! {"wait_ms": 400}
//! {"event": {"type": "pointer_down", "target": 5}}
//! ```
//!
//! Node 0 is the popup; every other node id is page content.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use kanal::AsyncReceiver;
use kotoba_translator::PendingRequest;
use kotoba_types::{Anchor, NodeId, PageEvent, Rect, Viewport};
use kotoba_ui::PopupView;
use serde::Deserialize;

use crate::controller::PageEvents;
use crate::host::{MountedSurface, PageHost, PageSelection};

pub const POPUP_NODE: NodeId = NodeId(0);

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStep {
    Viewport(Viewport),
    Select { text: String, rect: Rect },
    ClearSelection,
    Event(PageEvent),
    WaitMs(u64),
}

pub fn parse_script(source: &str) -> anyhow::Result<Vec<ScriptStep>> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(number, line)| {
            serde_json::from_str(line)
                .map_err(|e| anyhow::anyhow!("script line {}: {}", number + 1, e))
        })
        .collect()
}

struct PageState {
    selection: Option<PageSelection>,
    viewport: Viewport,
}

/// Page whose selection and viewport are set by the script
pub struct ScriptedHost {
    page: Mutex<PageState>,
}

impl Default for ScriptedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self {
            page: Mutex::new(PageState {
                selection: None,
                viewport: Viewport::new(1280.0, 720.0),
            }),
        }
    }

    fn with_page<R>(&self, f: impl FnOnce(&mut PageState) -> R) -> R {
        let mut page = self.page.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut page)
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.with_page(|page| page.viewport = viewport);
    }

    pub fn set_selection(&self, selection: Option<PageSelection>) {
        self.with_page(|page| page.selection = selection);
    }
}

impl PageHost for ScriptedHost {
    fn selection(&self) -> Option<PageSelection> {
        self.with_page(|page| page.selection.clone())
    }

    fn viewport(&self) -> Viewport {
        self.with_page(|page| page.viewport)
    }

    fn mount(&self, anchor: &Anchor) -> anyhow::Result<Box<dyn MountedSurface>> {
        println!("[mount top={} left={}]", anchor.top, anchor.left);
        Ok(Box::new(TerminalSurface))
    }
}

/// Prints every frame to stdout
struct TerminalSurface;

impl MountedSurface for TerminalSurface {
    fn contains(&self, target: NodeId) -> bool {
        target == POPUP_NODE
    }

    fn draw(&mut self, view: &PopupView) {
        print!("{view}");
    }

    fn remove(self: Box<Self>) {
        println!("[unmount]");
    }
}

pub async fn run_script(
    steps: Vec<ScriptStep>,
    host: &ScriptedHost,
    events: &PageEvents,
) -> anyhow::Result<()> {
    for step in steps {
        tracing::debug!("Script step: {:?}", step);
        match step {
            ScriptStep::Viewport(viewport) => host.set_viewport(viewport),
            ScriptStep::Select { text, rect } => host.set_selection(Some(PageSelection {
                text,
                rect,
                collapsed: false,
            })),
            ScriptStep::ClearSelection => host.set_selection(None),
            ScriptStep::Event(event) => events.send(event).await?,
            ScriptStep::WaitMs(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
        }
    }

    Ok(())
}

/// Answer every request with the same canned body, split into chunks
pub fn serve_canned_response(
    requests: AsyncReceiver<PendingRequest>,
    body: Vec<u8>,
    chunk_size: usize,
    chunk_delay: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Ok(request) = requests.recv().await {
            tracing::info!("Canned response for '{}'", request.text);

            for chunk in body.chunks(chunk_size.max(1)) {
                if request.body.send(chunk.to_vec()).await.is_err() {
                    tracing::debug!("Response abandoned by session");
                    break;
                }
                tokio::time::sleep(chunk_delay).await;
            }
        }
    })
}
