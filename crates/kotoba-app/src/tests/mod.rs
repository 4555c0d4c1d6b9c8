
use std::sync::{Arc, Mutex};

use kotoba_types::{Anchor, NodeId, Rect, Viewport};
use kotoba_ui::PopupView;
use tokio::time::Instant;

use crate::host::{MountedSurface, PageHost, PageSelection};

pub const POPUP: NodeId = NodeId(0);
pub const PAGE: NodeId = NodeId(7);

#[derive(Default)]
pub struct HostLog {
    pub selection: Option<PageSelection>,
    pub selection_reads: Vec<Instant>,
    pub mounts: Vec<Anchor>,
    pub frames: Vec<PopupView>,
    pub removals: usize,
}

/// Page double that records everything the watcher does to it
#[derive(Clone, Default)]
pub struct TestHost {
    pub log: Arc<Mutex<HostLog>>,
}

impl TestHost {
    pub fn select(&self, text: &str, rect: Rect) {
        self.log.lock().unwrap().selection = Some(PageSelection {
            text: text.to_string(),
            rect,
            collapsed: false,
        });
    }

    pub fn set_selection(&self, selection: Option<PageSelection>) {
        self.log.lock().unwrap().selection = selection;
    }

    pub fn reads(&self) -> Vec<Instant> {
        self.log.lock().unwrap().selection_reads.clone()
    }

    pub fn mounts(&self) -> usize {
        self.log.lock().unwrap().mounts.len()
    }

    pub fn removals(&self) -> usize {
        self.log.lock().unwrap().removals
    }

    pub fn frames(&self) -> Vec<PopupView> {
        self.log.lock().unwrap().frames.clone()
    }

    pub fn last_frame(&self) -> Option<PopupView> {
        self.log.lock().unwrap().frames.last().cloned()
    }
}

impl PageHost for TestHost {
    fn selection(&self) -> Option<PageSelection> {
        let mut log = self.log.lock().unwrap();
        log.selection_reads.push(Instant::now());
        log.selection.clone()
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(1000.0, 800.0)
    }

    fn mount(&self, anchor: &Anchor) -> anyhow::Result<Box<dyn MountedSurface>> {
        self.log.lock().unwrap().mounts.push(*anchor);
        Ok(Box::new(TestSurface {
            log: self.log.clone(),
        }))
    }
}

struct TestSurface {
    log: Arc<Mutex<HostLog>>,
}

impl MountedSurface for TestSurface {
    fn contains(&self, target: NodeId) -> bool {
        target == POPUP
    }

    fn draw(&mut self, view: &PopupView) {
        self.log.lock().unwrap().frames.push(view.clone());
    }

    fn remove(self: Box<Self>) {
        self.log.lock().unwrap().removals += 1;
    }
}

pub const DOCUMENT: &str = r#"{"englishTranslation":"I like cats","chunks":[{"text":"猫","meaning":"cat","reading":"ねこ"},{"text":"が好き","meaning":"like","reading":"がすき"}]}"#;

/// Split `bytes` into pieces of at most `size`, cutting through multi-byte characters
pub fn pieces(bytes: &[u8], size: usize) -> Vec<Vec<u8>> {
    bytes.chunks(size).map(<[u8]>::to_vec).collect()
}
