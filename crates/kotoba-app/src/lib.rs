pub mod controller;
pub mod debounce;
pub mod host;
pub mod logging;
pub mod profile;
pub mod replay;
pub mod session;
pub mod state;
pub mod watcher;

#[cfg(test)]
mod tests;

pub use controller::{AppController, PageEvents};
pub use host::{MountedSurface, PageHost, PageSelection};
pub use state::AppState;
pub use watcher::{SelectionWatcher, WatcherInput, WatcherSettings};
