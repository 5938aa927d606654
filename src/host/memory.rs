//! In-memory host for tests and dry runs
//!
//! Windows never render anything; every interaction is recorded so callers
//! can assert on it. Popup blocking, refused closes and the user closing a
//! window can all be simulated.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;

use super::traits::{
    HostError, Notice, NoticeSurface, PopupWindow, StatusSurface, WindowHost,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct HostState {
    block_popups: bool,
    open_closed: bool,
    refuse_close: bool,
    windows: Vec<MemoryWindow>,
}

/// Window host keeping every opened window in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    inner: Arc<Mutex<HostState>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every subsequent `open` call
    pub fn set_block_popups(&self, block: bool) {
        lock(&self.inner).block_popups = block;
    }

    /// Hand out windows that are already closed
    pub fn set_open_closed(&self, closed: bool) {
        lock(&self.inner).open_closed = closed;
    }

    /// Newly opened windows ignore `close()`
    pub fn set_refuse_close(&self, refuse: bool) {
        lock(&self.inner).refuse_close = refuse;
    }

    pub fn windows(&self) -> Vec<MemoryWindow> {
        lock(&self.inner).windows.clone()
    }

    pub fn last_window(&self) -> Option<MemoryWindow> {
        lock(&self.inner).windows.last().cloned()
    }

    pub fn opened_count(&self) -> usize {
        lock(&self.inner).windows.len()
    }
}

impl WindowHost for MemoryHost {
    fn open(&self, name: &str, features: &str) -> Result<Box<dyn PopupWindow>, HostError> {
        let mut host = lock(&self.inner);
        if host.block_popups {
            return Err(HostError::Blocked);
        }

        let window = MemoryWindow::new(WindowState {
            name: name.to_string(),
            features: features.to_string(),
            closed: host.open_closed,
            refuse_close: host.refuse_close,
            ..WindowState::default()
        });
        host.windows.push(window.clone());
        tracing::debug!(name, total = host.windows.len(), "Memory window opened");

        Ok(Box::new(window))
    }
}

/// Everything recorded about one memory window
#[derive(Debug, Clone, Default)]
pub struct WindowState {
    pub name: String,
    pub features: String,
    pub closed: bool,
    pub refuse_close: bool,
    pub document: Option<String>,
    /// `(remaining, low_time)` for each countdown refresh
    pub countdown_updates: Vec<(u32, bool)>,
    pub navigations: Vec<String>,
    pub close_calls: u32,
}

#[derive(Debug, Clone)]
pub struct MemoryWindow {
    state: Arc<Mutex<WindowState>>,
}

impl MemoryWindow {
    fn new(state: WindowState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Simulate the user closing the window
    pub fn close_externally(&self) {
        lock(&self.state).closed = true;
    }

    pub fn snapshot(&self) -> WindowState {
        lock(&self.state).clone()
    }

    pub fn close_calls(&self) -> u32 {
        lock(&self.state).close_calls
    }

    pub fn navigations(&self) -> Vec<String> {
        lock(&self.state).navigations.clone()
    }

    fn scriptable(state: &WindowState) -> Result<(), HostError> {
        if state.closed {
            return Err(HostError::Unavailable("window closed".to_string()));
        }
        if !state.navigations.is_empty() {
            return Err(HostError::Unavailable("cross-origin document".to_string()));
        }
        Ok(())
    }
}

impl PopupWindow for MemoryWindow {
    fn is_closed(&mut self) -> bool {
        lock(&self.state).closed
    }

    fn write_document(&mut self, html: &str) -> Result<(), HostError> {
        let mut state = lock(&self.state);
        Self::scriptable(&state)?;
        state.document = Some(html.to_string());
        Ok(())
    }

    fn update_countdown(&mut self, remaining: u32, low_time: bool) -> Result<(), HostError> {
        let mut state = lock(&self.state);
        Self::scriptable(&state)?;
        state.countdown_updates.push((remaining, low_time));
        Ok(())
    }

    fn navigate(&mut self, url: &str) -> Result<(), HostError> {
        let mut state = lock(&self.state);
        if state.closed {
            return Err(HostError::Unavailable("window closed".to_string()));
        }
        state.navigations.push(url.to_string());
        Ok(())
    }

    fn close(&mut self) -> Result<(), HostError> {
        let mut state = lock(&self.state);
        state.close_calls += 1;
        if !state.refuse_close {
            state.closed = true;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusState {
    pub visible: bool,
    pub title: String,
    pub body: String,
    pub clock: String,
    pub low_time: bool,
}

/// Status panel recorded in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStatus {
    state: Arc<Mutex<StatusState>>,
}

impl MemoryStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatusState {
        lock(&self.state).clone()
    }
}

impl StatusSurface for MemoryStatus {
    fn show(&self, title: &str, body: &str) {
        let mut state = lock(&self.state);
        state.visible = true;
        state.title = title.to_string();
        state.body = body.to_string();
    }

    fn set_countdown(&self, clock: &str, low_time: bool) {
        let mut state = lock(&self.state);
        state.clock = clock.to_string();
        state.low_time = low_time;
    }

    fn hide(&self) {
        lock(&self.state).visible = false;
    }
}

#[derive(Debug, Default)]
struct BoardState {
    current: Option<(Notice, Instant)>,
    history: Vec<Notice>,
}

/// Notice surface that keeps one visible notice and the full history
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    state: Arc<Mutex<BoardState>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The notice still on screen, if it has not been auto-dismissed
    pub fn current(&self) -> Option<Notice> {
        let state = lock(&self.state);
        state
            .current
            .as_ref()
            .filter(|(notice, posted)| posted.elapsed() < notice.dismiss_after)
            .map(|(notice, _)| notice.clone())
    }

    pub fn history(&self) -> Vec<Notice> {
        lock(&self.state).history.clone()
    }
}

impl NoticeSurface for NoticeBoard {
    fn notify(&self, notice: Notice) {
        let mut state = lock(&self.state);
        state.history.push(notice.clone());
        state.current = Some((notice, Instant::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NoticeLevel;
    use std::time::Duration;

    #[test]
    fn blocked_host_refuses_open() {
        let host = MemoryHost::new();
        host.set_block_popups(true);
        assert!(matches!(host.open("_blank", ""), Err(HostError::Blocked)));
        assert_eq!(host.opened_count(), 0);
    }

    #[test]
    fn navigated_window_is_no_longer_scriptable() {
        let host = MemoryHost::new();
        let mut window = host.open("_blank", "width=10").unwrap();

        window.write_document("<html></html>").unwrap();
        window.update_countdown(3, true).unwrap();
        window.navigate("https://example.com").unwrap();

        assert!(window.update_countdown(2, true).is_err());
        assert!(!window.is_closed());

        let recorded = host.last_window().unwrap().snapshot();
        assert_eq!(recorded.features, "width=10");
        assert_eq!(recorded.countdown_updates, vec![(3, true)]);
        assert_eq!(recorded.navigations, vec!["https://example.com".to_string()]);
    }

    #[test]
    fn refused_close_keeps_window_open() {
        let host = MemoryHost::new();
        host.set_refuse_close(true);
        let mut window = host.open("_blank", "").unwrap();

        window.close().unwrap();
        assert!(!window.is_closed());
        assert_eq!(host.last_window().unwrap().close_calls(), 1);
    }

    #[test]
    fn external_close_is_visible_through_handle() {
        let host = MemoryHost::new();
        let mut window = host.open("_blank", "").unwrap();
        host.last_window().unwrap().close_externally();
        assert!(window.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn notices_replace_and_expire() {
        let board = NoticeBoard::new();
        let notice = |message: &str| Notice {
            level: NoticeLevel::Error,
            message: message.to_string(),
            dismiss_after: Duration::from_secs(4),
        };

        board.notify(notice("first"));
        board.notify(notice("second"));
        assert_eq!(board.current().unwrap().message, "second");

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(board.current().is_none());
        assert_eq!(board.history().len(), 2);
    }
}
