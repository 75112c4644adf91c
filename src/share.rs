//! Clipboard/share controller: dialog state, link copying, and the timed
//! copy acknowledgment.
//!
//! The system clipboard is an injected write-only seam so the controller
//! can run headless; [`MemoryClipboard`] is the in-process implementation.
//! The "copied" acknowledgment is an explicit timer task owned by the
//! controller: it is restarted on every copy, independent of the dialog's
//! open state, and cancelled on teardown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::publish::PublishedLink;

/// How long the copy acknowledgment stays set.
pub const COPY_ACK_DURATION: Duration = Duration::from_secs(1);

// ============================================================================
// Clipboard seam
// ============================================================================

/// Write-only clipboard contract. No read access is needed.
pub trait Clipboard: Send {
    /// Writes a UTF-8 string to the clipboard.
    fn write_text(&mut self, text: &str);
}

/// In-process clipboard for headless environments and tests.
///
/// Clones share the same backing store, so a clone kept by the caller can
/// observe what the controller wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    writes: Arc<Mutex<Vec<String>>>,
}

impl MemoryClipboard {
    /// Creates an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent write, if any.
    pub fn last(&self) -> Option<String> {
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    /// All writes in order.
    pub fn writes(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) {
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
    }
}

// ============================================================================
// ShareController
// ============================================================================

/// Owns the share dialog state and the copy acknowledgment timer.
///
/// The acknowledgment flag self-expires [`COPY_ACK_DURATION`] after each
/// copy regardless of interleaving `close`/`open_with_link` calls; it is a
/// timed UI acknowledgment, not a durable state change.
pub struct ShareController {
    clipboard: Box<dyn Clipboard>,
    is_open: bool,
    link: Option<PublishedLink>,
    copy_acknowledged: Arc<AtomicBool>,
    ack_timer: Option<JoinHandle<()>>,
}

impl ShareController {
    /// Creates a closed controller writing through the given clipboard.
    pub fn new(clipboard: Box<dyn Clipboard>) -> Self {
        Self {
            clipboard,
            is_open: false,
            link: None,
            copy_acknowledged: Arc::new(AtomicBool::new(false)),
            ack_timer: None,
        }
    }

    /// Whether the share dialog is open.
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// The link currently held by the dialog, if any.
    pub fn link(&self) -> Option<&PublishedLink> {
        self.link.as_ref()
    }

    /// Whether a copy was acknowledged within the last second.
    pub fn copy_acknowledged(&self) -> bool {
        self.copy_acknowledged.load(Ordering::SeqCst)
    }

    /// Opens the dialog showing the given link.
    pub fn open_with_link(&mut self, link: PublishedLink) {
        self.link = Some(link);
        self.is_open = true;
    }

    /// Closes the dialog at the start of a publish cycle while retaining
    /// the previously published link.
    pub fn reset_for_publish(&mut self) {
        self.is_open = false;
    }

    /// Copies the held link's URL to the clipboard and raises the timed
    /// acknowledgment. Returns false when no link is held.
    ///
    /// Must be called within a Tokio runtime; the expiry timer is a
    /// spawned task owned by the controller.
    pub fn copy(&mut self) -> bool {
        let Some(link) = &self.link else {
            return false;
        };
        self.clipboard.write_text(link.url());
        self.copy_acknowledged.store(true, Ordering::SeqCst);

        // Restart the timer so a re-copy extends the acknowledgment.
        if let Some(timer) = self.ack_timer.take() {
            timer.abort();
        }
        let flag = Arc::clone(&self.copy_acknowledged);
        self.ack_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(COPY_ACK_DURATION).await;
            flag.store(false, Ordering::SeqCst);
        }));
        true
    }

    /// Closes the dialog and discards the in-memory link reference. The
    /// remote artifact itself is untouched; no delete API exists.
    pub fn close(&mut self) {
        self.is_open = false;
        self.link = None;
    }
}

impl Drop for ShareController {
    fn drop(&mut self) {
        if let Some(timer) = self.ack_timer.take() {
            timer.abort();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn controller_with(clipboard: &MemoryClipboard) -> ShareController {
        ShareController::new(Box::new(clipboard.clone()))
    }

    #[tokio::test]
    async fn copy_without_link_is_refused() {
        let clipboard = MemoryClipboard::new();
        let mut controller = controller_with(&clipboard);
        assert!(!controller.copy());
        assert!(clipboard.writes().is_empty());
        assert!(!controller.copy_acknowledged());
    }

    #[tokio::test]
    async fn copy_writes_link_url_verbatim() {
        let clipboard = MemoryClipboard::new();
        let mut controller = controller_with(&clipboard);
        controller.open_with_link(PublishedLink::new("https://cdn.example/a.png"));

        assert!(controller.copy());
        assert_eq!(clipboard.last().as_deref(), Some("https://cdn.example/a.png"));
    }

    #[tokio::test(start_paused = true)]
    async fn copy_acknowledgment_self_expires() {
        let clipboard = MemoryClipboard::new();
        let mut controller = controller_with(&clipboard);
        controller.open_with_link(PublishedLink::new("https://cdn.example/a.png"));

        controller.copy();
        assert!(controller.copy_acknowledged());

        tokio::time::sleep(Duration::from_millis(1050)).await;
        assert!(!controller.copy_acknowledged());
    }

    #[tokio::test(start_paused = true)]
    async fn acknowledgment_is_independent_of_dialog_state() {
        let clipboard = MemoryClipboard::new();
        let mut controller = controller_with(&clipboard);
        controller.open_with_link(PublishedLink::new("https://cdn.example/a.png"));
        controller.copy();

        controller.close();
        controller.open_with_link(PublishedLink::new("https://cdn.example/b.png"));
        assert!(controller.copy_acknowledged());

        tokio::time::sleep(Duration::from_millis(1050)).await;
        assert!(!controller.copy_acknowledged());
    }

    #[tokio::test(start_paused = true)]
    async fn re_copy_restarts_the_timer() {
        let clipboard = MemoryClipboard::new();
        let mut controller = controller_with(&clipboard);
        controller.open_with_link(PublishedLink::new("https://cdn.example/a.png"));

        controller.copy();
        tokio::time::sleep(Duration::from_millis(600)).await;
        controller.copy();

        // 1.2s after the first copy, 0.6s after the second
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(controller.copy_acknowledged());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!controller.copy_acknowledged());
    }

    #[tokio::test]
    async fn close_discards_the_link() {
        let clipboard = MemoryClipboard::new();
        let mut controller = controller_with(&clipboard);
        controller.open_with_link(PublishedLink::new("https://cdn.example/a.png"));
        assert!(controller.is_open());

        controller.close();
        assert!(!controller.is_open());
        assert!(controller.link().is_none());
        assert!(!controller.copy());
    }

    #[tokio::test]
    async fn reset_for_publish_keeps_the_link() {
        let clipboard = MemoryClipboard::new();
        let mut controller = controller_with(&clipboard);
        controller.open_with_link(PublishedLink::new("https://cdn.example/a.png"));

        controller.reset_for_publish();
        assert!(!controller.is_open());
        assert_eq!(
            controller.link().map(|l| l.url()),
            Some("https://cdn.example/a.png")
        );
    }
}
