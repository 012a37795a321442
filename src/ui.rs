//! Request-scoped UI output and the standby indicator.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Something a tool surfaced to the page during an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiElement {
    Success(String),
    DownloadButton {
        label: String,
        data: Vec<u8>,
        file_name: String,
        mime: String,
    },
}

/// Collects UI elements for one interaction, in the order they were emitted.
#[derive(Debug, Clone, Default)]
pub struct UiSink(Arc<Mutex<Vec<UiElement>>>);

impl UiSink {
    pub async fn success(&self, text: impl Into<String>) {
        self.0.lock().await.push(UiElement::Success(text.into()));
    }

    pub async fn download_button(
        &self,
        label: impl Into<String>,
        data: Vec<u8>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
    ) {
        self.0.lock().await.push(UiElement::DownloadButton {
            label: label.into(),
            data,
            file_name: file_name.into(),
            mime: mime.into(),
        });
    }

    pub async fn take(&self) -> Vec<UiElement> {
        std::mem::take(&mut *self.0.lock().await)
    }
}

/// "Standby..." indicator. Active while at least one guard is alive.
#[derive(Debug, Clone, Default)]
pub struct StandbyIndicator(Arc<AtomicUsize>);

impl StandbyIndicator {
    pub fn enter(&self) -> StandbyGuard {
        self.0.fetch_add(1, Ordering::SeqCst);
        StandbyGuard(self.0.clone())
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst) > 0
    }
}

/// Clears its share of the indicator on drop, including on error or cancellation.
#[must_use = "the indicator is cleared as soon as the guard is dropped"]
pub struct StandbyGuard(Arc<AtomicUsize>);

impl Drop for StandbyGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_scopes_the_indicator() {
        let standby = StandbyIndicator::default();
        assert!(!standby.is_active());
        {
            let _guard = standby.enter();
            assert!(standby.is_active());
        }
        assert!(!standby.is_active());
    }

    #[test]
    fn overlapping_guards_keep_it_active() {
        let standby = StandbyIndicator::default();
        let first = standby.enter();
        let second = standby.enter();
        drop(first);
        assert!(standby.is_active());
        drop(second);
        assert!(!standby.is_active());
    }

    #[tokio::test]
    async fn sink_preserves_emission_order() {
        let sink = UiSink::default();
        sink.success("Done!").await;
        sink.download_button("Download", vec![1, 2], "memo1.docx", "docx")
            .await;

        let elements = sink.take().await;
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0], UiElement::Success("Done!".to_string()));
        assert!(matches!(
            &elements[1],
            UiElement::DownloadButton { file_name, .. } if file_name == "memo1.docx"
        ));
        assert!(sink.take().await.is_empty());
    }
}
