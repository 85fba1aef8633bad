use chrono::{SecondsFormat, Utc};
use log::info;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: String,
    pub text: String,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.timestamp, self.text)
    }
}

/// Append-only session log shown in the harness log panel.
///
/// Cloning shares the same entries. Entries are only ever appended or
/// dropped all at once by [`EventLog::clear`].
#[derive(Clone, Default)]
pub struct EventLog {
    inner: Arc<RwLock<Vec<LogEntry>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, text: impl Into<String>) {
        let text = text.into();
        info!("{}", text);

        self.inner.write().await.push(LogEntry {
            timestamp: now_iso(),
            text,
        });
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    pub async fn entries(&self) -> Vec<LogEntry> {
        self.inner.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Entries whose text contains `needle`, in insertion order.
    pub async fn matching(&self, needle: &str) -> Vec<LogEntry> {
        self.inner
            .read()
            .await
            .iter()
            .filter(|e| e.text.contains(needle))
            .cloned()
            .collect()
    }

    pub async fn render(&self) -> String {
        render_entries(&self.inner.read().await)
    }
}

pub fn render_entries(entries: &[LogEntry]) -> String {
    if entries.is_empty() {
        return "No logs yet...".to_string();
    }

    entries
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
