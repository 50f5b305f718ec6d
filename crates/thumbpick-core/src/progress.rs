//! Progress reporting (§4.9).

use tokio::sync::mpsc;

/// A pipeline stage, in the fixed order the session walks through (§4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    OpeningVideo,
    SamplingFrames,
    ScoringFrames,
    SelectingTopCandidates,
    FetchingNeighbors,
    WritingManifest,
    Completed,
    /// A non-fatal warning (§7), e.g. a missing cascade classifier.
    ConfigurationWarning,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::OpeningVideo => "Opening video",
            Stage::SamplingFrames => "Sampling frames",
            Stage::ScoringFrames => "Scoring frames",
            Stage::SelectingTopCandidates => "Selecting top candidates",
            Stage::FetchingNeighbors => "Fetching neighbors",
            Stage::WritingManifest => "Writing manifest",
            Stage::Completed => "Completed",
            Stage::ConfigurationWarning => "Configuration warning",
        }
    }
}

/// One progress update: `(stage, value, maximum, optional detail)`.
/// `maximum <= 0` signals indeterminate progress (§4.9).
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub value: u64,
    pub maximum: i64,
    pub detail: Option<String>,
}

impl ProgressEvent {
    pub fn new(stage: Stage, value: u64, maximum: i64, detail: Option<String>) -> Self {
        Self {
            stage,
            value,
            maximum,
            detail,
        }
    }

    pub fn indeterminate(stage: Stage, detail: Option<String>) -> Self {
        Self::new(stage, 0, -1, detail)
    }
}

/// Typed sender half, handed to components that need to report progress
/// without depending on the channel's concrete type.
#[derive(Clone)]
pub struct ProgressSender {
    inner: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressSender {
    pub fn new(inner: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self { inner }
    }

    /// Send an event; a closed receiver (caller dropped its handle) is not
    /// treated as an error, since progress reporting is best-effort.
    pub fn send(&self, event: ProgressEvent) {
        let _ = self.inner.send(event);
    }

    pub fn warn(&self, detail: impl Into<String>) {
        self.send(ProgressEvent::indeterminate(Stage::ConfigurationWarning, Some(detail.into())));
    }
}

/// Create a channel pair for a single session run.
pub fn channel() -> (ProgressSender, mpsc::UnboundedReceiver<ProgressEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressSender::new(tx), rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sender_delivers_events_in_order() {
        let (tx, mut rx) = channel();
        tx.send(ProgressEvent::indeterminate(Stage::OpeningVideo, None));
        tx.send(ProgressEvent::new(Stage::SamplingFrames, 1, 10, None));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.stage, Stage::OpeningVideo);
        assert_eq!(first.maximum, -1);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.value, 1);
        assert_eq!(second.maximum, 10);
    }

    #[test]
    fn send_after_drop_does_not_panic() {
        let (tx, rx) = channel();
        drop(rx);
        tx.send(ProgressEvent::indeterminate(Stage::Completed, None));
    }
}
