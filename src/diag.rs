//! Diagnostics sink for the normalization pipeline.
//!
//! Shape problems in remote data (unpaged playlists, unjoinable columns,
//! container-valued wrapper fields) never abort the pipeline; they are
//! reported here and the pipeline degrades to a partial result. The sink is
//! passed in explicitly rather than read from ambient state, so callers can
//! inspect what was skipped after a load completes.

use tracing::warn;

/// Category of a pipeline diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A playlist was skipped (missing total, or a remote fetch failed).
    PlaylistSkipped,
    /// A wrapper field holding an object or list was not copied.
    FieldDropped,
    /// A column was dropped because its values could not be joined.
    ColumnDropped,
    /// A date value could not be parsed and became missing.
    UnparsedDate,
}

/// A single non-fatal event recorded during normalization.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Collects diagnostics for one pipeline run.
///
/// Every record also goes out through `tracing` at warn level, so existing
/// subscribers see the same events.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn record(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        warn!(?kind, "{}", message);
        self.entries.push(Diagnostic { kind, message });
    }

    /// All recorded diagnostics, in order.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Number of diagnostics of a given kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_count() {
        let mut diag = Diagnostics::new();
        assert!(diag.is_empty());

        diag.record(DiagnosticKind::ColumnDropped, "dropped `images`");
        diag.record(DiagnosticKind::PlaylistSkipped, "no total for abc");
        diag.record(DiagnosticKind::ColumnDropped, "dropped `markets`");

        assert_eq!(diag.entries().len(), 3);
        assert_eq!(diag.count(DiagnosticKind::ColumnDropped), 2);
        assert_eq!(diag.count(DiagnosticKind::UnparsedDate), 0);
    }

    #[test]
    fn test_record_emits_tracing_warning() {
        use std::io::Write;
        use std::sync::{Arc, Mutex};
        use tracing_subscriber::fmt::MakeWriter;

        #[derive(Clone, Default)]
        struct Capture(Arc<Mutex<Vec<u8>>>);

        impl Write for Capture {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        impl<'a> MakeWriter<'a> for Capture {
            type Writer = Capture;

            fn make_writer(&'a self) -> Self::Writer {
                self.clone()
            }
        }

        let capture = Capture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut diag = Diagnostics::new();
            diag.record(DiagnosticKind::ColumnDropped, "dropped `images`");
        });

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("dropped `images`"));
        assert!(output.contains("ColumnDropped"));
    }
}
