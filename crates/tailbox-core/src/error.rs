//! Errors surfaced by upstream log sources.

/// Failure reported by a `LogSource`.
///
/// None of these are fatal to the viewer: the feed turns every upstream end,
/// successful or not, into a terminal line so the view reaches `Done`.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("read log source: {0}")]
    Io(#[from] std::io::Error),

    #[error("log source {source_name:?} failed: {message}")]
    Upstream {
        source_name: String,
        message: String,
    },
}

impl SourceError {
    pub fn upstream(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::SourceError;

    #[test]
    fn upstream_error_display_names_source() {
        let err = SourceError::upstream("app-logs", "connection reset");
        let msg = err.to_string();
        assert!(msg.contains("app-logs"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn io_error_converts() {
        let err: SourceError = std::io::Error::other("boom").into();
        assert!(err.to_string().starts_with("read log source"));
    }
}
