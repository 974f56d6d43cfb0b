//! Append-only message log shown in the Messages panel.

/// Append-only, ordered log of human-readable messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageLog {
    entries: Vec<String>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.entries.push(message.into());
    }

    /// Every message ever appended, including suppressed ones.
    pub fn all(&self) -> &[String] {
        &self.entries
    }

    /// Messages to render, in order, with suppressed entries skipped.
    pub fn visible(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .iter()
            .map(String::as_str)
            .filter(|msg| !is_suppressed(msg))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An HTML error page that a client tried to parse as JSON.
///
/// These carry no information for the user and are never rendered.
pub fn is_suppressed(message: &str) -> bool {
    message.contains("Unexpected token") && message.contains("<!DOCTYPE")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_parse_errors_are_hidden_but_kept() {
        let mut log = MessageLog::new();
        log.push("File uploaded successfully");
        log.push("Unexpected token '<', \"<!DOCTYPE \"... is not valid JSON");
        log.push("File converted to CSV");

        let visible: Vec<&str> = log.visible().collect();
        assert_eq!(visible, vec!["File uploaded successfully", "File converted to CSV"]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn either_marker_alone_is_not_suppressed() {
        assert!(!is_suppressed("Unexpected token in column header"));
        assert!(!is_suppressed("<!DOCTYPE html>"));
    }
}
