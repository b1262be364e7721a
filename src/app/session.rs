use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

/// One-shot status message shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Per-client state carried between requests: pending flashes only
#[derive(Debug, Default)]
pub struct Session {
    pending: Vec<Flash>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flash(&mut self, flash: Flash) {
        self.pending.push(flash);
    }

    /// Drain pending flashes; each is delivered once
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flashes_are_consumed_once() {
        let mut session = Session::new();
        session.flash(Flash::success("Task created."));
        session.flash(Flash::error("Title is required."));

        let flashes = session.take_flashes();
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[0].level, FlashLevel::Success);
        assert!(session.take_flashes().is_empty());
    }
}
