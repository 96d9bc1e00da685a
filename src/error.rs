use thiserror::Error;

/// A translation failure: a construct with no C lowering, or a construct
/// placed where the backend cannot lower it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("[Kuda CompileError] {message}")]
pub struct CompileError {
    pub message: String,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            notes: Vec::new(),
            help: None,
        }
    }

    /// A construct the C backend has no lowering for.
    pub fn unsupported(construct: &str) -> Self {
        Self::new(format!("{} is not supported by the C backend", construct))
            .with_help("run this program with the interpreter instead".to_string())
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Render the error with its notes and help as plain text.
    pub fn render(&self) -> String {
        let mut out = format!("error: {}", self);
        for note in &self.notes {
            out.push_str(&format!("\n  = note: {}", note));
        }
        if let Some(help) = &self.help {
            out.push_str(&format!("\n  = help: {}", help));
        }
        out
    }
}
