use std::time::Duration;

/// One recognized line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
}

impl Fragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// What a recognizer hands back for a single image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recognition {
    pub fragments: Vec<Fragment>,
    pub elapsed: Duration,
}

impl Recognition {
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Fragment texts joined with `\n`, in recognition order.
    pub fn joined_text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
