//! Emit configuration.

use crate::writer::CodeWriter;

/// Default generator name printed in file banners.
pub const DEFAULT_GENERATOR: &str = "perfgen";

/// Code generation configuration shared by all emitters.
#[derive(Clone, Debug)]
pub struct EmitConfig {
    /// Indent with a tab for every 8 columns.
    pub use_tabs: bool,
    /// Tool name written into the "generated by" banner.
    pub generator: String,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            use_tabs: false,
            generator: DEFAULT_GENERATOR.to_string(),
        }
    }
}

impl EmitConfig {
    #[must_use]
    pub const fn with_use_tabs(mut self, use_tabs: bool) -> Self {
        self.use_tabs = use_tabs;
        self
    }

    #[must_use]
    pub fn with_generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = generator.into();
        self
    }

    pub(crate) const fn writer(&self) -> CodeWriter {
        CodeWriter::new(self.use_tabs)
    }
}
