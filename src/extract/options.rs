//! Extraction options and configuration.

/// Options for extracting the structural model from a PDF.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Extraction strategy
    pub mode: ExtractMode,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (degrade instead of failing).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set extraction strategy.
    pub fn with_mode(mut self, mode: ExtractMode) -> Self {
        self.mode = mode;
        self
    }

    /// Extract raw text only (no geometry).
    pub fn text_only(mut self) -> Self {
        self.mode = ExtractMode::TextOnly;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            mode: ExtractMode::Geometry,
        }
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Fall back to text-only extraction when content streams cannot be
    /// interpreted
    Lenient,
}

/// Extraction strategy, selected by source capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractMode {
    /// Interpret content streams for positioned, styled runs (rich mode)
    #[default]
    Geometry,
    /// Raw per-page text with synthesized default styling (degraded mode)
    TextOnly,
}
