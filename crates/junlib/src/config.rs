//! Configuration for parsing, conversion, schema derivation and writing

/// Default key holding an element's own text in the JSON variant
pub const DEFAULT_TEXT_KEY: &str = "__text__";

/// Configuration for the XML parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseConfig {
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_size: 10 * 1024 * 1024, // 10 MB default
        }
    }
}

impl ParseConfig {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }
}

/// Options for the JSON-variant conversion in both directions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Reserved key for an element's own text
    pub text_key: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            text_key: DEFAULT_TEXT_KEY.to_string(),
        }
    }
}

impl ConvertOptions {
    pub fn with_text_key(text_key: impl Into<String>) -> Self {
        Self {
            text_key: text_key.into(),
        }
    }
}

/// Options for schema derivation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaOptions {
    /// Merge the shapes of every item of a repeated member instead of
    /// taking the first item only. Changes the generated text.
    pub merge_repeated: bool,
    /// Key skipped when deriving from JSON-variant values
    pub text_key: String,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            merge_repeated: false,
            text_key: DEFAULT_TEXT_KEY.to_string(),
        }
    }
}

impl SchemaOptions {
    pub fn merged() -> Self {
        Self {
            merge_repeated: true,
            ..Self::default()
        }
    }
}

/// Options for XML output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteOptions {
    /// Indent nested elements and emit an XML declaration
    pub pretty: bool,
    /// Spaces per nesting level when pretty
    pub indent: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: 4,
        }
    }
}

impl WriteOptions {
    pub const fn compact() -> Self {
        Self {
            pretty: false,
            indent: 0,
        }
    }
}

/// Options for JSON text output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JsonWriteOptions {
    /// Indent by 4 spaces, one member per line
    pub pretty: bool,
    /// Order object members by key at every level; arrays keep their order
    pub sort_keys: bool,
}

impl Default for JsonWriteOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            sort_keys: false,
        }
    }
}

impl JsonWriteOptions {
    pub const fn compact() -> Self {
        Self {
            pretty: false,
            sort_keys: false,
        }
    }

    pub const fn sorted(self) -> Self {
        Self {
            sort_keys: true,
            ..self
        }
    }
}
