//! Media type inference for served site objects.
//!
//! The table is an ordered list of suffix rules matched case-insensitively
//! against the whole sub-path. The first matching rule wins; when nothing
//! matches, the fallback type is used.

/// Media type used when no suffix rule matches.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Built-in suffix rules, in match order.
const DEFAULT_RULES: &[(&str, &str)] = &[
    (".html", "text/html; charset=utf-8"),
    (".htm", "text/html; charset=utf-8"),
    (".css", "text/css; charset=utf-8"),
    (".js", "application/javascript; charset=utf-8"),
    (".json", "application/json; charset=utf-8"),
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".gif", "image/gif"),
    (".svg", "image/svg+xml"),
    (".ico", "image/x-icon"),
    (".txt", "text/plain; charset=utf-8"),
];

/// A single suffix → media type rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTypeRule {
    suffix: String,
    media_type: String,
}

impl MediaTypeRule {
    /// Create a rule. The suffix is stored lowercased.
    pub fn new(suffix: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into().to_lowercase(),
            media_type: media_type.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }
}

/// Ordered suffix table used to pick a `Content-Type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTypeTable {
    rules: Vec<MediaTypeRule>,
    fallback: String,
}

impl MediaTypeTable {
    /// An empty table that maps everything to [`DEFAULT_MEDIA_TYPE`].
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            fallback: DEFAULT_MEDIA_TYPE.to_string(),
        }
    }

    /// Append a rule. It is consulted after every existing rule.
    pub fn with_rule(mut self, suffix: impl Into<String>, media_type: impl Into<String>) -> Self {
        self.rules.push(MediaTypeRule::new(suffix, media_type));
        self
    }

    /// Replace the fallback media type.
    pub fn with_fallback(mut self, media_type: impl Into<String>) -> Self {
        self.fallback = media_type.into();
        self
    }

    pub fn rules(&self) -> &[MediaTypeRule] {
        &self.rules
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Infer the media type for a sub-path.
    pub fn infer(&self, path: &str) -> &str {
        let lower = path.to_lowercase();
        self.rules
            .iter()
            .find(|rule| lower.ends_with(&rule.suffix))
            .map(|rule| rule.media_type.as_str())
            .unwrap_or(self.fallback.as_str())
    }
}

impl Default for MediaTypeTable {
    fn default() -> Self {
        DEFAULT_RULES
            .iter()
            .fold(Self::empty(), |table, (suffix, media_type)| {
                table.with_rule(*suffix, *media_type)
            })
    }
}
