use serde::Serialize;
use std::collections::BTreeMap;

/// Recognized `[config]` keys and the value used when a document omits them.
pub const CONFIG_DEFAULTS: [(&str, &str); 13] = [
    ("title",       "YAIF App"),
    ("description", ""),
    ("accent",      "#c84b31"),
    ("accent2",     "#2a6496"),
    ("background",  "#f5f0e8"),
    ("surface",     "#ffffff"),
    ("cream",       "#ede8dc"),
    ("line",        "#d4cec0"),
    ("ink",         "#1a1a2e"),
    ("muted",       "#8a8070"),
    ("font",        "'Fraunces', Georgia, serif"),
    ("mono",        "'DM Mono', monospace"),
    ("embed_mode",  "false"),
];

/// Raw `[config]` entries exactly as written. Unknown keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Config {
    pub entries: BTreeMap<String, String>,
}

impl Config {
    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fill in every recognized key the document left out.
    pub fn resolve(&self) -> ResolvedConfig {
        let mut entries = self.entries.clone();
        for (key, value) in CONFIG_DEFAULTS {
            entries
                .entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }
        ResolvedConfig {
            entries,
            explicit: self.entries.keys().cloned().collect(),
        }
    }
}

/// Configuration with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub entries:  BTreeMap<String, String>,
    /// Keys the document set itself, as opposed to defaults.
    pub explicit: Vec<String>,
}

impl ResolvedConfig {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.get(key).unwrap_or(fallback)
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false)
    }

    pub fn is_explicit(&self, key: &str) -> bool {
        self.explicit.iter().any(|k| k == key)
    }

    pub fn title(&self) -> &str {
        self.get_or("title", "")
    }

    pub fn description(&self) -> &str {
        self.get_or("description", "")
    }
}
