use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The transformation an atomic task invokes. Each kind maps to one external
/// collaborator (or a native filesystem operation) in `core::transform`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Clean,
    Less,
    Autoprefixer,
    Cssmin,
    Csslint,
    Csscomb,
    Usebanner,
    Concat,
    Uglify,
    Jshint,
    Jscs,
    Qunit,
    Copy,
    Jekyll,
    Jade,
    Validation,
    Connect,
    Saucelabs,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Clean => "clean",
            TaskKind::Less => "less",
            TaskKind::Autoprefixer => "autoprefixer",
            TaskKind::Cssmin => "cssmin",
            TaskKind::Csslint => "csslint",
            TaskKind::Csscomb => "csscomb",
            TaskKind::Usebanner => "usebanner",
            TaskKind::Concat => "concat",
            TaskKind::Uglify => "uglify",
            TaskKind::Jshint => "jshint",
            TaskKind::Jscs => "jscs",
            TaskKind::Qunit => "qunit",
            TaskKind::Copy => "copy",
            TaskKind::Jekyll => "jekyll",
            TaskKind::Jade => "jade",
            TaskKind::Validation => "validation",
            TaskKind::Connect => "connect",
            TaskKind::Saucelabs => "saucelabs",
        }
    }
}

/// One atomic transformation unit: source globs, an optional destination and
/// a free-form option map with the recognized options for its kind.
///
/// Definitions are built once at registry-assembly time and never mutated
/// afterwards; a repeated task name always denotes the identical definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub name: String,
    pub kind: TaskKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub src: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub options: HashMap<String, serde_json::Value>,
}

impl TaskDefinition {
    pub fn new(name: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            name: name.into(),
            kind,
            src: Vec::new(),
            dest: None,
            options: HashMap::new(),
        }
    }

    pub fn src<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.src = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn option_bool(&self, key: &str) -> Option<bool> {
        self.options.get(key).and_then(|v| v.as_bool())
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(|v| v.as_str())
    }

    pub fn option_u64(&self, key: &str) -> Option<u64> {
        self.options.get(key).and_then(|v| v.as_u64())
    }

    pub fn option_str_list(&self, key: &str) -> Vec<String> {
        self.options
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
