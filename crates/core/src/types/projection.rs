use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the projection that is built when nothing else is declared
pub const DEFAULT_SOURCE_PROJECTION: &str = "source";

/// One named projection inside a merged build plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSpec {
    pub name: String,
    /// Plugin name to opaque plugin settings, in declaration order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub plugins: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(default)]
    pub is_source: bool,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
}

impl ProjectionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plugins: IndexMap::new(),
            transforms: Vec::new(),
            imports: Vec::new(),
            is_source: false,
            is_abstract: false,
        }
    }

    /// The implicit `source` projection: no plugins, no transforms
    pub fn default_source() -> Self {
        Self {
            is_source: true,
            ..Self::new(DEFAULT_SOURCE_PROJECTION)
        }
    }

    pub fn with_plugin(mut self, name: impl Into<String>, settings: Value) -> Self {
        self.plugins.insert(name.into(), settings);
        self
    }

    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn as_source(mut self) -> Self {
        self.is_source = true;
        self
    }

    /// Entry for this projection in an engine build config
    pub fn to_engine_json(&self) -> Value {
        let mut entry = serde_json::Map::new();
        if self.is_abstract {
            entry.insert("abstract".to_string(), Value::Bool(true));
        }
        if !self.imports.is_empty() {
            entry.insert("imports".to_string(), serde_json::json!(self.imports));
        }
        if !self.transforms.is_empty() {
            entry.insert("transforms".to_string(), Value::Array(self.transforms.clone()));
        }
        if !self.plugins.is_empty() {
            let plugins = self
                .plugins
                .iter()
                .map(|(name, settings)| (name.clone(), settings.clone()))
                .collect();
            entry.insert("plugins".to_string(), Value::Object(plugins));
        }
        Value::Object(entry)
    }
}
