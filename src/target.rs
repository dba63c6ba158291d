//! Compilation target descriptors ([`Target`]).

use crate::{FieldValue, Fields, FxIndexMap, Node};
use serde::Deserialize;
use std::sync::Arc;

/// Description of a compilation target (e.g. `llvm` with some `mcpu`).
///
/// Besides its `kind`, a [`Target`] carries an optional `tag` (a well-known
/// preset name), the `keys` used for dispatching target-specific strategies,
/// arbitrary `attrs` (in insertion order), and optionally a `host` target
/// (for device targets, which are driven by a host).
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "TargetConfig")]
pub struct Target {
    pub kind: String,
    pub tag: String,
    pub keys: Vec<String>,
    pub attrs: FxIndexMap<String, Node>,
    pub host: Option<Arc<Target>>,
}

#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("target attribute `{key}` holds {number}, which doesn't fit in 64 bits")]
    UnrepresentableNumber { key: String, number: serde_json::Number },
}

impl Target {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            tag: String::new(),
            keys: vec![],
            attrs: FxIndexMap::default(),
            host: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_keys(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Node>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_host(mut self, host: Target) -> Self {
        self.host = Some(Arc::new(host));
        self
    }

    /// Parse a [`Target`] from a JSON object, such as:
    /// ```json
    /// { "kind": "cuda", "keys": ["cuda", "gpu"], "arch": "sm_80", "host": { "kind": "llvm" } }
    /// ```
    /// Keys other than `kind`, `tag`, `keys` and `host` become `attrs`.
    pub fn from_json(json: &str) -> Result<Self, TargetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Flatten into a configuration map, with deterministically ordered keys:
    /// `kind`, `tag`, `keys`, `host` (only if present), then all `attrs`.
    pub fn export(&self) -> FxIndexMap<String, Node> {
        let mut config = FxIndexMap::default();
        config.insert("kind".to_string(), Node::from(&self.kind[..]));
        config.insert("tag".to_string(), Node::from(&self.tag[..]));
        config.insert(
            "keys".to_string(),
            Node::Array(self.keys.iter().map(|key| Node::from(&key[..])).collect()),
        );
        if let Some(host) = &self.host {
            config.insert("host".to_string(), Node::from(host.export()));
        }
        for (key, value) in &self.attrs {
            config.insert(key.clone(), value.clone());
        }
        config
    }

    pub(crate) fn fields(&self) -> Fields<'_> {
        let mut fields = Fields::new();
        fields.push(("kind", FieldValue::Str(&self.kind)));
        fields.push(("tag", FieldValue::Str(&self.tag)));
        fields.push(("keys", FieldValue::Strs(&self.keys)));
        fields.push(("attrs", FieldValue::Map(&self.attrs)));
        fields.push(("host", self.host.as_ref().map_or(FieldValue::Absent, FieldValue::Target)));
        fields
    }
}

/// Serialized form of [`Target`] (see [`Target::from_json`]).
#[derive(Deserialize)]
struct TargetConfig {
    kind: String,
    #[serde(default)]
    tag: String,
    #[serde(default)]
    keys: Vec<String>,
    #[serde(default)]
    host: Option<Box<TargetConfig>>,
    #[serde(flatten)]
    attrs: FxIndexMap<String, serde_json::Value>,
}

impl TryFrom<TargetConfig> for Target {
    type Error = TargetError;

    fn try_from(config: TargetConfig) -> Result<Self, TargetError> {
        let TargetConfig { kind, tag, keys, host, attrs } = config;
        let host = host.map(|host| Target::try_from(*host).map(Arc::new)).transpose()?;
        let attrs = attrs
            .into_iter()
            .map(|(key, value)| {
                let value = node_from_json(&key, value)?;
                Ok((key, value))
            })
            .collect::<Result<_, TargetError>>()?;
        Ok(Self { kind, tag, keys, attrs, host })
    }
}

fn node_from_json(key: &str, value: serde_json::Value) -> Result<Node, TargetError> {
    use serde_json::Value;

    Ok(match value {
        Value::Null => Node::None,
        Value::Bool(b) => Node::Bool(b),
        Value::Number(number) => {
            if let Some(x) = number.as_i64() {
                Node::Int(x)
            } else if number.is_f64() {
                Node::Float(number.as_f64().unwrap_or_default())
            } else {
                return Err(TargetError::UnrepresentableNumber { key: key.to_string(), number });
            }
        }
        Value::String(s) => Node::from(s),
        Value::Array(elements) => Node::Array(
            elements
                .into_iter()
                .map(|element| node_from_json(key, element))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(entries) => Node::from(
            entries
                .into_iter()
                .map(|(k, v)| Ok((k, node_from_json(key, v)?)))
                .collect::<Result<FxIndexMap<_, _>, TargetError>>()?,
        ),
    })
}
