//! Response transformer extension point
//!
//! A stub opts into a transformer by naming it; the host looks the name up
//! in a [`TransformerRegistry`] and runs the transformer between stub
//! matching and writing the response. Transformers must never abort the
//! exchange: a failure is reported as [`Rewrite::PassThrough`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::cors::CorsResponseHeaderTransformer;
use crate::error::{Error, Result};
use crate::stub::{InboundRequest, Rewrite, StubResponse};

/// A named response transformer.
pub trait ResponseTransformer: Send + Sync {
    /// Name stubs use to opt into this transformer
    fn name(&self) -> &str;

    /// Produce the response to send for `request`, given the stub's draft.
    fn transform(
        &self,
        request: &InboundRequest,
        response: &StubResponse,
        files: &FileSource,
        parameters: &Parameters,
    ) -> Rewrite;
}

/// Read-only directory of response body files owned by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    /// Wrap a root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a file below the root.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Default for FileSource {
    fn default() -> Self {
        Self::new("__files")
    }
}

/// Free-form transformer parameters attached to a stub.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(Map<String, Value>);

impl Parameters {
    /// Empty parameter bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse parameters from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not valid JSON or not an object.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Build parameters from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(Error::generic(format!(
                "transformer parameters must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Insert a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw parameter value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String parameter.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Boolean parameter.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Transformers available to stubs, keyed by name.
pub struct TransformerRegistry {
    transformers: HashMap<String, Arc<dyn ResponseTransformer>>,
}

impl TransformerRegistry {
    /// Create a registry with the built-in transformers.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(CorsResponseHeaderTransformer::new()));
        registry
    }

    /// Create a registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            transformers: HashMap::new(),
        }
    }

    /// Register a transformer, returning any transformer it replaced.
    pub fn register(
        &mut self,
        transformer: Arc<dyn ResponseTransformer>,
    ) -> Option<Arc<dyn ResponseTransformer>> {
        self.transformers
            .insert(transformer.name().to_string(), transformer)
    }

    /// Look up a transformer by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ResponseTransformer>> {
        self.transformers.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transformers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the named transformers over `draft`, in order.
    ///
    /// Each transformer sees the output of the previous one. A pass-through
    /// keeps the response that was fed into that transformer; unknown names
    /// are skipped.
    pub fn apply<S: AsRef<str>>(
        &self,
        names: &[S],
        request: &InboundRequest,
        draft: StubResponse,
        files: &FileSource,
        parameters: &Parameters,
    ) -> StubResponse {
        names.iter().fold(draft, |response, name| {
            let name = name.as_ref();
            match self.transformers.get(name) {
                Some(transformer) => {
                    debug!(transformer = name, "Applying response transformer");
                    transformer
                        .transform(request, &response, files, parameters)
                        .or(response)
                }
                None => {
                    warn!(transformer = name, "Stub references unknown transformer");
                    response
                }
            }
        })
    }
}

impl Default for TransformerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
