//! Function registry
//!
//! Maps symbolic function names to async callables. Steps reference
//! functions by name only; resolution happens lazily at execution time so a
//! suite may mention functions registered after it was loaded.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::{Map, Value};

use crate::common::{Error, Result};

/// A registered callable: positional args plus named kwargs in, one JSON
/// value out. Functions are opaque to the engine and may perform I/O, fail,
/// or be slow.
pub type StepFunction =
    Arc<dyn Fn(Vec<Value>, Map<String, Value>) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Wrap a synchronous closure as a [`StepFunction`]
pub fn sync_function<F>(f: F) -> StepFunction
where
    F: Fn(Vec<Value>, Map<String, Value>) -> Result<Value> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    Arc::new(move |args, kwargs| {
        let f = Arc::clone(&f);
        Box::pin(async move { f(args, kwargs) })
    })
}

/// A namespace-like object exposing a set of named callables for bulk
/// registration ("drop a function into a provider and it becomes available
/// to test authors").
pub trait FunctionProvider {
    /// The callables this provider exposes, keyed by registration name
    fn functions(&self) -> Vec<(String, StepFunction)>;
}

/// Central registry of functions available to test steps
///
/// Populated once before execution and shared read-only across running
/// cases; the registry itself performs no I/O.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, StepFunction>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under a name; last write wins so composed
    /// providers can override each other
    pub fn register(&mut self, name: impl Into<String>, function: StepFunction) {
        self.functions.insert(name.into(), function);
    }

    /// Register a synchronous closure under a name
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(Vec<Value>, Map<String, Value>) -> Result<Value> + Send + Sync + 'static,
    {
        self.register(name, sync_function(f));
    }

    /// Register every callable a provider exposes
    pub fn register_provider(&mut self, provider: &dyn FunctionProvider) {
        for (name, function) in provider.functions() {
            self.register(name, function);
        }
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Result<StepFunction> {
        self.functions
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnregisteredFunction(name.to_string()))
    }

    /// All registered names, sorted for stable output
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_register_and_get() {
        let mut registry = FunctionRegistry::new();
        registry.register_fn("ping", |_, _| Ok(json!("pong")));

        let f = registry.get("ping").unwrap();
        let result = f(Vec::new(), Map::new()).await.unwrap();
        assert_eq!(result, json!("pong"));
    }

    #[test]
    fn test_get_unknown_name() {
        let registry = FunctionRegistry::new();
        // StepFunction has no Debug impl, so take the error side explicitly
        let err = registry.get("missing").err().expect("lookup should fail");
        match err {
            Error::UnregisteredFunction(name) => assert_eq!(name, "missing"),
            other => panic!("expected UnregisteredFunction, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let mut registry = FunctionRegistry::new();
        registry.register_fn("answer", |_, _| Ok(json!(1)));
        registry.register_fn("answer", |_, _| Ok(json!(42)));

        let f = registry.get("answer").unwrap();
        assert_eq!(f(Vec::new(), Map::new()).await.unwrap(), json!(42));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_provider_bulk_registration() {
        struct TwoFunctions;
        impl FunctionProvider for TwoFunctions {
            fn functions(&self) -> Vec<(String, StepFunction)> {
                vec![
                    ("one".to_string(), sync_function(|_, _| Ok(json!(1)))),
                    ("two".to_string(), sync_function(|_, _| Ok(json!(2)))),
                ]
            }
        }

        let mut registry = FunctionRegistry::new();
        registry.register_provider(&TwoFunctions);
        assert_eq!(registry.list_names(), vec!["one", "two"]);
    }
}
