//! Service protocol definitions.
//!
//! A service is a named, late-bound async capability. Callers and handlers
//! agree on argument names out of band; the registry never inspects them.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ServiceError;

/// Arguments passed to a service call.
///
/// Mirrors a positional + keyword calling convention. The HTTP gateway only
/// ever fills `kwargs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceArgs {
    #[serde(default)]
    pub args: Vec<Value>,

    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

impl ServiceArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build arguments from keyword values only.
    pub fn from_kwargs(kwargs: Map<String, Value>) -> Self {
        Self {
            args: Vec::new(),
            kwargs,
        }
    }

    /// Build arguments from a JSON value. Objects become kwargs, arrays become
    /// positional args, `null` is empty and anything else is a single
    /// positional argument.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::from_kwargs(map),
            Value::Array(items) => Self {
                args: items,
                kwargs: Map::new(),
            },
            Value::Null => Self::default(),
            other => Self {
                args: vec![other],
                kwargs: Map::new(),
            },
        }
    }

    pub fn with_arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.kwargs.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }

    /// Typed keyword lookup.
    ///
    /// String values that fail to deserialize directly are retried as JSON
    /// text, so `"10"` from a query string reads as a number.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ServiceError> {
        match self.kwargs.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => decode(key, value).map(Some),
        }
    }

    /// Typed keyword lookup that fails when the key is absent.
    pub fn require<T: DeserializeOwned>(&self, key: &str) -> Result<T, ServiceError> {
        self.get(key)?.ok_or_else(|| ServiceError::missing(key))
    }

    /// Typed keyword lookup with a fallback.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, ServiceError> {
        Ok(self.get(key)?.unwrap_or(default))
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: &Value) -> Result<T, ServiceError> {
    match serde_json::from_value::<T>(value.clone()) {
        Ok(v) => Ok(v),
        Err(first) => {
            if let Value::String(text) = value {
                if let Ok(v) = serde_json::from_str::<T>(text) {
                    return Ok(v);
                }
            }
            Err(ServiceError::InvalidArgument(format!(
                "argument '{}': {}",
                key, first
            )))
        }
    }
}

/// A callable bound to a service name.
#[async_trait]
pub trait ServiceHandler: Send + Sync {
    async fn call(&self, args: ServiceArgs) -> Result<Value, ServiceError>;
}

/// Adapter turning an async closure into a [`ServiceHandler`].
pub struct FnService<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> ServiceHandler for FnService<F>
where
    F: Fn(ServiceArgs) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ServiceError>> + Send + 'static,
{
    async fn call(&self, args: ServiceArgs) -> Result<Value, ServiceError> {
        (self.f)(args).await
    }
}

/// Wrap an async closure as a shareable service handler.
pub fn service_fn<F, Fut>(f: F) -> Arc<dyn ServiceHandler>
where
    F: Fn(ServiceArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ServiceError>> + Send + 'static,
{
    Arc::new(FnService { f })
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
