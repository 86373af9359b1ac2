//! HTTP contract definitions.
//!
//! A contract declares that an externally reachable route is served by an
//! internal service. Modules declare contracts; a single gateway turns them
//! into real routes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HttpContractError;

/// HTTP method of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = HttpContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(HttpContractError::InvalidPath(format!(
                "unsupported method: {}",
                other
            ))),
        }
    }
}

/// Normalize a route path: leading slash, no trailing slash, `/` for root.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Mapping from an HTTP route to a service name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpContract {
    pub method: HttpMethod,
    pub path: String,
    pub service: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl HttpContract {
    /// Create a contract. The path is normalized on construction.
    pub fn new(method: HttpMethod, path: impl AsRef<str>, service: impl Into<String>) -> Self {
        Self {
            method,
            path: normalize_path(path.as_ref()),
            service: service.into(),
            description: String::new(),
            owner: None,
        }
    }

    pub fn get(path: impl AsRef<str>, service: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path, service)
    }

    pub fn post(path: impl AsRef<str>, service: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path, service)
    }

    pub fn delete(path: impl AsRef<str>, service: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path, service)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Tag the contract with an explicit owner instead of the service prefix.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Owning component: the explicit owner, or the service name up to the
    /// first `.`.
    pub fn owner(&self) -> &str {
        match &self.owner {
            Some(owner) => owner,
            None => self
                .service
                .split_once('.')
                .map(|(prefix, _)| prefix)
                .unwrap_or(&self.service),
        }
    }
}
