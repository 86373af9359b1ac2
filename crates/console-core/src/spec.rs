//! Statically declared module specs.
//!
//! The set of modules is fixed at composition time: each spec pairs a name
//! and a `required` flag with a plain constructor function.

use std::fmt;
use std::sync::Arc;

use console_protocols::error::ModuleError;
use console_protocols::module::Module;

use crate::context::ModuleContext;

/// The module that must be registered first so others can log.
pub const LOGGER_MODULE: &str = "logger";

/// Builds a module instance from its runtime handle.
pub type ModuleFactory = fn(&ModuleContext) -> Arc<dyn Module>;

/// One declared module.
#[derive(Clone)]
pub struct ModuleSpec {
    pub name: String,
    pub required: bool,
    pub factory: ModuleFactory,
}

impl ModuleSpec {
    pub fn new(name: impl Into<String>, required: bool, factory: ModuleFactory) -> Self {
        Self {
            name: name.into(),
            required,
            factory,
        }
    }

    pub fn required(name: impl Into<String>, factory: ModuleFactory) -> Self {
        Self::new(name, true, factory)
    }

    pub fn optional(name: impl Into<String>, factory: ModuleFactory) -> Self {
        Self::new(name, false, factory)
    }
}

impl fmt::Debug for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSpec")
            .field("name", &self.name)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

/// Validated, ordered list of module specs.
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    specs: Vec<ModuleSpec>,
}

impl ModuleCatalog {
    /// Validate names and put the logger first. Other specs keep their order.
    pub fn new(specs: Vec<ModuleSpec>) -> Result<Self, ModuleError> {
        let mut seen = std::collections::HashSet::new();
        for spec in &specs {
            if spec.name.is_empty() {
                return Err(ModuleError::EmptyName);
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(ModuleError::DuplicateSpec(spec.name.clone()));
            }
        }

        let mut specs = specs;
        specs.sort_by_key(|spec| spec.name != LOGGER_MODULE);
        Ok(Self { specs })
    }

    pub fn specs(&self) -> &[ModuleSpec] {
        &self.specs
    }

    pub fn get(&self, name: &str) -> Option<&ModuleSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn required_names(&self) -> Vec<String> {
        self.specs
            .iter()
            .filter(|s| s.required)
            .map(|s| s.name.clone())
            .collect()
    }

    /// Drop an optional spec. Required specs cannot be disabled.
    pub fn disable(&mut self, name: &str) -> Result<(), ModuleError> {
        let index = self
            .specs
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| ModuleError::NotFound(name.to_string()))?;
        if self.specs[index].required {
            return Err(ModuleError::Custom(format!(
                "Cannot disable required module: {}",
                name
            )));
        }
        self.specs.remove(index);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(String);

    impl Module for Named {
        fn name(&self) -> &str {
            &self.0
        }
    }

    fn build(ctx: &ModuleContext) -> Arc<dyn Module> {
        Arc::new(Named(ctx.module_name.clone()))
    }

    fn names(catalog: &ModuleCatalog) -> Vec<&str> {
        catalog.specs().iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_logger_sorts_first() {
        let catalog = ModuleCatalog::new(vec![
            ModuleSpec::required("devices", build),
            ModuleSpec::optional("admin", build),
            ModuleSpec::required("logger", build),
            ModuleSpec::required("presence", build),
        ])
        .unwrap();

        assert_eq!(names(&catalog), vec!["logger", "devices", "admin", "presence"]);
    }

    #[test]
    fn test_duplicate_spec_rejected() {
        let err = ModuleCatalog::new(vec![
            ModuleSpec::required("devices", build),
            ModuleSpec::optional("devices", build),
        ])
        .unwrap_err();
        assert!(matches!(err, ModuleError::DuplicateSpec(ref n) if n == "devices"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = ModuleCatalog::new(vec![ModuleSpec::optional("", build)]).unwrap_err();
        assert!(matches!(err, ModuleError::EmptyName));
    }

    #[test]
    fn test_required_names() {
        let catalog = ModuleCatalog::new(vec![
            ModuleSpec::required("logger", build),
            ModuleSpec::optional("http", build),
        ])
        .unwrap();
        assert_eq!(catalog.required_names(), vec!["logger"]);
        assert!(catalog.get("http").is_some());
        assert!(catalog.get("nope").is_none());
    }

    #[test]
    fn test_disable() {
        let mut catalog = ModuleCatalog::new(vec![
            ModuleSpec::required("logger", build),
            ModuleSpec::optional("http", build),
        ])
        .unwrap();

        assert!(catalog.disable("logger").is_err());
        assert!(matches!(catalog.disable("zigbee"), Err(ModuleError::NotFound(_))));
        catalog.disable("http").unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_debug_omits_factory() {
        let spec = ModuleSpec::required("logger", build);
        let debug = format!("{:?}", spec);
        assert!(debug.contains("logger"));
        assert!(debug.contains(".."));
    }
}
