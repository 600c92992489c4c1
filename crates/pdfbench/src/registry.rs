//! Tool registration and lookup.
//!
//! The registry maps tool names to [`ExtractionTool`] instances and resolves a
//! user selection (from the CLI, the config file or a dashboard request) into
//! the ordered tool list handed to the runner.

use ahash::AHashMap;
use std::sync::Arc;

use crate::config::BenchmarkConfig;
use crate::tool::ExtractionTool;
use crate::tools::{CommandTool, builtin_tools};
use crate::types::ToolKind;
use crate::{PdfBenchError, Result};

/// Validate a tool name before registration.
///
/// # Rules
///
/// - Name cannot be empty
/// - Name cannot contain whitespace or commas (tool lists are comma-separated)
/// - Name cannot contain path separators or `..` (it names an artifacts subdirectory)
fn validate_tool_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(PdfBenchError::validation("Tool name cannot be empty"));
    }

    if name.contains(['/', '\\']) || name.contains("..") || name == "." {
        return Err(PdfBenchError::validation(format!(
            "Tool name '{}' cannot contain path separators or '..'",
            name
        )));
    }

    if name.contains(char::is_whitespace) || name.contains(',') {
        return Err(PdfBenchError::validation(format!(
            "Tool name '{}' cannot contain whitespace or commas",
            name
        )));
    }

    Ok(())
}

/// Name → tool map
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: AHashMap<String, Arc<dyn ExtractionTool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in tool of this build.
    pub fn with_builtin_tools() -> Result<Self> {
        let mut registry = Self::new();
        for tool in builtin_tools() {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Built-in tools, then the config's custom tools.
    ///
    /// A custom tool replaces a built-in tool of the same name.
    pub fn from_config(config: &BenchmarkConfig) -> Result<Self> {
        let mut registry = Self::with_builtin_tools()?;

        for custom in &config.custom_tools {
            validate_tool_name(&custom.name)?;
            if registry.contains(&custom.name) {
                tracing::debug!("Custom tool '{}' overrides the built-in definition", custom.name);
            }
            registry
                .tools
                .insert(custom.name.clone(), Arc::new(CommandTool::from_config(custom)));
        }

        Ok(registry)
    }

    /// Register a tool
    ///
    /// # Errors
    ///
    /// Returns `PdfBenchError::Validation` if the name is invalid or already registered.
    pub fn register(&mut self, tool: Arc<dyn ExtractionTool>) -> Result<()> {
        let name = tool.name().to_string();
        validate_tool_name(&name)?;

        if self.tools.contains_key(&name) {
            return Err(PdfBenchError::validation(format!(
                "Tool '{}' is already registered",
                name
            )));
        }

        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn ExtractionTool>> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| PdfBenchError::UnknownTool(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// `(name, kind)` pairs, sorted by name
    pub fn describe(&self) -> Vec<(String, ToolKind)> {
        self.names()
            .into_iter()
            .filter_map(|name| self.tools.get(&name).map(|tool| (name.clone(), tool.kind())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Resolve a selection into tools, keeping the selection order.
    ///
    /// An empty selection means every registered tool, sorted by name.
    /// Repeated names are only resolved once.
    ///
    /// # Errors
    ///
    /// Returns `PdfBenchError::UnknownTool` for the first name not registered.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Arc<dyn ExtractionTool>>> {
        if names.is_empty() {
            return self.names().iter().map(|name| self.get(name)).collect();
        }

        let mut resolved: Vec<Arc<dyn ExtractionTool>> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref().trim();
            if resolved.iter().any(|tool| tool.name() == name) {
                continue;
            }
            resolved.push(self.get(name)?);
        }

        Ok(resolved)
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry").field("tools", &self.names()).finish()
    }
}
