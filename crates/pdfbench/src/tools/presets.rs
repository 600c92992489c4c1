//! Built-in tool definitions.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{CommandToolConfig, OutputCapture};
use crate::tool::ExtractionTool;
use crate::tools::command::CommandTool;

fn markdown_file() -> OutputCapture {
    OutputCapture::File {
        extension: "md".to_string(),
    }
}

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// MinerU writes `<output_dir>/<stem>/auto/<stem>.md`.
pub fn mineru() -> CommandToolConfig {
    CommandToolConfig {
        name: "mineru".to_string(),
        command: "mineru".to_string(),
        args: args(&["-p", "{input}", "-o", "{output_dir}"]),
        capture: markdown_file(),
        env: HashMap::new(),
    }
}

pub fn marker() -> CommandToolConfig {
    CommandToolConfig {
        name: "marker".to_string(),
        command: "marker_single".to_string(),
        args: args(&["{input}", "--output_dir", "{output_dir}", "--output_format", "markdown"]),
        capture: markdown_file(),
        env: HashMap::new(),
    }
}

/// Poppler's `pdftotext`, writing to stdout.
pub fn pdftotext() -> CommandToolConfig {
    CommandToolConfig {
        name: "pdftotext".to_string(),
        command: "pdftotext".to_string(),
        args: args(&["-layout", "-enc", "UTF-8", "{input}", "-"]),
        capture: OutputCapture::Stdout,
        env: HashMap::new(),
    }
}

/// Subprocess presets, in registration order.
pub fn command_presets() -> Vec<CommandToolConfig> {
    vec![mineru(), marker(), pdftotext()]
}

/// Every built-in tool available in this build.
pub fn builtin_tools() -> Vec<Arc<dyn ExtractionTool>> {
    #[allow(unused_mut)]
    let mut tools: Vec<Arc<dyn ExtractionTool>> = command_presets()
        .iter()
        .map(|config| Arc::new(CommandTool::from_config(config)) as Arc<dyn ExtractionTool>)
        .collect();

    #[cfg(feature = "native")]
    {
        tools.push(Arc::new(crate::tools::native::LopdfTool::new()));
        tools.push(Arc::new(crate::tools::native::PdfExtractTool::new()));
    }

    tools
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BenchmarkConfig;

    #[test]
    fn test_presets_pass_validation() {
        let config = BenchmarkConfig {
            custom_tools: command_presets(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mineru_preset_reads_markdown() {
        let preset = mineru();
        assert_eq!(preset.args, vec!["-p", "{input}", "-o", "{output_dir}"]);
        assert_eq!(preset.capture, markdown_file());
    }

    #[test]
    fn test_builtin_tool_names() {
        let names: Vec<String> = builtin_tools().iter().map(|t| t.name().to_string()).collect();
        assert!(names.contains(&"mineru".to_string()));
        assert!(names.contains(&"marker".to_string()));
        assert!(names.contains(&"pdftotext".to_string()));
        #[cfg(feature = "native")]
        {
            assert!(names.contains(&"lopdf".to_string()));
            assert!(names.contains(&"pdf-extract".to_string()));
        }
    }
}
