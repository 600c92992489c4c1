//! Concrete extraction tools.

pub mod command;
#[cfg(feature = "native")]
pub mod native;
pub mod presets;

pub use command::CommandTool;
#[cfg(feature = "native")]
pub use native::{LopdfTool, PdfExtractTool};
pub use presets::builtin_tools;
