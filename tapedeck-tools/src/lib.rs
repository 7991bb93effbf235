//! Ready-to-use tools that render UI while they run.
//!
//! | Tool | Loading fragment | Final fragment |
//! |------|------------------|----------------|
//! | [`GithubRepoTool`] (`github_repo`) | `GithubLoading` | `Github` |
//! | [`InvoiceTool`] (`get_order_invoice`) | `InvoiceLoading` | `Invoice` |
//! | [`WeatherTool`] (`get_weather`) | `CurrentWeatherLoading` | `CurrentWeather` |
//!
//! ```rust
//! use tapedeck_tools::{all_tools, ToolsConfig};
//!
//! let tools = all_tools(&ToolsConfig::default()).unwrap();
//! assert_eq!(tools.len(), 3);
//! ```

pub mod config;
pub mod error;
mod http;

#[cfg(feature = "github")]
pub mod github;
#[cfg(feature = "invoice")]
pub mod invoice;
#[cfg(feature = "weather")]
pub mod weather;

pub use config::ToolsConfig;
pub use error::ToolsError;

#[cfg(feature = "github")]
pub use github::GithubRepoTool;
#[cfg(feature = "invoice")]
pub use invoice::InvoiceTool;
#[cfg(feature = "weather")]
pub use weather::WeatherTool;

use tapedeck_core::DynTool;

/// Every enabled tool, sharing one HTTP client.
#[allow(unused_variables, unused_mut)]
pub fn all_tools(config: &ToolsConfig) -> Result<Vec<Box<dyn DynTool>>, ToolsError> {
    let client = config.http_client()?;
    let mut tools: Vec<Box<dyn DynTool>> = Vec::new();

    #[cfg(feature = "github")]
    tools.push(tapedeck_core::box_tool(GithubRepoTool::new(config, client.clone())));
    #[cfg(feature = "invoice")]
    tools.push(tapedeck_core::box_tool(InvoiceTool::new(config)));
    #[cfg(feature = "weather")]
    tools.push(tapedeck_core::box_tool(WeatherTool::new(config, client)));

    Ok(tools)
}

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use schemars::JsonSchema;
    pub use serde::{Deserialize, Serialize};
    pub use tapedeck_core::{Fragment, Tool, ToolError, ToolOutput, ToolUi};
}
