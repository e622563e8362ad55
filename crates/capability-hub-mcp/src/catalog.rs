//! Assembles the server's capability registry from every provider module.

use std::sync::Arc;

use capability_hub::{CapabilityRegistry, CapabilityResult, PathSandbox, RegistryBuilder};

use crate::config::ServerConfig;
use crate::{prompts, resources, tools};

/// Register all tools, resources and prompts, in that order, and freeze.
///
/// Fails on the first duplicate or malformed descriptor; callers treat that
/// as a startup error.
pub fn build_registry(
    config: Arc<ServerConfig>,
    sandbox: Arc<PathSandbox>,
) -> CapabilityResult<CapabilityRegistry> {
    let mut builder = RegistryBuilder::new();

    builder.register_all(tools::calculator_tools()?)?;
    builder.register_all(tools::text_tools()?)?;
    builder.register_all(tools::file_tools(sandbox)?)?;

    builder.register_all(resources::system_resources()?)?;
    builder.register_all(resources::config_resources(config)?)?;

    builder.register_all(prompts::code_prompts()?)?;
    builder.register_all(prompts::analysis_prompts()?)?;

    tracing::info!("Registered {} capabilities", builder.len());
    Ok(builder.build())
}
