use std::path::PathBuf;

use anyhow::Context;
use formconfig_cli::commands::register_builtin_commands;
use formconfig_cli::CommandRegistry;
use formconfig_core::logging::setup_logging;
use formconfig_core::settings_loader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);
    let matches = registry.build_cli().get_matches();

    let settings = match matches.get_one::<PathBuf>("settings") {
        Some(path) => settings_loader::from_file_with_env(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => settings_loader::from_env(),
    };
    setup_logging(&settings);

    registry.execute(&matches, &settings).await?;
    Ok(())
}
