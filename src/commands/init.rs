use crate::cli::InitArgs;
use crate::config::Config;
use crate::manifest::Manifest;
use crate::messages::Message;
use crate::utils::output::Notifier;
use anyhow::{Context, Result};

pub async fn handle_init_command(config: Config, args: &InitArgs) -> Result<()> {
    let notifier = Notifier::new(args.lang.unwrap_or(config.general.lang));

    let path = Manifest::empty(args.app.clone(), args.scope)
        .write_to(&args.dest_dir)
        .await
        .with_context(|| format!("Failed to write manifest to {}", args.dest_dir.display()))?;

    tracing::debug!(path = %path.display(), "manifest scaffolded");
    notifier.success(Message::InitFinished);
    Ok(())
}
