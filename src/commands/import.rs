use super::ConnectionSettings;
use crate::cli::ImportArgs;
use crate::config::Config;
use crate::manifest::ImportManifest;
use crate::workflow::{ImportOptions, ImportStatus, RetryPolicy, import_customize_setting};
use anyhow::{Context, Result};

pub async fn handle_import_command(config: Config, args: ImportArgs) -> Result<()> {
    let manifest = ImportManifest::load(&args.manifest)
        .with_context(|| format!("Failed to load manifest {}", args.manifest.display()))?;

    let settings = ConnectionSettings::merge(args.connection, &config);
    let options = ImportOptions {
        lang: settings.lang,
        dest_dir: args.dest_dir,
        retry: RetryPolicy::from(&config),
    };
    let client = settings.into_client()?;

    let mut status = ImportStatus::default();
    import_customize_setting(&client, &manifest, &mut status, &options)
        .await
        .with_context(|| format!("Failed to import app {}", manifest.app))?;

    Ok(())
}
