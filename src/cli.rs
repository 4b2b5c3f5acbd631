use crate::commands::{configure, import, init, upload};
use crate::config::Config;
use crate::manifest::Scope;
use crate::messages::Lang;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "customize-uploader")]
#[command(about = "Upload, deploy and import JavaScript/CSS customizations for kintone apps")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Commands {
    pub async fn execute(self, config: Config) -> Result<()> {
        match self {
            Commands::Upload(args) => {
                upload::handle_upload_command(config, args).await?;
            }
            Commands::Init(args) => {
                init::handle_init_command(config, &args).await?;
            }
            Commands::Import(args) => {
                import::handle_import_command(config, args).await?;
            }
            Commands::Config(args) => {
                configure::handle_config_command(config, args.command)?;
            }
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload the files in a manifest, update the app's settings and deploy
    Upload(UploadArgs),

    /// Create an empty customize-manifest.json
    Init(InitArgs),

    /// Download an app's current customization into a manifest and files
    Import(ImportArgs),

    /// Configuration management
    Config(ConfigArgs),
}

/// Where and as whom to connect. Unset values fall back to the config file.
#[derive(Args, Clone, Debug, Default)]
pub struct ConnectionArgs {
    #[arg(long, env = "KINTONE_DOMAIN", help = "Domain of your kintone, e.g. example.cybozu.com")]
    pub domain: Option<String>,

    #[arg(short, long, env = "KINTONE_USERNAME")]
    pub username: Option<String>,

    #[arg(short, long, env = "KINTONE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, env = "KINTONE_BASIC_AUTH_USERNAME")]
    pub basic_auth_username: Option<String>,

    #[arg(long, env = "KINTONE_BASIC_AUTH_PASSWORD", hide_env_values = true)]
    pub basic_auth_password: Option<String>,

    #[arg(long, help = "HTTP(S) proxy URL")]
    pub proxy: Option<String>,

    #[arg(long, help = "Guest space ID, when the app lives in a guest space")]
    pub guest_space_id: Option<u32>,

    #[arg(long, value_enum)]
    pub lang: Option<Lang>,
}

#[derive(Args)]
pub struct UploadArgs {
    #[arg(help = "Path to customize-manifest.json")]
    pub manifest: PathBuf,

    #[arg(short, long, help = "Re-upload whenever a local file changes")]
    pub watch: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args)]
pub struct InitArgs {
    #[arg(short, long, help = "App ID")]
    pub app: String,

    #[arg(long, default_value = "dest")]
    pub dest_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = Scope::All)]
    pub scope: Scope,

    #[arg(long, value_enum)]
    pub lang: Option<Lang>,
}

#[derive(Args)]
pub struct ImportArgs {
    #[arg(help = "Manifest naming the app to import")]
    pub manifest: PathBuf,

    #[arg(long, default_value = "dest")]
    pub dest_dir: PathBuf,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommands>,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Write a configuration file with the defaults
    Init,
}
