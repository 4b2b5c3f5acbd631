use crate::cli::ConfigCommands;
use crate::config::Config;
use crate::utils::output::OutputStyle;
use anyhow::{Result, bail};

pub fn handle_config_command(config: Config, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) => handle_show_command(&config),
        Some(ConfigCommands::Path) => {
            println!("{}", Config::config_file_path().display());
            Ok(())
        }
        Some(ConfigCommands::Init) => handle_init_command(),
        None => handle_config_help(),
    }
}

fn handle_show_command(config: &Config) -> Result<()> {
    let unset = || OutputStyle::muted("(not set)").to_string();

    OutputStyle::print_header("⚙️  customize-uploader configuration");

    println!("General:");
    OutputStyle::print_field("Domain", &config.general.domain.clone().unwrap_or_else(unset));
    OutputStyle::print_field("Username", &config.general.username.clone().unwrap_or_else(unset));
    OutputStyle::print_field("Language", &format!("{:?}", config.general.lang).to_lowercase());
    OutputStyle::print_field("Proxy", &config.general.proxy.clone().unwrap_or_else(unset));
    OutputStyle::print_field(
        "Guest space",
        &config.general.guest_space_id.map(|id| id.to_string()).unwrap_or_else(unset),
    );

    println!("Retry:");
    OutputStyle::print_field("Max attempts", &config.retry.max_attempts.to_string());
    OutputStyle::print_field("Backoff (ms)", &config.retry.backoff_ms.to_string());

    println!("Deploy:");
    OutputStyle::print_field("Poll interval (ms)", &config.deploy.poll_interval_ms.to_string());
    let timeout = match config.deploy.timeout_secs {
        0 => "unbounded".to_string(),
        secs => secs.to_string(),
    };
    OutputStyle::print_field("Timeout (s)", &timeout);

    println!("Watch:");
    OutputStyle::print_field(
        "Stability window (ms)",
        &config.watch.stability_threshold_ms.to_string(),
    );

    Ok(())
}

fn handle_init_command() -> Result<()> {
    let path = Config::config_file_path();
    if path.exists() {
        bail!("Configuration already exists at {}", path.display());
    }

    Config::default().save_to(&path)?;
    println!("✅ {}", OutputStyle::success(&format!("Wrote {}", path.display())));
    Ok(())
}

fn handle_config_help() -> Result<()> {
    println!("⚙️  Configuration Management");
    println!("==========================");
    println!("Available configuration commands:");
    println!("  customize-uploader config show    - Show current configuration");
    println!("  customize-uploader config path    - Print the configuration file location");
    println!("  customize-uploader config init    - Write a default configuration file");
    Ok(())
}
