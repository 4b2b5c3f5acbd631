pub mod configure;
pub mod import;
pub mod init;
pub mod upload;

use crate::cli::ConnectionArgs;
use crate::config::Config;
use crate::messages::{Lang, Message};
use crate::remote::kintone::{BasicAuth, ClientOptions, Credentials, KintoneClient};
use anyhow::{Context, Result};
use dialoguer::{Input, Password};

/// Connection settings after merging flags, environment and config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionSettings {
    pub domain: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub basic_auth: Option<(String, String)>,
    pub proxy: Option<String>,
    pub guest_space_id: Option<u32>,
    pub lang: Lang,
}

impl ConnectionSettings {
    /// Flags (and their environment variables) win over the config file.
    pub fn merge(args: ConnectionArgs, config: &Config) -> Self {
        let basic_auth = match (args.basic_auth_username, args.basic_auth_password) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        };

        Self {
            domain: args.domain.or_else(|| config.general.domain.clone()),
            username: args.username.or_else(|| config.general.username.clone()),
            password: args.password,
            basic_auth,
            proxy: args.proxy.or_else(|| config.general.proxy.clone()),
            guest_space_id: args.guest_space_id.or(config.general.guest_space_id),
            lang: args.lang.unwrap_or(config.general.lang),
        }
    }

    /// Prompts for whatever is still missing and builds the client.
    pub fn into_client(self) -> Result<KintoneClient> {
        let lang = self.lang;
        let domain = match self.domain {
            Some(domain) => domain,
            None => ask(Message::DomainPrompt, lang)?,
        };
        let username = match self.username {
            Some(username) => username,
            None => ask(Message::UsernamePrompt, lang)?,
        };
        let password = match self.password {
            Some(password) => password,
            None => Password::new()
                .with_prompt(Message::PasswordPrompt.text(lang))
                .interact()
                .context("Failed to read password")?,
        };

        let credentials = Credentials {
            username,
            password,
            basic_auth: self
                .basic_auth
                .map(|(username, password)| BasicAuth { username, password }),
        };
        let options = ClientOptions {
            proxy: self.proxy,
            guest_space_id: self.guest_space_id,
        };

        KintoneClient::new(&domain, credentials, options).context("Failed to create kintone client")
    }
}

fn ask(message: Message, lang: Lang) -> Result<String> {
    Input::<String>::new()
        .with_prompt(message.text(lang))
        .interact_text()
        .with_context(|| format!("Failed to read input: {}", message.text(Lang::En)))
}
