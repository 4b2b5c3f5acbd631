//! Operator-facing messages in the supported languages.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Ja,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    Uploaded,
    FilesUploaded,
    FilesUploadFailed,
    SettingsUpdated,
    SettingsUpdateFailed,
    Deploying,
    Deployed,
    DeployFailed,
    AuthenticationFailed,
    Retrying,
    Watching,
    ChangeDetected,
    InitFinished,
    ImportFinished,
    ImportFailed,
    DomainPrompt,
    UsernamePrompt,
    PasswordPrompt,
}

impl Message {
    pub fn text(self, lang: Lang) -> &'static str {
        match lang {
            Lang::En => self.en(),
            Lang::Ja => self.ja(),
        }
    }

    fn en(self) -> &'static str {
        match self {
            Message::Uploaded => "Uploaded",
            Message::FilesUploaded => "JavaScript/CSS files have been uploaded!",
            Message::FilesUploadFailed => "Failed to upload JavaScript/CSS files",
            Message::SettingsUpdated => "Customization settings have been updated!",
            Message::SettingsUpdateFailed => "Failed to update customization settings",
            Message::Deploying => "Wait for deploying completed...",
            Message::Deployed => "Setting has been deployed!",
            Message::DeployFailed => "Failed to deploy setting",
            Message::AuthenticationFailed => "Failed to authenticate",
            Message::Retrying => "Recovering from an error...",
            Message::Watching => "Watching the files changes...",
            Message::ChangeDetected => "Change detected",
            Message::InitFinished => "Successfully created customize-manifest.json",
            Message::ImportFinished => "Successfully imported customization settings",
            Message::ImportFailed => "Failed to import customization settings",
            Message::DomainPrompt => "Input your kintone domain (example.cybozu.com)",
            Message::UsernamePrompt => "Input your username",
            Message::PasswordPrompt => "Input your password",
        }
    }

    fn ja(self) -> &'static str {
        match self {
            Message::Uploaded => "をアップロードしました",
            Message::FilesUploaded => "JavaScript/CSS ファイルをアップロードしました！",
            Message::FilesUploadFailed => "JavaScript/CSS ファイルのアップロードに失敗しました",
            Message::SettingsUpdated => "JavaScript/CSS カスタマイズ設定を変更しました！",
            Message::SettingsUpdateFailed => "JavaScript/CSS カスタマイズ設定の変更に失敗しました",
            Message::Deploying => "運用環境への反映の完了を待っています...",
            Message::Deployed => "運用環境に反映しました！",
            Message::DeployFailed => "運用環境への反映に失敗しました",
            Message::AuthenticationFailed => "ログインに失敗しました",
            Message::Retrying => "エラーが発生しました。リトライしています...",
            Message::Watching => "ファイルの変更を監視しています...",
            Message::ChangeDetected => "ファイルの変更を検知しました",
            Message::InitFinished => "customize-manifest.json を生成しました",
            Message::ImportFinished => "カスタマイズ設定をインポートしました",
            Message::ImportFailed => "カスタマイズ設定のインポートに失敗しました",
            Message::DomainPrompt => "kintone のドメインを入力してください (example.cybozu.com)",
            Message::UsernamePrompt => "ログイン名を入力してください",
            Message::PasswordPrompt => "パスワードを入力してください",
        }
    }
}
