use argh::FromArgs;
use bank_core::Credentials;
use camino::Utf8PathBuf;

use crate::CliError;

/// Add a user to the credentials file, prompting for the password.
#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand, name = "add")]
pub struct AddUser {
    /// username to add or replace
    #[argh(positional)]
    username: String,
    /// path to credentials file (default: user.json in current directory)
    #[argh(option, default = "Utf8PathBuf::from(\"user.json\")")]
    file: Utf8PathBuf,
}

impl AddUser {
    pub async fn run(&self) -> Result<(), CliError> {
        let mut credentials = if self.file.exists() {
            Credentials::load(&self.file).await?
        } else {
            tracing::info!("{} does not exist, creating it", self.file);
            Credentials::new()
        };

        let password = rpassword::prompt_password(format!("Password for {}: ", self.username))?;
        let confirmation = rpassword::prompt_password("Confirm password: ")?;
        if password != confirmation {
            return Err(CliError::PasswordMismatch);
        }
        if self.username.is_empty() || password.is_empty() {
            return Err(CliError::EmptyCredentials);
        }

        let replaced = credentials.insert(&self.username, &password);
        credentials.save(&self.file).await?;

        if replaced {
            tracing::info!("replaced password for {} in {}", self.username, self.file);
        } else {
            tracing::info!("added {} to {}", self.username, self.file);
        }

        Ok(())
    }
}
