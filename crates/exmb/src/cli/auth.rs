//! Credential command handler.

use super::AuthCommands;
use exmb::{Credential, CredentialStore, ExmbResult};

/// Execute an `auth` subcommand against the default store.
pub fn handle_auth_command(command: AuthCommands) -> ExmbResult<()> {
    let store = CredentialStore::default_location()?;

    match command {
        AuthCommands::List => {
            let aliases = store.aliases()?;
            if aliases.is_empty() {
                println!("No stored aliases in {}", store.dir().display());
            }
            for alias in aliases {
                println!("{}", alias);
            }
        }

        AuthCommands::Add {
            alias,
            access_token,
            discord_token,
            discord_owner,
        } => {
            let mut credential = Credential::new(access_token);
            if let (Some(token), Some(owner)) = (discord_token, discord_owner) {
                credential = credential.with_discord(token, owner);
            }
            store.save(&alias, &credential)?;
            println!("Stored alias '{}'", alias);
        }

        AuthCommands::Remove { alias } => {
            if store.remove(&alias)? {
                println!("Removed alias '{}'", alias);
            } else {
                println!("No alias '{}' to remove", alias);
            }
        }
    }

    Ok(())
}
