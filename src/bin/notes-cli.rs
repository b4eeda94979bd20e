use std::path::PathBuf;

use clap::{Parser, Subcommand};
use notes_sdk::{ClientError, FileTokenStore, NotesClient};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "notes-cli")]
#[command(about = "Command-line client for the notes app", long_about = None)]
struct Cli {
    /// Gateway (or backend) origin.
    #[arg(short, long, env = "NOTES_URL", default_value = "http://localhost:3000")]
    url: String,

    /// File holding the API token between runs.
    #[arg(short, long, env = "NOTES_TOKEN_FILE", default_value = ".notes-token")]
    token_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and log in
    Register {
        username: String,
        email: String,
        password: String,
    },
    /// Log in and remember the token
    Login { username: String, password: String },
    /// Forget the stored token
    Logout,
    /// Show the logged-in user
    Me,
    /// List notes, most recently edited first
    List,
    /// Show one note
    Show { id: u64 },
    /// Create a note
    Create { text: String },
    /// Replace a note's text
    Edit { id: u64, text: String },
    /// Delete a note
    Delete { id: u64 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut client = NotesClient::with_store(&cli.url, FileTokenStore::new(&cli.token_file))?;

    if let Err(e) = execute(&mut client, cli.command).await {
        eprintln!("Error: {}", e);
        if let Some(ClientError::Api { body, .. }) = e.downcast_ref::<ClientError>() {
            if !body.is_empty() {
                eprintln!("Response: {}", body);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn execute(
    client: &mut NotesClient<FileTokenStore>,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Register { username, email, password } => {
            print_json(&client.register(&username, &email, &password).await?.user)?
        }
        Commands::Login { username, password } => {
            print_json(&client.login(&username, &password).await?.user)?
        }
        Commands::Logout => {
            client.logout()?;
            println!("Logged out");
        }
        Commands::Me => print_json(&client.me().await?)?,
        Commands::List => print_json(&client.list_notes().await?)?,
        Commands::Show { id } => print_json(&client.get_note(id).await?)?,
        Commands::Create { text } => print_json(&client.create_note(&text).await?)?,
        Commands::Edit { id, text } => print_json(&client.update_note(id, &text).await?)?,
        Commands::Delete { id } => {
            client.delete_note(id).await?;
            println!("Deleted note {}", id);
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn unprintable_output_is_an_error() {
        let mut by_pair = BTreeMap::new();
        by_pair.insert((1u8, 2u8), "not a JSON object key");
        assert!(print_json(&by_pair).is_err());
    }

    #[test]
    fn printable_output_succeeds() {
        assert!(print_json(&serde_json::json!({ "id": 1 })).is_ok());
    }

    #[test]
    fn parses_edit_command() {
        let cli = Cli::try_parse_from(["notes-cli", "--url", "http://gw:3000", "edit", "4", "new text"]).unwrap();
        assert_eq!(cli.url, "http://gw:3000");
        assert!(matches!(cli.command, Commands::Edit { id: 4, ref text } if text == "new text"));
    }
}
