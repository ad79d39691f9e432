// One-shot operator commands run instead of the server
use anyhow::{anyhow, Result};
use chrono::Utc;
use std::io::Write;
use std::time::Instant;

use crate::auth::{issue_token_for_email, TokenService};
use crate::cli::{AddUserArgs, DbCommands, UserCommands};
use crate::db::{to_document, DocumentStore, Filter, ORDERS, USERS};
use crate::logging;
use crate::mappers;
use crate::models::UserInput;

pub fn run_user_command(store: &dyn DocumentStore, action: &UserCommands, out: &mut dyn Write) -> Result<()> {
    match action {
        UserCommands::Add(args) => add_user(store, args, out),
        UserCommands::List => list_users(store, out),
    }
}

fn add_user(store: &dyn DocumentStore, args: &AddUserArgs, out: &mut dyn Write) -> Result<()> {
    let email = args.email.trim();
    if email.is_empty() {
        return Err(anyhow!("email must not be empty"));
    }
    if store.find_one(USERS, &Filter::new().eq("email", email))?.is_some() {
        writeln!(out, "user exists: {}", email)?;
        return Ok(());
    }
    let user = UserInput {
        name: args.name.trim().to_string(),
        email: email.to_string(),
        role: args.role,
    };
    let id = store.insert_one(USERS, to_document(&user)?)?;
    tracing::info!(%id, email, role = %user.role, "user added from command line");
    writeln!(out, "user added: {} ({}) id={}", email, user.role, id)?;
    Ok(())
}

fn list_users(store: &dyn DocumentStore, out: &mut dyn Write) -> Result<()> {
    let users = mappers::users_view(&store.find_all(USERS)?)?;
    if users.is_empty() {
        writeln!(out, "no users")?;
    }
    for user in users {
        writeln!(out, "{}  {:<9} {} <{}>", user.id, user.role.as_str(), user.name, user.email)?;
    }
    Ok(())
}

pub fn run_token_command(
    store: &dyn DocumentStore,
    tokens: &TokenService,
    email: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let token = issue_token_for_email(store, tokens, email.trim(), Utc::now())
        .map_err(|e| anyhow!("cannot issue token for {}: {}", email, e))?;
    writeln!(out, "{}", token)?;
    Ok(())
}

pub fn run_db_command(store: &dyn DocumentStore, action: &DbCommands, out: &mut dyn Write) -> Result<()> {
    let start = Instant::now();
    let result = match action {
        DbCommands::Test => {
            logging::log_command_start("db test", "Open the document store");
            store.count(USERS).and_then(|_| {
                writeln!(out, "store ok ({})", store.backend())?;
                Ok(())
            })
        }
        DbCommands::Stats => {
            logging::log_command_start("db stats", "Count documents per collection");
            stats(store, out)
        }
    };
    let name = match action {
        DbCommands::Test => "db test",
        DbCommands::Stats => "db stats",
    };
    logging::log_command_complete(name, result.is_ok(), start.elapsed());
    result
}

fn stats(store: &dyn DocumentStore, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "backend: {}", store.backend())?;
    for collection in [USERS, ORDERS] {
        writeln!(out, "{:<8} {}", collection, store.count(collection)?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::Role;

    fn args(email: &str, role: Role) -> UserCommands {
        UserCommands::Add(AddUserArgs {
            name: "Ana".into(),
            email: email.into(),
            role,
        })
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn user_add_inserts_once() {
        let store = MemoryStore::new();
        let mut buf = Vec::new();
        run_user_command(&store, &args("ana@example.com", Role::Admin), &mut buf).unwrap();
        run_user_command(&store, &args("ana@example.com", Role::Admin), &mut buf).unwrap();
        assert_eq!(store.count(USERS).unwrap(), 1);
        let text = output(buf);
        assert!(text.contains("user added: ana@example.com (admin)"));
        assert!(text.contains("user exists: ana@example.com"));
    }

    #[test]
    fn user_list_prints_every_user() {
        let store = MemoryStore::new();
        run_user_command(&store, &args("a@example.com", Role::Seller), &mut Vec::new()).unwrap();
        run_user_command(&store, &args("b@example.com", Role::User), &mut Vec::new()).unwrap();

        let mut buf = Vec::new();
        run_user_command(&store, &UserCommands::List, &mut buf).unwrap();
        let text = output(buf);
        assert!(text.contains("<a@example.com>"));
        assert!(text.contains("vendedor"));
        assert!(text.contains("<b@example.com>"));
    }

    #[test]
    fn token_command_needs_known_email() {
        let store = MemoryStore::new();
        let tokens = TokenService::new("cli_secret", 60);
        run_user_command(&store, &args("a@example.com", Role::Manager), &mut Vec::new()).unwrap();

        let mut buf = Vec::new();
        run_token_command(&store, &tokens, "a@example.com", &mut buf).unwrap();
        let token = output(buf);
        let claims = tokens.verify(token.trim(), Utc::now()).unwrap();
        assert_eq!(claims.role, Role::Manager);

        assert!(run_token_command(&store, &tokens, "nobody@example.com", &mut Vec::new()).is_err());
    }

    #[test]
    fn db_stats_counts_collections() {
        let store = MemoryStore::new();
        run_user_command(&store, &args("a@example.com", Role::Admin), &mut Vec::new()).unwrap();

        let mut buf = Vec::new();
        run_db_command(&store, &DbCommands::Stats, &mut buf).unwrap();
        let text = output(buf);
        assert!(text.contains("backend: memory"));
        assert!(text.contains("users    1"));
        assert!(text.contains("orders   0"));

        let mut buf = Vec::new();
        run_db_command(&store, &DbCommands::Test, &mut buf).unwrap();
        assert!(output(buf).contains("store ok (memory)"));
    }
}
