use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::models::Role;

/// Orders backend: users and orders API over an embedded document store
#[derive(Parser, Debug, Clone)]
#[command(name = "orders-backend")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Users and orders API with role-gated bearer tokens")]
#[command(long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Env file to load before reading the environment
    #[arg(short, long, default_value = ".env")]
    pub config: String,

    /// Server port override
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Server host override
    #[arg(long)]
    pub host: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the web server (default action)
    Serve,
    /// Manage stored users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Issue a bearer token for an existing user
    Token(TokenArgs),
    /// Document store maintenance
    Db {
        #[command(subcommand)]
        action: DbCommands,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum UserCommands {
    /// Insert a user directly into the store
    Add(AddUserArgs),
    /// Print every stored user
    List,
}

#[derive(Args, Debug, Clone)]
pub struct AddUserArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    /// One of: admin, gerente, cliente, vendedor, usuario
    #[arg(long)]
    pub role: Role,
}

#[derive(Args, Debug, Clone)]
pub struct TokenArgs {
    #[arg(long)]
    pub email: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DbCommands {
    /// Open the store and report success
    Test,
    /// Print per-collection document counts
    Stats,
}

impl Cli {
    /// Command-line host/port win over the environment.
    pub fn apply_overrides(&self, cfg: &mut AppConfig) {
        if let Some(host) = &self.host {
            cfg.server.host = host.clone();
        }
        if let Some(port) = self.port {
            cfg.server.port = port;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LoggingConfig, SecurityConfig, ServerConfig, StoreBackend, StoreConfig};

    fn config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 8000,
                name: "orders_backend".into(),
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                sled_path: "data/pedidosdb".into(),
            },
            security: SecurityConfig {
                jwt_secret: "secret".into(),
                token_ttl_seconds: 3600,
            },
            cors_origins: Vec::new(),
            logging: LoggingConfig {
                level: "info".into(),
            },
        }
    }

    #[test]
    fn no_subcommand_means_serve_with_defaults() {
        let cli = Cli::try_parse_from(["orders-backend"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, ".env");
        assert!(!cli.verbose);
    }

    #[test]
    fn host_and_port_override_config() {
        let cli = Cli::try_parse_from(["orders-backend", "--host", "0.0.0.0", "--port", "9000"]).unwrap();
        let mut cfg = config();
        cli.apply_overrides(&mut cfg);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 9000);

        let cli = Cli::try_parse_from(["orders-backend", "serve"]).unwrap();
        let mut cfg = config();
        cli.apply_overrides(&mut cfg);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8000);
    }

    #[test]
    fn user_add_parses_role() {
        let cli = Cli::try_parse_from([
            "orders-backend", "user", "add", "--name", "Ana", "--email", "ana@example.com", "--role", "gerente",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::User {
                action: UserCommands::Add(args),
            }) => {
                assert_eq!(args.email, "ana@example.com");
                assert_eq!(args.role, Role::Manager);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Cli::try_parse_from([
            "orders-backend", "user", "add", "--name", "A", "--email", "a@x.io", "--role", "root",
        ])
        .is_err());
        assert!(Cli::try_parse_from([
            "orders-backend", "user", "add", "--name", "A", "--email", "a@x.io", "--role", "Admin",
        ])
        .is_err());
    }

    #[test]
    fn token_and_db_subcommands() {
        let cli = Cli::try_parse_from(["orders-backend", "token", "--email", "a@x.io"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Token(ref t)) if t.email == "a@x.io"));

        let cli = Cli::try_parse_from(["orders-backend", "db", "stats"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Db {
                action: DbCommands::Stats
            })
        ));
    }
}
