//! CLI module for gatehouse-auth.
//!
//! Offline tooling around the authentication chain. It can be used either
//! as a standalone binary or as a subcommand of the main gatehouse CLI.
//!
//! # Usage
//!
//! ```bash
//! # Print the salted hash to put in a config file
//! gatehouse-auth hash -u alice -p s3cret
//!
//! # Validate a config and show each listener's method chain
//! gatehouse-auth check -c gatehouse.toml
//!
//! # Run a Basic login through a listener's chain
//! gatehouse-auth verify -c gatehouse.toml -l api -u alice -p s3cret
//! ```

use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use gatehouse_config::{
    CliOverrides, Config, LoggingConfig, apply_overrides, load_config, validate_config,
};
use gatehouse_core::DEFAULT_LOG_LEVEL;
use http::HeaderMap;
use http::header::AUTHORIZATION;
use tabled::{Table, Tabled};
use tracing::info;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{AuthRuntime, BasicCredentials, Outcome, salted_hash};

/// gatehouse authentication tooling CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "gatehouse-auth",
    version,
    about = "Inspect and exercise gatehouse authentication chains"
)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

/// Auth CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum AuthCommands {
    /// Show the salted password hash (for manual configuration).
    Hash {
        /// User name, used as the salt.
        #[arg(short, long)]
        user: String,

        /// Password to hash.
        #[arg(short, long)]
        password: String,
    },

    /// Validate a config file and print each listener's method chain.
    Check {
        /// Config file path (json/jsonc/yaml/toml).
        #[arg(short, long)]
        config: PathBuf,

        #[command(flatten)]
        overrides: CliOverrides,
    },

    /// Authenticate a Basic login against one listener.
    Verify {
        /// Config file path (json/jsonc/yaml/toml).
        #[arg(short, long)]
        config: PathBuf,

        /// Listener name.
        #[arg(short, long)]
        listener: String,

        /// User name.
        #[arg(short, long)]
        user: String,

        /// Plaintext password.
        #[arg(short, long)]
        password: String,

        /// Send the salted hash instead of the plaintext, as clients of a
        /// `hashed-password` listener do.
        #[arg(long)]
        hashed: bool,

        #[command(flatten)]
        overrides: CliOverrides,
    },
}

/// Method row for display.
#[derive(Tabled)]
struct MethodDisplay {
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Score")]
    score: i32,
    #[tabled(rename = "Order")]
    order: String,
}

/// Run the auth CLI with the given arguments.
///
/// This is the main entry point for the auth CLI, used by both the
/// standalone binary and the unified gatehouse CLI.
pub async fn run(args: AuthArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        AuthCommands::Hash { user, password } => {
            println!("{}", salted_hash(&password, &user));
            Ok(())
        }
        AuthCommands::Check { config, overrides } => check_config(&config, &overrides),
        AuthCommands::Verify {
            config,
            listener,
            user,
            password,
            hashed,
            overrides,
        } => verify_login(&config, &overrides, &listener, &user, &password, hashed).await,
    }
}

/// Load, override and validate a config file.
fn load(path: &Path, overrides: &CliOverrides) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = load_config(path)?;
    apply_overrides(&mut config, overrides);
    validate_config(&config)?;
    Ok(config)
}

/// Re-read a config file and apply it to a running [`AuthRuntime`].
///
/// On any error the runtime keeps its current config.
pub fn reload_config(
    path: &Path,
    overrides: &CliOverrides,
    runtime: &AuthRuntime,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load(path, overrides)?;
    runtime.reload(&config)?;
    info!(config = %path.display(), "config reloaded");
    Ok(())
}

/// Validate a config and print the method chain of every listener.
fn check_config(path: &Path, overrides: &CliOverrides) -> Result<(), Box<dyn std::error::Error>> {
    let config = load(path, overrides)?;
    let runtime = AuthRuntime::from_config(&config)?;

    for listener in &config.listeners {
        let dispatcher = runtime
            .dispatcher(&listener.name)
            .ok_or_else(|| format!("no listener named \"{}\"", listener.name))?;
        let chain = dispatcher.enabled_methods();

        let mut rows: Vec<(Option<usize>, MethodDisplay)> = listener
            .auth
            .methods
            .iter()
            .map(|(name, settings)| {
                let position = chain.iter().position(|m| *m == name.as_str());
                let row = MethodDisplay {
                    method: name.clone(),
                    enabled: if settings.enabled { "Yes" } else { "No" }.to_string(),
                    score: settings.score,
                    order: position.map_or_else(|| "-".to_string(), |i| (i + 1).to_string()),
                };
                (position, row)
            })
            .collect();
        // Chain order first, then disabled methods by name
        rows.sort_by(|(pa, a), (pb, b)| {
            (pa.is_none(), pa, &a.method).cmp(&(pb.is_none(), pb, &b.method))
        });
        let rows: Vec<MethodDisplay> = rows.into_iter().map(|(_, row)| row).collect();

        println!("Listener: {} (realm \"{}\")", listener.name, listener.realm);
        if rows.is_empty() {
            println!("  No methods configured.");
        } else {
            println!("{}", Table::new(rows));
        }
        match dispatcher.challenge() {
            Some(challenge) => println!("  WWW-Authenticate: {challenge}"),
            None => println!("  WWW-Authenticate: (none, every request is unauthorized)"),
        }
    }

    println!("Config OK.");
    Ok(())
}

/// Run a synthetic Basic login through one listener's chain.
async fn verify_login(
    path: &Path,
    overrides: &CliOverrides,
    listener: &str,
    user: &str,
    password: &str,
    hashed: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load(path, overrides)?;
    init_tracing(&config.logging);

    let runtime = AuthRuntime::from_config(&config)?;
    let dispatcher = runtime
        .dispatcher(listener)
        .ok_or_else(|| format!("no listener named \"{listener}\""))?;

    let secret = if hashed {
        salted_hash(password, user)
    } else {
        password.to_string()
    };
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        BasicCredentials::header_value(user, &secret).parse()?,
    );

    let outcome = dispatcher.authenticate(0, "/", "/", &headers).await;
    println!("Status: {}", outcome.status());
    match &outcome {
        Outcome::Authenticated(identity) => {
            println!("  Method: {}", identity.method());
            println!("  User: {}", identity.user());
            if !identity.groups().is_empty() {
                let groups: Vec<&str> = identity.groups().iter().map(String::as_str).collect();
                println!("  Groups: {}", groups.join(", "));
            }
            for (key, value) in identity.extra() {
                println!("  {key}: {value}");
            }
        }
        Outcome::Rejected { error, .. } => println!("  Error: {error}"),
        Outcome::Unauthenticated { .. } => println!("  No method accepted the credentials."),
    }
    if let Some(challenge) = outcome.challenge() {
        println!("  WWW-Authenticate: {challenge}");
    }

    Ok(())
}

/// Initialize tracing from the logging config.
fn init_tracing(config: &LoggingConfig) {
    let base = config.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL);
    let directives: Vec<String> = std::iter::once(base.to_owned())
        .chain(config.filters.iter().map(|(module, level)| format!("{module}={level}")))
        .collect();
    let filter = EnvFilter::try_new(directives.join(","))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let writer = match config.output.as_deref() {
        Some("stdout") => BoxMakeWriter::new(io::stdout),
        _ => BoxMakeWriter::new(io::stderr),
    };
    let layer = fmt::layer().with_writer(writer);
    let layer = match config.format.as_deref() {
        Some("json") => layer.json().boxed(),
        Some("compact") => layer.compact().boxed(),
        _ => layer.boxed(),
    };

    // A subscriber may already be installed by an embedding binary
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
