//! User and API token management.
//!
//! Tokens are printed exactly once when minted; only their salted hash is
//! stored, so a lost token can only be replaced with `users rotate-token`.

use clap::Subcommand;
use infdb_core::{AppConfig, UserRole};

/// Sub-commands available under `users`.
#[derive(Debug, Subcommand)]
pub enum UsersCommands {
    /// Create a user and print their API token
    Create {
        /// Unique login name
        #[arg(long)]
        username: String,
        /// Display name shown as note author
        #[arg(long)]
        name: String,
        /// admin or staff
        #[arg(long, default_value = "staff", value_parser = parse_role)]
        role: UserRole,
    },
    /// Replace a user's API token and print the new one
    RotateToken {
        #[arg(long)]
        username: String,
    },
}

pub(crate) fn parse_role(value: &str) -> Result<UserRole, String> {
    value.parse().map_err(|e: infdb_core::CoreError| e.to_string())
}

pub(crate) async fn run(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    command: UsersCommands,
) -> anyhow::Result<()> {
    match command {
        UsersCommands::Create {
            username,
            name,
            role,
        } => run_users_create(pool, config, &username, &name, role).await,
        UsersCommands::RotateToken { username } => {
            run_users_rotate_token(pool, config, &username).await
        }
    }
}

/// Creates a user with a freshly minted token.
///
/// # Errors
///
/// Returns an error if the username or name is blank, the username is
/// already taken, or the insert fails.
async fn run_users_create(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    username: &str,
    name: &str,
    role: UserRole,
) -> anyhow::Result<()> {
    let username = username.trim();
    let name = name.trim();
    if username.is_empty() || name.is_empty() {
        anyhow::bail!("username and name must not be blank");
    }

    let token = infdb_db::generate_api_token();
    let hash = infdb_db::hash_token(&config.api_token_salt, &token);
    let user = match infdb_db::create_user(pool, username, name, role, &hash).await {
        Ok(user) => user,
        Err(e) if e.is_unique_violation() => {
            anyhow::bail!("user '{username}' already exists; use `users rotate-token`")
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id = %user.id, username, %role, "user created");

    println!("created {role} user '{}' ({})", user.username, user.id);
    println!("token: {token}");
    println!("store this token now; it cannot be shown again");
    Ok(())
}

/// Replaces a user's token, invalidating the old one.
///
/// # Errors
///
/// Returns an error if no user has `username` or the update fails.
async fn run_users_rotate_token(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    username: &str,
) -> anyhow::Result<()> {
    let token = infdb_db::generate_api_token();
    let hash = infdb_db::hash_token(&config.api_token_salt, &token);
    let user = match infdb_db::rotate_user_token(pool, username, &hash).await {
        Ok(user) => user,
        Err(infdb_db::DbError::NotFound) => anyhow::bail!("no user named '{username}'"),
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id = %user.id, username, "api token rotated");

    println!("rotated token for '{}'", user.username);
    println!("token: {token}");
    Ok(())
}
