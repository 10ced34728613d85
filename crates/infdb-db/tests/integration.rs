//! Offline unit tests for infdb-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use infdb_core::{AppConfig, Environment, UserRole};
use infdb_db::{hash_token, PoolConfig, UserRow};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        api_token_salt: "salt".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        import_max_upload_bytes: 1024,
        rate_limit_per_minute: 60,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn user_row_parses_its_role() {
    let row = UserRow {
        id: uuid::Uuid::new_v4(),
        username: "ops".to_string(),
        name: "Ops".to_string(),
        role: "admin".to_string(),
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    };
    assert_eq!(row.role().unwrap(), UserRole::Admin);

    let broken = UserRow {
        role: "root".to_string(),
        ..row
    };
    assert!(broken.role().is_err());
}

#[test]
fn token_hash_depends_on_salt() {
    assert_ne!(hash_token("a", "token"), hash_token("b", "token"));
}
