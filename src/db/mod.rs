pub mod entities;
pub mod schema;
pub mod services;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

use crate::server::config::ServerConfig;

/// Opens the connection pool described by the config and makes sure the
/// schema exists.
pub async fn connect(config: &ServerConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.database_url.to_owned());
    opt.max_connections(config.db_max_connections)
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    info!(
        backend = ?db.get_database_backend(),
        max_connections = config.db_max_connections,
        "Database connection pool created."
    );

    schema::ensure_schema(&db).await?;
    Ok(db)
}
