//! Start-up schema bootstrap.
//!
//! Tables are derived from the entity definitions and created with
//! `IF NOT EXISTS`, so running this against an existing database is a no-op.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityName, EntityTrait, Schema};
use tracing::debug;

use crate::db::entities::{snippet, snippet_tag, tag, user};

pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    // Parents before children so the foreign keys resolve.
    create_table(db, &schema, user::Entity).await?;
    create_table(db, &schema, tag::Entity).await?;
    create_table(db, &schema, snippet::Entity).await?;
    create_table(db, &schema, snippet_tag::Entity).await?;
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(db.get_database_backend().build(&stmt)).await?;
    debug!(table = entity.table_name(), "Ensured table exists.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectOptions, Database};

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1);
        let db = Database::connect(opt).await.unwrap();

        ensure_schema(&db).await.unwrap();
        ensure_schema(&db).await.unwrap();

        let count = tag::Entity::find().all(&db).await.unwrap().len();
        assert_eq!(count, 0);
    }
}
