use sqlx::PgPool;

use super::{ColumnMetadata, EntityMetadata, EntityRegistry, NamingStrategy};

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

// A column added to an existing table can only be NOT NULL when it has a
// default, otherwise the ALTER fails as soon as the table holds rows.
fn column_definition(
    column: &ColumnMetadata,
    naming: NamingStrategy,
    added_later: bool,
) -> String {
    let mut definition = format!(
        "{} {}",
        quote(&column.column_name(naming)),
        column.column_type.as_sql()
    );
    let not_null = column.primary
        || (!column.nullable && (!added_later || column.default.is_some()));
    if not_null {
        definition.push_str(" NOT NULL");
    }
    if column.unique && !column.primary {
        definition.push_str(" UNIQUE");
    }
    if let Some(expression) = column.default {
        definition.push_str(" DEFAULT ");
        definition.push_str(expression);
    }
    definition
}

/// DDL bringing the table of `entity` in line with its metadata.
///
/// Statements only ever create: a missing table is created whole, then every
/// non-primary column is added if absent. Nothing is dropped or altered.
/// Added columns without a default are nullable.
pub fn entity_statements(
    entity: &EntityMetadata,
    naming: NamingStrategy,
) -> Vec<String> {
    let table = quote(&entity.table_name(naming));

    let mut definitions: Vec<String> = entity
        .columns
        .iter()
        .map(|column| column_definition(column, naming, false))
        .collect();
    let primary: Vec<String> = entity
        .primary_columns()
        .map(|column| quote(&column.column_name(naming)))
        .collect();
    if !primary.is_empty() {
        definitions.push(format!("PRIMARY KEY ({})", primary.join(", ")));
    }

    let mut statements = vec![format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        table,
        definitions.join(", ")
    )];
    statements.extend(entity.columns.iter().filter(|c| !c.primary).map(
        |column| {
            format!(
                "ALTER TABLE {} ADD COLUMN IF NOT EXISTS {}",
                table,
                column_definition(column, naming, true)
            )
        },
    ));
    statements
}

pub fn registry_statements(
    registry: &EntityRegistry,
    naming: NamingStrategy,
) -> Vec<String> {
    registry
        .iter()
        .flat_map(|entity| entity_statements(entity, naming))
        .collect()
}

/// Align the database schema with every registered entity, in a single
/// transaction.
#[tracing::instrument(
    name = "Synchronizing database schema",
    skip(pool, registry),
    fields(entities = registry.len())
)]
pub async fn synchronize(
    pool: &PgPool,
    registry: &EntityRegistry,
    naming: NamingStrategy,
) -> Result<(), sqlx::Error> {
    let mut transaction = pool.begin().await?;
    for statement in registry_statements(registry, naming) {
        sqlx::query(&statement)
            .execute(&mut transaction)
            .await
            .map_err(|e| {
                tracing::error!("Failed to execute `{}`: {:?}", statement, e);
                e
            })?;
    }
    transaction.commit().await?;
    Ok(())
}
