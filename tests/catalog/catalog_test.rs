// tests/catalog/catalog_test.rs
#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::time::Duration;

use adhoc::catalog::{
    CatalogError, CatalogSource, CatalogStore, SemanticType, SqliteCatalogSource,
};

#[tokio::test]
async fn test_lists_user_tables() {
    let source = SqliteCatalogSource::new(common::seeded_pool("catalog_tables"));
    let tables = source.list_tables().await.unwrap();

    assert_eq!(
        tables,
        vec![
            "audit_log",
            "borders",
            "cities",
            "countries",
            "country_geography",
            "country_society",
            "currencies",
            "languages",
            "states",
        ]
    );
}

#[tokio::test]
async fn test_columns_in_declaration_order() {
    let source = SqliteCatalogSource::new(common::seeded_pool("catalog_columns"));
    let columns = source.list_columns("cities").await.unwrap();

    let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["city_id", "state_id", "name", "population"]);

    assert!(columns[0].primary_key);
    assert_eq!(columns[2].data_type, "VARCHAR(100)");
    assert_eq!(columns[2].semantic_type, SemanticType::Text);
    assert!(!columns[2].nullable);
    assert_eq!(columns[3].semantic_type, SemanticType::Numeric);
    assert!(columns[3].nullable);
}

#[tokio::test]
async fn test_foreign_keys_of_borders() {
    let source = SqliteCatalogSource::new(common::seeded_pool("catalog_fks"));
    let mut keys = source.list_foreign_keys("borders").await.unwrap();
    keys.sort_by(|a, b| a.source_column.cmp(&b.source_column));

    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].source_column, "border_country_code");
    assert_eq!(keys[1].source_column, "country_code");
    assert!(keys.iter().all(|k| k.source_table == "borders"));
    assert!(keys
        .iter()
        .all(|k| k.target_table == "countries" && k.target_column == "country_code"));
}

#[tokio::test]
async fn test_unknown_table_is_an_error() {
    let source = SqliteCatalogSource::new(common::seeded_pool("catalog_unknown"));

    assert!(matches!(
        source.list_columns("planets").await,
        Err(CatalogError::TableNotFound(name)) if name == "planets"
    ));
    assert!(matches!(
        source.list_foreign_keys("planets").await,
        Err(CatalogError::TableNotFound(_))
    ));
}

#[tokio::test]
async fn test_store_snapshot_builds_relations() {
    let pool = common::seeded_pool("catalog_store");
    let store = CatalogStore::new(
        Arc::new(SqliteCatalogSource::new(pool)),
        Duration::from_secs(300),
    );

    let snapshot = store.snapshot().await.unwrap();
    assert_eq!(snapshot.catalog.len(), 9);
    assert_eq!(snapshot.relations.edge_count(), 8);

    let again = store.snapshot().await.unwrap();
    assert!(Arc::ptr_eq(&snapshot, &again));
}

#[tokio::test]
async fn test_refresh_sees_new_tables() {
    let pool = common::seeded_pool("catalog_refresh");
    let store = CatalogStore::new(
        Arc::new(SqliteCatalogSource::new(pool.clone())),
        Duration::ZERO,
    );

    let before = store.snapshot().await.unwrap();
    assert!(!before.catalog.contains_table("mayors"));

    pool.get()
        .unwrap()
        .execute_batch(
            "CREATE TABLE mayors (id INTEGER PRIMARY KEY, city_id INTEGER REFERENCES cities(city_id));",
        )
        .unwrap();

    // zero interval never expires on its own
    let cached = store.snapshot().await.unwrap();
    assert!(!cached.catalog.contains_table("mayors"));

    let after = store.refresh().await.unwrap();
    assert!(after.catalog.contains_table("mayors"));
    assert!(after
        .relations
        .direct_relations("cities")
        .unwrap()
        .contains("mayors"));

    // published snapshots are never mutated
    assert!(!before.catalog.contains_table("mayors"));
}
