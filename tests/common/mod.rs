//! Shared fixtures: the countries/states/cities schema, as a static catalog
//! and as a seeded in-memory SQLite database.

#![allow(dead_code)]

use std::sync::Arc;

use adhoc::catalog::{Catalog, ColumnSchema, SqliteCatalogSource, TableSchema};
use adhoc::config::Settings;
use adhoc::executor::ConnectionPool;
use adhoc::service::ReportService;

pub const SCHEMA: &str = r#"
CREATE TABLE countries (
    country_code CHAR(3) PRIMARY KEY,
    name VARCHAR(100) NOT NULL UNIQUE
);
CREATE TABLE states (
    state_id INTEGER PRIMARY KEY,
    country_code CHAR(3) NOT NULL REFERENCES countries(country_code),
    name VARCHAR(100) NOT NULL,
    abbreviation VARCHAR(10)
);
CREATE TABLE cities (
    city_id INTEGER PRIMARY KEY,
    state_id INTEGER NOT NULL REFERENCES states(state_id),
    name VARCHAR(100) NOT NULL,
    population BIGINT
);
CREATE TABLE borders (
    id INTEGER PRIMARY KEY,
    country_code CHAR(3) NOT NULL REFERENCES countries(country_code),
    border_country_code CHAR(3) NOT NULL REFERENCES countries(country_code)
);
CREATE TABLE currencies (
    id INTEGER PRIMARY KEY,
    country_code CHAR(3) NOT NULL REFERENCES countries(country_code),
    currency VARCHAR(100) NOT NULL
);
CREATE TABLE languages (
    id INTEGER PRIMARY KEY,
    country_code CHAR(3) NOT NULL REFERENCES countries(country_code),
    language VARCHAR(100) NOT NULL
);
CREATE TABLE country_geography (
    country_id INTEGER PRIMARY KEY,
    country_code CHAR(3) NOT NULL REFERENCES countries(country_code),
    area DOUBLE PRECISION,
    region VARCHAR(100),
    lat DOUBLE PRECISION,
    lng DOUBLE PRECISION
);
CREATE TABLE country_society (
    country_id INTEGER PRIMARY KEY,
    country_code CHAR(3) NOT NULL REFERENCES countries(country_code),
    capital VARCHAR(100),
    population BIGINT
);
CREATE TABLE audit_log (
    id INTEGER PRIMARY KEY,
    message TEXT,
    created_at TIMESTAMP
);
"#;

pub const DATA: &str = r#"
INSERT INTO countries VALUES ('BRA', 'Brazil'), ('ARG', 'Argentina'), ('CHE', 'Switzerland');
INSERT INTO states VALUES
    (1, 'BRA', 'São Paulo', 'SP'),
    (2, 'BRA', 'Rio de Janeiro', 'RJ'),
    (3, 'BRA', 'Minas Gerais', 'MG'),
    (4, 'ARG', 'Buenos Aires', 'BA'),
    (5, 'CHE', 'Zürich', 'ZH');
INSERT INTO cities VALUES
    (1, 1, 'São Paulo', 12325000),
    (2, 1, 'Guarulhos', 1392000),
    (3, 1, 'Campinas', 1223000),
    (4, 1, 'São Bernardo do Campo', 844000),
    (5, 1, 'Santo André', 721000),
    (6, 2, 'Rio de Janeiro', 6748000),
    (7, 2, 'São Gonçalo', 1091000),
    (8, 2, 'Duque de Caxias', 924000),
    (9, 2, 'Nova Iguaçu', 823000),
    (10, 3, 'Belo Horizonte', 2521000),
    (11, 3, 'Uberlândia', 699000),
    (12, 3, 'Contagem', 668000),
    (13, 4, 'La Plata', 772000),
    (14, 4, 'Mar del Plata', 1100000),
    (15, 5, 'Zürich', 421000),
    (16, 2, 'Niterói', NULL);
INSERT INTO borders VALUES (1, 'BRA', 'ARG'), (2, 'ARG', 'BRA');
INSERT INTO currencies VALUES (1, 'BRA', 'Real'), (2, 'ARG', 'Peso'), (3, 'CHE', 'Franc');
INSERT INTO languages VALUES (1, 'BRA', 'Portuguese'), (2, 'ARG', 'Spanish'), (3, 'CHE', 'German'), (4, 'CHE', 'French');
INSERT INTO country_geography VALUES
    (1, 'BRA', 8515767.0, 'Americas', -10.0, -55.0),
    (2, 'ARG', 2780400.0, 'Americas', -34.0, -64.0),
    (3, 'CHE', 41284.0, 'Europe', 47.0, 8.0);
INSERT INTO country_society VALUES
    (1, 'BRA', 'Brasília', 203062512),
    (2, 'ARG', 'Buenos Aires', 45773884),
    (3, 'CHE', 'Bern', 8703405);
"#;

/// Pool over a shared in-memory database seeded with the geo schema.
///
/// `name` must be unique per test; tests in one binary share the process.
pub fn seeded_pool(name: &str) -> ConnectionPool {
    let pool = ConnectionPool::in_memory(name).unwrap();
    let conn = pool.get().unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    conn.execute_batch(DATA).unwrap();
    pool
}

/// Service over a freshly seeded database.
pub fn seeded_service(name: &str) -> ReportService {
    seeded_service_with(name, Settings::default())
}

pub fn seeded_service_with(name: &str, settings: Settings) -> ReportService {
    let pool = seeded_pool(name);
    let source = Arc::new(SqliteCatalogSource::new(pool.clone()));
    ReportService::new(source, pool, &settings).unwrap()
}

/// The same schema as a static catalog, for compile-only tests.
pub fn geo_catalog() -> Catalog {
    Catalog::from_tables([
        TableSchema::new("countries")
            .with_column(ColumnSchema::new("country_code", "CHAR(3)").primary_key())
            .with_column(ColumnSchema::new("name", "VARCHAR(100)").not_null()),
        TableSchema::new("states")
            .with_column(ColumnSchema::new("state_id", "INTEGER").primary_key())
            .with_column(ColumnSchema::new("country_code", "CHAR(3)").not_null())
            .with_column(ColumnSchema::new("name", "VARCHAR(100)").not_null())
            .with_column(ColumnSchema::new("abbreviation", "VARCHAR(10)"))
            .with_foreign_key("country_code", "countries", "country_code"),
        TableSchema::new("cities")
            .with_column(ColumnSchema::new("city_id", "INTEGER").primary_key())
            .with_column(ColumnSchema::new("state_id", "INTEGER").not_null())
            .with_column(ColumnSchema::new("name", "VARCHAR(100)").not_null())
            .with_column(ColumnSchema::new("population", "BIGINT"))
            .with_foreign_key("state_id", "states", "state_id"),
        TableSchema::new("borders")
            .with_column(ColumnSchema::new("id", "INTEGER").primary_key())
            .with_column(ColumnSchema::new("country_code", "CHAR(3)").not_null())
            .with_column(ColumnSchema::new("border_country_code", "CHAR(3)").not_null())
            .with_foreign_key("country_code", "countries", "country_code")
            .with_foreign_key("border_country_code", "countries", "country_code"),
        TableSchema::new("currencies")
            .with_column(ColumnSchema::new("id", "INTEGER").primary_key())
            .with_column(ColumnSchema::new("country_code", "CHAR(3)").not_null())
            .with_column(ColumnSchema::new("currency", "VARCHAR(100)").not_null())
            .with_foreign_key("country_code", "countries", "country_code"),
        TableSchema::new("languages")
            .with_column(ColumnSchema::new("id", "INTEGER").primary_key())
            .with_column(ColumnSchema::new("country_code", "CHAR(3)").not_null())
            .with_column(ColumnSchema::new("language", "VARCHAR(100)").not_null())
            .with_foreign_key("country_code", "countries", "country_code"),
        TableSchema::new("country_geography")
            .with_column(ColumnSchema::new("country_id", "INTEGER").primary_key())
            .with_column(ColumnSchema::new("country_code", "CHAR(3)").not_null())
            .with_column(ColumnSchema::new("area", "DOUBLE PRECISION"))
            .with_column(ColumnSchema::new("region", "VARCHAR(100)"))
            .with_column(ColumnSchema::new("lat", "DOUBLE PRECISION"))
            .with_column(ColumnSchema::new("lng", "DOUBLE PRECISION"))
            .with_foreign_key("country_code", "countries", "country_code"),
        TableSchema::new("country_society")
            .with_column(ColumnSchema::new("country_id", "INTEGER").primary_key())
            .with_column(ColumnSchema::new("country_code", "CHAR(3)").not_null())
            .with_column(ColumnSchema::new("capital", "VARCHAR(100)"))
            .with_column(ColumnSchema::new("population", "BIGINT"))
            .with_foreign_key("country_code", "countries", "country_code"),
        TableSchema::new("audit_log")
            .with_column(ColumnSchema::new("id", "INTEGER").primary_key())
            .with_column(ColumnSchema::new("message", "TEXT"))
            .with_column(ColumnSchema::new("created_at", "TIMESTAMP")),
    ])
}
