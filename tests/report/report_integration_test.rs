// tests/report/report_integration_test.rs
#[path = "../common/mod.rs"]
mod common;

use adhoc::config::Settings;
use adhoc::error::ErrorKind;
use adhoc::report::{FilterSpec, JoinKind, JoinSpec, OrderDirection, ReportRequest};
use adhoc::sql::Dialect;
use serde_json::{json, Value};

fn largest_cities(limit: i64) -> ReportRequest {
    ReportRequest::new("countries")
        .attribute("countries.name")
        .attribute("cities.name")
        .attribute("cities.population")
        .join(JoinSpec::new("states", "countries.country_code", "states.country_code"))
        .join(JoinSpec::new("cities", "states.state_id", "cities.state_id"))
        .order_by("cities.population", OrderDirection::Desc)
        .limit(limit)
}

fn populations(rows: &[serde_json::Map<String, Value>]) -> Vec<i64> {
    rows.iter()
        .map(|row| row["population"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_largest_cities_above_a_million() {
    let service = common::seeded_service("report_largest");
    let request = largest_cities(10).filter(FilterSpec::new("cities.population", ">", 1_000_000));

    let response = service.generate_report(&request).await.unwrap();

    let populations = populations(&response.data);
    assert_eq!(populations.len(), 7);
    assert!(populations.windows(2).all(|w| w[0] >= w[1]));
    assert!(populations.iter().all(|p| *p > 1_000_000));

    let first = &response.data[0];
    assert_eq!(
        first.keys().collect::<Vec<_>>(),
        vec!["name", "name_cities", "population"]
    );
    assert_eq!(first["name"], json!("Brazil"));
    assert_eq!(first["name_cities"], json!("São Paulo"));

    assert!(response.sql.contains(r#"WHERE "cities"."population" > 1000000"#));
    assert!(response.sql.ends_with("LIMIT 10"));
    assert!(response.warnings.is_empty());
}

#[tokio::test]
async fn test_limit_caps_rows() {
    let service = common::seeded_service("report_limit");
    let response = service.generate_report(&largest_cities(10)).await.unwrap();

    assert_eq!(response.data.len(), 10);
    let populations = populations(&response.data);
    assert!(populations.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(populations[0], 12_325_000);
}

#[tokio::test]
async fn test_aggregate_population_by_country() {
    let service = common::seeded_service("report_aggregate");
    let request = ReportRequest::new("cities")
        .attribute("countries.name")
        .join(JoinSpec::new("states", "state_id", "state_id"))
        .join(JoinSpec::new("countries", "states.country_code", "country_code"))
        .aggregate("SUM", "population", "total_population")
        .aggregate("COUNT", "*", "city_count")
        .group_by("countries.name")
        .order_by("total_population", OrderDirection::Desc);

    let response = service.generate_report(&request).await.unwrap();

    assert_eq!(
        Value::Array(response.data.into_iter().map(Value::Object).collect()),
        json!([
            {"name": "Brazil", "total_population": 29979000, "city_count": 13},
            {"name": "Argentina", "total_population": 1872000, "city_count": 2},
            {"name": "Switzerland", "total_population": 421000, "city_count": 1}
        ])
    );
}

#[tokio::test]
async fn test_in_filter_and_null_handling() {
    let service = common::seeded_service("report_filters");

    let request = ReportRequest::new("cities")
        .attribute("name")
        .filter(FilterSpec::new("population", "=", Value::Null));
    let response = service.generate_report(&request).await.unwrap();
    assert_eq!(response.data.len(), 1);
    assert_eq!(response.data[0]["name"], json!("Niterói"));

    let request = ReportRequest::new("countries")
        .attribute("name")
        .filter(FilterSpec::new("country_code", "IN", "BRA, CHE"))
        .order_by("name", OrderDirection::Asc);
    let response = service.generate_report(&request).await.unwrap();
    let names: Vec<_> = response.data.iter().map(|r| r["name"].clone()).collect();
    assert_eq!(names, vec![json!("Brazil"), json!("Switzerland")]);
}

#[tokio::test]
async fn test_functions_apply_in_projection_and_filter() {
    let service = common::seeded_service("report_functions");
    let request = ReportRequest::new("countries")
        .attribute("UPPER(name)")
        .attribute("LENGTH(name)")
        .filter(FilterSpec::new("name", "=", "brazil").with_function("lower"));

    let response = service.generate_report(&request).await.unwrap();
    assert_eq!(
        Value::Object(response.data[0].clone()),
        json!({"upper_name": "BRAZIL", "length_name": 6})
    );
}

#[tokio::test]
async fn test_left_join_keeps_unmatched_rows() {
    let service = common::seeded_service("report_left_join");
    let request = ReportRequest::new("countries")
        .attribute("name")
        .attribute("borders.border_country_code")
        .join(
            JoinSpec::new("borders", "country_code", "country_code").with_kind(JoinKind::Left),
        )
        .order_by("name", OrderDirection::Asc);

    let response = service.generate_report(&request).await.unwrap();
    assert_eq!(response.data.len(), 3);
    let switzerland = &response.data[2];
    assert_eq!(switzerland["name"], json!("Switzerland"));
    assert_eq!(switzerland["border_country_code"], Value::Null);
}

#[tokio::test]
async fn test_warnings_reported_for_unknown_function() {
    let service = common::seeded_service("report_warnings");
    let request = ReportRequest::new("countries").attribute("SOUNDEX(name)").limit(1);

    let response = service.generate_report(&request).await.unwrap();
    assert_eq!(response.data[0].keys().collect::<Vec<_>>(), vec!["name"]);
    assert_eq!(response.warnings.len(), 1);

    let json = serde_json::to_value(&response).unwrap();
    assert!(json.get("warnings").is_some());
}

#[tokio::test]
async fn test_errors_carry_kinds() {
    let service = common::seeded_service("report_errors");

    let request = ReportRequest::new("planets").attribute("name");
    let err = service.generate_report(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownTable);

    let request = ReportRequest::new("cities").attribute("altitude");
    let err = service.generate_report(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownColumn);

    let request = ReportRequest::new("cities")
        .attribute("name")
        .aggregate("NOTFUNC", "population", "x");
    let err = service.generate_report(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFunction);
    assert_eq!(err.payload().kind, ErrorKind::UnsupportedFunction);

    let request = ReportRequest::new("cities").limit(5);
    let err = service.generate_report(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_compile_only_in_postgres() {
    let service = common::seeded_service("report_compile");
    let compiled = service
        .compile_report(&largest_cities(10), Some(Dialect::Postgres))
        .await
        .unwrap();

    assert_eq!(compiled.dialect, Dialect::Postgres);
    assert!(compiled
        .sql
        .contains(r#"INNER JOIN "cities" ON "states"."state_id" = "cities"."state_id""#));
}

#[tokio::test]
async fn test_catalog_operations() {
    let service = common::seeded_service("report_catalog_ops");

    let tables = service.list_tables().await.unwrap();
    assert_eq!(tables.len(), 9);

    let columns = service.table_columns("states").await.unwrap();
    assert_eq!(
        serde_json::to_value(&columns[3]).unwrap(),
        json!({"name": "abbreviation", "type": "VARCHAR(10)"})
    );

    let related = service.table_relations("states").await.unwrap();
    assert_eq!(
        related.into_iter().collect::<Vec<_>>(),
        vec!["cities", "countries"]
    );

    let relations = service
        .transitive_relations("cities", &["states".to_string()])
        .await
        .unwrap();
    assert!(relations.direct.is_empty());
    assert!(relations.transitive.is_empty());

    let joins = vec![JoinSpec::new("states", "state_id", "state_id")];
    let relations = service
        .transitive_relations_with_joins("cities", &joins)
        .await
        .unwrap();
    assert!(relations.direct.contains("countries"));
    assert!(relations.transitive.contains_key("currencies"));

    let columns = service.joined_tables_columns("cities", &joins).await.unwrap();
    assert_eq!(columns.len(), 8);
    assert_eq!(
        serde_json::to_value(&columns[4]).unwrap(),
        json!({
            "table": "states",
            "name": "state_id",
            "type": "INTEGER",
            "qualifiedName": "states.state_id"
        })
    );

    let pairs = service.foreign_key_relations("cities", "states").await.unwrap();
    assert_eq!(
        serde_json::to_value(&pairs).unwrap(),
        json!([{
            "sourceColumn": "state_id",
            "targetColumn": "state_id",
            "direction": "source_to_target"
        }])
    );

    let functions = serde_json::to_value(service.available_functions()).unwrap();
    assert_eq!(functions["numeric"][2]["value"], json!("CEIL"));

    service.refresh_catalog().await.unwrap();
}

#[tokio::test]
async fn test_limit_clamped_by_settings() {
    let mut settings = Settings::default();
    settings.report.default_limit = 2;
    settings.report.max_limit = Some(3);
    let service = common::seeded_service_with("report_clamp", settings);

    let request = ReportRequest::new("cities").attribute("name");
    assert_eq!(service.generate_report(&request).await.unwrap().data.len(), 2);

    let response = service.generate_report(&request.limit(50)).await.unwrap();
    assert_eq!(response.data.len(), 3);
    assert_eq!(response.warnings, vec!["limit 50 reduced to 3".to_string()]);
}
