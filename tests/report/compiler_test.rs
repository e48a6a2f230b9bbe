// tests/report/compiler_test.rs
#[path = "../common/mod.rs"]
mod common;

use adhoc::report::{
    CompileDiagnostic, CompileError, CompileOptions, CompiledQuery, FilterSpec, JoinKind,
    JoinSpec, OrderDirection, ReportCompiler, ReportRequest,
};
use adhoc::sql::Dialect;
use serde_json::json;
use sqlparser::dialect::{PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;

fn compile(request: &ReportRequest) -> Result<CompiledQuery, CompileError> {
    let catalog = common::geo_catalog();
    ReportCompiler::new(&catalog, CompileOptions::default()).compile(request)
}

fn assert_parses(compiled: &CompiledQuery) {
    let postgres = compiled.to_sql(Dialect::Postgres);
    if let Err(e) = Parser::parse_sql(&PostgreSqlDialect {}, &postgres) {
        panic!("invalid Postgres SQL: {}\n{}", e, postgres);
    }
    let sqlite = compiled.to_sql(Dialect::Sqlite);
    if let Err(e) = Parser::parse_sql(&SQLiteDialect {}, &sqlite) {
        panic!("invalid SQLite SQL: {}\n{}", e, sqlite);
    }
}

/// Largest cities by population, reached from countries through states.
fn largest_cities() -> ReportRequest {
    serde_json::from_value(json!({
        "baseTable": "countries",
        "attributes": ["countries.name", "cities.name"],
        "joins": [
            {
                "targetTable": "states",
                "sourceAttribute": "countries.country_code",
                "targetAttribute": "states.country_code",
                "joinType": "INNER"
            },
            {
                "targetTable": "cities",
                "sourceAttribute": "states.state_id",
                "targetAttribute": "cities.state_id",
                "joinType": "INNER"
            }
        ],
        "filters": [
            {"attribute": "cities.population", "operator": ">", "value": 1000000}
        ],
        "orderByColumns": [
            {"attribute": "cities.population", "direction": "DESC"}
        ],
        "limit": 10
    }))
    .unwrap()
}

#[test]
fn test_largest_cities_report() {
    let compiled = compile(&largest_cities()).unwrap();

    insta::assert_snapshot!(compiled.to_sql(Dialect::Postgres), @r#"
    SELECT
      "countries"."name",
      "cities"."name" AS "name_cities"
    FROM "countries"
    INNER JOIN "states" ON "countries"."country_code" = "states"."country_code"
    INNER JOIN "cities" ON "states"."state_id" = "cities"."state_id"
    WHERE "cities"."population" > 1000000
    ORDER BY "cities"."population" DESC
    LIMIT 10
    "#);

    assert_eq!(compiled.aliases(), vec!["name", "name_cities"]);
    assert!(compiled.diagnostics.is_empty());
    assert_parses(&compiled);
}

#[test]
fn test_largest_cities_parameterized() {
    let compiled = compile(&largest_cities()).unwrap();
    let (sql, params) = compiled.to_parameterized(Dialect::Postgres);

    assert!(sql.contains(r#"WHERE "cities"."population" > $1"#));
    assert!(sql.ends_with("LIMIT $2"));
    assert_eq!(params.len(), 2);
}

#[test]
fn test_aggregate_report_by_country() {
    let request = ReportRequest::new("cities")
        .attribute("countries.name")
        .join(JoinSpec::new("states", "state_id", "state_id"))
        .join(JoinSpec::new("countries", "states.country_code", "country_code"))
        .aggregate("SUM", "population", "total_population")
        .aggregate("COUNT", "city_id", "city_count")
        .aggregate("AVG", "population", "avg_population")
        .group_by("countries.name")
        .order_by("total_population", OrderDirection::Desc);
    let compiled = compile(&request).unwrap();

    insta::assert_snapshot!(compiled.to_sql(Dialect::Sqlite), @r#"
    SELECT
      "countries"."name",
      SUM("cities"."population") AS "total_population",
      COUNT("cities"."city_id") AS "city_count",
      AVG("cities"."population") AS "avg_population"
    FROM "cities"
    INNER JOIN "states" ON "cities"."state_id" = "states"."state_id"
    INNER JOIN "countries" ON "states"."country_code" = "countries"."country_code"
    GROUP BY "countries"."name"
    ORDER BY "total_population" DESC
    LIMIT 1000
    "#);
    assert_parses(&compiled);
}

#[test]
fn test_join_spellings_are_equivalent() {
    for spelling in ["LEFT", "left join", "LEFT OUTER JOIN"] {
        let request: ReportRequest = serde_json::from_value(json!({
            "baseTable": "countries",
            "attributes": ["name", "currencies.currency"],
            "joins": [{
                "targetTable": "currencies",
                "sourceAttribute": "country_code",
                "targetAttribute": "country_code",
                "joinType": spelling
            }]
        }))
        .unwrap();
        assert_eq!(request.joins[0].join_type, JoinKind::Left);

        let sql = compile(&request).unwrap().to_sql(Dialect::Sqlite);
        assert!(sql.contains(
            r#"LEFT JOIN "currencies" ON "countries"."country_code" = "currencies"."country_code""#
        ));
    }
}

#[test]
fn test_unknown_join_type_rejected_at_parse() {
    let parsed = serde_json::from_value::<ReportRequest>(json!({
        "baseTable": "countries",
        "attributes": ["name"],
        "joins": [{
            "targetTable": "states",
            "sourceAttribute": "country_code",
            "targetAttribute": "country_code",
            "joinType": "CROSS"
        }]
    }));
    assert!(parsed.is_err());
}

#[test]
fn test_every_operator_compiles() {
    let filters = [
        ("=", json!("Brazil")),
        ("!=", json!("Brazil")),
        (">", json!(1)),
        ("<", json!(1)),
        (">=", json!(1)),
        ("<=", json!(1)),
        ("LIKE", json!("B%")),
        ("ILIKE", json!("b%")),
        ("IN", json!("Brazil, Argentina")),
        ("NOT IN", json!(["Brazil", "Argentina"])),
        ("IS NULL", json!(null)),
        ("IS NOT NULL", json!(null)),
    ];

    for (operator, value) in filters {
        let request = ReportRequest::new("countries")
            .attribute("name")
            .filter(FilterSpec::new("name", operator, value));
        let compiled = compile(&request).unwrap_or_else(|e| panic!("{operator}: {e}"));
        assert_parses(&compiled);
    }
}

#[test]
fn test_ilike_per_dialect() {
    let request = ReportRequest::new("countries")
        .attribute("name")
        .filter(FilterSpec::new("name", "ILIKE", "bra%"));
    let compiled = compile(&request).unwrap();

    assert!(compiled
        .to_sql(Dialect::Postgres)
        .contains(r#"WHERE "countries"."name" ILIKE 'bra%'"#));
    assert!(compiled
        .to_sql(Dialect::Sqlite)
        .contains(r#"WHERE LOWER("countries"."name") LIKE LOWER('bra%')"#));
}

#[test]
fn test_filters_are_conjoined() {
    let request = ReportRequest::new("cities")
        .attribute("name")
        .filter(FilterSpec::new("population", ">=", 500000))
        .filter(FilterSpec::new("name", "LIKE", "S%"));
    let sql = compile(&request).unwrap().to_sql(Dialect::Sqlite);

    assert!(sql.contains(
        r#"WHERE "cities"."population" >= 500000 AND "cities"."name" LIKE 'S%'"#
    ));
}

#[test]
fn test_date_function_prefix() {
    let request = ReportRequest::new("audit_log")
        .attribute("EXTRACT_YEAR(created_at)")
        .attribute("message")
        .filter(FilterSpec::new("created_at", "=", 2024).with_function("extract_year"));
    let compiled = compile(&request).unwrap();

    assert_eq!(compiled.aliases(), vec!["extract_year_created_at", "message"]);
    let postgres = compiled.to_sql(Dialect::Postgres);
    assert!(postgres.contains(
        r#"EXTRACT(YEAR FROM "audit_log"."created_at") AS "extract_year_created_at""#
    ));
    assert!(postgres.contains(r#"WHERE EXTRACT(YEAR FROM "audit_log"."created_at") = 2024"#));
    assert_parses(&compiled);
}

#[test]
fn test_unknown_function_surfaces_diagnostic() {
    let request = ReportRequest::new("cities").attribute("REVERSE(name)");
    let compiled = compile(&request).unwrap();

    assert_eq!(compiled.aliases(), vec!["name"]);
    assert_eq!(compiled.diagnostics.len(), 1);
    assert!(matches!(
        &compiled.diagnostics[0],
        CompileDiagnostic::UnknownFunction { function, .. } if function == "REVERSE"
    ));
}

#[test]
fn test_errors_before_any_sql() {
    let request = ReportRequest::new("cities")
        .attribute("name")
        .aggregate("NOTFUNC", "population", "x");
    assert_eq!(
        compile(&request).unwrap_err(),
        CompileError::UnsupportedFunction("NOTFUNC".into())
    );

    let request = ReportRequest::new("cities")
        .attribute("name")
        .filter(FilterSpec::new("name", "BETWEEN", "A"));
    assert_eq!(
        compile(&request).unwrap_err(),
        CompileError::UnsupportedOperator("BETWEEN".into())
    );

    let request = ReportRequest::new("cities")
        .attribute("name")
        .join(JoinSpec::new("planets", "state_id", "id"));
    assert_eq!(
        compile(&request).unwrap_err(),
        CompileError::UnknownTable("planets".into())
    );

    let request = ReportRequest::new("cities").attribute("name").limit(0);
    assert!(matches!(compile(&request), Err(CompileError::Validation(_))));

    let request = ReportRequest::new("cities").attribute("name").limit(-5);
    assert!(matches!(compile(&request), Err(CompileError::Validation(_))));
}

#[test]
fn test_limit_clamped_to_maximum() {
    let catalog = common::geo_catalog();
    let options = CompileOptions {
        default_limit: 50,
        max_limit: Some(100),
    };
    let compiler = ReportCompiler::new(&catalog, options);

    let compiled = compiler
        .compile(&ReportRequest::new("cities").attribute("name"))
        .unwrap();
    assert!(compiled.to_sql(Dialect::Sqlite).ends_with("LIMIT 50"));

    let compiled = compiler
        .compile(&ReportRequest::new("cities").attribute("name").limit(5000))
        .unwrap();
    assert!(compiled.to_sql(Dialect::Sqlite).ends_with("LIMIT 100"));
    assert_eq!(
        compiled.diagnostics,
        vec![CompileDiagnostic::LimitClamped {
            requested: 5000,
            applied: 100
        }]
    );
}
