// tests/relations/relations_test.rs
#[path = "../common/mod.rs"]
mod common;

use std::collections::BTreeSet;

use adhoc::relations::{FkDirection, RelationError, RelationGraph};

fn graph() -> RelationGraph {
    RelationGraph::from_catalog(&common::geo_catalog())
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_graph_covers_every_table() {
    let graph = graph();
    assert_eq!(graph.table_count(), 9);
    // borders declares two keys to countries
    assert_eq!(graph.edge_count(), 8);
}

#[test]
fn test_countries_is_the_hub() {
    let direct = graph().direct_relations("countries").unwrap();
    assert_eq!(
        direct,
        set(&[
            "borders",
            "country_geography",
            "country_society",
            "currencies",
            "languages",
            "states",
        ])
    );
}

#[test]
fn test_table_without_keys() {
    assert!(graph().direct_relations("audit_log").unwrap().is_empty());

    let relations = graph().transitive_relations("audit_log", []).unwrap();
    assert!(relations.direct.is_empty());
    assert!(relations.transitive.is_empty());
}

#[test]
fn test_cities_reach_countries_through_states() {
    let relations = graph().transitive_relations("cities", []).unwrap();

    assert_eq!(relations.direct, set(&["states"]));
    assert_eq!(relations.transitive.keys().collect::<Vec<_>>(), vec!["countries"]);

    let paths = &relations.transitive["countries"];
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].source, "cities");
    assert_eq!(paths[0].intermediate, "states");
    assert_eq!(paths[0].first_hop[0].source_column, "state_id");
    assert_eq!(paths[0].first_hop[0].direction, FkDirection::SourceToTarget);
    assert_eq!(paths[0].second_hop[0].target_column, "country_code");
}

#[test]
fn test_countries_reach_cities_through_states() {
    let relations = graph().transitive_relations("countries", []).unwrap();

    assert!(relations.direct.contains("states"));
    assert_eq!(relations.transitive.keys().collect::<Vec<_>>(), vec!["cities"]);

    let path = &relations.transitive["cities"][0];
    assert_eq!(path.intermediate, "states");
    assert_eq!(path.first_hop[0].direction, FkDirection::TargetToSource);
    assert_eq!(path.second_hop[0].direction, FkDirection::TargetToSource);
}

#[test]
fn test_used_tables_never_returned() {
    let used = ["states", "currencies"];
    let relations = graph().transitive_relations("countries", used).unwrap();

    for table in used.iter().chain(["countries"].iter()) {
        assert!(!relations.contains(table), "{table} should be excluded");
    }
    // cities is only reachable through states, which is used
    assert!(relations.transitive.is_empty());
}

#[test]
fn test_transitive_with_joins_spans_all_involved_tables() {
    let relations = graph()
        .transitive_relations_with_joins("cities", ["states"])
        .unwrap();

    assert_eq!(relations.direct, set(&["countries"]));
    let transitive: Vec<_> = relations.transitive.keys().map(String::as_str).collect();
    assert_eq!(
        transitive,
        vec![
            "borders",
            "country_geography",
            "country_society",
            "currencies",
            "languages",
        ]
    );
    for paths in relations.transitive.values() {
        assert!(paths.iter().all(|p| p.intermediate == "countries"));
        assert!(paths.iter().all(|p| p.source == "states"));
    }
}

#[test]
fn test_foreign_keys_between_borders_and_countries() {
    let graph = graph();

    let mut pairs: Vec<_> = graph
        .foreign_key_relations("borders", "countries")
        .unwrap()
        .into_iter()
        .map(|r| (r.source_column, r.target_column, r.direction))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    assert_eq!(
        pairs,
        vec![
            (
                "border_country_code".to_string(),
                "country_code".to_string(),
                FkDirection::SourceToTarget
            ),
            (
                "country_code".to_string(),
                "country_code".to_string(),
                FkDirection::SourceToTarget
            ),
        ]
    );

    let reversed = graph.foreign_key_relations("countries", "borders").unwrap();
    assert_eq!(reversed.len(), 2);
    assert!(reversed
        .iter()
        .all(|r| r.direction == FkDirection::TargetToSource && r.source_column == "country_code"));
}

#[test]
fn test_unrelated_tables_have_no_foreign_keys() {
    let pairs = graph().foreign_key_relations("cities", "languages").unwrap();
    assert!(pairs.is_empty());
}

#[test]
fn test_unknown_table_errors() {
    let graph = graph();
    assert_eq!(
        graph.direct_relations("planets"),
        Err(RelationError::UnknownTable("planets".into()))
    );
    assert!(graph.transitive_relations("planets", []).is_err());
    assert!(graph.foreign_key_relations("cities", "planets").is_err());
    assert!(graph
        .transitive_relations_with_joins("cities", ["planets"])
        .is_err());
}
