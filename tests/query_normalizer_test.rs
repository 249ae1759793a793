use graphforge::config::GraphForgeConfig;
use graphforge::parsing::QueryNormalizer;
use std::collections::BTreeMap;

fn rdfs_only() -> BTreeMap<String, String> {
    let mut prefixes = BTreeMap::new();
    prefixes.insert("rdfs".to_string(), "http://www.w3.org/2000/01/rdf-schema#".to_string());
    prefixes
}

#[test]
fn test_class_query_gains_prefix_and_brackets() {
    let normalizer = QueryNormalizer::new(true).unwrap();
    let query = normalizer.normalize("SELECT * WHERE { ?s a rdfs:Class }", &rdfs_only());

    assert_eq!(
        query,
        "PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>\n\
         SELECT * WHERE { ?s <rdf:type> <rdfs:Class> }"
    );
}

#[test]
fn test_user_prefixes_follow_the_prefix_map() {
    let normalizer = QueryNormalizer::new(true).unwrap();
    let query = normalizer.normalize(
        "PREFIX pizza: <http://www.co-ode.org/ontologies/pizza/pizza.owl#>\n\
         SELECT ?p WHERE { ?p a <http://www.co-ode.org/ontologies/pizza/pizza.owl#Pizza> }",
        &rdfs_only(),
    );

    let lines: Vec<&str> = query.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>");
    assert_eq!(lines[1], "PREFIX pizza: <http://www.co-ode.org/ontologies/pizza/pizza.owl#>");
    assert_eq!(
        lines[2],
        "SELECT ?p WHERE { ?p <rdf:type> <http://www.co-ode.org/ontologies/pizza/pizza.owl#Pizza> }"
    );
}

#[test]
fn test_bare_iris_and_comparisons() {
    let normalizer = QueryNormalizer::new(false).unwrap();
    let query = normalizer.normalize(
        "SELECT ?n WHERE { http://ex/pizza http://ex/count ?n FILTER(?n < 10 && ?n > 2) }",
        &BTreeMap::new(),
    );
    assert_eq!(
        query,
        "SELECT ?n WHERE { <http://ex/pizza> <http://ex/count> ?n FILTER(?n < 10 && ?n > 2) }"
    );
}

#[test]
fn test_default_config_prefixes() {
    let config = GraphForgeConfig::default();
    let normalizer = QueryNormalizer::new(config.query.bracket_prefixed_names).unwrap();
    let query = normalizer.normalize("SELECT * WHERE { ?s ?p ?o }", &config.query.prefixes);

    for prefix in ["owl", "rdf", "rdfs", "xsd"] {
        assert!(query.contains(&format!("PREFIX {}: <", prefix)), "missing {}", prefix);
    }
    assert!(query.ends_with("SELECT * WHERE { ?s ?p ?o }"));
}

#[test]
fn test_literals_are_left_alone() {
    let normalizer = QueryNormalizer::new(true).unwrap();
    let query = normalizer.normalize(
        r#"SELECT ?s WHERE { ?s rdfs:label "see http://example.org/x or ex:y" }"#,
        &BTreeMap::new(),
    );
    assert_eq!(
        query,
        r#"SELECT ?s WHERE { ?s <rdfs:label> "see http://example.org/x or ex:y" }"#
    );
}
