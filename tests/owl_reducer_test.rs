use graphforge::core::{triplify, SourceDocument, SourceKind};
use graphforge::parsing::owl_xml::{reduce, FALLBACK_BLANK_NODE};
use graphforge::Error;
use oxigraph::model::{BlankNode, GraphName, Literal, NamedNode, Quad};

fn iri(value: &str) -> NamedNode {
    NamedNode::new(value).unwrap()
}

fn triple(s: &str, p: &str, o: &str) -> Quad {
    Quad::new(iri(s), iri(p), iri(o), GraphName::DefaultGraph)
}

const HEADER: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
         xmlns:owl="http://www.w3.org/2002/07/owl#">"#;

fn document(body: &str) -> String {
    format!("{}\n{}\n</rdf:RDF>\n", HEADER, body)
}

#[test]
fn test_one_of_members_are_typed_by_the_class() {
    let xml = document(
        r#"
    <owl:Class rdf:about="http://ex/A">
        <owl:equivalentClass>
            <owl:Class>
                <owl:oneOf rdf:parseType="Collection">
                    <rdf:Description rdf:about="http://ex/a1"/>
                    <rdf:Description rdf:about="http://ex/a2"/>
                </owl:oneOf>
            </owl:Class>
        </owl:equivalentClass>
    </owl:Class>"#,
    );

    let quads = reduce(&xml).unwrap();
    assert_eq!(quads.len(), 2);
    assert!(quads.contains(&triple("http://ex/a1", "rdf:type", "http://ex/A")));
    assert!(quads.contains(&triple("http://ex/a2", "rdf:type", "http://ex/A")));
}

#[test]
fn test_class_children_keep_qualified_predicates() {
    let xml = document(
        r#"
    <owl:Class rdf:about="http://ex/Margherita">
        <rdfs:subClassOf rdf:resource="http://ex/NamedPizza"/>
        <rdfs:label xml:lang="en">Margherita</rdfs:label>
        <rdfs:comment>   </rdfs:comment>
    </owl:Class>"#,
    );

    let quads = reduce(&xml).unwrap();
    assert_eq!(quads.len(), 2);
    assert!(quads.contains(&triple("http://ex/Margherita", "rdfs:subClassOf", "http://ex/NamedPizza")));
    assert!(quads.contains(&Quad::new(
        iri("http://ex/Margherita"),
        iri("rdfs:label"),
        Literal::new_simple_literal("Margherita"),
        GraphName::DefaultGraph,
    )));
}

#[test]
fn test_description_children_are_walked_with_its_subject() {
    let xml = document(
        r#"
    <rdf:Description rdf:about="http://ex/thing">
        <rdfs:seeAlso rdf:resource="http://ex/other"/>
        <ex:wrapper>
            <rdfs:label>Thing</rdfs:label>
        </ex:wrapper>
    </rdf:Description>"#,
    );

    let quads = reduce(&xml).unwrap();
    assert_eq!(quads.len(), 1);
    assert!(quads.contains(&Quad::new(
        iri("http://ex/thing"),
        iri("rdfs:label"),
        Literal::new_simple_literal("Thing"),
        GraphName::DefaultGraph,
    )));
}

#[test]
fn test_nested_elements_propagate_nearest_subject() {
    let xml = document(
        r#"
    <owl:ObjectProperty rdf:about="http://ex/hasTopping">
        <rdfs:domain rdf:resource="http://ex/Pizza"/>
        <owl:inverseOf>
            <owl:ObjectProperty rdf:about="http://ex/isToppingOf">
                <rdfs:range rdf:resource="http://ex/Pizza"/>
            </owl:ObjectProperty>
        </owl:inverseOf>
    </owl:ObjectProperty>"#,
    );

    let quads = reduce(&xml).unwrap();
    assert!(quads.contains(&triple("http://ex/hasTopping", "rdfs:domain", "http://ex/Pizza")));
    assert!(quads.contains(&triple("http://ex/isToppingOf", "rdfs:range", "http://ex/Pizza")));
}

#[test]
fn test_values_not_starting_with_http_are_literals() {
    let xml = document(
        r#"
    <owl:Class rdf:about="http://ex/thing">
        <rdfs:seeAlso rdf:resource="urn:isbn:123"/>
    </owl:Class>"#,
    );

    let quads = reduce(&xml).unwrap();
    assert!(quads.contains(&Quad::new(
        iri("http://ex/thing"),
        iri("rdfs:seeAlso"),
        Literal::new_simple_literal("urn:isbn:123"),
        GraphName::DefaultGraph,
    )));
}

#[test]
fn test_missing_subject_falls_back_to_shared_blank_node() {
    let xml = document(
        r#"
    <owl:Ontology>
        <rdfs:comment>first</rdfs:comment>
    </owl:Ontology>
    <owl:AnnotationProperty>
        <rdfs:label>second</rdfs:label>
    </owl:AnnotationProperty>"#,
    );

    let quads = reduce(&xml).unwrap();
    let blank = BlankNode::new(FALLBACK_BLANK_NODE).unwrap();
    assert_eq!(quads.len(), 2);
    for quad in &quads {
        assert_eq!(quad.subject.to_string(), blank.to_string());
    }
}

#[test]
fn test_declared_entities_are_expanded() {
    let xml = r#"<?xml version="1.0"?>
<!DOCTYPE rdf:RDF [
    <!ENTITY ex "http://example.org/pizza#" >
]>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
         xmlns:owl="http://www.w3.org/2002/07/owl#">
    <owl:Class rdf:about="&ex;Pizza">
        <rdfs:subClassOf rdf:resource="&ex;Food"/>
    </owl:Class>
</rdf:RDF>"#;

    let quads = reduce(xml).unwrap();
    assert!(quads.contains(&triple(
        "http://example.org/pizza#Pizza",
        "rdfs:subClassOf",
        "http://example.org/pizza#Food"
    )));
}

#[test]
fn test_malformed_xml_is_parse_error() {
    assert!(matches!(reduce("<rdf:RDF><owl:Class></rdf:RDF>"), Err(Error::Parse(_))));
    assert!(matches!(reduce("just text"), Err(Error::Parse(_))));
}

#[test]
fn test_dispatch_by_extension() {
    let xml = document(r#"<owl:Class rdf:about="http://ex/A"><rdfs:label>A</rdfs:label></owl:Class>"#);
    assert_eq!(triplify(&xml, "owl").unwrap().len(), 1);
    assert_eq!(triplify(&xml, "rdf").unwrap().len(), 1);
    assert!(matches!(triplify(&xml, "xml"), Err(Error::InvalidSource(_))));

    let doc = SourceDocument::new("pizza.owl", xml).unwrap();
    assert_eq!(doc.kind, SourceKind::OwlXml);
    assert_eq!(doc.triplify().unwrap().len(), 1);
}

#[test]
fn test_turtle_triple_count_is_preserved() {
    let ttl = "@prefix ex: <http://example.org/> .\n\
               ex:a ex:p ex:b .\n\
               ex:a ex:p ex:c .\n\
               ex:b ex:q \"literal\" .\n";
    assert_eq!(triplify(ttl, "ttl").unwrap().len(), 3);
}

#[test]
fn test_relative_references_resolve_against_document_name() {
    let xml = document(
        r##"
    <owl:Class rdf:about="#Margherita">
        <rdfs:subClassOf rdf:resource="#NamedPizza"/>
    </owl:Class>
    <owl:Class rdf:ID="NamedPizza">
        <rdfs:label>Named pizza</rdfs:label>
    </owl:Class>"##,
    );

    let quads = SourceDocument::new("pizza menu.owl", xml).unwrap().triplify().unwrap();
    assert_eq!(quads.len(), 2);
    assert!(quads.contains(&triple(
        "file:///pizza%20menu.owl#Margherita",
        "rdfs:subClassOf",
        "file:///pizza%20menu.owl#NamedPizza"
    )));
    assert!(quads.contains(&Quad::new(
        iri("file:///pizza%20menu.owl#NamedPizza"),
        iri("rdfs:label"),
        Literal::new_simple_literal("Named pizza"),
        GraphName::DefaultGraph,
    )));
}
