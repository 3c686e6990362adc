use chrono::Utc;
use scaffold_ontology::{Decision, EntityCandidate, Provenance, RelationshipHint, ResolutionConfig, ResolutionEngine};
use serde_json::json;
use std::collections::BTreeMap;

fn candidate(id: &str, name: &str, address: &str, ein: &str, confidence: f64) -> EntityCandidate {
    let mut properties = BTreeMap::new();
    properties.insert("name".to_string(), json!(name));
    properties.insert("address".to_string(), json!(address));
    properties.insert("ein".to_string(), json!(ein));
    properties.insert("context".to_string(), json!(["manufacturing", "headquarters"]));
    EntityCandidate {
        candidate_id: id.to_string(),
        entity_type: "organization".into(),
        properties,
        relationship_hints: vec![],
        provenance: Provenance {
            source_id: "crm".into(),
            record_id: id.into(),
            source_type: "crm_export".into(),
            ingested_at: Utc::now(),
            confidence,
        },
    }
}

#[test]
fn batch_with_near_duplicates_and_a_stranger_splits_correctly() {
    let candidates = vec![
        candidate("a", "Acme Corporation", "123 Main Street", "12-3456789", 0.8),
        candidate("b", "Acme Corporation", "123 Main St", "12-3456789", 0.9),
        candidate("c", "Globex Industries", "99 Offshore Way", "98-7654321", 0.9),
    ];
    let engine = ResolutionEngine::new(ResolutionConfig::default());
    let outcome = engine.resolve_batch(candidates, Utc::now());

    assert_eq!(outcome.result.resolved.len(), 2);
    let acme = outcome
        .result
        .resolved
        .iter()
        .find(|e| e.aliases.iter().any(|a| a.contains("Acme")))
        .expect("acme entity present");
    assert_eq!(acme.provenance_chain.len(), 2);
    assert!(outcome.result.audit_log.iter().any(|r| r.decision == Decision::AutoMerge));
}

#[test]
fn relationship_hint_resolves_against_merged_batch() {
    let mut employer = candidate("a", "Acme Corporation", "123 Main Street", "12-3456789", 0.9);
    let mut employee = candidate("b", "Jane Doe", "123 Main Street", "99-1111111", 0.9);
    employee.entity_type = "person".into();
    employee.relationship_hints.push(RelationshipHint {
        relationship: "employed_by".into(),
        target_name_or_id: "Acme Corporation".into(),
        confidence: 0.85,
    });
    employer.relationship_hints.clear();

    let engine = ResolutionEngine::new(ResolutionConfig::default());
    let outcome = engine.resolve_batch(vec![employer, employee], Utc::now());

    assert_eq!(outcome.result.resolved.len(), 2);
    let edge = outcome
        .result
        .relationships
        .iter()
        .find(|e| e.relationship == "employed_by")
        .expect("relationship edge present");
    assert!(edge.resolved, "expected Acme Corporation to resolve, got {:?}", edge);
}

#[test]
fn ambiguous_pair_lands_in_review_queue_not_auto_merged() {
    let candidates = vec![
        candidate("a", "Acme Corporation", "123 Main Street", "12-3456789", 0.8),
        candidate("b", "Acme Holdings", "456 Side Avenue", "55-5555555", 0.7),
    ];
    let config = ResolutionConfig {
        merge_threshold: 0.85,
        review_threshold: 0.20,
        ..Default::default()
    };
    let engine = ResolutionEngine::new(config);
    let outcome = engine.resolve_batch(candidates, Utc::now());

    assert_eq!(outcome.result.resolved.len(), 2);
    assert!(!outcome.result.review_queue.is_empty());
}
