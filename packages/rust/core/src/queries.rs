//! Query fan-out: instantiate every pattern for every entity, dedup
//! per entity, and group the results into (taxonomy node, intent)
//! clusters.

use tracing::{info, instrument, warn};

use stratbuilder_shared::{
    FanoutPattern, Intent, Ontology, Query, QueryCluster, Result, StratBuilderError, Taxonomy,
    stable_id,
};

/// Generate the full query set and cluster it.
///
/// Entities iterate in ontology order and patterns in catalog order, so
/// query and cluster ordering is deterministic. Within one entity,
/// queries whose texts collide case-insensitively keep only the
/// higher-priority pattern (first pattern wins ties). Clusters appear in
/// the order their first query was produced.
#[instrument(skip_all, fields(entities = ontology.entities.len(), patterns = patterns.len()))]
pub fn map_all_entities(
    taxonomy: &Taxonomy,
    ontology: &Ontology,
    patterns: &[FanoutPattern],
) -> Result<Vec<QueryCluster>> {
    let mut clusters: Vec<QueryCluster> = Vec::new();

    for entity in &ontology.entities {
        let Some(node) = taxonomy
            .nodes
            .iter()
            .find(|n| n.entity_ids.contains(&entity.id))
        else {
            // Taxonomy construction gives every entity a home; a miss here
            // means the inputs are from different runs.
            warn!(entity = %entity.name, "entity has no taxonomy node, skipped");
            continue;
        };

        for query in entity_queries(entity.id.as_str(), &entity.name, patterns) {
            let cluster_id = stable_id("cluster", &format!("{}:{}", node.id, query.intent.key()));

            match clusters.iter_mut().find(|c| c.id == cluster_id) {
                Some(cluster) => cluster.queries.push(query),
                None => clusters.push(QueryCluster {
                    id: cluster_id,
                    taxonomy_node_id: node.id.clone(),
                    intent: query.intent,
                    queries: vec![query],
                }),
            }
        }
    }

    if clusters.is_empty() {
        return Err(StratBuilderError::EmptyOntology);
    }

    let total: usize = clusters.iter().map(|c| c.queries.len()).sum();
    info!(clusters = clusters.len(), queries = total, "queries mapped");

    Ok(clusters)
}

/// Instantiate every pattern for one entity, deduplicating collisions.
fn entity_queries(entity_id: &str, entity_name: &str, patterns: &[FanoutPattern]) -> Vec<Query> {
    let name_lower = entity_name.to_lowercase();
    let mut queries: Vec<Query> = Vec::new();

    for pattern in patterns {
        let text = pattern.template.replace("{entity}", &name_lower);
        let key = text.to_lowercase();

        if let Some(existing) = queries.iter_mut().find(|q| q.text.to_lowercase() == key) {
            // Same text from two patterns: the higher-priority pattern wins,
            // earlier catalog position breaking ties
            if pattern.priority.rank() < existing.priority.rank() {
                *existing = make_query(entity_id, &text, pattern);
            }
            continue;
        }

        queries.push(make_query(entity_id, &text, pattern));
    }

    queries
}

fn make_query(entity_id: &str, text: &str, pattern: &FanoutPattern) -> Query {
    Query {
        id: stable_id("q", &format!("{entity_id}:{}", pattern.name)),
        text: text.to_string(),
        entity_id: entity_id.to_string(),
        intent: pattern.intent,
        priority: pattern.priority,
        fanout_pattern: pattern.name.clone(),
        estimated_serp_feature: Some(pattern.intent.serp_feature().to_string()),
    }
}

// ---------------------------------------------------------------------------
// Intent coverage
// ---------------------------------------------------------------------------

/// Intent coverage report: overall and per-entity fraction of the intent
/// vocabulary that the generated queries touch.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentCoverage {
    /// Fraction of all intents covered by at least one query.
    pub overall: f64,
    /// (entity id, fraction of intents covered for that entity),
    /// in first-query order.
    pub per_entity: Vec<(String, f64)>,
}

/// Compute intent coverage over a clustered query set.
pub fn intent_coverage(clusters: &[QueryCluster]) -> IntentCoverage {
    let total = Intent::ALL.len() as f64;

    let mut overall: Vec<Intent> = Vec::new();
    let mut per_entity: Vec<(String, Vec<Intent>)> = Vec::new();

    for query in clusters.iter().flat_map(|c| c.queries.iter()) {
        if !overall.contains(&query.intent) {
            overall.push(query.intent);
        }
        match per_entity.iter_mut().find(|(id, _)| id == &query.entity_id) {
            Some((_, intents)) => {
                if !intents.contains(&query.intent) {
                    intents.push(query.intent);
                }
            }
            None => per_entity.push((query.entity_id.clone(), vec![query.intent])),
        }
    }

    IntentCoverage {
        overall: overall.len() as f64 / total,
        per_entity: per_entity
            .into_iter()
            .map(|(id, intents)| (id, intents.len() as f64 / total))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use stratbuilder_shared::{
        BrandConfig, BusinessGoal, Priority, SourceMode, fanout_patterns,
    };

    fn seed_config(seeds: &[&str]) -> BrandConfig {
        BrandConfig {
            brand_name: "Acme".into(),
            primary_niche: "widgets".into(),
            business_goals: vec![BusinessGoal::BrandAwareness],
            source_mode: SourceMode::Seed,
            sitemap_url: None,
            seed_entities: seeds.iter().map(|s| s.to_string()).collect(),
            competitors: vec![],
            target_regions: vec!["US".into()],
        }
    }

    fn pipeline_inputs(seeds: &[&str]) -> (Taxonomy, Ontology) {
        let ontology = crate::ontology::build(&seed_config(seeds), &[]).expect("ontology");
        let taxonomy = crate::taxonomy::build(&ontology).expect("taxonomy");
        (taxonomy, ontology)
    }

    #[test]
    fn every_entity_gets_one_query_per_pattern() {
        let (taxonomy, ontology) = pipeline_inputs(&["Widgets", "Gadgets"]);
        let clusters = map_all_entities(&taxonomy, &ontology, &fanout_patterns()).expect("map");

        let total: usize = clusters.iter().map(|c| c.queries.len()).sum();
        assert_eq!(total, 2 * fanout_patterns().len());
    }

    #[test]
    fn query_text_lowercases_entity_name() {
        let (taxonomy, ontology) = pipeline_inputs(&["Email Marketing"]);
        let clusters = map_all_entities(&taxonomy, &ontology, &fanout_patterns()).expect("map");

        let texts: Vec<&str> = clusters
            .iter()
            .flat_map(|c| c.queries.iter())
            .map(|q| q.text.as_str())
            .collect();
        assert!(texts.contains(&"what is email marketing"));
        assert!(texts.contains(&"email marketing best practices"));
    }

    #[test]
    fn clusters_are_homogeneous_in_intent() {
        let (taxonomy, ontology) = pipeline_inputs(&["Widgets", "Gadgets"]);
        let clusters = map_all_entities(&taxonomy, &ontology, &fanout_patterns()).expect("map");

        for cluster in &clusters {
            assert!(cluster.queries.iter().all(|q| q.intent == cluster.intent));
        }
    }

    #[test]
    fn colliding_texts_keep_the_higher_priority_pattern() {
        let patterns = vec![
            FanoutPattern {
                name: "low".into(),
                template: "{entity} overview".into(),
                intent: Intent::Informational,
                priority: Priority::Medium,
            },
            FanoutPattern {
                name: "high".into(),
                template: "{entity} OVERVIEW".into(),
                intent: Intent::Informational,
                priority: Priority::Critical,
            },
        ];

        let (taxonomy, ontology) = pipeline_inputs(&["Widgets"]);
        let clusters = map_all_entities(&taxonomy, &ontology, &patterns).expect("map");

        let queries: Vec<&Query> = clusters.iter().flat_map(|c| c.queries.iter()).collect();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].fanout_pattern, "high");
        assert_eq!(queries[0].priority, Priority::Critical);
    }

    #[test]
    fn query_ids_are_stable_across_runs() {
        let (taxonomy, ontology) = pipeline_inputs(&["Widgets"]);
        let a = map_all_entities(&taxonomy, &ontology, &fanout_patterns()).expect("first");
        let b = map_all_entities(&taxonomy, &ontology, &fanout_patterns()).expect("second");
        assert_eq!(a, b);
    }

    #[test]
    fn serp_feature_follows_intent() {
        let (taxonomy, ontology) = pipeline_inputs(&["Widgets"]);
        let clusters = map_all_entities(&taxonomy, &ontology, &fanout_patterns()).expect("map");

        for query in clusters.iter().flat_map(|c| c.queries.iter()) {
            assert_eq!(
                query.estimated_serp_feature.as_deref(),
                Some(query.intent.serp_feature())
            );
        }
    }

    #[test]
    fn intent_coverage_counts_distinct_intents() {
        let (taxonomy, ontology) = pipeline_inputs(&["Widgets"]);
        let clusters = map_all_entities(&taxonomy, &ontology, &fanout_patterns()).expect("map");

        let coverage = intent_coverage(&clusters);
        // Standard patterns cover informational, commercial, transactional
        assert!((coverage.overall - 0.6).abs() < 1e-9);
        assert_eq!(coverage.per_entity.len(), 1);
        assert!((coverage.per_entity[0].1 - 0.6).abs() < 1e-9);
    }
}
