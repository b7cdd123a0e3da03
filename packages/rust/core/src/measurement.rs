//! Measurement planning: goal-filtered KPIs, a monitoring query list, and
//! fixed audit prompts for probing AI systems about the brand.

use tracing::{info, instrument};

use stratbuilder_shared::{
    AuditPrompt, BrandConfig, Entity, Kpi, MeasurementPlan, Ontology, Query, QueryCluster,
    StageDefaults,
};

/// Entities at or above this commercial value get a monitoring query.
const MONITORING_VALUE_THRESHOLD: f64 = 0.5;

/// Hard cap on the monitoring query list.
const MONITORING_CAP: usize = 50;

/// How many top-centrality entities get an audit prompt.
const TOP_ENTITY_COUNT: usize = 3;

/// Assemble the measurement plan for a strategy.
///
/// KPIs come from the catalog filtered by the configured goals
/// (goal-agnostic entries always pass). Monitoring picks the single
/// highest-priority query of each commercially valuable entity, in
/// ontology order, capped at [`MONITORING_CAP`].
#[instrument(skip_all, fields(brand = %config.brand_name))]
pub fn create_measurement_plan(
    config: &BrandConfig,
    ontology: &Ontology,
    clusters: &[QueryCluster],
    defaults: &StageDefaults,
) -> MeasurementPlan {
    let kpis: Vec<Kpi> = defaults
        .kpi_catalog
        .iter()
        .filter(|k| {
            k.relevant_goals.is_empty()
                || k.relevant_goals.iter().any(|g| config.business_goals.contains(g))
        })
        .map(|k| Kpi {
            name: k.name.clone(),
            description: k.description.clone(),
            measurement_method: k.measurement_method.clone(),
            refresh_cadence: k.refresh_cadence.clone(),
            priority: k.priority,
        })
        .collect();

    let monitoring_query_ids = monitoring_queries(ontology, clusters);
    let audit_prompts = audit_prompts(config, ontology);

    info!(
        kpis = kpis.len(),
        monitoring = monitoring_query_ids.len(),
        prompts = audit_prompts.len(),
        "measurement plan created"
    );

    MeasurementPlan {
        kpis,
        monitoring_query_ids,
        audit_prompts,
    }
}

/// One query id per commercially valuable entity: its highest-priority
/// query, earlier generation position breaking ties.
fn monitoring_queries(ontology: &Ontology, clusters: &[QueryCluster]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();

    for entity in &ontology.entities {
        if entity.commercial_value < MONITORING_VALUE_THRESHOLD {
            continue;
        }
        if ids.len() >= MONITORING_CAP {
            break;
        }

        let best: Option<&Query> = clusters
            .iter()
            .flat_map(|c| c.queries.iter())
            .filter(|q| q.entity_id == entity.id)
            .min_by_key(|q| q.priority.rank());

        if let Some(query) = best {
            ids.push(query.id.clone());
        }
    }

    ids
}

/// Fixed brand audit prompts plus one coverage prompt per top entity.
fn audit_prompts(config: &BrandConfig, ontology: &Ontology) -> Vec<AuditPrompt> {
    let brand = config.brand_name.trim();
    let niche = config.primary_niche.trim();

    let mut prompts = vec![
        AuditPrompt {
            category: "brand_recognition".into(),
            prompt: format!("What do you know about {brand}?"),
            check_for: "Accurate description matching intended positioning".into(),
        },
        AuditPrompt {
            category: "brand_recommendation".into(),
            prompt: format!("What are the best options for {niche}?"),
            check_for: format!("{brand} appears among recommendations"),
        },
        AuditPrompt {
            category: "brand_comparison".into(),
            prompt: format!("How does {brand} compare to alternatives in {niche}?"),
            check_for: "Fair comparison citing real differentiators".into(),
        },
        AuditPrompt {
            category: "brand_sentiment".into(),
            prompt: format!("What do people say about {brand}?"),
            check_for: "Balanced sentiment without fabricated criticism".into(),
        },
        AuditPrompt {
            category: "brand_facts".into(),
            prompt: format!("List key facts about {brand} in {niche}"),
            check_for: "No hallucinated products, pricing, or history".into(),
        },
    ];

    for entity in top_entities(ontology) {
        prompts.push(AuditPrompt {
            category: "entity_coverage".into(),
            prompt: format!("Explain {} and name leading resources on it", entity.name),
            check_for: format!("{brand} content is cited for {}", entity.name),
        });
    }

    prompts
}

/// Top entities by centrality, input order breaking ties.
fn top_entities(ontology: &Ontology) -> Vec<&Entity> {
    let mut indexed: Vec<(usize, &Entity)> = ontology.entities.iter().enumerate().collect();
    // Stable sort: equal centrality keeps input order
    indexed.sort_by(|(_, a), (_, b)| {
        b.centrality
            .partial_cmp(&a.centrality)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indexed
        .into_iter()
        .take(TOP_ENTITY_COUNT)
        .map(|(_, e)| e)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
