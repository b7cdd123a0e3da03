//! Pipeline orchestration: validate the configuration, gather sitemap
//! candidates when the source mode asks for them, then run every strategy
//! stage in order and validate the assembled document.

use chrono::Utc;
use tracing::{info, instrument};

use stratbuilder_shared::{
    BrandConfig, CURRENT_SCHEMA_VERSION, CandidateEntity, FrameworkOutput, Result, StageDefaults,
    StrategySummary,
};
use stratbuilder_sitemap::SitemapOptions;

use crate::{expansion, hubs, integrity, measurement, ontology, queries, specs, taxonomy};

/// Progress callbacks for long-running pipeline runs. The CLI renders
/// these on a spinner; library callers can pass [`SilentProgress`].
pub trait StageReporter {
    /// A named stage is starting.
    fn stage(&self, name: &str);
    /// The pipeline finished; the summary is final.
    fn done(&self, summary: &StrategySummary);
}

/// A reporter that swallows all progress events.
pub struct SilentProgress;

impl StageReporter for SilentProgress {
    fn stage(&self, _name: &str) {}
    fn done(&self, _summary: &StrategySummary) {}
}

/// Runtime options for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Timeout for sitemap fetches in seconds.
    pub sitemap_timeout_secs: u64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            sitemap_timeout_secs: 30,
        }
    }
}

/// Run the full pipeline for one brand configuration.
///
/// The only async step is the sitemap fetch; everything downstream is
/// [`assemble`], which is pure and deterministic apart from the
/// `generated_at` timestamp.
#[instrument(skip_all, fields(brand = %config.brand_name, mode = ?config.source_mode))]
pub async fn run(
    config: &BrandConfig,
    opts: &PipelineOptions,
    progress: &dyn StageReporter,
) -> Result<FrameworkOutput> {
    progress.stage("Validating configuration");
    config.validate()?;
    StageDefaults::standard().validate()?;

    let candidates = if config.source_mode.uses_sitemap() {
        progress.stage("Fetching sitemap");
        let url = config.sitemap_url.as_deref().unwrap_or_default();
        let sitemap_opts = SitemapOptions {
            timeout_secs: opts.sitemap_timeout_secs,
        };
        stratbuilder_sitemap::extract_candidates(url, &sitemap_opts).await?
    } else {
        Vec::new()
    };

    progress.stage("Building strategy");
    let output = assemble(config, &candidates)?;
    progress.done(&output.summary);

    Ok(output)
}

/// Run every strategy stage over a validated configuration and candidate
/// set, then check referential integrity of the result.
pub fn assemble(config: &BrandConfig, candidates: &[CandidateEntity]) -> Result<FrameworkOutput> {
    let defaults = StageDefaults::standard();

    let ontology = ontology::build(config, candidates)?;
    let ontology = expansion::expand_all_entities(ontology, config);
    let taxonomy = taxonomy::build(&ontology)?;
    let query_clusters = queries::map_all_entities(&taxonomy, &ontology, &defaults.fanout_patterns)?;
    let hubs = hubs::design_all_hubs(&taxonomy, &query_clusters)?;
    let (personas, content_specs) =
        specs::generate_all_specs(&hubs, &query_clusters, config, &defaults);
    let measurement =
        measurement::create_measurement_plan(config, &ontology, &query_clusters, &defaults);

    let summary = StrategySummary {
        total_entities: ontology.entities.len(),
        total_relationships: ontology.relationships.len(),
        taxonomy_nodes: taxonomy.nodes.len(),
        query_clusters: query_clusters.len(),
        total_queries: query_clusters.iter().map(|c| c.queries.len()).sum(),
        content_hubs: hubs.len(),
        hub_pages: hubs.iter().map(|h| 1 + h.clusters.len()).sum(),
        content_specs: content_specs.len(),
        personas: personas.len(),
        kpis: measurement.kpis.len(),
    };

    let output = FrameworkOutput {
        schema_version: CURRENT_SCHEMA_VERSION,
        brand_name: config.brand_name.trim().to_string(),
        primary_niche: config.primary_niche.trim().to_string(),
        generated_at: Utc::now(),
        ontology,
        taxonomy,
        query_clusters,
        hubs,
        personas,
        content_specs,
        measurement,
        summary,
    };

    integrity::validate_output(&output)?;

    info!(
        entities = output.summary.total_entities,
        queries = output.summary.total_queries,
        pages = output.summary.hub_pages,
        "strategy assembled"
    );

    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use stratbuilder_shared::{BusinessGoal, SourceMode, StratBuilderError};

    fn seed_config(seeds: &[&str]) -> BrandConfig {
        BrandConfig {
            brand_name: "Acme".into(),
            primary_niche: "widget automation".into(),
            business_goals: vec![BusinessGoal::BrandAwareness],
            source_mode: SourceMode::Seed,
            sitemap_url: None,
            seed_entities: seeds.iter().map(|s| s.to_string()).collect(),
            competitors: vec![],
            target_regions: vec!["US".into()],
        }
    }

    #[test]
    fn two_seeds_yield_exactly_two_entities() {
        let output = assemble(&seed_config(&["Widget Tools", "Widget Platform"]), &[]).expect("assemble");

        assert_eq!(output.summary.total_entities, 2);
        assert!(output.summary.total_relationships >= 1);
        assert_eq!(output.summary.content_hubs, 1);
        assert_eq!(output.schema_version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn sitemap_candidates_feed_the_ontology() {
        let mut config = seed_config(&[]);
        config.source_mode = SourceMode::Sitemap;
        config.sitemap_url = Some("https://example.com/sitemap.xml".into());

        let candidates = vec![
            CandidateEntity {
                name: "Content Marketing".into(),
                frequency: 3,
                source_urls: vec!["https://example.com/blog/content-marketing".into()],
            },
            CandidateEntity {
                name: "Guest Posting".into(),
                frequency: 1,
                source_urls: vec!["https://example.com/blog/guest-posting".into()],
            },
        ];

        let output = assemble(&config, &candidates).expect("assemble");
        assert_eq!(output.summary.total_entities, 2);
        assert!(
            output
                .ontology
                .entities
                .iter()
                .any(|e| !e.source_urls.is_empty())
        );
    }

    #[test]
    fn every_query_appears_in_exactly_one_cluster() {
        let output = assemble(&seed_config(&["Widgets", "Gadgets", "Gizmos"]), &[])
            .expect("assemble");

        let mut ids: Vec<&str> = output.queries().map(|q| q.id.as_str()).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(total, output.summary.total_queries);
    }

    #[test]
    fn assembly_is_idempotent_apart_from_timestamp() {
        let config = seed_config(&["Email Marketing", "Email Automation", "Newsletters"]);

        let mut a = serde_json::to_value(assemble(&config, &[]).expect("first")).unwrap();
        let mut b = serde_json::to_value(assemble(&config, &[]).expect("second")).unwrap();

        a.as_object_mut().unwrap().remove("generated_at");
        b.as_object_mut().unwrap().remove("generated_at");
        assert_eq!(a, b);
    }

    #[test]
    fn summary_counts_match_document_contents() {
        let mut config = seed_config(&["Widgets", "Gadgets"]);
        config.competitors = vec!["Rivalcorp".into()];

        let output = assemble(&config, &[]).expect("assemble");
        let s = &output.summary;

        assert_eq!(s.total_entities, output.ontology.entities.len());
        assert_eq!(s.total_relationships, output.ontology.relationships.len());
        assert_eq!(s.taxonomy_nodes, output.taxonomy.nodes.len());
        assert_eq!(s.query_clusters, output.query_clusters.len());
        assert_eq!(s.total_queries, output.queries().count());
        assert_eq!(s.content_hubs, output.hubs.len());
        assert_eq!(s.hub_pages, output.hub_pages().count());
        assert_eq!(s.content_specs, output.content_specs.len());
        assert_eq!(s.personas, output.personas.len());
        assert_eq!(s.kpis, output.measurement.kpis.len());
    }

    #[tokio::test]
    async fn run_rejects_invalid_configuration() {
        let mut config = seed_config(&["Widgets"]);
        config.sitemap_url = Some("https://example.com/sitemap.xml".into());

        let err = run(&config, &PipelineOptions::default(), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, StratBuilderError::Configuration { .. }));
    }

    #[tokio::test]
    async fn run_in_seed_mode_skips_the_network() {
        let config = seed_config(&["Widgets"]);
        let output = run(&config, &PipelineOptions::default(), &SilentProgress)
            .await
            .expect("run");
        assert_eq!(output.summary.total_entities, 1);
    }
}
