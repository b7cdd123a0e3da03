//! Hub design: one content hub per taxonomy root, a pillar page plus one
//! cluster page per owned query cluster, with internal link wiring and a
//! subtree coverage score.

use tracing::{info, instrument};

use stratbuilder_shared::{
    ContentHub, HubPage, HubRole, Intent, Priority, QueryCluster, Result, Taxonomy, TaxonomyNode,
    stable_id,
};

/// Hubs whose coverage score falls below this are flagged by the gap
/// suggester.
const COVERAGE_GAP_THRESHOLD: f64 = 0.5;

/// Design one content hub per taxonomy root.
///
/// A hub owns the query clusters whose node sits in the root's subtree
/// (the root and its direct children). Cluster pages link back to the
/// pillar and across to sibling clusters that share an entity; the pillar
/// links down to every cluster page and carries the top query of each
/// owned cluster.
#[instrument(skip_all, fields(clusters = clusters.len()))]
pub fn design_all_hubs(taxonomy: &Taxonomy, clusters: &[QueryCluster]) -> Result<Vec<ContentHub>> {
    let mut hubs: Vec<ContentHub> = Vec::new();

    for root in taxonomy.roots() {
        let hub_id = stable_id("hub", &root.id);

        let subtree: Vec<&TaxonomyNode> = std::iter::once(root)
            .chain(taxonomy.children(&root.id))
            .collect();
        let subtree_ids: Vec<&str> = subtree.iter().map(|n| n.id.as_str()).collect();
        let subtree_entities: Vec<&str> = subtree
            .iter()
            .flat_map(|n| n.entity_ids.iter().map(String::as_str))
            .collect();

        let owned: Vec<&QueryCluster> = clusters
            .iter()
            .filter(|c| subtree_ids.contains(&c.taxonomy_node_id.as_str()))
            .collect();

        let cluster_pages = cluster_pages(&hub_id, taxonomy, &owned);
        let pillar = pillar_page(&hub_id, root, &owned, &cluster_pages);

        let coverage_score = coverage(&subtree_entities, &owned);

        hubs.push(ContentHub {
            id: hub_id,
            name: root.label.clone(),
            pillar,
            clusters: cluster_pages,
            coverage_score,
        });
    }

    let pages: usize = hubs.iter().map(|h| 1 + h.clusters.len()).sum();
    info!(hubs = hubs.len(), pages, "hubs designed");

    Ok(hubs)
}

/// Build the pillar page for one hub.
fn pillar_page(
    hub_id: &str,
    root: &TaxonomyNode,
    owned: &[&QueryCluster],
    cluster_pages: &[HubPage],
) -> HubPage {
    // The pillar carries the top query of each owned cluster
    let linked_query_ids: Vec<String> = owned
        .iter()
        .filter_map(|c| top_query(c))
        .map(|q| q.id.clone())
        .collect();

    HubPage {
        id: format!("{hub_id}-pillar"),
        title: format!("Complete Guide to {}", root.label),
        role: HubRole::Pillar,
        taxonomy_node_id: root.id.clone(),
        linked_query_ids,
        linked_hub_ids: cluster_pages.iter().map(|p| p.id.clone()).collect(),
        recommended_format: "long_form_guide".to_string(),
        priority: Priority::Critical,
    }
}

/// Build one cluster page per owned query cluster, in cluster order.
fn cluster_pages(hub_id: &str, taxonomy: &Taxonomy, owned: &[&QueryCluster]) -> Vec<HubPage> {
    let mut pages: Vec<HubPage> = Vec::new();

    for (n, cluster) in owned.iter().enumerate() {
        let label = taxonomy
            .node(&cluster.taxonomy_node_id)
            .map(|node| node.label.clone())
            .unwrap_or_else(|| cluster.taxonomy_node_id.clone());

        let priority = cluster
            .queries
            .iter()
            .map(|q| q.priority)
            .min_by_key(|p| p.rank())
            .unwrap_or(Priority::Medium);

        pages.push(HubPage {
            id: format!("{hub_id}-cluster-{}", n + 1),
            title: cluster_title(&label, cluster.intent),
            role: HubRole::Cluster,
            taxonomy_node_id: cluster.taxonomy_node_id.clone(),
            linked_query_ids: cluster.queries.iter().map(|q| q.id.clone()).collect(),
            linked_hub_ids: vec![],
            recommended_format: format_for_intent(cluster.intent).to_string(),
            priority,
        });
    }

    // Second pass: link each cluster page to the pillar and to sibling
    // clusters sharing at least one entity
    let entity_sets: Vec<Vec<&str>> = owned
        .iter()
        .map(|c| c.queries.iter().map(|q| q.entity_id.as_str()).collect())
        .collect();

    for i in 0..pages.len() {
        let mut linked = vec![format!("{hub_id}-pillar")];
        for j in 0..pages.len() {
            if i != j && entity_sets[i].iter().any(|e| entity_sets[j].contains(e)) {
                linked.push(pages[j].id.clone());
            }
        }
        pages[i].linked_hub_ids = linked;
    }

    pages
}

/// Highest-priority query in a cluster, earlier position breaking ties.
fn top_query(cluster: &QueryCluster) -> Option<&stratbuilder_shared::Query> {
    cluster.queries.iter().min_by_key(|q| q.priority.rank())
}

/// Working title for a cluster page.
fn cluster_title(node_label: &str, intent: Intent) -> String {
    let angle = match intent {
        Intent::Informational => "Explained",
        Intent::Navigational => "Resources",
        Intent::Commercial => "Compared",
        Intent::Transactional => "Buying Guide",
        Intent::Local => "Near You",
    };
    format!("{node_label}: {angle}")
}

/// Recommended content format for a cluster page by intent.
fn format_for_intent(intent: Intent) -> &'static str {
    match intent {
        Intent::Informational => "long_form_guide",
        Intent::Commercial => "comparison_table",
        Intent::Transactional => "product_review",
        Intent::Navigational | Intent::Local => "faq_page",
    }
}

/// Fraction of the subtree's entities addressed by at least one owned
/// query. Zero when the subtree holds no entities.
fn coverage(subtree_entities: &[&str], owned: &[&QueryCluster]) -> f64 {
    if subtree_entities.is_empty() {
        return 0.0;
    }

    let covered = subtree_entities
        .iter()
        .filter(|e| {
            owned
                .iter()
                .flat_map(|c| c.queries.iter())
                .any(|q| q.entity_id == **e)
        })
        .count();

    covered as f64 / subtree_entities.len() as f64
}

// ---------------------------------------------------------------------------
// Gap suggestions
// ---------------------------------------------------------------------------

/// Report taxonomy nodes no hub page covers and hubs whose coverage falls
/// below the gap threshold. Advisory text, never auto-created pages.
pub fn suggest_content_gaps(taxonomy: &Taxonomy, hubs: &[ContentHub]) -> Vec<String> {
    let mut gaps: Vec<String> = Vec::new();

    let covered_nodes: Vec<&str> = hubs
        .iter()
        .flat_map(|h| std::iter::once(&h.pillar).chain(h.clusters.iter()))
        .map(|p| p.taxonomy_node_id.as_str())
        .collect();

    for node in &taxonomy.nodes {
        if !covered_nodes.contains(&node.id.as_str()) {
            gaps.push(format!("no hub page covers taxonomy node '{}'", node.label));
        }
    }

    for hub in hubs {
        if hub.coverage_score < COVERAGE_GAP_THRESHOLD {
            gaps.push(format!(
                "hub '{}' covers only {:.0}% of its subtree entities",
                hub.name,
                hub.coverage_score * 100.0
            ));
        }
    }

    gaps
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use stratbuilder_shared::{
        BrandConfig, BusinessGoal, Ontology, SourceMode, fanout_patterns,
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

    fn pipeline_inputs(seeds: &[&str]) -> (Taxonomy, Vec<QueryCluster>, Ontology) {
        let ontology = crate::ontology::build(&seed_config(seeds), &[]).expect("ontology");
        let taxonomy = crate::taxonomy::build(&ontology).expect("taxonomy");
        let clusters =
            crate::queries::map_all_entities(&taxonomy, &ontology, &fanout_patterns())
                .expect("queries");
        (taxonomy, clusters, ontology)
    }

    #[test]
    fn one_hub_per_root_with_a_pillar() {
        let (taxonomy, clusters, _) = pipeline_inputs(&["Widgets", "Gadgets"]);
        let hubs = design_all_hubs(&taxonomy, &clusters).expect("hubs");

        assert_eq!(hubs.len(), taxonomy.roots().count());
        for hub in &hubs {
            assert_eq!(hub.pillar.role, HubRole::Pillar);
            assert_eq!(hub.pillar.priority, Priority::Critical);
            assert!(hub.pillar.title.starts_with("Complete Guide to "));
        }
    }

    #[test]
    fn pillar_links_every_cluster_page() {
        let (taxonomy, clusters, _) = pipeline_inputs(&["Widgets", "Gadgets"]);
        let hubs = design_all_hubs(&taxonomy, &clusters).expect("hubs");

        for hub in &hubs {
            let page_ids: Vec<&str> = hub.clusters.iter().map(|p| p.id.as_str()).collect();
            assert_eq!(
                hub.pillar.linked_hub_ids,
                page_ids.iter().map(|s| s.to_string()).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn cluster_pages_link_back_to_pillar() {
        let (taxonomy, clusters, _) = pipeline_inputs(&["Widgets", "Gadgets"]);
        let hubs = design_all_hubs(&taxonomy, &clusters).expect("hubs");

        for hub in &hubs {
            for page in &hub.clusters {
                assert_eq!(page.role, HubRole::Cluster);
                assert!(page.linked_hub_ids.contains(&hub.pillar.id));
            }
        }
    }

    #[test]
    fn sibling_clusters_sharing_entities_interlink() {
        // One entity produces informational and commercial clusters on the
        // same node, both covering that entity
        let (taxonomy, clusters, _) = pipeline_inputs(&["Widgets"]);
        let hubs = design_all_hubs(&taxonomy, &clusters).expect("hubs");

        let hub = &hubs[0];
        assert!(hub.clusters.len() >= 2);
        for page in &hub.clusters {
            let siblings: Vec<&String> = page
                .linked_hub_ids
                .iter()
                .filter(|id| id.as_str() != hub.pillar.id)
                .collect();
            assert_eq!(siblings.len(), hub.clusters.len() - 1);
        }
    }

    #[test]
    fn full_query_coverage_scores_one() {
        let (taxonomy, clusters, _) = pipeline_inputs(&["Widgets", "Gadgets"]);
        let hubs = design_all_hubs(&taxonomy, &clusters).expect("hubs");
        assert!((hubs[0].coverage_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cluster_page_format_follows_intent() {
        let (taxonomy, clusters, _) = pipeline_inputs(&["Widgets"]);
        let hubs = design_all_hubs(&taxonomy, &clusters).expect("hubs");

        for (page, cluster) in hubs[0].clusters.iter().zip(&clusters) {
            assert_eq!(page.recommended_format, format_for_intent(cluster.intent));
        }
    }

    #[test]
    fn no_clusters_yields_empty_pillar_links_and_a_gap() {
        let (taxonomy, _, _) = pipeline_inputs(&["Widgets"]);
        let hubs = design_all_hubs(&taxonomy, &[]).expect("hubs");

        assert_eq!(hubs.len(), 1);
        assert!(hubs[0].clusters.is_empty());
        assert!(hubs[0].pillar.linked_query_ids.is_empty());
        assert_eq!(hubs[0].coverage_score, 0.0);

        let gaps = suggest_content_gaps(&taxonomy, &hubs);
        assert!(gaps.iter().any(|g| g.contains("covers only 0%")));
    }

    #[test]
    fn uncovered_node_is_reported() {
        let (taxonomy, clusters, _) = pipeline_inputs(&["Widgets"]);
        let hubs = design_all_hubs(&taxonomy, &clusters).expect("hubs");

        let mut extended = taxonomy.clone();
        extended.nodes.push(stratbuilder_shared::TaxonomyNode {
            id: "node-orphan".into(),
            label: "Orphan Topics".into(),
            parent_id: None,
            entity_ids: vec![],
            facet_tags: vec![],
        });

        let gaps = suggest_content_gaps(&extended, &hubs);
        assert!(gaps.iter().any(|g| g.contains("Orphan Topics")));
    }
}
