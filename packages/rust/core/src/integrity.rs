//! Referential integrity validation of an assembled strategy document.
//!
//! Runs once, after assembly and before the document is returned or
//! exported. Every cross-reference by id must resolve; the first dangling
//! reference found fails the whole document.

use std::collections::HashSet;

use tracing::instrument;

use stratbuilder_shared::{FrameworkOutput, Result, StratBuilderError};

/// Validate every id cross-reference in the document.
#[instrument(skip_all, fields(brand = %output.brand_name))]
pub fn validate_output(output: &FrameworkOutput) -> Result<()> {
    let entity_ids: HashSet<&str> = output
        .ontology
        .entities
        .iter()
        .map(|e| e.id.as_str())
        .collect();
    let node_ids: HashSet<&str> = output
        .taxonomy
        .nodes
        .iter()
        .map(|n| n.id.as_str())
        .collect();
    let query_ids: HashSet<&str> = output.queries().map(|q| q.id.as_str()).collect();
    let page_ids: HashSet<&str> = output.hub_pages().map(|p| p.id.as_str()).collect();

    check_relationships(output, &entity_ids)?;
    check_taxonomy(output, &entity_ids, &node_ids)?;
    check_clusters(output, &entity_ids, &node_ids)?;
    check_hub_pages(output, &node_ids, &query_ids, &page_ids)?;
    check_specs(output, &page_ids)?;
    check_measurement(output, &query_ids)?;

    Ok(())
}

fn check_relationships(output: &FrameworkOutput, entity_ids: &HashSet<&str>) -> Result<()> {
    for rel in &output.ontology.relationships {
        if !entity_ids.contains(rel.source_id.as_str()) {
            return Err(dangling("relationship source", &rel.source_id));
        }
        if !entity_ids.contains(rel.target_id.as_str()) {
            return Err(dangling("relationship target", &rel.target_id));
        }
        if rel.source_id == rel.target_id {
            return Err(StratBuilderError::integrity(format!(
                "relationship self-loop on entity '{}'",
                rel.source_id
            )));
        }
    }
    Ok(())
}

fn check_taxonomy(
    output: &FrameworkOutput,
    entity_ids: &HashSet<&str>,
    node_ids: &HashSet<&str>,
) -> Result<()> {
    for node in &output.taxonomy.nodes {
        if let Some(parent) = &node.parent_id {
            if !node_ids.contains(parent.as_str()) {
                return Err(dangling("taxonomy parent", parent));
            }
        }
        for id in &node.entity_ids {
            if !entity_ids.contains(id.as_str()) {
                return Err(dangling("taxonomy entity", id));
            }
        }

        // Walk to the root; revisiting a node means a parent cycle
        let mut visited: Vec<&str> = vec![node.id.as_str()];
        let mut current = node;
        while let Some(parent_id) = &current.parent_id {
            if visited.contains(&parent_id.as_str()) {
                return Err(StratBuilderError::integrity(format!(
                    "taxonomy parent cycle through node '{}'",
                    node.id
                )));
            }
            visited.push(parent_id.as_str());
            match output.taxonomy.node(parent_id) {
                Some(parent) => current = parent,
                None => break,
            }
        }
    }

    for link in &output.taxonomy.links {
        if !node_ids.contains(link.source_node_id.as_str()) {
            return Err(dangling("taxonomy link source", &link.source_node_id));
        }
        if !node_ids.contains(link.target_node_id.as_str()) {
            return Err(dangling("taxonomy link target", &link.target_node_id));
        }
    }

    Ok(())
}

fn check_clusters(
    output: &FrameworkOutput,
    entity_ids: &HashSet<&str>,
    node_ids: &HashSet<&str>,
) -> Result<()> {
    for cluster in &output.query_clusters {
        if !node_ids.contains(cluster.taxonomy_node_id.as_str()) {
            return Err(dangling("query cluster node", &cluster.taxonomy_node_id));
        }
        for query in &cluster.queries {
            if !entity_ids.contains(query.entity_id.as_str()) {
                return Err(dangling("query entity", &query.entity_id));
            }
        }
    }
    Ok(())
}

fn check_hub_pages(
    output: &FrameworkOutput,
    node_ids: &HashSet<&str>,
    query_ids: &HashSet<&str>,
    page_ids: &HashSet<&str>,
) -> Result<()> {
    for page in output.hub_pages() {
        if !node_ids.contains(page.taxonomy_node_id.as_str()) {
            return Err(dangling("hub page node", &page.taxonomy_node_id));
        }
        for id in &page.linked_query_ids {
            if !query_ids.contains(id.as_str()) {
                return Err(dangling("hub page query link", id));
            }
        }
        for id in &page.linked_hub_ids {
            if !page_ids.contains(id.as_str()) {
                return Err(dangling("hub page link", id));
            }
        }
    }
    Ok(())
}

fn check_specs(output: &FrameworkOutput, page_ids: &HashSet<&str>) -> Result<()> {
    for spec in &output.content_specs {
        if !page_ids.contains(spec.hub_page_id.as_str()) {
            return Err(dangling("content spec page", &spec.hub_page_id));
        }
    }
    Ok(())
}

fn check_measurement(output: &FrameworkOutput, query_ids: &HashSet<&str>) -> Result<()> {
    for id in &output.measurement.monitoring_query_ids {
        if !query_ids.contains(id.as_str()) {
            return Err(dangling("monitoring query", id));
        }
    }
    Ok(())
}

fn dangling(what: &str, id: &str) -> StratBuilderError {
    StratBuilderError::integrity(format!("{what} references unknown id '{id}'"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
