//! Markdown rendering of a strategy document: one human-readable report
//! with a section per pipeline stage.

use std::fmt::Write;

use stratbuilder_shared::FrameworkOutput;

/// Render the full strategy as one Markdown document.
pub fn to_markdown(output: &FrameworkOutput) -> String {
    let mut md = String::new();

    // Writing to a String cannot fail; the let bindings keep clippy quiet
    let _ = write!(md, "{}", header(output));
    let _ = write!(md, "{}", ontology_section(output));
    let _ = write!(md, "{}", taxonomy_section(output));
    let _ = write!(md, "{}", query_section(output));
    let _ = write!(md, "{}", hub_section(output));
    let _ = write!(md, "{}", persona_section(output));
    let _ = write!(md, "{}", spec_section(output));
    let _ = write!(md, "{}", measurement_section(output));

    md
}

fn header(output: &FrameworkOutput) -> String {
    let s = &output.summary;
    format!(
        "# Content Strategy: {brand}\n\n\
         *Niche: {niche}*  \n\
         *Generated: {date}*\n\n\
         | Metric | Count |\n\
         |--------|-------|\n\
         | Entities | {entities} |\n\
         | Relationships | {relationships} |\n\
         | Taxonomy nodes | {nodes} |\n\
         | Query clusters | {clusters} |\n\
         | Queries | {queries} |\n\
         | Content hubs | {hubs} |\n\
         | Hub pages | {pages} |\n\
         | Personas | {personas} |\n\
         | KPIs | {kpis} |\n\n",
        brand = output.brand_name,
        niche = output.primary_niche,
        date = output.generated_at.format("%Y-%m-%d %H:%M UTC"),
        entities = s.total_entities,
        relationships = s.total_relationships,
        nodes = s.taxonomy_nodes,
        clusters = s.query_clusters,
        queries = s.total_queries,
        hubs = s.content_hubs,
        pages = s.hub_pages,
        personas = s.personas,
        kpis = s.kpis,
    )
}

fn ontology_section(output: &FrameworkOutput) -> String {
    let mut md = String::from("## Entity Ontology\n\n");
    md.push_str("| Entity | Type | Centrality | Commercial Value | Aliases |\n");
    md.push_str("|--------|------|------------|------------------|---------|\n");

    for entity in &output.ontology.entities {
        let _ = writeln!(
            md,
            "| {} | {:?} | {:.2} | {:.2} | {} |",
            entity.name,
            entity.entity_type,
            entity.centrality,
            entity.commercial_value,
            entity.aliases.len()
        );
    }

    let total_aliases: usize = output.ontology.entities.iter().map(|e| e.aliases.len()).sum();
    let _ = writeln!(
        md,
        "\n{} relationships inferred; {} aliases generated across {} entities.\n",
        output.ontology.relationships.len(),
        total_aliases,
        output.ontology.entities.len()
    );

    md
}

fn taxonomy_section(output: &FrameworkOutput) -> String {
    let mut md = String::from("## Topic Taxonomy\n\n");

    for root in output.taxonomy.roots() {
        let _ = writeln!(
            md,
            "- **{}** ({} entities){}",
            root.label,
            root.entity_ids.len(),
            facet_suffix(&root.facet_tags)
        );
        for child in output.taxonomy.children(&root.id) {
            let _ = writeln!(
                md,
                "  - {} ({} entities){}",
                child.label,
                child.entity_ids.len(),
                facet_suffix(&child.facet_tags)
            );
        }
    }

    if !output.taxonomy.links.is_empty() {
        let _ = writeln!(
            md,
            "\n{} internal links proposed between sibling topics.",
            output.taxonomy.links.len()
        );
    }
    md.push('\n');

    md
}

fn facet_suffix(tags: &[String]) -> String {
    if tags.is_empty() {
        String::new()
    } else {
        format!(" — facets: {}", tags.join(", "))
    }
}

fn query_section(output: &FrameworkOutput) -> String {
    let mut md = String::from("## Query Map\n\n");
    md.push_str("| Cluster | Intent | Queries | Top Query |\n");
    md.push_str("|---------|--------|---------|----------|\n");

    for cluster in &output.query_clusters {
        let node_label = output
            .taxonomy
            .node(&cluster.taxonomy_node_id)
            .map(|n| n.label.as_str())
            .unwrap_or(cluster.taxonomy_node_id.as_str());
        let top = cluster
            .queries
            .iter()
            .min_by_key(|q| q.priority.rank())
            .map(|q| q.text.as_str())
            .unwrap_or("");
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} |",
            node_label,
            cluster.intent.key(),
            cluster.queries.len(),
            top
        );
    }
    md.push('\n');

    md
}

fn hub_section(output: &FrameworkOutput) -> String {
    let mut md = String::from("## Content Hubs\n\n");

    for hub in &output.hubs {
        let _ = writeln!(
            md,
            "### {} (coverage {:.0}%)\n\n- Pillar: **{}** ({})",
            hub.name,
            hub.coverage_score * 100.0,
            hub.pillar.title,
            hub.pillar.recommended_format
        );
        for page in &hub.clusters {
            let _ = writeln!(
                md,
                "- {} ({}, {:?} priority, {} queries)",
                page.title,
                page.recommended_format,
                page.priority,
                page.linked_query_ids.len()
            );
        }
        md.push('\n');
    }

    md
}

fn persona_section(output: &FrameworkOutput) -> String {
    let mut md = String::from("## Audience Personas\n\n");

    for persona in &output.personas {
        let _ = writeln!(
            md,
            "- **{}** ({}) — tone: {}. Goals: {}.",
            persona.name,
            persona.knowledge_level,
            persona.tone,
            persona.goals.join(", ")
        );
    }
    md.push('\n');

    md
}

fn spec_section(output: &FrameworkOutput) -> String {
    let mut md = String::from("## Content Specifications\n\n");

    for spec in &output.content_specs {
        let _ = writeln!(
            md,
            "- **{}**: sections [{}]; schema [{}]",
            spec.title,
            spec.recommended_structure.join(", "),
            spec.schema_markup_types.join(", ")
        );
    }
    md.push('\n');

    md
}

fn measurement_section(output: &FrameworkOutput) -> String {
    let mut md = String::from("## Measurement Plan\n\n");
    md.push_str("| KPI | Cadence | Priority |\n");
    md.push_str("|-----|---------|----------|\n");

    for kpi in &output.measurement.kpis {
        let _ = writeln!(md, "| {} | {} | {:?} |", kpi.name, kpi.refresh_cadence, kpi.priority);
    }

    let _ = writeln!(
        md,
        "\n{} queries selected for AI visibility monitoring.\n",
        output.measurement.monitoring_query_ids.len()
    );

    md.push_str("### Audit Prompts\n\n");
    for prompt in &output.measurement.audit_prompts {
        let _ = writeln!(md, "- *{}*: \"{}\" (check: {})", prompt.category, prompt.prompt, prompt.check_for);
    }
    md.push('\n');

    md
}
