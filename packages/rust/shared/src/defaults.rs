//! Stage defaults: fan-out patterns, persona templates, the KPI catalog,
//! and the lexical tables used during entity expansion.
//!
//! These are explicit configuration structures validated once at startup.
//! They are fixed (not user-configurable), but live here rather than inline
//! in the stages so each table has a single declared home and the pipeline
//! can reject an inconsistent catalog before any stage runs.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StratBuilderError};
use crate::types::{BusinessGoal, EntityType, Intent, Priority};

// ---------------------------------------------------------------------------
// Fan-out patterns
// ---------------------------------------------------------------------------

/// A query fan-out pattern: a text template plus declared intent and
/// priority. Each pattern produces exactly one query per entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanoutPattern {
    /// Stable pattern name, unique within the catalog.
    pub name: String,
    /// Template containing the `{entity}` placeholder.
    pub template: String,
    pub intent: Intent,
    pub priority: Priority,
}

impl FanoutPattern {
    fn new(name: &str, template: &str, intent: Intent, priority: Priority) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            intent,
            priority,
        }
    }
}

/// The standard fan-out pattern catalog, in declaration order.
/// Declaration order is the tie-break order for dedup conflicts.
pub fn fanout_patterns() -> Vec<FanoutPattern> {
    use Intent::*;
    use Priority::*;
    vec![
        FanoutPattern::new("definitional", "what is {entity}", Informational, Critical),
        FanoutPattern::new("how_to", "how to use {entity}", Informational, Critical),
        FanoutPattern::new("comparison", "{entity} alternatives", Commercial, High),
        FanoutPattern::new("problems", "{entity} problems", Informational, High),
        FanoutPattern::new("benefits", "{entity} benefits", Commercial, High),
        FanoutPattern::new("examples", "{entity} examples", Informational, High),
        FanoutPattern::new("pricing", "{entity} pricing", Transactional, Medium),
        FanoutPattern::new("reviews", "{entity} review", Commercial, Medium),
        FanoutPattern::new("integration", "{entity} integration", Informational, Medium),
        FanoutPattern::new("advanced", "{entity} best practices", Informational, Medium),
    ]
}

// ---------------------------------------------------------------------------
// Persona templates
// ---------------------------------------------------------------------------

/// A persona template instantiated by the content spec generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaTemplate {
    /// Stable key referenced by the goal mapping.
    pub key: String,
    /// Display name.
    pub name: String,
    pub knowledge_level: String,
    pub tone: String,
    pub preferred_formats: Vec<String>,
    pub motivations: Vec<String>,
    pub pain_points: Vec<String>,
}

fn persona(
    key: &str,
    name: &str,
    level: &str,
    tone: &str,
    formats: &[&str],
    motivations: &[&str],
    pains: &[&str],
) -> PersonaTemplate {
    PersonaTemplate {
        key: key.into(),
        name: name.into(),
        knowledge_level: level.into(),
        tone: tone.into(),
        preferred_formats: formats.iter().map(|s| s.to_string()).collect(),
        motivations: motivations.iter().map(|s| s.to_string()).collect(),
        pain_points: pains.iter().map(|s| s.to_string()).collect(),
    }
}

/// The standard persona template catalog.
pub fn persona_templates() -> Vec<PersonaTemplate> {
    vec![
        persona(
            "beginner",
            "The Beginner",
            "novice",
            "educational, supportive, jargon-free",
            &["how_to_tutorial", "faq_page", "video_content"],
            &["learning fundamentals", "avoiding mistakes", "quick wins"],
            &["overwhelmed by options", "unclear where to start"],
        ),
        persona(
            "practitioner",
            "The Practitioner",
            "intermediate",
            "practical, detailed, example-driven",
            &["long_form_guide", "comparison_table", "case_study"],
            &["improving efficiency", "solving specific problems", "staying current"],
            &["time constraints", "finding reliable information"],
        ),
        persona(
            "expert",
            "The Expert",
            "advanced",
            "technical, nuanced, data-driven",
            &["case_study", "tool_calculator", "long_form_guide"],
            &["optimization", "innovation", "thought leadership"],
            &["generic content", "outdated information"],
        ),
        persona(
            "decision_maker",
            "The Decision Maker",
            "varies",
            "ROI-focused, executive summary style",
            &["comparison_table", "product_review", "case_study"],
            &["risk mitigation", "cost justification", "competitive advantage"],
            &["information overload", "vendor bias"],
        ),
    ]
}

/// Persona template keys relevant to a business goal, in catalog order.
pub fn personas_for_goal(goal: BusinessGoal) -> &'static [&'static str] {
    match goal {
        BusinessGoal::BrandAwareness => &["beginner"],
        BusinessGoal::LeadGeneration => &["decision_maker", "practitioner"],
        BusinessGoal::EcommerceSales => &["decision_maker"],
        BusinessGoal::ThoughtLeadership => &["expert", "practitioner"],
        BusinessGoal::LocalVisibility => &["beginner"],
        BusinessGoal::ProductAdoption => &["practitioner"],
    }
}

// ---------------------------------------------------------------------------
// Goal alignment tables (entity expander)
// ---------------------------------------------------------------------------

/// Entity types whose coverage serves a given business goal.
pub fn entity_types_for_goal(goal: BusinessGoal) -> &'static [EntityType] {
    match goal {
        BusinessGoal::BrandAwareness => &[EntityType::Core, EntityType::Supporting],
        BusinessGoal::LeadGeneration => &[EntityType::Core],
        BusinessGoal::EcommerceSales => &[EntityType::Core, EntityType::Attribute],
        BusinessGoal::ThoughtLeadership => &[EntityType::Core, EntityType::Supporting],
        BusinessGoal::LocalVisibility => &[EntityType::Core, EntityType::Supporting],
        BusinessGoal::ProductAdoption => &[EntityType::Core, EntityType::Attribute],
    }
}

/// Topics a strategy serving this goal is expected to cover. Used by the
/// entity gap report; never auto-created as entities.
pub fn expected_topics_for_goal(goal: BusinessGoal) -> &'static [&'static str] {
    match goal {
        BusinessGoal::BrandAwareness => &["brand story", "industry news"],
        BusinessGoal::LeadGeneration => &["lead magnet", "case studies"],
        BusinessGoal::EcommerceSales => &["pricing", "product reviews"],
        BusinessGoal::ThoughtLeadership => &["industry trends", "original research"],
        BusinessGoal::LocalVisibility => &["local services", "service areas"],
        BusinessGoal::ProductAdoption => &["onboarding", "integrations"],
    }
}

// ---------------------------------------------------------------------------
// Lexical tables (entity expander)
// ---------------------------------------------------------------------------

/// Common abbreviation expansions. Applied in both directions.
pub const ABBREVIATIONS: &[(&str, &str)] = &[
    ("seo", "search engine optimization"),
    ("sem", "search engine marketing"),
    ("ppc", "pay per click"),
    ("cro", "conversion rate optimization"),
    ("ux", "user experience"),
    ("ui", "user interface"),
    ("api", "application programming interface"),
    ("ai", "artificial intelligence"),
    ("ml", "machine learning"),
    ("saas", "software as a service"),
    ("b2b", "business to business"),
    ("b2c", "business to consumer"),
    ("roi", "return on investment"),
    ("kpi", "key performance indicator"),
    ("cms", "content management system"),
    ("crm", "customer relationship management"),
];

/// Suffix families: a name ending in the key also answers to the values.
pub const SUFFIX_FAMILIES: &[(&str, &[&str])] = &[
    ("tool", &["tools", "software", "platform", "app"]),
    ("service", &["services", "solution", "solutions"]),
    ("guide", &["guides", "tutorial", "tutorials"]),
    ("tips", &["advice", "best practices", "strategies"]),
    ("review", &["reviews", "comparison", "alternatives"]),
];

// ---------------------------------------------------------------------------
// KPI catalog
// ---------------------------------------------------------------------------

/// A KPI catalog entry. `relevant_goals` empty means goal-agnostic:
/// the KPI is included for every configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiTemplate {
    pub name: String,
    pub description: String,
    pub measurement_method: String,
    pub refresh_cadence: String,
    pub priority: Priority,
    pub relevant_goals: Vec<BusinessGoal>,
}

fn kpi(
    name: &str,
    description: &str,
    method: &str,
    cadence: &str,
    priority: Priority,
    goals: &[BusinessGoal],
) -> KpiTemplate {
    KpiTemplate {
        name: name.into(),
        description: description.into(),
        measurement_method: method.into(),
        refresh_cadence: cadence.into(),
        priority,
        relevant_goals: goals.to_vec(),
    }
}

/// The standard KPI catalog.
pub fn kpi_catalog() -> Vec<KpiTemplate> {
    use BusinessGoal::*;
    use Priority::*;
    vec![
        kpi(
            "ai_share_of_voice",
            "Frequency of brand citations in AI-generated answers",
            "Track mentions across AI assistants and AI-powered search overviews",
            "weekly",
            Critical,
            &[],
        ),
        kpi(
            "ai_overview_presence",
            "Appearance in AI search overviews for target queries",
            "Automated SERP monitoring with AI overview detection",
            "daily",
            Critical,
            &[],
        ),
        kpi(
            "topical_authority_score",
            "Depth and breadth of entity cluster coverage",
            "Internal scoring based on the hub coverage matrix",
            "monthly",
            High,
            &[ThoughtLeadership, BrandAwareness],
        ),
        kpi(
            "branded_search_volume",
            "Search volume trends for brand-related queries",
            "Search console and third-party rank trackers",
            "monthly",
            High,
            &[BrandAwareness, EcommerceSales],
        ),
        kpi(
            "entity_association_accuracy",
            "How accurately AI describes the brand vs intended positioning",
            "Prompt AI systems about the brand and analyze responses",
            "monthly",
            Medium,
            &[BrandAwareness, ThoughtLeadership],
        ),
        kpi(
            "content_freshness_score",
            "Recency of content updates across key pages",
            "Track last-modified dates via content audit",
            "weekly",
            Medium,
            &[ThoughtLeadership, ProductAdoption],
        ),
        kpi(
            "schema_coverage",
            "Percentage of pages with valid structured data",
            "Schema validation crawl",
            "weekly",
            Medium,
            &[EcommerceSales, LocalVisibility, LeadGeneration],
        ),
        kpi(
            "internal_link_health",
            "Hub-spoke link structure integrity",
            "Internal link audit with orphan page detection",
            "monthly",
            Medium,
            &[],
        ),
    ]
}

// ---------------------------------------------------------------------------
// StageDefaults
// ---------------------------------------------------------------------------

/// The full stage defaults bundle, validated once at pipeline startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDefaults {
    pub fanout_patterns: Vec<FanoutPattern>,
    pub persona_templates: Vec<PersonaTemplate>,
    pub kpi_catalog: Vec<KpiTemplate>,
}

impl StageDefaults {
    /// The standard catalog.
    pub fn standard() -> Self {
        Self {
            fanout_patterns: fanout_patterns(),
            persona_templates: persona_templates(),
            kpi_catalog: kpi_catalog(),
        }
    }

    /// Check internal consistency of the catalog.
    pub fn validate(&self) -> Result<()> {
        if self.fanout_patterns.is_empty() {
            return Err(StratBuilderError::configuration(
                "fan-out pattern catalog is empty",
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for pattern in &self.fanout_patterns {
            if !pattern.template.contains("{entity}") {
                return Err(StratBuilderError::configuration(format!(
                    "fan-out pattern '{}' is missing the {{entity}} placeholder",
                    pattern.name
                )));
            }
            if !seen.insert(pattern.name.as_str()) {
                return Err(StratBuilderError::configuration(format!(
                    "duplicate fan-out pattern name '{}'",
                    pattern.name
                )));
            }
        }

        let keys: Vec<&str> = self.persona_templates.iter().map(|p| p.key.as_str()).collect();
        for goal in [
            BusinessGoal::BrandAwareness,
            BusinessGoal::LeadGeneration,
            BusinessGoal::EcommerceSales,
            BusinessGoal::ThoughtLeadership,
            BusinessGoal::LocalVisibility,
            BusinessGoal::ProductAdoption,
        ] {
            for key in personas_for_goal(goal) {
                if !keys.contains(key) {
                    return Err(StratBuilderError::configuration(format!(
                        "goal mapping references unknown persona template '{key}'"
                    )));
                }
            }
        }

        if self.kpi_catalog.is_empty() {
            return Err(StratBuilderError::configuration("KPI catalog is empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_defaults_are_valid() {
        StageDefaults::standard().validate().expect("standard catalog");
    }

    #[test]
    fn every_pattern_has_placeholder_and_unique_name() {
        let patterns = fanout_patterns();
        assert_eq!(patterns.len(), 10);
        let names: std::collections::HashSet<_> =
            patterns.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.len(), patterns.len());
        assert!(patterns.iter().all(|p| p.template.contains("{entity}")));
    }

    #[test]
    fn invalid_pattern_rejected() {
        let mut defaults = StageDefaults::standard();
        defaults.fanout_patterns[0].template = "what is it".into();
        let err = defaults.validate().unwrap_err();
        assert!(err.to_string().contains("{entity}"));
    }

    #[test]
    fn goal_mapping_resolves_against_catalog() {
        let keys: Vec<String> = persona_templates().into_iter().map(|p| p.key).collect();
        for goal in [
            BusinessGoal::BrandAwareness,
            BusinessGoal::LeadGeneration,
            BusinessGoal::EcommerceSales,
            BusinessGoal::ThoughtLeadership,
            BusinessGoal::LocalVisibility,
            BusinessGoal::ProductAdoption,
        ] {
            for key in personas_for_goal(goal) {
                assert!(keys.iter().any(|k| k == key), "missing persona {key}");
            }
        }
    }

    #[test]
    fn goal_agnostic_kpis_exist() {
        let catalog = kpi_catalog();
        assert!(catalog.iter().any(|k| k.relevant_goals.is_empty()));
        assert_eq!(catalog.len(), 8);
    }
}
