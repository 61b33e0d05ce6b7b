//! Deterministic fallback responder.
//!
//! When the assistant backend is unreachable the gateway still has to
//! produce a plausible on-topic reply. This module maps a free-text query
//! onto one of a fixed set of topic templates: an ordered rule table is
//! scanned top to bottom and the first rule whose keyword set matches the
//! lower-cased query wins. Queries that match nothing fall through to a
//! capability-overview reply that echoes the query verbatim, so the
//! mapping is total over every input string.

/// Reply produced by the responder.
///
/// `artifact_title` is set only when the matched topic comes with a draft
/// document for the side panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FallbackReply {
    pub content: String,
    pub artifact_title: Option<&'static str>,
}

struct Rule {
    keywords: &'static [&'static str],
    reply: fn(&str) -> FallbackReply,
}

impl Rule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword))
    }
}

// Evaluated in order; first match wins.
const RULES: &[Rule] = &[
    Rule {
        keywords: &["budget", "cost", "estimate"],
        reply: budget_reply,
    },
    Rule {
        keywords: &["aps", "assessment", "workbook"],
        reply: assessment_reply,
    },
    Rule {
        keywords: &["compliance", "regulation", "requirement"],
        reply: compliance_reply,
    },
];

/// Map a query onto a deterministic reply.
///
/// Keyword matching is case-insensitive substring membership; the original
/// query text (not the lower-cased form) is echoed by the default branch.
pub fn respond(query: &str) -> FallbackReply {
    let lowered = query.to_lowercase();
    for rule in RULES {
        if rule.matches(&lowered) {
            return (rule.reply)(query);
        }
    }
    default_reply(query)
}

fn budget_reply(_query: &str) -> FallbackReply {
    FallbackReply {
        content: "I'd be happy to help you with budget planning for your broadband project.\n\nBased on typical APS guidelines, here are the key budget components to consider:\n\n• **Infrastructure Costs** - Fiber optic cables, conduits, and network equipment\n• **Labor & Installation** - Professional installation and testing services\n• **Permits & Compliance** - Regulatory fees and compliance documentation\n• **Project Management** - Oversight and coordination costs\n• **Contingency** - Typically 10-15% buffer for unexpected expenses\n\nI've prepared a draft budget document for your review.".to_string(),
        artifact_title: Some("Budget Estimate Draft"),
    }
}

fn assessment_reply(_query: &str) -> FallbackReply {
    FallbackReply {
        content: "I can help you with your APS assessment workbook.\n\nThe APS framework includes several key areas:\n\n• **Work Level Standards (WLS)** - Define the expected complexity and responsibility at each level\n• **Integrated Leadership System (ILS)** - Outlines behavioral capabilities for public service\n• **Self-Assessment** - Helps identify your current capabilities and development areas\n\nWould you like me to help you with a specific section of the assessment?".to_string(),
        artifact_title: None,
    }
}

fn compliance_reply(_query: &str) -> FallbackReply {
    FallbackReply {
        content: "I can help you understand the compliance requirements for your broadband project.\n\nKey regulatory considerations include:\n\n• **Federal Communications Guidelines** - Baseline requirements for infrastructure projects\n• **State & Local Permits** - Specific requirements vary by jurisdiction\n• **Environmental Assessments** - May be required for certain project types\n• **Safety Standards** - Ensure installations meet safety requirements\n\nLet me know which specific area you'd like to explore further.".to_string(),
        artifact_title: None,
    }
}

fn default_reply(query: &str) -> FallbackReply {
    FallbackReply {
        content: format!(
            "Thank you for your question about \"{query}\".\n\nI'm your APS Assistant, here to help with:\n\n• **Broadband Advancement Workbooks** - Guidance on completing your assessments\n• **Budget Planning** - Help with project cost estimates\n• **Regulatory Compliance** - Understanding requirements and guidelines\n• **Document Generation** - Creating drafts and reports\n\nHow can I assist you further with your specific needs?"
        ),
        artifact_title: None,
    }
}
