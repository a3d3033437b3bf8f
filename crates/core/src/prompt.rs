//! Renders the active rule set into the system instruction sent to the
//! completion service.
//!
//! Output is deterministic: one line per active rule, in store order, so the
//! same rule set always yields the same prompt text.

use crate::rules::{Assignee, Rule};

const PREAMBLE: &str = "\
You are the legal front door intake assistant. Your job is to work out which \
lawyer should handle the user's request and tell the user who that is.";

const NORMALIZATION: &str = "\
From the conversation, extract these fields: requestType, department, location, \
seniority, keywords. Use short canonical values (for example \"contract\", \
\"Sales\", \"Australia\"). Trim whitespace and ignore letter case. Treat keywords \
as the free text of the request. If requestType or location is missing, ask the \
user for it before routing.";

const MATCHING: &str = "\
Evaluate the rules below from top to bottom and pick the FIRST rule whose \
conditions are all true. Rule order is the priority; do not prefer a rule because \
it is more specific. Comparisons ignore case and surrounding whitespace. \
\"equals\" means the field is exactly the value. \"oneOf\" means the field is \
exactly one of the comma-separated values. \"includes\" means the field text \
contains at least one of the comma-separated values. A field the user has not \
provided never satisfies a condition. A rule with no conditions never matches.";

const RESPONSE: &str = "\
When you have routed the request, tell the user the assignee's email address and \
briefly say why. Do not invent rules or contacts that are not listed here.";

/// Render one line per active rule, or a single fallback line when there are
/// none.
pub fn render_rule_summary(rules: &[Rule], fallback: &Assignee) -> String {
    let lines: Vec<String> = rules
        .iter()
        .filter(|rule| rule.active)
        .map(render_rule_line)
        .collect();

    if lines.is_empty() {
        return format!(
            "- No active routing rules. Route every request to the fallback contact: {}.",
            render_contact(fallback)
        );
    }

    lines.join("\n")
}

/// Build the full system instruction for a chat turn.
pub fn build_system_prompt(rules: &[Rule], fallback: &Assignee) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\n");

    prompt.push_str("[NORMALIZATION]\n");
    prompt.push_str(NORMALIZATION);
    prompt.push_str("\n\n");

    prompt.push_str("[MATCHING]\n");
    prompt.push_str(MATCHING);
    prompt.push_str("\n\n");

    prompt.push_str("[RULES]\n");
    prompt.push_str(&render_rule_summary(rules, fallback));
    prompt.push_str("\n\n");

    prompt.push_str("[FALLBACK]\n");
    prompt.push_str(&format!(
        "If no rule matches, route the request to {}.",
        render_contact(fallback)
    ));
    prompt.push_str("\n\n");

    prompt.push_str("[RESPONSE]\n");
    prompt.push_str(RESPONSE);

    prompt
}

fn render_rule_line(rule: &Rule) -> String {
    let conditions = if rule.conditions.is_empty() {
        "<no conditions, never matches>".to_string()
    } else {
        rule.conditions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" AND ")
    };
    format!(
        "- {}: IF {} THEN route to {}",
        rule.name, conditions, rule.assignee.email
    )
}

fn render_contact(contact: &Assignee) -> String {
    format!("{} <{}>", contact.name, contact.email)
}
