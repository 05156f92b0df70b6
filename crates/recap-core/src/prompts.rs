//! Prompt templates for the text-generation collaborator.

/// Instruction template for resume-bullet generation. The placeholders are
/// replaced with the requested bullet count and the SHORT meeting summary
/// (never the full transcript).
pub const RESUME_BULLETS_TEMPLATE: &str = r#"Generate exactly {n} resume bullet points from this meeting summary.
Each bullet must be a single line, start with an action verb, and focus on a concrete outcome.
Return only the bullets, one per line, no numbering.

Summary:
{summary}"#;

/// Build the bullet-generation prompt for the given summary.
pub fn resume_bullets_prompt(summary: &str, n: usize) -> String {
    RESUME_BULLETS_TEMPLATE
        .replace("{n}", &n.to_string())
        .replace("{summary}", summary)
}
