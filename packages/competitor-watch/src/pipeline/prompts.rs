//! LLM prompts for change classification.

/// System role sent with every classification request.
pub const CLASSIFY_SYSTEM_PROMPT: &str = "You are a helpful assistant designed to output JSON.";

/// Instructions for categorizing a competitor page change.
pub const CLASSIFY_PROMPT: &str = r#"You are a competitive intelligence analyst.
Compare previous and new version of a SaaS website page.

Ignore:
- navigation elements
- footer links
- timestamps
- minor numeric changes
- ordering changes
- copyright updates

Focus on:
- pricing updates
- feature additions or removals
- product launches
- positioning or messaging changes
- policy changes

Return a JSON object with the following keys:
- pricing (list of strings)
- features (list of strings)
- positioning (list of strings)
- strategy (list of strings, 1-2 lines on implications)

If no meaningful change in a category, return an empty list.
Return only these four keys."#;

/// Format the classification prompt with the change text appended.
pub fn format_classify_prompt(added: &str, removed: &str) -> String {
    format!(
        "{}\n\nChanges:\n[ADDED CONTENT]:\n{}\n\n[REMOVED CONTENT]:\n{}",
        CLASSIFY_PROMPT, added, removed
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_classify_prompt() {
        let prompt = format_classify_prompt("Pro plan $15", "Pro plan $10");

        assert!(prompt.contains("[ADDED CONTENT]:\nPro plan $15"));
        assert!(prompt.contains("[REMOVED CONTENT]:\nPro plan $10"));
        assert!(prompt.starts_with("You are a competitive intelligence analyst."));
    }
}
