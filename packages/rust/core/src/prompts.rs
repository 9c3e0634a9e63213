//! Prompt construction for the model-backed stages.

use blogsmith_shared::ChatMessage;

const OUTLINE_SYSTEM: &str = "You are a blog planning assistant.";
const CONTENT_SYSTEM: &str = "You are a professional blog writer.";

/// Header placed before the encyclopedia text in `research`.
pub const REFERENCE_HEADER: &str = "Wikipedia info:\n";
/// Header placed before the web search text in `research`.
pub const WEB_HEADER: &str = "\n\nDuckDuckGo info:\n";

/// Join the two raw research texts under their labeled headers.
pub fn research_text(reference: &str, web: &str) -> String {
    format!("{REFERENCE_HEADER}{reference}{WEB_HEADER}{web}")
}

/// Messages asking for an outline of `topic` grounded in `research`.
///
/// `research` is embedded in full.
pub fn outline_prompt(topic: &str, research: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(OUTLINE_SYSTEM),
        ChatMessage::user(format!(
            "Based on the following research, create a detailed outline for a blog about '{topic}':\n\n{research}"
        )),
    ]
}

/// Messages asking for the full post following `outline`.
pub fn content_prompt(topic: &str, outline: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(CONTENT_SYSTEM),
        ChatMessage::user(format!(
            "Write a detailed blog on '{topic}' following this outline:\n{outline}\n\
             Include the following sections:\n\
             1. Heading\n2. Introduction\n3. Content\n4. Summary"
        )),
    ]
}
