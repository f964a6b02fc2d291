//! Prompts for the FareGuide assistant
//!
//! The system instruction is fixed; the user turn is built from the tips
//! currently on screen followed by the traveller's question.

use crate::models::Tip;

/// Sent to the model as its system instruction
pub const FAREGUIDE_SYSTEM_INSTRUCTION: &str = "You are FareGuide, an expert AI travel assistant for India.
Your goal is to provide helpful, safe, and budget-conscious travel advice.
- Be friendly, clear, and encouraging.
- Use the provided \"Community Tips\" as your primary source of information when relevant. Reference them directly if a user's question is about a specific trip shown.
- If the user asks a general question, use your own knowledge but keep the advice grounded and practical for a traveler in India.
- Do not make up fares or routes; if you don't know, say so.
- Format responses with simple markdown (bolding with **text**).";

/// Context line used when no tips are visible
pub const NO_TIPS_CONTEXT: &str = "There are no specific tips on the screen right now.";

/// Render the on-screen tips as a markdown context block
///
/// # Examples
///
/// ```
/// use fairfare::prompts::build_tips_context;
///
/// assert_eq!(
///     build_tips_context(&[]),
///     "There are no specific tips on the screen right now."
/// );
/// ```
pub fn build_tips_context(tips: &[Tip]) -> String {
    if tips.is_empty() {
        return NO_TIPS_CONTEXT.to_string();
    }

    let entries: Vec<String> = tips
        .iter()
        .map(|tip| {
            format!(
                "- **From:** {}\n  **To:** {}\n  **Mode:** {}\n  **Cost:** {}\n  **Advice:** {}",
                tip.origin, tip.destination, tip.transport_mode, tip.estimated_cost, tip.advice
            )
        })
        .collect();

    format!(
        "---\n**Community Tips on Screen:**\n{}\n---",
        entries.join("\n\n")
    )
}

/// Full user turn: context block, blank line, then the question
pub fn build_chat_prompt(message: &str, tips: &[Tip]) -> String {
    format!(
        "{}\n\n**User's Question:** {}",
        build_tips_context(tips),
        message
    )
}

/// Geocoding request for a place in India
pub fn build_geocode_prompt(address: &str) -> String {
    format!(
        "Find the geographic coordinates (latitude and longitude) for this location in India: {}.",
        address
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::mock::seed_tips;

    #[test]
    fn test_context_lists_every_tip() {
        let tips = seed_tips();
        let context = build_tips_context(&tips);
        assert!(context.starts_with("---\n**Community Tips on Screen:**"));
        assert_eq!(context.matches("**From:**").count(), 3);
        assert!(context.contains("**To:** Chandni Chowk"));
        assert!(context.contains("**Mode:** AutoRickshaw"));
    }

    #[test]
    fn test_chat_prompt_appends_question() {
        let prompt = build_chat_prompt("Is the metro safe at night?", &[]);
        assert_eq!(
            prompt,
            "There are no specific tips on the screen right now.\n\n**User's Question:** Is the metro safe at night?"
        );
    }

    #[test]
    fn test_system_instruction_names_assistant() {
        assert!(FAREGUIDE_SYSTEM_INSTRUCTION.starts_with("You are FareGuide"));
    }

    #[test]
    fn test_geocode_prompt() {
        assert!(build_geocode_prompt("Howrah Bridge").ends_with("in India: Howrah Bridge."));
    }
}
