use super::gateway::ChatMessage;
use crate::sessions::Turn;

/// Maximum number of stored turns replayed to the model ahead of a new prompt.
pub const CONTEXT_WINDOW_TURNS: usize = 6;

pub const MIND_MAP_SYSTEM_PROMPT: &str = r##"You are a professional expert in 3D knowledge visualization.
Analyze the user's request and answer ONLY in the JSON format below.
Do not add any extra text, explanation or markdown.

Response structure:
{
  "text_answer": "Short, precise explanation of the topic (2-3 sentences)",
  "graph_data": {
    "nodes": [
      {
        "id": "unique_short_id",
        "label": "Concept name",
        "color": "#hex_color",
        "summary": "30-80 word summary (shown as a tooltip)",
        "icon": "📌"
      }
    ],
    "links": [
      {"source": "id1", "target": "id2"}
    ]
  }
}

IMPORTANT RULES:
1. Every node MUST have a "summary" field (30-80 words).
2. The "icon" field is optional, but adding an emoji that fits the topic is recommended (🧠, 💡, ⚙️, 🌟, 📊, etc.).
3. Colors:
   - Central topic: #00ffcc or #0066ff
   - Supporting concepts: #ff6b6b, #4ecdc4, #ffd93d, #6bcf7f
4. IDs must be short (3-10 characters) and unique.
5. If the user asks about a concept from a previous answer, do NOT create a new node; link to the existing ID instead.
6. Links must be logical and hierarchical.
7. Return only JSON, nothing else."##;

/// Builds `[system, ...last CONTEXT_WINDOW_TURNS of history, user]`.
pub fn build_messages(history: &[Turn], prompt: &str) -> Vec<ChatMessage> {
    let window_start = history.len().saturating_sub(CONTEXT_WINDOW_TURNS);
    let window = &history[window_start..];

    let mut messages = Vec::with_capacity(window.len() + 2);
    messages.push(ChatMessage::system(MIND_MAP_SYSTEM_PROMPT));
    messages.extend(window.iter().map(ChatMessage::from));
    messages.push(ChatMessage::user(prompt));
    messages
}

#[cfg(test)]
mod tests {
    use super::{CONTEXT_WINDOW_TURNS, MIND_MAP_SYSTEM_PROMPT, build_messages};
    use crate::llm::{ChatMessage, ChatRole};
    use crate::sessions::Turn;

    fn exchanges(count: usize) -> Vec<Turn> {
        (0..count)
            .flat_map(|index| {
                [
                    Turn::user(format!("question {index}")),
                    Turn::assistant(format!("{{\"answer\":{index}}}")),
                ]
            })
            .collect()
    }

    #[test]
    fn empty_history_yields_system_and_user_only() {
        let messages = build_messages(&[], "What is gravity?");

        assert_eq!(
            messages,
            vec![
                ChatMessage::system(MIND_MAP_SYSTEM_PROMPT),
                ChatMessage::user("What is gravity?"),
            ]
        );
    }

    #[test]
    fn long_history_is_cut_to_trailing_window() {
        let history = exchanges(7);
        let messages = build_messages(&history, "next");

        assert_eq!(messages.len(), CONTEXT_WINDOW_TURNS + 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1].content, "question 4");
        assert_eq!(messages[CONTEXT_WINDOW_TURNS].content, "{\"answer\":6}");
        assert_eq!(messages.last(), Some(&ChatMessage::user("next")));
    }

    #[test]
    fn system_prompt_pins_reply_contract() {
        for needle in [
            "\"text_answer\"",
            "\"graph_data\"",
            "\"summary\"",
            "#00ffcc",
            "#6bcf7f",
            "existing ID",
            "Return only JSON",
        ] {
            assert!(
                MIND_MAP_SYSTEM_PROMPT.contains(needle),
                "system prompt is missing {needle}"
            );
        }
    }
}
