//! Prompt rendering and input shaping shared by the gateways.

use parley_types::Turn;

/// Renders turns as `"<Role>: <text>"` lines joined by newlines, in order.
pub fn render_prompt(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role().label(), turn.text()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns the first `max_chars` characters of `text`.
///
/// Counts Unicode scalar values, so the cut never splits a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_history_in_insertion_order() {
        let turns = vec![
            Turn::user("hi"),
            Turn::assistant("hello"),
            Turn::user("how are you"),
        ];
        assert_eq!(
            render_prompt(&turns),
            "User: hi\nAssistant: hello\nUser: how are you"
        );
    }

    #[test]
    fn empty_history_renders_empty_prompt() {
        assert_eq!(render_prompt(&[]), "");
    }

    #[test]
    fn truncates_to_exact_prefix() {
        let long = "a".repeat(3001);
        assert_eq!(truncate_chars(&long, 3000), &long[..3000]);

        let exact = "b".repeat(3000);
        assert_eq!(truncate_chars(&exact, 3000), exact);

        assert_eq!(truncate_chars("short", 3000), "short");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(3005);
        let cut = truncate_chars(&text, 3000);
        assert_eq!(cut.chars().count(), 3000);
        assert!(text.starts_with(cut));
    }
}
