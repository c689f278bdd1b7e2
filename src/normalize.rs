/// Question prompts G2 interleaves with the reviewer's answers.
const PROMPT_FRAGMENTS: &[&str] = &[
    "What do you like best about",
    "What do you dislike about",
    "What problems is",
    "solving and how is that benefiting you",
];

fn contains_prompt(text: &str) -> bool {
    PROMPT_FRAGMENTS.iter().any(|p| text.contains(p))
}

/// Collapse a review body into a single paragraph of answers.
///
/// Lines that are blank or carry a known prompt fragment are dropped; the rest
/// are trimmed and joined with single spaces. A line is also dropped when
/// joining it would form a prompt fragment across the boundary, so the output
/// never contains one and normalizing twice is a no-op.
pub fn normalize_content(content: &str) -> String {
    let mut out = String::with_capacity(content.len());

    for line in content.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() || contains_prompt(line) {
            continue;
        }

        let joined_len = out.len();
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(trimmed);

        if contains_prompt(&out) {
            out.truncate(joined_len);
        }
    }

    out
}
