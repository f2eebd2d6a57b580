/// Parser for the `@suppress` tag body.
///
/// The informal convention is `Name1, Name2 -- free-text description`,
/// where each name is optionally plugin-qualified (`Plugin-IssueName`).
/// A single dash joining two identifier segments is part of the name; a
/// run of two or more dashes, or a lone dash followed by whitespace,
/// starts the free-text description. The heuristics below are ordered and
/// intentionally match the historical behavior; see the cases in the
/// tests before "cleaning up" anything here.
pub fn parse_suppress_tag_body(body: &str) -> Vec<String> {
    // Everything after the first run of two-or-more dashes is description.
    let names_part = match find_double_dash(body) {
        Some(index) => &body[..index],
        None => body,
    };

    let mut issue_names = Vec::new();
    for candidate in names_part.split(',') {
        let candidate = candidate.trim();

        // Only the leading whitespace-free token can be a name; anything
        // after the first space is description ("MyPlugin_Issue- why ...").
        let token = candidate
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .trim_end_matches('-');

        if !token.is_empty() && is_issue_name(token) {
            issue_names.push(token.to_string());
        }
    }

    issue_names
}

fn find_double_dash(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    bytes.windows(2).position(|pair| pair == b"--")
}

fn is_issue_name(token: &str) -> bool {
    token
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}
