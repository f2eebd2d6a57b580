/// One recognized tag line inside a doc comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagLine<'a> {
    /// Tag name without the leading `@`, exactly as written (tag matching
    /// elsewhere is case-sensitive).
    pub name: &'a str,
    /// Remainder of the line after the tag name, trimmed. Tags never span
    /// multiple lines.
    pub body: &'a str,
    /// 1-based source line the tag appears on.
    pub line: usize,
}

/// Lazily scan a raw `/** ... */` comment, stripping comment decoration
/// and yielding one `TagLine` per line that starts with `@`. Prose lines
/// and lines with unknown decoration are skipped; classifying the tag name
/// is the caller's problem, so unknown tags flow through here unharmed.
pub fn tag_lines(comment: &str, start_line: usize) -> impl Iterator<Item = TagLine<'_>> {
    comment.lines().enumerate().filter_map(move |(offset, line)| {
        let stripped = strip_decoration(line);
        let rest = stripped.strip_prefix('@')?;

        let name_len = rest
            .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'))
            .unwrap_or(rest.len());
        if name_len == 0 {
            return None;
        }

        Some(TagLine {
            name: &rest[..name_len],
            body: rest[name_len..].trim(),
            line: start_line + offset,
        })
    })
}

/// Remove the `/**`, leading `*`, and `*/` decoration from a single
/// comment line.
fn strip_decoration(line: &str) -> &str {
    let mut line = line.trim();
    if let Some(rest) = line.strip_prefix("/**") {
        line = rest;
    }
    while let Some(rest) = line.strip_prefix('*') {
        // Avoid eating the closing `*/` slash as tag text.
        if rest.starts_with('/') {
            return "";
        }
        line = rest.trim_start();
    }
    if let Some(rest) = line.strip_suffix("*/") {
        line = rest;
    }
    line.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_star_decoration_and_finds_tags() {
        let comment = "/**\n * Some prose.\n * @param int $x\n * @return string\n */";
        let tags: Vec<_> = tag_lines(comment, 10).collect();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "param");
        assert_eq!(tags[0].body, "int $x");
        assert_eq!(tags[0].line, 12);
        assert_eq!(tags[1].name, "return");
        assert_eq!(tags[1].line, 13);
    }

    #[test]
    fn single_line_comment_yields_its_tag() {
        let tags: Vec<_> = tag_lines("/** @var int $count */", 3).collect();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "var");
        assert_eq!(tags[0].body, "int $count");
        assert_eq!(tags[0].line, 3);
    }

    #[test]
    fn prose_and_bare_at_signs_are_skipped() {
        let comment = "/**\n * Contact admin@example.com\n * @\n * not a tag @param int $x\n */";
        assert_eq!(tag_lines(comment, 1).count(), 0);
    }

    #[test]
    fn tag_names_keep_their_case_and_hyphens() {
        let comment = "/**\n * @Template T\n * @phan-closure-scope MyClass\n */";
        let tags: Vec<_> = tag_lines(comment, 1).collect();
        assert_eq!(tags[0].name, "Template");
        assert_eq!(tags[1].name, "phan-closure-scope");
        assert_eq!(tags[1].body, "MyClass");
    }

    #[test]
    fn tag_bodies_never_span_lines() {
        let comment = "/**\n * @param int $x\n *   continued prose\n */";
        let tags: Vec<_> = tag_lines(comment, 1).collect();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].body, "int $x");
    }
}
