use crate::analyzer::config::AnalyzerConfig;

use super::model::{
    Comment, CommentKind, MagicMethodDoc, MagicMethodParam, MagicPropertyDoc, ParameterDoc,
    RawComment, TemplateTypeDoc, VariableDoc,
};
use super::suppress::parse_suppress_tag_body;
use super::tokenizer::tag_lines;
use super::types::{split_top_level, Context, Type, UnionType};

/// Marker that retroactively flags the most recently declared parameter
/// as an output reference. May appear as its own tag line or trailing a
/// `@param` line.
const OUTPUT_REFERENCE_MARKER: &str = "@phan-output-reference";

impl Comment {
    /// Parse a raw doc comment into an immutable model. Parsing is total:
    /// malformed tag bodies degrade to best-effort records or are dropped,
    /// and unknown tags are inert.
    pub fn from_raw(raw: &RawComment<'_>, context: &Context, config: &AnalyzerConfig) -> Comment {
        CommentBuilder {
            context,
            config,
            kind: raw.kind,
            comment: Comment::default(),
        }
        .build(raw.text, raw.line)
    }

    /// Convenience constructor mirroring the extraction layer: text plus
    /// the declaration's kind and starting line.
    pub fn from_str_in_context(
        text: &str,
        line: usize,
        kind: CommentKind,
        context: &Context,
        config: &AnalyzerConfig,
    ) -> Comment {
        Comment::from_raw(&RawComment::new(text, line, kind), context, config)
    }
}

/// Single-use accumulator for one comment's parse. Tag order matters
/// (output-reference markers target the last declared parameter), so this
/// is one left-to-right scan over the tokenizer's output.
struct CommentBuilder<'a> {
    context: &'a Context,
    config: &'a AnalyzerConfig,
    kind: CommentKind,
    comment: Comment,
}

impl<'a> CommentBuilder<'a> {
    fn build(mut self, text: &str, start_line: usize) -> Comment {
        for tag in tag_lines(text, start_line) {
            self.dispatch(tag.name, tag.body);
        }
        self.comment
    }

    /// Tag names match case-sensitively: `@Template` is not `@template`.
    fn dispatch(&mut self, name: &str, body: &str) {
        match name {
            "param" if self.read_param_tags() => self.visit_param(body),
            "return" if self.read_param_tags() => self.visit_return(body),
            "var" if self.config.read_type_annotations => self.visit_var(body),
            "property" | "property-read" | "property-write" if self.read_property_tags() => {
                self.visit_property(body)
            }
            "method" if self.read_method_tags() => self.visit_method(body),
            "template" if self.kind == CommentKind::Class && self.config.read_type_annotations => {
                self.visit_template(body)
            }
            "phan-closure-scope" if self.accepts_closure_scope() => {
                self.visit_closure_scope(body)
            }
            "phan-output-reference" if self.read_param_tags() => self.mark_last_parameter_output(),
            "suppress" => self.visit_suppress(body),
            "deprecated" => self.comment.deprecated = true,
            "internal" => self.comment.ns_internal = true,
            "override" => self.comment.override_intended = true,
            _ => {}
        }
    }

    fn read_param_tags(&self) -> bool {
        self.kind.is_function_like() && self.config.read_type_annotations
    }

    fn read_property_tags(&self) -> bool {
        self.kind == CommentKind::Class && self.config.read_magic_property_annotations
    }

    fn read_method_tags(&self) -> bool {
        self.kind == CommentKind::Class && self.config.read_magic_method_annotations
    }

    fn accepts_closure_scope(&self) -> bool {
        matches!(self.kind, CommentKind::Function | CommentKind::Closure)
            && self.config.read_type_annotations
    }

    /// `@param <type> [&][...]$name [= default] [description]`
    fn visit_param(&mut self, body: &str) {
        if let Some(parameter) = build_parameter(body, self.context) {
            self.comment
                .parameters_by_name
                .insert(parameter.name().to_string(), self.comment.parameters.len());
            self.comment.parameters.push(parameter);
        }

        // The marker may trail the param on the same line, in which case
        // "most recently declared" is the one we just pushed.
        if body.contains(OUTPUT_REFERENCE_MARKER) {
            self.mark_last_parameter_output();
        }
    }

    fn mark_last_parameter_output(&mut self) {
        if let Some(parameter) = self.comment.parameters.last_mut() {
            parameter.set_output_reference();
        }
    }

    /// `@return <type> [description]`
    fn visit_return(&mut self, body: &str) {
        let (union_type, _description) = split_leading_type(body, self.context);
        if !union_type.is_empty() {
            self.comment.return_type = union_type;
        }
    }

    /// `@var <type> [$name] [description]`, accumulated positionally.
    /// Always registers a best-effort record, even when no type syntax is
    /// recognizable.
    fn visit_var(&mut self, body: &str) {
        let (union_type, rest) = split_leading_type(body, self.context);
        let name = parse_variable_name(rest).map(|(name, _)| name.to_string());
        self.comment
            .variables
            .push(VariableDoc::new(name, union_type));
    }

    /// `@property <type> $name [description]`
    fn visit_property(&mut self, body: &str) {
        let (union_type, rest) = split_leading_type(body, self.context);
        if let Some((name, _)) = parse_variable_name(rest) {
            self.comment
                .magic_properties_by_name
                .insert(name.to_string(), self.comment.magic_properties.len());
            self.comment
                .magic_properties
                .push(MagicPropertyDoc::new(name.to_string(), union_type));
        }
    }

    /// `@method [static] [<returnType>] name(<paramList>) [description]`
    fn visit_method(&mut self, body: &str) {
        if let Some(method) = build_magic_method(body, self.context) {
            self.comment
                .magic_methods_by_name
                .insert(method.name().to_string(), self.comment.magic_methods.len());
            self.comment.magic_methods.push(method);
        }
    }

    /// `@template <name>`. Duplicates are kept in declaration order.
    fn visit_template(&mut self, body: &str) {
        let name = body.split_whitespace().next().unwrap_or_default();
        if is_identifier(name) {
            self.comment
                .template_types
                .push(TemplateTypeDoc::new(name.to_string()));
        }
    }

    /// `@phan-closure-scope <class>`: a single declared type.
    fn visit_closure_scope(&mut self, body: &str) {
        let token = body.split_whitespace().next().unwrap_or_default();
        if token.is_empty() {
            return;
        }
        let scope_type = Type::parse(token, self.context);
        if !matches!(scope_type, Type::Unparsable(_)) {
            self.comment.closure_scope = Some(scope_type);
        }
    }

    fn visit_suppress(&mut self, body: &str) {
        self.comment
            .suppressed_issues
            .extend(parse_suppress_tag_body(body));
    }
}

/// Extract the maximal leading type expression from a tag body. The type
/// is a run of type-syntax characters terminated by top-level whitespace;
/// whitespace inside generic brackets (`array<string , stdClass>`) does
/// not terminate it. Returns the parsed union and the remaining text.
///
/// Tokens that introduce the variable part (`&`, `...`, `$name` other
/// than `$this`) mean the type was omitted entirely.
fn split_leading_type<'a>(body: &'a str, context: &Context) -> (UnionType, &'a str) {
    let body = body.trim();
    let mut depth = 0i32;
    let mut end = body.len();

    for (index, ch) in body.char_indices() {
        match ch {
            '<' | '(' | '{' | '[' => depth += 1,
            '>' | ')' | '}' | ']' => depth -= 1,
            ch if ch.is_whitespace() && depth <= 0 => {
                end = index;
                break;
            }
            _ => {}
        }
    }

    let candidate = &body[..end];
    if candidate.is_empty() || starts_variable_part(candidate) {
        return (UnionType::empty(), body);
    }

    (UnionType::parse(candidate, context), body[end..].trim_start())
}

fn starts_variable_part(token: &str) -> bool {
    if token == "$this" {
        return false;
    }
    token.starts_with('$') || token.starts_with('&') || token.starts_with("...")
}

/// Parse `[&][...]$name` at the start of `text`. Returns the name and the
/// text following it. The reference marker is recognized and discarded;
/// variadic status is reported separately by `parse_parameter_shape`.
fn parse_variable_name(text: &str) -> Option<(&str, &str)> {
    let (_, name, rest) = parse_parameter_shape(text)?;
    Some((name, rest))
}

/// Returns (is_variadic, name, rest-after-name).
fn parse_parameter_shape(text: &str) -> Option<(bool, &str, &str)> {
    let mut text = text.trim_start();
    if let Some(rest) = text.strip_prefix('&') {
        text = rest.trim_start();
    }
    let is_variadic = if let Some(rest) = text.strip_prefix("...") {
        text = rest.trim_start();
        true
    } else {
        false
    };

    let rest = text.strip_prefix('$')?;
    let name_len = rest
        .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
        .unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }

    Some((is_variadic, &rest[..name_len], rest[name_len..].trim_start()))
}

fn build_parameter(body: &str, context: &Context) -> Option<ParameterDoc> {
    let (union_type, rest) = split_leading_type(body, context);
    let (is_variadic, name, after_name) = parse_parameter_shape(rest)?;
    let has_default = after_name.starts_with('=');

    Some(ParameterDoc::new(
        name.to_string(),
        union_type,
        is_variadic,
        has_default,
    ))
}

fn build_magic_method(body: &str, context: &Context) -> Option<MagicMethodDoc> {
    let mut body = body.trim();
    let is_static = match body.strip_prefix("static") {
        Some(rest) if rest.starts_with(char::is_whitespace) => {
            body = rest.trim_start();
            true
        }
        _ => false,
    };

    let open_paren = body.find('(')?;
    let head = body[..open_paren].trim();
    let tail = &body[open_paren + 1..];

    // The last whitespace-separated word before the parentheses is the
    // method name; anything before it is the return type.
    let name = head.split_whitespace().last()?;
    if !is_identifier(name) {
        return None;
    }
    let return_text = head[..head.len() - name.len()].trim_end();
    let return_type = UnionType::parse(return_text, context);

    let close_paren = matching_close_paren(tail)?;
    let parameters = split_top_level(&tail[..close_paren], ',')
        .iter()
        .filter(|fragment| !fragment.trim().is_empty())
        .map(|fragment| build_magic_method_param(fragment, context))
        .collect();

    Some(MagicMethodDoc::new(
        name.to_string(),
        is_static,
        parameters,
        return_type,
    ))
}

/// A `@method` parameter may be just a type, just a `$name`, or both,
/// with an optional default token that is kept as a placeholder.
fn build_magic_method_param(fragment: &str, context: &Context) -> MagicMethodParam {
    let (union_type, rest) = split_leading_type(fragment, context);
    match parse_parameter_shape(rest) {
        Some((is_variadic, name, after_name)) => MagicMethodParam::new(
            Some(name.to_string()),
            union_type,
            is_variadic,
            after_name.starts_with('='),
        ),
        None => MagicMethodParam::new(None, union_type, false, false),
    }
}

/// Index of the `)` closing the parameter list, given text starting just
/// after the opening `(`. The trailing description may itself contain
/// parentheses, so this balances rather than taking the last one.
fn matching_close_paren(text: &str) -> Option<usize> {
    let mut depth = 1i32;
    for (index, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str, kind: CommentKind) -> Comment {
        Comment::from_str_in_context(
            text,
            1,
            kind,
            &Context::new(),
            &AnalyzerConfig::default(),
        )
    }

    #[test]
    fn split_leading_type_stops_at_prose() {
        let context = Context::new();
        let (union, rest) = split_leading_type("callable-string description", &context);
        assert_eq!(union.to_string(), "callable-string");
        assert_eq!(rest, "description");
    }

    #[test]
    fn split_leading_type_allows_spaces_inside_generics() {
        let context = Context::new();
        let (union, rest) = split_leading_type("array<string , stdClass> ...$rest", &context);
        assert_eq!(union.to_string(), "array<string,\\stdClass>");
        assert_eq!(rest, "...$rest");
    }

    #[test]
    fn split_leading_type_treats_dollar_name_as_missing_type() {
        let context = Context::new();
        let (union, rest) = split_leading_type("$other = 'myString'", &context);
        assert!(union.is_empty());
        assert_eq!(rest, "$other = 'myString'");
    }

    #[test]
    fn parameter_with_default_is_optional() {
        let parameter = build_parameter("int $limit = 10 how many", &Context::new()).unwrap();
        assert_eq!(parameter.name(), "limit");
        assert!(parameter.is_optional());
        assert!(!parameter.is_variadic());
    }

    #[test]
    fn parameter_without_name_is_dropped() {
        assert!(build_parameter("int", &Context::new()).is_none());
        assert!(build_parameter("", &Context::new()).is_none());
    }

    #[test]
    fn magic_method_defaults_missing_return_type_to_void() {
        let method =
            build_magic_method("myInstanceMethod2(int, $other = 'myString') description", &Context::new())
                .unwrap();
        assert_eq!(
            method.to_string(),
            "function myInstanceMethod2(int $p1, $other = default) : void"
        );
        assert!(!method.is_static());
    }

    #[test]
    fn magic_method_without_parentheses_is_dropped() {
        assert!(build_magic_method("int notAMethod", &Context::new()).is_none());
    }

    #[test]
    fn property_tags_only_apply_to_classes() {
        let comment = parse("/** @property int $x */", CommentKind::Method);
        assert_eq!(comment.magic_property_map().count(), 0);

        let comment = parse("/** @property int $x */", CommentKind::Class);
        assert!(comment.has_magic_property("x"));
    }

    #[test]
    fn disabled_annotation_families_are_discarded() {
        let config = AnalyzerConfig {
            read_type_annotations: false,
            ..AnalyzerConfig::default()
        };
        let comment = Comment::from_str_in_context(
            "/** @param int $x\n * @suppress PhanUnusedVariable */",
            1,
            CommentKind::Method,
            &Context::new(),
            &config,
        );
        assert!(comment.parameter_list().is_empty());
        // Suppressions are not a type annotation and survive the toggle.
        assert!(comment.suppress_issue_set().contains("PhanUnusedVariable"));
    }

    #[test]
    fn flag_tags_set_their_booleans() {
        let comment = parse(
            "/**\n * @deprecated\n * @override\n * @internal\n */",
            CommentKind::Method,
        );
        assert!(comment.is_deprecated());
        assert!(comment.is_override_intended());
        assert!(comment.is_ns_internal());
    }

    #[test]
    fn closure_scope_is_recorded_for_functions() {
        let comment = parse("/** @phan-closure-scope MyNS\\MyClass */", CommentKind::Function);
        let scope = comment.closure_scope().expect("scope should be set");
        assert_eq!(scope.to_string(), "\\MyNS\\MyClass");

        let comment = parse("/** @phan-closure-scope MyNS\\MyClass */", CommentKind::Method);
        assert!(comment.closure_scope().is_none());
    }
}
