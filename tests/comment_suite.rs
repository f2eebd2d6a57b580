use phpdoc_checker::analyzer::comment::{Comment, CommentKind, Context, Type};
use phpdoc_checker::analyzer::config::AnalyzerConfig;

fn parse(text: &str, kind: CommentKind) -> Comment {
    Comment::from_str_in_context(text, 1, kind, &Context::new(), &AnalyzerConfig::default())
}

#[test]
fn empty_comment_returns_all_defaults() {
    let comment = parse("/** foo */", CommentKind::Method);
    assert!(!comment.is_deprecated());
    assert!(!comment.is_override_intended());
    assert!(!comment.is_ns_internal());
    assert!(!comment.has_return_type());
    assert!(comment.closure_scope().is_none());
    assert!(comment.parameter_list().is_empty());
    assert_eq!(comment.parameter_map().count(), 0);
    assert!(comment.suppress_issue_set().is_empty());
    assert!(!comment.has_parameter("bar", 0));
    assert!(comment.variable_list().is_empty());
    assert_eq!(comment.template_type_list().len(), 0);
    assert_eq!(comment.magic_property_map().count(), 0);
    assert_eq!(comment.magic_method_map().count(), 0);
}

#[test]
fn parameter_map_has_one_entry_per_param() {
    let comment = parse("/** @param int $myParam */", CommentKind::Method);
    let names: Vec<_> = comment.parameter_map().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["myParam"]);

    let doc = comment.parameter("myParam").unwrap();
    assert_eq!(doc.to_string(), "int $myParam");
    assert!(!doc.is_optional());
    assert!(doc.is_required());
    assert!(!doc.is_variadic());
    assert_eq!(doc.name(), "myParam");
    assert!(!doc.is_output_reference());
}

#[test]
fn reference_marker_has_no_effect_on_the_record() {
    let comment = parse("/** @param int &$myParam */", CommentKind::Method);
    let doc = comment.parameter("myParam").unwrap();
    assert_eq!(doc.to_string(), "int $myParam");
    assert!(!doc.is_optional());
    assert!(doc.is_required());
    assert!(!doc.is_variadic());
    assert!(!doc.is_output_reference());
}

#[test]
fn variadic_parameter_is_optional() {
    let comment = parse("/** @param int|string ...$args */", CommentKind::Method);
    let doc = comment.parameter("args").unwrap();
    assert_eq!(doc.to_string(), "int|string ...$args");
    assert!(doc.is_optional());
    assert!(!doc.is_required());
    assert!(doc.is_variadic());
    assert_eq!(doc.name(), "args");
    assert!(!doc.is_output_reference());
}

#[test]
fn output_reference_marks_only_the_preceding_parameter() {
    let comment = parse(
        "/** @param int|string $args @phan-output-reference\n@param string $other*/",
        CommentKind::Method,
    );

    let names: Vec<_> = comment.parameter_map().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["args", "other"]);
    assert!(comment.parameter("args").unwrap().is_output_reference());
    assert!(!comment.parameter("other").unwrap().is_output_reference());
}

#[test]
fn standalone_output_reference_line_targets_the_last_parameter() {
    let comment = parse(
        "/**\n * @param int $first\n * @param string $target\n * @phan-output-reference\n */",
        CommentKind::Method,
    );
    assert!(!comment.parameter("first").unwrap().is_output_reference());
    assert!(comment.parameter("target").unwrap().is_output_reference());
}

#[test]
fn return_tag_sets_the_return_type() {
    let comment = parse("/** @return int|string */", CommentKind::Method);
    assert!(comment.has_return_type());
    assert_eq!(comment.return_type().to_string(), "int|string");
}

#[test]
fn return_this_is_the_late_static_binding_marker() {
    let comment = parse("/** @return $this */", CommentKind::Method);
    assert!(comment.has_return_type());
    assert_eq!(comment.return_type().to_string(), "static");
    assert!(comment.return_type().has_type(&Type::StaticSelf));
}

#[test]
fn return_type_extraction_keeps_hyphenated_scalars_whole() {
    let comment = parse("/** @return callable-string description */", CommentKind::Method);
    assert_eq!(comment.return_type().to_string(), "callable-string");
}

#[test]
fn magic_property_is_recorded_on_classes() {
    let comment = parse("/** @property int|string   $myProp */", CommentKind::Class);
    assert!(comment.has_magic_property("myProp"));
    let property = comment.magic_property("myProp").unwrap();
    assert_eq!(property.to_string(), "int|string $myProp");
}

#[test]
fn magic_methods_render_canonical_signatures() {
    let comment_text = "/**\n * @method static int|string my_method(int $x, stdClass ...$rest) description\n * @method myInstanceMethod2(int, $other = 'myString') description\n */";
    let comment = parse(comment_text, CommentKind::Class);

    let names: Vec<_> = comment.magic_method_map().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["my_method", "myInstanceMethod2"]);

    let method = comment.magic_method("my_method").unwrap();
    assert_eq!(
        method.to_string(),
        "static function my_method(int $x, \\stdClass ...$rest) : int|string"
    );
    assert_eq!(method.name(), "my_method");
    assert!(method.is_static());

    let instance_method = comment.magic_method("myInstanceMethod2").unwrap();
    assert_eq!(
        instance_method.to_string(),
        "function myInstanceMethod2(int $p1, $other = default) : void"
    );
    assert_eq!(instance_method.name(), "myInstanceMethod2");
    assert!(!instance_method.is_static());
}

#[test]
fn template_tag_matching_is_case_sensitive() {
    let comment_text = "/**\n * The check for template is case-sensitive.\n * @template T1\n * @Template TestIgnored\n * @template u\n */";
    let comment = parse(comment_text, CommentKind::Class);

    let templates = comment.template_type_list();
    assert_eq!(templates.len(), 2);
    assert_eq!(templates[0].name(), "T1");
    assert_eq!(templates[1].name(), "u");
}

#[test]
fn suppress_grammar_recovers_plugin_qualified_names() {
    let comment = parse("/** @suppress MyPlugin-string description */", CommentKind::Method);
    assert!(comment.suppress_issue_set().contains("MyPlugin-string"));

    let comment = parse(
        "/** @suppress MyPlugin_Issue- description of why this was suppressed */",
        CommentKind::Method,
    );
    assert!(comment.suppress_issue_set().contains("MyPlugin_Issue"));

    let comment = parse(
        "/** @suppress MyPlugin--description of why this was suppressed */",
        CommentKind::Method,
    );
    assert!(comment.suppress_issue_set().contains("MyPlugin"));

    let comment = parse(
        "/** @suppress MyPluginIssue, MyOtherPlugin-Issue--description of why this was suppressed */",
        CommentKind::Method,
    );
    assert!(comment.suppress_issue_set().contains("MyPluginIssue"));
    assert!(comment.suppress_issue_set().contains("MyOtherPlugin-Issue"));
    assert_eq!(comment.suppress_issue_set().len(), 2);
}

#[test]
fn repeated_suppress_tags_collapse_into_one_set() {
    let comment = parse(
        "/**\n * @suppress PhanUnusedVariable\n * @suppress PhanUnusedVariable, PhanUndeclaredMethod\n */",
        CommentKind::Method,
    );
    let names: Vec<_> = comment.suppress_issue_set().iter().cloned().collect();
    assert_eq!(names, vec!["PhanUndeclaredMethod", "PhanUnusedVariable"]);
}

#[test]
fn generic_array_key_loss_is_consistent_in_both_positions() {
    let comment_text = "/**\n * @param array<mixed, string> $myParam\n * @param array<string , stdClass> ...$rest\n */";
    let comment = parse(comment_text, CommentKind::Method);

    let names: Vec<_> = comment.parameter_map().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["myParam", "rest"]);

    let my_param = comment.parameter("myParam").unwrap();
    assert_eq!(my_param.to_string(), "string[] $myParam");
    assert!(my_param.is_required());
    assert!(!my_param.is_variadic());

    let rest = comment.parameter("rest").unwrap();
    assert_eq!(rest.to_string(), "array<string,\\stdClass> ...$rest");
    assert!(rest.is_optional());
    assert!(!rest.is_required());
    assert!(rest.is_variadic());
}

#[test]
fn var_tags_accumulate_positionally() {
    let comment_text =
        "/**\n * @var int $my_int\n * @var array<string , stdClass> $array\n */";
    let comment = parse(comment_text, CommentKind::Method);

    assert!(comment.parameter_list().is_empty());
    let variables = comment.variable_list();
    assert_eq!(variables.len(), 2);
    assert_eq!(variables[0].to_string(), "int $my_int");
    assert_eq!(variables[0].name(), Some("my_int"));
    assert_eq!(variables[1].to_string(), "array<string,\\stdClass> $array");
    assert_eq!(variables[1].name(), Some("array"));
}

#[test]
fn unparsable_var_still_registers_a_best_effort_record() {
    let comment = parse("/** @var (Unparsable) */", CommentKind::Property);
    let variables = comment.variable_list();
    assert_eq!(variables.len(), 1);
    assert_eq!(variables[0].name(), None);
    // The type degrades instead of crashing the builder.
    assert_eq!(variables[0].union_type().types().len(), 1);
}

#[test]
fn closure_scope_records_a_single_declared_type() {
    let comment = parse("/** @phan-closure-scope MyNS\\MyClass */", CommentKind::Function);
    let scope = comment.closure_scope().expect("scope should be defined");
    assert_eq!(scope.to_string(), "\\MyNS\\MyClass");
}

#[test]
fn property_and_method_tags_are_inert_outside_classes() {
    let comment = parse(
        "/**\n * @property int $p\n * @method int m()\n * @template T\n */",
        CommentKind::Function,
    );
    assert_eq!(comment.magic_property_map().count(), 0);
    assert_eq!(comment.magic_method_map().count(), 0);
    assert!(comment.template_type_list().is_empty());
}

#[test]
fn param_tags_are_inert_on_class_comments() {
    let comment = parse("/** @param int $x */", CommentKind::Class);
    assert!(comment.parameter_list().is_empty());
}

#[test]
fn unknown_tags_are_silently_ignored() {
    let comment = parse(
        "/**\n * @author someone\n * @see OtherClass\n * @param int $x\n */",
        CommentKind::Method,
    );
    assert_eq!(comment.parameter_map().count(), 1);
}

#[test]
fn use_aliases_resolve_in_parameter_types() {
    let mut context = Context::new().with_namespace("App");
    context.add_use("Account", "Vendor\\Models\\User");
    let comment = Comment::from_str_in_context(
        "/** @param Account $who */",
        1,
        CommentKind::Method,
        &context,
        &AnalyzerConfig::default(),
    );
    let who = comment.parameter("who").unwrap();
    assert_eq!(who.to_string(), "\\Vendor\\Models\\User $who");
}

#[test]
fn malformed_param_does_not_abort_the_rest_of_the_comment() {
    let comment = parse(
        "/**\n * @param int\n * @param string $ok\n * @return bool\n */",
        CommentKind::Method,
    );
    assert_eq!(comment.parameter_map().count(), 1);
    assert!(comment.parameter("ok").is_some());
    assert_eq!(comment.return_type().to_string(), "bool");
}

#[test]
fn annotation_toggles_gate_tag_families_independently() {
    let config = AnalyzerConfig {
        read_magic_property_annotations: false,
        ..AnalyzerConfig::default()
    };
    let comment = Comment::from_str_in_context(
        "/**\n * @property int $p\n * @method int m()\n */",
        1,
        CommentKind::Class,
        &Context::new(),
        &config,
    );
    assert_eq!(comment.magic_property_map().count(), 0);
    assert_eq!(comment.magic_method_map().count(), 1);
}
