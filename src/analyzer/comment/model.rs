use std::collections::{BTreeSet, HashMap};
use std::fmt;

use super::types::{Type, UnionType};

/// Which kind of declaration a doc comment is attached to. Gating of tags
/// (e.g. `@method` only on classes) dispatches over this closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Class,
    Variable,
    Property,
    Const,
    Method,
    Function,
    Closure,
}

impl CommentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CommentKind::Class => "class",
            CommentKind::Variable => "variable",
            CommentKind::Property => "property",
            CommentKind::Const => "const",
            CommentKind::Method => "method",
            CommentKind::Function => "function",
            CommentKind::Closure => "closure",
        }
    }

    /// Kinds whose comments may carry `@param`/`@return` family tags.
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            CommentKind::Method | CommentKind::Function | CommentKind::Closure
        )
    }
}

/// A raw doc comment before parsing: the original text, the 1-based line
/// it starts on, and the kind of declaration it documents. Discarded once
/// the `Comment` model is built.
#[derive(Debug, Clone)]
pub struct RawComment<'a> {
    pub text: &'a str,
    pub line: usize,
    pub kind: CommentKind,
}

impl<'a> RawComment<'a> {
    pub fn new(text: &'a str, line: usize, kind: CommentKind) -> Self {
        Self { text, line, kind }
    }
}

/// One `@param` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDoc {
    name: String,
    union_type: UnionType,
    is_variadic: bool,
    has_default: bool,
    is_output_reference: bool,
}

impl ParameterDoc {
    pub(super) fn new(
        name: String,
        union_type: UnionType,
        is_variadic: bool,
        has_default: bool,
    ) -> Self {
        Self {
            name,
            union_type,
            is_variadic,
            has_default,
            is_output_reference: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn union_type(&self) -> &UnionType {
        &self.union_type
    }

    pub fn is_variadic(&self) -> bool {
        self.is_variadic
    }

    /// Variadic parameters and parameters with a documented default are
    /// optional.
    pub fn is_optional(&self) -> bool {
        self.is_variadic || self.has_default
    }

    pub fn is_required(&self) -> bool {
        !self.is_optional()
    }

    pub fn is_output_reference(&self) -> bool {
        self.is_output_reference
    }

    pub(super) fn set_output_reference(&mut self) {
        self.is_output_reference = true;
    }
}

impl fmt::Display for ParameterDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.union_type.is_empty() {
            write!(f, "{} ", self.union_type)?;
        }
        if self.is_variadic {
            write!(f, "...")?;
        }
        write!(f, "${}", self.name)
    }
}

/// One `@var` record, accumulated positionally. The variable name is
/// optional in the tag grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDoc {
    name: Option<String>,
    union_type: UnionType,
}

impl VariableDoc {
    pub(super) fn new(name: Option<String>, union_type: UnionType) -> Self {
        Self { name, union_type }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn union_type(&self) -> &UnionType {
        &self.union_type
    }
}

impl fmt::Display for VariableDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.union_type)?;
        if let Some(name) = &self.name {
            if !self.union_type.is_empty() {
                write!(f, " ")?;
            }
            write!(f, "${name}")?;
        }
        Ok(())
    }
}

/// A magic property synthesized from `@property` (or its read/write
/// variants); these do not exist in the declaration's own source body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicPropertyDoc {
    name: String,
    union_type: UnionType,
}

impl MagicPropertyDoc {
    pub(super) fn new(name: String, union_type: UnionType) -> Self {
        Self { name, union_type }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn union_type(&self) -> &UnionType {
        &self.union_type
    }
}

impl fmt::Display for MagicPropertyDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.union_type.is_empty() {
            write!(f, "{} ", self.union_type)?;
        }
        write!(f, "${}", self.name)
    }
}

/// One parameter inside a `@method` signature. Unlike `@param`, the name
/// may be absent (a synthetic positional name is used when rendering) and
/// defaults are kept as placeholders, never evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicMethodParam {
    name: Option<String>,
    union_type: UnionType,
    is_variadic: bool,
    has_default: bool,
}

impl MagicMethodParam {
    pub(super) fn new(
        name: Option<String>,
        union_type: UnionType,
        is_variadic: bool,
        has_default: bool,
    ) -> Self {
        Self {
            name,
            union_type,
            is_variadic,
            has_default,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn union_type(&self) -> &UnionType {
        &self.union_type
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, position: usize) -> fmt::Result {
        if !self.union_type.is_empty() {
            write!(f, "{} ", self.union_type)?;
        }
        if self.is_variadic {
            write!(f, "...")?;
        }
        match &self.name {
            Some(name) => write!(f, "${name}")?,
            None => write!(f, "$p{}", position + 1)?,
        }
        if self.has_default {
            write!(f, " = default")?;
        }
        Ok(())
    }
}

/// A magic method synthesized from `@method`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicMethodDoc {
    name: String,
    is_static: bool,
    parameters: Vec<MagicMethodParam>,
    return_type: UnionType,
}

impl MagicMethodDoc {
    pub(super) fn new(
        name: String,
        is_static: bool,
        parameters: Vec<MagicMethodParam>,
        return_type: UnionType,
    ) -> Self {
        Self {
            name,
            is_static,
            parameters,
            return_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn parameters(&self) -> &[MagicMethodParam] {
        &self.parameters
    }

    pub fn return_type(&self) -> &UnionType {
        &self.return_type
    }
}

impl fmt::Display for MagicMethodDoc {
    /// Renders the full signature used in diagnostics, e.g.
    /// `static function my_method(int $x, \stdClass ...$rest) : int|string`.
    /// A missing return type renders as `void`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_static {
            write!(f, "static ")?;
        }
        write!(f, "function {}(", self.name)?;
        for (position, parameter) in self.parameters.iter().enumerate() {
            if position > 0 {
                write!(f, ", ")?;
            }
            parameter.render(f, position)?;
        }
        write!(f, ") : ")?;
        if self.return_type.is_empty() {
            write!(f, "void")
        } else {
            write!(f, "{}", self.return_type)
        }
    }
}

/// One declared `@template` type parameter. Identity is case-sensitive
/// and ordering is declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateTypeDoc {
    name: String,
}

impl TemplateTypeDoc {
    pub(super) fn new(name: String) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The immutable, queryable result of parsing one doc comment. Built by
/// the comment builder; freely shareable across threads afterwards.
#[derive(Debug, Clone, Default)]
pub struct Comment {
    pub(super) deprecated: bool,
    pub(super) override_intended: bool,
    pub(super) ns_internal: bool,
    pub(super) return_type: UnionType,
    pub(super) parameters: Vec<ParameterDoc>,
    pub(super) parameters_by_name: HashMap<String, usize>,
    pub(super) variables: Vec<VariableDoc>,
    pub(super) magic_properties: Vec<MagicPropertyDoc>,
    pub(super) magic_properties_by_name: HashMap<String, usize>,
    pub(super) magic_methods: Vec<MagicMethodDoc>,
    pub(super) magic_methods_by_name: HashMap<String, usize>,
    pub(super) template_types: Vec<TemplateTypeDoc>,
    pub(super) suppressed_issues: BTreeSet<String>,
    pub(super) closure_scope: Option<Type>,
}

impl Comment {
    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn is_override_intended(&self) -> bool {
        self.override_intended
    }

    pub fn is_ns_internal(&self) -> bool {
        self.ns_internal
    }

    pub fn has_return_type(&self) -> bool {
        !self.return_type.is_empty()
    }

    pub fn return_type(&self) -> &UnionType {
        &self.return_type
    }

    /// All `@param` records in declaration order.
    pub fn parameter_list(&self) -> &[ParameterDoc] {
        &self.parameters
    }

    /// The `@param` records keyed by name, in declaration order.
    pub fn parameter_map(&self) -> impl Iterator<Item = (&str, &ParameterDoc)> {
        self.parameters
            .iter()
            .map(|parameter| (parameter.name(), parameter))
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterDoc> {
        self.parameters_by_name
            .get(name)
            .map(|&index| &self.parameters[index])
    }

    /// True when a parameter with the given name exists, or when `offset`
    /// is a valid declaration-order index.
    pub fn has_parameter(&self, name: &str, offset: usize) -> bool {
        self.parameters_by_name.contains_key(name) || offset < self.parameters.len()
    }

    /// All `@var` records, indexed positionally (0, 1, ...).
    pub fn variable_list(&self) -> &[VariableDoc] {
        &self.variables
    }

    pub fn magic_property_map(&self) -> impl Iterator<Item = (&str, &MagicPropertyDoc)> {
        self.magic_properties
            .iter()
            .map(|property| (property.name(), property))
    }

    pub fn magic_property(&self, name: &str) -> Option<&MagicPropertyDoc> {
        self.magic_properties_by_name
            .get(name)
            .map(|&index| &self.magic_properties[index])
    }

    pub fn has_magic_property(&self, name: &str) -> bool {
        self.magic_properties_by_name.contains_key(name)
    }

    pub fn magic_method_map(&self) -> impl Iterator<Item = (&str, &MagicMethodDoc)> {
        self.magic_methods
            .iter()
            .map(|method| (method.name(), method))
    }

    pub fn magic_method(&self, name: &str) -> Option<&MagicMethodDoc> {
        self.magic_methods_by_name
            .get(name)
            .map(|&index| &self.magic_methods[index])
    }

    /// Declared `@template` names in declaration order, duplicates kept.
    pub fn template_type_list(&self) -> &[TemplateTypeDoc] {
        &self.template_types
    }

    /// The de-duplicated set of suppressed issue names, sorted.
    pub fn suppress_issue_set(&self) -> &BTreeSet<String> {
        &self.suppressed_issues
    }

    pub fn closure_scope(&self) -> Option<&Type> {
        self.closure_scope.as_ref()
    }
}
