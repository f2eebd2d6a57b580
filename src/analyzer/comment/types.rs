use std::collections::HashMap;
use std::fmt;

/// Name-resolution context for one file: the current namespace plus the
/// aliases introduced by `use` declarations.
#[derive(Debug, Clone, Default)]
pub struct Context {
    namespace: Option<String>,
    uses: HashMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Register a `use` alias. `target` is the imported name without a
    /// leading backslash, e.g. `App\Models\User`.
    pub fn add_use(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.uses.insert(alias.into(), target.into());
    }

    /// Resolve a class-like name to its fully qualified form (leading `\`).
    ///
    /// Already-qualified names pass through; otherwise the first segment is
    /// looked up in the alias table, and unresolved names fall back to the
    /// current namespace (or the root namespace when there is none).
    pub fn resolve(&self, name: &str) -> String {
        if let Some(rest) = name.strip_prefix('\\') {
            return format!("\\{rest}");
        }

        let (first, rest) = match name.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };

        if let Some(target) = self.uses.get(first) {
            return match rest {
                Some(rest) => format!("\\{target}\\{rest}"),
                None => format!("\\{target}"),
            };
        }

        match &self.namespace {
            Some(namespace) => format!("\\{namespace}\\{name}"),
            None => format!("\\{name}"),
        }
    }
}

/// Type names that stay bare (no namespace qualification) in canonical
/// renderings. Sorted for binary search; all entries lowercase.
const BUILTIN_TYPE_NAMES: &[&str] = &[
    "array",
    "bool",
    "callable",
    "callable-array",
    "callable-object",
    "callable-string",
    "class-string",
    "false",
    "float",
    "int",
    "iterable",
    "mixed",
    "never",
    "non-empty-array",
    "non-empty-string",
    "null",
    "numeric-string",
    "object",
    "parent",
    "resource",
    "scalar",
    "self",
    "static",
    "string",
    "true",
    "void",
];

fn is_builtin_type_name(lowered: &str) -> bool {
    BUILTIN_TYPE_NAMES.binary_search(&lowered).is_ok()
}

/// One atom of a union type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// Built-in scalar or pseudo-type, rendered bare and lowercase.
    Builtin(String),

    /// Class-like name, stored fully qualified with a leading `\`.
    Named(String),

    /// The late static binding marker produced by `$this` or `static`.
    StaticSelf,

    /// Array of a single element type: `T[]`, `array<T>`, `array<mixed,T>`.
    Array(Box<Type>),

    /// `array<K,V>` with a non-mixed key. The key is kept for rendering but
    /// plays no role in element-type queries; see the DESIGN notes on the
    /// deliberate key-type loss.
    GenericArray { key: String, value: Box<Type> },

    /// Nullable shorthand `?T`.
    Nullable(Box<Type>),

    /// A fragment that did not tokenize as any known type shape. The raw
    /// text is kept for debugging; the canonical rendering degrades to
    /// `mixed`.
    Unparsable(String),
}

impl Type {
    /// Parse a single (non-union) type fragment. Total: unrecognizable
    /// input becomes `Type::Unparsable`.
    pub fn parse(fragment: &str, context: &Context) -> Type {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return Type::Unparsable(String::new());
        }

        if let Some(inner) = fragment.strip_prefix('?') {
            return Type::Nullable(Box::new(Type::parse(inner, context)));
        }

        if let Some(base) = fragment.strip_suffix("[]") {
            return Type::Array(Box::new(Type::parse(base, context)));
        }

        if fragment == "$this" {
            return Type::StaticSelf;
        }

        if let Some((base, params)) = split_generic(fragment) {
            return Self::parse_generic(base, params, context, fragment);
        }

        let lowered = fragment.to_ascii_lowercase();
        if is_builtin_type_name(&lowered) {
            if lowered == "static" {
                return Type::StaticSelf;
            }
            return Type::Builtin(lowered);
        }

        let unqualified = fragment.strip_prefix('\\').unwrap_or(fragment);
        if is_class_like_name(unqualified) {
            return Type::Named(context.resolve(fragment));
        }

        Type::Unparsable(fragment.to_string())
    }

    fn parse_generic(base: &str, params: &str, context: &Context, raw: &str) -> Type {
        if !base.eq_ignore_ascii_case("array") {
            // Non-array generics collapse to their base name; the type
            // arguments are not modeled.
            if is_class_like_name(base.strip_prefix('\\').unwrap_or(base)) {
                return Type::Named(context.resolve(base));
            }
            return Type::Unparsable(raw.to_string());
        }

        let params = split_top_level(params, ',');
        match params.as_slice() {
            [value] => Type::Array(Box::new(Type::parse(value, context))),
            [key, value] => {
                let key = key.trim();
                let value = Box::new(Type::parse(value, context));
                if key.eq_ignore_ascii_case("mixed") {
                    // The synthetic array key is discarded on purpose: the
                    // original analyzer ignores it, and downstream code
                    // relies on the `V[]` rendering.
                    Type::Array(value)
                } else {
                    Type::GenericArray {
                        key: key.to_ascii_lowercase(),
                        value,
                    }
                }
            }
            _ => Type::Unparsable(raw.to_string()),
        }
    }

    /// The element type this atom describes, ignoring array keys.
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(inner) => Some(inner),
            Type::GenericArray { value, .. } => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Builtin(name) => write!(f, "{name}"),
            Type::Named(fq_name) => write!(f, "{fq_name}"),
            Type::StaticSelf => write!(f, "static"),
            Type::Array(inner) => write!(f, "{inner}[]"),
            Type::GenericArray { key, value } => write!(f, "array<{key},{value}>"),
            Type::Nullable(inner) => write!(f, "?{inner}"),
            Type::Unparsable(_) => write!(f, "mixed"),
        }
    }
}

/// An ordered union of type atoms. Parsing is total: every input string
/// yields some union, with unrecognizable fragments degrading to
/// `Type::Unparsable` atoms rather than errors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnionType {
    types: Vec<Type>,
}

impl UnionType {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_type(ty: Type) -> Self {
        Self { types: vec![ty] }
    }

    /// Parse a union type expression such as `int|string` or
    /// `array<string , stdClass>|null`. Splits on `|` at bracket depth zero
    /// only.
    pub fn parse(text: &str, context: &Context) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::empty();
        }

        let types = split_top_level(text, '|')
            .iter()
            .filter(|fragment| !fragment.trim().is_empty())
            .map(|fragment| Type::parse(fragment, context))
            .collect();

        Self { types }
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    /// Structural membership test, used e.g. to check for the late static
    /// binding marker.
    pub fn has_type(&self, ty: &Type) -> bool {
        self.types.contains(ty)
    }
}

impl fmt::Display for UnionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, ty) in self.types.iter().enumerate() {
            if index > 0 {
                write!(f, "|")?;
            }
            write!(f, "{ty}")?;
        }
        Ok(())
    }
}

fn is_class_like_name(name: &str) -> bool {
    let mut segments = name.split('\\');
    segments.all(|segment| {
        let mut chars = segment.chars();
        match chars.next() {
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {}
            _ => return false,
        }
        chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    })
}

/// Split `text` on `separator` at angle-bracket depth zero.
pub(crate) fn split_top_level(text: &str, separator: char) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;

    for ch in text.chars() {
        match ch {
            '<' | '(' | '{' | '[' => {
                depth += 1;
                current.push(ch);
            }
            '>' | ')' | '}' | ']' => {
                depth -= 1;
                current.push(ch);
            }
            ch if ch == separator && depth == 0 => {
                result.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() || !result.is_empty() {
        result.push(current.trim().to_string());
    }

    result
}

/// Split a generic type into base and parameter text.
/// `array<string, int>` -> `("array", "string, int")`.
fn split_generic(text: &str) -> Option<(&str, &str)> {
    let start = text.find('<')?;
    let end = text.rfind('>')?;
    if end <= start || end != text.len() - 1 {
        return None;
    }

    Some((&text[..start], &text[start + 1..end]))
}
