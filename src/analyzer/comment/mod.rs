//! Structured annotation extraction from doc comments.
//!
//! Turns a raw `/** ... */` block into an immutable, queryable
//! [`Comment`] model: parameter docs, return type, magic members,
//! template parameters, suppressed issues, and analyzer hints. The tag
//! convention is loosely standardized and not context-free, so the
//! parsers here are ordered heuristics that always succeed; malformed
//! input degrades instead of erroring.

mod builder;
pub mod model;
pub mod suppress;
pub mod tokenizer;
pub mod types;

pub use model::{
    Comment, CommentKind, MagicMethodDoc, MagicPropertyDoc, ParameterDoc, RawComment,
    TemplateTypeDoc, VariableDoc,
};
pub use suppress::parse_suppress_tag_body;
pub use types::{Context, Type, UnionType};
