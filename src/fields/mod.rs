//! Built-in field handlers.
//!
//! Inline fields participate in running text; container fields form a
//! block's structural sections and may recurse into further fields. Each
//! handler validates its own payload shape, so a registry miss or a bad key
//! is reported against the specific field type that rejected it.

mod anchor;
mod code;
mod details;
mod fieldset;
mod footnote;
mod list;
mod literal;
mod option;
mod paragraph;
mod picture;
mod select;
mod table;
mod tags;

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::FieldError;
use crate::node::{JsonMap, content_of, str_key};
use crate::registry::TypeRegistry;

pub(crate) use option::option_data;

/// Wire every built-in field handler into the registry.
pub fn register_defaults(registry: &mut TypeRegistry) {
    registry.register_field(Arc::new(anchor::AnchorField));
    registry.register_field(Arc::new(tags::TagField));
    registry.register_field(Arc::new(literal::LiteralField));
    registry.register_field(Arc::new(picture::PictureField));
    registry.register_field(Arc::new(select::SelectField));
    registry.register_field(Arc::new(option::OptionField));
    registry.register_field(Arc::new(footnote::FootnoteField));
    registry.register_field(Arc::new(paragraph::ParagraphField));
    registry.register_field(Arc::new(code::CodeField));
    registry.register_field(Arc::new(list::ListField));
    registry.register_field(Arc::new(table::TableField));
    registry.register_field(Arc::new(details::DetailsField));
    registry.register_field(Arc::new(fieldset::FieldsetField));
}

static EMPTY_CONTENT: Lazy<JsonMap> = Lazy::new(JsonMap::new);

/// A field's `content` payload, or an empty map for fields that omit it.
pub(crate) fn payload(node: &JsonMap) -> &JsonMap {
    content_of(node).unwrap_or(&EMPTY_CONTENT)
}

/// A required, non-empty string payload key.
pub(crate) fn require_str<'a>(
    type_name: &str,
    content: &'a JsonMap,
    key: &'static str,
) -> Result<&'a str, FieldError> {
    str_key(content, key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| FieldError::missing_key(type_name, key))
}
