/* Recognized annotation keys and their interpretation */

use crate::error::{GenError, GenResult};
use crate::naming::{go_case, is_exported_identifier, GO_RESERVED};
use idl_types::{Annotations, Program, TypeSpec};

/// Identifier override for a declaration, field or enum item.
pub const GO_NAME: &str = "go.name";
/// Human-readable label used in JSON, logs and text marshaling.
pub const GO_LABEL: &str = "go.label";
/// Representation override for sets. Only [`GO_TYPE_SLICE`] is accepted.
pub const GO_TYPE: &str = "go.type";
pub const GO_TYPE_SLICE: &str = "slice";
/// Extra struct tag text merged over the default `json` tag.
pub const GO_TAG: &str = "go.tag";
/// Presence excludes a field from structured logging.
pub const GO_NOLOG: &str = "go.nolog";

/// Where an annotation was found, for error messages.
#[derive(Debug, Clone, Copy)]
pub struct Site<'a> {
    pub entity: &'a str,
    pub file: &'a str,
}

/// Go identifier for `name`, honoring a `go.name` override.
pub fn identifier(name: &str, annotations: &Annotations, site: Site<'_>) -> GenResult<String> {
    match annotations.get(GO_NAME) {
        Some(ident) if is_exported_identifier(ident) && !GO_RESERVED.contains(&ident.as_str()) => Ok(ident.clone()),
        Some(ident) => Err(GenError::InvalidIdentifier {
            identifier: ident.clone(),
            entity: site.entity.to_string(),
            file: site.file.to_string(),
        }),
        None => Ok(go_case(name)),
    }
}

pub fn label<'a>(name: &'a str, annotations: &'a Annotations) -> &'a str {
    annotations.get(GO_LABEL).map(String::as_str).unwrap_or(name)
}

pub fn no_log(annotations: &Annotations) -> bool {
    annotations.contains_key(GO_NOLOG)
}

/// Whether a set of `element` is a deduplicating keyed container. Sets of
/// unhashable elements, and sets forced with `go.type: slice`, are sequences.
pub fn set_is_keyed(program: &Program, element: &TypeSpec, annotations: &Annotations) -> bool {
    annotations.get(GO_TYPE).map(String::as_str) != Some(GO_TYPE_SLICE) && is_hashable(program, element)
}

/// Hashable types may key a map or a keyed set.
pub fn is_hashable(program: &Program, ty: &TypeSpec) -> bool {
    matches!(
        program.root_type(ty),
        TypeSpec::Bool
            | TypeSpec::I8
            | TypeSpec::I16
            | TypeSpec::I32
            | TypeSpec::I64
            | TypeSpec::Double
            | TypeSpec::String
            | TypeSpec::Enum(_)
    )
}

/// Reject unknown `go.type` values anywhere inside `ty`.
pub fn validate_type(ty: &TypeSpec, site: Site<'_>) -> GenResult<()> {
    match ty {
        TypeSpec::List(element) => validate_type(element, site),
        TypeSpec::Set { element, annotations } => {
            if let Some(value) = annotations.get(GO_TYPE) {
                if value != GO_TYPE_SLICE {
                    return Err(GenError::InvalidAnnotation {
                        key: GO_TYPE.to_string(),
                        value: value.clone(),
                        entity: site.entity.to_string(),
                        file: site.file.to_string(),
                        reason: format!("the only supported value is {GO_TYPE_SLICE:?}"),
                    });
                }
            }
            validate_type(element, site)
        }
        TypeSpec::Map { key, value } => {
            validate_type(key, site)?;
            validate_type(value, site)
        }
        _ => Ok(()),
    }
}

/// One `key:"value"` pair of a Go struct tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPair {
    pub key: String,
    pub value: String,
}

/// Parse struct tag text the way Go's `reflect.StructTag` reads it.
pub fn parse_struct_tag(text: &str) -> Result<Vec<TagPair>, String> {
    let mut pairs = Vec::new();
    let mut rest = text.trim_start_matches(' ');
    while !rest.is_empty() {
        let key_len = rest
            .find(|c: char| c <= ' ' || c == ':' || c == '"' || c == '\u{7f}')
            .unwrap_or(rest.len());
        if key_len == 0 {
            return Err(format!("expected a tag key at {rest:?}"));
        }
        let key = &rest[..key_len];
        rest = &rest[key_len..];

        rest = rest.strip_prefix(":\"").ok_or_else(|| format!("tag key {key} must be followed by :\""))?;

        let mut end = None;
        let mut escaped = false;
        for (i, c) in rest.char_indices() {
            match c {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => {
                    end = Some(i);
                    break;
                }
                '`' => return Err("tag text may not contain a backquote".to_string()),
                _ => escaped = false,
            }
        }
        let end = end.ok_or_else(|| format!("unterminated value for tag key {key}"))?;
        pairs.push(TagPair { key: key.to_string(), value: rest[..end].to_string() });
        rest = rest[end + 1..].trim_start_matches(' ');
    }
    Ok(pairs)
}

/// Full struct tag for a field: the default `json` tag, overridden or
/// extended by the pairs in `go.tag`.
pub fn struct_tag(label: &str, required: bool, annotations: &Annotations, site: Site<'_>) -> GenResult<String> {
    let json = if required { format!("{label},required") } else { format!("{label},omitempty") };
    let mut pairs = vec![TagPair { key: "json".to_string(), value: json }];

    if let Some(text) = annotations.get(GO_TAG) {
        let extra = parse_struct_tag(text).map_err(|reason| GenError::InvalidAnnotation {
            key: GO_TAG.to_string(),
            value: text.clone(),
            entity: site.entity.to_string(),
            file: site.file.to_string(),
            reason,
        })?;
        for pair in extra {
            match pairs.iter_mut().find(|p| p.key == pair.key) {
                Some(existing) => existing.value = pair.value,
                None => pairs.push(pair),
            }
        }
    }

    let rendered: Vec<String> = pairs.iter().map(|p| format!("{}:\"{}\"", p.key, p.value)).collect();
    Ok(format!("`{}`", rendered.join(" ")))
}
