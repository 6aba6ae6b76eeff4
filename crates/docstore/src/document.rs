//! Documents and the operations defined on them directly.
//!
//! A document is a JSON object.  The one key with meaning is `id`, which must be a string.
use serde_json::{Map, Value};

use crate::errors::*;
use crate::ids::IdGenerator;

/// An untyped document.
pub type Document = Map<String, Value>;

/// The key documents are identified by.
pub const ID_KEY: &str = "id";

/// Get the id of a serialized document.
///
/// A missing key, `null`, and the empty string all mean "no id".  Any other non-string is an error.
pub fn document_id(doc: &Value) -> Result<Option<&str>> {
    let obj = doc.as_object().ok_or(Error::NotAnObject)?;
    match obj.get(ID_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(Error::InvalidId),
    }
}

/// Give the document an id if it doesn't have one.  Returns whether one was assigned.
pub fn ensure_id(doc: &mut Value, generator: &dyn IdGenerator) -> Result<bool> {
    if document_id(doc)?.is_some() {
        return Ok(false);
    }

    let obj = doc.as_object_mut().ok_or(Error::NotAnObject)?;
    obj.insert(ID_KEY.to_string(), Value::String(generator.generate()));
    Ok(true)
}

/// Apply a JSON merge patch (RFC 7396) in place.
///
/// This is the same operation `patch` asks SQLite to perform on stored documents, and exists so that callers can see
/// what a patch will do to a document they already have.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    let patch_obj = match patch {
        Value::Object(o) => o,
        _ => {
            *target = patch.clone();
            return;
        }
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let target_obj = match target {
        Value::Object(o) => o,
        _ => unreachable!("Target was just made an object"),
    };

    for (k, v) in patch_obj.iter() {
        if v.is_null() {
            target_obj.remove(k);
        } else {
            merge_patch(target_obj.entry(k.as_str()).or_insert(Value::Null), v);
        }
    }
}
