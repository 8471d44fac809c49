//! Decoding of raw JSON into typed records.
//!
//! Every field is looked up into a [`Field`] outcome first and only then resolved as
//! required or optional. Required fields turn a missing or mismatched value into a
//! [`DecodeError`] that fails the whole response. Optional fields turn the same
//! outcomes into `None`, so one malformed optional value never aborts its siblings.

use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::types::{
    Child, DetailResponse, ItemId, LeafRecord, ListingItem, ListingResponse, NodeData, TreeNode,
};


/// Minimum number of elements in a detail response array
pub const DETAIL_RESPONSE_LEN: usize = 2;

/// Types that can be decoded from a raw JSON value
pub trait Decode: Sized {
    /// Decode `value`, failing only when required structure is violated
    fn decode(value: &Value) -> Result<Self, DecodeError>;
}

/// Outcome of looking up a single field
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    /// The field exists and has the expected type
    Present(T),
    /// The field is absent or null
    Missing,
    /// The field exists but has a different type
    Mismatched {
        /// The JSON type that was expected
        expected: &'static str,
    },
}

impl<T> Field<T> {
    /// Resolve as a required field
    pub fn required(self, context: &'static str, field: &'static str) -> Result<T, DecodeError> {
        match self {
            Field::Present(value) => Ok(value),
            Field::Missing => Err(DecodeError::MissingField { context, field }),
            Field::Mismatched { expected } => Err(DecodeError::WrongType {
                context,
                field,
                expected,
            }),
        }
    }

    /// Resolve as an optional field
    pub fn optional(self, context: &'static str, field: &'static str) -> Option<T> {
        match self {
            Field::Present(value) => Some(value),
            Field::Missing => None,
            Field::Mismatched { expected } => {
                tracing::trace!(context, field, expected, "Ignoring malformed optional field");
                None
            }
        }
    }
}

/// Field accessor over one JSON object
struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn of(value: &'a Value, context: &'static str) -> Result<Self, DecodeError> {
        value
            .as_object()
            .map(|map| Self { map })
            .ok_or(DecodeError::NotAnObject { context })
    }

    fn lookup<T>(
        &self,
        name: &str,
        expected: &'static str,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Field<T> {
        match self.map.get(name) {
            None | Some(Value::Null) => Field::Missing,
            Some(value) => match extract(value) {
                Some(v) => Field::Present(v),
                None => Field::Mismatched { expected },
            },
        }
    }

    fn str(&self, name: &str) -> Field<&'a str> {
        self.lookup(name, "a string", Value::as_str)
    }

    fn integer(&self, name: &str) -> Field<i64> {
        self.lookup(name, "an integer", as_integer)
    }

    fn object(&self, name: &str) -> Field<&'a Value> {
        self.lookup(name, "an object", |v| v.is_object().then_some(v))
    }

    fn array(&self, name: &str) -> Field<&'a Vec<Value>> {
        self.lookup(name, "an array", Value::as_array)
    }
}

/// Integers, and floats with no fractional part that fit in an i64
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    // i64::MAX is not exactly representable; exclusive upper bound keeps the cast exact
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

impl Decode for ListingItem {
    fn decode(value: &Value) -> Result<Self, DecodeError> {
        const CTX: &str = "listing item";
        let fields = Fields::of(value, CTX)?;

        Ok(ListingItem {
            id: ItemId::from(fields.str("id").required(CTX, "id")?),
            title: fields.str("title").required(CTX, "title")?.to_string(),
            category: fields
                .str("subreddit")
                .required(CTX, "subreddit")?
                .to_string(),
            body: fields
                .str("selftext")
                .optional(CTX, "selftext")
                .map(str::to_string),
        })
    }
}

impl Decode for LeafRecord {
    fn decode(value: &Value) -> Result<Self, DecodeError> {
        const CTX: &str = "leaf record";
        let fields = Fields::of(value, CTX)?;

        // The API sends `"replies": ""` for a record without replies, which lands in
        // Mismatched and reads as absent like any other malformed optional.
        let replies = fields
            .object("replies")
            .optional(CTX, "replies")
            .and_then(|raw| match TreeNode::<LeafRecord>::decode(raw) {
                Ok(node) => Some(node),
                Err(e) => {
                    tracing::debug!(error = %e, "Dropping undecodable reply subtree");
                    None
                }
            });

        Ok(LeafRecord {
            body: fields.str("body").optional(CTX, "body").map(str::to_string),
            score: fields.integer("score").optional(CTX, "score"),
            replies,
        })
    }
}

impl<T: Decode> Decode for Child<T> {
    fn decode(value: &Value) -> Result<Self, DecodeError> {
        const CTX: &str = "tree child";
        let fields = Fields::of(value, CTX)?;

        Ok(Child {
            kind: fields.str("kind").optional(CTX, "kind").map(str::to_string),
            data: T::decode(fields.object("data").required(CTX, "data")?)?,
        })
    }
}

impl<T: Decode> Decode for TreeNode<T> {
    fn decode(value: &Value) -> Result<Self, DecodeError> {
        const CTX: &str = "tree node";
        let fields = Fields::of(value, CTX)?;
        let kind = fields.str("kind").required(CTX, "kind")?.to_string();
        let data = Fields::of(fields.object("data").required(CTX, "data")?, CTX)?;

        let children = match data.array("children").optional(CTX, "children") {
            Some(raw) => Some(
                raw.iter()
                    .map(Child::<T>::decode)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };

        Ok(TreeNode {
            kind,
            data: NodeData { children },
        })
    }
}

impl Decode for ListingResponse {
    fn decode(value: &Value) -> Result<Self, DecodeError> {
        Ok(ListingResponse {
            root: TreeNode::decode(value)?,
        })
    }
}

impl Decode for DetailResponse {
    fn decode(value: &Value) -> Result<Self, DecodeError> {
        let elements = value.as_array().ok_or(DecodeError::WrongType {
            context: "detail response",
            field: "<root>",
            expected: "an array",
        })?;
        if elements.len() < DETAIL_RESPONSE_LEN {
            return Err(DecodeError::ResponseShape {
                expected: DETAIL_RESPONSE_LEN,
                found: elements.len(),
            });
        }

        let item = TreeNode::<ListingItem>::decode(&elements[0])?
            .into_children()
            .into_iter()
            .next()
            .ok_or(DecodeError::MissingItemEcho)?;
        let replies = TreeNode::<LeafRecord>::decode(&elements[1])?;

        Ok(DetailResponse { item, replies })
    }
}
