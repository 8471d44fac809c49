//! Core types for reply-harvest

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use crate::error::Error;

/// Unique identifier for a listing item
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    /// Create a new ItemId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry in a listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListingItem {
    /// Item identifier, used to build the detail request
    pub id: ItemId,
    /// Item title
    pub title: String,
    /// Grouping key the item belongs to
    pub category: String,
    /// Self text of the item, if any
    pub body: Option<String>,
}

/// A node of a reply tree
///
/// Equality, ordering and hashing only consider `(body, score)`. The `replies`
/// subtree is kept for traversal but never part of a record's identity, so two
/// replies with the same content collapse into one entry regardless of where
/// they sit in their trees.
#[derive(Clone, Debug, Default, Serialize)]
pub struct LeafRecord {
    /// Reply text
    pub body: Option<String>,
    /// Reply score
    pub score: Option<i64>,
    /// Nested replies to this record
    #[serde(skip)]
    pub replies: Option<TreeNode<LeafRecord>>,
}

impl LeafRecord {
    /// Create a record without nested replies
    pub fn new(body: Option<&str>, score: Option<i64>) -> Self {
        Self {
            body: body.map(str::to_string),
            score,
            replies: None,
        }
    }

    /// Identity key used for deduplication
    pub fn key(&self) -> (Option<&str>, Option<i64>) {
        (self.body.as_deref(), self.score)
    }

    /// Copy of this record with its reply subtree dropped
    pub fn detached(&self) -> Self {
        Self {
            body: self.body.clone(),
            score: self.score,
            replies: None,
        }
    }

    /// True when neither body nor score is present
    pub fn is_empty(&self) -> bool {
        self.body.is_none() && self.score.is_none()
    }
}

impl PartialEq for LeafRecord {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for LeafRecord {}

impl Hash for LeafRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for LeafRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LeafRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// One level of a nested listing
#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode<T> {
    /// Type discriminator of the node (e.g. "Listing")
    pub kind: String,
    /// Node payload
    pub data: NodeData<T>,
}

/// Payload of a [`TreeNode`]
#[derive(Clone, Debug, PartialEq)]
pub struct NodeData<T> {
    /// Child entries; `None` when the source omitted or mangled the array
    pub children: Option<Vec<Child<T>>>,
}

/// A `{kind, data}` wrapper around one child of a [`TreeNode`]
#[derive(Clone, Debug, PartialEq)]
pub struct Child<T> {
    /// Type discriminator of the child, when present
    pub kind: Option<String>,
    /// The child record
    pub data: T,
}

impl<T> TreeNode<T> {
    /// Build a node from its children
    pub fn new(kind: impl Into<String>, children: Vec<T>) -> Self {
        Self {
            kind: kind.into(),
            data: NodeData {
                children: Some(
                    children
                        .into_iter()
                        .map(|data| Child { kind: None, data })
                        .collect(),
                ),
            },
        }
    }

    /// Children of this node; an absent array reads as empty
    pub fn children(&self) -> &[Child<T>] {
        self.data.children.as_deref().unwrap_or(&[])
    }

    /// Consume the node, returning its child records
    pub fn into_children(self) -> Vec<T> {
        self.data
            .children
            .unwrap_or_default()
            .into_iter()
            .map(|child| child.data)
            .collect()
    }
}

/// Decoded listing response
#[derive(Clone, Debug, PartialEq)]
pub struct ListingResponse {
    /// Root node of the listing
    pub root: TreeNode<ListingItem>,
}

impl ListingResponse {
    /// Items of the listing, in response order
    pub fn items(&self) -> impl Iterator<Item = &ListingItem> {
        self.root.children().iter().map(|child| &child.data)
    }

    /// Consume the response, returning its items
    pub fn into_items(self) -> Vec<ListingItem> {
        self.root.into_children()
    }
}

/// Decoded detail response for a single item
#[derive(Clone, Debug, PartialEq)]
pub struct DetailResponse {
    /// Echo of the requested item
    pub item: ListingItem,
    /// Root of the item's reply tree
    pub replies: TreeNode<LeafRecord>,
}

/// Deduplicated collection of reply records
///
/// Serializes to a JSON array of `{body, score}` objects sorted by identity key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LeafSet {
    records: HashSet<LeafRecord>,
}

impl LeafSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, dropping its reply subtree.
    ///
    /// Returns false if an equal record was already present.
    pub fn insert(&mut self, record: &LeafRecord) -> bool {
        if self.records.contains(record) {
            return false;
        }
        self.records.insert(record.detached())
    }

    /// Union another set into this one
    pub fn merge(&mut self, other: LeafSet) {
        self.records.extend(other.records);
    }

    /// Check whether an equal record is present
    pub fn contains(&self, record: &LeafRecord) -> bool {
        self.records.contains(record)
    }

    /// Number of distinct records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the set holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over records in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = &LeafRecord> {
        self.records.iter()
    }

    /// Records sorted by identity key
    pub fn to_sorted_vec(&self) -> Vec<LeafRecord> {
        let mut records: Vec<LeafRecord> = self.records.iter().cloned().collect();
        records.sort();
        records
    }
}

impl FromIterator<LeafRecord> for LeafSet {
    fn from_iter<I: IntoIterator<Item = LeafRecord>>(iter: I) -> Self {
        let mut set = LeafSet::new();
        for record in iter {
            set.insert(&record);
        }
        set
    }
}

impl IntoIterator for LeafSet {
    type Item = LeafRecord;
    type IntoIter = std::collections::hash_set::IntoIter<LeafRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl Serialize for LeafSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut records: Vec<&LeafRecord> = self.records.iter().collect();
        records.sort();
        serializer.collect_seq(records)
    }
}

/// A detail fetch that did not contribute to the result
#[derive(Debug)]
pub struct ItemFailure {
    /// The item whose fetch failed
    pub item: ItemId,
    /// Why it failed
    pub error: Error,
}

/// Outcome of a completed harvest
#[derive(Debug, Default)]
pub struct Harvest {
    /// Deduplicated replies from every item that resolved successfully
    pub replies: LeafSet,
    /// Items whose detail fetch failed, in resolution order
    pub failures: Vec<ItemFailure>,
    /// Number of distinct items that were dispatched
    pub items: usize,
}

impl Harvest {
    /// Number of items that contributed to `replies`
    pub fn succeeded(&self) -> usize {
        self.items.saturating_sub(self.failures.len())
    }
}
