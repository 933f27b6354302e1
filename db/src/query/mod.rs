//! Store-neutral query building blocks: predicates, sort order and page
//! windows. Backends translate these into their own query language, or
//! evaluate them directly.

use std::cmp::Ordering;

use bson::{Bson, Document, doc};

mod datetime;
mod order;
mod pagination;

pub use datetime::{DateParseError, parse_any};
pub use order::{Direction, Order, SortKey};
pub use pagination::{MAX_PAGE_SIZE, Pagination, Window};

/// A single condition on one field of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq { field: &'static str, value: Bson },
    Gt { field: &'static str, value: Bson },
    Lt { field: &'static str, value: Bson },
}

impl Predicate {
    pub fn eq(field: &'static str, value: impl Into<Bson>) -> Self {
        Self::Eq { field, value: value.into() }
    }

    pub fn gt(field: &'static str, value: impl Into<Bson>) -> Self {
        Self::Gt { field, value: value.into() }
    }

    pub fn lt(field: &'static str, value: impl Into<Bson>) -> Self {
        Self::Lt { field, value: value.into() }
    }

    pub fn field(&self) -> &'static str {
        match self {
            Self::Eq { field, .. } | Self::Gt { field, .. } | Self::Lt { field, .. } => field,
        }
    }

    pub fn to_document(&self) -> Document {
        let (field, condition) = match self {
            Self::Eq { field, value } => (field, value.clone()),
            Self::Gt { field, value } => (field, Bson::Document(doc! { "$gt": value.clone() })),
            Self::Lt { field, value } => (field, Bson::Document(doc! { "$lt": value.clone() })),
        };
        let mut document = Document::new();
        document.insert(*field, condition);
        document
    }

    /// Evaluate this predicate against a stored document. A missing field or
    /// a value of a different type never matches.
    pub fn matches(&self, document: &Document) -> bool {
        let (field, expected, wanted) = match self {
            Self::Eq { field, value } => (field, value, Ordering::Equal),
            Self::Gt { field, value } => (field, value, Ordering::Greater),
            Self::Lt { field, value } => (field, value, Ordering::Less),
        };
        document
            .get(*field)
            .and_then(|actual| compare_bson(actual, expected))
            .is_some_and(|ord| ord == wanted)
    }
}

/// An ordered list of predicates, combined with AND.
///
/// Order does not change which records match but is kept stable so the
/// generated query is reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Vec<Predicate>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.0.push(predicate);
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.0.iter().all(|p| p.matches(document))
    }

    /// Query document for the whole filter. Multiple predicates go under
    /// `$and` since two bounds on the same field would collide in a flat
    /// document.
    pub fn to_document(&self) -> Document {
        match self.0.as_slice() {
            [] => Document::new(),
            [single] => single.to_document(),
            many => {
                let clauses: Vec<Bson> = many.iter().map(|p| Bson::Document(p.to_document())).collect();
                doc! { "$and": clauses }
            }
        }
    }
}

impl FromIterator<Predicate> for Filter {
    fn from_iter<I: IntoIterator<Item = Predicate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Everything a store needs to run a listing.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filter: Filter,
    pub order: Order,

    /// `None` returns every matching record.
    pub window: Option<Window>,

    /// Restricts returned documents to these fields. `None` returns whole
    /// records.
    pub projection: Option<&'static [&'static str]>,
}

impl Query {
    pub fn new(filter: Filter, order: Order, window: Window) -> Self {
        Self {
            filter,
            order,
            window: Some(window),
            projection: None,
        }
    }

    pub fn select(mut self, columns: &'static [&'static str]) -> Self {
        self.projection = Some(columns);
        self
    }

    pub fn projection_document(&self) -> Option<Document> {
        self.projection.map(|columns| {
            let mut projection: Document = columns.iter().map(|c| (c.to_string(), Bson::Int32(1))).collect();
            projection.insert("_id", 0);
            projection
        })
    }
}

/// Ordering between two BSON values of comparable types. Numbers compare
/// across integer and floating point representations; anything else of
/// mismatched type is incomparable.
pub fn compare_bson(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (a, b) {
        (Bson::String(a), Bson::String(b)) => Some(a.cmp(b)),
        (Bson::DateTime(a), Bson::DateTime(b)) => Some(a.timestamp_millis().cmp(&b.timestamp_millis())),
        (Bson::Boolean(a), Bson::Boolean(b)) => Some(a.cmp(b)),
        (Bson::Int32(a), Bson::Int32(b)) => Some(a.cmp(b)),
        (Bson::Int64(a), Bson::Int64(b)) => Some(a.cmp(b)),
        (Bson::Null, Bson::Null) => Some(Ordering::Equal),
        _ => match (as_f64(a), as_f64(b)) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}
