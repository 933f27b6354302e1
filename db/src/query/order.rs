use std::{cmp::Ordering, fmt};

use bson::{Bson, Document};

use crate::{error::DataError, query::compare_bson};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: &'static str,
    pub direction: Direction,
}

impl SortKey {
    pub fn asc(field: &'static str) -> Self {
        Self { field, direction: Direction::Asc }
    }

    pub fn desc(field: &'static str) -> Self {
        Self { field, direction: Direction::Desc }
    }
}

/// Sort order for a listing. An empty order leaves records in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Order(Vec<SortKey>);

impl Order {
    pub fn new(keys: Vec<SortKey>) -> Self {
        Self(keys)
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse an order expression such as `issued_at desc, serial_number`.
    ///
    /// Each comma-separated item is a column name optionally followed by
    /// `asc` or `desc` (any case). Columns must be listed in `columns`; the
    /// text is never handed to the store as-is.
    pub fn parse(text: &str, columns: &[&'static str]) -> Result<Self, DataError> {
        let mut keys = Vec::new();

        for item in text.split(',') {
            let mut words = item.split_whitespace();
            let Some(column) = words.next() else {
                return Err(DataError::invalid_argument(format!("invalid order expression: {text:?}")));
            };

            let field = columns
                .iter()
                .copied()
                .find(|c| *c == column)
                .ok_or_else(|| DataError::invalid_argument(format!("cannot order by unknown column {column:?}")))?;

            let direction = match words.next().map(str::to_ascii_lowercase).as_deref() {
                None | Some("asc") => Direction::Asc,
                Some("desc") => Direction::Desc,
                Some(other) => {
                    return Err(DataError::invalid_argument(format!("invalid sort direction {other:?}")));
                }
            };

            if words.next().is_some() {
                return Err(DataError::invalid_argument(format!("invalid order expression: {text:?}")));
            }

            keys.push(SortKey { field, direction });
        }

        Ok(Self(keys))
    }

    /// Sort document in MongoDB form (`{ field: 1 | -1 }`).
    pub fn to_document(&self) -> Document {
        let mut sort = Document::new();
        for key in &self.0 {
            let value = match key.direction {
                Direction::Asc => 1,
                Direction::Desc => -1,
            };
            sort.insert(key.field, value);
        }
        sort
    }

    /// Compare two documents under this order. Missing or null fields sort
    /// before any value, as they do in MongoDB.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for key in &self.0 {
            let ord = match (present(a, key.field), present(b, key.field)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => compare_bson(x, y).unwrap_or(Ordering::Equal),
            };
            let ord = match key.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

fn present<'a>(document: &'a Document, field: &str) -> Option<&'a Bson> {
    document.get(field).filter(|v| !matches!(v, Bson::Null))
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let direction = match key.direction {
                Direction::Asc => "asc",
                Direction::Desc => "desc",
            };
            write!(f, "{} {}", key.field, direction)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;
    use crate::error::ErrorKind;

    const COLUMNS: &[&str] = &["issued_at", "serial_number", "expiry"];

    #[test]
    fn test_parse_single_key() {
        let order = Order::parse("issued_at desc", COLUMNS).unwrap();
        assert_eq!(order.keys(), &[SortKey::desc("issued_at")]);
        assert_eq!(order.to_document(), doc! { "issued_at": -1 });
    }

    #[test]
    fn test_parse_multiple_keys_default_ascending() {
        let order = Order::parse("expiry DESC,  serial_number", COLUMNS).unwrap();
        assert_eq!(order.keys(), &[SortKey::desc("expiry"), SortKey::asc("serial_number")]);
        assert_eq!(order.to_string(), "expiry desc, serial_number asc");
    }

    #[test]
    fn test_parse_rejects_unknown_input() {
        for text in ["pem desc", "issued_at sideways", "issued_at desc; drop", "", "issued_at,", "expiry asc extra"] {
            let err = Order::parse(text, COLUMNS).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{text:?}");
        }
    }

    #[test]
    fn test_compare_documents() {
        let order = Order::new(vec![SortKey::desc("expiry"), SortKey::asc("serial_number")]);
        let a = doc! { "expiry": 2, "serial_number": "1" };
        let b = doc! { "expiry": 2, "serial_number": "2" };
        let c = doc! { "expiry": 3, "serial_number": "0" };
        let missing = doc! { "serial_number": "9" };

        assert_eq!(order.compare(&a, &b), Ordering::Less);
        assert_eq!(order.compare(&c, &a), Ordering::Less);
        // Missing sorts lowest, so it comes last under a descending key.
        assert_eq!(order.compare(&missing, &a), Ordering::Greater);
    }
}
