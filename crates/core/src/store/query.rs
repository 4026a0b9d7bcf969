//! Collection queries: filters and ordering

use std::cmp::Ordering;

use serde_json::Value;

use super::Document;

/// A single predicate on a top-level field
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `field == value`
    Eq { field: String, value: Value },
    /// `field` is an array holding `value`
    ArrayContains { field: String, value: Value },
}

impl Filter {
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Eq { field, value } => doc.get(field) == Some(value),
            Filter::ArrayContains { field, value } => match doc.get(field) {
                Some(Value::Array(items)) => items.contains(value),
                _ => false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A query over one collection path
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    collection: String,
    filters: Vec<Filter>,
    order_by: Option<OrderBy>,
}

impl Query {
    pub fn collection(path: impl Into<String>) -> Self {
        Self {
            collection: path.into(),
            filters: Vec::new(),
            order_by: None,
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn where_array_contains(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::ArrayContains {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn collection_path(&self) -> &str {
        &self.collection
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }

    /// Filter and order documents given in insertion order.
    ///
    /// Ordering drops documents without the order field and keeps insertion
    /// order among equal keys.
    pub fn apply(&self, docs: Vec<Document>) -> Vec<Document> {
        let mut result: Vec<Document> = docs.into_iter().filter(|d| self.matches(d)).collect();

        if let Some(order) = &self.order_by {
            result.retain(|d| d.get(&order.field).is_some());
            result.sort_by(|a, b| {
                let ordering = compare_values(
                    a.get(&order.field).unwrap_or(&Value::Null),
                    b.get(&order.field).unwrap_or(&Value::Null),
                );
                match order.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        result
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over field values: by type first, then by value
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .unwrap_or(0.0)
                .partial_cmp(&y.as_f64().unwrap_or(0.0))
                .unwrap_or(Ordering::Equal),
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn doc(id: &str, value: Value) -> Document {
        Document::from_value(id, value).unwrap()
    }

    fn ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_eq_filter() {
        let query = Query::collection("friends").where_eq("uid", "u1");
        let docs = vec![
            doc("a", json!({ "uid": "u1" })),
            doc("b", json!({ "uid": "u2" })),
            doc("c", json!({})),
        ];
        assert_eq!(ids(&query.apply(docs)), vec!["a"]);
    }

    #[test]
    fn test_array_contains_filter() {
        let query = Query::collection("chats").where_array_contains("members", "u2");
        let docs = vec![
            doc("a", json!({ "members": ["u1"] })),
            doc("b", json!({ "members": ["u1", "u2"] })),
            doc("c", json!({ "members": "u2" })),
        ];
        assert_eq!(ids(&query.apply(docs)), vec!["b"]);
    }

    #[test]
    fn test_order_is_stable_and_drops_missing_field() {
        let query = Query::collection("m").order_by("date", Direction::Ascending);
        let docs = vec![
            doc("late", json!({ "date": 30 })),
            doc("tie1", json!({ "date": 10 })),
            doc("none", json!({})),
            doc("tie2", json!({ "date": 10 })),
        ];
        assert_eq!(ids(&query.apply(docs)), vec!["tie1", "tie2", "late"]);
    }

    #[test]
    fn test_descending_order() {
        let query = Query::collection("m").order_by("date", Direction::Descending);
        let docs = vec![doc("a", json!({ "date": 1 })), doc("b", json!({ "date": 2 }))];
        assert_eq!(ids(&query.apply(docs)), vec!["b", "a"]);
    }

    #[test]
    fn test_mixed_types_order_by_type_rank() {
        assert_eq!(compare_values(&json!(5), &json!("a")), Ordering::Less);
        assert_eq!(compare_values(&json!(2.5), &json!(2)), Ordering::Greater);
    }

    proptest! {
        /// Ordered results are sorted, keep ties in insertion order and lose
        /// only the documents without the field
        #[test]
        fn prop_ascending_order_is_sorted_and_stable(dates in prop::collection::vec(prop::option::of(0i64..5), 0..24)) {
            let docs: Vec<Document> = dates
                .iter()
                .enumerate()
                .map(|(i, date)| match date {
                    Some(date) => doc(i.to_string().as_str(), json!({ "date": date })),
                    None => doc(i.to_string().as_str(), json!({})),
                })
                .collect();
            let query = Query::collection("m").order_by("date", Direction::Ascending);
            let result = query.apply(docs);

            prop_assert_eq!(result.len(), dates.iter().flatten().count());
            let keys: Vec<(i64, usize)> = result
                .iter()
                .map(|d| {
                    let date = d.get("date").and_then(Value::as_i64).unwrap();
                    let seq = d.id.as_str().parse::<usize>().unwrap();
                    (date, seq)
                })
                .collect();
            for pair in keys.windows(2) {
                prop_assert!(pair[0] < pair[1], "{:?} before {:?}", pair[0], pair[1]);
            }
        }
    }
}
