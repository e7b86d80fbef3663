//! Query filters
//!
//! A filter is a conjunction of field predicates. It renders to a MongoDB
//! filter document for the real store and evaluates directly against
//! documents for the in-memory collection, so both adapters agree on what
//! a filter means.

use std::cmp::Ordering;

use bson::{doc, Bson, Document};

/// Comparison applied to one field
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Eq(Bson),
    In(Vec<Bson>),
    /// Case-insensitive substring match on string fields
    Contains(String),
    Gt(Bson),
    Gte(Bson),
    Lt(Bson),
    Lte(Bson),
}

impl Op {
    fn operator(&self) -> &'static str {
        match self {
            Op::Eq(_) => "$eq",
            Op::In(_) => "$in",
            Op::Contains(_) => "$regex",
            Op::Gt(_) => "$gt",
            Op::Gte(_) => "$gte",
            Op::Lt(_) => "$lt",
            Op::Lte(_) => "$lte",
        }
    }
}

/// A single field predicate. Dotted field names address nested values.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub op: Op,
}

/// Conjunction of predicates; the empty filter matches every document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Add an arbitrary predicate
    pub fn and(mut self, field: impl Into<String>, op: Op) -> Self {
        self.predicates.push(Predicate {
            field: field.into(),
            op,
        });
        self
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.and(field, Op::Eq(value.into()))
    }

    pub fn is_in<V: Into<Bson>>(
        self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.and(field, Op::In(values.into_iter().map(Into::into).collect()))
    }

    pub fn contains(self, field: impl Into<String>, needle: impl Into<String>) -> Self {
        self.and(field, Op::Contains(needle.into()))
    }

    pub fn gt(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.and(field, Op::Gt(value.into()))
    }

    pub fn gte(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.and(field, Op::Gte(value.into()))
    }

    pub fn lt(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.and(field, Op::Lt(value.into()))
    }

    pub fn lte(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.and(field, Op::Lte(value.into()))
    }

    /// Render as a MongoDB filter document.
    ///
    /// Operators on the same field merge into one operator document
    /// (`{ area_id: { $gte: 10, $lt: 20 } }`). A repeated operator on the
    /// same field cannot share a key, so those go under `$and`.
    pub fn to_document(&self) -> Document {
        let mut merged = Document::new();
        let mut overflow: Vec<Bson> = Vec::new();

        for predicate in &self.predicates {
            let clause = operator_clause(&predicate.op);
            let entry = merged
                .entry(predicate.field.clone())
                .or_insert_with(|| Bson::Document(Document::new()));

            let Bson::Document(ops) = entry else {
                continue;
            };

            if clause.keys().any(|key| ops.contains_key(key)) {
                let field = predicate.field.clone();
                overflow.push(Bson::Document(doc! { field: clause }));
            } else {
                ops.extend(clause);
            }
        }

        if !overflow.is_empty() {
            merged.insert("$and", overflow);
        }

        merged
    }

    /// Evaluate against a document in memory, with MongoDB semantics for
    /// missing fields and array-valued fields.
    pub fn matches(&self, doc: &Document) -> bool {
        self.predicates
            .iter()
            .all(|predicate| predicate_matches(predicate, doc))
    }
}

fn operator_clause(op: &Op) -> Document {
    match op {
        Op::Eq(value) => doc! { "$eq": value.clone() },
        Op::In(values) => doc! { "$in": values.clone() },
        Op::Contains(needle) => doc! { "$regex": escape_regex(needle), "$options": "i" },
        Op::Gt(value) | Op::Gte(value) | Op::Lt(value) | Op::Lte(value) => {
            let operator = op.operator();
            doc! { operator: value.clone() }
        }
    }
}

/// Escape regex metacharacters so a substring search matches literally
pub fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn predicate_matches(predicate: &Predicate, doc: &Document) -> bool {
    let value = lookup_path(doc, &predicate.field);

    match value {
        // An array field matches when any element matches
        Some(Bson::Array(items)) if !matches!(predicate.op, Op::Eq(Bson::Array(_))) => items
            .iter()
            .any(|item| value_matches(&predicate.op, Some(item))),
        other => value_matches(&predicate.op, other),
    }
}

fn value_matches(op: &Op, value: Option<&Bson>) -> bool {
    match op {
        Op::Eq(expected) => equals(value, expected),
        Op::In(candidates) => candidates.iter().any(|c| equals(value, c)),
        Op::Contains(needle) => match value {
            Some(Bson::String(s)) => s.to_lowercase().contains(&needle.to_lowercase()),
            _ => false,
        },
        Op::Gt(bound) => range_cmp(value, bound) == Some(Ordering::Greater),
        Op::Gte(bound) => matches!(
            range_cmp(value, bound),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Op::Lt(bound) => range_cmp(value, bound) == Some(Ordering::Less),
        Op::Lte(bound) => matches!(
            range_cmp(value, bound),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

fn equals(value: Option<&Bson>, expected: &Bson) -> bool {
    match (value, expected) {
        // Missing fields compare equal to null
        (None, Bson::Null) => true,
        (None, _) => false,
        (Some(v), e) => same_type_cmp(v, e) == Some(Ordering::Equal),
    }
}

fn range_cmp(value: Option<&Bson>, bound: &Bson) -> Option<Ordering> {
    same_type_cmp(value?, bound)
}

/// Resolve a dotted path inside a document
pub(crate) fn lookup_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        match current {
            Bson::Document(inner) => current = inner.get(part)?,
            _ => return None,
        }
    }
    Some(current)
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

/// Compare two values that fall in the same MongoDB type bracket.
/// Values from different brackets are incomparable for range predicates.
pub(crate) fn same_type_cmp(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (a, b) {
        (Bson::Int32(x), Bson::Int32(y)) => Some(x.cmp(y)),
        (Bson::Int64(x), Bson::Int64(y)) => Some(x.cmp(y)),
        (Bson::Int32(x), Bson::Int64(y)) => Some(i64::from(*x).cmp(y)),
        (Bson::Int64(x), Bson::Int32(y)) => Some(x.cmp(&i64::from(*y))),
        _ if as_f64(a).is_some() && as_f64(b).is_some() => as_f64(a)?.partial_cmp(&as_f64(b)?),
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.bytes().cmp(&y.bytes())),
        (Bson::Null, Bson::Null) => Some(Ordering::Equal),
        (Bson::Document(x), Bson::Document(y)) => (x == y).then_some(Ordering::Equal),
        (Bson::Array(x), Bson::Array(y)) => (x == y).then_some(Ordering::Equal),
        _ => None,
    }
}

/// Position of a value's type in MongoDB's cross-type sort order
fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) | Some(Bson::Undefined) => 1,
        Some(Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_)) => 2,
        Some(Bson::String(_) | Bson::Symbol(_)) => 3,
        Some(Bson::Document(_)) => 4,
        Some(Bson::Array(_)) => 5,
        Some(Bson::Binary(_)) => 6,
        Some(Bson::ObjectId(_)) => 7,
        Some(Bson::Boolean(_)) => 8,
        Some(Bson::DateTime(_)) => 9,
        Some(Bson::Timestamp(_)) => 10,
        Some(Bson::RegularExpression(_)) => 11,
        Some(_) => 12,
    }
}

/// Total order used for sorting: type bracket first, then value
pub(crate) fn sort_cmp(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Some(x), Some(y)) => same_type_cmp(x, y).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_on_one_field_merges() {
        let filter = Filter::new().gte("area_id", 10).lt("area_id", 20);
        assert_eq!(
            filter.to_document(),
            doc! { "area_id": { "$gte": 10, "$lt": 20 } }
        );
    }

    #[test]
    fn test_repeated_operator_goes_under_and() {
        let filter = Filter::new()
            .contains("nickname", "dra")
            .contains("nickname", "gon");
        let rendered = filter.to_document();

        assert!(rendered.get_document("nickname").is_ok());
        assert_eq!(rendered.get_array("$and").unwrap().len(), 1);
    }

    #[test]
    fn test_contains_is_escaped_and_case_insensitive() {
        let filter = Filter::new().contains("nickname", "a.b");
        assert_eq!(
            filter.to_document(),
            doc! { "nickname": { "$regex": "a\\.b", "$options": "i" } }
        );

        assert!(filter.matches(&doc! { "nickname": "xxA.Byy" }));
        assert!(!filter.matches(&doc! { "nickname": "aXb" }));
    }

    #[test]
    fn test_numeric_widths_compare_equal() {
        let filter = Filter::new().eq("lv", 30_i64);
        assert!(filter.matches(&doc! { "lv": 30_i32 }));
        assert!(filter.matches(&doc! { "lv": 30.0_f64 }));
        assert!(!filter.matches(&doc! { "lv": "30" }));
    }

    #[test]
    fn test_range_ignores_other_types_and_missing() {
        let filter = Filter::new().gte("power", 100);
        assert!(filter.matches(&doc! { "power": 150_i64 }));
        assert!(!filter.matches(&doc! { "power": "999" }));
        assert!(!filter.matches(&doc! { "nickname": "no power" }));
    }

    #[test]
    fn test_nested_path_and_array_membership() {
        let doc = doc! {
            "guild": { "guild_id": "g-7" },
            "friend": { "blocked": ["p9", "p3"] },
        };

        assert!(Filter::new().eq("guild.guild_id", "g-7").matches(&doc));
        assert!(Filter::new().eq("friend.blocked", "p3").matches(&doc));
        assert!(!Filter::new().eq("friend.blocked", "p4").matches(&doc));
    }

    #[test]
    fn test_missing_field_equals_null() {
        let filter = Filter::new().eq("unique_id", Bson::Null);
        assert!(filter.matches(&doc! { "player_id": "p1" }));
    }

    #[test]
    fn test_in_matches_any_candidate() {
        let filter = Filter::new().is_in("player_id", ["p1", "p3"]);
        assert!(filter.matches(&doc! { "player_id": "p3" }));
        assert!(!filter.matches(&doc! { "player_id": "p2" }));
        assert_eq!(
            filter.to_document(),
            doc! { "player_id": { "$in": ["p1", "p3"] } }
        );
    }

    #[test]
    fn test_sort_order_brackets_types() {
        let null = Bson::Null;
        let number = Bson::Int32(5);
        let text = Bson::String("a".into());

        assert_eq!(sort_cmp(None, Some(&number)), Ordering::Less);
        assert_eq!(sort_cmp(Some(&null), None), Ordering::Equal);
        assert_eq!(sort_cmp(Some(&number), Some(&text)), Ordering::Less);
        assert_eq!(
            sort_cmp(Some(&Bson::Int64(7)), Some(&Bson::Double(6.5))),
            Ordering::Greater
        );
    }
}
