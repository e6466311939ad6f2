use std::cmp::Ordering;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the sales table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a CSV column can infer to.
/// Used as a `BTreeSet` / `BTreeMap` key downstream, so it must be `Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet (NaN equals NaN) --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        fn rank(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.2}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl CellValue {
    /// Interpret the value as an `f64` for range filters and means.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Null, or a float NaN (which is how a missing mean surfaces).
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Text form used for CSV export.
    ///
    /// Floats keep a trailing `.0` when integral so an exported column reads
    /// back as floats; nulls become the empty field.
    pub fn to_field(&self) -> String {
        match self {
            CellValue::String(s) => s.clone(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(v) if v.is_nan() => String::new(),
            CellValue::Float(v) => format!("{v:?}"),
            CellValue::Bool(true) => "True".to_string(),
            CellValue::Bool(false) => "False".to_string(),
            CellValue::Null => String::new(),
        }
    }

    /// Text form matched by free-text search. Same as [`CellValue::to_field`]
    /// except that missing values read `nan`.
    pub fn search_text(&self) -> String {
        if self.is_missing() {
            "nan".to_string()
        } else {
            self.to_field()
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnKind – numeric vs categorical, decided by value type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    /// Classify a column from its cells. A column is numeric when it has at
    /// least one non-null cell and every non-null cell is a number.
    pub fn classify<'a>(cells: impl IntoIterator<Item = &'a CellValue>) -> Self {
        let mut saw_number = false;
        for cell in cells {
            match cell {
                CellValue::Null => {}
                CellValue::Integer(_) | CellValue::Float(_) => saw_number = true,
                _ => return ColumnKind::Categorical,
            }
        }
        if saw_number {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn ordering_is_numeric_for_numbers_and_lexicographic_for_text() {
        let set: BTreeSet<CellValue> = [
            CellValue::Integer(10),
            CellValue::Integer(9),
            CellValue::from("Toyota"),
            CellValue::from("Audi"),
            CellValue::Null,
        ]
        .into_iter()
        .collect();
        let ordered: Vec<CellValue> = set.into_iter().collect();
        assert_eq!(
            ordered,
            vec![
                CellValue::Null,
                CellValue::Integer(9),
                CellValue::Integer(10),
                CellValue::from("Audi"),
                CellValue::from("Toyota"),
            ]
        );
    }

    #[test]
    fn field_text_keeps_float_shape() {
        assert_eq!(CellValue::Float(25000.0).to_field(), "25000.0");
        assert_eq!(CellValue::Float(0.5).to_field(), "0.5");
        assert_eq!(CellValue::Integer(42).to_field(), "42");
        assert_eq!(CellValue::Null.to_field(), "");
        assert_eq!(CellValue::Bool(true).to_field(), "True");
    }

    #[test]
    fn search_text_reads_missing_as_nan() {
        assert_eq!(CellValue::Null.search_text(), "nan");
        assert_eq!(CellValue::Float(f64::NAN).search_text(), "nan");
        assert_eq!(CellValue::Integer(26000).search_text(), "26000");
        assert_eq!(CellValue::Float(26000.0).search_text(), "26000.0");
        assert_eq!(CellValue::from("Ford").search_text(), "Ford");
        // Export keeps the empty field.
        assert_eq!(CellValue::Null.to_field(), "");
    }

    #[test]
    fn classify_by_value_type_not_name() {
        let numeric = [CellValue::Integer(1), CellValue::Null, CellValue::Float(2.5)];
        assert_eq!(ColumnKind::classify(&numeric), ColumnKind::Numeric);

        let mixed = [CellValue::Integer(1), CellValue::from("x")];
        assert_eq!(ColumnKind::classify(&mixed), ColumnKind::Categorical);

        let all_null = [CellValue::Null, CellValue::Null];
        assert_eq!(ColumnKind::classify(&all_null), ColumnKind::Categorical);
    }
}
