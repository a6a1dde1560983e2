use std::fmt;
use std::io::Read;

use crate::Matrix;
use crate::error::{Error, Result};

/// Cell tokens read as a missing value, alongside the empty cell.
const NA_TOKENS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "#N/A N/A",
    "#NA", "<NA>", "-1.#IND", "1.#IND", "-1.#QNAN", "1.#QNAN",
];

/// A single table cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Classify a raw CSV cell.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || NA_TOKENS.contains(&raw) {
            return Value::Missing;
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_nan() => Value::Missing,
            Ok(v) => Value::Number(v),
            Err(_) => Value::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
            Value::Missing => Ok(()),
        }
    }
}

/// Row-major table with a named header.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(Error::MalformedInput(format!(
                    "row {} has {} cells but the header has {} columns",
                    i + 1,
                    row.len(),
                    columns.len()
                )));
            }
        }

        Ok(Self { columns, rows })
    }

    /// Parse a CSV stream with a mandatory header row.
    ///
    /// Any structural problem (no header, ragged rows, invalid UTF-8,
    /// blank or duplicate column names) is reported as [`Error::MalformedInput`].
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let header = reader
            .headers()
            .map_err(|e| Error::MalformedInput(e.to_string()))?
            .clone();
        if header.is_empty() {
            return Err(Error::MalformedInput("missing header row".to_string()));
        }

        let mut columns: Vec<String> = Vec::with_capacity(header.len());
        // Names are kept verbatim; ` Time` is not `Time`.
        for name in header.iter() {
            if name.trim().is_empty() {
                return Err(Error::MalformedInput(format!(
                    "blank column name at position {}",
                    columns.len() + 1
                )));
            }
            if columns.iter().any(|c| c == name) {
                return Err(Error::MalformedInput(format!(
                    "duplicate column name {:?}",
                    name
                )));
            }
            columns.push(name.to_string());
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| Error::MalformedInput(e.to_string()))?;
            rows.push(record.iter().map(Value::parse).collect());
        }

        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// First `n` rows, as shown in the upload preview.
    pub fn head(&self, n: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Keep the given column positions, in the given order.
    pub fn select_columns(&self, indices: &[usize]) -> Self {
        let columns = indices.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Self { columns, rows }
    }

    pub fn retain_rows<F>(&mut self, keep: F)
    where
        F: FnMut(&Vec<Value>) -> bool,
    {
        self.rows.retain(keep);
    }

    /// Dense matrix of a fully numeric table, columns in header order.
    pub fn to_matrix(&self) -> Result<Matrix> {
        let mut matrix = Matrix::zeros((self.n_rows(), self.n_columns()));
        for (i, row) in self.rows.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                matrix[[i, j]] = value.as_f64().ok_or_else(|| Error::InvalidParameter {
                    name: "table",
                    message: format!(
                        "column {:?} row {} is not a complete numeric value",
                        self.columns[j],
                        i + 1
                    ),
                })?;
            }
        }

        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Table> {
        Table::from_csv_reader(text.as_bytes())
    }

    #[test]
    fn test_value_parsing() {
        assert_eq!(Value::parse("3"), Value::Number(3.0));
        assert_eq!(Value::parse(" -1.5e2 "), Value::Number(-150.0));
        assert_eq!(Value::parse(""), Value::Missing);
        assert_eq!(Value::parse("NaN"), Value::Missing);
        assert_eq!(Value::parse("NA"), Value::Missing);
        assert_eq!(Value::parse("abc"), Value::Text("abc".to_string()));
        assert_eq!(Value::parse("inf"), Value::Number(f64::INFINITY));
    }

    #[test]
    fn test_spreadsheet_na_tokens_are_missing() {
        for token in ["#NA", "#N/A N/A", "-1.#IND", "1.#IND", "-1.#QNAN", "1.#QNAN", "<NA>"] {
            assert_eq!(Value::parse(token), Value::Missing, "{token}");
        }
    }

    #[test]
    fn test_header_names_are_not_trimmed() {
        let table = parse(" Time,V1 \n0,1\n").unwrap();
        assert_eq!(table.columns(), &[" Time", "V1 "]);
        assert_eq!(table.column_index("Time"), None);

        assert!(matches!(
            parse("V1,  \n1,2\n").unwrap_err(),
            Error::MalformedInput(_)
        ));
    }

    #[test]
    fn test_table_from_csv() {
        let table = parse("Time,V1,Kind\n0,1.5,a\n1,,b\n").unwrap();
        assert_eq!(table.columns(), &["Time", "V1", "Kind"]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.rows()[1][1], Value::Missing);
        assert_eq!(table.rows()[0][2], Value::Text("a".to_string()));
    }

    #[test]
    fn test_header_only_is_valid() {
        let table = parse("V1,V2\n").unwrap();
        assert_eq!(table.n_columns(), 2);
        assert_eq!(table.n_rows(), 0);
    }

    #[test]
    fn test_ragged_rows_are_malformed() {
        let err = parse("V1,V2\n1,2\n3\n").unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_empty_input_is_malformed() {
        assert!(matches!(parse("").unwrap_err(), Error::MalformedInput(_)));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let bytes: &[u8] = &[0x56, 0x31, 0x0a, 0xff, 0xfe, 0x00, 0x0a];
        let err = Table::from_csv_reader(bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_duplicate_header_is_malformed() {
        assert!(matches!(
            parse("V1,V1\n1,2\n").unwrap_err(),
            Error::MalformedInput(_)
        ));
    }

    #[test]
    fn test_head_and_select() {
        let table = parse("a,b,c\n1,2,3\n4,5,6\n7,8,9\n").unwrap();
        let head = table.head(2);
        assert_eq!(head.n_rows(), 2);

        let picked = table.select_columns(&[2, 0]);
        assert_eq!(picked.columns(), &["c", "a"]);
        assert_eq!(picked.rows()[1], vec![Value::Number(6.0), Value::Number(4.0)]);
    }

    #[test]
    fn test_to_matrix() {
        let table = parse("a,b\n1,2\n3,4\n").unwrap();
        let m = table.to_matrix().unwrap();
        assert_eq!(m.shape(), &[2, 2]);
        assert_eq!(m[[1, 0]], 3.0);

        let text = parse("a\nx\n").unwrap();
        assert!(text.to_matrix().is_err());
    }
}
