//! Progress import/export formats
//!
//! JSON mirrors the stored document: `{"levels": {<key>: {plays, stars,
//! hints}}, "attempts": n}`. CSV has one quoted row per level key with the
//! pattern id and grid split back out of the key.

use super::{ProgressKey, ProgressRecord, ProgressStore};
use crate::error::{CsvError, ImportError};

/// CSV column names, in order
pub const CSV_HEADER: [&str; 5] = ["pattern", "grid", "plays", "stars", "hints"];

/// Pretty-printed JSON export of the whole store
pub fn export_json(store: &ProgressStore) -> serde_json::Result<String> {
    serde_json::to_string_pretty(store)
}

/// Parse an exported JSON document. Missing fields default to empty/0.
pub fn import_json(json: &str) -> Result<ProgressStore, ImportError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(ImportError::NotAnObject);
    }
    Ok(serde_json::from_value(value)?)
}

/// One level as shown in the dashboard table and CSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRow {
    pub pattern: String,
    /// `None` when the key is not in `grid{N}_id{id}` form
    pub grid: Option<u32>,
    pub record: ProgressRecord,
}

impl LevelRow {
    pub fn new(key: &ProgressKey, record: ProgressRecord) -> Self {
        match key.parse() {
            Some((grid, id)) => Self {
                pattern: id.to_owned(),
                grid: Some(grid),
                record,
            },
            None => Self {
                pattern: key.as_str().to_owned(),
                grid: None,
                record,
            },
        }
    }

    /// Rebuild the storage key
    pub fn key(&self) -> ProgressKey {
        match self.grid {
            Some(grid) => ProgressKey::new(grid, &self.pattern),
            None => ProgressKey::from_raw(self.pattern.clone()),
        }
    }

    fn fields(&self) -> [String; 5] {
        [
            self.pattern.clone(),
            self.grid.map(|g| g.to_string()).unwrap_or_default(),
            self.record.plays.to_string(),
            self.record.stars.to_string(),
            self.record.hints.to_string(),
        ]
    }
}

/// Rows for every stored level, in key order
pub fn level_rows(store: &ProgressStore) -> Vec<LevelRow> {
    store
        .levels
        .iter()
        .map(|(key, record)| LevelRow::new(key, *record))
        .collect()
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| quote(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// CSV export: header plus one row per level, every field quoted
pub fn to_csv(store: &ProgressStore) -> String {
    let mut lines = vec![csv_line(&CSV_HEADER)];
    lines.extend(level_rows(store).iter().map(|row| csv_line(&row.fields())));
    lines.join("\n")
}

/// Split CSV text into records, tracking the line each record starts on
fn records(text: &str) -> Result<Vec<(usize, Vec<String>)>, CsvError> {
    let mut out = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut line = 1;
    let mut start_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if quoted {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => quoted = false,
                '\n' => {
                    line += 1;
                    field.push(ch);
                }
                _ => field.push(ch),
            }
            continue;
        }
        match ch {
            '"' if field.is_empty() => quoted = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                if fields.len() > 1 || !fields[0].is_empty() {
                    out.push((start_line, std::mem::take(&mut fields)));
                }
                fields.clear();
                line += 1;
                start_line = line;
            }
            _ => field.push(ch),
        }
    }

    if quoted {
        return Err(CsvError::UnterminatedQuote { line: start_line });
    }
    if !fields.is_empty() || !field.is_empty() {
        fields.push(field);
        out.push((start_line, fields));
    }
    Ok(out)
}

fn number<T: std::str::FromStr>(
    line: usize,
    field: &'static str,
    value: &str,
) -> Result<T, CsvError> {
    value.trim().parse().map_err(|_| CsvError::NotANumber {
        line,
        field,
        value: value.to_owned(),
    })
}

/// Parse CSV produced by [`to_csv`]
pub fn parse_csv(text: &str) -> Result<Vec<LevelRow>, CsvError> {
    let mut records = records(text)?.into_iter();
    match records.next() {
        Some((_, header)) if header.first().map(String::as_str) == Some(CSV_HEADER[0]) => {}
        _ => return Err(CsvError::MissingHeader),
    }

    records
        .map(|(line, fields)| {
            let [pattern, grid, plays, stars, hints]: [String; 5] =
                fields.try_into().map_err(|f: Vec<String>| CsvError::FieldCount {
                    line,
                    found: f.len(),
                })?;
            let grid = if grid.trim().is_empty() {
                None
            } else {
                Some(number(line, "grid", &grid)?)
            };
            Ok(LevelRow {
                pattern,
                grid,
                record: ProgressRecord {
                    plays: number(line, "plays", &plays)?,
                    stars: number(line, "stars", &stars)?,
                    hints: number(line, "hints", &hints)?,
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(entries: &[(&str, ProgressRecord)], attempts: u32) -> ProgressStore {
        let mut store = ProgressStore::new();
        for (k, r) in entries {
            store.levels.insert(ProgressKey::from_raw(*k), *r);
        }
        store.attempts = attempts;
        store
    }

    #[test]
    fn test_csv_row_for_standard_key() {
        let record = ProgressRecord { plays: 3, stars: 2, hints: 1 };
        let store = store_with(&[("grid4_id7b", record)], 0);
        let csv = to_csv(&store);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], r#""pattern","grid","plays","stars","hints""#);
        assert_eq!(lines[1], r#""7b","4","3","2","1""#);

        let rows = parse_csv(&csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key().as_str(), "grid4_id7b");
        assert_eq!(rows[0].grid, Some(4));
        assert_eq!(rows[0].record, record);
    }

    #[test]
    fn test_csv_escapes_quotes_and_odd_keys() {
        let record = ProgressRecord { plays: 1, stars: 0, hints: 0 };
        let store = store_with(&[("grid3_idsay \"hi\", ok", record), ("legacy", record)], 0);
        let csv = to_csv(&store);
        assert!(csv.contains(r#""say ""hi"", ok","3","1","0","0""#));
        assert!(csv.contains(r#""legacy","","1","0","0""#));

        let rows = parse_csv(&csv).unwrap();
        let keys: Vec<String> = rows.iter().map(|r| r.key().to_string()).collect();
        assert!(keys.contains(&"grid3_idsay \"hi\", ok".to_string()));
        assert!(keys.contains(&"legacy".to_string()));
    }

    #[test]
    fn test_csv_keeps_zero_padded_grid_keys() {
        let record = ProgressRecord { plays: 2, stars: 1, hints: 0 };
        let store = store_with(&[("grid03_idx", record)], 0);
        let csv = to_csv(&store);
        assert!(csv.contains(r#""grid03_idx","","2","1","0""#));

        let rows = parse_csv(&csv).unwrap();
        assert_eq!(rows[0].key().as_str(), "grid03_idx");
    }

    #[test]
    fn test_csv_header_only_when_empty() {
        let csv = to_csv(&ProgressStore::new());
        assert_eq!(csv, r#""pattern","grid","plays","stars","hints""#);
        assert!(parse_csv(&csv).unwrap().is_empty());
    }

    #[test]
    fn test_parse_csv_accepts_unquoted_header_and_crlf() {
        let text = "pattern,grid,plays,stars,hints\r\n\"a\",\"2\",\"5\",\"3\",\"0\"\r\n";
        let rows = parse_csv(text).unwrap();
        assert_eq!(rows[0].key().as_str(), "grid2_ida");
        assert_eq!(rows[0].record.plays, 5);
    }

    #[test]
    fn test_parse_csv_errors() {
        assert_eq!(parse_csv(""), Err(CsvError::MissingHeader));
        assert_eq!(parse_csv("\"a\",\"1\""), Err(CsvError::MissingHeader));
        assert_eq!(
            parse_csv("pattern,grid,plays,stars,hints\n\"a\",\"1\""),
            Err(CsvError::FieldCount { line: 2, found: 2 })
        );
        assert!(matches!(
            parse_csv("pattern,grid,plays,stars,hints\n\"a\",\"1\",\"x\",\"0\",\"0\""),
            Err(CsvError::NotANumber { field: "plays", .. })
        ));
        assert_eq!(
            parse_csv("pattern,grid,plays,stars,hints\n\"a,1,1,1,1"),
            Err(CsvError::UnterminatedQuote { line: 2 })
        );
    }

    #[test]
    fn test_json_export_shape() {
        let store = store_with(&[("grid3_ida1", ProgressRecord { plays: 1, stars: 3, hints: 0 })], 1);
        let value: serde_json::Value = serde_json::from_str(&export_json(&store).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "levels": {"grid3_ida1": {"plays": 1, "stars": 3, "hints": 0}},
                "attempts": 1
            })
        );
    }

    #[test]
    fn test_import_rejects_non_objects() {
        assert!(matches!(import_json("[1, 2]"), Err(ImportError::NotAnObject)));
        assert!(matches!(import_json("42"), Err(ImportError::NotAnObject)));
        assert!(matches!(import_json("{oops"), Err(ImportError::Syntax(_))));
        assert!(matches!(
            import_json(r#"{"levels": {"k": {"plays": "many"}}}"#),
            Err(ImportError::Syntax(_))
        ));
    }

    #[test]
    fn test_import_defaults_missing_fields() {
        assert_eq!(import_json("{}").unwrap(), ProgressStore::new());
        let store = import_json(r#"{"levels": {"grid2_idx": {"stars": 2}}}"#).unwrap();
        assert_eq!(
            store.record(&ProgressKey::new(2, "x")),
            Some(&ProgressRecord { plays: 0, stars: 2, hints: 0 })
        );
    }

    #[test]
    fn test_export_import_into_fresh_store_sums_attempts() {
        let exported = store_with(
            &[
                ("grid3_ida1", ProgressRecord { plays: 4, stars: 2, hints: 1 }),
                ("grid4_idb", ProgressRecord { plays: 1, stars: 0, hints: 0 }),
            ],
            7,
        );
        let json = export_json(&exported).unwrap();

        let mut fresh = store_with(&[("grid3_ida1", ProgressRecord { plays: 9, stars: 3, hints: 0 })], 3);
        fresh.merge(import_json(&json).unwrap());

        // Levels come back by overwrite (stars drop from 3 to 2), attempts add up
        assert_eq!(fresh.levels, exported.levels);
        assert_eq!(fresh.attempts, 10);

        let mut empty = ProgressStore::new();
        empty.merge(import_json(&json).unwrap());
        assert_eq!(empty, exported);
    }
}
