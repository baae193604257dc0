use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde_json::Value;
use std::io::Read;
use tracing::debug;

pub const DATE_FORMAT: &str = "%m/%d/%Y";

const PLATFORM: &str = "Platform";
const DATE: &str = "Date";
const POST_TYPE: &str = "PostType";
const LIKES: &str = "Likes";

/// A single social-media post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub platform: String,
    pub date: NaiveDate,
    pub post_type: String,
    pub likes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum InputFormat {
    #[default]
    Csv,
    Json,
}

impl InputFormat {
    /// Guess the format from a file extension; anything but `.json` is CSV
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
            _ => InputFormat::Csv,
        }
    }
}

/// Immutable collection of parsed records
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn load<R: Read>(reader: R, format: InputFormat) -> Result<Self> {
        match format {
            InputFormat::Csv => Self::from_csv(reader),
            InputFormat::Json => {
                let value: Value = serde_json::from_reader(reader)?;
                Self::from_json(&value)
            }
        }
    }

    /// Parse CSV with a header row. Required columns are matched
    /// case-insensitively; extra columns are ignored.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        let platform_idx = find_col_index(&headers, PLATFORM)?;
        let date_idx = find_col_index(&headers, DATE)?;
        let post_type_idx = find_col_index(&headers, POST_TYPE)?;
        let likes_idx = find_col_index(&headers, LIKES)?;

        let mut records = Vec::new();
        for (row_idx, row) in rdr.records().enumerate() {
            let row = row?;
            let row_num = row_idx + 1;
            let field = |idx: usize| row.get(idx).unwrap_or("");

            records.push(Record {
                platform: field(platform_idx).to_string(),
                date: parse_date(field(date_idx), row_num)?,
                post_type: field(post_type_idx).to_string(),
                likes: parse_likes(field(likes_idx), row_num)?,
            });
        }

        debug!(rows = records.len(), "Parsed CSV input");
        Ok(Self { records })
    }

    /// Create a dataset from a JSON array of objects
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| Error::InvalidInput("Input data must be a JSON array of objects".into()))?;

        let mut records = Vec::with_capacity(array.len());
        for (row_idx, item) in array.iter().enumerate() {
            let row_num = row_idx + 1;
            let obj = item.as_object().ok_or_else(|| {
                Error::InvalidInput(format!("Item {} in array is not an object", row_num))
            })?;

            let get = |name: &str| -> Result<String> {
                let val = obj
                    .iter()
                    .find(|(k, _)| k.trim().eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
                    .ok_or_else(|| Error::MissingColumn(name.to_string()))?;
                match val {
                    Value::String(s) => Ok(s.trim().to_string()),
                    Value::Number(n) => Ok(n.to_string()),
                    other => Err(Error::Parse {
                        row: row_num,
                        column: name.to_string(),
                        value: other.to_string(),
                        reason: "unsupported value type".into(),
                    }),
                }
            };

            records.push(Record {
                platform: get(PLATFORM)?,
                date: parse_date(&get(DATE)?, row_num)?,
                post_type: get(POST_TYPE)?,
                likes: parse_likes(&get(LIKES)?, row_num)?,
            });
        }

        debug!(rows = records.len(), "Parsed JSON input");
        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn max_likes(&self) -> Option<u64> {
        self.records.iter().map(|r| r.likes).max()
    }

    /// Earliest and latest post dates
    pub fn date_extent(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    /// Distinct platforms in first-occurrence order
    pub fn platforms(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.platform.as_str()))
    }

    /// Distinct post types in first-occurrence order
    pub fn post_types(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.post_type.as_str()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for v in values {
        if !seen.iter().any(|s| s == v) {
            seen.push(v.to_string());
        }
    }
    seen
}

fn find_col_index(headers: &[String], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| Error::MissingColumn(name.to_string()))
}

fn parse_date(raw: &str, row: usize) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| Error::Parse {
        row,
        column: DATE.to_string(),
        value: raw.to_string(),
        reason: format!("expected MM/DD/YYYY ({})", e),
    })
}

fn parse_likes(raw: &str, row: usize) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|e| Error::Parse {
        row,
        column: LIKES.to_string(),
        value: raw.to_string(),
        reason: format!("expected a non-negative integer ({})", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE: &str = "Platform,Date,PostType,Likes\n\
        Facebook,3/1/2024,Image,120\n\
        Instagram,3/1/2024,Video,300\n\
        Facebook,3/2/2024,Link,45\n";

    #[test]
    fn test_from_csv_basic() {
        let ds = Dataset::from_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        let first = &ds.records()[0];
        assert_eq!(first.platform, "Facebook");
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(first.post_type, "Image");
        assert_eq!(first.likes, 120);
    }

    #[test]
    fn test_from_csv_case_insensitive_headers_and_extra_columns() {
        let csv = "id, platform ,DATE,posttype,likes\n7,X,12/31/2023,Text,5\n";
        let ds = Dataset::from_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.records()[0].platform, "X");
        assert_eq!(ds.records()[0].likes, 5);
    }

    #[test]
    fn test_from_csv_missing_column() {
        let csv = "Platform,Date,Likes\nX,1/1/2024,5\n";
        let err = Dataset::from_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(ref c) if c == "PostType"));
    }

    #[test]
    fn test_from_csv_non_numeric_likes() {
        let csv = "Platform,Date,PostType,Likes\nX,1/1/2024,Text,lots\n";
        let err = Dataset::from_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse { row: 1, ref column, .. } if column == "Likes"));
        assert!(err.to_string().contains("Failed to parse 'lots'"));
    }

    #[test]
    fn test_from_csv_negative_likes_rejected() {
        let csv = "Platform,Date,PostType,Likes\nX,1/1/2024,Text,-3\n";
        assert!(matches!(
            Dataset::from_csv(csv.as_bytes()),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_from_csv_bad_date() {
        let csv = "Platform,Date,PostType,Likes\nX,1/1/2024,Text,1\nY,2024-01-02,Text,2\n";
        let err = Dataset::from_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse { row: 2, ref column, .. } if column == "Date"));
    }

    #[test]
    fn test_from_csv_header_only() {
        let csv = "Platform,Date,PostType,Likes\n";
        let ds = Dataset::from_csv(csv.as_bytes()).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.max_likes(), None);
        assert_eq!(ds.date_extent(), None);
    }

    #[test]
    fn test_from_json() {
        let value = json!([
            {"Platform": "X", "Date": "01/05/2024", "PostType": "Text", "Likes": 10},
            {"Platform": "Y", "Date": "01/06/2024", "PostType": "Image", "Likes": "20"}
        ]);
        let ds = Dataset::from_json(&value).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].likes, 10);
        assert_eq!(ds.records()[1].likes, 20);
    }

    #[test]
    fn test_from_json_not_array() {
        let value = json!({"Platform": "X"});
        assert!(matches!(
            Dataset::from_json(&value),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_json_float_likes_rejected() {
        let value = json!([{"Platform": "X", "Date": "01/05/2024", "PostType": "Text", "Likes": 1.5}]);
        assert!(matches!(Dataset::from_json(&value), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_distinct_accessors_keep_first_occurrence_order() {
        let ds = Dataset::from_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(ds.platforms(), vec!["Facebook", "Instagram"]);
        assert_eq!(ds.post_types(), vec!["Image", "Video", "Link"]);
        assert_eq!(ds.max_likes(), Some(300));
        let (lo, hi) = ds.date_extent().unwrap();
        assert_eq!(lo, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(hi, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn test_input_format_from_path() {
        use std::path::Path;
        assert_eq!(InputFormat::from_path(Path::new("a.JSON")), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("a.csv")), InputFormat::Csv);
        assert_eq!(InputFormat::from_path(Path::new("noext")), InputFormat::Csv);
    }
}
