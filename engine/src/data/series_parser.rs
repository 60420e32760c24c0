use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use shared::models::PriceSeries;
use shared::utils::parse_finite;

/// Header names (lower case) that mark the value column of a table.
pub const VALUE_HEADERS: [&str; 3] = ["close", "price", "adj close"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputShape {
    /// Numbers separated by any mix of whitespace and commas.
    #[default]
    FreeText,
    /// Line-oriented table, comma or whitespace delimited, optional header row.
    Table,
}

/// Where the values of a table were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    pub delimiter: Delimiter,
    pub value_column: usize,
    pub has_header: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Whitespace,
}

pub struct SeriesParser;

impl SeriesParser {
    pub fn parse(input: &str, shape: InputShape) -> PriceSeries {
        match shape {
            InputShape::FreeText => Self::parse_free_text(input),
            InputShape::Table => Self::parse_table(input),
        }
    }

    /// Splits on runs of whitespace and/or commas and keeps every token that
    /// reads as a finite number, in order. Anything else is dropped.
    pub fn parse_free_text(input: &str) -> PriceSeries {
        let mut skipped = 0usize;
        let series: PriceSeries = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .filter_map(|token| {
                let value = parse_finite(token);
                if value.is_none() {
                    skipped += 1;
                }
                value
            })
            .collect();

        if skipped > 0 {
            tracing::debug!(kept = series.len(), skipped, "Dropped non-numeric tokens from free text");
        }
        series
    }

    pub fn parse_table(input: &str) -> PriceSeries {
        Self::parse_table_with_layout(input).0
    }

    /// Parses a table and reports the layout that was detected. `None` for
    /// blank input.
    pub fn parse_table_with_layout(input: &str) -> (PriceSeries, Option<TableLayout>) {
        let text = input.trim();
        let Some(first_line) = text.lines().next() else {
            return (PriceSeries::new(), None);
        };

        let (series, layout) = if first_line.contains(',') {
            Self::parse_comma_table(text)
        } else {
            Self::parse_whitespace_table(text)
        };
        tracing::debug!(
            delimiter = ?layout.delimiter,
            value_column = layout.value_column,
            has_header = layout.has_header,
            values = series.len(),
            "Parsed tabular price data"
        );
        (series, Some(layout))
    }

    /// Index of the first cell naming a value column, compared case-insensitively.
    pub fn value_column<'a, I>(cells: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        cells
            .into_iter()
            .position(|cell| VALUE_HEADERS.contains(&cell.trim().to_lowercase().as_str()))
    }

    /// One CSV record per line. Quotes are honoured within a line but never
    /// carry over a line break.
    fn read_line(line: &str) -> Option<csv::Result<StringRecord>> {
        ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(line.as_bytes())
            .into_records()
            .next()
    }

    fn parse_comma_table(text: &str) -> (PriceSeries, TableLayout) {
        let mut layout = TableLayout {
            delimiter: Delimiter::Comma,
            value_column: 0,
            has_header: false,
        };
        let mut series = PriceSeries::new();

        for (idx, line) in text.lines().enumerate() {
            let record = match Self::read_line(line) {
                Some(Ok(record)) => record,
                Some(Err(e)) => {
                    tracing::debug!(line = idx + 1, error = %e, "Skipping unreadable CSV record");
                    continue;
                }
                None => continue,
            };
            if idx == 0 {
                if let Some(column) = Self::value_column(record.iter()) {
                    layout.value_column = column;
                    layout.has_header = true;
                    continue;
                }
            }
            if let Some(value) = record.get(layout.value_column).and_then(parse_finite) {
                series.push(value);
            }
        }
        (series, layout)
    }

    fn parse_whitespace_table(text: &str) -> (PriceSeries, TableLayout) {
        let mut lines = text.lines();
        let mut layout = TableLayout {
            delimiter: Delimiter::Whitespace,
            value_column: 0,
            has_header: false,
        };
        let mut series = PriceSeries::new();

        if let Some(first) = lines.next() {
            match Self::value_column(first.split_whitespace()) {
                Some(column) => {
                    layout.value_column = column;
                    layout.has_header = true;
                }
                None => Self::push_cell(&mut series, first.split_whitespace(), 0),
            }
        }
        for line in lines {
            Self::push_cell(&mut series, line.split_whitespace(), layout.value_column);
        }
        (series, layout)
    }

    fn push_cell<'a>(series: &mut PriceSeries, mut cells: impl Iterator<Item = &'a str>, column: usize) {
        if let Some(value) = cells.nth(column).and_then(parse_finite) {
            series.push(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_text_mixed_separators() {
        let series = SeriesParser::parse_free_text("45, 46,47\n44\t43 ,, 42");
        assert_eq!(series.values(), &[45.0, 46.0, 47.0, 44.0, 43.0, 42.0]);
    }

    #[test]
    fn test_free_text_drops_non_numeric() {
        let series = SeriesParser::parse_free_text("1.5, abc, 2e1, NaN, -4, inf, 7x");
        assert_eq!(series.values(), &[1.5, 20.0, -4.0]);
    }

    #[test]
    fn test_free_text_empty() {
        assert!(SeriesParser::parse_free_text("").is_empty());
        assert!(SeriesParser::parse_free_text(" ,, \n ").is_empty());
    }

    #[test]
    fn test_table_header_detection() {
        let (series, layout) = SeriesParser::parse_table_with_layout("Date,Close\n2024-01-01,10\n2024-01-02,11");
        assert_eq!(series.values(), &[10.0, 11.0]);
        let layout = layout.unwrap();
        assert_eq!(layout.value_column, 1);
        assert!(layout.has_header);
        assert_eq!(layout.delimiter, Delimiter::Comma);
    }

    #[test]
    fn test_table_header_aliases() {
        let csv = "date,open,high,low,Adj Close,volume\n2024-01-01,1,2,0.5,1.5,100\n2024-01-02,1,2,0.5,1.75,100";
        assert_eq!(SeriesParser::parse_table(csv).values(), &[1.5, 1.75]);

        let csv = "PRICE\n3\n4\n";
        assert_eq!(SeriesParser::parse_table(csv).values(), &[3.0, 4.0]);
    }

    #[test]
    fn test_table_first_matching_header_wins() {
        let csv = "price,close\n1,2\n3,4";
        assert_eq!(SeriesParser::parse_table(csv).values(), &[1.0, 3.0]);
    }

    #[test]
    fn test_table_without_header_uses_first_column() {
        let csv = "10,a\n11,b\nx,c\n12,d";
        let (series, layout) = SeriesParser::parse_table_with_layout(csv);
        assert_eq!(series.values(), &[10.0, 11.0, 12.0]);
        assert!(!layout.unwrap().has_header);
    }

    #[test]
    fn test_table_unknown_header_is_skipped_as_data() {
        let csv = "Date,Open\n2024-01-01,10";
        assert!(SeriesParser::parse_table(csv).is_empty());
    }

    #[test]
    fn test_table_skips_bad_and_short_lines() {
        let csv = "Date,Close\r\n2024-01-01,10\r\n2024-01-02\r\n2024-01-03,n/a\r\n\r\n2024-01-04, 12.5 \r\n";
        assert_eq!(SeriesParser::parse_table(csv).values(), &[10.0, 12.5]);
    }

    #[test]
    fn test_table_quoted_fields() {
        let csv = "\"Date\",\"Close\"\n\"2024-01-01\",\"10.5\"\n\"2024-01-02\",\"11\"";
        assert_eq!(SeriesParser::parse_table(csv).values(), &[10.5, 11.0]);
    }

    #[test]
    fn test_table_unbalanced_quote_stays_on_its_line() {
        let csv = "Close,Note\n5,\"unclosed note\n6,b\n7,c";
        assert_eq!(SeriesParser::parse_table(csv).values(), &[5.0, 6.0, 7.0]);

        let csv = "Date,Close\n\"2024-01-01,10\n2024-01-02,11";
        assert_eq!(SeriesParser::parse_table(csv).values(), &[11.0]);
    }

    #[test]
    fn test_table_whitespace_delimited() {
        let text = "date\tclose\n2024-01-01\t10\n2024-01-02   11\n";
        let (series, layout) = SeriesParser::parse_table_with_layout(text);
        assert_eq!(series.values(), &[10.0, 11.0]);
        assert_eq!(layout.unwrap().delimiter, Delimiter::Whitespace);

        let single_column = "5\n6\n\n7";
        assert_eq!(SeriesParser::parse_table(single_column).values(), &[5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_table_empty() {
        let (series, layout) = SeriesParser::parse_table_with_layout("   \n  ");
        assert!(series.is_empty());
        assert!(layout.is_none());
    }

    #[test]
    fn test_parse_dispatches_on_shape() {
        let text = "Close\n1\n2";
        assert_eq!(SeriesParser::parse(text, InputShape::Table).values(), &[1.0, 2.0]);
        assert_eq!(SeriesParser::parse(text, InputShape::FreeText).values(), &[1.0, 2.0]);
    }
}
