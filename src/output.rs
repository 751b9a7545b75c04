use crate::errors::OutputError;
use crate::table::{ResultTable, Row};
use serde_json::{Map, Value};
use std::io::Write;

/// File formats a table can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
        }
    }
}

/// Writes the table in the given format
pub fn write_table<W: Write>(table: &ResultTable, format: Format, writer: W) -> Result<(), OutputError> {
    match format {
        Format::Csv => write_csv(table, writer),
        Format::Json => write_json(table, writer),
    }
}

/// Writes a header row of column labels, then one record per row; null ratings are empty
pub fn write_csv<W: Write>(table: &ResultTable, writer: W) -> Result<(), OutputError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(&table.columns)?;
    for row in &table.rows {
        let rating = row.rating.map(|r| r.to_string()).unwrap_or_default();
        csv.write_record([
            row.name.as_str(),
            row.link.as_str(),
            rating.as_str(),
            row.extra.as_str(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes a JSON array with one object per row, keyed by column label
pub fn write_json<W: Write>(table: &ResultTable, mut writer: W) -> Result<(), OutputError> {
    let records: Vec<Value> = table
        .rows
        .iter()
        .map(|row| Value::Object(record(&table.columns, row)))
        .collect();
    serde_json::to_writer_pretty(&mut writer, &records)?;
    writeln!(writer)?;
    Ok(())
}

fn record(columns: &[String; 4], row: &Row) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(columns[0].clone(), Value::from(row.name.as_str()));
    map.insert(columns[1].clone(), Value::from(row.link.as_str()));
    map.insert(
        columns[2].clone(),
        row.rating.map(Value::from).unwrap_or(Value::Null),
    );
    map.insert(columns[3].clone(), Value::from(row.extra.as_str()));
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ResultTable {
        let mut table = ResultTable::default();
        table.rows.push(Row::new(
            "Metallica".to_string(),
            "One".to_string(),
            Some(9.5),
            "120000".to_string(),
        ));
        table.rows.push(Row::new(
            "Tool".to_string(),
            "Schism, Live".to_string(),
            None,
            "88000".to_string(),
        ));
        table
    }

    #[test]
    fn test_csv() {
        let mut out = Vec::new();
        write_csv(&table(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "ARTIST,SONG,RATING,HITS\nMetallica,One,9.5,120000\nTool,\"Schism, Live\",,88000\n"
        );
    }

    #[test]
    fn test_json() {
        let mut out = Vec::new();
        write_json(&table(), &mut out).unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["ARTIST"], "Metallica");
        assert_eq!(value[0]["RATING"], 9.5);
        assert_eq!(value[1]["RATING"], Value::Null);
        assert_eq!(value[1]["HITS"], "88000");
    }

    #[test]
    fn test_empty_table_csv_has_header() {
        let mut out = Vec::new();
        write_table(&ResultTable::default(), Format::Csv, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "ARTIST,SONG,RATING,HITS\n");
    }
}
