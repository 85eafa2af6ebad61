use std::io::Write;

use anyhow::bail;
use clap::ValueEnum;
use serde_json::{Map, Value};

pub type Record = Map<String, Value>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
    Yaml,
    Count,
    Ids,
}

/// Renders records as a table, JSON, CSV or YAML, restricted to the requested fields.
pub struct Formatter {
    format: OutputFormat,
    fields: Vec<String>,
    single_field: bool,
}

impl Formatter {
    /// `field` wins over `fields`; both fall back to `defaults`.
    /// `aliases` maps alternative field names onto record keys.
    pub fn new(
        format: OutputFormat,
        field: Option<&str>,
        fields: Option<&str>,
        defaults: &[&str],
        aliases: &[(&str, &str)],
    ) -> Self {
        let resolve = |name: &str| {
            let name = name.trim();
            aliases
                .iter()
                .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
                .map(|(_, key)| key.to_string())
                .unwrap_or_else(|| name.to_string())
        };

        let (fields, single_field) = match (field, fields) {
            (Some(field), _) => (vec![resolve(field)], true),
            (None, Some(fields)) => (
                fields
                    .split(',')
                    .filter(|name| !name.trim().is_empty())
                    .map(resolve)
                    .collect(),
                false,
            ),
            (None, None) => (defaults.iter().map(|name| name.to_string()).collect(), false),
        };

        Self {
            format,
            fields,
            single_field,
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    fn check_fields(&self, items: &[Record]) -> anyhow::Result<()> {
        for field in &self.fields {
            if items.iter().any(|item| !item.contains_key(field)) {
                bail!("Invalid field: {}.", field);
            }
        }

        Ok(())
    }

    fn select(&self, item: &Record) -> Record {
        self.fields
            .iter()
            .filter_map(|field| item.get(field).map(|value| (field.clone(), value.clone())))
            .collect()
    }

    /// Prints a list of records.
    pub fn display_items(&self, out: &mut impl Write, items: &[Record]) -> anyhow::Result<()> {
        self.check_fields(items)?;

        if self.single_field {
            let field = &self.fields[0];
            for item in items {
                writeln!(out, "{}", cell(item.get(field)))?;
            }
            return Ok(());
        }

        let selected: Vec<Record> = items.iter().map(|item| self.select(item)).collect();
        match self.format {
            OutputFormat::Table => {
                let rows: Vec<Vec<String>> = selected
                    .iter()
                    .map(|item| self.fields.iter().map(|f| cell(item.get(f))).collect())
                    .collect();
                write_table(out, &self.fields, &rows)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, &selected)?;
                writeln!(out)?;
            }
            OutputFormat::Csv => {
                let mut writer = csv::Writer::from_writer(&mut *out);
                writer.write_record(&self.fields)?;
                for item in &selected {
                    writer.write_record(self.fields.iter().map(|f| cell(item.get(f))))?;
                }
                writer.flush()?;
            }
            OutputFormat::Yaml => write!(out, "{}", serde_yaml::to_string(&selected)?)?,
            OutputFormat::Count => writeln!(out, "{}", selected.len())?,
            OutputFormat::Ids => {
                let ids: Vec<String> = selected
                    .iter()
                    .map(|item| cell(item.get(&self.fields[0])))
                    .collect();
                writeln!(out, "{}", ids.join(" "))?;
            }
        }

        Ok(())
    }

    /// Prints one record. Tables are rendered vertically as Field/Value rows.
    pub fn display_item(&self, out: &mut impl Write, item: &Record) -> anyhow::Result<()> {
        let items = std::slice::from_ref(item);
        self.check_fields(items)?;

        if self.single_field {
            return self.display_items(out, items);
        }

        let selected = self.select(item);
        match self.format {
            OutputFormat::Table => {
                let rows: Vec<Vec<String>> = selected
                    .iter()
                    .map(|(field, value)| vec![field.clone(), cell(Some(value))])
                    .collect();
                write_table(out, &["Field".to_string(), "Value".to_string()], &rows)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, &selected)?;
                writeln!(out)?;
            }
            OutputFormat::Yaml => write!(out, "{}", serde_yaml::to_string(&selected)?)?,
            OutputFormat::Csv => self.display_items(out, items)?,
            OutputFormat::Count | OutputFormat::Ids => {
                bail!("The {:?} format is only available for lists.", self.format)
            }
        }

        Ok(())
    }
}

/// Plain-text form of a value. Arrays are comma-joined.
pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(values)) => values
            .iter()
            .map(|value| cell(Some(value)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

fn write_table(out: &mut impl Write, headers: &[String], rows: &[Vec<String>]) -> anyhow::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let border = widths
        .iter()
        .map(|width| "-".repeat(width + 2))
        .collect::<Vec<_>>()
        .join("+");
    let line = |values: &[String]| {
        values
            .iter()
            .zip(&widths)
            .map(|(value, width)| {
                let padding = width - value.chars().count();
                format!(" {}{} ", value, " ".repeat(padding))
            })
            .collect::<Vec<_>>()
            .join("|")
    };

    writeln!(out, "+{}+", border)?;
    writeln!(out, "|{}|", line(headers))?;
    writeln!(out, "+{}+", border)?;
    for row in rows {
        writeln!(out, "|{}|", line(row))?;
    }
    writeln!(out, "+{}+", border)?;

    Ok(())
}
