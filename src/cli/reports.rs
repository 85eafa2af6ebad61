use std::io::Write;

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate};
use serde_json::json;

use super::args::{RegistrationsArgs, ReportCommand};
use super::formatter::{Formatter, OutputFormat, Record};
use crate::models::reports::{GraphPoint, RegistrationsGraph, ReportDates, ReportRange};
use crate::services::reports::ReportRequestHandler;

const POINT_FIELDS: [&str; 3] = ["timestamp", "date", "count"];

pub async fn run(
    handler: &ReportRequestHandler,
    command: ReportCommand,
    today: NaiveDate,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        ReportCommand::Registrations(args) => registrations(handler, args, today, out).await,
    }
}

async fn registrations(
    handler: &ReportRequestHandler,
    args: RegistrationsArgs,
    today: NaiveDate,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let range = ReportRange::parse(&args.range);
    let dates = ReportDates::resolve(range, args.filter_from, args.filter_to, today)
        .ok_or_else(|| anyhow!("Could not resolve the {} date range.", range.key()))?;
    let graph = handler.registrations_graph(&dates).await?;

    match args.output.format {
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, &graph)?;
            writeln!(out)?;
        }
        OutputFormat::Yaml => write!(out, "{}", serde_yaml::to_string(&graph)?)?,
        OutputFormat::Count => writeln!(out, "{}", graph.total())?,
        format => {
            Formatter::new(
                format,
                args.output.field.as_deref(),
                args.output.fields.as_deref(),
                &POINT_FIELDS,
                &[],
            )
            .display_items(out, &point_records(&graph))?;

            if format == OutputFormat::Table {
                writeln!(
                    out,
                    "{}: {} between {} and {}.",
                    graph.label,
                    graph.total(),
                    graph.dates.start,
                    graph.dates.end
                )?;
            }
        }
    }

    Ok(())
}

/// One record per series point. Window markers have an empty count.
fn point_records(graph: &RegistrationsGraph) -> Vec<Record> {
    graph
        .points
        .iter()
        .map(|point| {
            let date = DateTime::from_timestamp_millis(point.timestamp_ms())
                .map(|date| date.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default();

            let mut record = Record::new();
            record.insert("timestamp".to_string(), json!(point.timestamp_ms()));
            record.insert("date".to_string(), json!(date));
            record.insert(
                "count".to_string(),
                match point {
                    GraphPoint::Marker(_) => json!(null),
                    GraphPoint::Count(_, count) => json!(count),
                },
            );
            record
        })
        .collect()
}
