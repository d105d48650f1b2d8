use std::io::{self, Write};

use serde::Serialize;
use tracing::info;

use crate::app::{
    BatchResult, CatalogResult, EvolutionResult, ProgressEvent, ProgressSink, ProgressSinkKind,
    ShowResult,
};
use crate::catalog::CatalogFilter;
use crate::domain::format_number;
use crate::record::CanonicalRecord;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Json,
    Text,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_show(result: &ShowResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_batch(result: &BatchResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_evolution(result: &EvolutionResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_catalog(result: &CatalogResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

/// Plain-text rendering for a terminal.
pub struct TextOutput;

impl TextOutput {
    pub fn print_show(result: &ShowResult) -> io::Result<()> {
        let mut out = io::stdout().lock();
        write_detail(&mut out, &result.record)
    }

    pub fn print_batch(result: &BatchResult) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "loaded {}/{}", result.loaded, result.requested)?;
        for record in &result.records {
            write_card(&mut out, record)?;
        }
        Ok(())
    }

    pub fn print_evolution(result: &EvolutionResult) -> io::Result<()> {
        let mut out = io::stdout().lock();
        if result.chain.is_empty() {
            writeln!(out, "{} has no known evolutions", result.root)?;
            return Ok(());
        }
        let steps: Vec<String> = result
            .chain
            .iter()
            .map(|step| format!("{} Nro. {}", step.name, step.number))
            .collect();
        writeln!(out, "{}", steps.join(" -> "))
    }

    pub fn print_catalog(result: &CatalogResult) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(
            out,
            "{} shown, {} loaded of {} listed",
            result.records.len(),
            result.loaded,
            result.listed
        )?;
        if let Some(available) = result.available {
            writeln!(out, "available upstream: {available}")?;
        }
        if !result.filter.is_empty() {
            writeln!(out, "filter: {}", describe_filter(&result.filter))?;
        }
        writeln!(out, "types: {}", result.types.join(", "))?;
        for record in &result.records {
            write_card(&mut out, record)?;
        }
        Ok(())
    }
}

fn describe_filter(filter: &CatalogFilter) -> String {
    let mut parts = Vec::new();
    if let Some(type_name) = &filter.type_name {
        parts.push(format!("type={type_name}"));
    }
    if let Some(ability) = &filter.ability {
        parts.push(format!("ability={ability}"));
    }
    if let Some(query) = &filter.name_query {
        parts.push(format!("name~{query}"));
    }
    parts.join(" ")
}

fn write_card(out: &mut impl Write, record: &CanonicalRecord) -> io::Result<()> {
    writeln!(
        out,
        "Nro {}  {:<16} {}",
        format_number(record.id),
        record.name,
        record.types.join("/")
    )
}

fn write_detail(out: &mut impl Write, record: &CanonicalRecord) -> io::Result<()> {
    writeln!(out, "{} Nro {}", record.name, format_number(record.id))?;
    writeln!(out, "{}", record.description)?;
    writeln!(out, "category:  {}", record.category)?;
    writeln!(out, "height:    {}m", record.height)?;
    writeln!(out, "weight:    {}kg", record.weight)?;
    writeln!(out, "types:     {}", record.types.join(", "))?;
    writeln!(out, "abilities: {}", record.abilities.join(", "))?;
    for stat in &record.stats {
        writeln!(
            out,
            "  {:<17} {:>3} {:>5.1}%",
            stat.key.label(),
            stat.value,
            stat.percent()
        )?;
    }
    writeln!(out, "image:     {}", record.images.primary)
}

/// Forwards progress events to the log.
pub struct LogProgress {
    kind: ProgressSinkKind,
}

impl LogProgress {
    pub fn new(kind: ProgressSinkKind) -> Self {
        Self { kind }
    }
}

impl ProgressSink for LogProgress {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => info!(
                command = ?self.kind,
                elapsed_ms = elapsed.as_millis() as u64,
                "{}",
                event.message
            ),
            None => info!(command = ?self.kind, "{}", event.message),
        }
    }
}
