//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use mingpan::api::{self, ApiOptions, AppState, HourRequest, HouseQuery, StarQuery, ZiweiResponse};
use mingpan::config::AppConfig;
use mingpan_core::{
    Astrolabe, Chart, EnhancedChart, MingpanError, Pillar, RuleTables, Stem, ZiweiAnalyzer,
    TableCompilation, analyze, basic_record, enhance, enhance_document, read_rule_document,
};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of a chart record or astrolabe file (1 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
const MAX_INPUT_FILE_SIZE: u64 = 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), MingpanError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| MingpanError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(MingpanError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path to a canonical regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, MingpanError> {
    let canonical = path.canonicalize().map_err(|e| {
        MingpanError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(MingpanError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path: its parent directory must already exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, MingpanError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        MingpanError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(MingpanError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| MingpanError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

/// Read a size-limited JSON input file.
fn read_json_file(path: &Path) -> Result<Value, MingpanError> {
    let validated = validate_file_path(path)?;
    validate_file_size(&validated, MAX_INPUT_FILE_SIZE)?;

    let text = std::fs::read_to_string(&validated)
        .map_err(|e| MingpanError::IoError(format!("Failed to read file: {}", e)))?;
    serde_json::from_str(&text).map_err(|e| MingpanError::DeserializationError(e.to_string()))
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, MingpanError> {
    serde_json::to_string_pretty(value).map_err(|e| MingpanError::SerializationError(e.to_string()))
}

// =============================================================================
// BAZI COMMAND
// =============================================================================

/// Where the `bazi` command takes its chart from.
#[derive(Debug)]
pub enum ChartSource {
    /// A chart record file, enhanced as-is.
    File(PathBuf),
    /// Pillar labels given on the command line.
    Pillars {
        year: String,
        month: String,
        day: String,
        hour: String,
        day_master: Option<String>,
    },
}

impl ChartSource {
    /// The chart document to enhance. A record file is passed through
    /// unchecked; pillar flags must parse.
    fn into_document(self, tables: &RuleTables) -> Result<Value, MingpanError> {
        match self {
            ChartSource::File(path) => read_json_file(&path),
            ChartSource::Pillars {
                year,
                month,
                day,
                hour,
                day_master,
            } => {
                let day = day.parse::<Pillar>()?;
                let day_master = match day_master {
                    Some(stem) => stem.parse::<Stem>()?,
                    None => day.stem,
                };
                let chart = Chart::new(
                    year.parse::<Pillar>()?,
                    month.parse::<Pillar>()?,
                    day,
                    hour.parse::<Pillar>()?,
                    day_master,
                );
                Ok(Value::Object(basic_record(tables, &chart)))
            }
        }
    }
}

/// Annotate a chart.
///
/// JSON output (`--json-mode` or `--output`) goes through the same error
/// document boundary as `POST /bazi`: a failed chart is still emitted as
/// `{"error": ...}` and the command then fails.
pub fn cmd_bazi(
    tables: &RuleTables,
    json_mode: bool,
    source: ChartSource,
    output: Option<&Path>,
) -> Result<(), MingpanError> {
    let document = source.into_document(tables)?;

    if !json_mode && output.is_none() {
        let Value::Object(record) = document else {
            return Err(MingpanError::IncompleteChart);
        };
        print_enhanced_chart(&enhance(tables, record)?);
        return Ok(());
    }

    let enhanced = enhance_document(tables, document);
    let rejection = enhanced
        .get("error")
        .map(|error| error.as_str().map_or_else(|| error.to_string(), str::to_string));

    if let Some(output) = output {
        let validated = validate_output_path(output)?;
        std::fs::write(&validated, to_pretty_json(&enhanced)?)
            .map_err(|e| MingpanError::IoError(format!("Failed to write output: {}", e)))?;
        if !json_mode {
            println!("Enhanced chart written to {:?}", validated);
        }
    } else {
        println!("{}", to_pretty_json(&enhanced)?);
    }

    match rejection {
        Some(message) => Err(MingpanError::ChartRejected(message)),
        None => Ok(()),
    }
}

fn print_enhanced_chart(enhanced: &EnhancedChart) {
    let analysis = &enhanced.enhanced_analysis;

    println!("BaZi Chart");
    println!("==========");
    for pillar in &analysis.pillars {
        let hidden: Vec<String> = pillar
            .hidden_roles
            .iter()
            .map(|h| format!("{}({})", h.stem, h.role))
            .collect();
        println!(
            "{}  {}  {:<4}  {:<6}  {:<4}  {}",
            pillar.position,
            pillar.pillar,
            pillar.ten_god.label(),
            pillar.nayin,
            pillar.twelve_stage.label(),
            hidden.join(" ")
        );
    }

    if let Some(first) = analysis.pillars.first() {
        let void: Vec<String> = first.void_branches.iter().map(ToString::to_string).collect();
        println!("空亡: {}", void.join(""));
    }

    println!();
    println!("Ten-God tally:");
    for (role, count) in analysis.tally.iter() {
        println!("  {:<4} {}", role.label(), count);
    }
}

// =============================================================================
// HOUR COMMAND
// =============================================================================

/// Derive the hour pillar.
pub fn cmd_hour(json_mode: bool, day_master: &str, hour: u32) -> Result<(), MingpanError> {
    let request = HourRequest {
        day_master: day_master.parse()?,
        hour,
    };
    let response = request.resolve()?;

    if json_mode {
        println!("{}", to_pretty_json(&response)?);
    } else {
        println!(
            "{}日 {}时 → {}时 ({})",
            response.day_master, response.hour, response.hour_branch, response.hour_pillar
        );
    }
    Ok(())
}

// =============================================================================
// ZIWEI COMMAND
// =============================================================================

/// Optional queries of the `ziwei` command.
#[derive(Debug, Default)]
pub struct ZiweiQuery {
    pub age: Option<i32>,
    pub target_year: Option<i32>,
    pub star: Option<String>,
    pub house: Option<String>,
}

/// Report on an astrolabe. Always prints JSON.
pub fn cmd_ziwei(tables: &RuleTables, file: &Path, query: &ZiweiQuery) -> Result<(), MingpanError> {
    let astrolabe = Astrolabe::from_value(read_json_file(file)?)?;
    let analyzer = ZiweiAnalyzer::new(&astrolabe);

    let response = ZiweiResponse {
        report: analyzer.comprehensive(query.age, query.target_year),
        bazi: analyzer
            .bazi_chart()
            .map(|chart| analyze(tables, &chart))
            .into(),
        star_query: query
            .star
            .as_deref()
            .map(|star| StarQuery::new(&analyzer, star)),
        house_query: query
            .house
            .as_deref()
            .map(|house| HouseQuery::new(&analyzer, house)),
    };

    println!("{}", to_pretty_json(&response)?);
    Ok(())
}

// =============================================================================
// RULES COMMAND
// =============================================================================

/// Compile a rule table document and report every problem found.
///
/// Fails with the aggregated diagnostics when the document is incomplete.
pub fn cmd_rules(
    config: &AppConfig,
    json_mode: bool,
    file: Option<&Path>,
) -> Result<(), MingpanError> {
    let path = file.map(Path::to_path_buf).or_else(|| config.rule_table_path());

    let (source, compilation) = match path {
        Some(path) => {
            let validated = validate_file_path(&path)?;
            let document = read_rule_document(&validated)?;
            (
                validated.display().to_string(),
                RuleTables::compile(&document),
            )
        }
        None => {
            let tables = RuleTables::builtin();
            let diagnostics = if tables.is_empty() {
                vec!["built-in rule table failed to load".to_string()]
            } else {
                Vec::new()
            };
            (
                "built-in".to_string(),
                TableCompilation {
                    tables: tables.clone(),
                    diagnostics,
                },
            )
        }
    };

    let summary = compilation.tables.summary();
    if json_mode {
        let output = serde_json::json!({
            "source": source,
            "complete": compilation.is_complete(),
            "summary": summary,
            "diagnostics": compilation.diagnostics,
        });
        println!("{}", to_pretty_json(&output)?);
    } else {
        println!("Mingpan Rule Table");
        println!("==================");
        println!("Source:          {}", source);
        println!("Hidden stems:    {}/12", summary.hidden_stems);
        println!("NaYin:           {}/60", summary.nayin);
        println!("Void branches:   {}/60", summary.void_branches);
        println!("Twelve stages:   {}/10", summary.twelve_stages);
        println!("Stem elements:   {}/10", summary.stem_elements);
        println!("Stem polarities: {}/10", summary.stem_polarities);
        println!(
            "Element cycles:  {}",
            if summary.cycles_complete {
                "complete"
            } else {
                "incomplete"
            }
        );
        for problem in &compilation.diagnostics {
            println!("  - {}", problem);
        }
    }

    compilation.into_result().map(|_| ())
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: &AppConfig) -> Result<(), MingpanError> {
    let tables: Arc<RuleTables> = config.rule_tables();
    let server = &config.server;

    println!("Mingpan Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:       {}", server.host);
    println!("  Port:       {}", server.port);
    println!(
        "  Rules:      {}",
        config
            .rule_table_path()
            .map_or_else(|| "built-in".to_string(), |p| p.display().to_string())
    );
    println!("  Rate limit: {}/s", server.rate_limit);
    println!();
    println!("Endpoints:");
    println!("  GET  /health       - Health check");
    println!("  GET  /rules        - Rule table status");
    println!("  POST /bazi         - Enhance a chart record");
    println!("  POST /bazi/pillars - Annotate typed pillars");
    println!("  POST /hour         - Derive an hour pillar");
    println!("  POST /ziwei        - Zi Wei Dou Shu report");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", server.host, server.port);
    api::run_server(&addr, AppState::new(tables), &ApiOptions::from(server)).await
}

// =============================================================================
// TESTS
// =============================================================================
