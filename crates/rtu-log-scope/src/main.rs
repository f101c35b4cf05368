mod bootstrap;
mod export;

use anyhow::{bail, Context, Result};
use scope_core::settings::Settings;
use scope_data::merger::MergeSchema;
use scope_data::sources::{expand_paths, SourceFormat};
use scope_runtime::pipeline::{LoadSummary, LogScope};
use scope_ui::app::App;

use crate::export::ScopeExport;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    let app_dir = bootstrap::ensure_directories()?;
    let log_file = settings
        .log_file
        .clone()
        .or_else(|| (settings.view == "tui").then(|| bootstrap::default_log_file(&app_dir)));
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("RTU Log Scope v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Schema: {}, Format: {}, Theme: {}",
        settings.view,
        settings.schema,
        settings.format,
        settings.theme
    );

    if settings.paths.is_empty() {
        if settings.clear {
            println!("Saved configuration cleared.");
            return Ok(());
        }
        bail!("no input given; pass one or more log files or directories");
    }

    let paths = expand_paths(&settings.paths);
    if paths.is_empty() {
        bail!("no log files found under the given directories");
    }

    let mut scope = LogScope::new()
        .with_format(SourceFormat::from_name(&settings.format))
        .with_schema(MergeSchema::from_name(&settings.schema).unwrap_or_default());

    let loaded = if paths.len() == 1 {
        scope.load_single(&paths[0])
    } else {
        scope.load_multiple(&paths)
    };

    match loaded {
        Ok(summary) => report_skipped(&summary),
        // The interactive view shows the error in its status line.
        Err(e) if settings.view == "tui" => tracing::warn!(error = %e, "starting with no data"),
        Err(e) => return Err(e).context("loading log files"),
    }

    apply_initial_selection(&mut scope, &settings);

    match settings.view.as_str() {
        "summary" => {
            let summary = scope.statistics_summary();
            if summary.is_empty() {
                eprintln!("No numeric values for the selected measurements.");
            } else {
                println!("{}", summary);
            }
        }
        "json" => {
            let json = ScopeExport::from_scope(&scope)
                .to_json()
                .context("serialising dataset")?;
            println!("{}", json);
        }
        "tui" => {
            App::new(&settings.theme, scope)
                .run()
                .context("running terminal UI")?;
        }
        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}

fn report_skipped(summary: &LoadSummary) {
    for skipped in &summary.skipped {
        eprintln!("Skipped {}: {}", skipped.path.display(), skipped.reason);
    }
    if summary.rows_dropped > 0 {
        tracing::info!(
            rows = summary.rows_dropped,
            "rows without a valid timestamp were excluded"
        );
    }
}

/// `--select-all` wins over `--select`. Non-interactive views with no explicit
/// selection report every measurement.
fn apply_initial_selection(scope: &mut LogScope, settings: &Settings) {
    if settings.select_all || (settings.select.is_empty() && settings.view != "tui") {
        scope.select_all(true);
        return;
    }
    if settings.select.is_empty() {
        return;
    }

    let applied = scope.set_selection(settings.select.iter().map(|name| (name.trim(), true)));
    if applied < settings.select.len() {
        for name in &settings.select {
            if !scope.measurements().iter().any(|m| m.name == name.trim()) {
                tracing::warn!(measurement = %name, "unknown measurement in --select");
                eprintln!("Unknown measurement: {}", name);
            }
        }
    }
}
