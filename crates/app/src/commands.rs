use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use concord_engine::{ReconciliationEngine, ReconciliationReport};
use concord_import::import_ledger_file;

use crate::render::{self, RenderOptions};
use crate::settings::Settings;

/// One reconciliation request from the command line.
#[derive(Debug, Clone)]
pub struct ReconcileRequest {
    pub internal: PathBuf,
    pub bank: PathBuf,
    pub settings: Settings,
    pub workers: usize,
    pub json: Option<PathBuf>,
    pub render: RenderOptions,
}

pub async fn reconcile(request: ReconcileRequest) -> Result<ReconciliationReport> {
    let internal = import_ledger_file(&request.internal, &request.settings.internal)
        .with_context(|| format!("importing internal ledger {}", request.internal.display()))?;
    let bank = import_ledger_file(&request.bank, &request.settings.bank)
        .with_context(|| format!("importing bank statement {}", request.bank.display()))?;
    tracing::info!(
        internal = internal.len(),
        bank = bank.len(),
        "ledgers imported"
    );

    let engine = ReconciliationEngine::new(request.settings.matching.clone())?;
    let report = if request.workers > 1 {
        engine
            .run_concurrent(&internal, &bank, request.workers)
            .await?
    } else {
        engine.run(&internal, &bank)?
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render::write_report(&mut out, &report, request.render)?;
    out.flush()?;

    if let Some(path) = &request.json {
        write_json(path, &report)?;
        tracing::info!("Report written to {}", path.display());
    }

    Ok(report)
}

fn write_json(path: &Path, report: &ReconciliationReport) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    Ok(())
}
