use crate::cli::args::{GenerateArgs, ReconcileArgs};
use crate::core::{
    import_remittance, FileAssembler, InMemoryRepository, RemittanceRepository, ReturnReconciler,
};
use crate::io::{status_counts, write_reconciliation_csv, PaymentReader};
use crate::types::{BankConfig, CnabError, FileStatus, RemittanceFile, TenantId};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Read the payroll CSV, build the remittance and write it to the output dir
///
/// Every unreadable row is logged before the first one is returned as the
/// error, so nothing is written unless the whole CSV parses.
///
/// Returns the path of the written `.REM` file, which is also printed to
/// `output`.
pub fn generate(
    args: &GenerateArgs,
    bank: &BankConfig,
    tenant_id: TenantId,
    output: &mut dyn Write,
) -> Result<PathBuf, CnabError> {
    let mut payments = Vec::new();
    let mut first_error = None;
    for result in PaymentReader::open(&args.payments_csv)? {
        match result {
            Ok(payment) => payments.push(payment),
            Err(e) => {
                warn!(error = %e, "skipping unreadable payroll row");
                first_error.get_or_insert(e);
            }
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }

    let repository = Arc::new(InMemoryRepository::new());
    if let Some(last) = args.last_sequence {
        repository.seed_sequence(tenant_id, &bank.bank_code, last);
    }

    let file = FileAssembler::new(repository).generate(
        tenant_id,
        bank,
        &payments,
        args.payment_date,
    )?;

    let path = args.output_dir.join(&file.file_name);
    fs::write(&path, &file.content).map_err(|e| CnabError::Io {
        message: format!("Failed to write '{}': {}", path.display(), e),
    })?;

    info!(
        path = %path.display(),
        sequence = file.sequence_number,
        payments = payments.len(),
        total = %file.total_amount,
        "remittance written"
    );
    writeln!(output, "{}", path.display())?;
    Ok(path)
}

/// Import the remittance, apply the return file and write the CSV report
pub fn reconcile(
    args: &ReconcileArgs,
    tenant_id: TenantId,
    output: &mut dyn Write,
) -> Result<RemittanceFile, CnabError> {
    let remittance_bytes = read_file(&args.remittance)?;
    let return_bytes = read_file(&args.return_file)?;

    let remittance = import_remittance(
        tenant_id,
        &file_name(&args.remittance),
        &remittance_bytes,
        FileStatus::Sent,
    )?;

    let repository = Arc::new(InMemoryRepository::new());
    repository.save(remittance)?;

    let outcome = ReturnReconciler::new(repository).reconcile(
        tenant_id,
        &file_name(&args.return_file),
        &return_bytes,
    )?;

    for skipped in &outcome.skipped {
        warn!(error = %skipped, "return line not applied");
    }
    let [processed, rejected, pending] = status_counts(&outcome.original);
    info!(
        status = %outcome.original.status,
        processed = processed.1,
        rejected = rejected.1,
        pending = pending.1,
        skipped = outcome.skipped.len(),
        "return file reconciled"
    );

    write_reconciliation_csv(&outcome.original, output)?;
    Ok(outcome.original)
}

fn read_file(path: &Path) -> Result<Vec<u8>, CnabError> {
    fs::read(path).map_err(|e| CnabError::Io {
        message: format!("Failed to read '{}': {}", path.display(), e),
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
