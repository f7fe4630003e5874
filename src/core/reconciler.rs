//! Return file reconciliation
//!
//! A bank return echoes the remittance header (bank code and file sequence)
//! and reports one occurrence code per segment A. The reconciler finds the
//! original remittance, applies each code to the first pending payment of the
//! same taxpayer, settles the file status and stores the return itself as a
//! `Retorno` file.
//!
//! File-level problems abort the call before anything is mutated. Problems
//! on individual detail lines are logged and collected in
//! [`ReconciliationOutcome::skipped`].

use crate::codec::from_latin1;
use crate::core::clock::SystemClock;
use crate::core::return_codes::return_message;
use crate::core::traits::{Clock, RemittanceRepository};
use crate::records::{read_file_header, read_segment_a, record_type, segment_code, SegmentAFields};
use crate::types::{
    CnabError, DetailRecord, FileKind, FileStatus, LineRecord, LineStatus, RecordKind,
    RemittanceFile, Segment, TenantId, LINE_WIDTH,
};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of applying one return file
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationOutcome {
    /// The remittance with its settled status and per-payment codes
    pub original: RemittanceFile,

    /// The return as persisted, kind `Retorno`
    pub return_file: RemittanceFile,

    /// Matched payments the bank accepted
    pub processed: usize,

    /// Matched payments the bank rejected
    pub rejected: usize,

    /// Detail lines that could not be applied
    pub skipped: Vec<CnabError>,
}

pub struct ReturnReconciler<R: RemittanceRepository> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

/// A physical line of the return with its 1-based position
struct ReturnLine<'a> {
    number: usize,
    bytes: &'a [u8],
}

impl<R: RemittanceRepository> ReturnReconciler<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_clock(repository, Arc::new(SystemClock))
    }

    pub fn with_clock(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        ReturnReconciler { repository, clock }
    }

    /// Apply a bank return file to its remittance
    ///
    /// # Arguments
    ///
    /// * `tenant_id` - Tenant owning the remittance
    /// * `file_name` - Name of the received return file
    /// * `content` - Raw Latin-1 bytes of the return
    ///
    /// # Errors
    ///
    /// - `MalformedFile` if the first line is not a readable file header
    /// - `UnmatchedReturn` if no remittance has the header's bank and sequence
    /// - `AlreadyReconciled` if the remittance already has a terminal status
    /// - `Storage` if either file cannot be saved
    pub fn reconcile(
        &self,
        tenant_id: TenantId,
        file_name: &str,
        content: &[u8],
    ) -> Result<ReconciliationOutcome, CnabError> {
        let lines = split_lines(content);
        let header_line = lines
            .first()
            .ok_or_else(|| CnabError::malformed(1, "empty return file"))?;
        if header_line.bytes.len() < LINE_WIDTH {
            return Err(CnabError::malformed(
                1,
                format!("file header has {} characters", header_line.bytes.len()),
            ));
        }
        if record_type(header_line.bytes) != Some(RecordKind::FileHeader) {
            return Err(CnabError::malformed(1, "first line is not a file header"));
        }
        let header =
            read_file_header(header_line.bytes).map_err(|e| CnabError::malformed(1, e.to_string()))?;

        let mut original = self
            .repository
            .find_by_sequence(tenant_id, FileKind::Remessa, &header.bank_code, header.sequence)
            .ok_or_else(|| CnabError::unmatched_return(&header.bank_code, header.sequence))?;
        if original.status.is_terminal() {
            return Err(CnabError::AlreadyReconciled {
                file_id: original.id,
                status: original.status,
            });
        }

        let now = self.clock.now();
        let mut processed = 0;
        let mut rejected = 0;
        let mut skipped = Vec::new();
        let mut return_lines = Vec::with_capacity(lines.len());
        let mut return_amount = Decimal::ZERO;

        return_lines.push(LineRecord::new(
            RecordKind::FileHeader,
            1,
            from_latin1(header_line.bytes),
        ));

        for line in lines.iter().skip(1) {
            if line.bytes.len() < LINE_WIDTH {
                debug!(line = line.number, length = line.bytes.len(), "discarding short line");
                continue;
            }

            let Some(kind) = record_type(line.bytes) else {
                warn!(line = line.number, "unknown record type");
                skipped.push(CnabError::malformed(line.number, "unknown record type"));
                continue;
            };

            let mut record =
                LineRecord::new(kind, return_lines.len() as u32 + 1, from_latin1(line.bytes));
            if kind == RecordKind::Detail {
                record.segment = segment_code(line.bytes);
            }

            if record.segment == Some(Segment::A) {
                match read_segment_a(line.bytes) {
                    Ok(fields) if fields.return_code.is_empty() => {
                        warn!(line = line.number, "segment A without return code");
                        skipped.push(CnabError::malformed(line.number, "blank return code"));
                        record.detail = Some(echoed_detail(&fields, None, now));
                    }
                    Ok(fields) => {
                        return_amount += fields.amount;
                        let code = fields.return_code.clone();

                        match original.pending_detail_mut(&fields.bank_document) {
                            Some(detail) => {
                                detail.apply_return(&code, return_message(&code), now);
                                match detail.status {
                                    LineStatus::Processed => processed += 1,
                                    _ => rejected += 1,
                                }
                                debug!(
                                    line = line.number,
                                    item = detail.item_sequence,
                                    code = %code,
                                    "payment reconciled"
                                );
                            }
                            None => {
                                warn!(
                                    line = line.number,
                                    taxpayer_id = %fields.bank_document,
                                    "no pending payment for return line"
                                );
                                skipped.push(CnabError::unmatched_detail_line(
                                    line.number,
                                    &fields.bank_document,
                                ));
                            }
                        }
                        record.detail = Some(echoed_detail(&fields, Some(&code), now));
                    }
                    Err(e) => {
                        warn!(line = line.number, error = %e, "unreadable segment A");
                        skipped.push(CnabError::malformed(line.number, e.to_string()));
                    }
                }
            }

            return_lines.push(record);
        }

        let status = FileStatus::from_outcomes(processed, rejected);
        original.status = status;
        original.return_file_name = Some(file_name.to_string());
        original.return_content = Some(content.to_vec());
        original.processed_at = Some(now);

        let return_file = RemittanceFile {
            id: Uuid::new_v4(),
            tenant_id,
            kind: FileKind::Retorno,
            layout: original.layout,
            bank_code: header.bank_code.clone(),
            bank_name: header.bank_name.clone(),
            company_code: original.company_code.clone(),
            sequence_number: header.sequence,
            file_name: file_name.to_string(),
            reference_date: header.generated_on.unwrap_or_else(|| now.date()),
            total_records: return_lines.len(),
            total_amount: return_amount,
            content: content.to_vec(),
            status: FileStatus::Processed,
            lines: return_lines,
            return_file_name: None,
            return_content: None,
            created_at: now,
            processed_at: Some(now),
        };

        let return_file = self.repository.save(return_file)?;
        let original = self.repository.save(original)?;

        info!(
            tenant = %tenant_id,
            file_id = %original.id,
            sequence = original.sequence_number,
            processed,
            rejected,
            skipped = skipped.len(),
            status = %status,
            "return file reconciled"
        );

        Ok(ReconciliationOutcome {
            original,
            return_file,
            processed,
            rejected,
            skipped,
        })
    }
}

/// Split on LF, drop a trailing CR and cut anything past column 240
fn split_lines(content: &[u8]) -> Vec<ReturnLine<'_>> {
    let mut lines: Vec<ReturnLine<'_>> = content
        .split(|b| *b == b'\n')
        .enumerate()
        .map(|(index, raw)| {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            ReturnLine {
                number: index + 1,
                bytes: &raw[..raw.len().min(LINE_WIDTH)],
            }
        })
        .collect();

    // A terminated last line leaves an empty tail
    if lines.last().is_some_and(|line| line.bytes.is_empty()) {
        lines.pop();
    }
    lines
}

/// Payment data as the bank echoed it in the return
fn echoed_detail(fields: &SegmentAFields, code: Option<&str>, at: NaiveDateTime) -> DetailRecord {
    DetailRecord {
        employee_id: None,
        employee_name: fields.payee_name.clone(),
        taxpayer_id: fields.bank_document.clone(),
        bank_code: fields.payee_bank.clone(),
        branch_code: fields.branch_code.clone(),
        branch_digit: fields.branch_digit.clone(),
        account_number: fields.account_number.clone(),
        account_digit: fields.account_digit.clone(),
        amount: fields.amount,
        payment_date: fields.payment_date,
        item_sequence: fields.item_sequence,
        return_code: code.map(str::to_string),
        return_message: code.map(return_message),
        status: code.map(LineStatus::from_return_code).unwrap_or_default(),
        processed_at: code.map(|_| at),
    }
}
