//! Rebuild a remittance from its raw bytes
//!
//! A generated `.REM` file carries everything needed to reconcile it later:
//! the header names bank and sequence, segment A holds payee and amount,
//! segment B the taxpayer id. Importing checks the trailers' control totals
//! against what was actually read.

use crate::codec::from_latin1;
use crate::records::{
    batch_line_count, read_batch_trailer, read_file_header, read_file_trailer, read_segment_a,
    read_segment_b, record_type, segment_code,
};
use crate::types::{
    CnabError, CnabLayout, DetailRecord, FileKind, FileStatus, LineRecord, LineStatus,
    RecordKind, RemittanceFile, Segment, TenantId, LINE_WIDTH,
};
use chrono::NaiveTime;
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

/// Parse a remittance file into a `RemittanceFile` with the given status
///
/// The result is not persisted.
///
/// # Errors
///
/// Returns `MalformedFile` when a line is not 240 columns, a record type is
/// unknown, a segment B has no matching segment A, or a trailer's counts or
/// amount disagree with the lines read.
pub fn import_remittance(
    tenant_id: TenantId,
    file_name: &str,
    content: &[u8],
    status: FileStatus,
) -> Result<RemittanceFile, CnabError> {
    let raw_lines = split_strict(content)?;
    let first = raw_lines
        .first()
        .ok_or_else(|| CnabError::malformed(1, "empty remittance file"))?;
    if record_type(first) != Some(RecordKind::FileHeader) {
        return Err(CnabError::malformed(1, "first line is not a file header"));
    }
    let header = read_file_header(first).map_err(|e| CnabError::malformed(1, e.to_string()))?;

    let mut lines: Vec<LineRecord> = Vec::with_capacity(raw_lines.len());
    let mut total_amount = Decimal::ZERO;
    let mut payments = 0;
    let mut batch_checked = false;
    let mut file_checked = false;

    for (index, raw) in raw_lines.iter().enumerate() {
        let number = index + 1;
        let kind = record_type(raw)
            .ok_or_else(|| CnabError::malformed(number, "unknown record type"))?;
        let mut record = LineRecord::new(kind, number as u32, from_latin1(raw));
        let malformed = |e: CnabError| CnabError::malformed(number, e.to_string());

        match kind {
            RecordKind::Detail => match segment_code(raw) {
                Some(Segment::A) => {
                    let a = read_segment_a(raw).map_err(malformed)?;
                    total_amount += a.amount;
                    payments += 1;
                    record.segment = Some(Segment::A);
                    record.detail = Some(DetailRecord {
                        employee_id: None,
                        employee_name: a.payee_name,
                        taxpayer_id: String::new(),
                        bank_code: a.payee_bank,
                        branch_code: a.branch_code,
                        branch_digit: a.branch_digit,
                        account_number: a.account_number,
                        account_digit: a.account_digit,
                        amount: a.amount,
                        payment_date: a.payment_date,
                        item_sequence: a.item_sequence,
                        return_code: None,
                        return_message: None,
                        status: LineStatus::Pending,
                        processed_at: None,
                    });
                }
                Some(Segment::B) => {
                    let b = read_segment_b(raw).map_err(malformed)?;
                    let detail = lines
                        .last_mut()
                        .and_then(|previous| previous.detail.as_mut())
                        .filter(|detail| detail.item_sequence == b.item_sequence)
                        .ok_or_else(|| {
                            CnabError::malformed(number, "segment B does not follow its segment A")
                        })?;
                    detail.taxpayer_id = b.taxpayer_id;
                    record.segment = Some(Segment::B);
                }
                None => return Err(CnabError::malformed(number, "unknown detail segment")),
            },
            RecordKind::BatchTrailer => {
                let totals = read_batch_trailer(raw).map_err(malformed)?;
                if totals.line_count != batch_line_count(payments) as u64 {
                    return Err(CnabError::malformed(
                        number,
                        format!(
                            "batch trailer declares {} lines, batch has {}",
                            totals.line_count,
                            batch_line_count(payments)
                        ),
                    ));
                }
                if totals.amount_sum != total_amount {
                    return Err(CnabError::malformed(
                        number,
                        format!(
                            "batch trailer declares {}, payments sum to {}",
                            totals.amount_sum, total_amount
                        ),
                    ));
                }
                batch_checked = true;
            }
            RecordKind::FileTrailer => {
                let totals = read_file_trailer(raw).map_err(malformed)?;
                if totals.line_count != raw_lines.len() as u64 {
                    return Err(CnabError::malformed(
                        number,
                        format!(
                            "file trailer declares {} lines, file has {}",
                            totals.line_count,
                            raw_lines.len()
                        ),
                    ));
                }
                file_checked = true;
            }
            RecordKind::FileHeader | RecordKind::BatchHeader => {}
        }

        debug!(line = number, kind = %kind, "imported line");
        lines.push(record);
    }

    if !batch_checked || !file_checked {
        return Err(CnabError::malformed(
            raw_lines.len(),
            "missing batch or file trailer",
        ));
    }

    let created_at = header
        .generated_on
        .map(|date| date.and_time(header.generated_time.unwrap_or(NaiveTime::MIN)))
        .ok_or_else(|| CnabError::malformed(1, "file header has no generation date"))?;
    let reference_date = lines
        .iter()
        .filter_map(|line| line.detail.as_ref())
        .find_map(|detail| detail.payment_date)
        .unwrap_or(created_at.date());

    info!(
        tenant = %tenant_id,
        bank = %header.bank_code,
        sequence = header.sequence,
        payments,
        total = %total_amount,
        "remittance file imported"
    );

    Ok(RemittanceFile {
        id: Uuid::new_v4(),
        tenant_id,
        kind: FileKind::Remessa,
        layout: CnabLayout::Cnab240,
        bank_code: header.bank_code,
        bank_name: header.bank_name,
        company_code: header.convenio,
        sequence_number: header.sequence,
        file_name: file_name.to_string(),
        reference_date,
        total_records: lines.len(),
        total_amount,
        content: content.to_vec(),
        status,
        lines,
        return_file_name: None,
        return_content: None,
        created_at,
        processed_at: None,
    })
}

/// Every line must be exactly 240 columns; only the final terminator may
/// leave an empty tail
fn split_strict(content: &[u8]) -> Result<Vec<&[u8]>, CnabError> {
    let mut lines: Vec<&[u8]> = content
        .split(|b| *b == b'\n')
        .map(|raw| raw.strip_suffix(b"\r").unwrap_or(raw))
        .collect();
    if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    for (index, line) in lines.iter().enumerate() {
        if line.len() != LINE_WIDTH {
            return Err(CnabError::malformed(
                index + 1,
                format!("line has {} characters, expected 240", line.len()),
            ));
        }
    }
    Ok(lines)
}
