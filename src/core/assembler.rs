//! Remittance file assembly
//!
//! The `FileAssembler` turns a payroll batch into a complete CNAB 240 file:
//! file header, one batch header, an A/B pair per payment, batch trailer and
//! file trailer. Every line is encoded before a sequence number is allocated,
//! so a batch with bad input is rejected without consuming a sequence.

use crate::codec::{decode_numeric, pad_digits, to_latin1};
use crate::core::clock::SystemClock;
use crate::core::traits::{Clock, RemittanceRepository};
use crate::records::{
    batch_header, batch_line_count, batch_trailer, file_header, file_trailer, segment_a,
    segment_b,
};
use crate::types::{
    BankConfig, CnabError, CnabLayout, DetailRecord, FileKind, FileStatus, LineRecord,
    LineStatus, PaymentFailure, PayrollPayment, RecordKind, RemittanceFile, Segment, TenantId,
};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Item sequence is a 5-digit field
pub const MAX_PAYMENTS: usize = 99_999;

/// Line terminator of generated files
const CRLF: &str = "\r\n";

/// Payments encoded into their segment lines, not yet numbered in the file
struct EncodedBatch {
    batch_header: String,
    pairs: Vec<(String, String)>,
    batch_trailer: String,
    file_trailer: String,
    total_amount: Decimal,
}

/// Builds and persists remittance files
///
/// Generic over the repository so tests and the CLI can use the in-memory
/// store while a service plugs in its own persistence.
pub struct FileAssembler<R: RemittanceRepository> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: RemittanceRepository> FileAssembler<R> {
    /// Create an assembler stamping files with the system clock
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_clock(repository, Arc::new(SystemClock))
    }

    pub fn with_clock(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        FileAssembler { repository, clock }
    }

    /// Generate and persist a remittance file for a payroll batch
    ///
    /// # Arguments
    ///
    /// * `tenant_id` - Tenant owning the file and its sequence counter
    /// * `bank` - Banking coordinates of the paying company
    /// * `payments` - Payments in the order they must appear in the file
    /// * `payment_date` - Credit date written to every segment A
    ///
    /// # Returns
    ///
    /// The stored file, status `Generated`, with its raw Latin-1 payload.
    ///
    /// # Errors
    ///
    /// - `InvalidPayments` listing every payment that cannot be encoded
    /// - `EncodingOverflow` / `InvalidField` when the bank configuration does
    ///   not fit the headers
    /// - `Storage` when the repository cannot allocate a sequence or save
    ///
    /// No sequence number is consumed when encoding fails.
    pub fn generate(
        &self,
        tenant_id: TenantId,
        bank: &BankConfig,
        payments: &[PayrollPayment],
        payment_date: NaiveDate,
    ) -> Result<RemittanceFile, CnabError> {
        if payments.len() > MAX_PAYMENTS {
            return Err(CnabError::invalid_field(
                "item_sequence",
                &payments.len().to_string(),
                "a batch holds at most 99999 payments",
            ));
        }

        // headers write the code zero-padded; counters and lookups use the same form
        let bank_code =
            pad_digits(&bank.bank_code, 3).map_err(|e| CnabError::field("bank_code", e))?;
        let bank_number =
            decode_numeric(&bank_code).map_err(|e| CnabError::field("bank_code", e))?;
        let encoded = encode_batch(bank, payments, payment_date)?;

        // The batch header already validated every fallible file header
        // field except the sequence, which next_sequence keeps in range.
        let sequence_number = self.repository.next_sequence(tenant_id, &bank_code)?;
        let now = self.clock.now();
        let header = file_header(bank, sequence_number, now)?;

        let file = RemittanceFile {
            id: Uuid::new_v4(),
            tenant_id,
            kind: FileKind::Remessa,
            layout: CnabLayout::Cnab240,
            bank_code,
            bank_name: bank.bank_name.clone(),
            company_code: bank.company_code.clone(),
            sequence_number,
            file_name: file_name(now, bank_number, sequence_number),
            reference_date: payment_date,
            total_records: 0,
            total_amount: encoded.total_amount,
            content: Vec::new(),
            status: FileStatus::Generated,
            lines: Vec::new(),
            return_file_name: None,
            return_content: None,
            created_at: now,
            processed_at: None,
        };
        let file = assemble(file, header, encoded, payments, payment_date);

        info!(
            tenant = %tenant_id,
            bank = %file.bank_code,
            sequence = file.sequence_number,
            payments = payments.len(),
            total = %file.total_amount,
            file_name = %file.file_name,
            "remittance file generated"
        );

        self.repository.save(file)
    }
}

/// Encode every line whose content does not depend on the file sequence
fn encode_batch(
    bank: &BankConfig,
    payments: &[PayrollPayment],
    payment_date: NaiveDate,
) -> Result<EncodedBatch, CnabError> {
    let batch_header = batch_header(bank)?;

    let mut pairs = Vec::with_capacity(payments.len());
    let mut failures = Vec::new();
    let mut total_amount = Decimal::ZERO;

    for (index, payment) in payments.iter().enumerate() {
        let item_sequence = index as u32 + 1;
        let encoded = segment_a(&bank.bank_code, payment, item_sequence, payment_date).and_then(
            |a| segment_b(&bank.bank_code, payment, item_sequence).map(|b| (a, b)),
        );

        match encoded {
            Ok(pair) => {
                pairs.push(pair);
                total_amount += payment.amount;
            }
            Err(cause) => failures.push(PaymentFailure {
                position: index + 1,
                employee: payment
                    .employee_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| payment.employee_name.clone()),
                cause: Box::new(cause),
            }),
        }
    }

    if !failures.is_empty() {
        return Err(CnabError::InvalidPayments { failures });
    }

    let batch_trailer = batch_trailer(&bank.bank_code, payments.len(), total_amount)?;
    let file_trailer = file_trailer(&bank.bank_code, 1, batch_line_count(payments.len()) + 2)?;

    Ok(EncodedBatch {
        batch_header,
        pairs,
        batch_trailer,
        file_trailer,
        total_amount,
    })
}

/// Number the lines, attach payee details and build the payload
fn assemble(
    mut file: RemittanceFile,
    file_header: String,
    encoded: EncodedBatch,
    payments: &[PayrollPayment],
    payment_date: NaiveDate,
) -> RemittanceFile {
    let mut lines = Vec::with_capacity(encoded.pairs.len() * 2 + 4);
    lines.push(LineRecord::new(RecordKind::FileHeader, 1, file_header));
    lines.push(LineRecord::new(RecordKind::BatchHeader, 2, encoded.batch_header));

    for (index, ((a, b), payment)) in encoded.pairs.into_iter().zip(payments).enumerate() {
        let item_sequence = index as u32 + 1;

        let mut line_a = LineRecord::new(RecordKind::Detail, lines.len() as u32 + 1, a);
        line_a.segment = Some(Segment::A);
        line_a.detail = Some(detail_record(payment, item_sequence, payment_date));
        debug!(line = line_a.sequence, item = item_sequence, "segment A");
        lines.push(line_a);

        let mut line_b = LineRecord::new(RecordKind::Detail, lines.len() as u32 + 1, b);
        line_b.segment = Some(Segment::B);
        lines.push(line_b);
    }

    let sequence = lines.len() as u32 + 1;
    lines.push(LineRecord::new(RecordKind::BatchTrailer, sequence, encoded.batch_trailer));
    let sequence = lines.len() as u32 + 1;
    lines.push(LineRecord::new(RecordKind::FileTrailer, sequence, encoded.file_trailer));

    file.content = encode_payload(&lines);
    file.total_records = lines.len();
    file.lines = lines;
    file
}

fn detail_record(payment: &PayrollPayment, item_sequence: u32, payment_date: NaiveDate) -> DetailRecord {
    DetailRecord {
        employee_id: payment.employee_id,
        employee_name: payment.employee_name.clone(),
        taxpayer_id: payment.taxpayer_id.clone(),
        bank_code: payment.bank_code.clone(),
        branch_code: payment.branch_code.clone(),
        branch_digit: payment.branch_digit.clone(),
        account_number: payment.account_number.clone(),
        account_digit: payment.account_digit.clone(),
        amount: payment.amount,
        payment_date: Some(payment_date),
        item_sequence,
        return_code: None,
        return_message: None,
        status: LineStatus::Pending,
        processed_at: None,
    }
}

/// CRLF after every line, including the last, then Latin-1
fn encode_payload(lines: &[LineRecord]) -> Vec<u8> {
    let mut text = String::with_capacity(lines.len() * (crate::types::LINE_WIDTH + CRLF.len()));
    for line in lines {
        text.push_str(&line.content);
        text.push_str(CRLF);
    }
    to_latin1(&text)
}

/// `CB<ddMM><bank mod 100><sequence>.REM`
pub fn file_name(generated_at: NaiveDateTime, bank_number: u64, sequence_number: u32) -> String {
    format!(
        "CB{}{:02}{:06}.REM",
        generated_at.format("%d%m"),
        bank_number % 100,
        sequence_number
    )
}
