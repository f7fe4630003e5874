//! Remittance file and line record types
//!
//! A [`RemittanceFile`] is one generated batch (kind `Remessa`) or one bank
//! return (kind `Retorno`). Each physical 240-column line is kept as a
//! [`LineRecord`]; segment-A detail lines additionally carry the payee and
//! reconciliation data in a [`DetailRecord`].

use crate::types::error::CnabError;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

/// Tenant identifier
pub type TenantId = Uuid;

/// Remittance file identifier
pub type FileId = Uuid;

/// Width of every CNAB 240 line, in characters (one Latin-1 byte each)
pub const LINE_WIDTH: usize = 240;

/// File kind: outbound instruction file or the bank's answer to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Remessa,
    Retorno,
}

/// Only CNAB 240 is modelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CnabLayout {
    #[default]
    Cnab240,
}

/// Lifecycle of a remittance file
///
/// `Generated → Sent → {Processed | Rejected | Partial}`. The last three are
/// terminal: once reached, no return file may be applied again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileStatus {
    Generated,
    Sent,
    Processed,
    Rejected,
    Partial,
}

impl FileStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            FileStatus::Processed | FileStatus::Rejected | FileStatus::Partial
        )
    }

    /// Disposition of a reconciled file from its per-line outcomes
    ///
    /// No rejected lines means `Processed`, no processed lines means
    /// `Rejected`, anything else is `Partial`.
    pub fn from_outcomes(processed: usize, rejected: usize) -> Self {
        if rejected == 0 {
            FileStatus::Processed
        } else if processed == 0 {
            FileStatus::Rejected
        } else {
            FileStatus::Partial
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileStatus::Generated => "GENERATED",
            FileStatus::Sent => "SENT",
            FileStatus::Processed => "PROCESSED",
            FileStatus::Rejected => "REJECTED",
            FileStatus::Partial => "PARTIAL",
        };
        f.write_str(name)
    }
}

/// Record kind of a physical line, taken from column 008
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    FileHeader,
    BatchHeader,
    Detail,
    BatchTrailer,
    FileTrailer,
}

impl RecordKind {
    /// Record kind from the type digit at column 008
    pub fn from_type_code(code: u8) -> Option<Self> {
        match code {
            b'0' => Some(RecordKind::FileHeader),
            b'1' => Some(RecordKind::BatchHeader),
            b'3' => Some(RecordKind::Detail),
            b'5' => Some(RecordKind::BatchTrailer),
            b'9' => Some(RecordKind::FileTrailer),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::FileHeader => "FILE_HEADER",
            RecordKind::BatchHeader => "BATCH_HEADER",
            RecordKind::Detail => "DETAIL",
            RecordKind::BatchTrailer => "BATCH_TRAILER",
            RecordKind::FileTrailer => "FILE_TRAILER",
        };
        f.write_str(name)
    }
}

/// Detail segment marker, column 014
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Payment instruction
    A,
    /// Payee address and taxpayer data
    B,
}

impl Segment {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            b'A' => Some(Segment::A),
            b'B' => Some(Segment::B),
            _ => None,
        }
    }
}

/// Reconciliation status of a single payment line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineStatus {
    #[default]
    Pending,
    Processed,
    Rejected,
}

impl LineStatus {
    /// `"00"` is the only success code; everything else rejects the line
    pub fn from_return_code(code: &str) -> Self {
        if code == crate::core::return_codes::SUCCESS_CODE {
            LineStatus::Processed
        } else {
            LineStatus::Rejected
        }
    }
}

impl fmt::Display for LineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LineStatus::Pending => "PENDING",
            LineStatus::Processed => "PROCESSED",
            LineStatus::Rejected => "REJECTED",
        };
        f.write_str(name)
    }
}

/// Payee and reconciliation data of one payment (segment A line)
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRecord {
    /// Employee identifier; unknown for files rebuilt from raw bytes
    pub employee_id: Option<Uuid>,
    pub employee_name: String,
    pub taxpayer_id: String,
    pub bank_code: String,
    pub branch_code: String,
    pub branch_digit: String,
    pub account_number: String,
    pub account_digit: String,
    pub amount: Decimal,
    pub payment_date: Option<NaiveDate>,

    /// Sequential number inside the batch, shared by the A/B pair
    pub item_sequence: u32,

    pub return_code: Option<String>,
    pub return_message: Option<String>,
    pub status: LineStatus,
    pub processed_at: Option<NaiveDateTime>,
}

impl DetailRecord {
    /// Record a bank outcome on this payment
    pub fn apply_return(&mut self, code: &str, message: String, at: NaiveDateTime) {
        self.status = LineStatus::from_return_code(code);
        self.return_code = Some(code.to_string());
        self.return_message = Some(message);
        self.processed_at = Some(at);
    }
}

/// One physical line of a CNAB file
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord {
    pub kind: RecordKind,

    /// 1-based position in the file, contiguous
    pub sequence: u32,

    /// Set for DETAIL lines only
    pub segment: Option<Segment>,

    /// The line exactly as written, without terminator
    pub content: String,

    /// Set for segment A lines only
    pub detail: Option<DetailRecord>,
}

impl LineRecord {
    pub fn new(kind: RecordKind, sequence: u32, content: String) -> Self {
        LineRecord {
            kind,
            sequence,
            segment: None,
            content,
            detail: None,
        }
    }
}

/// A generated remittance file or a received return file
#[derive(Debug, Clone, PartialEq)]
pub struct RemittanceFile {
    pub id: FileId,
    pub tenant_id: TenantId,
    pub kind: FileKind,
    pub layout: CnabLayout,
    pub bank_code: String,
    pub bank_name: String,
    pub company_code: String,

    /// File sequence number (NSA), unique per tenant and bank for remittances
    pub sequence_number: u32,
    pub file_name: String,
    pub reference_date: NaiveDate,

    /// Number of lines emitted, headers and trailers included
    pub total_records: usize,

    /// Sum of all segment A amounts
    pub total_amount: Decimal,

    /// Raw Latin-1 payload
    pub content: Vec<u8>,
    pub status: FileStatus,
    pub lines: Vec<LineRecord>,
    pub return_file_name: Option<String>,
    pub return_content: Option<Vec<u8>>,
    pub created_at: NaiveDateTime,
    pub processed_at: Option<NaiveDateTime>,
}

impl RemittanceFile {
    /// Segment A lines, in file order
    pub fn detail_lines(&self) -> impl Iterator<Item = &LineRecord> {
        self.lines.iter().filter(|line| line.detail.is_some())
    }

    /// First payment still pending for the given taxpayer id
    ///
    /// Taxpayer ids are compared by their digits, ignoring leading zeros,
    /// so `"012.345.678-90"` and `"00001234567890"` are the same payee.
    pub fn pending_detail_mut(&mut self, taxpayer_id: &str) -> Option<&mut DetailRecord> {
        let wanted = normalize_taxpayer_id(taxpayer_id);
        if wanted.is_empty() {
            return None;
        }

        self.lines
            .iter_mut()
            .filter_map(|line| line.detail.as_mut())
            .find(|detail| {
                detail.status == LineStatus::Pending
                    && normalize_taxpayer_id(&detail.taxpayer_id) == wanted
            })
    }

    /// Flag a generated file as delivered to the bank
    pub fn mark_sent(&mut self) -> Result<(), CnabError> {
        if self.status != FileStatus::Generated {
            return Err(CnabError::InvalidTransition {
                from: self.status,
                to: FileStatus::Sent,
            });
        }
        self.status = FileStatus::Sent;
        Ok(())
    }
}

/// Canonical form of a CPF/CNPJ: its digits without leading zeros
pub fn normalize_taxpayer_id(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.trim_start_matches('0').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn detail(taxpayer_id: &str, item_sequence: u32) -> DetailRecord {
        DetailRecord {
            employee_id: None,
            employee_name: "MARIA".to_string(),
            taxpayer_id: taxpayer_id.to_string(),
            bank_code: "001".to_string(),
            branch_code: "1234".to_string(),
            branch_digit: "5".to_string(),
            account_number: "98765".to_string(),
            account_digit: "0".to_string(),
            amount: Decimal::new(100000, 2),
            payment_date: None,
            item_sequence,
            return_code: None,
            return_message: None,
            status: LineStatus::Pending,
            processed_at: None,
        }
    }

    fn file_with(details: Vec<DetailRecord>) -> RemittanceFile {
        let lines = details
            .into_iter()
            .enumerate()
            .map(|(i, d)| {
                let mut line = LineRecord::new(RecordKind::Detail, i as u32 + 3, String::new());
                line.segment = Some(Segment::A);
                line.detail = Some(d);
                line
            })
            .collect();
        let at = NaiveDate::from_ymd_opt(2026, 10, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        RemittanceFile {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            kind: FileKind::Remessa,
            layout: CnabLayout::Cnab240,
            bank_code: "001".to_string(),
            bank_name: "BANCO DO BRASIL".to_string(),
            company_code: "C1".to_string(),
            sequence_number: 1,
            file_name: "CB011001000001.REM".to_string(),
            reference_date: at.date(),
            total_records: 0,
            total_amount: Decimal::ZERO,
            content: Vec::new(),
            status: FileStatus::Generated,
            lines,
            return_file_name: None,
            return_content: None,
            created_at: at,
            processed_at: None,
        }
    }

    #[rstest]
    #[case::all_processed(3, 0, FileStatus::Processed)]
    #[case::all_rejected(0, 2, FileStatus::Rejected)]
    #[case::mixed(1, 1, FileStatus::Partial)]
    #[case::nothing_matched(0, 0, FileStatus::Processed)]
    fn test_disposition_from_outcomes(
        #[case] processed: usize,
        #[case] rejected: usize,
        #[case] expected: FileStatus,
    ) {
        assert_eq!(FileStatus::from_outcomes(processed, rejected), expected);
    }

    #[rstest]
    #[case(FileStatus::Generated, false)]
    #[case(FileStatus::Sent, false)]
    #[case(FileStatus::Processed, true)]
    #[case(FileStatus::Rejected, true)]
    #[case(FileStatus::Partial, true)]
    fn test_terminal_statuses(#[case] status: FileStatus, #[case] terminal: bool) {
        assert_eq!(status.is_terminal(), terminal);
    }

    #[rstest]
    #[case("123.456.789-01", "12345678901")]
    #[case("00012345678901", "12345678901")]
    #[case("  012345678 90 ", "1234567890")]
    #[case("000", "")]
    fn test_normalize_taxpayer_id(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_taxpayer_id(raw), expected);
    }

    #[rstest]
    #[case(b'0', Some(RecordKind::FileHeader))]
    #[case(b'1', Some(RecordKind::BatchHeader))]
    #[case(b'3', Some(RecordKind::Detail))]
    #[case(b'5', Some(RecordKind::BatchTrailer))]
    #[case(b'9', Some(RecordKind::FileTrailer))]
    #[case(b'4', None)]
    fn test_record_kind_from_type_code(#[case] code: u8, #[case] expected: Option<RecordKind>) {
        assert_eq!(RecordKind::from_type_code(code), expected);
    }

    #[test]
    fn test_pending_detail_first_match_wins() {
        let mut file = file_with(vec![detail("12345678901", 1), detail("12345678901", 2)]);

        let first = file.pending_detail_mut("123.456.789-01").unwrap();
        assert_eq!(first.item_sequence, 1);
        first.status = LineStatus::Processed;

        let second = file.pending_detail_mut("12345678901").unwrap();
        assert_eq!(second.item_sequence, 2);
        second.status = LineStatus::Rejected;

        assert!(file.pending_detail_mut("12345678901").is_none());
    }

    #[test]
    fn test_pending_detail_ignores_blank_taxpayer_id() {
        let mut file = file_with(vec![detail("", 1)]);
        assert!(file.pending_detail_mut("   ").is_none());
    }

    #[test]
    fn test_mark_sent_only_from_generated() {
        let mut file = file_with(Vec::new());
        assert!(file.mark_sent().is_ok());
        assert_eq!(file.status, FileStatus::Sent);

        let error = file.mark_sent().unwrap_err();
        assert_eq!(
            error,
            CnabError::InvalidTransition {
                from: FileStatus::Sent,
                to: FileStatus::Sent
            }
        );
    }

    #[test]
    fn test_apply_return_sets_status_from_code() {
        let at = NaiveDate::from_ymd_opt(2026, 10, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let mut ok = detail("1", 1);
        ok.apply_return("00", "Crédito ou Débito Efetivado".to_string(), at);
        assert_eq!(ok.status, LineStatus::Processed);
        assert_eq!(ok.processed_at, Some(at));

        let mut rejected = detail("2", 2);
        rejected.apply_return("AG", "Agência/Conta Corrente/DV Inválido".to_string(), at);
        assert_eq!(rejected.status, LineStatus::Rejected);
        assert_eq!(rejected.return_code.as_deref(), Some("AG"));
    }
}
