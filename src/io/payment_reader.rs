//! Streaming payroll CSV reader
//!
//! Yields one `Result<PayrollPayment, CnabError>` per CSV row. A bad row does
//! not stop iteration, so callers can report every problem in one pass.
//!
//! ```no_run
//! use cnab_payroll::io::PaymentReader;
//! use std::path::Path;
//!
//! let reader = PaymentReader::open(Path::new("payroll.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(payment) => println!("{} {}", payment.employee_name, payment.amount),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```

use crate::io::csv_format::{convert_csv_payment, CsvPayment};
use crate::types::{CnabError, PayrollPayment};
use csv::{DeserializeRecordsIntoIter, ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Iterator over the payments of a payroll CSV
pub struct PaymentReader<R: Read> {
    rows: DeserializeRecordsIntoIter<R, CsvPayment>,
    line_num: u64,
}

impl PaymentReader<File> {
    /// Open a payroll CSV file
    ///
    /// # Errors
    ///
    /// Returns `Io` when the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, CnabError> {
        let file = File::open(path).map_err(|e| CnabError::Io {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        })?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> PaymentReader<R> {
    /// Wrap any byte source
    ///
    /// Fields are trimmed and rows may omit trailing optional columns.
    pub fn from_reader(source: R) -> Self {
        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(source);

        Self {
            rows: reader.into_deserialize(),
            // the header occupies line 1
            line_num: 1,
        }
    }
}

impl<R: Read> Iterator for PaymentReader<R> {
    type Item = Result<PayrollPayment, CnabError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        self.line_num += 1;
        let line = self.line_num;

        Some(match row {
            Ok(csv_payment) => convert_csv_payment(csv_payment).map_err(|message| {
                CnabError::Parse {
                    line: Some(line),
                    message,
                }
            }),
            Err(e) => Err(CnabError::Parse {
                line: Some(e.position().map(|pos| pos.line()).unwrap_or(line)),
                message: e.to_string(),
            }),
        })
    }
}
