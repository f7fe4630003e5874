//! Core traits for remittance persistence and time
//!
//! The assembler and reconciler only talk to storage and the clock through
//! these traits, so a database-backed store or a frozen clock can be swapped
//! in without touching the engine.

use crate::types::{
    CnabError, DetailRecord, FileId, FileKind, RemittanceFile, TenantId,
};
use chrono::NaiveDateTime;

/// Trait for storing and retrieving remittance and return files
///
/// Implementations must be safe to share between threads: the same
/// repository may back concurrent generations for one tenant.
pub trait RemittanceRepository: Send + Sync {
    /// Insert or replace a file, keyed by its id
    ///
    /// # Errors
    ///
    /// Returns `Storage` if a different `Remessa` already holds the same
    /// `(tenant, bank, sequence)`.
    fn save(&self, file: RemittanceFile) -> Result<RemittanceFile, CnabError>;

    fn find_by_id(&self, tenant_id: TenantId, file_id: FileId) -> Option<RemittanceFile>;

    /// Look up a file by its header identity
    fn find_by_sequence(
        &self,
        tenant_id: TenantId,
        kind: FileKind,
        bank_code: &str,
        sequence_number: u32,
    ) -> Option<RemittanceFile>;

    /// Atomically allocate the next file sequence for `(tenant, bank)`
    ///
    /// Concurrent callers for the same pair receive distinct, gap-free values.
    fn next_sequence(&self, tenant_id: TenantId, bank_code: &str) -> Result<u32, CnabError>;

    /// First segment A detail of a file whose taxpayer id matches
    fn find_line_by_taxpayer_id(
        &self,
        tenant_id: TenantId,
        file_id: FileId,
        taxpayer_id: &str,
    ) -> Option<DetailRecord>;

    /// All files of a tenant, newest first
    fn list_by_tenant(&self, tenant_id: TenantId) -> Vec<RemittanceFile>;
}

/// Source of the current local time
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}
