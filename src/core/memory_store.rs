//! Thread-safe in-memory remittance repository
//!
//! Files, the sequence index and the per-bank sequence counters each live in
//! their own `DashMap`. Sequence allocation increments the counter while
//! holding the shard lock of its `(tenant, bank)` entry, which makes the
//! read-modify-write atomic without a global lock.

use crate::codec::pad_digits;
use crate::core::traits::RemittanceRepository;
use crate::types::{
    normalize_taxpayer_id, CnabError, DetailRecord, FileId, FileKind, RemittanceFile, TenantId,
};
use dashmap::DashMap;
use tracing::debug;

/// Largest value the 6-digit NSA field can hold
const MAX_SEQUENCE: u32 = 999_999;

type SequenceKey = (TenantId, FileKind, String, u32);

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    files: DashMap<FileId, RemittanceFile>,

    /// `(tenant, kind, bank, sequence)` to the file holding it
    by_sequence: DashMap<SequenceKey, FileId>,

    /// Last sequence handed out per `(tenant, bank)`
    sequences: DashMap<(TenantId, String), u32>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the counter of `(tenant, bank)` at `last`
    ///
    /// The next allocation returns `last + 1`. Used when the previous
    /// sequence is known from outside, such as the CLI's `--last-sequence`.
    pub fn seed_sequence(&self, tenant_id: TenantId, bank_code: &str, last: u32) {
        self.sequences.insert((tenant_id, bank_key(bank_code)), last);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl RemittanceRepository for InMemoryRepository {
    fn save(&self, file: RemittanceFile) -> Result<RemittanceFile, CnabError> {
        let key = (
            file.tenant_id,
            file.kind,
            bank_key(&file.bank_code),
            file.sequence_number,
        );

        match file.kind {
            FileKind::Remessa => {
                let owner = *self.by_sequence.entry(key).or_insert(file.id);
                if owner != file.id {
                    return Err(CnabError::storage(format!(
                        "sequence {} of bank {} is already used by file {}",
                        file.sequence_number, file.bank_code, owner
                    )));
                }
            }
            FileKind::Retorno => {
                self.by_sequence.insert(key, file.id);
            }
        }

        debug!(file_id = %file.id, status = %file.status, "saving file");
        self.files.insert(file.id, file.clone());
        Ok(file)
    }

    fn find_by_id(&self, tenant_id: TenantId, file_id: FileId) -> Option<RemittanceFile> {
        self.files
            .get(&file_id)
            .filter(|file| file.tenant_id == tenant_id)
            .map(|file| file.clone())
    }

    fn find_by_sequence(
        &self,
        tenant_id: TenantId,
        kind: FileKind,
        bank_code: &str,
        sequence_number: u32,
    ) -> Option<RemittanceFile> {
        let key = (tenant_id, kind, bank_key(bank_code), sequence_number);
        let file_id = *self.by_sequence.get(&key)?;
        self.find_by_id(tenant_id, file_id)
    }

    fn next_sequence(&self, tenant_id: TenantId, bank_code: &str) -> Result<u32, CnabError> {
        let mut last = self
            .sequences
            .entry((tenant_id, bank_key(bank_code)))
            .or_insert(0);

        if *last >= MAX_SEQUENCE {
            return Err(CnabError::storage(format!(
                "file sequence of bank {} is exhausted",
                bank_code
            )));
        }
        *last += 1;
        Ok(*last)
    }

    fn find_line_by_taxpayer_id(
        &self,
        tenant_id: TenantId,
        file_id: FileId,
        taxpayer_id: &str,
    ) -> Option<DetailRecord> {
        let wanted = normalize_taxpayer_id(taxpayer_id);
        if wanted.is_empty() {
            return None;
        }

        self.find_by_id(tenant_id, file_id)?
            .lines
            .into_iter()
            .filter_map(|line| line.detail)
            .find(|detail| normalize_taxpayer_id(&detail.taxpayer_id) == wanted)
    }

    fn list_by_tenant(&self, tenant_id: TenantId) -> Vec<RemittanceFile> {
        let mut files: Vec<RemittanceFile> = self
            .files
            .iter()
            .filter(|entry| entry.tenant_id == tenant_id)
            .map(|entry| entry.value().clone())
            .collect();
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        files
    }
}

/// Bank codes as the headers write them: three digits, zero-padded
///
/// `"1"` and `"001"` name the same bank and must share one counter.
fn bank_key(bank_code: &str) -> String {
    pad_digits(bank_code, 3).unwrap_or_else(|_| bank_code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, remittance_file};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;
    use uuid::Uuid;

    #[test]
    fn test_sequences_start_at_one_per_bank() {
        let repo = InMemoryRepository::new();
        let tenant = Uuid::new_v4();

        assert_eq!(repo.next_sequence(tenant, "001").unwrap(), 1);
        assert_eq!(repo.next_sequence(tenant, "001").unwrap(), 2);
        assert_eq!(repo.next_sequence(tenant, "341").unwrap(), 1);
        assert_eq!(repo.next_sequence(Uuid::new_v4(), "001").unwrap(), 1);
    }

    #[test]
    fn test_seeded_sequence_continues_after_last() {
        let repo = InMemoryRepository::new();
        let tenant = Uuid::nil();
        repo.seed_sequence(tenant, "001", 41);
        assert_eq!(repo.next_sequence(tenant, "001").unwrap(), 42);
    }

    #[test]
    fn test_unpadded_bank_code_is_the_same_bank() {
        let repo = InMemoryRepository::new();
        let tenant = Uuid::nil();
        repo.seed_sequence(tenant, "1", 4);

        assert_eq!(repo.next_sequence(tenant, "001").unwrap(), 5);
        assert_eq!(repo.next_sequence(tenant, "1").unwrap(), 6);

        let file = repo.save(remittance_file(tenant, 9)).unwrap();
        assert_eq!(
            repo.find_by_sequence(tenant, FileKind::Remessa, "1", 9)
                .map(|f| f.id),
            Some(file.id)
        );
    }

    #[test]
    fn test_exhausted_sequence_is_an_error() {
        let repo = InMemoryRepository::new();
        let tenant = Uuid::nil();
        repo.seed_sequence(tenant, "001", MAX_SEQUENCE);
        assert!(matches!(
            repo.next_sequence(tenant, "001"),
            Err(CnabError::Storage { .. })
        ));
    }

    #[test]
    fn test_concurrent_next_sequence_is_gap_free() {
        let repo = Arc::new(InMemoryRepository::new());
        let tenant = Uuid::new_v4();
        repo.seed_sequence(tenant, "001", 10);
        let mut handles = vec![];

        for _ in 0..16 {
            let repo_clone = Arc::clone(&repo);
            let handle = thread::spawn(move || {
                (0..25)
                    .map(|_| repo_clone.next_sequence(tenant, "001").unwrap())
                    .collect::<Vec<_>>()
            });
            handles.push(handle);
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for sequence in handle.join().unwrap() {
                assert!(seen.insert(sequence), "sequence {} handed out twice", sequence);
            }
        }

        let expected: HashSet<u32> = (11..=410).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_save_and_find() {
        let repo = InMemoryRepository::new();
        let file = remittance_file(Uuid::nil(), 5);
        let id = file.id;
        repo.save(file).unwrap();

        assert!(repo.find_by_id(Uuid::nil(), id).is_some());
        assert!(repo.find_by_id(Uuid::new_v4(), id).is_none());
        assert_eq!(
            repo.find_by_sequence(Uuid::nil(), FileKind::Remessa, "001", 5)
                .map(|f| f.id),
            Some(id)
        );
        assert!(repo
            .find_by_sequence(Uuid::nil(), FileKind::Retorno, "001", 5)
            .is_none());
    }

    #[test]
    fn test_save_rejects_duplicate_remittance_sequence() {
        let repo = InMemoryRepository::new();
        repo.save(remittance_file(Uuid::nil(), 5)).unwrap();

        let error = repo.save(remittance_file(Uuid::nil(), 5)).unwrap_err();
        assert!(matches!(error, CnabError::Storage { .. }));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_resaving_same_file_replaces_it() {
        let repo = InMemoryRepository::new();
        let mut file = repo.save(remittance_file(Uuid::nil(), 5)).unwrap();
        file.mark_sent().unwrap();
        repo.save(file.clone()).unwrap();

        assert_eq!(repo.len(), 1);
        assert_eq!(repo.find_by_id(Uuid::nil(), file.id).unwrap(), file);
    }

    #[test]
    fn test_find_line_by_taxpayer_id() {
        let repo = InMemoryRepository::new();
        let file = repo.save(remittance_file(Uuid::nil(), 1)).unwrap();

        let detail = repo
            .find_line_by_taxpayer_id(Uuid::nil(), file.id, "111.222.333-44")
            .unwrap();
        assert_eq!(detail.employee_name, "ANA SOUZA");
        assert!(repo
            .find_line_by_taxpayer_id(Uuid::nil(), file.id, "99999999999")
            .is_none());
        assert!(repo
            .find_line_by_taxpayer_id(Uuid::nil(), file.id, "")
            .is_none());
    }

    #[test]
    fn test_list_by_tenant_newest_first() {
        let repo = InMemoryRepository::new();
        let tenant = Uuid::new_v4();

        let mut older = remittance_file(tenant, 1);
        older.created_at = at(2026, 10, 1, 9);
        let mut newer = remittance_file(tenant, 2);
        newer.created_at = at(2026, 10, 2, 9);
        repo.save(older.clone()).unwrap();
        repo.save(newer.clone()).unwrap();
        repo.save(remittance_file(Uuid::new_v4(), 1)).unwrap();

        let listed: Vec<FileId> = repo.list_by_tenant(tenant).iter().map(|f| f.id).collect();
        assert_eq!(listed, vec![newer.id, older.id]);
    }
}
