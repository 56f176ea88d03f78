//! Next-number assignment and per-sequence serialization.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use super::service::{AuthorityError, VoucherService};
use crate::core::VoucherType;

/// A voucher number sequence: one per (sales point, voucher type) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceKey {
    pub sales_point: u32,
    pub voucher_type: VoucherType,
}

impl SequenceKey {
    pub fn new(sales_point: u32, voucher_type: VoucherType) -> Self {
        Self {
            sales_point,
            voucher_type,
        }
    }
}

impl std::fmt::Display for SequenceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.sales_point, self.voucher_type.code())
    }
}

/// Registry of per-sequence locks.
///
/// Issuance for the same sequence must not interleave between reading the
/// last number and submitting the voucher, otherwise two requests would be
/// given the same number. Different sequences proceed in parallel.
#[derive(Debug, Default)]
pub struct SequenceLocks {
    locks: DashMap<SequenceKey, Arc<Mutex<()>>>,
}

impl SequenceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`'s sequence. The lock is released
    /// when the guard is dropped.
    pub async fn acquire(&self, key: SequenceKey) -> OwnedMutexGuard<()> {
        // Clone out of the map so no shard lock is held across the await.
        let lock = self.locks.entry(key).or_default().clone();
        lock.lock_owned().await
    }

    /// Number of sequences seen so far.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Ask the authority for the last issued number and return the next one.
pub async fn assign_next_number<S>(
    service: &S,
    sales_point: u32,
    voucher_type: VoucherType,
) -> Result<u64, AuthorityError>
where
    S: VoucherService + ?Sized,
{
    let last = service.last_voucher_number(sales_point, voucher_type).await?;
    let next = last.checked_add(1).ok_or_else(|| AuthorityError::Authority {
        code: 0,
        message: format!("voucher sequence {sales_point}/{} is exhausted", voucher_type.code()),
    })?;
    debug!(
        sales_point,
        voucher_type = voucher_type.code(),
        last,
        next,
        "assigned voucher number"
    );
    Ok(next)
}
