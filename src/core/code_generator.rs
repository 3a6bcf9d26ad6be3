//! Code generation for confirmation numbers, ticket codes and invitations
//!
//! Each namespace gets its own generator instance, injected where it is used.
//! Codes are drawn from an alphabet without the look-alike characters
//! `0`, `O`, `1` and `I` so they can be read back over the phone.

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Alphabet used by [`RandomCodeGenerator`]
pub const CODE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

pub const CONFIRMATION_NUMBER_LENGTH: usize = 24;
pub const TICKET_CODE_LENGTH: usize = 12;
pub const INVITATION_CODE_LENGTH: usize = 24;

/// Source of opaque codes for a single namespace
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random fixed-length codes over [`CODE_ALPHABET`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    pub fn new(length: usize) -> Self {
        RandomCodeGenerator { length }
    }

    pub fn confirmation_numbers() -> Self {
        Self::new(CONFIRMATION_NUMBER_LENGTH)
    }

    pub fn ticket_codes() -> Self {
        Self::new(TICKET_CODE_LENGTH)
    }

    pub fn invitation_codes() -> Self {
        Self::new(INVITATION_CODE_LENGTH)
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| char::from(CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())]))
            .collect()
    }
}

/// Predictable `PREFIX1`, `PREFIX2`, ... codes for tests and replays
#[derive(Debug)]
pub struct SequentialCodeGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialCodeGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        SequentialCodeGenerator {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl CodeGenerator for SequentialCodeGenerator {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }
}

/// The two generators an order needs
#[derive(Clone)]
pub struct OrderCodes {
    pub ticket_codes: Arc<dyn CodeGenerator>,
    pub confirmation_numbers: Arc<dyn CodeGenerator>,
}

impl OrderCodes {
    pub fn new(
        ticket_codes: Arc<dyn CodeGenerator>,
        confirmation_numbers: Arc<dyn CodeGenerator>,
    ) -> Self {
        OrderCodes {
            ticket_codes,
            confirmation_numbers,
        }
    }

    /// Random generators with the production code lengths
    pub fn random() -> Self {
        Self::new(
            Arc::new(RandomCodeGenerator::ticket_codes()),
            Arc::new(RandomCodeGenerator::confirmation_numbers()),
        )
    }
}

impl Default for OrderCodes {
    fn default() -> Self {
        Self::random()
    }
}

impl std::fmt::Debug for OrderCodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderCodes").finish_non_exhaustive()
    }
}
