//! Proptest generators for property-based testing.

use proptest::prelude::*;

use consent_vault_core::{PatientId, ProviderId, RecordId, TransactionId};

/// Generate a random PatientId.
pub fn patient_id() -> impl Strategy<Value = PatientId> {
    "pat-[a-z0-9]{1,12}".prop_map(|s| PatientId::new(s).expect("non-empty"))
}

/// Generate a random ProviderId.
pub fn provider_id() -> impl Strategy<Value = ProviderId> {
    "doc-[a-z0-9]{1,12}".prop_map(|s| ProviderId::new(s).expect("non-empty"))
}

/// Generate a random RecordId.
pub fn record_id() -> impl Strategy<Value = RecordId> {
    any::<[u8; 16]>().prop_map(RecordId::from_bytes)
}

/// Generate a random TransactionId.
pub fn transaction_id() -> impl Strategy<Value = TransactionId> {
    any::<[u8; 16]>().prop_map(TransactionId::from_bytes)
}

/// Generate a non-empty record payload of at most `max_len` bytes.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=max_len.max(1))
}

/// A single consent change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentOp {
    Grant,
    Revoke,
}

impl ConsentOp {
    pub fn granted(self) -> bool {
        matches!(self, ConsentOp::Grant)
    }
}

impl Arbitrary for ConsentOp {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![Just(ConsentOp::Grant), Just(ConsentOp::Revoke)].boxed()
    }
}

/// Generate a sequence of 1 to `max_len` consent changes.
pub fn consent_ops(max_len: usize) -> impl Strategy<Value = Vec<ConsentOp>> {
    prop::collection::vec(any::<ConsentOp>(), 1..=max_len.max(1))
}

/// The consent state a sequence should leave behind.
pub fn final_state(ops: &[ConsentOp]) -> bool {
    ops.last().map(|op| op.granted()).unwrap_or(false)
}
