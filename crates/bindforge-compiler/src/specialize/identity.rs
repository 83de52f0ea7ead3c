//! Deterministic interface identities.

use uuid::Uuid;

/// Namespace every interface identity is derived under.
///
/// Changing this value changes every computed identity, so it is fixed for
/// the lifetime of the format.
pub const IDENTITY_NAMESPACE: Uuid = Uuid::from_u128(0x4b1d_f0a9_6c3e_5a27_9e14_d8c2_7f05_b36a);

/// UUID v5 of `name` under [`IDENTITY_NAMESPACE`].
pub fn identity(name: &str) -> Uuid {
    identity_in(&IDENTITY_NAMESPACE, name)
}

/// UUID v5 of `name` under an arbitrary namespace.
pub fn identity_in(namespace: &Uuid, name: &str) -> Uuid {
    Uuid::new_v5(namespace, name.as_bytes())
}
