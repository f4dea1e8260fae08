//! Property-based tests for the envelope codec.
//!
//! - Any plaintext survives encrypt/decrypt under any key
//! - A different key never opens an envelope
//! - Any single-bit flip is rejected

use proptest::prelude::*;

use super::envelope::{decrypt, encrypt, Envelope};
use super::key::SymmetricKey;
use crate::error::JournalError;

proptest! {
    #[test]
    fn round_trip_any_key_any_plaintext(
        key_bytes in any::<[u8; 32]>(),
        plaintext in prop::collection::vec(any::<u8>(), 0..2048),
    ) {
        let key = SymmetricKey::from_bytes(key_bytes);
        let envelope = encrypt(&key, &plaintext).unwrap();
        prop_assert_eq!(decrypt(&key, &envelope).unwrap(), plaintext);
    }

    #[test]
    fn distinct_keys_are_isolated(
        k1 in any::<[u8; 32]>(),
        k2 in any::<[u8; 32]>(),
        plaintext in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        prop_assume!(k1 != k2);
        let envelope = encrypt(&SymmetricKey::from_bytes(k1), &plaintext).unwrap();
        let result = decrypt(&SymmetricKey::from_bytes(k2), &envelope);
        prop_assert!(matches!(result, Err(JournalError::AuthenticationFailure)));
    }

    #[test]
    fn single_bit_flip_is_rejected(
        plaintext in prop::collection::vec(any::<u8>(), 0..256),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let key = SymmetricKey::from_bytes([3u8; 32]);
        let envelope = encrypt(&key, &plaintext).unwrap();

        let mut nonce = *envelope.nonce();
        let mut ciphertext = envelope.ciphertext().to_vec();
        let index = position.index(nonce.len() + ciphertext.len());
        if index < nonce.len() {
            nonce[index] ^= 1 << bit;
        } else {
            ciphertext[index - nonce.len()] ^= 1 << bit;
        }

        let tampered = Envelope::from_parts(nonce, ciphertext).unwrap();
        prop_assert!(matches!(
            decrypt(&key, &tampered),
            Err(JournalError::AuthenticationFailure)
        ));
    }
}
