use std::fs;

use secrecy::SecretString;
use tempfile::tempdir;
use vajournal_core::client::kdf_params_for;
use vajournal_core::crypto::{derive_key, encrypt, Envelope};
use vajournal_core::storage::{EntryFilter, EntryKind, EnvelopeStore, NewEntry, DEFAULT_JOURNAL};
use vajournal_core::{
    JournalClient, JournalError, SaltPolicy, SecuritySettings, SessionState, SqliteStore,
};

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

fn memory_client(settings: SecuritySettings) -> JournalClient<SqliteStore> {
    JournalClient::with_settings(SqliteStore::open_in_memory().unwrap(), settings)
}

#[test]
fn test_entries_survive_logout_and_login() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("journal.db");

    {
        let mut client = JournalClient::new(SqliteStore::create(&path).unwrap());
        client.register("alice", secret("correct-horse")).unwrap();
        client.write_text(DEFAULT_JOURNAL, "first entry").unwrap();
        client
            .write(DEFAULT_JOURNAL, EntryKind::Drawing, &[0x89, b'P', b'N', b'G'])
            .unwrap();
        assert!(client.logout());
        assert_eq!(client.state(), SessionState::NoKey);
    }

    let mut client = JournalClient::new(SqliteStore::open(&path).unwrap());
    client.login("alice", secret("correct-horse")).unwrap();

    let batch = client.read(DEFAULT_JOURNAL, &EntryFilter::new()).unwrap();
    assert!(batch.unreadable.is_empty());
    assert_eq!(batch.entries.len(), 2);
    assert_eq!(batch.entries[0].kind, EntryKind::Drawing);
    assert_eq!(batch.entries[0].plaintext, vec![0x89, b'P', b'N', b'G']);
    assert_eq!(batch.entries[1].as_text(), Some("first entry"));
}

#[test]
fn test_store_file_never_contains_plaintext() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("journal.db");
    let marker = "the treasure is buried under the old oak";

    {
        let mut client = JournalClient::new(SqliteStore::create(&path).unwrap());
        client.register("alice", secret("correct-horse")).unwrap();
        client.write_text(DEFAULT_JOURNAL, marker).unwrap();
    }

    let raw = fs::read(&path).unwrap();
    let raw_text = String::from_utf8_lossy(&raw);
    assert!(!raw_text.contains(marker));
    assert!(!raw_text.contains("correct-horse"));
}

#[test]
fn test_duplicate_registration_rejected() {
    let mut client = memory_client(SecuritySettings::default());
    client.register("alice", secret("correct-horse")).unwrap();
    client.logout();

    assert!(matches!(
        client.register("alice", secret("another-horse")),
        Err(JournalError::UserExists(_))
    ));
}

#[test]
fn test_corrupted_entries_reported_individually() {
    let mut client = memory_client(SecuritySettings::default());
    client.register("alice", secret("correct-horse")).unwrap();

    client.write_text(DEFAULT_JOURNAL, "good one").unwrap();

    // A well-formed envelope with one flipped ciphertext bit.
    let key = client.session().snapshot().unwrap();
    let sealed = encrypt(&key, b"tampered").unwrap();
    let mut ciphertext = sealed.ciphertext().to_vec();
    ciphertext[0] ^= 0x01;
    let tampered = Envelope::from_parts(*sealed.nonce(), ciphertext).unwrap();
    let tampered_id = client
        .store()
        .insert_entry(&NewEntry::new(
            "alice",
            DEFAULT_JOURNAL,
            EntryKind::Text,
            tampered.to_transport(),
        ))
        .unwrap();

    let garbage_id = client
        .store()
        .insert_entry(&NewEntry::new(
            "alice",
            DEFAULT_JOURNAL,
            EntryKind::Audio,
            "not an envelope",
        ))
        .unwrap();

    client.write_text(DEFAULT_JOURNAL, "good two").unwrap();

    let batch = client.read(DEFAULT_JOURNAL, &EntryFilter::new()).unwrap();
    let texts: Vec<&str> = batch.entries.iter().filter_map(|e| e.as_text()).collect();
    assert_eq!(texts.len(), 2);
    assert!(texts.contains(&"good one"));
    assert!(texts.contains(&"good two"));

    assert_eq!(batch.unreadable.len(), 2);
    let tampered_report = batch
        .unreadable
        .iter()
        .find(|e| e.id == tampered_id)
        .expect("tampered entry reported");
    assert!(matches!(
        tampered_report.reason,
        JournalError::AuthenticationFailure
    ));
    let garbage_report = batch
        .unreadable
        .iter()
        .find(|e| e.id == garbage_id)
        .expect("garbage entry reported");
    assert!(matches!(garbage_report.reason, JournalError::InvalidInput(_)));
}

#[test]
fn test_per_user_salt_separates_identical_passwords() {
    let settings = SecuritySettings {
        salt_policy: SaltPolicy::PerUser,
        ..SecuritySettings::default()
    };
    let mut client = memory_client(settings);

    let alice = client.register("alice", secret("correct-horse")).unwrap();
    client.write_text(DEFAULT_JOURNAL, "alice only").unwrap();
    client.logout();
    let bob = client.register("bob", secret("correct-horse")).unwrap();

    let alice_salt = alice.kdf_salt.clone().expect("per-user salt stored");
    let bob_salt = bob.kdf_salt.clone().expect("per-user salt stored");
    assert_ne!(alice_salt, bob_salt);

    let alice_key = derive_key("correct-horse", &kdf_params_for(&alice).unwrap()).unwrap();
    let bob_key = derive_key("correct-horse", &kdf_params_for(&bob).unwrap()).unwrap();
    assert_ne!(alice_key.as_bytes(), bob_key.as_bytes());

    let stored = client
        .store()
        .list_entries("alice", DEFAULT_JOURNAL, &EntryFilter::new())
        .unwrap();
    let envelope = Envelope::from_transport(&stored[0].payload).unwrap();
    assert!(vajournal_core::crypto::decrypt(&bob_key, &envelope).is_err());
    assert!(vajournal_core::crypto::decrypt(&alice_key, &envelope).is_ok());
}

#[test]
fn test_login_uses_stored_salt_after_policy_change() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("journal.db");
    let per_user = SecuritySettings {
        salt_policy: SaltPolicy::PerUser,
        ..SecuritySettings::default()
    };

    {
        let mut client = JournalClient::with_settings(SqliteStore::create(&path).unwrap(), per_user);
        client.register("alice", secret("correct-horse")).unwrap();
        client.write_text(DEFAULT_JOURNAL, "salted").unwrap();
    }

    let mut client = JournalClient::new(SqliteStore::open(&path).unwrap());
    assert_eq!(client.settings().salt_policy, SaltPolicy::Fixed);
    client.login("alice", secret("correct-horse")).unwrap();

    let batch = client.read(DEFAULT_JOURNAL, &EntryFilter::new()).unwrap();
    assert_eq!(batch.entries[0].as_text(), Some("salted"));
}

#[test]
fn test_custom_journal_and_kind_filter() {
    let mut client = memory_client(SecuritySettings::default());
    client.register("alice", secret("correct-horse")).unwrap();
    client.create_journal("dreams").unwrap();

    client.write_text("dreams", "flying again").unwrap();
    client
        .write("dreams", EntryKind::Audio, b"RIFF....WAVE")
        .unwrap();

    assert_eq!(client.journals().unwrap(), vec![DEFAULT_JOURNAL, "dreams"]);

    let audio = client
        .read("dreams", &EntryFilter::new().kind(EntryKind::Audio))
        .unwrap();
    assert_eq!(audio.entries.len(), 1);
    assert_eq!(audio.entries[0].plaintext, b"RIFF....WAVE".to_vec());

    assert!(client
        .read(DEFAULT_JOURNAL, &EntryFilter::new())
        .unwrap()
        .is_empty());
    assert!(matches!(
        client.read("missing", &EntryFilter::new()),
        Err(JournalError::NotFound(_))
    ));
}
