use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use secrecy::SecretString;
use vajournal_core::crypto::KdfParams;
use vajournal_core::{JournalError, Session, SessionState};

const WORKERS: usize = 4;
const CYCLES: usize = 5;

fn password() -> SecretString {
    SecretString::from("correct-horse".to_string())
}

#[test]
fn test_workers_never_observe_a_torn_key() {
    let session = Arc::new(Session::new());
    let params = KdfParams::application();
    session
        .authenticate(password(), &params)
        .expect("authenticate should succeed");

    let done = Arc::new(AtomicBool::new(false));
    let successes = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let session = Arc::clone(&session);
            let done = Arc::clone(&done);
            let successes = Arc::clone(&successes);
            thread::spawn(move || {
                let message = format!("worker {} entry", worker);
                while !done.load(Ordering::Acquire) {
                    match session.encrypt(message.as_bytes()) {
                        Ok(envelope) => match session.decrypt(&envelope) {
                            Ok(plaintext) => {
                                assert_eq!(plaintext, message.as_bytes());
                                successes.fetch_add(1, Ordering::Relaxed);
                            }
                            Err(JournalError::NotInitialized) => {}
                            Err(other) => panic!("unexpected decrypt error: {}", other),
                        },
                        Err(JournalError::NotInitialized) => {}
                        Err(other) => panic!("unexpected encrypt error: {}", other),
                    }
                }
            })
        })
        .collect();

    for _ in 0..CYCLES {
        session.logout();
        assert_eq!(session.state(), SessionState::NoKey);
        session
            .authenticate(password(), &params)
            .expect("authenticate should succeed");
    }

    done.store(true, Ordering::Release);
    for handle in handles {
        handle.join().expect("worker should not panic");
    }

    assert_eq!(session.state(), SessionState::KeyActive);
    assert!(successes.load(Ordering::Relaxed) > 0);
}

#[test]
fn test_snapshot_taken_before_logout_still_works() {
    let session = Arc::new(Session::new());
    session
        .authenticate(password(), &KdfParams::application())
        .expect("authenticate should succeed");

    let key = session.snapshot().expect("key should be active");
    let worker = {
        let key = Arc::clone(&key);
        thread::spawn(move || {
            let envelope = vajournal_core::crypto::encrypt(&key, b"in flight")
                .expect("encrypt should succeed");
            vajournal_core::crypto::decrypt(&key, &envelope).expect("decrypt should succeed")
        })
    };

    session.logout();
    assert_eq!(worker.join().expect("worker should not panic"), b"in flight");
    assert!(matches!(
        session.encrypt(b"after"),
        Err(JournalError::NotInitialized)
    ));
}
