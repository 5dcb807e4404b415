//! Integration tests for the full token lifecycle: issue → extract → look up.
//!
//! These run the real HMAC notary and base64 packer against the in-memory
//! repository, exercising the two-phase trust model end to end.

use chrono::{TimeDelta, TimeZone, Utc};
use tessera_notary::HmacNotary;
use tessera_session::{
    AccountId, InMemorySessionRepository, SecretKey, Session, SessionError, SessionId,
    SessionRepository, TokenExtractor, extract_id, token_packer,
};

// =========================================================================
// Helpers
// =========================================================================

const ID: &str = "12345678-90ab-cdef-0123-4567890abcde";

fn zero_key() -> SecretKey {
    SecretKey::new([0; 16])
}

fn issue(session: &Session, key: &SecretKey) -> String {
    session
        .token(&HmacNotary::new(), &token_packer(), key)
        .expect("token")
}

fn extract(token: &str, key: &SecretKey) -> Result<SessionId, SessionError> {
    extract_id(token, &token_packer(), &HmacNotary::new(), key)
}

// =========================================================================
// Issue → extract
// =========================================================================

#[test]
fn test_known_session_round_trips_and_rejects_tampering() {
    let session = Session::new(
        SessionId::from(ID),
        AccountId(123),
        Utc.timestamp_opt(1_699_996_400, 0).unwrap(),
        Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    );
    let token = issue(&session, &zero_key());

    assert_eq!(extract(&token, &zero_key()).unwrap().as_str(), ID);

    // Flip one character inside the first full base64 group.
    let mut bytes = token.into_bytes();
    bytes[2] = if bytes[2] == b'x' { b'y' } else { b'x' };
    let tampered = String::from_utf8(bytes).unwrap();

    assert!(matches!(
        extract(&tampered, &zero_key()),
        Err(SessionError::TokenVerify)
    ));
}

#[test]
fn test_many_generated_sessions_round_trip() {
    let key = SecretKey::generate();
    for account in 0..50 {
        let session = Session::create(AccountId(account), TimeDelta::days(3)).unwrap();
        let token = issue(&session, &key);
        assert_eq!(extract(&token, &key).unwrap(), session.id);
    }
}

#[test]
fn test_independent_keys_do_not_cross_verify() {
    // Two services in one process, each with its own key.
    let (key_a, key_b) = (SecretKey::generate(), SecretKey::generate());
    let extractor_a = TokenExtractor::new(token_packer(), HmacNotary::new(), key_a.clone());
    let extractor_b = TokenExtractor::new(token_packer(), HmacNotary::new(), key_b);

    let session = Session::create(AccountId(1), TimeDelta::hours(1)).unwrap();
    let token = issue(&session, &key_a);

    assert_eq!(extractor_a.extract(&token).unwrap(), session.id);
    assert!(matches!(
        extractor_b.extract(&token),
        Err(SessionError::TokenVerify)
    ));
}

#[test]
fn test_token_issued_before_renewal_still_extracts() {
    let mut session = Session::create(AccountId(1), TimeDelta::hours(1)).unwrap();
    let old_token = issue(&session, &zero_key());

    session.reset_expires_at(TimeDelta::days(1)).unwrap();
    let new_token = issue(&session, &zero_key());

    assert_ne!(old_token, new_token);
    assert_eq!(extract(&old_token, &zero_key()).unwrap(), session.id);
    assert_eq!(extract(&new_token, &zero_key()).unwrap(), session.id);
}

// =========================================================================
// Extract → repository
// =========================================================================

#[tokio::test]
async fn test_deleted_session_token_extracts_but_lookup_not_found() {
    let repo = InMemorySessionRepository::new();
    let session = Session::create(AccountId(42), TimeDelta::hours(1)).unwrap();
    repo.save(&session).await.unwrap();
    let token = issue(&session, &zero_key());

    repo.delete(&session.id).await.unwrap();

    // Phase one still passes: the token is authentic.
    let id = extract(&token, &zero_key()).expect("token is still authentic");
    assert_eq!(id, session.id);

    // Phase two is authoritative.
    assert!(matches!(
        repo.find_by_id(&id).await,
        Err(SessionError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_expired_session_token_extracts_but_lookup_expired() {
    let repo = InMemorySessionRepository::new();
    let now = Utc::now();
    let session = Session::new(
        SessionId::generate(),
        AccountId(42),
        now - TimeDelta::hours(2),
        now - TimeDelta::seconds(5),
    );
    repo.save(&session).await.unwrap();
    let token = issue(&session, &zero_key());

    let id = extract(&token, &zero_key()).unwrap();

    assert!(matches!(
        repo.find_by_id(&id).await,
        Err(SessionError::Expired(_))
    ));
}

#[tokio::test]
async fn test_logout_everywhere_invalidates_every_token_of_account() {
    let repo = InMemorySessionRepository::new();
    let sessions: Vec<Session> = (0..3)
        .map(|_| Session::create(AccountId(7), TimeDelta::hours(1)).unwrap())
        .collect();
    for s in &sessions {
        repo.save(s).await.unwrap();
    }
    let tokens: Vec<String> = sessions.iter().map(|s| issue(s, &zero_key())).collect();

    repo.delete_all_by_account(AccountId(7)).await.unwrap();

    for token in &tokens {
        let id = extract(token, &zero_key()).unwrap();
        assert!(repo.find_by_id(&id).await.is_err());
    }
}
