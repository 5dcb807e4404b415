//! Session types: the server's record of a logged-in account.
//!
//! A session tracks:
//! - WHO it belongs to (`AccountId`)
//! - WHICH session it is (`SessionId`, a v4 UUID)
//! - WHEN it was created and WHEN it stops being valid
//!
//! It also knows how to turn itself into a signed, opaque token. The token
//! is just a snapshot: renewing a session changes `expires_at`, which means
//! the caller has to issue a new token afterwards.

use std::fmt;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tessera_notary::Notary;
use tessera_packer::{Base64Packer, Packer};
use uuid::Uuid;

use crate::{SecretKey, SessionError};

/// Length in bytes of a textual session id (hyphenated UUID).
pub const SESSION_ID_LEN: usize = 36;

/// Length in bytes of the decimal `expires_at` field of a signed message.
pub const EXPIRES_AT_LEN: usize = 10;

/// Length in bytes of a signed message: session id followed by expiry.
pub const SIGNED_MESSAGE_LEN: usize = SESSION_ID_LEN + EXPIRES_AT_LEN;

/// Returns the packer every token issuer and verifier must agree on.
///
/// This is the only place [`SIGNED_MESSAGE_LEN`] is handed to a packer.
pub fn token_packer() -> Base64Packer {
    Base64Packer::new(SIGNED_MESSAGE_LEN)
}

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Unique identifier of a session.
///
/// Generated ids are 36-character hyphenated v4 UUIDs. Arbitrary strings
/// are accepted too (ids read back from storage, ids from request paths);
/// one of the wrong length will simply fail to produce a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a new random (v4) session id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    /// Returns `true` if this id is a hyphenated UUID.
    pub fn is_uuid(&self) -> bool {
        self.0.len() == SESSION_ID_LEN && Uuid::try_parse(&self.0).is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the account a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single account's session.
///
/// Both timestamps are UTC and truncated to whole seconds, so a session
/// read back from storage compares equal to the one that was saved.
/// Deserialization goes through [`Session::new`] and truncates too.
/// `created_at <= expires_at` is expected but not enforced here; the
/// issuing and renewal policy above this layer is responsible for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SessionRecord")]
pub struct Session {
    pub id: SessionId,
    #[serde(rename = "accountID")]
    pub account_id: AccountId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Wire shape of a [`Session`], before timestamps are truncated.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRecord {
    id: SessionId,
    #[serde(rename = "accountID")]
    account_id: AccountId,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        Self::new(
            record.id,
            record.account_id,
            record.created_at,
            record.expires_at,
        )
    }
}

impl Session {
    /// Builds a session from its parts, truncating both timestamps to
    /// whole seconds.
    pub fn new(
        id: SessionId,
        account_id: AccountId,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            account_id,
            created_at: created_at.trunc_subsecs(0),
            expires_at: expires_at.trunc_subsecs(0),
        }
    }

    /// Starts a new session for `account_id` that lasts `duration` from now.
    ///
    /// # Errors
    /// [`SessionError::DurationOutOfRange`] if `now + duration` is not a
    /// representable timestamp.
    pub fn create(account_id: AccountId, duration: TimeDelta) -> Result<Self, SessionError> {
        let now = Utc::now();
        let expires_at = expiry_after(now, duration)?;
        Ok(Self::new(SessionId::generate(), account_id, now, expires_at))
    }

    /// Pushes `expires_at` to `now + duration`.
    ///
    /// Only the in-memory value changes. The caller persists the session
    /// and issues a fresh [`token`](Self::token); tokens handed out before
    /// the renewal still carry the old expiry.
    ///
    /// # Errors
    /// [`SessionError::DurationOutOfRange`] if `now + duration` is not a
    /// representable timestamp. The session is left untouched.
    pub fn reset_expires_at(&mut self, duration: TimeDelta) -> Result<(), SessionError> {
        self.expires_at = expiry_after(Utc::now(), duration)?.trunc_subsecs(0);
        Ok(())
    }

    /// Returns `true` if the session is past its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// The bytes the notary signs: the session id followed by
    /// `expires_at` as a Unix timestamp in exactly [`EXPIRES_AT_LEN`]
    /// bytes of ASCII decimal (NUL-padded on the right, truncated if
    /// longer).
    pub fn signed_message(&self) -> Vec<u8> {
        let mut expires = [0u8; EXPIRES_AT_LEN];
        let digits = self.expires_at.timestamp().to_string();
        let n = digits.len().min(EXPIRES_AT_LEN);
        expires[..n].copy_from_slice(&digits.as_bytes()[..n]);

        let mut message = Vec::with_capacity(self.id.as_str().len() + EXPIRES_AT_LEN);
        message.extend_from_slice(self.id.as_str().as_bytes());
        message.extend_from_slice(&expires);
        message
    }

    /// Issues the opaque token representing this session.
    ///
    /// Deterministic: the same `(id, expires_at, key)` always yields the
    /// same token.
    ///
    /// # Errors
    /// Returns [`SessionError::TokenPack`] if the signed message is not the
    /// length the packer expects, which means the session id is malformed.
    pub fn token<N: Notary, P: Packer>(
        &self,
        notary: &N,
        packer: &P,
        key: &SecretKey,
    ) -> Result<String, SessionError> {
        let message = self.signed_message();
        let signature = notary.sign(&message, key.as_bytes());
        packer
            .pack(&message, &signature)
            .map_err(SessionError::TokenPack)
    }
}

fn expiry_after(now: DateTime<Utc>, duration: TimeDelta) -> Result<DateTime<Utc>, SessionError> {
    now.checked_add_signed(duration)
        .ok_or(SessionError::DurationOutOfRange(duration))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::TimeZone;
    use tessera_notary::HmacNotary;
    use tessera_packer::PackerError;

    use super::*;

    const ID: &str = "12345678-90ab-cdef-0123-4567890abcde";

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn session_expiring_at(secs: i64) -> Session {
        Session::new(SessionId::from(ID), AccountId(123), at(secs - 3600), at(secs))
    }

    fn zero_key() -> SecretKey {
        SecretKey::new([0; 16])
    }

    /// Packer that replays a scripted result and records what it was given.
    struct ScriptedPacker {
        result: Mutex<Option<Result<String, PackerError>>>,
        seen: Mutex<Vec<(Vec<u8>, Vec<u8>)>>,
    }

    impl ScriptedPacker {
        fn returning(result: Result<String, PackerError>) -> Self {
            Self {
                result: Mutex::new(Some(result)),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Packer for ScriptedPacker {
        fn pack(&self, message: &[u8], signature: &[u8]) -> Result<String, PackerError> {
            self.seen
                .lock()
                .unwrap()
                .push((message.to_vec(), signature.to_vec()));
            self.result.lock().unwrap().take().expect("pack called twice")
        }

        fn unpack(&self, _pack: &str) -> Result<(Vec<u8>, Vec<u8>), PackerError> {
            unreachable!("not used by token issuance")
        }

        fn message_len(&self) -> usize {
            SIGNED_MESSAGE_LEN
        }
    }

    /// Notary that always returns the same signature.
    struct FixedNotary(&'static [u8]);

    impl Notary for FixedNotary {
        fn sign(&self, _message: &[u8], _key: &[u8]) -> Vec<u8> {
            self.0.to_vec()
        }

        fn verify(&self, _message: &[u8], signature: &[u8], _key: &[u8]) -> bool {
            signature == self.0
        }
    }

    // =====================================================================
    // new() / create()
    // =====================================================================

    #[test]
    fn test_new_truncates_timestamps_to_seconds() {
        let created = Utc.timestamp_opt(1_700_000_000, 999_999_999).unwrap();
        let expires = Utc.timestamp_opt(1_700_003_600, 1).unwrap();

        let session = Session::new(SessionId::from("123-456-789"), AccountId(123), created, expires);

        assert_eq!(session.id.as_str(), "123-456-789");
        assert_eq!(session.account_id, AccountId(123));
        assert_eq!(session.created_at, at(1_700_000_000));
        assert_eq!(session.expires_at, at(1_700_003_600));
    }

    #[test]
    fn test_create_sets_uuid_and_window() {
        let before = Utc::now().trunc_subsecs(0);
        let session = Session::create(AccountId(7), TimeDelta::seconds(30)).unwrap();

        assert!(session.id.is_uuid());
        assert_eq!(session.account_id, AccountId(7));
        assert!(session.created_at >= before);
        assert!(session.created_at <= Utc::now());
        assert_eq!(
            session.expires_at - session.created_at,
            TimeDelta::seconds(30)
        );
    }

    #[test]
    fn test_create_generates_unique_ids() {
        let a = Session::create(AccountId(1), TimeDelta::hours(1)).unwrap();
        let b = Session::create(AccountId(1), TimeDelta::hours(1)).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_create_unrepresentable_expiry_returns_error() {
        // Fits in a TimeDelta but lands past the last representable date.
        let duration = TimeDelta::seconds(10_000_000_000_000);

        let result = Session::create(AccountId(1), duration);

        assert!(matches!(
            result,
            Err(SessionError::DurationOutOfRange(d)) if d == duration
        ));
    }

    // =====================================================================
    // reset_expires_at() / is_expired_at()
    // =====================================================================

    #[test]
    fn test_reset_expires_at_moves_expiry_from_now() {
        let mut session = session_expiring_at(1_700_000_000);

        session.reset_expires_at(TimeDelta::seconds(60)).unwrap();

        let expected = Utc::now() + TimeDelta::seconds(60);
        assert!((expected - session.expires_at) <= TimeDelta::seconds(1));
        assert_eq!(session.expires_at.timestamp_subsec_nanos(), 0);
        // Creation time is immutable.
        assert_eq!(session.created_at, at(1_700_000_000 - 3600));
    }

    #[test]
    fn test_reset_expires_at_unrepresentable_expiry_leaves_session_unchanged() {
        let mut session = session_expiring_at(1_700_000_000);

        let result = session.reset_expires_at(TimeDelta::seconds(10_000_000_000_000));

        assert!(matches!(result, Err(SessionError::DurationOutOfRange(_))));
        assert_eq!(session, session_expiring_at(1_700_000_000));
    }

    #[test]
    fn test_is_expired_at_boundary() {
        let session = session_expiring_at(1_700_000_000);

        assert!(!session.is_expired_at(at(1_699_999_999)));
        assert!(!session.is_expired_at(at(1_700_000_000)));
        assert!(session.is_expired_at(at(1_700_000_001)));
    }

    // =====================================================================
    // signed_message()
    // =====================================================================

    #[test]
    fn test_signed_message_layout() {
        let message = session_expiring_at(1_700_000_000).signed_message();

        assert_eq!(message.len(), SIGNED_MESSAGE_LEN);
        assert_eq!(&message[..SESSION_ID_LEN], ID.as_bytes());
        assert_eq!(&message[SESSION_ID_LEN..], b"1700000000");
    }

    #[test]
    fn test_signed_message_short_timestamp_is_nul_padded() {
        let message = session_expiring_at(86_400).signed_message();

        assert_eq!(message.len(), SIGNED_MESSAGE_LEN);
        assert_eq!(&message[SESSION_ID_LEN..], b"86400\0\0\0\0\0");
    }

    #[test]
    fn test_signed_message_long_timestamp_is_truncated() {
        // Year 2286 and later need 11 digits.
        let message = session_expiring_at(10_000_000_000).signed_message();

        assert_eq!(message.len(), SIGNED_MESSAGE_LEN);
        assert_eq!(&message[SESSION_ID_LEN..], b"1000000000");
    }

    // =====================================================================
    // token()
    // =====================================================================

    #[test]
    fn test_token_valid_session_succeeds() {
        let token = session_expiring_at(1_700_000_000)
            .token(&HmacNotary::new(), &token_packer(), &zero_key())
            .expect("token");

        assert!(!token.is_empty());
    }

    #[test]
    fn test_token_is_deterministic() {
        let session = session_expiring_at(1_700_000_000);
        let (notary, packer, key) = (HmacNotary::new(), token_packer(), zero_key());

        assert_eq!(
            session.token(&notary, &packer, &key).unwrap(),
            session.token(&notary, &packer, &key).unwrap()
        );
    }

    #[test]
    fn test_token_changes_after_renewal() {
        let mut session = session_expiring_at(1_700_000_000);
        let (notary, packer, key) = (HmacNotary::new(), token_packer(), zero_key());
        let before = session.token(&notary, &packer, &key).unwrap();

        session.reset_expires_at(TimeDelta::hours(1)).unwrap();

        assert_ne!(session.token(&notary, &packer, &key).unwrap(), before);
    }

    #[test]
    fn test_token_depends_on_key() {
        let session = session_expiring_at(1_700_000_000);
        let (notary, packer) = (HmacNotary::new(), token_packer());

        assert_ne!(
            session.token(&notary, &packer, &zero_key()).unwrap(),
            session.token(&notary, &packer, &SecretKey::new([1; 16])).unwrap()
        );
    }

    #[test]
    fn test_token_malformed_id_returns_pack_error() {
        let session = Session::new(SessionId::from("sessID"), AccountId(123), at(0), at(0));

        let result = session.token(&HmacNotary::new(), &token_packer(), &zero_key());

        assert!(matches!(
            result,
            Err(SessionError::TokenPack(PackerError::LengthMismatch {
                expected: SIGNED_MESSAGE_LEN,
                actual: 16,
            }))
        ));
    }

    #[test]
    fn test_token_passes_message_and_signature_to_packer() {
        let packer = ScriptedPacker::returning(Ok("packed".to_string()));
        let session = session_expiring_at(1_700_000_000);

        let token = session
            .token(&FixedNotary(b"signature"), &packer, &zero_key())
            .unwrap();

        assert_eq!(token, "packed");
        let seen = packer.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, session.signed_message());
        assert_eq!(seen[0].1, b"signature");
    }

    #[test]
    fn test_token_wraps_packer_error() {
        let packer = ScriptedPacker::returning(Err(PackerError::Truncated {
            expected: 1,
            actual: 0,
        }));

        let result = session_expiring_at(1_700_000_000).token(
            &FixedNotary(b"sig"),
            &packer,
            &zero_key(),
        );

        assert!(matches!(
            result,
            Err(SessionError::TokenPack(PackerError::Truncated { .. }))
        ));
    }

    // =====================================================================
    // SessionId / serde
    // =====================================================================

    #[test]
    fn test_session_id_is_uuid() {
        assert!(SessionId::generate().is_uuid());
        assert!(SessionId::from(ID).is_uuid());
        assert!(!SessionId::from("sessID").is_uuid());
        // Simple (unhyphenated) form parses as a UUID but isn't 36 bytes.
        assert!(!SessionId::from("1234567890abcdef01234567890abcde").is_uuid());
    }

    #[test]
    fn test_session_id_generate_is_36_bytes() {
        assert_eq!(SessionId::generate().as_str().len(), SESSION_ID_LEN);
    }

    #[test]
    fn test_serialize_uses_wire_field_names() {
        let json = serde_json::to_value(session_expiring_at(1_700_000_000)).unwrap();

        assert_eq!(json["id"], ID);
        assert_eq!(json["accountID"], 123);
        assert_eq!(json["createdAt"], "2023-11-14T21:13:20Z");
        assert_eq!(json["expiresAt"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn test_deserialize_truncates_timestamps_to_seconds() {
        let json = format!(
            r#"{{"id": "{ID}", "accountID": 123, "createdAt": "2023-11-14T21:13:20.750Z", "expiresAt": "2023-11-14T22:13:20.999999999Z"}}"#
        );

        let session: Session = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(session, session_expiring_at(1_700_000_000));
        assert_eq!(session.expires_at.timestamp_subsec_nanos(), 0);
    }
}
