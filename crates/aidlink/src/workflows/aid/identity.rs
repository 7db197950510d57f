use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

const SESSION_TOKEN_BYTES: usize = 32;
const SECRET_CODE_BYTES: usize = 4;
const SECRET_CODE_PREFIX: &str = "STR";
const HASH_SALT: &str = "salt-key";
const HASH_PREFIX: &str = "Hx";
const HASH_DIGITS: usize = 10;

/// Mint an opaque one-time session token standing in for a verified
/// identity. Not a security token; uniqueness comes from 32 random bytes.
pub fn session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate a disbursement reference code: fixed prefix, millisecond
/// timestamp, and 4 random bytes hex-encoded uppercase.
pub fn secret_code(now: DateTime<Utc>) -> String {
    let mut bytes = [0u8; SECRET_CODE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    format!(
        "{}-{}-{}",
        SECRET_CODE_PREFIX,
        now.timestamp_millis(),
        hex::encode_upper(bytes)
    )
}

/// Derive a one-way correlation key from an identity number so raw IC
/// numbers never appear in the audit log.
pub fn derive_hash(ic_number: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ic_number.as_bytes());
    hasher.update(HASH_SALT.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}{}", HASH_PREFIX, &digest[..HASH_DIGITS])
}

/// Infer the applicant's state from IC digits 7-8. Unknown codes fall back
/// to Selangor.
pub fn region_from_ic(ic_number: &str) -> &'static str {
    let code = ic_number.get(6..8).unwrap_or_default();
    match code {
        "01" => "Johor",
        "02" => "Kedah",
        "03" => "Kelantan",
        "04" => "Melaka",
        "05" => "Negeri Sembilan",
        "06" => "Pahang",
        "07" => "Penang",
        "08" => "Perak",
        "09" => "Perlis",
        "10" => "Selangor",
        "11" => "Terengganu",
        "12" => "Sabah",
        "13" => "Sarawak",
        "14" => "Kuala Lumpur",
        "15" => "Labuan",
        "16" => "Putrajaya",
        _ => "Selangor",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn session_tokens_are_64_hex_chars_and_unique() {
        let first = session_token();
        let second = session_token();

        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }

    #[test]
    fn secret_code_matches_reference_format() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let code = secret_code(now);

        let mut parts = code.splitn(3, '-');
        assert_eq!(parts.next(), Some("STR"));
        let millis = parts.next().expect("timestamp part");
        assert_eq!(millis, now.timestamp_millis().to_string());
        let suffix = parts.next().expect("random part");
        assert_eq!(suffix.len(), 8);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn derive_hash_is_deterministic_and_prefixed() {
        let first = derive_hash("900101145000");
        let second = derive_hash("900101145000");
        let other = derive_hash("950505106000");

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert!(first.starts_with("Hx"));
        assert_eq!(first.len(), 12);
    }

    #[test]
    fn region_lookup_reads_state_digits() {
        assert_eq!(region_from_ic("900101145000"), "Kuala Lumpur");
        assert_eq!(region_from_ic("950505106000"), "Selangor");
        assert_eq!(region_from_ic("881212147000"), "Kuala Lumpur");
        assert_eq!(region_from_ic("short"), "Selangor");
        assert_eq!(region_from_ic("900101995000"), "Selangor");
    }
}
