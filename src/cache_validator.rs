use sha2::{Digest, Sha256};

/// Integrity wrapper for cached ViaCEP responses.
///
/// Lookup results live in the shared moka cache as JSON strings; each entry
/// carries a SHA-256 checksum that is recomputed on retrieval. An entry that
/// fails validation is discarded and the address is fetched again, so a
/// corrupted cache can never feed garbage into the address prefill.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ValidatedCacheEntry {
    /// The cached JSON payload.
    pub data: String,
    /// SHA-256 checksum of the payload (hex encoded).
    pub checksum: String,
}

impl ValidatedCacheEntry {
    /// Wraps a payload with its computed checksum.
    pub fn new(data: String) -> Self {
        let checksum = Self::compute_checksum(&data);
        Self { data, checksum }
    }

    fn compute_checksum(data: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// True when the stored checksum still matches the payload.
    pub fn is_valid(&self) -> bool {
        Self::compute_checksum(&self.data) == self.checksum
    }

    /// Serializes the entry for storage in the cache.
    pub fn serialize(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Deserializes a cache entry and returns the payload only if the
    /// checksum holds; `None` means the caller should refetch.
    pub fn deserialize_and_validate(serialized: &str) -> Option<String> {
        let entry: ValidatedCacheEntry = serde_json::from_str(serialized).ok()?;

        if entry.is_valid() {
            Some(entry.data)
        } else {
            tracing::warn!(
                "Cache validation failed: checksum mismatch. Expected: {}, Data length: {}",
                entry.checksum,
                entry.data.len()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_entry_validates() {
        let data = r#"{"localidade": "São Paulo", "uf": "SP"}"#.to_string();
        let entry = ValidatedCacheEntry::new(data.clone());

        assert!(entry.is_valid());
        assert_eq!(entry.data, data);
    }

    #[test]
    fn test_roundtrip_returns_payload() {
        let data = r#"{"logradouro": "Praça da Sé"}"#.to_string();
        let entry = ValidatedCacheEntry::new(data.clone());

        let restored = ValidatedCacheEntry::deserialize_and_validate(&entry.serialize());
        assert_eq!(restored, Some(data));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let entry = ValidatedCacheEntry::new(r#"{"uf": "SP"}"#.to_string());

        let mut tampered = entry;
        tampered.data = r#"{"uf": "RJ"}"#.to_string();
        assert!(!tampered.is_valid());
    }

    #[test]
    fn test_tampered_serialized_entry_returns_none() {
        let entry = ValidatedCacheEntry::new(r#"{"bairro": "Centro"}"#.to_string());
        let tampered = entry.serialize().replace("Centro", "Subúrbio");

        assert_eq!(ValidatedCacheEntry::deserialize_and_validate(&tampered), None);
    }

    #[test]
    fn test_checksum_is_deterministic() {
        let a = ValidatedCacheEntry::new("01001000".to_string());
        let b = ValidatedCacheEntry::new("01001000".to_string());
        assert_eq!(a.checksum, b.checksum);
    }
}
