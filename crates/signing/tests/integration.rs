//! Integration tests for signing crate

#[cfg(test)]
mod tests {
    use esmc_signing::*;
    use esmc_types::SignaturePayload;

    const PRETTY: &str = "{\n  \"buildVersion\": \"2.0.0\",\n  \"checksums\": {\n    \"b.js\": \"01\",\n    \"a.js\": \"02\"\n  }\n}\n";

    #[test]
    fn test_raw_payload_is_file_bytes() {
        let payload = signing_payload(PRETTY.as_bytes(), SignaturePayload::Raw).unwrap();
        assert_eq!(&*payload, PRETTY.as_bytes());
    }

    #[test]
    fn test_compact_payload_preserves_key_order() {
        let payload = signing_payload(PRETTY.as_bytes(), SignaturePayload::Compact).unwrap();
        assert_eq!(
            std::str::from_utf8(&payload).unwrap(),
            r#"{"buildVersion":"2.0.0","checksums":{"b.js":"01","a.js":"02"}}"#
        );
    }

    #[test]
    fn test_compact_payload_rejects_invalid_json() {
        assert!(signing_payload(b"{not json", SignaturePayload::Compact).is_err());
    }

    #[test]
    fn test_whitespace_change_breaks_raw_signature() {
        let key = SigningKey::derive("esmc-integrity:", "2.0.0");
        let signature = key.sign(PRETTY.as_bytes());
        assert!(key.verify(PRETTY.as_bytes(), &signature));

        let reformatted = PRETTY.replace("  ", "    ");
        assert!(!key.verify(reformatted.as_bytes(), &signature));
    }

    #[test]
    fn test_whitespace_change_survives_compact_signature() {
        let key = SigningKey::derive("esmc-integrity:", "2.0.0");
        let payload = signing_payload(PRETTY.as_bytes(), SignaturePayload::Compact).unwrap();
        let signature = key.sign(&payload);

        let reformatted = PRETTY.replace("  ", "    ");
        let payload = signing_payload(reformatted.as_bytes(), SignaturePayload::Compact).unwrap();
        assert!(key.verify(&payload, &signature));
    }

    #[test]
    fn test_signature_comparison_is_exact() {
        let key = SigningKey::derive("esmc-integrity:", "2.0.0");
        let signature = key.sign(b"manifest").to_uppercase();
        assert!(!key.verify(b"manifest", &signature));
    }
}
