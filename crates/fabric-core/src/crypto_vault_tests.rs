use super::*;

#[test]
fn aes_gcm_round_trips_plaintext() {
    let key = [7u8; 32];
    let encryptor = AesGcmEncryptor::new(&key).unwrap();

    let ciphertext = encryptor.encrypt(b"top secret config value").unwrap();
    assert_ne!(ciphertext, b"top secret config value");

    let plaintext = encryptor.decrypt(&ciphertext).unwrap();
    assert_eq!(plaintext, b"top secret config value");
}

#[test]
fn aes_gcm_uses_a_fresh_nonce_per_message() {
    let key = [9u8; 32];
    let encryptor = AesGcmEncryptor::new(&key).unwrap();

    let a = encryptor.encrypt(b"same plaintext").unwrap();
    let b = encryptor.encrypt(b"same plaintext").unwrap();

    assert_ne!(a, b, "ciphertexts for identical plaintext must differ due to nonce reuse avoidance");
}

#[test]
fn aes_gcm_rejects_keys_of_the_wrong_length() {
    let err = AesGcmEncryptor::new(&[0u8; 16]).unwrap_err();
    assert!(matches!(err, CryptoError::InvalidKeyLength { expected: 32, actual: 16 }));
}

#[test]
fn aes_gcm_decrypt_fails_on_tampered_ciphertext() {
    let key = [3u8; 32];
    let encryptor = AesGcmEncryptor::new(&key).unwrap();
    let mut ciphertext = encryptor.encrypt(b"data").unwrap();
    let last = ciphertext.len() - 1;
    ciphertext[last] ^= 0xFF;

    assert!(encryptor.decrypt(&ciphertext).is_err());
}

#[test]
fn noop_encryptor_is_a_pass_through() {
    let encryptor = NoOpEncryptor;
    let ciphertext = encryptor.encrypt(b"plain").unwrap();
    assert_eq!(ciphertext, b"plain");
    assert_eq!(encryptor.decrypt(&ciphertext).unwrap(), b"plain");
}

#[test]
fn generated_webhook_secrets_meet_the_minimum_length() {
    let secret = generate_webhook_secret();
    assert_eq!(secret.len(), MIN_WEBHOOK_SECRET_BYTES * 2); // hex-encoded
}

#[test]
fn verify_signature_accepts_a_matching_hmac() {
    let secret = "shh";
    let body = b"{\"push\":true}";

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    let digest = hex::encode(mac.finalize().into_bytes());
    let header = format!("sha256={digest}");

    assert!(verify_signature(secret, body, &header).is_ok());
}

#[test]
fn verify_signature_rejects_a_wrong_secret() {
    let body = b"{\"push\":true}";
    let mut mac = Hmac::<Sha256>::new_from_slice(b"correct").unwrap();
    mac.update(body);
    let digest = hex::encode(mac.finalize().into_bytes());
    let header = format!("sha256={digest}");

    let err = verify_signature("wrong", body, &header).unwrap_err();
    assert!(matches!(err, CryptoError::SignatureMismatch));
}
