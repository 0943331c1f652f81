//! TLS acceptor configuration.
//!
//! TLS 1.2 is restricted to ECDHE key exchange with AEAD ciphers over P-256
//! and X25519. TLS 1.3 suites are always AEAD. ALPN offers `h2` first.

use rustls::ServerConfig;
use rustls::crypto::{CryptoProvider, ring};
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tokio_rustls::TlsAcceptor;

use crate::error::LinkerError;

/// Crypto provider limited to the accepted suites and curves.
pub fn provider() -> CryptoProvider {
    use ring::cipher_suite as suite;

    CryptoProvider {
        cipher_suites: vec![
            suite::TLS13_AES_256_GCM_SHA384,
            suite::TLS13_AES_128_GCM_SHA256,
            suite::TLS13_CHACHA20_POLY1305_SHA256,
            suite::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
            suite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
            suite::TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256,
            suite::TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256,
            suite::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
            suite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
        ],
        kx_groups: vec![ring::kx_group::SECP256R1, ring::kx_group::X25519],
        ..ring::default_provider()
    }
}

/// Builds an acceptor from PEM-encoded key and certificate chain files.
///
/// # Errors
///
/// Returns [`LinkerError::Tls`] if either file is unreadable, contains no
/// usable entry, or the key does not match the certificate.
pub fn acceptor(key_path: &Path, cert_path: &Path) -> Result<TlsAcceptor, LinkerError> {
    let certs = load_certs(cert_path)?;
    let key = load_key(key_path)?;

    let mut config = ServerConfig::builder_with_provider(Arc::new(provider()))
        .with_protocol_versions(&[&rustls::version::TLS13, &rustls::version::TLS12])
        .map_err(|e| LinkerError::Tls(e.to_string()))?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| LinkerError::Tls(format!("certificate \"{}\": {e}", cert_path.display())))?;

    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(TlsAcceptor::from(Arc::new(config)))
}

fn open(path: &Path) -> Result<BufReader<File>, LinkerError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| LinkerError::Tls(format!("read \"{}\": {e}", path.display())))
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, LinkerError> {
    let certs = rustls_pemfile::certs(&mut open(path)?)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| LinkerError::Tls(format!("parse \"{}\": {e}", path.display())))?;

    if certs.is_empty() {
        return Err(LinkerError::Tls(format!(
            "no certificates found in \"{}\"",
            path.display()
        )));
    }
    Ok(certs)
}

fn load_key(path: &Path) -> Result<PrivateKeyDer<'static>, LinkerError> {
    rustls_pemfile::private_key(&mut open(path)?)
        .map_err(|e| LinkerError::Tls(format!("parse \"{}\": {e}", path.display())))?
        .ok_or_else(|| LinkerError::Tls(format!("no private key found in \"{}\"", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustls::{CipherSuite, NamedGroup};
    use std::io::Write;

    #[test]
    fn test_provider_allows_only_aead_suites() {
        let suites: Vec<CipherSuite> = provider().cipher_suites.iter().map(|s| s.suite()).collect();

        assert_eq!(suites.len(), 9);
        assert!(suites.contains(&CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256));
        assert!(!suites.contains(&CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA));
    }

    #[test]
    fn test_provider_curves() {
        let groups: Vec<NamedGroup> = provider().kx_groups.iter().map(|g| g.name()).collect();
        assert_eq!(groups, vec![NamedGroup::secp256r1, NamedGroup::X25519]);
    }

    #[test]
    fn test_acceptor_missing_files() {
        let result = acceptor(Path::new("/nonexistent/key.pem"), Path::new("/nonexistent/cert.pem"));
        assert!(matches!(result, Err(LinkerError::Tls(msg)) if msg.contains("cert.pem")));
    }

    #[test]
    fn test_acceptor_empty_certificate_file() {
        let mut cert = tempfile::NamedTempFile::new().unwrap();
        writeln!(cert, "not a certificate").unwrap();

        let result = acceptor(Path::new("/nonexistent/key.pem"), cert.path());
        assert!(matches!(result, Err(LinkerError::Tls(msg)) if msg.contains("no certificates")));
    }
}
