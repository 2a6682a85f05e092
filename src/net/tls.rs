//! TLS certificate provisioning and loading.
//!
//! On first run no certificate exists in the working directory. A local CA is
//! created (or reused from disk) and issues a certificate for the configured
//! names; the CA certificate is what clients install to trust the proxy.
//! Later runs reuse the same material.

use std::fs;
use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType,
    ExtendedKeyUsagePurpose, IsCa, KeyPair, KeyUsagePurpose,
};
use thiserror::Error;

use crate::config::TlsConfig;

const CA_COMMON_NAME: &str = "origin-proxy local CA";
const CA_ORGANIZATION: &str = "origin-proxy";

/// Error type for certificate provisioning and loading.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("Certificate generation failed: {0}")]
    Generation(#[from] rcgen::Error),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{kind} file not found: {path}")]
    Missing { kind: &'static str, path: PathBuf },
    #[error("Failed to load TLS material: {0}")]
    Load(#[source] std::io::Error),
}

/// Whether provisioning reused files on disk or created new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateStatus {
    Existing,
    Generated,
}

/// Absolute locations of the listener certificate, its key, and the local CA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificatePaths {
    pub cert: PathBuf,
    pub key: PathBuf,
    pub ca_cert: PathBuf,
    pub ca_key: PathBuf,
}

impl CertificatePaths {
    /// Resolve configured paths, relative ones against `base_dir`.
    pub fn resolve(config: &TlsConfig, base_dir: &Path) -> Self {
        Self {
            cert: base_dir.join(&config.cert_path),
            key: base_dir.join(&config.key_path),
            ca_cert: base_dir.join(&config.ca_cert_path),
            ca_key: base_dir.join(&config.ca_key_path),
        }
    }
}

/// Install the process-wide rustls crypto provider. Safe to call repeatedly.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

fn file_exists(path: &Path) -> bool {
    path.metadata().map(|m| !m.is_dir()).unwrap_or(false)
}

struct LocalCa {
    cert: Certificate,
    key: KeyPair,
}

fn ca_params() -> CertificateParams {
    let mut params = CertificateParams::default();
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![
        KeyUsagePurpose::KeyCertSign,
        KeyUsagePurpose::CrlSign,
        KeyUsagePurpose::DigitalSignature,
    ];
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, CA_COMMON_NAME);
    dn.push(DnType::OrganizationName, CA_ORGANIZATION);
    params.distinguished_name = dn;
    params
}

/// Reuse the CA on disk, or create and persist a new one.
///
/// An existing CA is rebuilt from its key with the same subject, so
/// certificates it signs chain to the file clients already trust.
fn local_ca(paths: &CertificatePaths) -> Result<LocalCa, TlsError> {
    if file_exists(&paths.ca_cert) && file_exists(&paths.ca_key) {
        let pem = fs::read_to_string(&paths.ca_key).map_err(|source| TlsError::Read {
            path: paths.ca_key.clone(),
            source,
        })?;
        let key = KeyPair::from_pem(&pem)?;
        let cert = ca_params().self_signed(&key)?;
        tracing::debug!(ca = %paths.ca_cert.display(), "Reusing local CA");
        return Ok(LocalCa { cert, key });
    }

    let key = KeyPair::generate()?;
    let cert = ca_params().self_signed(&key)?;
    write_pem(&paths.ca_cert, &cert.pem())?;
    write_pem(&paths.ca_key, &key.serialize_pem())?;

    tracing::warn!(
        ca = %paths.ca_cert.display(),
        "Created local CA; add it to the client trust store to trust the proxy"
    );
    Ok(LocalCa { cert, key })
}

/// Make sure both PEM files exist, issuing a certificate from the local CA
/// when either is missing.
pub fn ensure_certificate(
    paths: &CertificatePaths,
    domains: &[String],
) -> Result<CertificateStatus, TlsError> {
    if file_exists(&paths.cert) && file_exists(&paths.key) {
        tracing::debug!(
            cert = %paths.cert.display(),
            key = %paths.key.display(),
            "Reusing certificate"
        );
        return Ok(CertificateStatus::Existing);
    }

    let ca = local_ca(paths)?;

    let mut params = CertificateParams::new(domains.to_vec())?;
    if let Some(name) = domains.first() {
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, name.as_str());
        params.distinguished_name = dn;
    }
    params.is_ca = IsCa::NoCa;
    params.key_usages = vec![
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::KeyEncipherment,
    ];
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];

    let key = KeyPair::generate()?;
    let cert = params.signed_by(&key, &ca.cert, &ca.key)?;

    write_pem(&paths.cert, &cert.pem())?;
    write_pem(&paths.key, &key.serialize_pem())?;

    tracing::info!(
        cert = %paths.cert.display(),
        key = %paths.key.display(),
        ca = %paths.ca_cert.display(),
        domains = ?domains,
        "Issued certificate from local CA"
    );
    Ok(CertificateStatus::Generated)
}

fn write_pem(path: &Path, pem: &str) -> Result<(), TlsError> {
    fs::write(path, pem).map_err(|source| TlsError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Load TLS configuration from certificate and key files.
pub async fn load_tls_config(paths: &CertificatePaths) -> Result<RustlsConfig, TlsError> {
    if !paths.cert.exists() {
        return Err(TlsError::Missing {
            kind: "Certificate",
            path: paths.cert.clone(),
        });
    }
    if !paths.key.exists() {
        return Err(TlsError::Missing {
            kind: "Private key",
            path: paths.key.clone(),
        });
    }

    RustlsConfig::from_pem_file(&paths.cert, &paths.key)
        .await
        .map_err(TlsError::Load)
}
