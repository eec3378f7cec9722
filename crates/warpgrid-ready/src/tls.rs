//! TLS client configuration for `https` targets.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use tokio_rustls::TlsConnector;

/// Trust roots used to verify an `https` target.
#[derive(Clone)]
pub struct TlsConfig {
    client_config: Arc<rustls::ClientConfig>,
}

impl fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsConfig").finish_non_exhaustive()
    }
}

impl TlsConfig {
    /// Trust the Mozilla root certificate store.
    pub fn with_webpki_roots() -> anyhow::Result<Self> {
        let mut roots = rustls::RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        Self::with_roots(roots)
    }

    /// Trust only the certificates in a PEM bundle, e.g. a cluster's own CA.
    pub fn from_pem(pem: &[u8]) -> anyhow::Result<Self> {
        let mut roots = rustls::RootCertStore::empty();
        let mut reader = pem;
        for cert in rustls_pemfile::certs(&mut reader) {
            let cert = cert.context("parse CA certificate")?;
            roots.add(cert).context("add CA certificate")?;
        }
        if roots.is_empty() {
            bail!("no certificates found in CA bundle");
        }
        Self::with_roots(roots)
    }

    pub fn from_pem_file(path: &Path) -> anyhow::Result<Self> {
        let pem = std::fs::read(path)
            .with_context(|| format!("read CA certificate {}", path.display()))?;
        Self::from_pem(&pem).with_context(|| format!("load CA certificate {}", path.display()))
    }

    fn with_roots(roots: rustls::RootCertStore) -> anyhow::Result<Self> {
        let config = rustls::ClientConfig::builder_with_provider(
            rustls::crypto::ring::default_provider().into(),
        )
        .with_safe_default_protocol_versions()
        .context("tls protocol versions")?
        .with_root_certificates(roots)
        .with_no_client_auth();

        Ok(Self {
            client_config: Arc::new(config),
        })
    }

    pub(crate) fn connector(&self) -> TlsConnector {
        TlsConnector::from(Arc::clone(&self.client_config))
    }
}
