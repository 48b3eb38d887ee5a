//! TLS configuration for requests with a custom hostname verifier.
//!
//! Certificates are always validated against the webpki root store. When the
//! certificate is otherwise valid but issued for a different name, the
//! caller-supplied [`HostnameVerifier`] decides whether to accept the
//! connection anyway. Plain HTTP connections never consult it.

use std::fmt;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::{ring, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{
    CertificateError, ClientConfig, DigitallySignedStruct, Error as TlsError, RootCertStore,
    SignatureScheme,
};

use crate::error_handling::RequestError;

/// Predicate consulted when a server certificate does not match the requested host.
///
/// Receives the host name (or IP literal) the client connected to and returns
/// `true` to accept the mismatched certificate.
pub type HostnameVerifier = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Builds a rustls client configuration that defers name mismatches to `verifier`.
pub(crate) fn client_config_with_hostname_verifier(
    verifier: HostnameVerifier,
) -> Result<ClientConfig, RequestError> {
    let provider: Arc<CryptoProvider> = Arc::new(ring::default_provider());

    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let inner = WebPkiServerVerifier::builder_with_provider(Arc::new(root_store), provider.clone())
        .build()
        .map_err(|e| RequestError::Tls(e.to_string()))?;

    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| RequestError::Tls(e.to_string()))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(HostnameOverrideVerifier { inner, verifier }))
        .with_no_client_auth();

    Ok(config)
}

fn is_name_mismatch(error: &TlsError) -> bool {
    matches!(
        error,
        TlsError::InvalidCertificate(
            CertificateError::NotValidForName | CertificateError::NotValidForNameContext { .. }
        )
    )
}

/// Lets `verifier` overrule a name mismatch for `host`; every other outcome stands.
fn accept_name_mismatch(
    result: Result<ServerCertVerified, TlsError>,
    host: &str,
    verifier: &HostnameVerifier,
) -> Result<ServerCertVerified, TlsError> {
    match result {
        Err(e) if is_name_mismatch(&e) => {
            if verifier(host) {
                log::debug!("Hostname verifier accepted certificate for {host}");
                Ok(ServerCertVerified::assertion())
            } else {
                Err(e)
            }
        }
        other => other,
    }
}

struct HostnameOverrideVerifier {
    inner: Arc<WebPkiServerVerifier>,
    verifier: HostnameVerifier,
}

impl fmt::Debug for HostnameOverrideVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostnameOverrideVerifier")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl ServerCertVerifier for HostnameOverrideVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, TlsError> {
        let result = self.inner.verify_server_cert(
            end_entity,
            intermediates,
            server_name,
            ocsp_response,
            now,
        );
        accept_name_mismatch(result, &server_name.to_str(), &self.verifier)
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}
