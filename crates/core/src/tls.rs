/// # Summary
/// Installs the `ring` rustls crypto provider as the process default.
///
/// # Invariants
/// - Must run before the first HTTP client or SMTP transport is built; reqwest and
///   lettre are compiled without a bundled provider.
/// - Idempotent: a provider that is already installed is left in place.
pub fn install_crypto_provider() {
    if rustls::crypto::CryptoProvider::get_default().is_some() {
        return;
    }
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider was installed concurrently");
    }
}
