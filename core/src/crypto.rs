use std::sync::Once;

static INIT: Once = Once::new();

/// Installs the ring provider as the process-wide rustls default.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_crypto() {
    INIT.call_once(|| {
        // Another component may already have installed a provider, which is fine.
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_crypto_is_idempotent() {
        init_crypto();
        init_crypto();
        assert!(rustls::crypto::CryptoProvider::get_default().is_some());
    }
}
