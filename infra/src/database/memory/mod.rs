mod refresh_token_repository_impl;
mod signing_key_repository_impl;

pub use refresh_token_repository_impl::InMemoryRefreshTokenRepository;
pub use signing_key_repository_impl::InMemorySigningKeyRepository;
