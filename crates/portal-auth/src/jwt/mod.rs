//! Token encoding, decoding, and claims.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::{Claims, ResetClaims, SessionClaims, TokenPurpose};
pub use decoder::JwtDecoder;
pub use encoder::{IssuedToken, JwtEncoder};
