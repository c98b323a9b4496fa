pub mod claims;
pub mod codec;
pub mod errors;
pub mod handler;

pub use claims::StampedClaims;
pub use claims::Verified;
pub use codec::TokenCodec;
pub use codec::TokenKind;
pub use codec::TokenSettings;
pub use errors::JwtError;
pub use handler::JwtHandler;
