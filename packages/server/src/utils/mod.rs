pub mod credentials;
pub mod hash;
pub mod jwt;
