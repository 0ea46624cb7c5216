pub mod extractors;
pub mod identity;
pub mod jwt;
pub mod magic_link;
pub mod minter;
pub mod social;
pub mod user_type;
