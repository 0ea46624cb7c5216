pub mod linked_account;
pub mod magic_link;
pub mod user;
