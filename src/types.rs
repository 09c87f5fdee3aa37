pub mod notice;
pub mod push;
