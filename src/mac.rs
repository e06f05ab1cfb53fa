pub mod hmac;

pub use hmac::HmacSha512;
