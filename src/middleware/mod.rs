pub mod security;

pub use security::SecurityHeaders;
