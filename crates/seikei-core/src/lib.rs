pub mod compare;
pub mod complete;
pub mod corrections;
pub mod diff;
pub mod error;
mod http;
pub mod prompts;
pub mod replace;
pub mod types;

pub use corrections::extract_corrections;
pub use error::*;
pub use replace::apply_replacements;
pub use types::*;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!version().is_empty());
    }
}
