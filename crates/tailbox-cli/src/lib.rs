//! tailbox-cli: the `tailbox` command.

pub mod cli;
pub mod config;
pub mod logging;
pub mod logs;

/// Stable crate label used for bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "tailbox-cli"
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn crate_label_is_stable() {
        assert_eq!(crate_label(), "tailbox-cli");
    }
}
