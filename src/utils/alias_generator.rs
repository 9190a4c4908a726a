//! Table alias generator for SQL rendering.

/// Produces unique table aliases for one translation. Aliases are derived
/// from the first letter of the source name plus a running counter, so a
/// `Customer` root becomes `c0_` and a joined `Department` becomes `d1_`.
#[derive(Debug, Default)]
pub struct AliasGenerator {
    next: u32,
}

impl AliasGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_alias(&mut self, name: &str) -> String {
        let prefix = name
            .chars()
            .find(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase())
            .unwrap_or('x');
        let alias = format!("{}{}_", prefix, self.next);
        self.next += 1;
        log::trace!("generated table alias: {} for {}", alias, name);
        alias
    }
}
