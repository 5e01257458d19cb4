use std::collections::HashSet;

use crate::models::Lead;

/// Identity keys emitted so far in one run. Only grows.
#[derive(Debug, Default)]
pub struct SeenSet {
    keys: HashSet<String>,
}

impl SeenSet {
    /// Check-and-insert. Rejects unleadable leads and identities already seen.
    pub fn accept(&mut self, lead: &Lead) -> bool {
        match lead.identity_key() {
            Some(key) => self.keys.insert(key.to_string()),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}
