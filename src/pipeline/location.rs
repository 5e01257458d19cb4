use crate::models::Lead;

/// Case-insensitive substring filter on a lead's location.
#[derive(Debug, Clone, Default)]
pub struct LocationFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

fn patterns(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

impl LocationFilter {
    /// Blank patterns are dropped.
    pub fn new(include: &[String], exclude: &[String]) -> Self {
        Self {
            include: patterns(include),
            exclude: patterns(exclude),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.include.is_empty() || !self.exclude.is_empty()
    }

    pub fn passes(&self, lead: &Lead) -> bool {
        if !self.is_active() {
            return true;
        }

        let location = lead.location.to_lowercase();

        if !self.include.is_empty() && !self.include.iter().any(|loc| location.contains(loc)) {
            return false;
        }

        !self.exclude.iter().any(|loc| location.contains(loc))
    }
}
