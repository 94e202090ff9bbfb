/// How entity and field names become table and column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingStrategy {
    /// `UserProfile` -> `user_profile`, `createdAt` -> `created_at`
    SnakeCase,
    /// Use identifiers exactly as written.
    Preserve,
}

impl NamingStrategy {
    pub fn table_name(&self, entity_name: &str, explicit: Option<&str>) -> String {
        match explicit {
            Some(name) => name.to_string(),
            None => self.apply(entity_name),
        }
    }

    pub fn column_name(&self, property: &str, explicit: Option<&str>) -> String {
        match explicit {
            Some(name) => name.to_string(),
            None => self.apply(property),
        }
    }

    fn apply(&self, identifier: &str) -> String {
        match self {
            NamingStrategy::SnakeCase => snake_case(identifier),
            NamingStrategy::Preserve => identifier.to_string(),
        }
    }
}

/// Split before an uppercase letter that follows a lowercase letter or a
/// digit (`aB -> a_b`), or that starts a word after an acronym
/// (`ABc -> a_bc`), then lowercase everything.
pub fn snake_case(identifier: &str) -> String {
    let chars: Vec<char> = identifier.chars().collect();
    let mut out = String::with_capacity(identifier.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let previous = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let after_word = previous.is_ascii_lowercase() || previous.is_ascii_digit();
            let after_acronym = previous.is_ascii_uppercase()
                && next.map_or(false, |n| n.is_ascii_lowercase());
            if after_word || after_acronym {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}
