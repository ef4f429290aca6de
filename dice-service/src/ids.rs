use uuid::Uuid;

/// `<first>-<last>-<random>`; registering the same name twice yields two users.
pub fn user_id(first_name: &str, last_name: &str) -> String {
    format!(
        "{}-{}-{}",
        first_name.to_lowercase(),
        last_name.to_lowercase(),
        Uuid::new_v4().simple()
    )
}

pub fn session_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn roll_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_starts_with_lowercased_names() {
        let id = user_id("Ada", "Lovelace");
        assert!(id.starts_with("ada-lovelace-"));
    }

    #[test]
    fn repeated_names_get_distinct_ids() {
        assert_ne!(user_id("Ada", "Lovelace"), user_id("Ada", "Lovelace"));
        assert_ne!(session_id(), session_id());
    }
}
