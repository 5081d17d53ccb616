//! Deterministic cache keys, one per logical read.
//!
//! Every key a write could affect must be derivable from the write's inputs
//! alone, so services can invalidate without reading first.

use crate::types::DbId;

/// List of all complaints (joined with their categories).
pub const COMPLAINTS_ALL: &str = "complaints:all";

/// List of all categories.
pub const CATEGORIES_ALL: &str = "categories:all";

/// A single category by id.
pub fn category(id: DbId) -> String {
    format!("categories:{id}")
}

/// Keys affected by creating a complaint or changing/deleting one.
pub fn complaint_write() -> Vec<String> {
    vec![COMPLAINTS_ALL.to_string()]
}

/// Keys affected by creating a category. A new category appears in no
/// complaint and has no per-id entry yet.
pub fn category_create() -> Vec<String> {
    vec![CATEGORIES_ALL.to_string()]
}

/// Keys affected by updating or deleting category `id`.
///
/// Complaint lists embed the category's title and answer, so they go too.
pub fn category_write(id: DbId) -> Vec<String> {
    vec![
        CATEGORIES_ALL.to_string(),
        category(id),
        COMPLAINTS_ALL.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_key_is_stable() {
        let id = uuid::Uuid::nil();
        assert_eq!(category(id), "categories:00000000-0000-0000-0000-000000000000");
        assert_eq!(category(id), category(id));
    }

    #[test]
    fn category_write_covers_list_item_and_complaints() {
        let id = uuid::Uuid::new_v4();
        let keys = category_write(id);
        assert!(keys.contains(&CATEGORIES_ALL.to_string()));
        assert!(keys.contains(&category(id)));
        assert!(keys.contains(&COMPLAINTS_ALL.to_string()));
    }
}
