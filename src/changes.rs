use crate::types::notice::Notice;

use std::collections::HashSet;

/// Notices in `current` whose id is absent from `previous`, in `current` order.
///
/// An empty `previous` makes every current notice new, so the first ingestion
/// after a fresh start notifies about the whole batch. Duplicate ids inside
/// `current` pass through untouched.
pub fn new_notices(current: &[Notice], previous: &[Notice]) -> Vec<Notice> {
    let seen: HashSet<&str> = previous.iter().map(|notice| notice.id.as_str()).collect();
    current
        .iter()
        .filter(|notice| !seen.contains(notice.id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(non_snake_case)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn notice(id: &str, company: &str, category: &str) -> Notice {
        Notice {
            id: id.to_string(),
            kind: "Job".to_string(),
            category: category.to_string(),
            company: company.to_string(),
            notice_text: None,
            notice_by: None,
            notice_time: "11-10-2025 13:07".to_string(),
        }
    }

    fn ids(notices: &[Notice]) -> Vec<&str> {
        notices.iter().map(|notice| notice.id.as_str()).collect()
    }

    #[test]
    fn new_notices__should_return_everything_when_previous_is_empty() {
        // Given
        let current = vec![notice("1", "Acme", "Urgent"), notice("2", "Globex", "Normal")];

        // When
        let fresh = new_notices(&current, &[]);

        // Then
        assert_eq!(fresh, current);
    }

    #[test]
    fn new_notices__should_keep_only_unseen_ids_in_current_order() {
        // Given
        let previous = vec![notice("2", "Globex", "Normal")];
        let current = vec![
            notice("3", "Initech", "Normal"),
            notice("2", "Globex", "Urgent"),
            notice("1", "Acme", "Urgent"),
        ];

        // When
        let fresh = new_notices(&current, &previous);

        // Then
        assert_eq!(ids(&fresh), vec!["3", "1"]);
    }

    #[test]
    fn new_notices__should_ignore_field_changes_on_known_ids() {
        // Given
        let previous = vec![notice("1", "Acme", "Normal")];
        let current = vec![notice("1", "Acme Corp", "Urgent")];

        // Then
        assert!(new_notices(&current, &previous).is_empty());
    }

    #[test]
    fn new_notices__should_pass_duplicate_ids_through() {
        // Given
        let current = vec![notice("9", "Acme", "Urgent"), notice("9", "Acme", "Urgent")];

        // When
        let fresh = new_notices(&current, &[notice("1", "Globex", "Normal")]);

        // Then
        assert_eq!(ids(&fresh), vec!["9", "9"]);
    }

    #[test]
    fn new_notices__should_return_empty_when_everything_was_seen() {
        // Given
        let batch = vec![notice("1", "Acme", "Urgent"), notice("2", "Globex", "Normal")];

        // Then
        assert!(new_notices(&batch, &batch).is_empty());
    }
}
