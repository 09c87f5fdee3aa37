use crate::types::notice::Notice;
use crate::types::push::{NotificationData, NotificationPayload};

const ICON: &str = "/icon-192x192.png";
const BADGE: &str = "/badge-96x96.png";
const TAG_PREFIX: &str = "cdc-notice";
const TARGET_URL: &str = "/placement";
const BODY_PREVIEW_LIMIT: usize = 3;

/// One payload shared by every subscription in a dispatch.
///
/// The tag carries the timestamp so the browser shows each batch instead of
/// collapsing it into the previous notification.
pub(crate) fn build_notification(notices: &[Notice], now_millis: i64) -> NotificationPayload {
    let count = notices.len();
    let noun = if count == 1 { "Notice" } else { "Notices" };
    let body = notices
        .iter()
        .take(BODY_PREVIEW_LIMIT)
        .map(|notice| format!("{} - {}", notice.company, notice.category))
        .collect::<Vec<_>>()
        .join("\n");

    NotificationPayload {
        title: format!("🎓 {count} New CDC {noun}!"),
        body,
        icon: ICON.to_string(),
        badge: BADGE.to_string(),
        tag: format!("{TAG_PREFIX}-{now_millis}"),
        require_interaction: true,
        data: NotificationData {
            url: TARGET_URL.to_string(),
            notices: notices.to_vec(),
            timestamp: now_millis,
        },
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::changes::tests::notice;

    #[test]
    fn build_notification__should_preview_first_three_notices() {
        // Given
        let notices = vec![
            notice("1", "Acme", "Urgent"),
            notice("2", "Globex", "Normal"),
            notice("3", "Initech", "Urgent"),
            notice("4", "Umbrella", "Normal"),
        ];

        // When
        let payload = build_notification(&notices, 1_760_188_020_000);

        // Then
        assert_eq!(payload.title, "🎓 4 New CDC Notices!");
        assert_eq!(
            payload.body,
            "Acme - Urgent\nGlobex - Normal\nInitech - Urgent"
        );
        assert_eq!(payload.data.notices.len(), 4);
        assert_eq!(payload.data.url, "/placement");
    }

    #[test]
    fn build_notification__should_serialize_service_worker_contract() {
        // Given
        let notices = vec![notice("1", "Acme", "Urgent")];

        // When
        let payload = build_notification(&notices, 42);
        let json = serde_json::to_value(&payload).expect("encode payload");

        // Then
        assert_eq!(json["title"], "🎓 1 New CDC Notice!");
        assert_eq!(json["tag"], "cdc-notice-42");
        assert_eq!(json["requireInteraction"], true);
        assert_eq!(json["icon"], "/icon-192x192.png");
        assert_eq!(json["badge"], "/badge-96x96.png");
        assert_eq!(json["data"]["timestamp"], 42);
        assert_eq!(json["data"]["notices"][0]["id"], "1");
    }

    #[test]
    fn build_notification__should_vary_tag_between_batches() {
        // Given
        let notices = vec![notice("1", "Acme", "Urgent")];

        // Then
        assert_ne!(
            build_notification(&notices, 1000).tag,
            build_notification(&notices, 1001).tag
        );
    }
}
