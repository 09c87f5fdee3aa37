use crate::types::notice::NoticeExposure;

use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone)]
pub struct AppConfig {
    pub data_dir: Option<PathBuf>,
    pub api_key: Option<String>,
    pub vapid_private_key: Option<String>,
    pub vapid_public_key: Option<String>,
    pub vapid_subject: Option<String>,
    pub push_timeout: Duration,
    pub notice_exposure: NoticeExposure,
}

pub const DEFAULT_PUSH_TIMEOUT: Duration = Duration::from_secs(10);

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            api_key: None,
            vapid_private_key: None,
            vapid_public_key: None,
            vapid_subject: None,
            push_timeout: DEFAULT_PUSH_TIMEOUT,
            notice_exposure: NoticeExposure::Full,
        }
    }
}
