use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ssg_core::services::{AccountService, AuthGate, PostService, SiteGenerator};

use crate::render::HandlebarsRenderer;

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub gate: Arc<AuthGate>,
    pub posts: Arc<PostService>,
    pub generator: Arc<SiteGenerator>,
    pub pages: Arc<HandlebarsRenderer>,
    /// Directory served under `/static`.
    pub site_root: PathBuf,
    pub request_timeout: Duration,
}
