//! Shared application state (grounded in `zvault_server::state::AppState` /
//! `acteon_server::api::AppState`: one `Clone`-able struct of `Arc`-wrapped
//! subsystems, built once at startup and handed to every axum handler via
//! `State<AppState>`).

use crate::config::AppConfig;
use crate::identity::HttpIdentityProvider;
use kanban_audit::AuditLogger;
use kanban_db::{KanbanRepo, StaticPlanLimiter};
use kanban_domain::config::AppLimits;
use kanban_events::{AutomationEngine, EventSubscriber, InProcessEventBus, LoggingNotificationSink};
use kanban_ratelimit::RateLimiter;
use kanban_tenant::TenantContextResolver;
use kanban_webhooks::WebhookDispatcher;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub repo: KanbanRepo,
    pub resolver: Arc<TenantContextResolver<HttpIdentityProvider>>,
    pub rate_limiter: Arc<RateLimiter>,
    pub limits: AppLimits,
    pub plan_limiter: Arc<StaticPlanLimiter>,
    pub events: Arc<InProcessEventBus>,
    pub audit: Arc<AuditLogger>,
}

impl AppState {
    #[must_use]
    pub fn build(config: &AppConfig, repo: KanbanRepo) -> Self {
        let limits = config.app_limits();
        let identity = HttpIdentityProvider::new(config.identity_provider_url.clone());
        let resolver = Arc::new(TenantContextResolver::new(repo.clone(), identity));
        let rate_limiter = Arc::new(RateLimiter::new(limits.rate_limits.clone()));
        let plan_limiter = Arc::new(StaticPlanLimiter::new(limits.plan_limits.clone()));
        let audit = Arc::new(AuditLogger::new(Arc::new(repo.clone())));

        let automations: Arc<dyn EventSubscriber> = Arc::new(AutomationEngine::new(
            Arc::new(repo.clone()),
            Arc::new(LoggingNotificationSink),
            limits.system_user_id,
            limits.max_automation_depth,
        ));
        let webhooks: Arc<dyn EventSubscriber> = Arc::new(WebhookDispatcher::new(
            Arc::new(repo.clone()),
            config.webhook_user_agent.clone(),
            config.webhook_allow_http,
        ));
        let events = Arc::new(InProcessEventBus::new(vec![automations, webhooks]));

        Self {
            repo,
            resolver,
            rate_limiter,
            limits,
            plan_limiter,
            events,
            audit,
        }
    }
}
