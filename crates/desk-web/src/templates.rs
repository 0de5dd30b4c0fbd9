//! Dashboard page rendering with MiniJinja

use desk_core::AnalystKind;
use desk_core::config::{ROUNDS_RANGE, options};
use desk_core::{AnalysisConfig, Availability};
use desk_utils::CredentialStatus;
use minijinja::{Environment, context};

const DASHBOARD_TEMPLATE: &str = "dashboard.html";

/// Compiled page templates
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(DASHBOARD_TEMPLATE, include_str!("../templates/dashboard.html"))?;
        Ok(Self { env })
    }

    /// The dashboard for one session
    pub fn dashboard(&self, page: &DashboardPage<'_>) -> Result<String, minijinja::Error> {
        let analysts: Vec<_> = AnalystKind::ALL
            .iter()
            .map(|kind| context! { value => kind.as_str(), label => kind.agent_name() })
            .collect();

        let template = self.env.get_template(DASHBOARD_TEMPLATE)?;
        template.render(context! {
            session_id => page.session_id,
            framework_available => page.availability.is_available(),
            framework_reason => page.availability.reason(),
            credentials => page.credentials,
            config => page.config,
            analysts => analysts,
            default_trade_date => page.default_trade_date,
            rounds => ROUNDS_RANGE.collect::<Vec<_>>(),
            llm_providers => options::LLM_PROVIDERS,
            deep_think_models => options::DEEP_THINK_MODELS,
            quick_think_models => options::QUICK_THINK_MODELS,
            stock_vendors => options::STOCK_DATA_VENDORS,
            technical_vendors => options::TECHNICAL_VENDORS,
            fundamental_vendors => options::FUNDAMENTAL_VENDORS,
            news_vendors => options::NEWS_VENDORS,
        })
    }
}

/// Values the dashboard page is rendered from
pub struct DashboardPage<'a> {
    pub session_id: &'a str,
    pub availability: &'a Availability,
    pub credentials: &'a CredentialStatus,
    pub config: &'a AnalysisConfig,
    pub default_trade_date: &'a str,
}
