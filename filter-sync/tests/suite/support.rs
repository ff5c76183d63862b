use std::sync::Arc;

use async_trait::async_trait;
use crmdesk_filter_model::fields::OptionProvider;
use crmdesk_filter_model::fields::SelectOption;
use crmdesk_filter_sync::BuiltinProviders;
use crmdesk_filter_sync::FilterRegistry;
use crmdesk_filter_sync::builtin_registry;

pub struct StaticProvider {
    options: Vec<SelectOption>,
}

impl StaticProvider {
    pub fn new(options: Vec<SelectOption>) -> Self {
        Self { options }
    }
}

#[async_trait]
impl OptionProvider for StaticProvider {
    async fn options(&self) -> anyhow::Result<Vec<SelectOption>> {
        Ok(self.options.clone())
    }
}

pub struct FailingProvider;

#[async_trait]
impl OptionProvider for FailingProvider {
    async fn options(&self) -> anyhow::Result<Vec<SelectOption>> {
        anyhow::bail!("listing service unavailable")
    }
}

pub fn course_options() -> Vec<SelectOption> {
    vec![
        SelectOption::new("c-1", "Rust for Beginners"),
        SelectOption::new("c-2", "Advanced Rust"),
    ]
}

pub fn console_registry() -> FilterRegistry {
    let courses: Arc<dyn OptionProvider> = Arc::new(StaticProvider::new(course_options()));
    let others: Arc<dyn OptionProvider> = Arc::new(StaticProvider::new(Vec::new()));
    builtin_registry(&BuiltinProviders {
        courses,
        instructors: others.clone(),
        students: others.clone(),
        classes: others,
    })
    .expect("builtin registry builds")
}
