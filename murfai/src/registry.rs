use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::MurfSettings;
use crate::flow::{ProvisioningFlow, ProvisioningState, StepResult};
use crate::form::UserInput;
use crate::store::ConfigurationStore;
use crate::Result;

/// Domain string the Murf setup flow is registered under.
pub const DOMAIN: &str = "murfai_tts";

/// What the host calls to drive a setup wizard: "run one step".
#[async_trait]
pub trait ConfigFlowHandler: Send + Sync {
    fn domain(&self) -> &str;

    fn start(&self) -> StepResult;

    async fn step(&self, state: ProvisioningState, input: Option<UserInput>) -> StepResult;
}

#[async_trait]
impl ConfigFlowHandler for ProvisioningFlow {
    fn domain(&self) -> &str {
        DOMAIN
    }

    fn start(&self) -> StepResult {
        ProvisioningFlow::start(self)
    }

    async fn step(&self, state: ProvisioningState, input: Option<UserInput>) -> StepResult {
        ProvisioningFlow::step(self, state, input).await
    }
}

pub type FlowFactory = Arc<dyn Fn() -> Arc<dyn ConfigFlowHandler> + Send + Sync>;

/// Domain → flow constructor table, owned by whoever talks to the host.
#[derive(Clone, Default)]
pub struct FlowRegistry {
    flows: Vec<(String, FlowFactory)>,
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `domain`, replacing an earlier registration.
    pub fn register(&mut self, domain: impl Into<String>, factory: FlowFactory) {
        let domain = domain.into();
        self.flows.retain(|(name, _)| *name != domain);
        self.flows.push((domain, factory));
    }

    pub fn create(&self, domain: &str) -> Option<Arc<dyn ConfigFlowHandler>> {
        self.flows
            .iter()
            .find(|(name, _)| name == domain)
            .map(|(_, factory)| factory())
    }

    pub fn list_domains(&self) -> Vec<String> {
        self.flows.iter().map(|(name, _)| name.clone()).collect()
    }
}

/// Registers the Murf setup flow, backed by the HTTP catalog and `store`.
pub fn initialize_flows(settings: &MurfSettings, store: Arc<dyn ConfigurationStore>) -> Result<FlowRegistry> {
    let catalog = Arc::new(settings.catalog_client()?);
    let default_url = settings.synthesis_url.clone();
    let default_api_key = settings.api_key.clone();

    let mut registry = FlowRegistry::new();
    registry.register(
        DOMAIN,
        Arc::new(move || {
            let flow = ProvisioningFlow::new(catalog.clone(), store.clone())
                .with_default_endpoint_url(default_url.clone())
                .with_default_api_key(default_api_key.clone());
            Arc::new(flow) as Arc<dyn ConfigFlowHandler>
        }),
    );

    info!("Registered setup flows: {:?}", registry.list_domains());
    Ok(registry)
}
