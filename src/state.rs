use std::sync::Arc;

use anyhow::Result;

use crate::{
    config::Config,
    dispatch::Dispatcher,
    payment::PaymentProcessor,
    signer::ServiceNodeKey,
    transport::{HttpTransport, Transport},
};

pub struct AppState {
    pub dispatcher: Dispatcher,
    pub payments: PaymentProcessor,
    pub snode_key: Option<ServiceNodeKey>,
}

impl AppState {
    pub fn init(config: Config) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new()?);
        Ok(Self::with_transport(config, transport))
    }

    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        let config = Arc::new(config);
        let payments = PaymentProcessor::new(
            config.payments.clone(),
            transport.clone(),
            config.payment_timeout,
        );

        Self {
            snode_key: config.snode_key.clone(),
            dispatcher: Dispatcher::new(config, transport),
            payments,
        }
    }
}
