use domain_types::connector_types::ConnectorEnum;
use interfaces::connector_integration::BoxedConnector;

use crate::connectors;

#[derive(Clone)]
pub struct ConnectorData {
    pub connector: BoxedConnector,
    pub connector_name: ConnectorEnum,
}

impl ConnectorData {
    pub fn get_connector_by_name(connector_name: &ConnectorEnum) -> Self {
        let connector = Self::convert_connector(*connector_name);
        Self {
            connector,
            connector_name: *connector_name,
        }
    }

    fn convert_connector(connector_name: ConnectorEnum) -> BoxedConnector {
        match connector_name {
            ConnectorEnum::Braspag => Box::new(connectors::Braspag::new()),
            ConnectorEnum::Cybersource => Box::new(connectors::Cybersource::new()),
            ConnectorEnum::Fusebox => Box::new(connectors::Fusebox::new()),
            ConnectorEnum::Quickbooks => Box::new(connectors::Quickbooks::new()),
            ConnectorEnum::Versapay => Box::new(connectors::Versapay::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::str::FromStr;

    use domain_types::connector_types::Flow;
    use interfaces::{api::ConnectorCommon, connector_integration::ConnectorIntegration};

    use super::*;

    #[test]
    fn test_connector_lookup_by_name() {
        let data = ConnectorData::get_connector_by_name(&ConnectorEnum::from_str("versapay").unwrap());
        assert_eq!(data.connector.id(), "versapay");
        assert!(data.connector.supported_flows().contains(&Flow::Store));

        let data = ConnectorData::get_connector_by_name(&ConnectorEnum::Quickbooks);
        assert!(!data.connector.supported_flows().contains(&Flow::Store));
    }

    #[test]
    fn test_every_connector_resolves_to_its_own_id() {
        for name in [
            ConnectorEnum::Braspag,
            ConnectorEnum::Cybersource,
            ConnectorEnum::Fusebox,
            ConnectorEnum::Quickbooks,
            ConnectorEnum::Versapay,
        ] {
            let data = ConnectorData::get_connector_by_name(&name);
            assert_eq!(data.connector.id(), name.to_string());
        }
    }
}
