use crate::errors;

pub type Error = error_stack::Report<errors::ConnectorError>;

pub fn missing_field_err(
    message: &'static str,
) -> Box<dyn Fn() -> error_stack::Report<errors::ConnectorError> + 'static> {
    Box::new(move || {
        errors::ConnectorError::MissingRequiredField {
            field_name: message,
        }
        .into()
    })
}

pub fn flow_not_supported_err(
    flow: crate::connector_types::Flow,
    connector: &str,
) -> error_stack::Report<errors::ConnectorError> {
    errors::ConnectorError::FlowNotSupported {
        flow: flow.to_string(),
        connector: connector.to_string(),
    }
    .into()
}
