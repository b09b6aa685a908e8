//! Composite authorization tokens.
//!
//! A token is an ordered tuple of provider identifiers joined by a delimiter,
//! e.g. `ch_123|1000|USD`. Empty segments keep their position, so a leading
//! empty field (`|922e-59fc86a36c03`) still decodes to two fields.

use common_utils::{consts, errors::CustomResult};
use domain_types::errors::ConnectorError;
use error_stack::report;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthorizationCodec {
    delimiter: char,
}

impl Default for AuthorizationCodec {
    fn default() -> Self {
        Self::new(consts::AUTHORIZATION_DELIMITER)
    }
}

impl AuthorizationCodec {
    pub const fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Joins `fields`. Fails if a field contains the delimiter, since the
    /// token could not be split back into the same tuple.
    pub fn encode<S: AsRef<str>>(&self, fields: &[S]) -> CustomResult<String, ConnectorError> {
        if let Some(field) = fields
            .iter()
            .map(AsRef::as_ref)
            .find(|field| field.contains(self.delimiter))
        {
            return Err(report!(ConnectorError::ProcessingStepFailed).attach_printable(format!(
                "authorization field of length {} contains the delimiter {:?}",
                field.len(),
                self.delimiter
            )));
        }
        Ok(fields
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(&self.delimiter.to_string()))
    }

    /// Splits a token into every segment, empty ones included.
    pub fn decode(&self, token: &str) -> Vec<String> {
        token.split(self.delimiter).map(str::to_string).collect()
    }

    /// Splits a token that must hold exactly `arity` fields.
    pub fn decode_exact(
        &self,
        token: &str,
        arity: usize,
    ) -> CustomResult<Vec<String>, ConnectorError> {
        let fields = self.decode(token);
        if fields.len() == arity {
            Ok(fields)
        } else {
            Err(ConnectorError::InvalidAuthorization {
                expected: arity,
                found: fields.len(),
            }
            .into())
        }
    }
}

/// [`AuthorizationCodec::encode`] with the default `|` delimiter.
pub fn encode<S: AsRef<str>>(fields: &[S]) -> CustomResult<String, ConnectorError> {
    AuthorizationCodec::default().encode(fields)
}

/// [`AuthorizationCodec::decode_exact`] with the default `|` delimiter.
pub fn decode_exact(token: &str, arity: usize) -> CustomResult<Vec<String>, ConnectorError> {
    AuthorizationCodec::default().decode_exact(token, arity)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use rand::{distributions::Alphanumeric, Rng};

    use super::*;

    fn random_field(rng: &mut impl Rng) -> String {
        // roughly one field in four is empty
        let len = if rng.gen_bool(0.25) { 0 } else { rng.gen_range(1..24) };
        (0..len)
            .map(|_| match rng.gen_range(0..8) {
                0 => '-',
                1 => ' ',
                _ => char::from(rng.sample(Alphanumeric)),
            })
            .collect()
    }

    #[test]
    fn test_round_trip_generated_tuples() {
        let codec = AuthorizationCodec::default();
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let arity = rng.gen_range(1..=6);
            let tuple = (0..arity)
                .map(|_| random_field(&mut rng))
                .collect::<Vec<_>>();
            let token = codec.encode(&tuple).unwrap();
            assert_eq!(codec.decode(&token), tuple, "token {token:?}");
            assert_eq!(codec.decode_exact(&token, arity).unwrap(), tuple);
        }
    }

    #[test]
    fn test_leading_empty_field_is_preserved() {
        let fields = decode_exact("|922e-59fc86a36c03", 2).unwrap();
        assert_eq!(fields, vec!["".to_string(), "922e-59fc86a36c03".to_string()]);
    }

    #[test]
    fn test_trailing_empty_fields_are_preserved() {
        let token = encode(&["ch_1", "", ""]).unwrap();
        assert_eq!(token, "ch_1||");
        assert_eq!(decode_exact(&token, 3).unwrap(), vec!["ch_1", "", ""]);
    }

    #[test]
    fn test_wrong_arity_is_a_configuration_error() {
        let error = decode_exact("ch_1|1000", 3).unwrap_err();
        assert_eq!(
            error.current_context(),
            &ConnectorError::InvalidAuthorization {
                expected: 3,
                found: 2
            }
        );
        assert!(error.current_context().is_configuration_error());
    }

    #[test]
    fn test_field_with_delimiter_is_rejected() {
        assert!(encode(&["a|b", "c"]).is_err());
    }

    #[test]
    fn test_custom_delimiter() {
        let codec = AuthorizationCodec::new(';');
        let token = codec.encode(&["id", "token|with|pipes"]).unwrap();
        assert_eq!(codec.decode(&token), vec!["id", "token|with|pipes"]);
    }
}
