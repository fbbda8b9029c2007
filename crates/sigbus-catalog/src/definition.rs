use serde::Deserialize;
use sigbus_signal::{PayloadKind, SignalDescriptor, SignalIdentity, MAX_BUFFER_LENGTH};
use sigbus_wire::SEMI_TO_DEGREES;

use crate::error::{CatalogError, Result};

/// Name accepted in place of a numeric resolution for semicircle-encoded angles.
pub const SEMICIRCLE_RESOLUTION_NAME: &str = "semi2deg";

/// One named entry of a signal catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalDefinition {
    pub name: String,
    pub description: String,
    pub identity: SignalIdentity,
    pub timeout_ms: u32,
    pub kind: PayloadKind,
    pub units: Option<String>,
}

impl SignalDefinition {
    /// Build a scaled-value definition.
    pub fn scaled(
        name: impl Into<String>,
        identity: SignalIdentity,
        timeout_ms: u32,
        resolution: f64,
        units: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            identity,
            timeout_ms,
            kind: PayloadKind::Scaled { resolution },
            units: Some(units.into()),
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The arbitration-relevant part of the definition.
    pub fn descriptor(&self) -> SignalDescriptor {
        SignalDescriptor::new(self.identity, self.timeout_ms)
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("name must not be empty"));
        }
        if let PayloadKind::Scaled { resolution } = self.kind {
            if !resolution.is_finite() || resolution <= 0.0 {
                return Err(self.invalid(format!("resolution must be > 0 (got {resolution})")));
            }
        }
        if let PayloadKind::Buffer { length } = self.kind {
            if length > MAX_BUFFER_LENGTH {
                return Err(self.invalid(format!(
                    "buffer length must be <= {MAX_BUFFER_LENGTH} (got {length})"
                )));
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> CatalogError {
        CatalogError::InvalidDefinition {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSignalList {
    pub version: i64,
    #[serde(default)]
    pub signals: Vec<RawSignal>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSignal {
    cat_id: u8,
    sub_id: u8,
    name: String,
    #[serde(default)]
    description: String,
    timeout: u32,
    #[serde(rename = "type", default)]
    kind: RawKind,
    units: Option<String>,
    resolution: Option<RawResolution>,
    length: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawKind {
    #[default]
    Fixed,
    Integer,
    Buffer,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawResolution {
    Value(f64),
    Named(String),
}

impl TryFrom<RawSignal> for SignalDefinition {
    type Error = CatalogError;

    fn try_from(raw: RawSignal) -> Result<Self> {
        let invalid = |reason: String| CatalogError::InvalidDefinition {
            name: raw.name.clone(),
            reason,
        };

        let kind = match raw.kind {
            RawKind::Fixed => {
                let resolution = match &raw.resolution {
                    Some(RawResolution::Value(value)) => *value,
                    Some(RawResolution::Named(name)) if name == SEMICIRCLE_RESOLUTION_NAME => {
                        SEMI_TO_DEGREES
                    }
                    Some(RawResolution::Named(name)) => {
                        return Err(invalid(format!("unknown resolution name: {name}")));
                    }
                    None => return Err(invalid("fixed signals require a resolution".into())),
                };
                PayloadKind::Scaled { resolution }
            }
            RawKind::Integer => PayloadKind::Integer,
            RawKind::Buffer => match raw.length {
                Some(length) => PayloadKind::Buffer { length },
                None => return Err(invalid("buffer signals require a length".into())),
            },
        };

        if raw.resolution.is_some() && !matches!(kind, PayloadKind::Scaled { .. }) {
            return Err(invalid(format!("resolution is not allowed on {} signals", kind.name())));
        }
        if raw.length.is_some() && !matches!(kind, PayloadKind::Buffer { .. }) {
            return Err(invalid(format!("length is not allowed on {} signals", kind.name())));
        }

        let definition = SignalDefinition {
            identity: SignalIdentity::new(raw.cat_id, raw.sub_id),
            timeout_ms: raw.timeout,
            kind,
            units: raw.units,
            description: raw.description,
            name: raw.name,
        };
        definition.check()?;
        Ok(definition)
    }
}
