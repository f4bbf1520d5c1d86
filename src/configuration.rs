use crate::error::InvalidConfiguration;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// The network-level failure the mock endpoint should simulate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkFault {
    /// Reply normally, honouring status code and delay.
    #[default]
    None,
    /// Never reply: the connection is kept open until the client gives up.
    Timeout,
    /// Read the request, then drop the connection with a TCP RST.
    Reset,
    /// Drop the connection with a TCP RST before reading the request body.
    Refuse,
}

impl NetworkFault {
    pub const ALL: [NetworkFault; 4] = [
        NetworkFault::None,
        NetworkFault::Timeout,
        NetworkFault::Reset,
        NetworkFault::Refuse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkFault::None => "none",
            NetworkFault::Timeout => "timeout",
            NetworkFault::Reset => "reset",
            NetworkFault::Refuse => "refuse",
        }
    }
}

impl fmt::Display for NetworkFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkFault {
    type Err = InvalidConfiguration;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NetworkFault::ALL
            .into_iter()
            .find(|fault| fault.as_str() == s)
            .ok_or_else(|| {
                InvalidConfiguration::new(
                    NETWORK_ERROR,
                    format!("expected one of none, timeout, reset, refuse, got `{}`", s),
                )
            })
    }
}

/// The behaviour of the mock endpoint.
///
/// Serialized with the field names the control channel speaks:
/// `{"statusCode": 200, "delay": 0, "networkError": "none"}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Status code used on the normal and delayed paths. Any integer is accepted.
    pub status_code: i64,
    /// Artificial latency, in milliseconds, before a normal reply is sent.
    #[serde(rename = "delay")]
    pub delay_millis: u64,
    #[serde(rename = "networkError")]
    pub network_fault: NetworkFault,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            status_code: 200,
            delay_millis: 0,
            network_fault: NetworkFault::None,
        }
    }
}

impl Configuration {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_millis)
    }

    /// `true` if the status code falls in the `2xx` range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Merge `update` on top of `self`, leaving absent fields untouched.
    pub fn merge(mut self, update: &ConfigurationUpdate) -> Self {
        if let Some(status_code) = update.status_code {
            self.status_code = status_code;
        }
        if let Some(delay_millis) = update.delay_millis {
            self.delay_millis = delay_millis;
        }
        if let Some(network_fault) = update.network_fault {
            self.network_fault = network_fault;
        }
        self
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status code {}, delay {}ms, network error {}",
            self.status_code, self.delay_millis, self.network_fault
        )
    }
}

const STATUS_CODE: &str = "statusCode";
const DELAY: &str = "delay";
const NETWORK_ERROR: &str = "networkError";

/// A partial change to a [`Configuration`]: `None` fields are left as they are.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConfigurationUpdate {
    pub status_code: Option<i64>,
    pub delay_millis: Option<u64>,
    pub network_fault: Option<NetworkFault>,
}

impl ConfigurationUpdate {
    pub fn status_code(mut self, status_code: i64) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn delay_millis(mut self, delay_millis: u64) -> Self {
        self.delay_millis = Some(delay_millis);
        self
    }

    pub fn network_fault(mut self, network_fault: NetworkFault) -> Self {
        self.network_fault = Some(network_fault);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Parse the body of a `POST /config` request.
    ///
    /// An empty body is an empty update. Anything else must be a JSON object; unknown keys
    /// are ignored, known keys must hold a valid value or the whole update is rejected.
    pub fn from_json(body: &[u8]) -> Result<Self, InvalidConfiguration> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| InvalidConfiguration::new("body", format!("invalid JSON: {}", e)))?;
        match value {
            Value::Object(fields) => Self::from_fields(&fields),
            other => Err(InvalidConfiguration::new(
                "body",
                format!("expected a JSON object, got {}", json_type(&other)),
            )),
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Result<Self, InvalidConfiguration> {
        let status_code = fields
            .get(STATUS_CODE)
            .map(|v| integer(STATUS_CODE, v))
            .transpose()?;
        let delay_millis = fields
            .get(DELAY)
            .map(|v| {
                let delay = integer(DELAY, v)?;
                u64::try_from(delay).map_err(|_| {
                    InvalidConfiguration::new(DELAY, format!("must not be negative, got {}", delay))
                })
            })
            .transpose()?;
        let network_fault = fields
            .get(NETWORK_ERROR)
            .map(|v| match v {
                Value::String(s) => s.parse::<NetworkFault>(),
                other => Err(InvalidConfiguration::new(
                    NETWORK_ERROR,
                    format!("expected a string, got {}", json_type(other)),
                )),
            })
            .transpose()?;

        Ok(Self {
            status_code,
            delay_millis,
            network_fault,
        })
    }
}

impl From<Configuration> for ConfigurationUpdate {
    fn from(configuration: Configuration) -> Self {
        Self {
            status_code: Some(configuration.status_code),
            delay_millis: Some(configuration.delay_millis),
            network_fault: Some(configuration.network_fault),
        }
    }
}

/// Integers, or strings holding one (HTML number inputs hand back strings).
fn integer(field: &'static str, value: &Value) -> Result<i64, InvalidConfiguration> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        InvalidConfiguration::new(field, format!("expected an integer, got {}", value))
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
