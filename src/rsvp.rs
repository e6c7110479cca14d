//! RSVP submission to a third-party form endpoint.
//!
//! The endpoint is a hosted form that accepts a URL-encoded POST and
//! answers with nothing worth reading, so submission is fire-and-forget:
//! only a transport failure counts as an error.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, SafariError};
use crate::state::Settings;

/// Literal sent when the guest will attend.
pub const ATTENDING_LITERAL: &str = "!AHÍ ESTARÉ¡";
/// Literal sent when the guest cannot attend.
pub const NOT_ATTENDING_LITERAL: &str = "NO PUEDO IR";

pub const MAX_ADULTS: u32 = 10;
pub const MAX_CHILDREN: u32 = 10;

/// Form field identifiers on the remote form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldIds {
    pub name: String,
    pub attending: String,
    pub adults: String,
    pub children: String,
}

impl Default for FieldIds {
    fn default() -> Self {
        Self {
            name: "entry.77532317".to_string(),
            attending: "entry.1132604293".to_string(),
            adults: "entry.1923197611".to_string(),
            children: "entry.1510105619".to_string(),
        }
    }
}

/// RSVP settings as written in `safari.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsvpConfig {
    pub endpoint: String,
    pub fields: FieldIds,
    pub timeout_ms: u64,
}

impl Default for RsvpConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://docs.google.com/forms/d/e/1FAIpQLSdRUhrE98F9fUxuRfC6nbegB2COdsQBCNFu1VGuTPMWRAkedg/formResponse".to_string(),
            fields: FieldIds::default(),
            timeout_ms: 10_000,
        }
    }
}

impl RsvpConfig {
    pub fn validate(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint).map_err(|e| SafariError::Validation {
            message: format!("rsvp.endpoint is not a valid URL: {}", e),
            help: None,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SafariError::Validation {
                message: format!("rsvp.endpoint must be http(s), found {}", url.scheme()),
                help: None,
            });
        }
        Ok(url)
    }
}

/// Whether the guest is coming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Attendance {
    #[default]
    Attending,
    NotAttending,
}

impl Attendance {
    pub fn from_attending(attending: bool) -> Self {
        if attending {
            Attendance::Attending
        } else {
            Attendance::NotAttending
        }
    }

    /// The literal the remote form expects.
    pub fn as_literal(self) -> &'static str {
        match self {
            Attendance::Attending => ATTENDING_LITERAL,
            Attendance::NotAttending => NOT_ATTENDING_LITERAL,
        }
    }
}

impl fmt::Display for Attendance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_literal())
    }
}

/// One guest's RSVP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpForm {
    pub guest_name: String,
    pub attendance: Attendance,
    pub adults: u32,
    pub children: u32,
}

impl Default for RsvpForm {
    fn default() -> Self {
        Self {
            guest_name: String::new(),
            attendance: Attendance::Attending,
            adults: 1,
            children: 0,
        }
    }
}

impl RsvpForm {
    pub fn validate(&self) -> Result<()> {
        if self.guest_name.trim().is_empty() {
            return Err(SafariError::Validation {
                message: "Guest name is required".to_string(),
                help: None,
            });
        }
        if !(1..=MAX_ADULTS).contains(&self.adults) {
            return Err(SafariError::Validation {
                message: format!("Adults must be between 1 and {} (got {})", MAX_ADULTS, self.adults),
                help: None,
            });
        }
        if self.children > MAX_CHILDREN {
            return Err(SafariError::Validation {
                message: format!(
                    "Children must be between 0 and {} (got {})",
                    MAX_CHILDREN, self.children
                ),
                help: None,
            });
        }
        Ok(())
    }

    /// URL-encoded body: name, attendance, adults, children.
    ///
    /// The name is sent as typed; trimming only applies to validation.
    pub fn encode(&self, fields: &FieldIds) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair(&fields.name, &self.guest_name)
            .append_pair(&fields.attending, self.attendance.as_literal())
            .append_pair(&fields.adults, &self.adults.to_string())
            .append_pair(&fields.children, &self.children.to_string())
            .finish()
    }
}

/// Delivers an encoded form body.
pub trait FormTransport {
    fn post_form(&self, url: &Url, body: &str) -> Result<()>;
}

/// Blocking HTTP transport.
///
/// The response status and body are ignored.
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl FormTransport for HttpTransport {
    fn post_form(&self, url: &Url, body: &str) -> Result<()> {
        let response = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .send(body.as_bytes())
            .map_err(|e| SafariError::Network {
                message: e.to_string(),
            })?;

        tracing::debug!(status = response.status().as_u16(), "form endpoint responded");
        Ok(())
    }
}

/// Submits RSVPs through a [`FormTransport`].
pub struct RsvpClient<T> {
    endpoint: Url,
    fields: FieldIds,
    transport: T,
}

impl RsvpClient<HttpTransport> {
    /// Client posting over HTTP to the configured endpoint.
    pub fn from_config(config: &RsvpConfig) -> Result<Self> {
        let transport = HttpTransport::new(Duration::from_millis(config.timeout_ms));
        Self::with_transport(config, transport)
    }
}

impl<T: FormTransport> RsvpClient<T> {
    pub fn with_transport(config: &RsvpConfig, transport: T) -> Result<Self> {
        Ok(Self {
            endpoint: config.validate()?,
            fields: config.fields.clone(),
            transport,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit `form` if RSVPs are open.
    #[tracing::instrument(skip_all, fields(attendance = %form.attendance))]
    pub fn submit(&self, form: &RsvpForm, settings: &Settings) -> Result<()> {
        if !settings.rsvp_enabled {
            return Err(SafariError::Disabled {
                feature: "RSVP".to_string(),
                help: Some("RSVPs are closed for this event".to_string()),
            });
        }
        form.validate()?;

        let body = form.encode(&self.fields);
        self.transport.post_form(&self.endpoint, &body)?;
        tracing::info!(adults = form.adults, children = form.children, "rsvp submitted");
        Ok(())
    }
}
