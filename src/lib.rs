//! safari - photo frames, gallery and RSVPs for a party invitation
//!
//! The core is the [`compose`] pipeline, which crops a guest's photo to a
//! square and draws the frame overlay on top. Around it sit the capture
//! session guard, persisted feature toggles and gallery, the hidden admin
//! gesture and the RSVP form client.

pub mod admin;
pub mod capture;
pub mod cli;
pub mod compose;
pub mod config;
pub mod data_url;
pub mod error;
pub mod event;
pub mod output;
pub mod rsvp;
pub mod state;

pub use admin::{AdminTrigger, AdminTriggerConfig, Gesture};
pub use capture::{CaptureOutcome, CaptureSession, CaptureTicket, HandleTable, SourceHandle};
pub use compose::{
    CompositeResult, Compositor, CompositorConfig, CoverPlacement, ImageLoader, ImageSource,
    MaskSpec, OverlayMask, OverlayStore,
};
pub use config::{Config, CONFIG_FILENAME};
pub use error::{Result, SafariError};
pub use event::EventDetails;
pub use rsvp::{Attendance, FormTransport, HttpTransport, RsvpClient, RsvpConfig, RsvpForm};
pub use state::{FileStore, Flag, Gallery, MemoryStore, Settings, Storage};
