//! Registration of 2D sections into a 3D atlas.
//!
//! [`Registration`] composes the section-to-atlas transform and slices the
//! atlas along a section's plane. The [`commands`] layer runs those
//! operations against the current atlas and section held in a [`repo`].

pub mod commands;
pub mod config;
pub mod error;
pub mod registration;
pub mod repo;

pub use commands::{
    AtlasImageCoords, AtlasSectionsAtSection, LoadAtlas, LoadSection, OrientSection, RegisterSection,
    RegisterSectionData, ResampleSection, UpdateSection,
};
pub use config::{AtlasLayer, Interpolation, SliceConfig};
pub use error::{RegistrationError, Result};
pub use registration::Registration;
pub use repo::{AtlasRepo, InMemoryRepo, SectionRepo};
