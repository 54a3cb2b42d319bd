// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Artifact store and version control for Switchyard models.
//!
//! The [`ArtifactStore`] owns the on-disk layout and verifies every artifact
//! it reads. [`VersionControl`] drives the STAGING -> VALIDATED -> PRODUCTION
//! -> ARCHIVED lifecycle on top of it and is the only writer of the serving
//! slot the router reads.

pub mod sidecar;
pub mod store;
pub mod version_control;

pub use sidecar::{ArchiveReason, Sidecar, MODEL_FILE, SIDECAR_FILE, SIDECAR_SCHEMA_VERSION};
pub use store::{ArtifactStore, StoredArtifact};
pub use version_control::{ArchivedArtifact, RegistryStatus, VersionControl};
