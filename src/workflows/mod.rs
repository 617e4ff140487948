//! Bundled workflows
//!
//! Each file is one linear script: validate inputs, drive the agent,
//! checkpoint, optionally extract, return.

pub mod custom_login;
pub mod download_documents;
pub mod ezyvet_login;
pub mod get_appointments;
pub mod integration_check;
pub mod primitives;
pub mod website_login;

pub use custom_login::CustomWebsiteLogin;
pub use download_documents::DownloadDocuments;
pub use ezyvet_login::EzyvetLogin;
pub use get_appointments::{Appointment, GetAppointments, APPOINTMENTS_FILE};
pub use integration_check::IntegrationCheck;
pub use primitives::SdkPrimitives;
pub use website_login::WebsiteLogin;
