//! Client entry point for PDF Services.
//!
//! Keep the public surface small: one facade, one builder.
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;

pub use self::builder::PdfServicesBuilder;
pub use self::core::PdfServices;
