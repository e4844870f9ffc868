// Adapters layer: concrete implementations of the domain ports.

#[cfg(test)]
pub(crate) mod memory;
pub mod pdftotext;
pub mod storage;

pub use pdftotext::PdfToText;
pub use storage::LocalStorage;
