//! Text backend for the hierarchical value format.
//!
//! Loads the Ion text encoding (symbols, annotations, comments, system
//! values, lobs and timestamps included) into hierarchical values, and
//! writes hierarchical values back as compact Ion text. Top-level values in
//! one written unit are separated by newlines.

mod loader;
mod writer;

pub use loader::TextLoader;
pub use writer::TextWriter;

use strata_api::{FormatBackend, Loader, ValueWriter};

#[derive(Debug, Default, Clone, Copy)]
pub struct IonTextBackend {
    loader: TextLoader,
}

impl IonTextBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FormatBackend for IonTextBackend {
    fn writer(&self) -> Box<dyn ValueWriter> {
        Box::new(TextWriter::new())
    }

    fn loader(&self) -> &dyn Loader {
        &self.loader
    }
}
