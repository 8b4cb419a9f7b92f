//! Reader plugins: turning paths into layer data.
//!
//! The viewer only sees a [`ReaderChain`]. [`PluginManager`] is the default
//! chain; any closure `Fn(&ReadRequest<'_>) -> Vec<LayerDataTuple>` works too.

mod builtin;
mod manager;

use std::fmt;

use crate::data::LayerDataTuple;

pub use builtin::BuiltinReader;
pub use manager::{PluginError, PluginManager, ReaderPlugin};

/// What a reader is asked to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadRequest<'a> {
    /// One path, URL or directory.
    Path(&'a str),
    /// Paths meant to form a single stack.
    Stack(&'a [String]),
}

impl ReadRequest<'_> {
    pub fn paths(&self) -> Vec<&str> {
        match self {
            ReadRequest::Path(path) => vec![path],
            ReadRequest::Stack(paths) => paths.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for ReadRequest<'_> {
    /// Stacks show only their first path.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadRequest::Path(path) => f.write_str(path),
            ReadRequest::Stack(paths) => match paths.first() {
                Some(first) => write!(f, "[{}, ...] as stack", first),
                None => f.write_str("[] as stack"),
            },
        }
    }
}

/// Resolves a read request to layer data. An empty result means nothing could read it.
pub trait ReaderChain {
    fn read(&self, request: &ReadRequest<'_>) -> Vec<LayerDataTuple>;
}

impl<F> ReaderChain for F
where
    F: Fn(&ReadRequest<'_>) -> Vec<LayerDataTuple>,
{
    fn read(&self, request: &ReadRequest<'_>) -> Vec<LayerDataTuple> {
        self(request)
    }
}
