//! The reusable, schema-linked encoder.

use std::{fmt, io::Write, sync::Arc};

use crate::{
    bind::Bindable,
    error::{StreamError, TypeError},
    link::{EncodeNode, encode_node},
    writer::JsonWriter,
};

/// A linked encoder for `T`.
///
/// Created by [`Schema::encoder`](crate::Schema::encoder), inheriting the
/// schema's output format. Like decoders, encoders are immutable once
/// linked and shareable across threads.
pub struct Encoder<T: Bindable> {
    root: Arc<EncodeNode<T>>,
    indent: Option<String>,
}

// The node graph holds type-erased closures, so Debug is hand-rolled.
impl<T: Bindable> fmt::Debug for Encoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder").finish_non_exhaustive()
    }
}

impl<T: Bindable> Encoder<T> {
    pub(crate) fn new(root: Arc<EncodeNode<T>>, indent: Option<String>) -> Self {
        Self { root, indent }
    }

    /// Writes `value` as one JSON value to `output`.
    ///
    /// The document is produced in a single traversal. Declined encode
    /// conversions are reported in the returned list, with `null` written
    /// for the affected slot.
    ///
    /// # Errors
    ///
    /// Returns a [`StreamError`] only if the writer fails.
    pub fn encode(&self, value: &T, mut output: impl Write) -> Result<Vec<TypeError>, StreamError> {
        let mut writer = JsonWriter::new(&mut output, self.indent.as_deref());
        let mut errors = Vec::new();
        encode_node(&self.root, value, &mut writer, &mut errors)?;
        writer.finish()?;
        Ok(errors)
    }
}
