// SPDX-License-Identifier: GPL-3.0-or-later

use super::formats::{SerializationError, SerializationFormat};
use super::{WriterCreationError, WriterError};
use std::io::Write;
use std::marker::PhantomData;
use std::{io, path};

/// A trait representing a writer for iterator type `T`.
///
/// This trait is implemented by types that can consume an iterator of type `T`
/// and write its elements to some output. The writing process may succeed or fail,
/// returning either `()` on success or an error.
pub(super) trait IteratorWriter<T> {
    /// Writes the iterator as a sequence of elements.
    ///
    /// Consumes the iterator and returns either nothing on success or an error.
    fn write(self, items: impl Iterator<Item = T>) -> Result<(), WriterError>;
}

/// The type represents a writer that writes files atomically in format `F`.
///
/// The content is first written to a temporary file next to the final file,
/// and then it is renamed to the final file name. This ensures that the output
/// file is not left in an inconsistent state in case of errors.
pub(super) struct AtomicFileWriter<F> {
    temporary: tempfile::NamedTempFile,
    final_path: path::PathBuf,
    format: PhantomData<F>,
}

impl<F> AtomicFileWriter<F> {
    pub(super) fn create(final_path: &path::Path) -> Result<Self, WriterCreationError> {
        let directory = match final_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => path::Path::new("."),
        };
        let temporary = tempfile::Builder::new()
            .prefix(".flaggen-")
            .tempfile_in(directory)
            .map_err(|err| WriterCreationError::Io(final_path.to_path_buf(), err))?;

        Ok(Self { temporary, final_path: final_path.to_path_buf(), format: PhantomData })
    }
}

impl<T, F: SerializationFormat<T>> IteratorWriter<T> for AtomicFileWriter<F> {
    fn write(self, items: impl Iterator<Item = T>) -> Result<(), WriterError> {
        let Self { mut temporary, final_path, .. } = self;

        let result = {
            let mut output = io::BufWriter::new(temporary.as_file_mut());
            F::write(&mut output, items).and_then(|_| output.flush().map_err(SerializationError::Io))
        };
        result.map_err(|err| WriterError::Io(final_path.clone(), err))?;

        temporary
            .persist(&final_path)
            .map_err(|err| WriterError::Io(final_path.clone(), SerializationError::Io(err.error)))?;

        Ok(())
    }
}
