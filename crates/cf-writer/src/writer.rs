//! The writer facade and the serialization seam.
//!
//! `CfWriter` prepares containers and hands them to a [`ContainerSink`], the
//! external array-serialization primitive. The sink owns all file I/O and the
//! actual netCDF encoding; this crate only guarantees that what reaches the
//! sink is standards-conformant.

use std::path::{Path, PathBuf};

use labeled_array::LabeledArray;

use crate::collect::{collect_containers, OutputContainer};
use crate::config::SaveOptions;
use crate::diagnostics::Diagnostics;
use crate::encoding::{resolve_encoding, EncodingTable};
use crate::error::Result;

/// How a container write applies to the target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Create or truncate the file.
    Write,
    /// Append to an existing file (used for named groups).
    Append,
}

/// The external array-serialization primitive.
///
/// One call serializes one container to `path`, optionally under a named
/// group, with explicit per-variable encoding. `engine` selects the backend
/// and is passed through verbatim. Grouped output relies on call order: the
/// root container arrives first with [`WriteMode::Write`], every group after
/// it with [`WriteMode::Append`].
pub trait ContainerSink {
    fn write_container(
        &mut self,
        container: &OutputContainer,
        path: &Path,
        group: Option<&str>,
        mode: WriteMode,
        encoding: &EncodingTable,
        engine: Option<&str>,
    ) -> Result<()>;
}

/// Outcome of one save call.
#[derive(Debug, Clone)]
pub struct SaveSummary {
    /// Groups written, in write order; `None` is the root or flat container.
    pub groups_written: Vec<Option<String>>,
    /// Warnings accumulated during the call.
    pub diagnostics: Diagnostics,
}

/// Writer producing CF-compliant containers through a serialization sink.
#[derive(Debug)]
pub struct CfWriter<S> {
    sink: S,
}

impl<S: ContainerSink> CfWriter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Consume the writer and return its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Save a single array; equivalent to [`CfWriter::save_arrays`] with a
    /// one-element slice.
    pub fn save_array(
        &mut self,
        array: &LabeledArray,
        path: &Path,
        options: &SaveOptions,
    ) -> Result<SaveSummary> {
        self.save_arrays(std::slice::from_ref(array), path, options)
    }

    /// Save the given arrays into one container file.
    ///
    /// All arrays (per group, when grouping) must share the same projection
    /// coordinates. With `groups` set, an empty root container carrying the
    /// global attributes is written first and each group is appended to it;
    /// the result is not fully CF compliant.
    pub fn save_arrays(
        &mut self,
        arrays: &[LabeledArray],
        path: &Path,
        options: &SaveOptions,
    ) -> Result<SaveSummary> {
        options.validate()?;
        let mut diagnostics = Diagnostics::new();
        if options.compression.is_some() {
            diagnostics.warn(
                "The `compression` option is deprecated, use the per-variable \
                 `encoding` table to tune compression instead.",
            );
        }
        tracing::info!("Saving datasets to netCDF/CF.");

        let (containers, header_attrs) = collect_containers(arrays, options, &mut diagnostics)?;
        let engine = options.engine.as_deref();
        let prefix = options.effective_prefix();
        let mut groups_written = Vec::new();

        if options.groups.is_some() {
            // Root container first: global attributes only, no variables.
            let root = OutputContainer {
                attrs: header_attrs,
                ..Default::default()
            };
            self.sink
                .write_container(&root, path, None, WriteMode::Write, &EncodingTable::new(), engine)?;
            groups_written.push(None);

            for (group_name, container) in &containers {
                let encoding = resolve_encoding(container, &options.encoding, prefix);
                self.sink.write_container(
                    container,
                    path,
                    group_name.as_deref(),
                    WriteMode::Append,
                    &encoding,
                    engine,
                )?;
                groups_written.push(group_name.clone());
            }
        } else {
            for (group_name, container) in &containers {
                let encoding = resolve_encoding(container, &options.encoding, prefix);
                self.sink.write_container(
                    container,
                    path,
                    group_name.as_deref(),
                    WriteMode::Write,
                    &encoding,
                    engine,
                )?;
                groups_written.push(group_name.clone());
            }
        }

        Ok(SaveSummary {
            groups_written,
            diagnostics,
        })
    }
}

/// A sink call captured by [`crate::testing::RecordingSink`].
#[derive(Debug, Clone)]
pub struct RecordedWrite {
    pub container: OutputContainer,
    pub path: PathBuf,
    pub group: Option<String>,
    pub mode: WriteMode,
    pub encoding: EncodingTable,
    pub engine: Option<String>,
}
