//! In-memory sink for exercising the writer without a storage backend.

use std::path::Path;

use crate::collect::OutputContainer;
use crate::encoding::EncodingTable;
use crate::error::Result;
use crate::writer::{ContainerSink, RecordedWrite, WriteMode};

/// A [`ContainerSink`] that records every call instead of writing anywhere.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<RecordedWrite>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded call for a group, if any.
    pub fn call_for_group(&self, group: Option<&str>) -> Option<&RecordedWrite> {
        self.calls
            .iter()
            .find(|call| call.group.as_deref() == group)
    }
}

impl ContainerSink for RecordingSink {
    fn write_container(
        &mut self,
        container: &OutputContainer,
        path: &Path,
        group: Option<&str>,
        mode: WriteMode,
        encoding: &EncodingTable,
        engine: Option<&str>,
    ) -> Result<()> {
        self.calls.push(RecordedWrite {
            container: container.clone(),
            path: path.to_path_buf(),
            group: group.map(str::to_string),
            mode,
            encoding: encoding.clone(),
            engine: engine.map(str::to_string),
        });
        Ok(())
    }
}
