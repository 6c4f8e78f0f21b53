//! Schema output.

use std::io::Write;

use anyhow::Result;
use proxygen_core::TargetClass;

/// Write the reflected classes as a pretty-printed JSON array.
pub fn write_schema<W: Write>(out: &mut W, classes: &[TargetClass]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, classes)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
