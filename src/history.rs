//! Printing the session log outside the TUI.

use std::io::{self, Write};

use crate::readout::ClockReadout;
use crate::session::SessionLog;

pub fn write_table<W: Write>(log: &SessionLog, out: &mut W) -> io::Result<()> {
    if log.is_empty() {
        writeln!(out, "No sessions recorded yet.")?;
        return Ok(());
    }

    writeln!(out, "{:>7}  {:>8}", "session", "duration")?;
    for record in log.records() {
        writeln!(
            out,
            "{:>7}  {:>8}",
            record.session,
            ClockReadout::from_secs(record.duration).to_string()
        )?;
    }
    writeln!(
        out,
        "{} sessions, {} total",
        log.len(),
        ClockReadout::from_secs(log.total())
    )
}

/// `session,duration` rows with a header, duration in whole seconds.
pub fn write_csv<W: Write>(log: &SessionLog, out: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    if log.is_empty() {
        writer.write_record(["session", "duration"])?;
    }
    for record in log.records() {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
