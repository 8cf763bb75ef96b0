//! Cobertura XML export.
//!
//! Emits the subset of the format that line-coverage consumers read:
//!
//! ```text
//! <coverage line-rate lines-covered lines-valid timestamp version>
//!   <packages>
//!     <package name="shcov">
//!       <classes>
//!         <class name filename line-rate>
//!           <lines><line number hits/></lines>
//!         </class>
//!       </classes>
//!     </package>
//!   </packages>
//! </coverage>
//! ```
//!
//! Every coverable line appears with `hits="1"` or `hits="0"`.
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::error::Result;
use crate::model::ScriptLines;
use crate::report::{CoverageReport, CoverageRow};

fn line_rate(needed: usize, missed: usize) -> String {
    if needed == 0 {
        return "1".to_string();
    }
    format!("{:.4}", (needed - missed) as f64 / needed as f64)
}

/// Render `report` as Cobertura XML. `coverable` supplies the full line list
/// of each row so covered lines can be written too.
pub fn to_cobertura(
    report: &CoverageReport,
    coverable: &ScriptLines,
    timestamp_ms: i64,
) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let statements = report.statements();
    let missed = report.missed();
    let covered = (statements - missed).to_string();
    let valid = statements.to_string();
    let rate = line_rate(statements, missed);
    let timestamp = timestamp_ms.to_string();
    writer.write_event(Event::Start(BytesStart::new("coverage").with_attributes([
        ("line-rate", rate.as_str()),
        ("branch-rate", "0"),
        ("lines-covered", covered.as_str()),
        ("lines-valid", valid.as_str()),
        ("timestamp", timestamp.as_str()),
        ("version", env!("CARGO_PKG_VERSION")),
    ])))?;
    writer.write_event(Event::Start(BytesStart::new("packages")))?;
    writer.write_event(Event::Start(
        BytesStart::new("package").with_attributes([("name", "shcov")]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("classes")))?;

    for row in &report.rows {
        let lines = coverable.get(&row.script).into_iter().flatten();
        write_class(&mut writer, row, lines.copied())?;
    }

    writer.write_event(Event::End(BytesEnd::new("classes")))?;
    writer.write_event(Event::End(BytesEnd::new("package")))?;
    writer.write_event(Event::End(BytesEnd::new("packages")))?;
    writer.write_event(Event::End(BytesEnd::new("coverage")))?;

    let mut xml = String::from_utf8_lossy(&writer.into_inner()).into_owned();
    xml.push('\n');
    Ok(xml)
}

fn write_class(
    writer: &mut Writer<Vec<u8>>,
    row: &CoverageRow,
    lines: impl Iterator<Item = u32>,
) -> Result<()> {
    let rate = line_rate(row.needed, row.missed.len());
    writer.write_event(Event::Start(BytesStart::new("class").with_attributes([
        ("name", row.script.as_str()),
        ("filename", row.script.as_str()),
        ("line-rate", rate.as_str()),
        ("branch-rate", "0"),
    ])))?;
    writer.write_event(Event::Start(BytesStart::new("lines")))?;

    for number in lines {
        let hits = if row.missed.binary_search(&number).is_ok() {
            "0"
        } else {
            "1"
        };
        let number = number.to_string();
        writer.write_event(Event::Empty(
            BytesStart::new("line").with_attributes([("number", number.as_str()), ("hits", hits)]),
        ))?;
    }

    writer.write_event(Event::End(BytesEnd::new("lines")))?;
    writer.write_event(Event::End(BytesEnd::new("class")))?;
    Ok(())
}
