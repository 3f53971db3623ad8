// scraped message rows + csv boundary

use anyhow::{bail, Context, Result};
use csv::{ByteRecord, ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use tracing::warn;

/// Column order written by the channel scraper.
pub const COLUMNS: [&str; 6] = [
    "channel_title",
    "channel_username",
    "id",
    "message",
    "date",
    "media_path",
];

/// One scraped channel message. Only `message` is ever rewritten; the other
/// fields are carried through to storage untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub channel_title: String,
    pub channel_username: String,
    pub id: i64,
    pub message: String,
    pub date: String,
    pub media_path: Option<String>,
}

/// Undecoded CSV row with the line it was read from.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub line: u64,
    pub fields: ByteRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("expected {expected} columns, found {found}")]
    ColumnCount { expected: usize, found: usize },
    #[error("column `{column}` is not valid UTF-8")]
    InvalidUtf8 { column: &'static str },
    #[error("id `{0}` is not an integer")]
    BadId(String),
    #[error("channel_username is empty")]
    MissingChannel,
}

impl RawRow {
    /// Source message id as text, if the column exists; lossy so that it can
    /// still be reported when the row fails to decode.
    pub fn source_id(&self) -> Option<String> {
        self.fields
            .get(2)
            .map(|b| String::from_utf8_lossy(b).trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn decode(&self) -> Result<MessageRecord, RowError> {
        if self.fields.len() != COLUMNS.len() {
            return Err(RowError::ColumnCount {
                expected: COLUMNS.len(),
                found: self.fields.len(),
            });
        }
        let mut cols = [""; 6];
        for (i, &name) in COLUMNS.iter().enumerate() {
            cols[i] = std::str::from_utf8(&self.fields[i])
                .map_err(|_| RowError::InvalidUtf8 { column: name })?;
        }
        let [channel_title, channel_username, id, message, date, media_path] = cols;

        let channel_username = channel_username.trim();
        if channel_username.is_empty() {
            return Err(RowError::MissingChannel);
        }
        let id = id
            .trim()
            .parse::<i64>()
            .map_err(|_| RowError::BadId(id.to_string()))?;
        let media_path = Some(media_path.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        Ok(MessageRecord {
            channel_title: channel_title.to_string(),
            channel_username: channel_username.to_string(),
            id,
            message: message.to_string(),
            date: date.to_string(),
            media_path,
        })
    }
}

/// Read every data row as raw bytes. Rows are not decoded here, so one bad
/// row never stops the reader.
pub fn read_raw_rows<R: io::Read>(rdr: R) -> Result<Vec<RawRow>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(rdr);
    let header = rdr.byte_headers().context("read csv header")?;
    let names: Vec<&[u8]> = header.iter().collect();
    let expected: Vec<&[u8]> = COLUMNS.iter().map(|c| c.as_bytes()).collect();
    if names != expected {
        bail!(
            "unexpected csv header {:?}, want {:?}",
            names.iter().map(|n| String::from_utf8_lossy(n)).collect::<Vec<_>>(),
            COLUMNS
        );
    }

    let mut rows = Vec::new();
    for rec in rdr.byte_records() {
        let fields = rec.context("read csv row")?;
        let line = fields.position().map(|p| p.line()).unwrap_or_default();
        rows.push(RawRow { line, fields });
    }
    Ok(rows)
}

pub fn read_raw_rows_from_path(path: &Path) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_raw_rows(file)
}

/// Write records with a header row, even when there are none.
pub fn write_records<'a, W, I>(wtr: W, records: I) -> Result<usize>
where
    W: io::Write,
    I: IntoIterator<Item = &'a MessageRecord>,
{
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(wtr);
    wtr.write_record(COLUMNS)?;
    let mut n = 0;
    for r in records {
        wtr.serialize(r)?;
        n += 1;
    }
    wtr.flush()?;
    Ok(n)
}

pub fn write_records_to_path<'a, I>(path: &Path, records: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a MessageRecord>,
{
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let file =
        std::fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_records(file, records)
}

/// A preprocessed row that could not be turned back into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableRecord {
    pub line: u64,
    pub source_id: Option<String>,
    pub reason: String,
}

impl UnreadableRecord {
    pub fn label(&self) -> String {
        match &self.source_id {
            Some(id) => id.clone(),
            None => format!("line {}", self.line),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReadRecords {
    pub records: Vec<MessageRecord>,
    pub unreadable: Vec<UnreadableRecord>,
}

/// Read already-cleaned records. Rows that do not deserialize are logged and
/// returned in `unreadable` so callers can report them.
pub fn read_records<R: io::Read>(rdr: R) -> Result<ReadRecords> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = rdr.byte_headers().context("read csv header")?.clone();
    let mut out = ReadRecords::default();
    for rec in rdr.byte_records() {
        let row = rec.context("read csv row")?;
        match row.deserialize::<MessageRecord>(Some(&headers)) {
            Ok(r) => out.records.push(r),
            Err(e) => {
                let bad = UnreadableRecord {
                    line: row.position().map(|p| p.line()).unwrap_or_default(),
                    source_id: row
                        .get(2)
                        .map(|b| String::from_utf8_lossy(b).trim().to_string())
                        .filter(|s| !s.is_empty()),
                    reason: e.to_string(),
                };
                warn!(line = bad.line, id = %bad.label(), error = %bad.reason, "skipping unreadable record");
                out.unreadable.push(bad);
            }
        }
    }
    Ok(out)
}

pub fn read_records_from_path(path: &Path) -> Result<ReadRecords> {
    let file = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_records(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "channel_title,channel_username,id,message,date,media_path\n";

    fn raw(bytes: &[u8]) -> Vec<RawRow> {
        read_raw_rows(bytes).unwrap()
    }

    #[test]
    fn decodes_scraper_row() {
        let csv = format!(
            "{HEADER}Lobelia pharmacy,@lobelia4cosmetics,42,\"ዋጋ፦ 1500 ብር\",2024-05-30 09:12:44+00:00,data/media/@lobelia4cosmetics_42.jpg\n"
        );
        let rows = raw(csv.as_bytes());
        assert_eq!(rows.len(), 1);
        let rec = rows[0].decode().unwrap();
        assert_eq!(rec.channel_username, "@lobelia4cosmetics");
        assert_eq!(rec.id, 42);
        assert_eq!(rec.message, "ዋጋ፦ 1500 ብር");
        assert_eq!(
            rec.media_path.as_deref(),
            Some("data/media/@lobelia4cosmetics_42.jpg")
        );
    }

    #[test]
    fn empty_media_path_is_none() {
        let csv = format!("{HEADER}T,@chan,7,,2024-05-30 09:12:44+00:00,\n");
        let rec = raw(csv.as_bytes())[0].decode().unwrap();
        assert_eq!(rec.media_path, None);
        assert_eq!(rec.message, "");
    }

    #[test]
    fn reports_malformed_rows() {
        let mut csv = HEADER.as_bytes().to_vec();
        csv.extend_from_slice(b"T,@chan,8,bad \xff\xfe bytes,2024-05-30,\n");
        csv.extend_from_slice(b"T,@chan,nine,hi,2024-05-30,\n");
        csv.extend_from_slice(b"T,@chan,10\n");
        csv.extend_from_slice(b"T,,11,hi,2024-05-30,\n");
        let rows = raw(&csv);
        assert_eq!(
            rows[0].decode(),
            Err(RowError::InvalidUtf8 { column: "message" })
        );
        assert_eq!(rows[0].source_id().as_deref(), Some("8"));
        assert_eq!(rows[1].decode(), Err(RowError::BadId("nine".into())));
        assert_eq!(
            rows[2].decode(),
            Err(RowError::ColumnCount { expected: 6, found: 3 })
        );
        assert_eq!(rows[3].decode(), Err(RowError::MissingChannel));
    }

    #[test]
    fn rejects_foreign_header() {
        assert!(read_raw_rows("a,b,c\n1,2,3\n".as_bytes()).is_err());
    }

    #[test]
    fn written_file_reads_back() {
        let recs = vec![MessageRecord {
            channel_title: "Tikvah, Pharma".into(),
            channel_username: "@tikvahpharma".into(),
            id: 3,
            message: "ሀገር \"quoted\"".into(),
            date: "2024-05-30 09:12:44+00:00".into(),
            media_path: None,
        }];
        let mut buf = Vec::new();
        assert_eq!(write_records(&mut buf, &recs).unwrap(), 1);
        assert!(buf.starts_with(HEADER.as_bytes()));
        let back = read_records(buf.as_slice()).unwrap();
        assert_eq!(back.records, recs);
        assert!(back.unreadable.is_empty());
    }

    #[test]
    fn unreadable_preprocessed_rows_are_returned() {
        let csv = format!(
            "{HEADER}T,@chan,1,ok,2024-05-30 09:12:44+00:00,\n\
             T,@chan,notanint,bad,2024-05-30 09:12:44+00:00,\n\
             T,@chan\n"
        );
        let read = read_records(csv.as_bytes()).unwrap();
        assert_eq!(read.records.len(), 1);
        assert_eq!(read.records[0].id, 1);
        assert_eq!(read.unreadable.len(), 2);
        assert_eq!(read.unreadable[0].line, 3);
        assert_eq!(read.unreadable[0].label(), "notanint");
        assert_eq!(read.unreadable[1].label(), "line 4");
    }

    #[test]
    fn header_written_for_empty_batch() {
        let mut buf = Vec::new();
        write_records(&mut buf, &Vec::new()).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), HEADER);
    }
}
