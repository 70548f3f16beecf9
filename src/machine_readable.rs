//! Decoder for Vagrant's `--machine-readable` output.
//!
//! Each line is `timestamp,target,type,data` where `data` is a list of
//! comma-separated fields. Commas and newlines inside a field are replaced
//! by placeholder tokens (see [`Escapes`]) so that the structural commas
//! stay unambiguous.

use crate::error::VexError;

/// Placeholder token Vagrant substitutes for a literal comma in a field.
pub const DEFAULT_COMMA_TOKEN: &str = "%!(VAGRANT_COMMA)";

/// Placeholder Vagrant substitutes for a literal newline: a backslash followed by `n`.
pub const DEFAULT_NEWLINE_TOKEN: &str = "\\n";

/// The pair of placeholder tokens used to escape data fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escapes {
    pub comma: String,
    pub newline: String,
}

impl Default for Escapes {
    fn default() -> Self {
        Self {
            comma: DEFAULT_COMMA_TOKEN.into(),
            newline: DEFAULT_NEWLINE_TOKEN.into(),
        }
    }
}

impl Escapes {
    /// Reverse the placeholder substitution on a single field.
    pub fn unescape(&self, field: &str) -> String {
        field.replace(&self.comma, ",").replace(&self.newline, "\n")
    }

    /// Apply the placeholder substitution to a single field.
    pub fn escape(&self, field: &str) -> String {
        field.replace(',', &self.comma).replace('\n', &self.newline)
    }
}

/// One decoded line of machine-readable output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub timestamp: i64,
    /// Machine name the record applies to; empty for global records.
    pub target: String,
    pub kind: String,
    pub data: Vec<String>,
}

impl Record {
    /// Render the record back into its wire form (without trailing newline).
    ///
    /// Fails with [`VexError::Unencodable`] when a value would not decode
    /// back to itself: a data field that already contains one of the token
    /// texts (e.g. a literal `\n` with the default tokens), or a target or
    /// kind containing a comma or newline.
    pub fn encode(&self, escapes: &Escapes) -> Result<String, VexError> {
        for header in [&self.target, &self.kind] {
            if header.contains([',', '\n']) {
                return Err(VexError::Unencodable {
                    value: header.clone(),
                });
            }
        }

        let data = self
            .data
            .iter()
            .map(|field| {
                let escaped = escapes.escape(field);
                if escaped.contains(',') || escapes.unescape(&escaped) != *field {
                    return Err(VexError::Unencodable {
                        value: field.clone(),
                    });
                }
                Ok(escaped)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(format!(
            "{},{},{},{}",
            self.timestamp,
            self.target,
            self.kind,
            data.join(",")
        ))
    }
}

/// Decode a machine-readable stream into records, preserving input order.
///
/// Any malformed line aborts the whole parse.
pub fn parse(raw: &[u8], escapes: &Escapes) -> Result<Vec<Record>, VexError> {
    let text = std::str::from_utf8(raw).map_err(|source| VexError::InvalidEncoding { source })?;

    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| parse_line(i + 1, line.strip_suffix('\r').unwrap_or(line), escapes))
        .collect()
}

fn parse_line(line_no: usize, line: &str, escapes: &Escapes) -> Result<Record, VexError> {
    let mut parts = line.splitn(4, ',');
    let (Some(ts), Some(target), Some(kind), Some(data)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(VexError::MalformedRecord {
            line: line_no,
            content: line.to_string(),
        });
    };

    let timestamp = ts.trim().parse::<i64>().map_err(|_| VexError::InvalidTimestamp {
        line: line_no,
        value: ts.to_string(),
    })?;

    let data = if data.is_empty() {
        Vec::new()
    } else {
        data.split(',').map(|f| escapes.unescape(f)).collect()
    };

    Ok(Record {
        timestamp,
        target: target.to_string(),
        kind: kind.to_string(),
        data,
    })
}

/// Data of the first record of the given kind.
pub fn pluck_entry_data<'a>(records: &'a [Record], kind: &str) -> Result<&'a [String], VexError> {
    records
        .iter()
        .find(|r| r.kind == kind)
        .map(|r| r.data.as_slice())
        .ok_or_else(|| VexError::EntryNotFound { kind: kind.into() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(s: &str) -> Result<Vec<Record>, VexError> {
        parse(s.as_bytes(), &Escapes::default())
    }

    #[test]
    fn parses_fields_in_order() {
        let records = parse_str(
            "1700000000,default,state,running\n1700000001,,version-installed,2.3.0\n",
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, 1700000000);
        assert_eq!(records[0].target, "default");
        assert_eq!(records[0].kind, "state");
        assert_eq!(records[0].data, vec!["running"]);
        assert_eq!(records[1].target, "");
        assert_eq!(records[1].kind, "version-installed");
    }

    #[test]
    fn escaped_comma_stays_in_one_field() {
        let records =
            parse_str("1,,ui,info,Installed version: 2.3.0%!(VAGRANT_COMMA) installed").unwrap();
        assert_eq!(
            records[0].data,
            vec!["info", "Installed version: 2.3.0, installed"]
        );
    }

    #[test]
    fn escaped_newline_is_decoded() {
        let records = parse_str(r"1,web,ui,info,line one\nline two").unwrap();
        assert_eq!(records[0].data, vec!["info", "line one\nline two"]);
    }

    #[test]
    fn empty_data_gives_empty_fields() {
        let records = parse_str("1,default,metadata,\n").unwrap();
        assert!(records[0].data.is_empty());
    }

    #[test]
    fn trailing_empty_field_is_kept() {
        let records = parse_str("1,default,ui,info,").unwrap();
        assert_eq!(records[0].data, vec!["info", ""]);
    }

    #[test]
    fn crlf_line_endings() {
        let records = parse_str("1,a,state,running\r\n2,a,provider-name,libvirt\r\n").unwrap();
        assert_eq!(records[0].data, vec!["running"]);
        assert_eq!(records[1].data, vec!["libvirt"]);
    }

    #[test]
    fn too_few_commas_is_malformed() {
        let err = parse_str("1,default,state,running\n1,default,state\n").unwrap_err();
        assert!(matches!(err, VexError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn blank_line_in_the_middle_is_malformed() {
        let err = parse_str("1,a,state,running\n\n2,a,state,saved\n").unwrap_err();
        assert!(matches!(err, VexError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn bad_timestamp_is_rejected() {
        let err = parse_str("yesterday,a,state,running").unwrap_err();
        assert!(matches!(err, VexError::InvalidTimestamp { line: 1, .. }));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = parse(b"1,a,state,\xff\xfe", &Escapes::default()).unwrap_err();
        assert!(matches!(err, VexError::InvalidEncoding { .. }));
    }

    #[test]
    fn empty_input_yields_no_records() {
        assert!(parse_str("").unwrap().is_empty());
    }

    #[test]
    fn custom_tokens() {
        let escapes = Escapes {
            comma: "<C>".into(),
            newline: "<N>".into(),
        };
        let records = parse(b"1,,ui,a<C>b<N>c", &escapes).unwrap();
        assert_eq!(records[0].data, vec!["a,b\nc"]);
    }

    #[test]
    fn escape_then_parse_restores_fields() {
        let default = Escapes::default();
        let custom = Escapes {
            comma: "<C>".into(),
            newline: "<N>".into(),
        };
        let cases: Vec<(&Escapes, Vec<&str>)> = vec![
            (&default, vec!["plain"]),
            (&default, vec!["a, b, c"]),
            (&default, vec!["first\nsecond"]),
            (&default, vec![",\n,\n", ""]),
            (&default, vec!["info", "vagrant-libvirt (0.12.2, global)"]),
            (&default, vec!["", "", "trailing"]),
            (&default, vec!["C:\\dir,other", "tab\there"]),
            (&custom, vec!["a,b\nc", r"back\slash\n kept"]),
            (&custom, vec!["%!(VAGRANT_COMMA) is just text here"]),
        ];

        for (escapes, fields) in &cases {
            let record = Record {
                timestamp: 42,
                target: "web".into(),
                kind: "ui".into(),
                data: fields.iter().map(|f| f.to_string()).collect(),
            };
            let line = record.encode(escapes).unwrap();
            assert_eq!(
                line.matches(',').count(),
                3 + fields.len() - 1,
                "structural commas in {line:?}"
            );
            let parsed = parse(line.as_bytes(), escapes).unwrap();
            assert_eq!(parsed, vec![record], "round trip of {fields:?}");
        }
    }

    #[test]
    fn encode_rejects_fields_containing_tokens() {
        let escapes = Escapes::default();
        for field in [r"C:\new,dir", "%!(VAGRANT_COMMA)", r"ends with \n"] {
            let record = Record {
                timestamp: 1,
                target: String::new(),
                kind: "ui".into(),
                data: vec![field.into()],
            };
            assert!(
                matches!(record.encode(&escapes), Err(VexError::Unencodable { .. })),
                "expected {field:?} to be rejected"
            );
        }
    }

    #[test]
    fn encode_rejects_comma_in_target() {
        let record = Record {
            timestamp: 1,
            target: "web,db".into(),
            kind: "state".into(),
            data: vec!["running".into()],
        };
        assert!(matches!(
            record.encode(&Escapes::default()),
            Err(VexError::Unencodable { .. })
        ));
    }

    #[test]
    fn pluck_returns_first_match() {
        let records = parse_str(
            "1,,version-installed,2.3.0\n2,,version-latest,2.4.1\n3,,version-installed,9.9.9\n",
        )
        .unwrap();
        assert_eq!(
            pluck_entry_data(&records, "version-installed").unwrap(),
            ["2.3.0"]
        );
        assert_eq!(
            pluck_entry_data(&records, "version-latest").unwrap(),
            ["2.4.1"]
        );
    }

    #[test]
    fn pluck_missing_kind() {
        let records =
            parse_str("1,,ui,info,Installed version: 2.3.0%!(VAGRANT_COMMA) installed").unwrap();
        let err = pluck_entry_data(&records, "version-installed").unwrap_err();
        match err {
            VexError::EntryNotFound { kind } => assert_eq!(kind, "version-installed"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
