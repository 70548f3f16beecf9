use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum VexError {
    #[error("{command} exited with code {code}: {stderr}")]
    Exit {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("failed to start {command}")]
    #[diagnostic(help("is the binary installed and on PATH?"))]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("lost track of {command} after it started")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} did not finish within {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("machine-readable output is not valid UTF-8")]
    InvalidEncoding {
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("malformed record on line {line}: '{content}'")]
    MalformedRecord { line: usize, content: String },

    #[error("invalid timestamp on line {line}: '{value}'")]
    InvalidTimestamp { line: usize, value: String },

    #[error("no '{kind}' entry found")]
    EntryNotFound { kind: String },

    #[error("'{kind}' entry has no data field {index}")]
    MissingField { kind: String, index: usize },

    #[error("'{value}' cannot be encoded with the configured escape tokens")]
    Unencodable { value: String },

    #[error("unrecognized plugin description: '{description}'")]
    PluginDescription { description: String },

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config from {path}: {message}")]
    ConfigParse { path: String, message: String },
}
