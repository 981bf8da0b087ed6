use serde::{Deserialize, Serialize};

/// Wire dialect of a link-layer frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// AX.25 binary layout.
    Binary,
    /// TNC2 path notation, `SRC>DST,DIGI:payload`.
    #[serde(alias = "path")]
    PathNotation,
}

impl Dialect {
    /// Short name for logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Binary => "binary",
            Dialect::PathNotation => "path",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
