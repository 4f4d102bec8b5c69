use crate::resources::SavedResource;
use crate::utils::truncate_chars;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// How many characters of each pretty-printed finding the report shows
pub const REPORT_PREVIEW_CHARS: usize = 200;

/// File the run report is written to inside the output directory
pub const REPORT_FILE_NAME: &str = "data.json";

/// One JSON value found in a page
#[derive(Debug, Clone, PartialEq)]
pub struct JsonFinding {
    /// Variable the value was assigned to, when it came from a script assignment
    pub variable: Option<String>,

    /// The decoded value
    pub value: Value,
}

impl JsonFinding {
    /// A value found by the document-wide scan
    pub fn untagged(value: Value) -> Self {
        Self {
            variable: None,
            value,
        }
    }

    /// A value assigned to a named script variable
    pub fn tagged(variable: impl Into<String>, value: Value) -> Self {
        Self {
            variable: Some(variable.into()),
            value,
        }
    }

    /// The finding as one JSON value: `{ "<variable>": value }` or the bare value
    pub fn to_value(&self) -> Value {
        match &self.variable {
            Some(name) => {
                let mut map = serde_json::Map::new();
                map.insert(name.clone(), self.value.clone());
                Value::Object(map)
            }
            None => self.value.clone(),
        }
    }
}

impl Serialize for JsonFinding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.variable {
            Some(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(name, &self.value)?;
                map.end()
            }
            None => self.value.serialize(serializer),
        }
    }
}

/// Everything extracted from one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// URL the page was fetched from
    pub url: String,

    /// JSON values in scan order
    pub json_data: Vec<JsonFinding>,

    /// Unique endpoint URLs referenced from scripts
    pub js_endpoints: BTreeSet<String>,
}

impl AnalysisResult {
    pub fn new(url: String, json_data: Vec<JsonFinding>, js_endpoints: BTreeSet<String>) -> Self {
        Self {
            url,
            json_data,
            js_endpoints,
        }
    }

    /// Human-readable summary; findings are cut to a short preview, endpoints listed in full
    pub fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Results for {}", self.url);

        let _ = writeln!(out, "\nJSON Data Found:");
        for (index, finding) in self.json_data.iter().enumerate() {
            let pretty = serde_json::to_string_pretty(finding).unwrap_or_default();
            let _ = writeln!(
                out,
                "\n{}. {}...",
                index + 1,
                truncate_chars(&pretty, REPORT_PREVIEW_CHARS)
            );
        }

        let _ = writeln!(out, "\nPotential JS Endpoints:");
        for endpoint in &self.js_endpoints {
            let _ = writeln!(out, "- {}", endpoint);
        }

        out
    }
}

/// Everything produced by one run of the probe
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub results: Vec<AnalysisResult>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub saved_resources: Vec<SavedResource>,
}

impl RunReport {
    /// Writes the report as pretty JSON to `<dir>/data.json`
    pub fn write_to(&self, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let path = dir.join(REPORT_FILE_NAME);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}
