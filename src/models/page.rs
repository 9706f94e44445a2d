use serde::{Deserialize, Deserializer, Serialize};

/// Paginated list envelope returned by every list endpoint.
///
/// Also accepts a bare JSON array, which is what list views answer with
/// when pagination is disabled on the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Wire<T> {
    Envelope {
        count: u64,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        #[serde(default = "Vec::new")]
        results: Vec<T>,
    },
    Bare(Vec<T>),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Wire::deserialize(deserializer)? {
            Wire::Envelope {
                count,
                next,
                previous,
                results,
            } => Page {
                count,
                next,
                previous,
                results,
            },
            Wire::Bare(results) => Page {
                count: results.len() as u64,
                next: None,
                previous: None,
                results,
            },
        })
    }
}

impl<T> Page<T> {
    pub fn into_results(self) -> Vec<T> {
        self.results
    }
}
