//! Dataset Module
//! Impedance series and the named collection handed to the interactive renderer.

use num_complex::Complex64;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// How a dataset is drawn in the interactive chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerStyle {
    /// Connected line, no hover interaction
    Line,
    /// Discrete points with frequency-keyed hover highlighting
    Point,
}

impl MarkerStyle {
    /// Parse a marker-style tag. Accepts both the long names and the
    /// short format characters (`-` for lines, `o` for points).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "line" | "-" => Some(MarkerStyle::Line),
            "point" | "o" => Some(MarkerStyle::Point),
            _ => None,
        }
    }

    /// Canonical tag stored in the flattened table.
    pub fn tag(&self) -> &'static str {
        match self {
            MarkerStyle::Line => "-",
            MarkerStyle::Point => "o",
        }
    }
}

fn default_fmt() -> String {
    MarkerStyle::Point.tag().to_string()
}

/// One measured impedance spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Frequencies in Hz, index-aligned with `z`
    pub f: Vec<f64>,
    /// Complex impedance, serialized as `[re, im]` pairs
    pub z: Vec<Complex64>,
    /// Marker-style tag ("line"/"-" or "point"/"o")
    #[serde(default = "default_fmt")]
    pub fmt: String,
}

impl Dataset {
    pub fn new(f: Vec<f64>, z: Vec<Complex64>, style: MarkerStyle) -> Self {
        Self {
            f,
            z,
            fmt: style.tag().to_string(),
        }
    }

    /// Dataset with a raw tag, kept verbatim even when unrecognized.
    pub fn with_tag(f: Vec<f64>, z: Vec<Complex64>, tag: impl Into<String>) -> Self {
        Self {
            f,
            z,
            fmt: tag.into(),
        }
    }

    pub fn style(&self) -> Option<MarkerStyle> {
        MarkerStyle::from_tag(&self.fmt)
    }

    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }
}

/// Insertion-ordered mapping from dataset label to dataset.
///
/// Labels are unique; inserting an existing label replaces that entry in place
/// so its layering position is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetCollection {
    entries: Vec<(String, Dataset)>,
}

impl DatasetCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a dataset, returning the one previously stored under `label`.
    pub fn insert(&mut self, label: impl Into<String>, dataset: Dataset) -> Option<Dataset> {
        let label = label.into();
        if let Some((_, existing)) = self.entries.iter_mut().find(|(k, _)| *k == label) {
            return Some(std::mem::replace(existing, dataset));
        }
        self.entries.push((label, dataset));
        None
    }

    pub fn get(&self, label: &str) -> Option<&Dataset> {
        self.entries
            .iter()
            .find(|(k, _)| k == label)
            .map(|(_, d)| d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Dataset)> {
        self.entries.iter().map(|(k, d)| (k.as_str(), d))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of impedance samples across all datasets.
    pub fn sample_count(&self) -> usize {
        self.entries.iter().map(|(_, d)| d.len()).sum()
    }
}

impl<S: Into<String>> FromIterator<(S, Dataset)> for DatasetCollection {
    fn from_iter<I: IntoIterator<Item = (S, Dataset)>>(iter: I) -> Self {
        let mut collection = DatasetCollection::new();
        for (label, dataset) in iter {
            collection.insert(label, dataset);
        }
        collection
    }
}

// Serialized as a JSON object keyed by label, keeping insertion order.
impl Serialize for DatasetCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, dataset) in &self.entries {
            map.serialize_entry(label, dataset)?;
        }
        map.end()
    }
}

struct CollectionVisitor;

impl<'de> Visitor<'de> for CollectionVisitor {
    type Value = DatasetCollection;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of dataset labels to datasets")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut collection = DatasetCollection::new();
        while let Some((label, dataset)) = access.next_entry::<String, Dataset>()? {
            collection.insert(label, dataset);
        }
        Ok(collection)
    }
}

impl<'de> Deserialize<'de> for DatasetCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CollectionVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            vec![1000.0, 100.0],
            vec![Complex64::new(10.0, -1.0), Complex64::new(12.0, -3.0)],
            MarkerStyle::Point,
        )
    }

    #[test]
    fn test_marker_style_tags() {
        assert_eq!(MarkerStyle::from_tag("-"), Some(MarkerStyle::Line));
        assert_eq!(MarkerStyle::from_tag("line"), Some(MarkerStyle::Line));
        assert_eq!(MarkerStyle::from_tag("o"), Some(MarkerStyle::Point));
        assert_eq!(MarkerStyle::from_tag("point"), Some(MarkerStyle::Point));
        assert_eq!(MarkerStyle::from_tag("x"), None);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut c = DatasetCollection::new();
        assert!(c.insert("a", sample()).is_none());
        c.insert("b", sample());
        let replaced = c.insert("a", Dataset::new(vec![], vec![], MarkerStyle::Line));
        assert!(replaced.is_some());
        assert_eq!(c.labels(), vec!["a", "b"]);
        assert_eq!(c.get("a").and_then(|d| d.style()), Some(MarkerStyle::Line));
        assert_eq!(c.sample_count(), 2);
    }

    #[test]
    fn test_deserialize_defaults_to_points() {
        let json = r#"{"fit": {"f": [1.0], "z": [[3.0, -4.0]]}}"#;
        let c: DatasetCollection = serde_json::from_str(json).unwrap();
        let d = c.get("fit").unwrap();
        assert_eq!(d.style(), Some(MarkerStyle::Point));
        assert_eq!(d.z[0], Complex64::new(3.0, -4.0));
    }

    #[test]
    fn test_serialize_keeps_order() {
        let c: DatasetCollection = [("zeta", sample()), ("alpha", sample())]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&c).unwrap();
        let zeta = json.find("zeta").unwrap();
        let alpha = json.find("alpha").unwrap();
        assert!(zeta < alpha);
    }
}
