use serde::{Deserialize, Serialize};

/// Label encoder for product names.
///
/// Codes follow the lexicographic order of the distinct names seen at fit
/// time, so the same set of names always yields the same codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductEncoder {
    classes: Vec<String>,
}

impl ProductEncoder {
    pub fn fit<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// Fits on `names` and returns the code of each name in input order.
    pub fn fit_transform<S: AsRef<str>>(names: &[S]) -> (Self, Vec<usize>) {
        let encoder = Self::fit(names.iter().map(|name| name.as_ref()));
        let codes = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                encoder
                    .classes
                    .partition_point(|class| class.as_str() < name)
            })
            .collect();
        (encoder, codes)
    }

    /// Integer code for `name`, or `None` if it was never seen during fit.
    pub fn encode(&self, name: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(name))
            .ok()
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
