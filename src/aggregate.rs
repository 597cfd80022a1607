use std::collections::{BTreeSet, HashSet};

pub const SEPARATOR: &str = ";";

pub fn semijoin_unique<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let value = value.as_ref().trim();
        if value.is_empty() || value.eq_ignore_ascii_case("nan") {
            continue;
        }
        if seen.insert(value.to_string()) {
            out.push(value.to_string());
        }
    }
    out.join(SEPARATOR)
}

pub fn sorted_unique_join<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let set: BTreeSet<String> = values
        .into_iter()
        .map(|value| value.as_ref().to_string())
        .collect();
    set.into_iter().collect::<Vec<_>>().join(SEPARATOR)
}
