//! Class index → label lookup.

/// Labels in class-index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

/// `n01440764 tench, Tinca tinca` → `tench, Tinca tinca`
fn strip_synset(line: &str) -> &str {
    let b = line.as_bytes();
    if b.len() > 10 && b[0] == b'n' && b[1..9].iter().all(u8::is_ascii_digit) && b[9] == b' ' {
        &line[10..]
    } else {
        line
    }
}

impl LabelTable {
    /// One label per `\n` separated line. A trailing newline does not add an
    /// empty class; `\r` line endings and WordNet ids are removed.
    pub fn parse(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        let mut labels: Vec<String> = text
            .split('\n')
            .map(|line| strip_synset(line.trim_end_matches('\r')).to_string())
            .collect();
        if labels.last().is_some_and(|l| l.is_empty()) {
            labels.pop();
        }
        Self { labels }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for LabelTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self { labels: iter.into_iter().map(Into::into).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synset_ids_are_stripped() {
        let t = LabelTable::parse(b"n01440764 tench, Tinca tinca\nn01443537 goldfish\n");
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(0), Some("tench, Tinca tinca"));
        assert_eq!(t.get(1), Some("goldfish"));
        assert_eq!(t.get(2), None);
    }

    #[test]
    fn crlf_and_plain_labels() {
        let t = LabelTable::parse(b"cat\r\ndog\r\n");
        assert_eq!(t.iter().collect::<Vec<_>>(), ["cat", "dog"]);
    }

    #[test]
    fn only_one_trailing_empty_line_dropped() {
        let t = LabelTable::parse(b"a\n\n");
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(1), Some(""));
    }

    #[test]
    fn short_n_words_are_labels() {
        let t = LabelTable::parse(b"n0144 x\nnoodle soup");
        assert_eq!(t.get(0), Some("n0144 x"));
        assert_eq!(t.get(1), Some("noodle soup"));
    }
}
