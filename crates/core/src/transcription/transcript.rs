/// Text produced by one inference pass.
///
/// `text` is the segments appended in emission order, byte for byte; no
/// separator is inserted and nothing is trimmed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
    pub segments: Vec<String>,
}

impl Transcript {
    pub fn from_segments(segments: Vec<String>) -> Self {
        let text = segments.concat();
        Self { text, segments }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
