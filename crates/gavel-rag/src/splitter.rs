pub const CHUNK_SIZE: usize = 800;
pub const CHUNK_OVERLAP: usize = 150;

#[derive(Debug, Clone)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            chunk_overlap: CHUNK_OVERLAP,
        }
    }
}

pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    #[must_use]
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    /// Split text into sentence-aware chunks with overlap between neighbours.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        let sentences = split_sentences(text);
        merge_sentences(&sentences, self.config.chunk_size, self.config.chunk_overlap)
    }
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        current.push(chars[i]);

        // Split on paragraph breaks
        if chars[i] == '\n' && i + 1 < chars.len() && chars[i + 1] == '\n' {
            current.push(chars[i + 1]);
            i += 1;
            if !current.trim().is_empty() {
                sentences.push(std::mem::take(&mut current));
            }
        }
        // Split on sentence endings followed by space
        else if (chars[i] == '.' || chars[i] == '?' || chars[i] == '!')
            && i + 1 < chars.len()
            && chars[i + 1] == ' '
            && !current.trim().is_empty()
        {
            sentences.push(std::mem::take(&mut current));
        }

        i += 1;
    }

    if !current.trim().is_empty() {
        sentences.push(current);
    }

    sentences
}

/// Merge sentences into chunks, respecting size and overlap.
fn merge_sentences(sentences: &[String], chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    // Sliding window: track only the sentence indices contributing to the current chunk.
    let mut window_start = 0;

    for (idx, sentence) in sentences.iter().enumerate() {
        if !current.is_empty() && current.len() + sentence.len() > chunk_size {
            chunks.push(current.clone());

            // Build overlap from recent sentences (walk backwards from current window)
            current.clear();
            let mut overlap_len = 0;
            let mut overlap_start = idx;
            for i in (window_start..idx).rev() {
                if overlap_len + sentences[i].len() > chunk_overlap {
                    break;
                }
                overlap_len += sentences[i].len();
                overlap_start = i;
            }
            for s in &sentences[overlap_start..idx] {
                current.push_str(s);
            }
            window_start = overlap_start;
        }

        current.push_str(sentence);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text() {
        let splitter = TextSplitter::new(SplitterConfig::default());
        assert!(splitter.split("").is_empty());
    }

    #[test]
    fn short_text_single_chunk() {
        let splitter = TextSplitter::new(SplitterConfig::default());
        let chunks = splitter.split("A company must maintain a registered office in ADGM.");
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn long_text_multiple_chunks() {
        let sentence = "Every company incorporated in ADGM shall keep a register of members. ";
        let text = sentence.repeat(30);
        let splitter = TextSplitter::new(SplitterConfig::default());
        let chunks = splitter.split(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn overlap_repeats_trailing_sentence() {
        let text = "First sentence here. Second sentence here. Third sentence here.";
        let splitter = TextSplitter::new(SplitterConfig {
            chunk_size: 45,
            chunk_overlap: 25,
        });
        let chunks = splitter.split(text);
        assert!(chunks.len() > 1);
        assert!(chunks[1].contains("Second sentence"));
    }

    #[test]
    fn paragraph_break_splits() {
        let sentences = super::split_sentences("First paragraph.\n\nSecond paragraph.");
        assert_eq!(sentences.len(), 2);
    }

    #[test]
    fn question_and_exclamation_split() {
        let sentences = super::split_sentences("Is this binding? It shall be! Signed below.");
        assert_eq!(sentences.len(), 3);
    }
}
