/// Ordered, append-only collection of text deltas
///
/// Deltas are kept as separate pieces and joined once at the end of the stream.
#[derive(Debug, Default, Clone)]
pub struct ResponseAccumulator {
    parts: Vec<String>,
    total_len: usize,
}

impl ResponseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, delta: String) {
        self.total_len += delta.len();
        self.parts.push(delta);
    }

    /// Number of deltas received
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Total byte length of the joined text
    pub fn text_len(&self) -> usize {
        self.total_len
    }

    pub fn join(self) -> String {
        let mut text = String::with_capacity(self.total_len);
        for part in self.parts {
            text.push_str(&part);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_in_arrival_order() {
        let mut acc = ResponseAccumulator::new();
        acc.push("Hello".to_string());
        acc.push(" ".to_string());
        acc.push("world".to_string());
        acc.push(" world".to_string());

        assert_eq!(acc.len(), 4);
        assert_eq!(acc.text_len(), 17);
        assert_eq!(acc.join(), "Hello world world");
    }

    #[test]
    fn test_empty_deltas_are_kept() {
        let mut acc = ResponseAccumulator::new();
        assert!(acc.is_empty());
        acc.push(String::new());
        assert_eq!(acc.len(), 1);
        assert_eq!(acc.join(), "");
    }
}
