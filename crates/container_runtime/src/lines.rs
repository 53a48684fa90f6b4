/// Reassembles newline-delimited text from arbitrarily split chunks.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: String,
}

impl LineBuffer {
    /// Appends `chunk` and returns every line it completed, without terminators.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.pending.push_str(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.find('\n') {
            let mut line: String = self.pending.drain(..=pos).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }

    /// Returns the trailing partial line, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LineBuffer;

    #[test]
    fn joins_lines_split_across_chunks() {
        let mut buffer = LineBuffer::default();
        assert!(buffer.push("Ready").is_empty());
        assert_eq!(buffer.push(".\r\nnext li"), vec!["Ready.".to_string()]);
        assert_eq!(
            buffer.push("ne\n\nlast"),
            vec!["next line".to_string(), String::new()]
        );
        assert_eq!(buffer.finish().as_deref(), Some("last"));
        assert_eq!(buffer.finish(), None);
    }
}
