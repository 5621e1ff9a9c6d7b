/// Telegram rejects messages longer than this many characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Splits `text` into pieces of at most `limit` characters.
///
/// Pieces break between records (blank lines) where possible, then between
/// lines, and only cut inside a line when a single line is longer than
/// `limit`. Whitespace-only text yields no pieces.
pub fn chunk_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if text.trim().is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = Packer::new("\n\n", limit);
    for record in text.split("\n\n") {
        if record.chars().count() <= limit {
            if let Some(full) = current.push(record) {
                chunks.push(full);
            }
            continue;
        }
        // An oversized record gets chunks of its own.
        chunks.extend(current.finish());
        let mut pieces = split_lines(record, limit);
        if let Some(last) = pieces.pop() {
            chunks.extend(pieces);
            current.push(&last);
        }
    }
    chunks.extend(current.finish());
    chunks
}

fn split_lines(record: &str, limit: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = Packer::new("\n", limit);
    for line in record.split('\n') {
        if line.chars().count() <= limit {
            if let Some(full) = current.push(line) {
                pieces.push(full);
            }
            continue;
        }
        pieces.extend(current.finish());
        let chars: Vec<char> = line.chars().collect();
        let mut slices: Vec<String> = chars.chunks(limit).map(|c| c.iter().collect()).collect();
        if let Some(last) = slices.pop() {
            pieces.extend(slices);
            current.push(&last);
        }
    }
    pieces.extend(current.finish());
    pieces
}

/// Joins parts with `separator` until adding the next one would pass `limit`.
struct Packer {
    separator: &'static str,
    limit: usize,
    buffer: String,
    len: usize,
    started: bool,
}

impl Packer {
    fn new(separator: &'static str, limit: usize) -> Self {
        Self {
            separator,
            limit,
            buffer: String::new(),
            len: 0,
            started: false,
        }
    }

    /// Appends `part` (which must fit on its own), returning the previous
    /// buffer if it had to be flushed first.
    fn push(&mut self, part: &str) -> Option<String> {
        let part_len = part.chars().count();
        let mut flushed = None;
        if self.started && self.len + self.separator.len() + part_len > self.limit {
            flushed = self.finish();
        }
        if self.started {
            self.buffer.push_str(self.separator);
            self.len += self.separator.len();
        }
        self.buffer.push_str(part);
        self.len += part_len;
        self.started = true;
        flushed
    }

    fn finish(&mut self) -> Option<String> {
        let was_started = std::mem::replace(&mut self.started, false);
        self.len = 0;
        let buffer = std::mem::take(&mut self.buffer);
        (was_started && !buffer.trim().is_empty()).then_some(buffer)
    }
}
