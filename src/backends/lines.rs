//! Byte stream to console lines
//!
//! Backends redraw progress with bare `\r`, so a `\r` ends a transient line
//! and `\n` (or `\r\n`) ends a permanent one. Only permanent lines belong in
//! an operation's recorded output; transient ones are still shown live.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub text: String,
    /// `true` when terminated by `\n`, `false` for a `\r` redraw
    pub is_newline: bool,
}

#[derive(Debug, Default)]
pub struct LineSplitter {
    buf: Vec<u8>,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes, returning every line completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<ConsoleLine> {
        self.buf.extend_from_slice(bytes);
        let mut lines = Vec::new();

        loop {
            let Some(pos) = self.buf.iter().position(|b| *b == b'\n' || *b == b'\r') else {
                break;
            };

            if self.buf[pos] == b'\r' {
                // Wait for the next byte to tell `\r\n` from a redraw
                if pos + 1 == self.buf.len() {
                    break;
                }
                if self.buf[pos + 1] == b'\n' {
                    let text = decode(&self.buf[..pos]);
                    self.buf.drain(..pos + 2);
                    lines.push(ConsoleLine { text, is_newline: true });
                    continue;
                }
                let text = decode(&self.buf[..pos]);
                self.buf.drain(..pos + 1);
                if !text.trim().is_empty() {
                    lines.push(ConsoleLine { text, is_newline: false });
                }
                continue;
            }

            let text = decode(&self.buf[..pos]);
            self.buf.drain(..pos + 1);
            lines.push(ConsoleLine { text, is_newline: true });
        }

        lines
    }

    /// Flush whatever is left once the stream closed.
    pub fn finish(&mut self) -> Option<ConsoleLine> {
        let rest = std::mem::take(&mut self.buf);
        let text = decode(&rest);
        let text = text.trim_end_matches('\r').to_string();
        (!text.trim().is_empty()).then_some(ConsoleLine {
            text,
            is_newline: true,
        })
    }
}

/// Permissive decoding: invalid UTF-8 becomes U+FFFD, never an error.
fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
