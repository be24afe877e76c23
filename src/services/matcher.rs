use regex::bytes::Regex;

/// One reference found in a file's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence<'a> {
    /// Full matched text, e.g. `process.env.API_URL`
    pub matched: &'a str,
    /// Referenced variable name, e.g. `API_URL`
    pub name: &'a str,
    /// Byte offset of the match start
    pub offset: usize,
}

impl Occurrence<'_> {
    /// Byte offset one past the end of the match.
    pub fn end(&self) -> usize {
        self.offset + self.matched.len()
    }
}

/// Finds `<prefix>.<IDENTIFIER>` references in raw file bytes.
///
/// The identifier is a run of ASCII letters, digits and underscores closed by
/// a word boundary, so `process.env.API_URL_V2` is never split into `API_URL`.
/// Content outside a match may be any bytes, valid UTF-8 or not.
#[derive(Debug, Clone)]
pub struct ReferenceMatcher {
    pattern: Regex,
}

impl ReferenceMatcher {
    /// Compile the matcher for a namespace prefix such as `process.env`.
    pub fn new(prefix: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"{}\.((?-u:\w)+)(?-u:\b)",
            regex::escape(prefix)
        ))?;
        Ok(Self { pattern })
    }

    /// Lazily scan `content` left to right. Each call starts a fresh scan.
    pub fn scan<'a>(&self, content: &'a [u8]) -> impl Iterator<Item = Occurrence<'a>> {
        self.pattern.captures_iter(content).filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            // Prefix is a &str and the identifier is ASCII, so both decode
            Some(Occurrence {
                matched: std::str::from_utf8(whole.as_bytes()).ok()?,
                name: std::str::from_utf8(name.as_bytes()).ok()?,
                offset: whole.start(),
            })
        })
    }
}

/// Convert a byte offset into a 1-based `(line, column)` pair.
///
/// `\n` starts a new line, `\r` is ignored so CRLF files report the same
/// coordinates as LF files, and every other character advances the column.
/// Invalid UTF-8 sequences count as one character each.
pub fn resolve_position(content: &[u8], offset: usize) -> (usize, usize) {
    let prefix = String::from_utf8_lossy(content.get(..offset).unwrap_or(content));
    let mut line = 1;
    let mut column = 1;

    for ch in prefix.chars() {
        match ch {
            '\n' => {
                line += 1;
                column = 1;
            }
            '\r' => {}
            _ => column += 1,
        }
    }

    (line, column)
}
