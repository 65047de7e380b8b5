use regex::Regex;
use tracing::warn;

/// Characters that lose their pattern meaning when preceded by a backslash.
const ESCAPABLE: [char; 5] = ['!', '#', '*', '?', ' '];

/// Compiled predicate over a `/`-separated path relative to the scan root.
///
/// Patterns normally compile to a regular expression. If the regex engine
/// refuses the generated source (size limits on pathological input), the
/// pattern degrades to matching its body as literal text.
#[derive(Debug, Clone)]
pub enum Matcher {
    Regex(Regex),
    Literal(String),
}

impl Matcher {
    pub fn is_match(&self, path: &str) -> bool {
        match self {
            Matcher::Regex(re) => re.is_match(path),
            Matcher::Literal(text) => match path.strip_prefix(text.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }

    /// Source of the compiled matcher, useful when debugging a rule set.
    pub fn as_str(&self) -> &str {
        match self {
            Matcher::Regex(re) => re.as_str(),
            Matcher::Literal(text) => text.as_str(),
        }
    }
}

/// One user-authored ignore rule, ready to be tested against paths.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    original: String,
    body: String,
    negated: bool,
    matcher: Matcher,
}

impl CompiledPattern {
    /// The untouched source line.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Pattern text after the negation marker and a leading `\!` are resolved.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// True when the rule re-includes paths instead of excluding them.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }
}

/// Compile a single raw pattern line.
///
/// Blank lines and `#` comments yield `None`. Every other input compiles.
pub fn compile(raw: &str) -> Option<CompiledPattern> {
    let trimmed = trim_pattern(raw);
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let (negated, rest) = match trimmed.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let body = match rest.strip_prefix("\\!") {
        Some(tail) => format!("!{tail}"),
        None => rest.to_string(),
    };

    let source = translate(&tokenize(&body));
    let matcher = match Regex::new(&source) {
        Ok(re) => Matcher::Regex(re),
        Err(err) => {
            warn!(pattern = %raw, error = %err, "falling back to literal matching");
            Matcher::Literal(body.trim_matches('/').to_string())
        }
    };

    Some(CompiledPattern {
        original: raw.to_string(),
        body,
        negated,
        matcher,
    })
}

/// Compile a whole ordered list, dropping blanks and comments.
pub fn compile_all<I, S>(raws: I) -> Vec<CompiledPattern>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raws.into_iter()
        .filter_map(|raw| compile(raw.as_ref()))
        .collect()
}

/// Trim surrounding whitespace, keeping a trailing space escaped as `\ `.
fn trim_pattern(raw: &str) -> &str {
    let start = raw.trim_start();
    let trimmed = start.trim_end();
    if trimmed.ends_with('\\') && start[trimmed.len()..].starts_with(' ') {
        &start[..trimmed.len() + 1]
    } else {
        trimmed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Literal(char),
    Star,
    Question,
    Slash,
}

fn tokenize(body: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        let token = match c {
            '\\' => match chars.peek() {
                Some(&next) if ESCAPABLE.contains(&next) => {
                    chars.next();
                    Token::Literal(next)
                }
                _ => Token::Literal('\\'),
            },
            '*' => Token::Star,
            '?' => Token::Question,
            '/' => Token::Slash,
            other => Token::Literal(other),
        };
        tokens.push(token);
    }

    tokens
}

const GLOBSTAR: [Token; 2] = [Token::Star, Token::Star];
const LEADING_GLOBSTAR: [Token; 3] = [Token::Star, Token::Star, Token::Slash];

/// Build the regex source for a tokenized pattern body.
fn translate(tokens: &[Token]) -> String {
    let leading_globstar = tokens.starts_with(&LEADING_GLOBSTAR);
    let anchored = !leading_globstar && tokens.contains(&Token::Slash);

    let mut rest = tokens;
    let dir_only = rest.len() > 1 && rest.last() == Some(&Token::Slash);
    if dir_only {
        rest = &rest[..rest.len() - 1];
    }
    // `/` only anchors; a `**/` right after it still spans any depth.
    if rest.first() == Some(&Token::Slash) {
        rest = &rest[1..];
    }
    let any_depth = rest.starts_with(&LEADING_GLOBSTAR);
    if any_depth {
        rest = &rest[LEADING_GLOBSTAR.len()..];
    }

    let mut source = String::from(if anchored { "^" } else { "(?:^|/)" });
    if any_depth {
        source.push_str("(?:.*/)?");
    }

    let segments: Vec<&[Token]> = rest.split(|t| *t == Token::Slash).collect();
    let last = segments.len() - 1;
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 && *segment == GLOBSTAR {
            source.push_str(if i == last { "(?:/.*)?" } else { "(?:/.+)?" });
            continue;
        }
        if i > 0 {
            source.push('/');
        }
        push_segment(&mut source, segment);
    }

    source.push_str(if dir_only { "/.*$" } else { "(?:/.*)?$" });
    source
}

fn push_segment(source: &mut String, segment: &[Token]) {
    let mut buf = [0u8; 4];
    for token in segment {
        match token {
            Token::Literal(c) => source.push_str(&regex::escape(c.encode_utf8(&mut buf))),
            Token::Star => source.push_str("[^/]*"),
            Token::Question => source.push_str("[^/]"),
            Token::Slash => source.push('/'),
        }
    }
}
