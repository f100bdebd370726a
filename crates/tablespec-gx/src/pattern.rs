//! Sample value synthesis from a regular-expression subset.
//!
//! Supported: `\d`, `\.`, escaped punctuation, bracket classes built from the
//! `A-Z` / `a-z` / `0-9` range markers or literal characters, parenthesized
//! groups, and the quantifiers `{n}`, `{n,}`, `{n,m}`, `+` and `?` on any of
//! those or on a plain character. `+` repeats a class, `\d` or character 3 to
//! 10 times and a group 1 to 3 times. Anchors are stripped. `.`, `*` and `|` are
//! dropped. Nothing here fails: malformed fragments are skipped or emitted as
//! literal text. Repetition stops once the output reaches [`MAX_SAMPLE_LEN`]
//! bytes.

use rand::Rng;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";

/// Returned for an empty class body such as `[]`.
pub const EMPTY_CLASS_CHAR: char = 'X';

/// Extra repetitions allowed above the minimum of an open `{n,}` range.
pub const OPEN_RANGE_WINDOW: usize = 5;

/// Upper bound on any single repetition count.
pub const MAX_REPEAT: usize = 1_000;

/// Groups nested deeper than this produce no output.
pub const MAX_GROUP_DEPTH: usize = 64;

/// Repetition stops once a sample reaches this many bytes.
pub const MAX_SAMPLE_LEN: usize = 100_000;

/// What a quantifier is attached to; `+` ranges differ between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    /// A bracket class, `\d` or a single character; `+` repeats it 3 to 10 times.
    Atom,
    /// A parenthesized group; `+` repeats its sample 1 to 3 times.
    Group,
}

impl Unit {
    fn plus_range(self) -> (usize, usize) {
        match self {
            Unit::Atom => (3, 10),
            Unit::Group => (1, 3),
        }
    }
}

/// Generate a value matching `pattern` using the thread-local RNG.
pub fn generate_sample(pattern: &str) -> String {
    generate_sample_with(pattern, &mut rand::rng())
}

/// Generate a value matching `pattern` with the supplied RNG.
pub fn generate_sample_with<R: Rng + ?Sized>(pattern: &str, rng: &mut R) -> String {
    let body = pattern.trim_matches(|ch| ch == '^' || ch == '$');
    let chars: Vec<char> = body.chars().collect();
    let len = chars.len();
    let mut engine = Engine {
        closing_paren: closing_parens(&chars),
        next_bracket: next_occurrence(&chars, ']'),
        next_brace: next_occurrence(&chars, '}'),
        chars,
        rng,
        depth: 0,
    };
    engine.generate(0, len)
}

/// Draw one character satisfying a bracket-class body such as `A-Za-z0-9`.
///
/// Only the `A-Z`, `a-z` and `0-9` markers and the `\d` escape are
/// recognized; each one present adds its range to the pool. A body without
/// markers draws from its own literal characters, with escape backslashes
/// removed.
pub fn sample_char<R: Rng + ?Sized>(class_body: &str, rng: &mut R) -> char {
    let (literal, has_digit_escape) = class_literals(class_body);

    let mut pool: Vec<u8> = Vec::new();
    if class_body.contains("A-Z") {
        pool.extend_from_slice(UPPERCASE);
    }
    if class_body.contains("a-z") {
        pool.extend_from_slice(LOWERCASE);
    }
    if class_body.contains("0-9") || has_digit_escape {
        pool.extend_from_slice(DIGITS);
    }
    if !pool.is_empty() {
        return char::from(pool[rng.random_range(0..pool.len())]);
    }

    if literal.is_empty() {
        return EMPTY_CLASS_CHAR;
    }
    literal[rng.random_range(0..literal.len())]
}

/// Unescaped literal characters of a class body, and whether it holds `\d`.
fn class_literals(class_body: &str) -> (Vec<char>, bool) {
    let mut literal = Vec::new();
    let mut has_digit_escape = false;
    let mut chars = class_body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            literal.push(ch);
            continue;
        }
        match chars.next() {
            Some('d') => has_digit_escape = true,
            Some(escaped) => literal.push(escaped),
            None => {}
        }
    }
    (literal, has_digit_escape)
}

struct Engine<'r, R: ?Sized> {
    chars: Vec<char>,
    /// Index of the `)` closing each `(`, when balanced.
    closing_paren: Vec<Option<usize>>,
    /// Index of the first `]` at or after each position.
    next_bracket: Vec<Option<usize>>,
    /// Index of the first `}` at or after each position.
    next_brace: Vec<Option<usize>>,
    rng: &'r mut R,
    depth: usize,
}

impl<R: Rng + ?Sized> Engine<'_, R> {
    /// Generate output for `chars[start..end]`.
    fn generate(&mut self, start: usize, end: usize) -> String {
        let mut out = String::new();
        let mut pos = start;

        while pos < end {
            match self.chars[pos] {
                '\\' if pos + 1 < end => match self.chars[pos + 1] {
                    'd' => {
                        let (count, next) = self.quantifier(pos + 2, end, Unit::Atom);
                        for _ in 0..count {
                            if out.len() >= MAX_SAMPLE_LEN {
                                break;
                            }
                            out.push(char::from(DIGITS[self.rng.random_range(0..DIGITS.len())]));
                        }
                        pos = next;
                    }
                    escaped if !escaped.is_ascii_alphanumeric() => {
                        pos = self.repeat_literal(escaped, pos + 2, end, &mut out);
                    }
                    // Unknown letter escapes such as `\w` fall through as text.
                    _ => {
                        out.push('\\');
                        pos += 1;
                    }
                },
                '[' => {
                    let Some(close) = self.next_bracket[pos].filter(|close| *close < end) else {
                        pos += 1;
                        continue;
                    };
                    let body: String = self.chars[pos + 1..close].iter().collect();
                    let (count, next) = self.quantifier(close + 1, end, Unit::Atom);
                    for _ in 0..count {
                        if out.len() >= MAX_SAMPLE_LEN {
                            break;
                        }
                        out.push(sample_char(&body, &mut *self.rng));
                    }
                    pos = next;
                }
                '(' => {
                    let Some(close) = self.closing_paren[pos].filter(|close| *close < end) else {
                        pos += 1;
                        continue;
                    };
                    let group = if self.depth < MAX_GROUP_DEPTH {
                        self.depth += 1;
                        let group = self.generate(pos + 1, close);
                        self.depth -= 1;
                        group
                    } else {
                        String::new()
                    };
                    let (count, next) = self.quantifier(close + 1, end, Unit::Group);
                    for _ in 0..count {
                        if out.len() >= MAX_SAMPLE_LEN {
                            break;
                        }
                        out.push_str(&group);
                    }
                    pos = next;
                }
                '.' | '*' | '|' => pos += 1,
                literal => pos = self.repeat_literal(literal, pos + 1, end, &mut out),
            }
        }

        out
    }

    /// Emit `literal` as many times as the quantifier at `pos` asks for.
    fn repeat_literal(&mut self, literal: char, pos: usize, end: usize, out: &mut String) -> usize {
        let (count, next) = self.quantifier(pos, end, Unit::Atom);
        for _ in 0..count {
            if out.len() >= MAX_SAMPLE_LEN {
                break;
            }
            out.push(literal);
        }
        next
    }

    /// Resolve the quantifier starting at `pos`, returning the repetition
    /// count and the position scanning resumes from.
    fn quantifier(&mut self, pos: usize, end: usize, unit: Unit) -> (usize, usize) {
        if pos >= end {
            return (1, pos);
        }
        match self.chars[pos] {
            '{' => {
                let Some(close) = self.next_brace[pos].filter(|close| *close < end) else {
                    return (1, pos);
                };
                let body: String = self.chars[pos + 1..close].iter().collect();
                match parse_bounds(&body) {
                    Some(Bounds::Exact(count)) => (count.min(MAX_REPEAT), close + 1),
                    Some(Bounds::Range(min, max)) => {
                        (self.rng.random_range(min..=max).min(MAX_REPEAT), close + 1)
                    }
                    None => (1, pos),
                }
            }
            '+' => {
                let (min, max) = unit.plus_range();
                (self.rng.random_range(min..=max), pos + 1)
            }
            '?' => (self.rng.random_range(0..=1), pos + 1),
            _ => (1, pos),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bounds {
    Exact(usize),
    Range(usize, usize),
}

/// Parse the inside of `{...}`. Returns `None` for anything malformed,
/// including inverted ranges.
fn parse_bounds(body: &str) -> Option<Bounds> {
    let Some((min, rest)) = body.split_once(',') else {
        return body.trim().parse().ok().map(Bounds::Exact);
    };
    let min: usize = min.trim().parse().ok()?;
    let max = rest.split(',').next().unwrap_or_default().trim();
    if max.is_empty() {
        return Some(Bounds::Range(min, min.saturating_add(OPEN_RANGE_WINDOW)));
    }
    let max: usize = max.parse().ok()?;
    (min <= max).then_some(Bounds::Range(min, max))
}

/// For each position, the index of the first `needle` at or after it.
fn next_occurrence(chars: &[char], needle: char) -> Vec<Option<usize>> {
    let mut next = vec![None; chars.len()];
    let mut upcoming = None;
    for (idx, ch) in chars.iter().enumerate().rev() {
        if *ch == needle {
            upcoming = Some(idx);
        }
        next[idx] = upcoming;
    }
    next
}

/// Pair every `(` with its closing `)`, honoring nesting and escapes.
/// Unbalanced parentheses stay unpaired.
fn closing_parens(chars: &[char]) -> Vec<Option<usize>> {
    let mut closing = vec![None; chars.len()];
    let mut open = Vec::new();
    let mut pos = 0;
    while pos < chars.len() {
        match chars[pos] {
            '\\' => pos += 1,
            '(' => open.push(pos),
            ')' => {
                if let Some(start) = open.pop() {
                    closing[start] = Some(pos);
                }
            }
            _ => {}
        }
        pos += 1;
    }
    closing
}
