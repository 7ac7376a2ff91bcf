//! Best-effort equation typesetting over rendered text.
//!
//! Inline math is written between `$` delimiters using a small subset of TeX commands.
//! The terminal cannot lay out real equations, so [`UnicodeMath`] substitutes Greek
//! letters, operators and simple super/subscripts with their Unicode forms. Failures are
//! cosmetic: the caller keeps the untouched text.

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
/// Reason a line could not be typeset.
pub enum TypesetError {
    #[error("unbalanced math delimiter in line {line}")]
    /// A `$` was opened but never closed.
    Unbalanced {
        /// Zero-based line index.
        line: usize,
    },
}

/// A pass that rewrites rendered lines in place.
pub trait Typesetter {
    /// Typesets every line.
    ///
    /// # Errors
    ///
    /// Returns an error if a line cannot be typeset; lines may then be partially
    /// rewritten and callers should fall back to the original text.
    fn typeset(&mut self, lines: &mut [String]) -> Result<(), TypesetError>;
}

const SYMBOLS: &[(&str, &str)] = &[
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("epsilon", "ε"),
    ("theta", "θ"),
    ("lambda", "λ"),
    ("mu", "μ"),
    ("pi", "π"),
    ("sigma", "σ"),
    ("phi", "φ"),
    ("omega", "ω"),
    ("Delta", "Δ"),
    ("Sigma", "Σ"),
    ("Omega", "Ω"),
    ("sum", "∑"),
    ("prod", "∏"),
    ("int", "∫"),
    ("infty", "∞"),
    ("partial", "∂"),
    ("nabla", "∇"),
    ("sqrt", "√"),
    ("times", "×"),
    ("cdot", "·"),
    ("pm", "±"),
    ("leq", "≤"),
    ("geq", "≥"),
    ("neq", "≠"),
    ("approx", "≈"),
    ("in", "∈"),
    ("to", "→"),
];

const SUPERSCRIPTS: &str = "⁰¹²³⁴⁵⁶⁷⁸⁹";
const SUBSCRIPTS: &str = "₀₁₂₃₄₅₆₇₈₉";

fn script(c: char, table: &str) -> Option<char> {
    c.to_digit(10)
        .and_then(|digit| table.chars().nth(digit as usize))
}

#[derive(Clone, Copy, Debug, Default)]
/// Unicode substitution typesetter for `$...$` spans.
pub struct UnicodeMath;

impl UnicodeMath {
    fn render_math(source: &str) -> String {
        let mut out = String::new();
        let mut chars = source.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    let mut name = String::new();
                    while let Some(&next) = chars.peek() {
                        if !next.is_ascii_alphabetic() {
                            break;
                        }
                        name.push(next);
                        chars.next();
                    }
                    match SYMBOLS.iter().find(|(command, _)| *command == name) {
                        Some((_, symbol)) => out.push_str(symbol),
                        None => {
                            out.push('\\');
                            out.push_str(&name);
                        }
                    }
                }
                '^' | '_' => {
                    let table = if c == '^' { SUPERSCRIPTS } else { SUBSCRIPTS };
                    match chars.peek().and_then(|&next| script(next, table)) {
                        Some(scripted) => {
                            out.push(scripted);
                            chars.next();
                        }
                        None => out.push(c),
                    }
                }
                _ => out.push(c),
            }
        }
        out
    }

    fn typeset_line(line: &str, index: usize) -> Result<String, TypesetError> {
        let mut out = String::with_capacity(line.len());
        let mut rest = line;
        while let Some(open) = rest.find('$') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after
                .find('$')
                .ok_or(TypesetError::Unbalanced { line: index })?;
            out.push_str(&Self::render_math(&after[..close]));
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

impl Typesetter for UnicodeMath {
    fn typeset(&mut self, lines: &mut [String]) -> Result<(), TypesetError> {
        for (index, line) in lines.iter_mut().enumerate() {
            if line.contains('$') {
                *line = Self::typeset_line(line, index)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/typeset.rs"]
mod tests;
