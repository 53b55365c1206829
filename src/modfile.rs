/*============================================================
  Synavera Project: Depsize
  Module: depsize_core::modfile
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Parse go.mod manifests served by the module proxy into
    requirement and replacement directives.

  Security / Safety Notes:
    Operates on in-memory bytes only; local replacement paths
    are recorded as text and never touched on disk.

  Dependencies:
    None beyond std.

  Operational Scope:
    Feeds the dependency resolver through the ManifestParser
    seam so tests can supply synthetic manifests.

  Revision History:
    2025-11-12 COD  Authored go.mod parser.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Structured parsing with clear failure modes
    - Line-accurate diagnostics
    - Grammar isolated behind a narrow trait
============================================================*/

use crate::error::{DepsizeError, Result};
use crate::module::ModuleVersion;

/// Parsed view of a go.mod document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub module: Option<String>,
    pub go_version: Option<String>,
    pub requirements: Vec<Requirement>,
    pub replacements: Vec<Replacement>,
    pub excludes: Vec<ModuleVersion>,
}

/// A `require` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub module: ModuleVersion,
    pub indirect: bool,
}

/// A `replace` entry. `old.version` is empty when the directive applies to
/// every version of the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub old: ModuleVersion,
    pub new: ReplacementTarget,
}

/// Right-hand side of a replace directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplacementTarget {
    /// Another module fetched through the proxy.
    Module(ModuleVersion),
    /// A filesystem directory; carries no proxy-visible size.
    Local(String),
}

/// Turns raw manifest bytes into a [`Manifest`].
pub trait ManifestParser: Send + Sync {
    fn parse(&self, data: &[u8]) -> Result<Manifest>;
}

/// Parser for the go.mod grammar.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoModParser;

impl ManifestParser for GoModParser {
    fn parse(&self, data: &[u8]) -> Result<Manifest> {
        parse_go_mod(data)
    }
}

const REPLACE_USAGE: &str = "usage: replace module/path [v1.2.3] => other/module v1.4\n\t or replace module/path [v1.2.3] => ../local/directory";

/// Parse a go.mod document.
pub fn parse_go_mod(data: &[u8]) -> Result<Manifest> {
    let text = std::str::from_utf8(data).map_err(|err| {
        let line = data[..err.valid_up_to()]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1;
        parse_error(line, "invalid UTF-8")
    })?;

    let mut manifest = Manifest::default();
    let mut block: Option<(String, usize)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = tokenize(raw, line_no)?;
        if line.tokens.is_empty() {
            continue;
        }

        if block.is_some() && line.tokens == [")"] {
            block = None;
            continue;
        }
        if let Some((verb, _)) = &block {
            if line.tokens.iter().any(|t| t == "(" || t == ")") {
                return Err(parse_error(line_no, "unexpected parenthesis inside block"));
            }
            apply_directive(&mut manifest, verb, &line, 0, line_no)?;
            continue;
        }

        let verb = line.tokens[0].clone();
        let args = &line.tokens[1..];
        match args {
            [open] if open == "(" => {
                if !is_block_verb(&verb) {
                    return Err(parse_error(
                        line_no,
                        format!("{verb} does not support a block form"),
                    ));
                }
                block = Some((verb, line_no));
            }
            [open, close] if open == "(" && close == ")" => {
                if !is_block_verb(&verb) {
                    return Err(parse_error(
                        line_no,
                        format!("{verb} does not support a block form"),
                    ));
                }
            }
            _ => apply_directive(&mut manifest, &verb, &line, 1, line_no)?,
        }
    }

    if let Some((verb, opened)) = block {
        return Err(parse_error(opened, format!("unterminated {verb} block")));
    }

    Ok(manifest)
}

/// Reports whether `path` names a filesystem directory rather than a module.
pub fn is_local_path(path: &str) -> bool {
    if path == "." || path == ".." {
        return true;
    }
    if ["./", "../", "/", ".\\", "..\\", "\\"]
        .iter()
        .any(|prefix| path.starts_with(prefix))
    {
        return true;
    }
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn is_block_verb(verb: &str) -> bool {
    matches!(
        verb,
        "require" | "exclude" | "replace" | "retract" | "tool" | "ignore" | "godebug"
    )
}

/// Canonical form of a semantic version tag: `v1` and `v1.2` gain zero
/// components, build metadata is dropped except `+incompatible`. `None` when
/// the tag is not a valid semantic version.
pub fn canonical_version(version: &str) -> Option<String> {
    let rest = version.strip_prefix('v')?;
    let (rest, build) = match rest.split_once('+') {
        Some((rest, build)) => (rest, Some(build)),
        None => (rest, None),
    };
    let (core, prerelease) = match rest.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (rest, None),
    };

    let parts: Vec<&str> = core.split('.').collect();
    if parts.len() > 3 || !parts.iter().all(|part| is_numeric_identifier(part)) {
        return None;
    }
    if parts.len() < 3 && (prerelease.is_some() || build.is_some()) {
        return None;
    }
    if let Some(pre) = prerelease {
        let valid = pre.split('.').all(|ident| {
            let numeric = ident.bytes().all(|b| b.is_ascii_digit());
            is_identifier(ident) && (!numeric || is_numeric_identifier(ident))
        });
        if !valid {
            return None;
        }
    }
    if let Some(build) = build {
        if !build.split('.').all(is_identifier) {
            return None;
        }
    }

    let mut canonical = format!(
        "v{}.{}.{}",
        parts[0],
        parts.get(1).unwrap_or(&"0"),
        parts.get(2).unwrap_or(&"0")
    );
    if let Some(pre) = prerelease {
        canonical.push('-');
        canonical.push_str(pre);
    }
    if build == Some("incompatible") {
        canonical.push_str("+incompatible");
    }
    Some(canonical)
}

fn is_numeric_identifier(part: &str) -> bool {
    !part.is_empty()
        && part.bytes().all(|b| b.is_ascii_digit())
        && (part == "0" || !part.starts_with('0'))
}

fn is_identifier(ident: &str) -> bool {
    !ident.is_empty() && ident.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

fn apply_directive(
    manifest: &mut Manifest,
    verb: &str,
    line: &Line,
    skip: usize,
    line_no: usize,
) -> Result<()> {
    let args = &line.tokens[skip..];
    match verb {
        "module" => {
            let [path] = args else {
                return Err(parse_error(line_no, "usage: module module/path"));
            };
            if manifest.module.is_some() {
                return Err(parse_error(line_no, "repeated module statement"));
            }
            manifest.module = Some(path.clone());
        }
        "go" => {
            let [version] = args else {
                return Err(parse_error(line_no, "usage: go 1.23"));
            };
            manifest.go_version = Some(version.clone());
        }
        "require" => {
            let module = parse_module_version(verb, args, line_no)?;
            manifest.requirements.push(Requirement {
                module,
                indirect: line.is_indirect(),
            });
        }
        "exclude" => {
            let module = parse_module_version(verb, args, line_no)?;
            manifest.excludes.push(module);
        }
        "replace" => {
            let replacement = parse_replacement(args, line_no)?;
            manifest.replacements.push(replacement);
        }
        "toolchain" | "tool" | "ignore" | "godebug" => {
            if args.len() != 1 {
                return Err(parse_error(line_no, format!("usage: {verb} <value>")));
            }
        }
        "retract" => {
            if args.is_empty() {
                return Err(parse_error(line_no, "usage: retract version or retract [low, high]"));
            }
        }
        _ => return Err(parse_error(line_no, format!("unknown directive: {verb}"))),
    }
    Ok(())
}

fn parse_module_version(verb: &str, args: &[String], line_no: usize) -> Result<ModuleVersion> {
    let [path, version] = args else {
        return Err(parse_error(line_no, format!("usage: {verb} module/path v1.2.3")));
    };
    if path.is_empty() {
        return Err(parse_error(line_no, "empty module path"));
    }
    let version = check_version(path, version, line_no)?;
    Ok(ModuleVersion::new(path.clone(), version))
}

fn parse_replacement(args: &[String], line_no: usize) -> Result<Replacement> {
    let arrow = args
        .iter()
        .position(|token| token == "=>")
        .ok_or_else(|| parse_error(line_no, REPLACE_USAGE))?;
    let (lhs, rhs) = (&args[..arrow], &args[arrow + 1..]);

    let old = match lhs {
        [path] => ModuleVersion::new(path.clone(), ""),
        [path, version] => {
            let version = check_version(path, version, line_no)?;
            ModuleVersion::new(path.clone(), version)
        }
        _ => return Err(parse_error(line_no, REPLACE_USAGE)),
    };

    let new = match rhs {
        [path] if is_local_path(path) => ReplacementTarget::Local(path.clone()),
        [_] => {
            return Err(parse_error(
                line_no,
                "replacement module without version must be directory path (rooted or starting with ./ or ../)",
            ))
        }
        [path, _] if is_local_path(path) => {
            return Err(parse_error(
                line_no,
                "replacement module directory path must not have version",
            ))
        }
        [path, version] => {
            let version = check_version(path, version, line_no)?;
            ReplacementTarget::Module(ModuleVersion::new(path.clone(), version))
        }
        _ => return Err(parse_error(line_no, REPLACE_USAGE)),
    };

    Ok(Replacement { old, new })
}

fn check_version(path: &str, version: &str, line_no: usize) -> Result<String> {
    canonical_version(version).ok_or_else(|| {
        parse_error(
            line_no,
            format!("{path}: invalid version {version:?}: must be of the form v1.2.3"),
        )
    })
}

fn parse_error(line: usize, message: impl Into<String>) -> DepsizeError {
    DepsizeError::ManifestParse {
        line,
        message: message.into(),
    }
}

/// One lexed line: its tokens and any trailing `//` comment.
#[derive(Debug, Default)]
struct Line {
    tokens: Vec<String>,
    comment: Option<String>,
}

impl Line {
    fn is_indirect(&self) -> bool {
        self.comment
            .as_deref()
            .is_some_and(|c| c == "indirect" || c.starts_with("indirect;"))
    }
}

fn tokenize(raw: &str, line_no: usize) -> Result<Line> {
    let mut line = Line::default();
    let mut current = String::new();
    let mut chars = raw.chars().peekable();

    fn flush(current: &mut String, tokens: &mut Vec<String>) {
        if !current.is_empty() {
            tokens.push(std::mem::take(current));
        }
    }

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                chars.next();
                flush(&mut current, &mut line.tokens);
                let comment: String = chars.by_ref().collect();
                line.comment = Some(comment.trim().to_string());
                break;
            }
            '=' if chars.peek() == Some(&'>') => {
                chars.next();
                flush(&mut current, &mut line.tokens);
                line.tokens.push("=>".into());
            }
            '(' | ')' => {
                flush(&mut current, &mut line.tokens);
                line.tokens.push(c.to_string());
            }
            '"' => {
                flush(&mut current, &mut line.tokens);
                let mut quoted = String::new();
                let mut closed = false;
                while let Some(q) = chars.next() {
                    match q {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some('n') => quoted.push('\n'),
                            Some('t') => quoted.push('\t'),
                            Some(other) => quoted.push(other),
                            None => break,
                        },
                        other => quoted.push(other),
                    }
                }
                if !closed {
                    return Err(parse_error(line_no, "unterminated quoted string"));
                }
                line.tokens.push(quoted);
            }
            '`' => {
                flush(&mut current, &mut line.tokens);
                let mut quoted = String::new();
                let mut closed = false;
                for q in chars.by_ref() {
                    if q == '`' {
                        closed = true;
                        break;
                    }
                    quoted.push(q);
                }
                if !closed {
                    return Err(parse_error(line_no, "unterminated raw string"));
                }
                line.tokens.push(quoted);
            }
            c if c.is_whitespace() => flush(&mut current, &mut line.tokens),
            other => current.push(other),
        }
    }
    flush(&mut current, &mut line.tokens);

    Ok(line)
}
