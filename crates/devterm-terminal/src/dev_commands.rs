//! Development mode: calc, convert, json, uuid, hash, encode, decode, regex,
//! encrypt, decrypt.

use devterm_types::error::{DevtermError, Result};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment, OutputLine};
use crate::session::Mode;

pub fn register_dev_commands(reg: &mut CommandRegistry) {
    reg.register(Mode::Development, Box::new(CalcCmd));
    reg.register(Mode::Development, Box::new(ConvertCmd));
    reg.register(Mode::Development, Box::new(JsonCmd));
    reg.register(Mode::Development, Box::new(UuidCmd));
    reg.register(Mode::Development, Box::new(HashCmd));
    reg.register(Mode::Development, Box::new(EncodeCmd));
    reg.register(Mode::Development, Box::new(DecodeCmd));
    reg.register(Mode::Development, Box::new(RegexCmd));
    reg.register(Mode::Development, Box::new(CaesarCmd { decrypt: false }));
    reg.register(Mode::Development, Box::new(CaesarCmd { decrypt: true }));
}

// ---------------------------------------------------------------------------
// calc
// ---------------------------------------------------------------------------

struct CalcCmd;
impl Command for CalcCmd {
    fn name(&self) -> &str {
        "calc"
    }
    fn description(&self) -> &str {
        "Calculate math expression (e.g., calc 2+2)"
    }
    fn usage(&self) -> &str {
        "calc <expression>"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let expr = args.concat();
        if expr
            .chars()
            .any(|c| !(c.is_ascii_digit() || c.is_whitespace() || "+-*/().".contains(c)))
        {
            return Err(DevtermError::usage("Error: Invalid characters in expression"));
        }
        let value = eval_expr(&expr).map_err(|e| {
            log::debug!("calc '{expr}': {e}");
            DevtermError::usage("Error: Invalid expression")
        })?;
        Ok(CommandOutput::Text(value.to_string()))
    }
}

/// Maximum nesting depth for parenthesised sub-expressions.
const EXPR_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Op(char),
}

/// Evaluate `+ - * /` with parentheses and unary minus.
fn eval_expr(input: &str) -> std::result::Result<f64, String> {
    let tokens = tokenize(input)?;
    let mut pos = 0;
    let value = parse_sum(&tokens, &mut pos, 0)?;
    if let Some(t) = tokens.get(pos) {
        return Err(format!("unexpected token {t:?}"));
    }
    if !value.is_finite() {
        return Err("result is not finite".to_string());
    }
    Ok(value)
}

fn tokenize(input: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
        } else if ch.is_ascii_digit() || ch == '.' {
            let mut num = String::new();
            while let Some(&c) = chars.peek().filter(|c| c.is_ascii_digit() || **c == '.') {
                num.push(c);
                chars.next();
            }
            let n = num.parse().map_err(|_| format!("bad number {num}"))?;
            tokens.push(Token::Num(n));
        } else if "+-*/()".contains(ch) {
            tokens.push(Token::Op(ch));
            chars.next();
        } else {
            return Err(format!("unexpected character {ch}"));
        }
    }
    Ok(tokens)
}

fn peek_op(tokens: &[Token], pos: usize) -> Option<char> {
    match tokens.get(pos) {
        Some(Token::Op(c)) => Some(*c),
        _ => None,
    }
}

fn parse_sum(tokens: &[Token], pos: &mut usize, depth: usize) -> std::result::Result<f64, String> {
    let mut left = parse_product(tokens, pos, depth)?;
    while let Some(op @ ('+' | '-')) = peek_op(tokens, *pos) {
        *pos += 1;
        let right = parse_product(tokens, pos, depth)?;
        left = if op == '+' { left + right } else { left - right };
    }
    Ok(left)
}

fn parse_product(
    tokens: &[Token],
    pos: &mut usize,
    depth: usize,
) -> std::result::Result<f64, String> {
    let mut left = parse_unary(tokens, pos, depth)?;
    while let Some(op @ ('*' | '/')) = peek_op(tokens, *pos) {
        *pos += 1;
        let right = parse_unary(tokens, pos, depth)?;
        left = if op == '*' { left * right } else { left / right };
    }
    Ok(left)
}

fn parse_unary(tokens: &[Token], pos: &mut usize, depth: usize) -> std::result::Result<f64, String> {
    match peek_op(tokens, *pos) {
        Some('-') => {
            *pos += 1;
            Ok(-parse_unary(tokens, pos, depth)?)
        },
        Some('+') => {
            *pos += 1;
            parse_unary(tokens, pos, depth)
        },
        _ => parse_primary(tokens, pos, depth),
    }
}

fn parse_primary(
    tokens: &[Token],
    pos: &mut usize,
    depth: usize,
) -> std::result::Result<f64, String> {
    match tokens.get(*pos) {
        None => Err("unexpected end of expression".to_string()),
        Some(Token::Num(n)) => {
            *pos += 1;
            Ok(*n)
        },
        Some(Token::Op('(')) => {
            if depth >= EXPR_MAX_DEPTH {
                return Err("expression too deeply nested".to_string());
            }
            *pos += 1;
            let value = parse_sum(tokens, pos, depth + 1)?;
            if peek_op(tokens, *pos) != Some(')') {
                return Err("missing closing parenthesis".to_string());
            }
            *pos += 1;
            Ok(value)
        },
        Some(t) => Err(format!("unexpected token {t:?}")),
    }
}

// ---------------------------------------------------------------------------
// convert
// ---------------------------------------------------------------------------

struct ConvertCmd;
impl Command for ConvertCmd {
    fn name(&self) -> &str {
        "convert"
    }
    fn description(&self) -> &str {
        "Convert currency (e.g., convert 100 USD EUR)"
    }
    fn usage(&self) -> &str {
        "convert <amount> <from> <to>"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        const USAGE: &str = "Usage: convert <amount> <from> <to> (e.g., convert 100 USD EUR)";
        let [amount, from, to, ..] = args else {
            return Err(DevtermError::usage(USAGE));
        };
        let amount: f64 = amount.parse().map_err(|_| DevtermError::usage(USAGE))?;
        let mut lines = vec![OutputLine::system(format!(
            "Converting {amount} {from} to {to}..."
        ))];
        match env.network.exchange_rate(from, to) {
            Ok(rate) => lines.push(OutputLine::plain(format!(
                "{amount} {} = {:.2} {} (Rate: {rate})",
                from.to_uppercase(),
                amount * rate,
                to.to_uppercase()
            ))),
            Err(e) => {
                log::warn!("exchange rate {from}->{to}: {e}");
                lines.push(OutputLine::error("Error: Could not fetch exchange rate."));
            },
        }
        Ok(CommandOutput::Lines(lines))
    }
}

// ---------------------------------------------------------------------------
// json / uuid / hash
// ---------------------------------------------------------------------------

struct JsonCmd;
impl Command for JsonCmd {
    fn name(&self) -> &str {
        "json"
    }
    fn description(&self) -> &str {
        "Format JSON string"
    }
    fn usage(&self) -> &str {
        "json [format] <text>"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let args = match args {
            ["format", rest @ ..] => rest,
            _ => args,
        };
        let invalid = || DevtermError::usage("Error: Invalid JSON string");
        let value: serde_json::Value = serde_json::from_str(&args.join(" ")).map_err(|_| invalid())?;
        let pretty = serde_json::to_string_pretty(&value).map_err(|_| invalid())?;
        Ok(CommandOutput::Text(pretty))
    }
}

struct UuidCmd;
impl Command for UuidCmd {
    fn name(&self) -> &str {
        "uuid"
    }
    fn description(&self) -> &str {
        "Generate UUID"
    }
    fn usage(&self) -> &str {
        "uuid"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut bytes = [0u8; 16];
        for b in &mut bytes {
            *b = (env.rng.next_u32() >> 24) as u8;
        }
        // version 4, RFC 4122 variant
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        Ok(CommandOutput::Text(format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        )))
    }
}

const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// 32-bit string hash (`h * 31 + unit` over UTF-16 units) stretched to a
/// 64-char hex digest. Not cryptographic.
fn pseudo_sha256(text: &str) -> String {
    if text.is_empty() {
        return EMPTY_SHA256.to_string();
    }
    let hash = text
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit)));
    let hex = format!("{:x}", i64::from(hash).abs());
    hex.repeat(8).chars().take(64).collect()
}

struct HashCmd;
impl Command for HashCmd {
    fn name(&self) -> &str {
        "hash"
    }
    fn description(&self) -> &str {
        "Simulate SHA-256 hash"
    }
    fn usage(&self) -> &str {
        "hash <text>"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(pseudo_sha256(&args.join(" "))))
    }
}

// ---------------------------------------------------------------------------
// encode / decode
// ---------------------------------------------------------------------------

const B64_CHARS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn base64_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);
    for chunk in data.chunks(3) {
        let b = [chunk[0], *chunk.get(1).unwrap_or(&0), *chunk.get(2).unwrap_or(&0)];
        let triple = (u32::from(b[0]) << 16) | (u32::from(b[1]) << 8) | u32::from(b[2]);
        for i in 0..4 {
            if i <= chunk.len() {
                out.push(B64_CHARS[((triple >> (18 - 6 * i)) & 0x3f) as usize] as char);
            } else {
                out.push('=');
            }
        }
    }
    out
}

/// Strict decode: whitespace is skipped, padding only at the end, output
/// must be UTF-8.
fn base64_decode(input: &str) -> Option<String> {
    let clean: Vec<u8> = input.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    let body = match clean.iter().position(|&b| b == b'=') {
        Some(p) if clean[p..].iter().all(|&b| b == b'=') && clean.len() - p <= 2 => &clean[..p],
        Some(_) => return None,
        None => &clean[..],
    };
    if clean.len() % 4 != 0 && clean.len() != body.len() || body.len() % 4 == 1 {
        return None;
    }
    let mut bytes = Vec::with_capacity(body.len() * 3 / 4);
    for chunk in body.chunks(4) {
        let mut acc: u32 = 0;
        for &c in chunk {
            let v = B64_CHARS.iter().position(|&x| x == c)?;
            acc = (acc << 6) | v as u32;
        }
        acc <<= 6 * (4 - chunk.len() as u32);
        let produced = chunk.len() - 1;
        for i in 0..produced {
            bytes.push((acc >> (16 - 8 * i)) as u8);
        }
    }
    String::from_utf8(bytes).ok()
}

struct EncodeCmd;
impl Command for EncodeCmd {
    fn name(&self) -> &str {
        "encode"
    }
    fn description(&self) -> &str {
        "Base64 encode"
    }
    fn usage(&self) -> &str {
        "encode <text>"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(base64_encode(args.join(" ").as_bytes())))
    }
}

struct DecodeCmd;
impl Command for DecodeCmd {
    fn name(&self) -> &str {
        "decode"
    }
    fn description(&self) -> &str {
        "Base64 decode"
    }
    fn usage(&self) -> &str {
        "decode <base64>"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        base64_decode(&args.join(" "))
            .map(CommandOutput::Text)
            .ok_or_else(|| DevtermError::usage("Error: Invalid Base64 string"))
    }
}

// ---------------------------------------------------------------------------
// regex
// ---------------------------------------------------------------------------

struct RegexCmd;
impl Command for RegexCmd {
    fn name(&self) -> &str {
        "regex"
    }
    fn description(&self) -> &str {
        "Test regex (e.g., regex pattern string)"
    }
    fn usage(&self) -> &str {
        "regex <pattern> <string>"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let [pattern, rest @ ..] = args else {
            return Err(DevtermError::usage("Usage: regex <pattern> <string>"));
        };
        if rest.is_empty() {
            return Err(DevtermError::usage("Usage: regex <pattern> <string>"));
        }
        let re = regex::Regex::new(pattern).map_err(|e| {
            log::debug!("regex '{pattern}': {e}");
            DevtermError::usage("Invalid Regex")
        })?;
        Ok(CommandOutput::Text(format!(
            "Match: {}",
            re.is_match(&rest.join(" "))
        )))
    }
}

// ---------------------------------------------------------------------------
// encrypt / decrypt
// ---------------------------------------------------------------------------

const CAESAR_SHIFT: u8 = 3;

/// Rotate ASCII letters by `shift` places, keeping case.
fn caesar(text: &str, shift: u8) -> String {
    text.chars()
        .map(|c| {
            let base = match c {
                'a'..='z' => b'a',
                'A'..='Z' => b'A',
                _ => return c,
            };
            (((c as u8 - base + shift) % 26) + base) as char
        })
        .collect()
}

struct CaesarCmd {
    decrypt: bool,
}
impl Command for CaesarCmd {
    fn name(&self) -> &str {
        if self.decrypt { "decrypt" } else { "encrypt" }
    }
    fn description(&self) -> &str {
        if self.decrypt {
            "Decrypt text (Caesar cipher)"
        } else {
            "Encrypt text (Caesar cipher)"
        }
    }
    fn usage(&self) -> &str {
        if self.decrypt { "decrypt <text>" } else { "encrypt <text>" }
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let shift = if self.decrypt {
            26 - CAESAR_SHIFT
        } else {
            CAESAR_SHIFT
        };
        Ok(CommandOutput::Text(caesar(&args.join(" "), shift)))
    }
}
