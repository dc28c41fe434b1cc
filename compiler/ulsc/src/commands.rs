//! Command handlers for the `uls` CLI.
//!
//! Every handler reports failures on stderr and exits with status 1.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::sync::Arc;

use uls_lexer::presets::{self, Css3Lexer, CSS_PATH};
use uls_lexer::{
    read_records, record_tokens, write_records, CommentFlags, EscapeMap, LexSpec, Lexer,
    QuoteDef, Reserved, Source, TokenId, TokenKind, TokenSource,
};

/// Specification names accepted by `--preset`.
pub const PRESETS: &[&str] = &["plain", "css3"];

fn fail(msg: &str) -> ! {
    eprintln!("error: {msg}");
    std::process::exit(1);
}

/// Specification for a preset name.
pub fn spec_for(name: &str) -> Option<Arc<LexSpec>> {
    let builder = match name {
        "css3" => presets::css3(),
        "plain" => LexSpec::builder("plain")
            .quote(QuoteDef::new("\"", "\"").escapes(EscapeMap::legacy_full()))
            .quote(QuoteDef::new("'", "'").escapes(EscapeMap::legacy_full()))
            .comment("/*", "*/", CommentFlags::empty())
            .line_comment("//")
            .radix_prefix("0x", 16)
            .radix_prefix("0b", 2),
        _ => return None,
    };
    match builder.build() {
        Ok(spec) => Some(spec),
        Err(err) => fail(&format!("preset '{name}' is invalid: {err}")),
    }
}

/// A lexer with the handling its preset needs.
enum Driver {
    Plain(Lexer),
    Css3(Css3Lexer),
}

impl Driver {
    fn new(spec: Arc<LexSpec>) -> Self {
        if spec.name() == "css3" {
            Driver::Css3(Css3Lexer::new(spec))
        } else {
            Driver::Plain(Lexer::new(spec))
        }
    }

    fn next(&mut self) -> TokenId {
        match self {
            Driver::Plain(lexer) => lexer.next(),
            Driver::Css3(css) => css.next(),
        }
    }

    fn lexer(&self) -> &Lexer {
        match self {
            Driver::Plain(lexer) => lexer,
            Driver::Css3(css) => css.lexer(),
        }
    }

    fn lexer_mut(&mut self) -> &mut Lexer {
        match self {
            Driver::Plain(lexer) => lexer,
            Driver::Css3(css) => css.lexer_mut(),
        }
    }
}

impl TokenSource for Driver {
    fn next_token(&mut self) -> TokenId {
        self.next()
    }

    fn lexer(&self) -> &Lexer {
        Driver::lexer(self)
    }
}

fn open(driver: &mut Driver, path: &str) {
    if let Err(err) = driver.lexer_mut().push_file(path) {
        fail(&err.to_string());
    }
}

fn preset_spec(preset: &str) -> Arc<LexSpec> {
    spec_for(preset).unwrap_or_else(|| {
        fail(&format!(
            "unknown preset '{preset}' (expected one of: {})",
            PRESETS.join(", ")
        ))
    })
}

/// One line of a token dump.
pub fn format_token(lexer: &Lexer) -> String {
    let token = lexer.token();
    let id = token.id();
    let text = token.text();
    let name = match lexer.token_name(id) {
        Some(name) => name.to_owned(),
        None => text.clone().into_owned(),
    };
    let shown = match token.kind() {
        TokenKind::Quote => format!("\"{}\"", text.escape_debug()),
        TokenKind::Number(_) => match lexer.number_suffix() {
            Some(suffix) => format!("{text} ({suffix})"),
            None => text.into_owned(),
        },
        _ if id == CSS_PATH && lexer.spec().name() == "css3" => format!("'{text}'"),
        _ => text.into_owned(),
    };
    format!("{:>5} [{name:>7}] {shown}", token.line())
}

/// Write every token up to EOI. Returns the number written.
fn dump(driver: &mut Driver, out: &mut dyn Write) -> io::Result<usize> {
    let eoi = driver.lexer().spec().id(Reserved::Eoi);
    let mut count = 0;
    while driver.next() != eoi {
        writeln!(out, "{}", format_token(driver.lexer()))?;
        count += 1;
    }
    Ok(count)
}

/// `uls tokens [--preset NAME] FILE`
pub fn dump_tokens(path: &str, preset: &str) {
    let mut driver = Driver::new(preset_spec(preset));
    open(&mut driver, path);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match dump(&mut driver, &mut out).and_then(|n| out.flush().map(|()| n)) {
        Ok(count) => tracing::debug!(count, path, "dumped"),
        Err(err) => fail(&format!("cannot write tokens: {err}")),
    }
}

/// `uls record [--preset NAME] FILE OUT`
pub fn record_file(path: &str, output: &str, preset: &str) {
    let spec = preset_spec(preset);
    let mut driver = Driver::new(Arc::clone(&spec));
    open(&mut driver, path);
    let records = record_tokens(&mut driver);

    let file = File::create(output)
        .unwrap_or_else(|err| fail(&format!("cannot create '{output}': {err}")));
    if let Err(err) = write_records(BufWriter::new(file), spec.name(), &records) {
        fail(&format!("cannot write '{output}': {err}"));
    }
    println!("{} tokens recorded to '{output}'", records.len());
}

/// `uls replay FILE`
pub fn replay_file(path: &str) {
    let file = File::open(path).unwrap_or_else(|err| fail(&format!("cannot open '{path}': {err}")));
    let (name, records) =
        read_records(BufReader::new(file)).unwrap_or_else(|err| fail(&format!("'{path}': {err}")));
    let spec = spec_for(&name)
        .unwrap_or_else(|| fail(&format!("'{path}' was recorded with unknown preset '{name}'")));

    let mut lexer = Lexer::new(spec);
    lexer.push(Source::tokens(path, records));
    let mut driver = Driver::Plain(lexer);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if let Err(err) = dump(&mut driver, &mut out).and_then(|_| out.flush()) {
        fail(&format!("cannot write tokens: {err}"));
    }
}
