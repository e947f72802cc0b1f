//! tagwalk: extract text from markup documents without building a tree.
//!
//! Walks a file, URL, or stdin with the forward-only scanner, printing the
//! inline text of every element that matches the name/class filters.

use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use mimalloc::MiMalloc;
use scan::{CharSource, Navigator, ReaderSource, Tag};
use serde::Serialize;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const USAGE: &str = "\
usage: tagwalk [options] <file | http(s)-url | ->

options:
  -t, --tag NAME     only elements with this tag name (case-insensitive)
  -c, --class NAME   only elements carrying this class
      --json         emit one JSON record per match instead of plain text
      --first        stop after the first match
  -o, --out FILE     write output to FILE instead of stdout
  -h, --help         show this help";

#[derive(Debug, Default)]
struct Options {
    target: String,
    tag: Option<String>,
    class: Option<String>,
    json: bool,
    first: bool,
    out: Option<PathBuf>,
}

#[derive(Serialize)]
struct MatchRecord<'a> {
    name: &'a str,
    depth: u32,
    classes: &'a [String],
    attributes: &'a [(String, String)],
    text: &'a str,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<Option<Options>, String> {
    let mut options = Options::default();
    let mut target = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-t" | "--tag" => {
                let value = args.next().ok_or("--tag requires a value")?;
                options.tag = Some(value);
            }
            "-c" | "--class" => {
                let value = args.next().ok_or("--class requires a value")?;
                options.class = Some(value);
            }
            "--json" => options.json = true,
            "--first" => options.first = true,
            "-o" | "--out" => {
                let value = args.next().ok_or("--out requires a value")?;
                options.out = Some(PathBuf::from(value));
            }
            flag if flag.starts_with('-') && flag != "-" => {
                return Err(format!("unknown option: {flag}"));
            }
            _ => {
                if target.replace(arg).is_some() {
                    return Err("expected exactly one input".to_string());
                }
            }
        }
    }
    options.target = target.ok_or("expected an input file, URL, or -")?;
    Ok(Some(options))
}

fn open_source(target: &str) -> Result<Box<dyn CharSource>, Box<dyn Error>> {
    if target == "-" {
        return Ok(Box::new(ReaderSource::new(std::io::stdin())));
    }
    if target.starts_with("http://") || target.starts_with("https://") {
        let fetched = net::fetch_text(target)?;
        if !fetched.is_markup() {
            eprintln!(
                "tagwalk: warning: {} reports content type {:?}",
                fetched.url,
                fetched.content_type.as_deref().unwrap_or("unknown")
            );
        }
        return Ok(Box::new(fetched.into_source()));
    }
    Ok(Box::new(ReaderSource::new(File::open(target)?)))
}

fn matches_filters(tag: &Tag, options: &Options) -> bool {
    if let Some(name) = &options.tag {
        if !tag.is_named(name) {
            return false;
        }
    }
    if let Some(class) = &options.class {
        if !tag.has_class(class) {
            return false;
        }
    }
    true
}

fn emit(sink: &mut dyn Write, options: &Options, tag: &Tag, text: &str) -> std::io::Result<()> {
    if options.json {
        let record = MatchRecord {
            name: tag.name(),
            depth: tag.depth(),
            classes: tag.classes(),
            attributes: tag.attributes(),
            text,
        };
        let line = serde_json::to_string(&record).expect("record serialization cannot fail");
        writeln!(sink, "{line}")
    } else {
        writeln!(sink, "{text}")
    }
}

fn run(options: &Options) -> Result<(), Box<dyn Error>> {
    let source = open_source(&options.target)?;
    let mut nav = Navigator::new(source);

    let stdout = std::io::stdout();
    let mut sink: Box<dyn Write> = match &options.out {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(stdout.lock()),
    };

    while let Some(tag) = nav.find(|tag| matches_filters(tag, options))? {
        // A self-closing match has no inner text to read.
        let text = if tag.is_closed() {
            String::new()
        } else {
            nav.inner_text(&tag)?
        };
        emit(&mut sink, options, &tag, &text)?;
        if options.first {
            break;
        }
    }
    sink.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let options = match parse_args(std::env::args().skip(1)) {
        Ok(Some(options)) => options,
        Ok(None) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("tagwalk: {message}");
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };
    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tagwalk: {err}");
            ExitCode::FAILURE
        }
    }
}
