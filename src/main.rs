use anyhow::{bail, Context};
use inkpad::config::EditorConfig;
use inkpad::notify::LogNotifier;
use inkpad::search::SearchOutcome;
use inkpad::stats::DocumentStats;
use inkpad::surface::DocumentSurface;
use inkpad::{logging, transfer, FindReplaceEngine, MemorySurface};
use std::path::{Path, PathBuf};
use std::rc::Rc;

const USAGE: &str = "\
usage: inkpad [--config <path>] <command>

commands:
  find <file> <term>                              一致箇所を表示
  replace-all <file> <term> <replacement> [--in-place]
                                                  すべて置換
  stats <file>                                    単語数・文字数
  import <text-file> [<out>]                      テキストを段落マークアップに変換
  export <file> [<out>]                           プレーンテキストとして書き出し
  print <file> [<out>]                            印刷用 HTML を生成";

enum Command {
    Find {
        file: PathBuf,
        term: String,
    },
    ReplaceAll {
        file: PathBuf,
        term: String,
        replacement: String,
        in_place: bool,
    },
    Stats {
        file: PathBuf,
    },
    Import {
        file: PathBuf,
        out: Option<PathBuf>,
    },
    Export {
        file: PathBuf,
        out: Option<PathBuf>,
    },
    Print {
        file: PathBuf,
        out: Option<PathBuf>,
    },
}

struct Options {
    config: Option<PathBuf>,
    command: Command,
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_args(&args)?;

    let config = match &options.config {
        Some(path) => EditorConfig::load(path),
        None => EditorConfig::load_default(),
    }
    .context("failed to load configuration")?;
    logging::init(&config.logging).context("failed to initialize logging")?;

    run(options.command, &config)
}

fn parse_args(args: &[String]) -> anyhow::Result<Options> {
    let mut config = None;
    let mut in_place = false;
    let mut positional: Vec<String> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let Some(path) = iter.next() else {
                    bail!("--config requires a path\n\n{}", USAGE);
                };
                config = Some(PathBuf::from(path));
            }
            "--in-place" => in_place = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            _ => positional.push(arg.clone()),
        }
    }

    let command = match positional
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .as_slice()
    {
        ["find", file, term] => Command::Find {
            file: PathBuf::from(file),
            term: term.to_string(),
        },
        ["replace-all", file, term, replacement] => Command::ReplaceAll {
            file: PathBuf::from(file),
            term: term.to_string(),
            replacement: replacement.to_string(),
            in_place,
        },
        ["stats", file] => Command::Stats {
            file: PathBuf::from(file),
        },
        ["import", file, rest @ ..] if rest.len() <= 1 => Command::Import {
            file: PathBuf::from(file),
            out: rest.first().map(PathBuf::from),
        },
        ["export", file, rest @ ..] if rest.len() <= 1 => Command::Export {
            file: PathBuf::from(file),
            out: rest.first().map(PathBuf::from),
        },
        ["print", file, rest @ ..] if rest.len() <= 1 => Command::Print {
            file: PathBuf::from(file),
            out: rest.first().map(PathBuf::from),
        },
        _ => bail!("invalid arguments\n\n{}", USAGE),
    };

    Ok(Options { config, command })
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write(path: &Path, contents: &str) -> anyhow::Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn run(command: Command, config: &EditorConfig) -> anyhow::Result<()> {
    let engine = || FindReplaceEngine::new(&config.search, config.theme, Rc::new(LogNotifier));

    match command {
        Command::Find { file, term } => {
            let mut surface = MemorySurface::new(read(&file)?);
            let mut engine = engine();
            match engine.find(&mut surface, &term)? {
                SearchOutcome::NoMatches => println!("no matches for {:?}", term),
                SearchOutcome::Found(count) => {
                    println!("{} match(es) for {:?}", count, term);
                    let base = &engine.session().base;
                    for found in engine.matches() {
                        println!(
                            "  #{} bytes {}..{}: {}",
                            found.ordinal + 1,
                            found.range.start,
                            found.range.end,
                            &base[found.range.clone()]
                        );
                    }
                }
            }
        }
        Command::ReplaceAll {
            file,
            term,
            replacement,
            in_place,
        } => {
            let mut surface = MemorySurface::new(read(&file)?);
            let count = engine()
                .replace_all(&mut surface, &term, &replacement)?
                .count();
            if in_place {
                write(&file, &surface.content())?;
                println!("replaced {} occurrence(s) in {}", count, file.display());
            } else {
                print!("{}", surface.content());
            }
        }
        Command::Stats { file } => {
            let stats = DocumentStats::from_markup(&read(&file)?);
            println!("{}", stats.label());
            println!("空白を除く文字数: {}", stats.chars_no_spaces);
        }
        Command::Import { file, out } => {
            let markup = transfer::import_text(&read(&file)?, config.transfer.max_import_bytes)?;
            match out {
                Some(out) => write(&out, &markup)?,
                None => println!("{}", markup),
            }
        }
        Command::Export { file, out } => {
            let text = transfer::export_text(&read(&file)?)?;
            let out = out.unwrap_or_else(|| {
                PathBuf::from(transfer::default_export_name(
                    chrono::Local::now().date_naive(),
                ))
            });
            write(&out, &text)?;
            println!("exported to {}", out.display());
        }
        Command::Print { file, out } => {
            let markup = read(&file)?;
            let words = DocumentStats::from_markup(&markup).words;
            let html =
                transfer::print_document(&markup, words, chrono::Local::now().naive_local())?;
            match out {
                Some(out) => {
                    write(&out, &html)?;
                    println!("wrote {}", out.display());
                }
                None => print!("{}", html),
            }
        }
    }
    Ok(())
}
