use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Arg, ArgAction, Command, value_parser};
use pikeregex::{Builder, Input, dump};

fn build_cli() -> Command {
    Command::new("pikeregex")
        .about("Match PATTERN against SUBJECT, anchored at an offset")
        .after_help(
            "Dump destinations can be attached (-gFILE) or given with `=` (-g=FILE, \
             --dot=FILE). Without one, dumps go to stdout.\n\n\
             Exits with 0 if there's a match, 1 otherwise.",
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .action(ArgAction::SetTrue)
                .help("Don't print the matching string"),
        )
        .arg(
            Arg::new("dot")
                .short('g')
                .long("dot")
                .value_name("FILE")
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("-")
                .help("Write the program as a graphviz graph to FILE or stdout"),
        )
        .arg(
            Arg::new("instructions")
                .short('i')
                .long("instructions")
                .value_name("FILE")
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("-")
                .help("Write the program instructions to FILE or stdout"),
        )
        .arg(
            Arg::new("offset")
                .long("offset")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .default_value("0")
                .help("Byte offset in SUBJECT where the match must start"),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .action(ArgAction::SetTrue)
                .help("Fail on syntax errors instead of recovering"),
        )
        .arg(Arg::new("pattern").value_name("PATTERN").required(true))
        .arg(Arg::new("subject").value_name("SUBJECT").required(true))
}

/// Rewrites the attached `-gFILE` and `-iFILE` forms into `--dot=FILE` and
/// `--instructions=FILE`. Clap only attaches optional values with `=`, since
/// the next word would otherwise be taken for the value.
fn expand_attached_values(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut positional_only = false;
    args.into_iter()
        .map(|arg| {
            if positional_only {
                return arg;
            }
            if arg == "--" {
                positional_only = true;
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            for (short, long) in [("-g", "--dot"), ("-i", "--instructions")] {
                if let Some(value) = text.strip_prefix(short) {
                    if !value.is_empty() && !value.starts_with('=') {
                        return format!("{long}={value}").into();
                    }
                }
            }
            arg
        })
        .collect()
}

/// Opens the destination of a dump, `-` being stdout.
fn output(path: &str) -> anyhow::Result<Box<dyn Write>> {
    if path == "-" {
        return Ok(Box::new(io::stdout().lock()));
    }
    let file = File::create(path).with_context(|| format!("can't create `{path}`"))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    let matches = build_cli().get_matches_from(expand_attached_values(std::env::args_os()));
    let pattern = matches
        .get_one::<String>("pattern")
        .context("missing pattern")?;
    let subject = matches
        .get_one::<String>("subject")
        .context("missing subject")?;
    let offset = matches.get_one::<usize>("offset").copied().unwrap_or(0);

    let mut regex = Builder::new(pattern)
        .strict(matches.get_flag("strict"))
        .build()?;

    for diagnostic in regex.diagnostics() {
        eprintln!("warning: {diagnostic}");
    }

    let found = regex.find(Input::new(subject.as_bytes()).start(offset));
    if let Some(m) = &found {
        if !matches.get_flag("silent") {
            println!("{}", String::from_utf8_lossy(m.as_bytes()));
        }
    }

    if let Some(path) = matches.get_one::<String>("dot") {
        let mut out = output(path)?;
        dump::write_dot(regex.bytecode(), &mut out)
            .and_then(|()| out.flush())
            .with_context(|| format!("can't write graph to `{path}`"))?;
    }

    if let Some(path) = matches.get_one::<String>("instructions") {
        let mut out = output(path)?;
        dump::write_listing(regex.bytecode(), &mut out)
            .and_then(|()| out.flush())
            .with_context(|| format!("can't write instructions to `{path}`"))?;
    }

    let matched = found.is_some();
    regex.release();

    Ok(if matched {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
