use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;

use kiwi_core::{Kiwi, KiwiBuilder, MatchOptions, TableLanguageModel};

use crate::error::Result;

mod app;
mod error;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        if err.is_broken_pipe() {
            process::exit(0);
        }
        eprintln!("kiwi: {}", err);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let matches = app::app().get_matches();
    let kiwi = build_kiwi(&matches)?;

    match matches.subcommand() {
        ("analyze", Some(m)) => {
            let top_n: usize = m.value_of("top-n").unwrap_or("1").parse().unwrap_or(1);
            command_analyze(&kiwi, top_n)
        }
        ("split-sents", Some(_)) => command_split_sents(&kiwi),
        ("join", Some(m)) => command_join(&kiwi, m.is_present("lm-search")),
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn build_kiwi(matches: &clap::ArgMatches<'_>) -> Result<Kiwi<TableLanguageModel>> {
    let mut builder = KiwiBuilder::new();
    for path in matches.values_of("dict").into_iter().flatten() {
        builder.load_dictionary_file(Path::new(path))?;
    }
    for path in matches.values_of("rules").into_iter().flatten() {
        builder.load_rule_file(Path::new(path))?;
    }
    Ok(builder.build()?)
}

fn command_analyze(kiwi: &Kiwi<TableLanguageModel>, top_n: usize) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let analyses = kiwi.analyze(&line, top_n, MatchOptions::all(), &Default::default(), &[]);
        for (rank, analysis) in analyses.iter().enumerate() {
            write!(out, "{}:\t", rank)?;
            let rendered: Vec<String> =
                analysis.tokens.iter().map(|t| format!("{}/{}", t.surface_string, t.tag.pos)).collect();
            writeln!(out, "{}\t[score={:.3}]", rendered.join(" + "), analysis.score)?;
        }
    }
    Ok(())
}

fn command_join(kiwi: &Kiwi<TableLanguageModel>, lm_search: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let mut joiner = kiwi.new_joiner(lm_search);
        for tok in line.split_whitespace() {
            let (surface, tag) = match tok.rsplit_once('/') {
                Some(parts) => parts,
                None => return Err(error::Error::Other(format!("expected `surface/TAG`, got {:?}", tok))),
            };
            let tag = tag
                .parse::<kiwi_core::PosTag>()
                .map_err(|_| error::Error::Other(format!("unrecognized tag {:?}", tag)))?;
            joiner.add(&kiwi_hangul::normalize_str(surface), tag);
        }
        writeln!(out, "{}", joiner.join())?;
    }
    Ok(())
}

fn command_split_sents(kiwi: &Kiwi<TableLanguageModel>) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut input = String::new();
    for line in io::stdin().lock().lines() {
        input.push_str(&line?);
        input.push('\n');
    }
    for span in kiwi.split_into_sents(&input, MatchOptions::all()) {
        writeln!(out, "{}", &input[span.start..span.end])?;
    }
    Ok(())
}
