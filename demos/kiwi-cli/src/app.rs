use clap::{App, AppSettings, Arg, SubCommand};

const ABOUT: &str = "
kiwi analyzes Korean text: tokenize-and-tag, auto-join a token sequence back
into a surface string, or split raw text into sentences.
";

pub fn app() -> App<'static, 'static> {
    App::new("kiwi")
        .author("Kiwi contributors")
        .version(env!("CARGO_PKG_VERSION"))
        .about(ABOUT)
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("dict")
                .long("dict")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .help("Load a dictionary source file (repeatable)."),
        )
        .arg(
            Arg::with_name("rules")
                .long("rules")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .help("Load a combining-rule source file (repeatable)."),
        )
        .subcommand(
            SubCommand::with_name("analyze")
                .about("Analyze text read from stdin, one line per analysis.")
                .arg(Arg::with_name("top-n").long("top-n").takes_value(true).default_value("1")),
        )
        .subcommand(SubCommand::with_name("split-sents").about("Split stdin into sentence spans."))
        .subcommand(
            SubCommand::with_name("join")
                .about("Join `surface/TAG surface/TAG ...` lines from stdin back into surface text.")
                .arg(Arg::with_name("lm-search").long("lm-search").help(
                    "Score ambiguous combining-rule replacements with the language model.",
                )),
        )
}
