use clap::{value_parser, Arg, ArgAction, Command};

fn version_and_help(cmd: Command) -> Command {
    cmd.disable_help_flag(true)
        .arg(
            Arg::new("help")
                .short('h')
                .long("help")
                .help("Print help.")
                .action(ArgAction::Help),
        )
        .disable_version_flag(true)
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("version")
                .short('V')
                .long("version")
                .help("Print version.")
                .action(ArgAction::Version),
        )
}

#[doc(hidden)]
/// Build the ledgerfmt CLI with clap.
pub fn ledgerfmt() -> Command {
    let cmd = Command::new("ledgerfmt")
        .long_about("Formats Ledger journal files into their canonical layout.")
        .override_usage("ledgerfmt [OPTIONS] [FILE]\n")
        .arg(
            Arg::new("file")
                .help("Path of the journal file to format. Reads from STDIN when not given.")
                .value_parser(value_parser!(String))
                .value_name("FILE")
                .num_args(0..=1),
        )
        .arg(
            Arg::new("write")
                .short('w')
                .long("write")
                .help(
                    "Write the result back to the file in place instead of printing it. \
           WARNING: this is a potentially destructive operation, make sure to \
           make a backup of your files or print the output first.",
                )
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("sort")
                .long("sort")
                .help(
                    "Reorder transactions by date, stably. Comments and blank lines \
           travel with the transaction that follows them; anything after the \
           last transaction stays at the end of the file.",
                )
                .action(ArgAction::SetTrue),
        );
    #[cfg(feature = "diff")]
    let cmd = cmd.arg(
        Arg::new("diff")
            .long("diff")
            .help("Print a diff between the original and the formatted file instead of the formatted content.")
            .action(ArgAction::SetTrue),
    );
    version_and_help(cmd)
}

#[doc(hidden)]
/// Build the ledger2json CLI with clap.
pub fn ledger2json() -> Command {
    version_and_help(
        Command::new("ledger2json")
            .long_about(
                "Reads a Ledger journal from STDIN and writes its parse tree as indented JSON.",
            )
            .override_usage("ledger2json < journal.ledger\n"),
    )
}

#[doc(hidden)]
/// Build the ledger CLI with clap.
pub fn ledger() -> Command {
    version_and_help(
        Command::new("ledger")
            .long_about("Reports on Ledger journal files.")
            .arg(
                Arg::new("file")
                    .short('f')
                    .long("file")
                    .help(
                        "Path of the journal file. Falls back to the LEDGER_FILE \
               environment variable.",
                    )
                    .value_parser(value_parser!(String))
                    .value_name("FILE"),
            )
            .subcommand(
                Command::new("balance")
                    .visible_alias("bal")
                    .about("Print aggregated balances per commodity.")
                    .arg(
                        Arg::new("account")
                            .help(
                                "Case-insensitive regular expression selecting the \
                       accounts to report.",
                            )
                            .value_parser(value_parser!(String))
                            .value_name("ACCOUNT_REGEX")
                            .num_args(0..=1),
                    ),
            ),
    )
}

#[doc(hidden)]
/// Build the budgeteer CLI with clap.
pub fn budgeteer() -> Command {
    version_and_help(
        Command::new("budgeteer")
            .long_about(
                "Projects 'budget:' template transactions monthly and reports \
         the affected accounts.",
            )
            .arg(
                Arg::new("file")
                    .short('f')
                    .long("file")
                    .help("Path of the journal file.")
                    .value_parser(value_parser!(String))
                    .value_name("FILE"),
            )
            .subcommand(
                Command::new("balance")
                    .visible_alias("bal")
                    .about("Print budget balances for the affected accounts.")
                    .arg(
                        Arg::new("since")
                            .long("since")
                            .help("Only count activity after this date (YYYY-MM-DD).")
                            .value_parser(value_parser!(String))
                            .value_name("DATE"),
                    ),
            ),
    )
}
