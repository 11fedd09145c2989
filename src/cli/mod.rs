#[doc(hidden)]
pub mod builder;
#[cfg(test)]
mod tests;

use chrono::NaiveDate;

use crate::journal::Journal;
use crate::{parser, printer, reports};

fn init_tracing() {
    #[cfg(feature = "tracing")]
    crate::tracing::init();
}

#[doc(hidden)]
/// Run the ledgerfmt CLI and return the exit code.
pub fn run_fmt(cmd: clap::Command) -> i32 {
    init_tracing();
    let args = cmd.get_matches();
    let write = args.get_flag("write");
    let sort = args.get_flag("sort");
    #[cfg(feature = "diff")]
    let diff = args.get_flag("diff");

    // A missing path or "-" means STDIN.
    let file = args
        .get_one::<String>("file")
        .filter(|file| file.as_str() != "-")
        .map(std::path::PathBuf::from);

    let (name, content) = match &file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(content) => (path.display().to_string(), content),
            Err(e) => {
                eprintln!("Error reading file {}: {e}", path.display());
                return 1;
            }
        },
        None => ("stdin".to_string(), read_stdin()),
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(file = %name, write, sort, "formatting journal");

    let mut tree = match parser::parse(&name, &content) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };
    if sort {
        tree.sort_transactions();
    }
    let formatted = printer::Printer::new(&tree).print();

    if write {
        let path = match &file {
            Some(path) => path,
            None => {
                eprintln!("Cannot write back when reading from STDIN.");
                return 1;
            }
        };
        if formatted != content {
            if let Err(e) = std::fs::write(path, &formatted) {
                eprintln!("Error writing file {}: {e}", path.display());
                return 1;
            }
        }
        return 0;
    }

    #[cfg(feature = "diff")]
    if diff {
        print_diff(&content, &formatted);
        return 0;
    }

    #[allow(clippy::print_stdout)]
    {
        print!("{formatted}");
    }
    0
}

#[cfg(feature = "diff")]
fn print_diff(original: &str, formatted: &str) {
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_lines(original, formatted);
    for change in diff.iter_all_changes() {
        #[cfg(not(feature = "color"))]
        {
            let line = match change.tag() {
                ChangeTag::Delete => format!("- {change}"),
                ChangeTag::Insert => format!("+ {change}"),
                ChangeTag::Equal => format!("  {change}"),
            };
            eprint!("{line}");
        }

        #[cfg(feature = "color")]
        {
            let line = match change.tag() {
                ChangeTag::Delete => {
                    let bright_red = anstyle::Style::new()
                        .fg_color(Some(anstyle::AnsiColor::BrightRed.into()));
                    format!("{bright_red}- {change}{bright_red:#}")
                }
                ChangeTag::Insert => {
                    let bright_green = anstyle::Style::new()
                        .fg_color(Some(anstyle::AnsiColor::BrightGreen.into()));
                    format!("{bright_green}+ {change}{bright_green:#}")
                }
                ChangeTag::Equal => {
                    let dimmed = anstyle::Style::new().dimmed();
                    format!("{dimmed}  {change}{dimmed:#}")
                }
            };
            anstream::eprint!("{line}");
        }
    }
}

#[cfg(feature = "json")]
#[doc(hidden)]
/// Run the ledger2json CLI and return the exit code.
pub fn run_to_json(cmd: clap::Command) -> i32 {
    init_tracing();
    let _args = cmd.get_matches();
    let content = read_stdin();
    let tree = match parser::parse("stdin", &content) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };
    match serde_json::to_string_pretty(&tree.root) {
        Ok(out) => {
            #[allow(clippy::print_stdout)]
            {
                println!("{out}");
            }
            0
        }
        Err(e) => {
            eprintln!("json encoding: {e}");
            1
        }
    }
}

#[doc(hidden)]
/// Run the ledger CLI and return the exit code.
pub fn run_ledger(cmd: clap::Command) -> i32 {
    init_tracing();
    let args = cmd.get_matches();
    let file = args
        .get_one::<String>("file")
        .cloned()
        .or_else(|| std::env::var("LEDGER_FILE").ok())
        .filter(|file| !file.is_empty());
    let file = match file {
        Some(file) => file,
        None => {
            eprintln!("Please specify an existing journal file with -f or LEDGER_FILE");
            return 1;
        }
    };

    match args.subcommand() {
        Some(("balance", sub)) => {
            let journal = match Journal::open(&file) {
                Ok(journal) => journal,
                Err(e) => {
                    eprintln!("{e}");
                    return 1;
                }
            };
            let txs = journal.transactions();
            let report = match sub.get_one::<String>("account") {
                Some(pattern) => {
                    let re = match regex::RegexBuilder::new(pattern)
                        .case_insensitive(true)
                        .build()
                    {
                        Ok(re) => re,
                        Err(e) => {
                            eprintln!("Invalid account pattern {pattern:?}: {e}");
                            return 1;
                        }
                    };
                    let matcher = move |name: &str| re.is_match(name);
                    reports::balance_filtered(&txs, Some(&matcher))
                }
                None => reports::balance(&txs),
            };
            let report = match report {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("{e}");
                    return 1;
                }
            };
            if let Err(e) = report.write_to(&mut std::io::stdout()) {
                eprintln!("{e}");
                return 1;
            }
            0
        }
        Some((other, _)) => {
            eprintln!("Unknown command: {other}");
            1
        }
        None => {
            eprintln!("Missing command, expected 'balance'");
            1
        }
    }
}

#[doc(hidden)]
/// Run the budgeteer CLI and return the exit code.
pub fn run_budgeteer(cmd: clap::Command) -> i32 {
    init_tracing();
    let args = cmd.get_matches();
    let file = match args.get_one::<String>("file") {
        Some(file) => file.clone(),
        None => {
            eprintln!("Please specify an existing journal file with -f");
            return 1;
        }
    };

    match args.subcommand() {
        Some(("balance", sub)) => {
            let since = match sub.get_one::<String>("since") {
                Some(text) => match text.parse::<NaiveDate>() {
                    Ok(date) => date,
                    Err(e) => {
                        eprintln!("Invalid --since date {text:?}: {e}");
                        return 1;
                    }
                },
                None => NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch date"),
            };
            let mut journal = match Journal::open(&file) {
                Ok(journal) => journal,
                Err(e) => {
                    eprintln!("{e}");
                    return 1;
                }
            };
            let today = chrono::Local::now().date_naive();
            let report = match crate::budget::balance(&mut journal, since, today) {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("{e}");
                    return 1;
                }
            };
            #[allow(clippy::print_stdout)]
            for (name, account) in &report.accounts {
                for amount in account.amounts() {
                    println!("{name}  {amount}");
                }
            }
            0
        }
        Some((other, _)) => {
            eprintln!("Unknown command: {other}");
            1
        }
        None => {
            eprintln!("Missing command, expected 'balance'");
            1
        }
    }
}

/// Reads all of STDIN verbatim. Line terminators must reach the lexer
/// untouched, CRLF included, so no line-based reading here.
fn read_stdin() -> String {
    use std::io::Read;

    let mut buffer = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut buffer) {
        eprintln!("Error reading STDIN: {e}");
    }
    buffer
}
