fn main() {
    std::process::exit(ledger_tools::cli::run_fmt(ledger_tools::cli::builder::ledgerfmt()));
}
