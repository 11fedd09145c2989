fn main() {
    std::process::exit(ledger_tools::cli::run_ledger(ledger_tools::cli::builder::ledger()));
}
