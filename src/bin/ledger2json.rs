fn main() {
    std::process::exit(ledger_tools::cli::run_to_json(
        ledger_tools::cli::builder::ledger2json(),
    ));
}
