fn main() {
    std::process::exit(ledger_tools::cli::run_budgeteer(
        ledger_tools::cli::builder::budgeteer(),
    ));
}
