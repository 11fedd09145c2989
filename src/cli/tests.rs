use super::builder;

#[test]
fn ledgerfmt_parses_flags_and_file() {
    let matches = builder::ledgerfmt()
        .try_get_matches_from(["ledgerfmt", "-w", "--sort", "wallet.ledger"])
        .unwrap();
    assert!(matches.get_flag("write"));
    assert!(matches.get_flag("sort"));
    assert_eq!(
        matches.get_one::<String>("file").map(String::as_str),
        Some("wallet.ledger")
    );
}

#[test]
fn ledgerfmt_defaults_to_stdin() {
    let matches = builder::ledgerfmt()
        .try_get_matches_from(["ledgerfmt"])
        .unwrap();
    assert!(matches.get_one::<String>("file").is_none());
    assert!(!matches.get_flag("write"));
}

#[cfg(feature = "diff")]
#[test]
fn ledgerfmt_accepts_diff_flag() {
    let matches = builder::ledgerfmt()
        .try_get_matches_from(["ledgerfmt", "--diff"])
        .unwrap();
    assert!(matches.get_flag("diff"));
}

#[test]
fn ledger_balance_alias_resolves() {
    let matches = builder::ledger()
        .try_get_matches_from(["ledger", "-f", "wallet.ledger", "bal", "expenses"])
        .unwrap();
    assert_eq!(
        matches.get_one::<String>("file").map(String::as_str),
        Some("wallet.ledger")
    );
    let (name, sub) = matches.subcommand().unwrap();
    assert_eq!(name, "balance");
    assert_eq!(
        sub.get_one::<String>("account").map(String::as_str),
        Some("expenses")
    );
}

#[test]
fn ledger_balance_regex_is_optional() {
    let matches = builder::ledger()
        .try_get_matches_from(["ledger", "-f", "wallet.ledger", "balance"])
        .unwrap();
    let (_, sub) = matches.subcommand().unwrap();
    assert!(sub.get_one::<String>("account").is_none());
}

#[test]
fn budgeteer_accepts_since_date() {
    let matches = builder::budgeteer()
        .try_get_matches_from([
            "budgeteer",
            "-f",
            "wallet.ledger",
            "balance",
            "--since",
            "2017-06-01",
        ])
        .unwrap();
    let (name, sub) = matches.subcommand().unwrap();
    assert_eq!(name, "balance");
    assert_eq!(
        sub.get_one::<String>("since").map(String::as_str),
        Some("2017-06-01")
    );
}
